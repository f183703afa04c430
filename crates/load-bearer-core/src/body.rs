//! Response bodies

use bytes::Bytes;

/// Body of the immediate responder
pub fn ok() -> Bytes {
    Bytes::from_static(b"OK")
}

/// Body of both delayed responders, e.g. `Waited 250 ms`
pub fn waited(delay_ms: u64) -> Bytes {
    Bytes::from(format!("Waited {delay_ms} ms"))
}

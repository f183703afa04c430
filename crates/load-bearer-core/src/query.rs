//! `delay` query parameter extraction

use crate::request::parse_query;

/// Name of the query parameter carrying the delay in milliseconds
pub const DELAY_PARAM: &str = "delay";

/// Value of the `delay` query parameter, or 0 if there is none.
///
/// The key must match exactly. When the key repeats, the last occurrence
/// wins. Values are read like C's `atoi`: leading whitespace, an optional
/// sign, then as many decimal digits as follow; anything else yields 0.
pub fn requested_delay(query: Option<&str>) -> i64 {
    let Some(query) = query else {
        return 0;
    };

    parse_query(query)
        .into_iter()
        .filter(|(key, _)| key == DELAY_PARAM)
        .last()
        .map(|(_, value)| parse_int_prefix(&value))
        .unwrap_or(0)
}

/// Requested delay with negative values clamped to zero
pub fn effective_delay(query: Option<&str>) -> u64 {
    requested_delay(query).max(0).unsigned_abs()
}

/// Parse the leading integer of `value`, saturating on overflow.
///
/// Only ASCII whitespace and vertical tab are skipped before the number.
fn parse_int_prefix(value: &str) -> i64 {
    let s = value.trim_start_matches(|c: char| c.is_ascii_whitespace() || c == '\x0b');
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut n: i64 = 0;
    for d in digits.bytes().take_while(u8::is_ascii_digit) {
        let d = i64::from(d - b'0');
        n = if negative {
            n.saturating_mul(10).saturating_sub(d)
        } else {
            n.saturating_mul(10).saturating_add(d)
        };
    }
    n
}

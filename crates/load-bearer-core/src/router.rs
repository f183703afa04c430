//! Exact-path route table
//!
//! Routes match on the path alone. Every method reaches the same entry,
//! and the query string never takes part in matching.

use crate::{Error, Result};
use std::collections::HashMap;

/// Path router holding one value per registered path
#[derive(Debug, Clone)]
pub struct Router<T> {
    routes: HashMap<String, T>,
}

impl<T> Router<T> {
    /// Create a new router
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }

    /// Add a route
    ///
    /// Paths must be absolute and may only be registered once.
    pub fn route(&mut self, path: &str, value: T) -> Result<()> {
        if !path.starts_with('/') || path.contains('?') {
            return Err(Error::InvalidPath(path.to_string()));
        }
        if self.routes.contains_key(path) {
            return Err(Error::DuplicateRoute(path.to_string()));
        }
        self.routes.insert(path.to_string(), value);
        Ok(())
    }

    /// Look up the value registered for `path`
    pub fn find(&self, path: &str) -> Option<&T> {
        self.routes.get(path)
    }
}

impl<T> Default for Router<T> {
    fn default() -> Self {
        Self::new()
    }
}

//! `[transform]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [transform]
//! mode = "development"    # Exposed to pages as process.env.NODE_ENV
//! cache_capacity = 20     # Transformed documents kept in memory
//! ```

use serde::{Deserialize, Serialize};

use crate::html::bootstrap::DEFAULT_MODE;
use crate::html::cache::DEFAULT_CAPACITY;

/// HTML transform settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformSection {
    /// Value of `process.env.NODE_ENV` in served pages.
    pub mode: String,

    /// Number of transformed HTML documents kept in the response cache.
    pub cache_capacity: usize,
}

impl Default for TransformSection {
    fn default() -> Self {
        Self {
            mode: DEFAULT_MODE.to_string(),
            cache_capacity: DEFAULT_CAPACITY,
        }
    }
}

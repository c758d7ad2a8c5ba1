//! Backing store configuration.

use serde::{Deserialize, Serialize};

/// Store backend configuration.
///
/// The store contract only requires a per-key atomic conditional write,
/// so the backend selection lives here rather than in the core logic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store backend: `"memory"` is the only backend shipped with the core.
    #[serde(default = "default_backend")]
    pub backend: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
        }
    }
}

fn default_backend() -> String {
    "memory".to_string()
}

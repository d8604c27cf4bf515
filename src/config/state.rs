// Application state module

use super::types::Config;

/// Shared per-process state
///
/// The configuration is immutable for the process lifetime; the mapping
/// table is deliberately NOT held here — it is re-read from disk on every
/// request so the handler always observes the file's current contents.
pub struct AppState {
    pub config: Config,
}

impl AppState {
    pub const fn new(config: Config) -> Self {
        Self { config }
    }
}

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Store/delete policy, resolved once at startup and handed to each mount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MountConfig {
    /// Enqueue a store job on save instead of calling the API inline.
    pub store_files_async: bool,
    /// Enqueue a delete job on destroy instead of calling the API inline.
    pub delete_files_async: bool,
    /// Skip installing the save-triggered store hook entirely.
    pub do_not_store: bool,
    /// Install the destroy-triggered delete hook.
    pub delete_files_after_destroy: bool,
}

impl Default for MountConfig {
    fn default() -> Self {
        MountConfig {
            store_files_async: false,
            delete_files_async: false,
            do_not_store: false,
            delete_files_after_destroy: true,
        }
    }
}

impl MountConfig {
    pub fn trace_loaded(&self) {
        info!(
            store_files_async = self.store_files_async,
            delete_files_async = self.delete_files_async,
            do_not_store = self.do_not_store,
            delete_files_after_destroy = self.delete_files_after_destroy,
            "Loaded mount policy"
        );
        debug!(?self, "Mount policy loaded (full debug)");
    }
}

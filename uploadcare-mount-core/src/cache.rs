use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::contract::FileCache;
use crate::remote_file::FileAttributes;

/// Process-local side cache.
///
/// Entries are written by whatever produced the file metadata (an upload
/// callback, a seed file); mounted attributes only ever read from it.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, FileAttributes>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store attributes for a CDN URL under its derived key.
    pub fn insert(&self, cdn_url: &str, attributes: FileAttributes) {
        let key = self.build_key(cdn_url);
        self.entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key, attributes);
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl FileCache for MemoryCache {
    async fn read(&self, key: &str) -> Option<FileAttributes> {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(key)
            .cloned()
    }
}

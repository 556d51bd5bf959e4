use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use uploadcare_mount_core::cache::MemoryCache;
use uploadcare_mount_core::remote_file::FileAttributes;

/// Seed a [`MemoryCache`] from a JSON file mapping CDN URLs to file attributes:
///
/// ```json
/// { "https://ucarecdn.com/<uuid>/": { "size": 1024, "mime_type": "image/png" } }
/// ```
pub fn load_cache_file<P: AsRef<Path>>(path: P) -> Result<MemoryCache> {
    let path_ref = path.as_ref();
    let content = fs::read_to_string(path_ref)
        .with_context(|| format!("Failed to read cache file {path_ref:?}"))?;
    let entries: HashMap<String, FileAttributes> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse cache file {path_ref:?} as a JSON object"))?;

    let cache = MemoryCache::new();
    for (cdn_url, attributes) in entries {
        cache.insert(&cdn_url, attributes);
    }
    info!(cache_path = ?path_ref, entries = cache.len(), "Seeded file cache");
    Ok(cache)
}

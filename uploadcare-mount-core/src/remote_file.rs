//! Value object for a file referenced by a mounted attribute.
//!
//! A [`RemoteFileRef`] is rebuilt on every read of the mounted attribute and
//! never mutated afterwards. Its backing data is either the minimal
//! `{cdn_url, uuid}` pair or a richer attribute map found in the side cache.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

/// Descriptive attributes of a remote file, as stored in the side cache.
pub type FileAttributes = Map<String, Value>;

const CDN_URL: &str = "cdn_url";
const UUID: &str = "uuid";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RemoteFileRef {
    attributes: FileAttributes,
}

impl RemoteFileRef {
    /// Minimal reference built from the raw field value and the extracted UUID.
    pub fn new(cdn_url: impl Into<String>, uuid: Option<String>) -> Self {
        let mut attributes = FileAttributes::new();
        attributes.insert(CDN_URL.to_string(), Value::String(cdn_url.into()));
        attributes.insert(
            UUID.to_string(),
            present(uuid).map(Value::String).unwrap_or(Value::Null),
        );
        RemoteFileRef { attributes }
    }

    /// Reference backed by a cache entry.
    ///
    /// `cdn_url` and `uuid` fall back to the raw field value and extracted
    /// UUID when the entry does not carry them.
    pub fn from_cache(cdn_url: &str, uuid: Option<String>, mut cached: FileAttributes) -> Self {
        let has_url = cached.get(CDN_URL).and_then(Value::as_str).is_some();
        if !has_url {
            cached.insert(CDN_URL.to_string(), Value::String(cdn_url.to_string()));
        }
        let has_uuid = cached
            .get(UUID)
            .and_then(Value::as_str)
            .is_some_and(|u| !u.trim().is_empty());
        if !has_uuid {
            cached.insert(
                UUID.to_string(),
                present(uuid).map(Value::String).unwrap_or(Value::Null),
            );
        }
        RemoteFileRef { attributes: cached }
    }

    pub fn cdn_url(&self) -> &str {
        self.str_attr(CDN_URL).unwrap_or_default()
    }

    /// UUID of the file, absent when none could be extracted.
    pub fn uuid(&self) -> Option<&str> {
        self.str_attr(UUID).filter(|u| !u.trim().is_empty())
    }

    pub fn attributes(&self) -> &FileAttributes {
        &self.attributes
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    pub fn size(&self) -> Option<u64> {
        self.attributes.get("size").and_then(Value::as_u64)
    }

    pub fn mime_type(&self) -> Option<&str> {
        self.str_attr("mime_type")
    }

    pub fn original_filename(&self) -> Option<&str> {
        self.str_attr("original_filename")
    }

    /// Whether the hosting service reported the file as stored.
    pub fn is_stored(&self) -> bool {
        self.str_attr("datetime_stored").is_some()
    }

    /// True when the backing data holds more than the CDN URL and UUID.
    pub fn is_loaded(&self) -> bool {
        self.attributes
            .keys()
            .any(|k| k.as_str() != CDN_URL && k.as_str() != UUID)
    }

    fn str_attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(Value::as_str)
    }
}

impl fmt::Display for RemoteFileRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cdn_url())
    }
}

fn present(uuid: Option<String>) -> Option<String> {
    uuid.filter(|u| !u.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const URL: &str = "https://ucarecdn.com/550e8400-e29b-41d4-a716-446655440000/";
    const ID: &str = "550e8400-e29b-41d4-a716-446655440000";

    #[test]
    fn blank_uuid_is_absent() {
        let file = RemoteFileRef::new(URL, Some("  ".to_string()));
        assert_eq!(file.uuid(), None);
        assert_eq!(file.cdn_url(), URL);
        assert!(!file.is_loaded());
    }

    #[test]
    fn cache_entry_without_identity_gets_it_filled_in() {
        let cached = json!({ "size": 1024, "mime_type": "image/png" });
        let cached = cached.as_object().cloned().unwrap();
        let file = RemoteFileRef::from_cache(URL, Some(ID.to_string()), cached);

        assert_eq!(file.cdn_url(), URL);
        assert_eq!(file.uuid(), Some(ID));
        assert_eq!(file.size(), Some(1024));
        assert_eq!(file.mime_type(), Some("image/png"));
        assert!(file.is_loaded());
        assert!(!file.is_stored());
    }

    #[test]
    fn cache_entry_values_win_over_defaults() {
        let cached = json!({
            "cdn_url": "https://ucarecdn.com/other/",
            "uuid": "other",
            "datetime_stored": "2024-01-01T00:00:00Z",
            "original_filename": "cat.png"
        });
        let cached = cached.as_object().cloned().unwrap();
        let file = RemoteFileRef::from_cache(URL, Some(ID.to_string()), cached);

        assert_eq!(file.cdn_url(), "https://ucarecdn.com/other/");
        assert_eq!(file.uuid(), Some("other"));
        assert_eq!(file.original_filename(), Some("cat.png"));
        assert!(file.is_stored());
    }

    #[test]
    fn displays_and_serializes_as_its_attributes() {
        let file = RemoteFileRef::new(URL, Some(ID.to_string()));
        assert_eq!(file.to_string(), URL);
        assert_eq!(
            serde_json::to_value(&file).unwrap(),
            json!({ "cdn_url": URL, "uuid": ID })
        );
    }
}

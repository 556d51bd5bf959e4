use regex::Regex;

use crate::contract::IdExtractor;

const UUID_PATTERN: &str =
    r"(?i)[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}";

/// Finds the first canonical UUID in a CDN URL.
///
/// Group URLs (`<uuid>~<count>`) and URLs with processing operations
/// (`<uuid>/-/resize/100x/`) yield the leading file UUID.
#[derive(Debug, Clone)]
pub struct UuidExtractor {
    pattern: Regex,
}

impl UuidExtractor {
    pub fn new() -> Self {
        let pattern = Regex::new(UUID_PATTERN).expect("UUID pattern is a valid regex");
        UuidExtractor { pattern }
    }
}

impl Default for UuidExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl IdExtractor for UuidExtractor {
    fn extract(&self, url: &str) -> Option<String> {
        self.pattern.find(url).map(|m| m.as_str().to_string())
    }
}

//! Rewriting media references in text assets.
//!
//! The rewrite is plain literal substring replacement, not reference
//! resolution: for every uploaded media file, first each occurrence of its
//! base name and then each occurrence of its full relative path is replaced
//! by the public URL. A coincidental match in unrelated text is replaced as
//! well, and text that already contains a URL which itself contains a mapped
//! filename will be rewritten again on a second run.

use crate::classify::base_name;

/// Relative media path -> public URL, iterated in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlobUrlMap {
    entries: Vec<(String, String)>,
}

impl BlobUrlMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace. A replaced key keeps its original position.
    pub fn insert(&mut self, relative_path: impl Into<String>, url: impl Into<String>) {
        let relative_path = relative_path.into();
        let url = url.into();
        match self.entries.iter_mut().find(|(k, _)| *k == relative_path) {
            Some(entry) => entry.1 = url,
            None => self.entries.push((relative_path, url)),
        }
    }

    pub fn get(&self, relative_path: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == relative_path)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewrittenText {
    pub relative_path: String,
    pub text: String,
}

/// Replace media references in `content` with their blob URLs.
pub fn rewrite_text(content: &str, map: &BlobUrlMap) -> String {
    let mut out = content.to_string();

    for (rel, url) in map.iter() {
        let base = base_name(rel);
        if base.is_empty() {
            continue;
        }
        out = out.replace(base, url);
    }

    for (rel, url) in map.iter() {
        if rel.is_empty() {
            continue;
        }
        out = out.replace(rel, url);
    }

    out
}

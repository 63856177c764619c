/// Extensions uploaded to the blob store and referenced by URL
pub const MEDIA_EXTENSIONS: [&str; 4] = [".mp4", ".jpeg", ".jpg", ".png"];

/// Extensions rewritten and deployed through the file store
pub const TEXT_EXTENSIONS: [&str; 3] = [".html", ".css", ".js"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Media,
    Text,
    /// Neither uploaded nor deployed
    Other,
}

impl AssetKind {
    pub fn of(path: &str) -> Self {
        let ext = extension_lower(path);
        if MEDIA_EXTENSIONS.contains(&ext.as_str()) {
            AssetKind::Media
        } else if TEXT_EXTENSIONS.contains(&ext.as_str()) {
            AssetKind::Text
        } else {
            AssetKind::Other
        }
    }
}

/// Lowercased extension including the dot, taken from the last `.` in the
/// whole path. Empty when there is no dot.
pub fn extension_lower(path: &str) -> String {
    match path.rfind('.') {
        Some(i) => path[i..].to_lowercase(),
        None => String::new(),
    }
}

/// Final `/` separated component of a relative path.
pub fn base_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(AssetKind::of("img/logo.png"), AssetKind::Media);
        assert_eq!(AssetKind::of("clip.MP4"), AssetKind::Media);
        assert_eq!(AssetKind::of("photo.JpEg"), AssetKind::Media);
        assert_eq!(AssetKind::of("index.html"), AssetKind::Text);
        assert_eq!(AssetKind::of("css/site.CSS"), AssetKind::Text);
        assert_eq!(AssetKind::of("app.js"), AssetKind::Text);
        assert_eq!(AssetKind::of("favicon.ico"), AssetKind::Other);
        assert_eq!(AssetKind::of("README"), AssetKind::Other);
        assert_eq!(AssetKind::of("data.json"), AssetKind::Other);
    }

    #[test]
    fn test_extension_uses_last_dot_of_whole_path() {
        assert_eq!(extension_lower("a.b/c"), ".b/c");
        assert_eq!(extension_lower("noext"), "");
        assert_eq!(extension_lower("x.tar.GZ"), ".gz");
    }

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("a/b/c.png"), "c.png");
        assert_eq!(base_name("c.png"), "c.png");
        assert_eq!(base_name("dir/"), "");
    }
}

//! File selection.
//!
//! A [`FileSelection`] is the set of files a user picked for one deploy,
//! either by walking a directory or from a flat list of paths. Relative
//! paths always use `/` as separator. Content is not read here; each
//! [`PickedFile`] keeps a handle (its on-disk path) that the deploy
//! workflow reads when it needs the bytes.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use crate::classify::AssetKind;

/// Number of paths listed before the summary collapses the rest
pub const SUMMARY_LISTING_LIMIT: usize = 120;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickedFile {
    /// Path relative to the picked root, `/` separated
    pub relative_path: String,
    /// Where the bytes live
    pub source: PathBuf,
    pub size: u64,
}

impl PickedFile {
    pub fn kind(&self) -> AssetKind {
        AssetKind::of(&self.relative_path)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SelectionError {
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("not a file: {0}")]
    NotAFile(PathBuf),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSelection {
    files: Vec<PickedFile>,
}

impl FileSelection {
    pub fn new(files: Vec<PickedFile>) -> Self {
        Self { files }
    }

    /// Recursively walk `root`, keeping discovery order. Paths are relative
    /// to `root` itself, so the picked folder's own name never appears.
    pub fn from_directory(root: &Path) -> Result<Self, SelectionError> {
        if !root.is_dir() {
            return Err(SelectionError::NotADirectory(root.to_path_buf()));
        }

        let mut files = Vec::new();
        walk_dir(root, "", &mut files)?;

        tracing::debug!(root = %root.display(), files = files.len(), "directory walk complete");
        Ok(Self { files })
    }

    /// Build a selection from individually listed files.
    ///
    /// Each file gets the path a folder upload input would assign it: its
    /// path relative to `base`, with the top-level folder component then
    /// stripped, so `site/css/app.css` becomes `css/app.css` while a bare
    /// `index.html` stays as is. Files outside `base` are placed relative to
    /// the folder that holds all of them, so `/tmp/site/index.html` and
    /// `/tmp/site/css/app.css` become `index.html` and `css/app.css`.
    pub fn from_file_list<P: AsRef<Path>>(base: &Path, paths: &[P]) -> Result<Self, SelectionError> {
        let mut sources = Vec::with_capacity(paths.len());
        for path in paths {
            let path = path.as_ref();
            let source = if path.is_absolute() {
                path.to_path_buf()
            } else {
                base.join(path)
            };

            let metadata = std::fs::metadata(&source)?;
            if !metadata.is_file() {
                return Err(SelectionError::NotAFile(source));
            }
            sources.push((source, metadata.len()));
        }

        // One level above the deepest folder shared by every outside file,
        // so that folder becomes the stripped top-level component
        let outside_parents: Vec<&Path> = sources
            .iter()
            .filter(|(source, _)| !source.starts_with(base))
            .filter_map(|(source, _)| source.parent())
            .collect();
        let outside_root = common_ancestor(&outside_parents)
            .and_then(|shared| shared.parent().map(Path::to_path_buf));

        let mut files = Vec::with_capacity(sources.len());
        for (source, size) in sources {
            let assigned = source
                .strip_prefix(base)
                .ok()
                .or_else(|| {
                    outside_root
                        .as_deref()
                        .and_then(|root| source.strip_prefix(root).ok())
                })
                .unwrap_or(&source);
            let parts: Vec<String> = assigned
                .components()
                .filter_map(|c| match c {
                    Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                    _ => None,
                })
                .collect();

            let relative_path = if parts.len() >= 2 {
                parts[1..].join("/")
            } else if let Some(only) = parts.first() {
                only.clone()
            } else {
                source
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default()
            };

            files.push(PickedFile {
                relative_path,
                source,
                size,
            });
        }

        Ok(Self { files })
    }

    pub fn files(&self) -> &[PickedFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }

    pub fn media(&self) -> impl Iterator<Item = &PickedFile> {
        self.files.iter().filter(|f| f.kind() == AssetKind::Media)
    }

    pub fn texts(&self) -> impl Iterator<Item = &PickedFile> {
        self.files.iter().filter(|f| f.kind() == AssetKind::Text)
    }

    /// Whether a top-level `index.html` (any case) was picked
    pub fn has_index(&self) -> bool {
        self.files
            .iter()
            .any(|f| f.relative_path.to_lowercase() == "index.html")
    }

    pub fn summary(&self) -> SelectionSummary {
        if self.files.is_empty() {
            return SelectionSummary {
                headline: "No files found.".to_string(),
                listing: Vec::new(),
            };
        }

        let total_mb = self.total_size() as f64 / (1024.0 * 1024.0);
        let headline = format!("{} file(s), total {:.2} MB", self.files.len(), total_mb);

        let mut listing: Vec<String> = self
            .files
            .iter()
            .take(SUMMARY_LISTING_LIMIT)
            .map(|f| f.relative_path.clone())
            .collect();
        if self.files.len() > SUMMARY_LISTING_LIMIT {
            listing.push(format!(
                "... ({} more files)",
                self.files.len() - SUMMARY_LISTING_LIMIT
            ));
        }

        SelectionSummary { headline, listing }
    }
}

/// Human readable description of a selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionSummary {
    pub headline: String,
    pub listing: Vec<String>,
}

impl fmt::Display for SelectionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.headline)?;
        for line in &self.listing {
            write!(f, "\n{}", line)?;
        }
        Ok(())
    }
}

/// Longest path every entry starts with
fn common_ancestor(paths: &[&Path]) -> Option<PathBuf> {
    let (first, rest) = paths.split_first()?;
    let mut shared = first.to_path_buf();
    while !rest.iter().all(|p| p.starts_with(&shared)) {
        if !shared.pop() {
            return None;
        }
    }
    Some(shared)
}

fn walk_dir(current: &Path, prefix: &str, files: &mut Vec<PickedFile>) -> Result<(), SelectionError> {
    for entry in std::fs::read_dir(current)? {
        let entry = entry?;
        let path = entry.path();
        // entry metadata does not follow links, so dangling links and
        // link cycles never reach the walk
        let metadata = entry.metadata()?;
        let name = entry.file_name().to_string_lossy().into_owned();

        if metadata.file_type().is_symlink() {
            tracing::debug!(path = %path.display(), "skipping symlink");
        } else if metadata.is_dir() {
            walk_dir(&path, &format!("{}{}/", prefix, name), files)?;
        } else if metadata.is_file() {
            files.push(PickedFile {
                relative_path: format!("{}{}", prefix, name),
                source: path,
                size: metadata.len(),
            });
        }
    }

    Ok(())
}

//! Folder enumeration.
//!
//! Lists the images directly inside one directory to build the working set
//! for sequential browsing:
//!
//! ```text
//! photos/
//! ├── b.png          ✓
//! ├── a.JPG          ✓  (extension check is case-insensitive)
//! ├── notes.txt      ✗  (unsupported extension)
//! ├── raw.heic       ✗
//! ├── c.gif/         ✗  (directories are skipped, whatever their name)
//! └── nested/        ✗  (no recursion)
//!     └── d.png
//! ```
//!
//! Only the extension is looked at; a corrupt `.png` is still listed and
//! fails later, at [`load`](crate::imaging::load).
//!
//! By default the set is sorted by file name so repeated listings are stable.
//! [`ListOrder::Filesystem`] keeps whatever order the directory returned.

use crate::formats;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// How to order a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListOrder {
    /// Sorted by path (byte-wise on the file name within one directory).
    #[default]
    Name,
    /// Directory iteration order, unspecified and platform dependent.
    Filesystem,
}

/// Supported image paths from one directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FileSet(Vec<PathBuf>);

impl FileSet {
    /// A set holding exactly one path.
    pub fn single(path: impl Into<PathBuf>) -> Self {
        Self(vec![path.into()])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Path> {
        self.0.get(index).map(PathBuf::as_path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.0.iter().map(PathBuf::as_path)
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.0
    }
}

/// List supported images directly inside `dir`, sorted by name.
///
/// # Errors
///
/// [`ScanError::NotADirectory`] when `dir` does not exist or is not a
/// directory; [`ScanError::Io`] when it cannot be read.
pub fn list_images(dir: impl AsRef<Path>) -> Result<FileSet, ScanError> {
    list_images_with(dir, ListOrder::default())
}

/// [`list_images`] with an explicit order.
pub fn list_images_with(dir: impl AsRef<Path>, order: ListOrder) -> Result<FileSet, ScanError> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(ScanError::NotADirectory(dir.to_path_buf()));
    }

    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && formats::is_supported(p))
        .collect();

    if order == ListOrder::Name {
        paths.sort();
    }
    debug!(dir = %dir.display(), count = paths.len(), "listed images");
    Ok(FileSet(paths))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"x").unwrap();
    }

    fn names(set: &FileSet) -> Vec<String> {
        set.iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn keeps_only_supported_files() {
        let tmp = TempDir::new().unwrap();
        for name in ["b.png", "a.jpg", "c.gif", "notes.txt", "raw.heic"] {
            touch(tmp.path(), name);
        }
        let set = list_images(tmp.path()).unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(names(&set), ["a.jpg", "b.png", "c.gif"]);
    }

    #[test]
    fn empty_directory_gives_empty_set() {
        let tmp = TempDir::new().unwrap();
        let set = list_images(tmp.path()).unwrap();
        assert!(set.is_empty());
        assert_eq!(set.get(0), None);
    }

    #[test]
    fn all_unsupported_gives_empty_set() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "readme.md");
        touch(tmp.path(), "noext");
        assert!(list_images(tmp.path()).unwrap().is_empty());
    }

    #[test]
    fn file_is_not_a_directory() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "photo.png");
        let result = list_images(tmp.path().join("photo.png"));
        assert!(matches!(result, Err(ScanError::NotADirectory(_))));
    }

    #[test]
    fn missing_path_is_not_a_directory() {
        let result = list_images("/nonexistent/photos");
        assert!(matches!(result, Err(ScanError::NotADirectory(_))));
    }

    #[test]
    fn no_recursion_and_directories_skipped() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "top.png");
        fs::create_dir(tmp.path().join("looks-like.png")).unwrap();
        fs::create_dir(tmp.path().join("nested")).unwrap();
        touch(&tmp.path().join("nested"), "deep.png");

        let set = list_images(tmp.path()).unwrap();
        assert_eq!(names(&set), ["top.png"]);
    }

    #[test]
    fn extension_case_ignored() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "SHOUT.PNG");
        touch(tmp.path(), "mixed.JpEg");
        assert_eq!(list_images(tmp.path()).unwrap().len(), 2);
    }

    #[test]
    fn filesystem_order_has_same_members() {
        let tmp = TempDir::new().unwrap();
        for name in ["z.png", "m.bmp", "a.tif"] {
            touch(tmp.path(), name);
        }
        let mut unsorted = names(&list_images_with(tmp.path(), ListOrder::Filesystem).unwrap());
        unsorted.sort();
        assert_eq!(unsorted, names(&list_images(tmp.path()).unwrap()));
    }

    #[test]
    fn paths_are_joined_with_dir() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "one.png");
        let set = list_images(tmp.path()).unwrap();
        assert_eq!(set.get(0), Some(tmp.path().join("one.png").as_path()));
    }
}

//! Sequential browsing over a [`FileSet`].
//!
//! A [`Session`] is a working set plus a cursor. Opening a single file makes
//! a one-entry session; opening a folder lists it with
//! [`list_images`](crate::scan::list_images) and starts at the first entry.
//! Stepping wraps around at both ends and does nothing when there is at
//! most one entry.
//!
//! The session only moves the cursor. Loading and extracting the current
//! file is left to the caller, so a file that fails to decode does not stop
//! navigation past it.

use crate::imaging::{self, BoundingBox, ThumbnailRaster};
use crate::scan::{self, FileSet, ListOrder, ScanError};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, Default)]
pub struct Session {
    files: FileSet,
    index: usize,
}

/// One entry of a preview strip.
#[derive(Debug)]
pub struct StripEntry {
    pub index: usize,
    pub path: PathBuf,
    pub thumbnail: ThumbnailRaster,
}

impl Session {
    /// A session over an existing set, positioned at the first entry.
    pub fn new(files: FileSet) -> Self {
        Self { files, index: 0 }
    }

    /// A one-entry session for a single file.
    pub fn open_file(path: impl Into<PathBuf>) -> Self {
        Self::new(FileSet::single(path))
    }

    /// A session over the images in `dir`, sorted by name.
    pub fn open_folder(dir: impl AsRef<Path>) -> Result<Self, ScanError> {
        Self::open_folder_with(dir, ListOrder::default())
    }

    pub fn open_folder_with(dir: impl AsRef<Path>, order: ListOrder) -> Result<Self, ScanError> {
        let files = scan::list_images_with(dir, order)?;
        Ok(Self::new(files))
    }

    pub fn files(&self) -> &FileSet {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Path under the cursor; `None` for an empty session.
    pub fn current(&self) -> Option<&Path> {
        self.files.get(self.index)
    }

    /// Advance one entry, wrapping to the start.
    pub fn next(&mut self) -> Option<&Path> {
        if self.files.len() > 1 {
            self.index = (self.index + 1) % self.files.len();
        }
        self.current()
    }

    /// Step back one entry, wrapping to the end.
    pub fn previous(&mut self) -> Option<&Path> {
        let len = self.files.len();
        if len > 1 {
            self.index = (self.index + len - 1) % len;
        }
        self.current()
    }

    /// Jump to `index`. Out-of-range indices leave the cursor where it is
    /// and return `None`.
    pub fn select(&mut self, index: usize) -> Option<&Path> {
        if index >= self.files.len() {
            return None;
        }
        self.index = index;
        self.current()
    }

    /// Load every file and derive a thumbnail that fits `bounds`.
    ///
    /// Files that fail to load are left out; the remaining entries keep
    /// their index in the session.
    pub fn preview_strip(&self, bounds: BoundingBox) -> Vec<StripEntry> {
        let mut strip = Vec::with_capacity(self.files.len());
        for (index, path) in self.files.iter().enumerate() {
            match imaging::load(path) {
                Ok(image) => strip.push(StripEntry {
                    index,
                    path: path.to_path_buf(),
                    thumbnail: imaging::thumbnail(&image, bounds),
                }),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping strip entry"),
            }
        }
        debug!(total = self.files.len(), shown = strip.len(), "built preview strip");
        strip
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use tempfile::TempDir;

    fn three_file_session() -> (TempDir, Session) {
        let tmp = TempDir::new().unwrap();
        for name in ["a.png", "b.png", "c.png"] {
            write_png(&tmp.path().join(name), 4, 4);
        }
        let session = Session::open_folder(tmp.path()).unwrap();
        (tmp, session)
    }

    fn current_name(session: &Session) -> String {
        session
            .current()
            .unwrap()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .into_owned()
    }

    #[test]
    fn open_folder_starts_at_first() {
        let (_tmp, session) = three_file_session();
        assert_eq!(session.len(), 3);
        assert_eq!(session.index(), 0);
        assert_eq!(current_name(&session), "a.png");
    }

    #[test]
    fn next_wraps_to_start() {
        let (_tmp, mut session) = three_file_session();
        session.next();
        session.next();
        assert_eq!(current_name(&session), "c.png");
        session.next();
        assert_eq!(current_name(&session), "a.png");
    }

    #[test]
    fn previous_wraps_to_end() {
        let (_tmp, mut session) = three_file_session();
        session.previous();
        assert_eq!(session.index(), 2);
        assert_eq!(current_name(&session), "c.png");
    }

    #[test]
    fn single_file_session_does_not_move() {
        let mut session = Session::open_file("/photos/only.jpg");
        assert_eq!(session.next(), Some(Path::new("/photos/only.jpg")));
        assert_eq!(session.previous(), Some(Path::new("/photos/only.jpg")));
        assert_eq!(session.index(), 0);
    }

    #[test]
    fn empty_session_has_no_current() {
        let tmp = TempDir::new().unwrap();
        let mut session = Session::open_folder(tmp.path()).unwrap();
        assert!(session.is_empty());
        assert_eq!(session.current(), None);
        assert_eq!(session.next(), None);
        assert_eq!(session.previous(), None);
    }

    #[test]
    fn select_in_and_out_of_range() {
        let (_tmp, mut session) = three_file_session();
        assert!(session.select(1).is_some());
        assert_eq!(current_name(&session), "b.png");
        assert_eq!(session.select(7), None);
        assert_eq!(session.index(), 1);
    }

    #[test]
    fn open_folder_on_file_fails() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("x.png");
        write_png(&file, 2, 2);
        assert!(matches!(
            Session::open_folder(&file),
            Err(ScanError::NotADirectory(_))
        ));
    }

    #[test]
    fn preview_strip_skips_broken_files() {
        let tmp = TempDir::new().unwrap();
        write_png(&tmp.path().join("a.png"), 300, 150);
        std::fs::write(tmp.path().join("b.png"), b"broken").unwrap();
        write_png(&tmp.path().join("c.png"), 50, 50);

        let session = Session::open_folder(tmp.path()).unwrap();
        let strip = session.preview_strip(BoundingBox::STRIP);

        assert_eq!(strip.len(), 2);
        assert_eq!(strip[0].index, 0);
        assert_eq!(
            (strip[0].thumbnail.width(), strip[0].thumbnail.height()),
            (100, 50)
        );
        assert_eq!(strip[1].index, 2);
        assert_eq!(
            (strip[1].thumbnail.width(), strip[1].thumbnail.height()),
            (50, 50)
        );
    }
}

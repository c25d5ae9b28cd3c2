/// Files and their move into category/extension folders.
///
/// A [`FileEntry`] knows its extension and category and can move itself below a
/// destination root:
///
/// - classified, grouped: `root/CATEGORY/EXT/name`
/// - classified, not grouped: `root/EXT/name`
/// - custom group: `root/Group/EXT/name`
/// - custom group without extension folders: `root/Group/name`
///
/// Moves are value-returning: [`FileEntry::move_to`] consumes the entry and hands back
/// one that points at wherever the file ended up.
use crate::context::SortContext;
use crate::error::{SortError, SortResult};
use crate::file_category::UNDEFINED_EXTENSION;
use crate::fs_ops;
use crate::naming::title_case;
use crate::path_entry::PathEntry;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// How a file picks its destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileKind {
    /// Category from the extension table.
    Classified,
    /// Fixed group name in place of the category, extension folder below it.
    Custom { group: String },
    /// Fixed group name, no extension folder.
    CustomFlat { group: String },
}

/// A file somewhere on disk, classified by its extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    entry: PathEntry,
    kind: FileKind,
    extension: String,
    category: String,
    exists: bool,
}

impl FileEntry {
    /// Creates a file entry classified by extension.
    pub fn new(ctx: &SortContext, path: impl AsRef<Path>) -> SortResult<Self> {
        Self::with_kind(ctx, path, FileKind::Classified)
    }

    /// Creates a file entry routed into the custom group `group`.
    pub fn custom(ctx: &SortContext, path: impl AsRef<Path>, group: &str) -> SortResult<Self> {
        Self::with_kind(
            ctx,
            path,
            FileKind::Custom {
                group: title_case(group),
            },
        )
    }

    /// Creates a file entry routed into `group` without an extension folder.
    pub fn custom_flat(
        ctx: &SortContext,
        path: impl AsRef<Path>,
        group: &str,
    ) -> SortResult<Self> {
        Self::with_kind(
            ctx,
            path,
            FileKind::CustomFlat {
                group: title_case(group),
            },
        )
    }

    pub(crate) fn with_kind(
        ctx: &SortContext,
        path: impl AsRef<Path>,
        kind: FileKind,
    ) -> SortResult<Self> {
        let entry = PathEntry::new(path, ctx.hidden())?;
        let mut file = Self {
            entry,
            kind,
            extension: String::new(),
            category: String::new(),
            exists: false,
        };
        file.refresh(ctx);
        Ok(file)
    }

    fn refresh(&mut self, ctx: &SortContext) {
        self.extension = Path::new(self.entry.name())
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| UNDEFINED_EXTENSION.to_string());
        self.category = match &self.kind {
            FileKind::Classified => ctx.classifier().classify(&self.extension).to_string(),
            FileKind::Custom { group } | FileKind::CustomFlat { group } => group.clone(),
        };
        self.exists = self.entry.path().is_file();
    }

    /// Points the entry at `path`, recomputing every derived field.
    pub fn set_path(&mut self, ctx: &SortContext, path: impl Into<PathBuf>) {
        self.entry.set_path(path, ctx.hidden());
        self.refresh(ctx);
    }

    pub fn path(&self) -> &Path {
        self.entry.path()
    }

    pub fn name(&self) -> &str {
        self.entry.name()
    }

    pub fn parent(&self) -> &Path {
        self.entry.parent()
    }

    pub fn is_hidden(&self) -> bool {
        self.entry.is_hidden()
    }

    pub fn kind(&self) -> &FileKind {
        &self.kind
    }

    /// Lower-cased extension, or `"undefined"`.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Category name, `"UNDEFINED"`, or the custom group name.
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Whether a regular file existed at the path when it was last assigned.
    pub fn exists(&self) -> bool {
        self.exists
    }

    /// The directory this file belongs in below `root`. Custom kinds always group.
    ///
    /// `root` should already be absolute.
    pub fn destination_dir(&self, root: &Path, group: bool) -> PathBuf {
        let extension_dir = self.extension.to_uppercase();
        let dir = match &self.kind {
            FileKind::Classified if group => root.join(&self.category).join(extension_dir),
            FileKind::Classified => root.join(extension_dir),
            FileKind::Custom { group } => root.join(group).join(extension_dir),
            FileKind::CustomFlat { group } => root.join(group),
        };
        fs_ops::normalize(&dir)
    }

    /// Computes where [`FileEntry::move_to`] would put the file, without changing anything.
    pub fn plan(&self, ctx: &SortContext, root: &Path, group: bool) -> SortResult<PathBuf> {
        let root = absolute_root(root)?;
        let dir = self.destination_dir(&root, group);
        if dir == self.parent() {
            return Ok(self.path().to_path_buf());
        }
        let name = ctx.resolver().resolve(&dir.join(self.name()))?;
        Ok(dir.join(name))
    }

    /// Moves the file into its destination directory below `root`.
    ///
    /// Missing directories are created. A file already in its destination directory is
    /// left alone. Name collisions get a `" - dup (N)"` suffix. A permission failure
    /// abandons the move and returns the entry unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be created, no free name is found, or the
    /// move fails for a reason other than missing permissions.
    pub fn move_to(mut self, ctx: &SortContext, root: &Path, group: bool) -> SortResult<Self> {
        let root = absolute_root(root)?;
        let dir = self.destination_dir(&root, group);
        fs::create_dir_all(&dir).map_err(|e| SortError::DirectoryCreationFailed {
            path: dir.clone(),
            source: e,
        })?;

        if dir == self.parent() {
            tracing::debug!(path = %self.path().display(), "Already in place");
            return Ok(self);
        }

        let name = ctx.resolver().resolve(&dir.join(self.name()))?;
        let destination = dir.join(name);

        match fs_ops::move_path(self.path(), &destination) {
            Ok(()) => {
                tracing::info!(
                    path = %self.path().display(),
                    destination = %destination.display(),
                    "Moved file"
                );
                self.set_path(ctx, destination);
                Ok(self)
            }
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                tracing::warn!(path = %self.path().display(), error = %e, "Could not move file");
                Ok(self)
            }
            Err(e) => Err(SortError::MoveFailed {
                from: self.path().to_path_buf(),
                to: destination,
                source: e,
            }),
        }
    }
}

pub(crate) fn absolute_root(root: &Path) -> SortResult<PathBuf> {
    fs_ops::absolutize(root).map_err(|e| SortError::InvalidPath {
        path: root.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_extension_and_category() {
        let ctx = SortContext::default();

        let file = FileEntry::new(&ctx, "/tmp/x/Photo.JPG").unwrap();
        assert_eq!(file.extension(), "jpg");
        assert_eq!(file.category(), "IMAGE");
        assert!(!file.exists());

        let file = FileEntry::new(&ctx, "/tmp/x/Makefile").unwrap();
        assert_eq!(file.extension(), "undefined");
        assert_eq!(file.category(), "UNDEFINED");

        let file = FileEntry::new(&ctx, "/tmp/x/.bashrc").unwrap();
        assert_eq!(file.extension(), "undefined");

        let file = FileEntry::new(&ctx, "/tmp/x/archive.tar.gz").unwrap();
        assert_eq!(file.extension(), "gz");
        assert_eq!(file.category(), "ARCHIVE");
    }

    #[test]
    fn test_custom_kinds_use_group_name() {
        let ctx = SortContext::default();

        let file = FileEntry::custom(&ctx, "/tmp/x/a.jpg", "holiday trip").unwrap();
        assert_eq!(file.category(), "Holiday Trip");
        assert_eq!(
            file.destination_dir(Path::new("/out"), false),
            PathBuf::from("/out/Holiday Trip/JPG")
        );

        let file = FileEntry::custom_flat(&ctx, "/tmp/x/a.jpg", "holiday trip").unwrap();
        assert_eq!(
            file.destination_dir(Path::new("/out"), true),
            PathBuf::from("/out/Holiday Trip")
        );
    }

    #[test]
    fn test_destination_dir_grouping() {
        let ctx = SortContext::default();
        let file = FileEntry::new(&ctx, "/tmp/x/song.mp3").unwrap();

        assert_eq!(
            file.destination_dir(Path::new("/out"), true),
            PathBuf::from("/out/AUDIO/MP3")
        );
        assert_eq!(
            file.destination_dir(Path::new("/out"), false),
            PathBuf::from("/out/MP3")
        );
    }

    #[test]
    fn test_move_to_grouped_creates_directories() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let ctx = SortContext::default();
        let source = temp_dir.path().join("a");
        fs::create_dir(&source).expect("Failed to create source directory");
        fs::write(source.join("photo.jpg"), "jpeg").expect("Failed to write file");

        let root = temp_dir.path().join("out");
        let file = FileEntry::new(&ctx, source.join("photo.jpg")).unwrap();
        let moved = file.move_to(&ctx, &root, true).expect("Failed to move file");

        assert_eq!(moved.path(), root.join("IMAGE/JPG/photo.jpg"));
        assert!(moved.exists());
        assert!(!source.join("photo.jpg").exists());
    }

    #[test]
    fn test_move_to_twice_is_idempotent() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let ctx = SortContext::default();
        fs::write(temp_dir.path().join("notes.txt"), "n").expect("Failed to write file");

        let file = FileEntry::new(&ctx, temp_dir.path().join("notes.txt")).unwrap();
        let first = file
            .move_to(&ctx, temp_dir.path(), true)
            .expect("Failed to move file");
        let first_path = first.path().to_path_buf();

        let second = first
            .move_to(&ctx, temp_dir.path(), true)
            .expect("Failed to move file");
        assert_eq!(second.path(), first_path);
        assert_eq!(
            fs_ops::immediate_files(&temp_dir.path().join("DOCUMENT/TXT")).unwrap(),
            vec![first_path]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_move_to_permission_denied_keeps_entry() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let ctx = SortContext::default();
        let source = temp_dir.path().join("locked");
        fs::create_dir(&source).expect("Failed to create directory");
        fs::write(source.join("photo.jpg"), "jpeg").expect("Failed to write file");
        if !fs_ops::lock_dir(&source) {
            return;
        }

        let file = FileEntry::new(&ctx, source.join("photo.jpg")).unwrap();
        let result = file.move_to(&ctx, &temp_dir.path().join("out"), true);
        fs_ops::unlock_dir(&source);

        let kept = result.expect("Permission failure should not be an error");
        assert_eq!(kept.path(), source.join("photo.jpg"));
        assert!(kept.exists());
        assert!(!temp_dir.path().join("out/IMAGE/JPG/photo.jpg").exists());
    }

    #[test]
    fn test_move_to_resolves_collisions() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let ctx = SortContext::default();
        let existing = temp_dir.path().join("TXT");
        fs::create_dir(&existing).expect("Failed to create directory");
        fs::write(existing.join("report.txt"), "old").expect("Failed to write file");
        fs::write(temp_dir.path().join("report.txt"), "new").expect("Failed to write file");

        let file = FileEntry::new(&ctx, temp_dir.path().join("report.txt")).unwrap();
        let moved = file
            .move_to(&ctx, temp_dir.path(), false)
            .expect("Failed to move file");

        assert_eq!(moved.name(), "report - dup (1).txt");
        assert_eq!(fs::read_to_string(existing.join("report.txt")).unwrap(), "old");
        assert_eq!(fs::read_to_string(moved.path()).unwrap(), "new");
    }

    #[test]
    fn test_plan_does_not_touch_filesystem() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let ctx = SortContext::default();
        fs::write(temp_dir.path().join("clip.mp4"), "v").expect("Failed to write file");

        let file = FileEntry::new(&ctx, temp_dir.path().join("clip.mp4")).unwrap();
        let planned = file
            .plan(&ctx, temp_dir.path(), true)
            .expect("Failed to plan move");

        assert_eq!(planned, temp_dir.path().join("VIDEO/MP4/clip.mp4"));
        assert!(!temp_dir.path().join("VIDEO").exists());
        assert!(file.path().exists());
    }
}

/// Folders: recognizing sorter-made folders and merging folders into their destination.
///
/// Grouping a folder computes its destination below the root (see
/// [`FolderEntry::category_folder`]) and then merge-moves it there:
///
/// - if the destination exists, the folder's immediate files are moved one by one (each
///   to its own classified place) and the folder is removed only if that left it empty;
/// - otherwise the whole folder is moved to the destination in one step.
///
/// Subfolders are never merged and nothing is ever deleted recursively.
use crate::context::SortContext;
use crate::error::{SortError, SortResult};
use crate::file_category::{Classifier, FOLDERS_SEGMENT};
use crate::file_entry::{FileEntry, FileKind, absolute_root};
use crate::fs_ops;
use crate::naming::title_case;
use crate::path_entry::PathEntry;
use std::cell::OnceCell;
use std::fs;
use std::path::{Path, PathBuf};

/// How a folder picks its destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderKind {
    /// Destination derived from the folder's name.
    Classified,
    /// Everything goes into the named group, marked so later runs skip it.
    Custom {
        group: String,
        /// Whether files get an extension folder inside the group.
        extension_folders: bool,
    },
}

/// A folder somewhere on disk.
#[derive(Debug, Clone)]
pub struct FolderEntry {
    entry: PathEntry,
    kind: FolderKind,
    exists: bool,
    sorter_managed: bool,
    category_folder: OnceCell<PathBuf>,
}

impl FolderEntry {
    /// Creates a folder entry whose destination is derived from its name.
    pub fn new(ctx: &SortContext, path: impl AsRef<Path>) -> SortResult<Self> {
        Self::with_kind(ctx, path, FolderKind::Classified)
    }

    /// Creates a folder entry routed into the custom group `group`.
    pub fn custom(
        ctx: &SortContext,
        path: impl AsRef<Path>,
        group: &str,
        extension_folders: bool,
    ) -> SortResult<Self> {
        Self::with_kind(
            ctx,
            path,
            FolderKind::Custom {
                group: title_case(group),
                extension_folders,
            },
        )
    }

    fn with_kind(ctx: &SortContext, path: impl AsRef<Path>, kind: FolderKind) -> SortResult<Self> {
        let entry = PathEntry::new(path, ctx.hidden())?;
        let mut folder = Self {
            entry,
            kind,
            exists: false,
            sorter_managed: false,
            category_folder: OnceCell::new(),
        };
        folder.refresh(ctx);
        Ok(folder)
    }

    fn refresh(&mut self, ctx: &SortContext) {
        self.exists = self.entry.path().is_dir();
        self.sorter_managed = Self::is_sorter_managed_path(self.entry.path(), ctx.classifier());
        self.category_folder = OnceCell::new();
    }

    /// Points the entry at `path`, recomputing every derived field.
    pub fn set_path(&mut self, ctx: &SortContext, path: impl Into<PathBuf>) {
        self.entry.set_path(path, ctx.hidden());
        self.refresh(ctx);
    }

    /// True if `path` is an existing directory whose name marks it as sorter-made.
    pub fn is_sorter_managed_path(path: &Path, classifier: &Classifier) -> bool {
        path.is_dir()
            && path
                .file_name()
                .map(|name| classifier.is_sorter_managed_name(&name.to_string_lossy()))
                .unwrap_or(false)
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

    pub fn kind(&self) -> &FolderKind {
        &self.kind
    }

    /// Whether a directory existed at the path when it was last assigned.
    pub fn exists(&self) -> bool {
        self.exists
    }

    pub fn is_sorter_managed(&self) -> bool {
        self.sorter_managed
    }

    /// Destination of this folder relative to the root.
    ///
    /// - custom group: the group name
    /// - extension folder (e.g. `jpg`): `IMAGE/JPG`
    /// - category folder (e.g. `IMAGE`): the category itself
    /// - anything else: `FOLDERS`
    pub fn category_folder(&self, ctx: &SortContext) -> &Path {
        self.category_folder.get_or_init(|| match &self.kind {
            FolderKind::Custom { group, .. } => PathBuf::from(group),
            FolderKind::Classified => self.classified_folder(ctx.classifier()),
        })
    }

    fn classified_folder(&self, classifier: &Classifier) -> PathBuf {
        if !self.sorter_managed {
            return PathBuf::from(FOLDERS_SEGMENT);
        }
        let upper = self.name().to_uppercase();
        if let Some(category) = classifier.category_for_extension(&upper) {
            return Path::new(category).join(upper);
        }
        if classifier.is_category(self.name()) {
            return PathBuf::from(self.name());
        }
        PathBuf::from(FOLDERS_SEGMENT)
    }

    /// Computes where [`FolderEntry::group`] would put the folder.
    pub fn destination(&self, ctx: &SortContext, root: &Path) -> SortResult<PathBuf> {
        let root = absolute_root(root)?;
        Ok(fs_ops::normalize(&root.join(self.category_folder(ctx))))
    }

    /// Moves the folder to its category folder below `root`, grouping its files.
    pub fn group(self, ctx: &SortContext, root: &Path) -> SortResult<Self> {
        let root = absolute_root(root)?;
        let dst = self.destination(ctx, &root)?;
        self.merge_move(ctx, &dst, &root, true)
    }

    /// Moves the folder to `dst`, merging with an existing folder there.
    ///
    /// When `dst` exists, each immediate file is moved with its own [`FileEntry::move_to`]
    /// below `root` using `group_content`, subfolders stay where they are, and the source
    /// is removed only if it ended up empty. When `dst` is missing, the whole folder is
    /// moved there in one step. Custom groups get a marker file in `dst` either way.
    ///
    /// # Errors
    ///
    /// Returns an error if listing the folder, creating directories, moving a file for
    /// a reason other than permissions, or writing the marker fails. Files moved before
    /// the failure stay moved.
    pub fn merge_move(
        mut self,
        ctx: &SortContext,
        dst: &Path,
        root: &Path,
        group_content: bool,
    ) -> SortResult<Self> {
        let root = absolute_root(root)?;
        let dst = absolute_root(dst)?;
        let src = self.path().to_path_buf();

        if dst.is_dir() {
            let files = fs_ops::immediate_files(&src).map_err(|e| SortError::ReadDirFailed {
                path: src.clone(),
                source: e,
            })?;
            for file in files {
                self.child_file(ctx, &file)?
                    .move_to(ctx, &root, group_content)?;
            }

            if self.is_custom() {
                ensure_marker(ctx, &dst)?;
            }

            if src != dst {
                match fs::remove_dir(&src) {
                    Ok(()) => tracing::debug!(path = %src.display(), "Removed merged folder"),
                    Err(e) => tracing::warn!(
                        path = %src.display(),
                        error = %e,
                        "Could not delete folder, it may contain hidden files or subfolders"
                    ),
                }
            }
        } else {
            if let Some(parent) = dst.parent() {
                fs::create_dir_all(parent).map_err(|e| SortError::DirectoryCreationFailed {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
            fs_ops::move_path(&src, &dst).map_err(|e| SortError::MoveFailed {
                from: src.clone(),
                to: dst.clone(),
                source: e,
            })?;
            tracing::info!(path = %src.display(), destination = %dst.display(), "Moved folder");

            if self.is_custom() {
                ensure_marker(ctx, &dst)?;
            }
        }

        self.set_path(ctx, dst);
        Ok(self)
    }

    fn is_custom(&self) -> bool {
        matches!(self.kind, FolderKind::Custom { .. })
    }

    fn child_file(&self, ctx: &SortContext, path: &Path) -> SortResult<FileEntry> {
        let kind = match &self.kind {
            FolderKind::Classified => FileKind::Classified,
            FolderKind::Custom {
                group,
                extension_folders: true,
            } => FileKind::Custom {
                group: group.clone(),
            },
            FolderKind::Custom {
                group,
                extension_folders: false,
            } => FileKind::CustomFlat {
                group: group.clone(),
            },
        };
        FileEntry::with_kind(ctx, path, kind)
    }
}

/// Writes the marker file into `dir` unless it is already there.
///
/// On platforms with a hidden attribute the marker is also hidden; failing to hide it
/// is only logged.
pub fn ensure_marker(ctx: &SortContext, dir: &Path) -> SortResult<()> {
    if fs_ops::has_marker(dir, ctx.marker_name()) {
        return Ok(());
    }
    let marker = dir.join(ctx.marker_name());
    fs::File::create(&marker).map_err(|e| SortError::MarkerWriteFailed {
        path: marker.clone(),
        source: e,
    })?;
    if let Err(e) = ctx.hidden().mark_hidden(&marker) {
        tracing::warn!(path = %marker.display(), error = %e, "Could not hide marker file");
    }
    Ok(())
}

//! A file or folder, dispatched on its variant.

use crate::context::SortContext;
use crate::error::SortResult;
use crate::file_entry::FileEntry;
use crate::folder_entry::FolderEntry;
use std::path::{Path, PathBuf};

/// Any sortable filesystem entry.
#[derive(Debug, Clone)]
pub enum Entry {
    File(FileEntry),
    Folder(FolderEntry),
}

impl Entry {
    /// Builds a classified entry, choosing the variant by whether `path` is a directory.
    pub fn from_path(ctx: &SortContext, path: impl AsRef<Path>) -> SortResult<Self> {
        let path = path.as_ref();
        if path.is_dir() {
            Ok(Self::Folder(FolderEntry::new(ctx, path)?))
        } else {
            Ok(Self::File(FileEntry::new(ctx, path)?))
        }
    }

    /// Builds an entry routed into the custom group `group`.
    pub fn custom(
        ctx: &SortContext,
        path: impl AsRef<Path>,
        group: &str,
        extension_folders: bool,
    ) -> SortResult<Self> {
        let path = path.as_ref();
        if path.is_dir() {
            Ok(Self::Folder(FolderEntry::custom(
                ctx,
                path,
                group,
                extension_folders,
            )?))
        } else if extension_folders {
            Ok(Self::File(FileEntry::custom(ctx, path, group)?))
        } else {
            Ok(Self::File(FileEntry::custom_flat(ctx, path, group)?))
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::File(file) => file.path(),
            Self::Folder(folder) => folder.path(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::File(file) => file.name(),
            Self::Folder(folder) => folder.name(),
        }
    }

    pub fn is_hidden(&self) -> bool {
        match self {
            Self::File(file) => file.is_hidden(),
            Self::Folder(folder) => folder.is_hidden(),
        }
    }

    /// The category the entry is filed under: the file's category, or the folder's
    /// destination segment.
    pub fn category(&self, ctx: &SortContext) -> String {
        match self {
            Self::File(file) => file.category().to_string(),
            Self::Folder(folder) => folder.category_folder(ctx).to_string_lossy().into_owned(),
        }
    }

    /// Where [`Entry::relocate`] would put the entry, without touching the filesystem.
    ///
    /// `group` only applies to files; folders always group their content.
    pub fn destination(&self, ctx: &SortContext, root: &Path, group: bool) -> SortResult<PathBuf> {
        match self {
            Self::File(file) => file.plan(ctx, root, group),
            Self::Folder(folder) => folder.destination(ctx, root),
        }
    }

    /// Moves a file or groups a folder below `root`.
    pub fn relocate(self, ctx: &SortContext, root: &Path, group: bool) -> SortResult<Self> {
        match self {
            Self::File(file) => file.move_to(ctx, root, group).map(Self::File),
            Self::Folder(folder) => folder.group(ctx, root).map(Self::Folder),
        }
    }
}

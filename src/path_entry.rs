//! The common part of every sortable entry: an absolute path and what follows from it.

use crate::error::{SortError, SortResult};
use crate::fs_ops;
use crate::hidden::HiddenCheck;
use std::path::{Path, PathBuf};

/// An absolute filesystem path with its name, parent and hidden flag.
///
/// The derived fields are recomputed on every path assignment and never go stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathEntry {
    path: PathBuf,
    name: String,
    parent: PathBuf,
    hidden: bool,
}

impl PathEntry {
    /// Creates an entry for `path`, made absolute against the current directory.
    ///
    /// # Errors
    ///
    /// Returns `SortError::InvalidPath` if the path is empty or the current directory
    /// cannot be determined.
    pub fn new(path: impl AsRef<Path>, hidden: &dyn HiddenCheck) -> SortResult<Self> {
        let path = path.as_ref();
        let absolute = fs_ops::absolutize(path).map_err(|e| SortError::InvalidPath {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Self::from_absolute(absolute, hidden))
    }

    fn from_absolute(path: PathBuf, hidden: &dyn HiddenCheck) -> Self {
        let path = fs_ops::normalize(&path);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let parent = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let hidden = hidden.is_hidden_path(&path);
        Self {
            path,
            name,
            parent,
            hidden,
        }
    }

    /// Points the entry at `path` and recomputes name, parent and hidden flag.
    ///
    /// `path` is expected to be absolute; it does not need to exist.
    pub fn set_path(&mut self, path: impl Into<PathBuf>, hidden: &dyn HiddenCheck) {
        *self = Self::from_absolute(path.into(), hidden);
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The final path segment, including any extension.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> &Path {
        &self.parent
    }

    /// True if any segment of the path is hidden.
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }
}

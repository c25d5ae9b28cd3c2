//! Hidden path detection.
//!
//! Whether a path counts as hidden depends on the platform: Windows exposes a hidden
//! attribute on files and folders, everything else relies on the dot-prefix convention.
//! Both are expressed through [`HiddenCheck`] and the implementation is picked once by
//! [`platform_hidden_check`].

use std::fmt::Debug;
use std::io;
use std::path::Path;

/// Capability for answering "is this path hidden" and for hiding files.
pub trait HiddenCheck: Debug + Send + Sync {
    /// Returns true if the single entry at `path` is hidden.
    ///
    /// Implementations return `false` rather than failing when the lookup is not possible.
    fn has_hidden_attribute(&self, path: &Path) -> bool;

    /// Returns true if `path` or any of its ancestors is hidden.
    fn is_hidden_path(&self, path: &Path) -> bool {
        path.ancestors()
            .filter(|prefix| prefix.file_name().is_some())
            .any(|prefix| self.has_hidden_attribute(prefix))
    }

    /// Marks the file at `path` as hidden, where the platform supports it.
    fn mark_hidden(&self, _path: &Path) -> io::Result<()> {
        Ok(())
    }
}

/// Dot/double-underscore prefix heuristic used outside Windows.
#[derive(Debug, Clone, Copy, Default)]
pub struct SegmentPrefix;

impl HiddenCheck for SegmentPrefix {
    fn has_hidden_attribute(&self, path: &Path) -> bool {
        path.file_name()
            .map(|name| {
                let name = name.to_string_lossy();
                name.starts_with('.') || name.starts_with("__")
            })
            .unwrap_or(false)
    }
}

/// Reads and sets `FILE_ATTRIBUTE_HIDDEN` on Windows.
#[cfg(windows)]
#[derive(Debug, Clone, Copy, Default)]
pub struct HiddenAttribute;

#[cfg(windows)]
impl HiddenCheck for HiddenAttribute {
    fn has_hidden_attribute(&self, path: &Path) -> bool {
        use std::os::windows::fs::MetadataExt;
        const FILE_ATTRIBUTE_HIDDEN: u32 = 0x2;

        std::fs::metadata(path)
            .map(|meta| meta.file_attributes() & FILE_ATTRIBUTE_HIDDEN != 0)
            .unwrap_or(false)
    }

    fn mark_hidden(&self, path: &Path) -> io::Result<()> {
        let status = std::process::Command::new("attrib")
            .arg("+h")
            .arg(path)
            .status()?;
        if status.success() {
            Ok(())
        } else {
            Err(io::Error::other(format!("attrib exited with {}", status)))
        }
    }
}

/// Returns the hidden-path capability for the running platform.
pub fn platform_hidden_check() -> Box<dyn HiddenCheck> {
    #[cfg(windows)]
    {
        Box::new(HiddenAttribute)
    }
    #[cfg(not(windows))]
    {
        Box::new(SegmentPrefix)
    }
}

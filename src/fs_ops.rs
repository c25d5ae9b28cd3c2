//! Filesystem primitives used by the engine.
//!
//! Moves try a plain rename first and fall back to copy-then-remove when source and
//! destination live on different volumes.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Makes `path` absolute against the current directory and normalizes it lexically.
///
/// The path does not need to exist.
pub fn absolutize(path: &Path) -> io::Result<PathBuf> {
    Ok(normalize(&std::path::absolute(path)?))
}

/// Removes `.` components and folds `..` components without touching the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Moves a file or a whole directory from `src` to `dst`.
///
/// `dst` must not exist. Across volumes the content is copied first and the source is
/// removed only once the copy is complete.
pub fn move_path(src: &Path, dst: &Path) -> io::Result<()> {
    match fs::rename(src, dst) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            tracing::debug!(
                src = %src.display(),
                dst = %dst.display(),
                "Rename crosses devices, falling back to copy and remove"
            );
            if src.is_dir() {
                copy_tree(src, dst)?;
                fs::remove_dir_all(src)
            } else {
                fs::copy(src, dst)?;
                fs::remove_file(src)
            }
        }
        Err(e) => Err(e),
    }
}

fn copy_tree(src: &Path, dst: &Path) -> io::Result<()> {
    for entry in WalkDir::new(src) {
        let entry = entry.map_err(io::Error::from)?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        let target = dst.join(rel);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Lists the regular files directly inside `dir`, sorted by name.
///
/// Dot-files are left out, the same way a shell `*` glob would skip them. Symlinks are
/// followed, so a link to a file counts as a file.
pub fn immediate_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Lists every entry directly inside `dir`, sorted by name.
pub fn immediate_children(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut children = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<io::Result<Vec<_>>>()?;
    children.sort();
    Ok(children)
}

/// Returns true if `dir` holds a file called `marker_name`.
pub fn has_marker(dir: &Path, marker_name: &str) -> bool {
    dir.join(marker_name).is_file()
}

/// Removes write permission from `dir`.
///
/// Returns false, with permissions restored, when the directory stays writable anyway
/// (as it does for root).
#[cfg(all(test, unix))]
pub(crate) fn lock_dir(dir: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(dir, fs::Permissions::from_mode(0o555)).expect("Failed to lock dir");
    let probe = dir.join(".write-check");
    if fs::write(&probe, "").is_ok() {
        let _ = fs::remove_file(&probe);
        unlock_dir(dir);
        return false;
    }
    true
}

#[cfg(all(test, unix))]
pub(crate) fn unlock_dir(dir: &Path) {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(dir, fs::Permissions::from_mode(0o755)).expect("Failed to unlock dir");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_normalize_folds_dots() {
        assert_eq!(
            normalize(Path::new("/a/./b/../c/d")),
            PathBuf::from("/a/c/d")
        );
        assert_eq!(normalize(Path::new("/../x")), PathBuf::from("/x"));
    }

    #[test]
    fn test_absolutize_relative_path() {
        let abs = absolutize(Path::new("some/./dir")).expect("Failed to absolutize");
        assert!(abs.is_absolute());
        assert!(abs.ends_with("some/dir"));
    }

    #[test]
    fn test_move_path_file_and_dir() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();

        fs::write(base.join("a.txt"), "hello").expect("Failed to write file");
        move_path(&base.join("a.txt"), &base.join("b.txt")).expect("Failed to move file");
        assert!(!base.join("a.txt").exists());
        assert_eq!(fs::read_to_string(base.join("b.txt")).unwrap(), "hello");

        fs::create_dir_all(base.join("src/inner")).expect("Failed to create dirs");
        fs::write(base.join("src/inner/c.txt"), "c").expect("Failed to write file");
        move_path(&base.join("src"), &base.join("dst")).expect("Failed to move dir");
        assert!(!base.join("src").exists());
        assert!(base.join("dst/inner/c.txt").is_file());
    }

    #[test]
    fn test_copy_tree_preserves_content() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::create_dir_all(base.join("src/deep/er")).expect("Failed to create dirs");
        fs::write(base.join("src/top.txt"), "top").expect("Failed to write file");
        fs::write(base.join("src/deep/er/low.txt"), "low").expect("Failed to write file");

        copy_tree(&base.join("src"), &base.join("copy")).expect("Failed to copy tree");

        assert_eq!(fs::read_to_string(base.join("copy/top.txt")).unwrap(), "top");
        assert_eq!(
            fs::read_to_string(base.join("copy/deep/er/low.txt")).unwrap(),
            "low"
        );
        assert!(base.join("src/top.txt").exists());
    }

    #[test]
    fn test_immediate_files_skips_dirs_and_dotfiles() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::write(base.join("b.txt"), "").expect("Failed to write file");
        fs::write(base.join("a.jpg"), "").expect("Failed to write file");
        fs::write(base.join(".hidden"), "").expect("Failed to write file");
        fs::create_dir(base.join("sub")).expect("Failed to create dir");

        let files = immediate_files(base).expect("Failed to list files");
        assert_eq!(files, vec![base.join("a.jpg"), base.join("b.txt")]);
    }

    #[cfg(unix)]
    #[test]
    fn test_immediate_files_follows_symlinks() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::create_dir(base.join("dir")).expect("Failed to create dir");
        fs::write(base.join("target.txt"), "t").expect("Failed to write file");
        std::os::unix::fs::symlink(base.join("target.txt"), base.join("dir/link.txt"))
            .expect("Failed to create symlink");
        std::os::unix::fs::symlink(base.join("dir"), base.join("dir/loop"))
            .expect("Failed to create symlink");

        let files = immediate_files(&base.join("dir")).expect("Failed to list files");
        assert_eq!(files, vec![base.join("dir/link.txt")]);
    }

    #[test]
    fn test_has_marker() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        assert!(!has_marker(temp_dir.path(), ".marker"));
        fs::write(temp_dir.path().join(".marker"), "").expect("Failed to write file");
        assert!(has_marker(temp_dir.path(), ".marker"));
    }
}

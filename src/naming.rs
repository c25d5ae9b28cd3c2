//! Collision-free file naming.
//!
//! When a destination already holds a file with the same name, the incoming file gets a
//! `" - dup (N)"` suffix in front of its extension. An existing suffix is rewritten rather
//! than stacked, so `report - dup (1).txt` colliding again becomes `report - dup (2).txt`.

use crate::error::{SortError, SortResult};
use regex::Regex;
use std::io;
use std::path::Path;
use xxhash_rust::xxh3::xxh3_64;

/// Default number of numbered names tried before falling back to a hashed name.
pub const DEFAULT_MAX_ATTEMPTS: usize = 1000;

const DUP_SUFFIX_PATTERN: &str = r"\s*-\sdup[\s()\d]+$";

/// Produces a free filename for a candidate destination path.
#[derive(Debug, Clone)]
pub struct NameResolver {
    dup_suffix: Regex,
    max_attempts: usize,
}

impl NameResolver {
    /// Creates a resolver that tries at most `max_attempts` numbered names.
    pub fn new(max_attempts: usize) -> Self {
        Self {
            dup_suffix: Regex::new(DUP_SUFFIX_PATTERN).expect("Invalid dup suffix pattern"),
            max_attempts: max_attempts.max(1),
        }
    }

    /// Maximum number of numbered names tried.
    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Returns a filename that does not exist in the candidate's directory.
    ///
    /// If nothing exists at `candidate`, its own file name is returned. Otherwise numbered
    /// names are tried in order; once `max_attempts` is exhausted the hex xxh3 digest of the
    /// conflicting name is used, keeping the extension.
    ///
    /// # Errors
    ///
    /// Returns `SortError::InvalidPath` if `candidate` has no file name, and
    /// `SortError::NameExhausted` if even the hashed name is taken.
    ///
    /// # Examples
    ///
    /// ```
    /// use dirsort::naming::NameResolver;
    ///
    /// let resolver = NameResolver::default();
    /// let free = resolver.resolve(std::path::Path::new("/no/such/dir/report.txt")).unwrap();
    /// assert_eq!(free, "report.txt");
    /// ```
    pub fn resolve(&self, candidate: &Path) -> SortResult<String> {
        let file_name = candidate
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| SortError::InvalidPath {
                path: candidate.to_path_buf(),
                source: io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"),
            })?;

        if !is_occupied(candidate) {
            return Ok(file_name);
        }

        let dir = candidate.parent().unwrap_or_else(|| Path::new(""));
        let (stem, extension) = split_name(&file_name);
        let base = self.dup_suffix.replace(&stem, "");

        for attempt in 1..=self.max_attempts {
            let name = format!("{} - dup ({}){}", base, attempt, extension);
            if !is_occupied(&dir.join(&name)) {
                return Ok(name);
            }
        }

        let hashed = format!("{}{}", hash_name(&file_name), extension);
        tracing::warn!(
            path = %candidate.display(),
            attempts = self.max_attempts,
            fallback = %hashed,
            "Duplicate numbering exhausted, using hashed name"
        );
        if is_occupied(&dir.join(&hashed)) {
            return Err(SortError::NameExhausted {
                path: candidate.to_path_buf(),
                attempts: self.max_attempts,
            });
        }
        Ok(hashed)
    }
}

impl Default for NameResolver {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS)
    }
}

/// Hex digest of the xxh3-64 hash of `name`.
pub fn hash_name(name: &str) -> String {
    format!("{:016x}", xxh3_64(name.as_bytes()))
}

/// Title-cases a group name: the first letter of every alphabetic run is upper-cased and
/// the rest lower-cased.
pub fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_word = false;
    for ch in name.chars() {
        if ch.is_alphabetic() {
            if in_word {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(ch);
            in_word = false;
        }
    }
    out
}

// Splits into (stem, ".ext"); a leading dot alone does not start an extension.
fn split_name(file_name: &str) -> (String, String) {
    let path = Path::new(file_name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_string());
    let extension = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    (stem, extension)
}

// Broken symlinks still occupy the name.
fn is_occupied(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}

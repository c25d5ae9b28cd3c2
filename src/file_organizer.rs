/// A sorting pass over one directory.
///
/// [`FileOrganizer`] looks at the immediate children of a source directory and hands each
/// one to the engine: files are moved into their category/extension folders, folders are
/// grouped. Entries the pass must not touch (hidden, filtered, already sorted, marked as a
/// custom group, or containing the destination) are skipped with a reason.
use crate::config::CompiledFilters;
use crate::context::SortContext;
use crate::entry::Entry;
use crate::error::{SortError, SortResult};
use crate::folder_entry::FolderEntry;
use crate::fs_ops;
use crate::history::{FileRecord, HISTORY_FILE_NAME, PathRecord, Tracker};
use indicatif::ProgressBar;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A single move performed (or planned, on dry runs) during a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    /// The path of the entry before the pass.
    pub original_path: PathBuf,
    /// The path of the entry after the pass.
    pub new_path: PathBuf,
    /// Category, group name or folder destination the entry was filed under.
    pub category: String,
    pub is_folder: bool,
}

/// Options for one pass.
#[derive(Debug, Clone)]
pub struct OrganizeOptions {
    /// Put files below a category folder (`CATEGORY/EXT`) instead of just `EXT`.
    pub group: bool,
    /// Route everything into this custom group instead of classifying.
    pub custom_group: Option<String>,
    /// Whether custom groups get an extension folder per file type.
    pub extension_folders: bool,
    /// Only touch entries whose name contains this text (case-insensitive).
    pub search: Option<String>,
    /// Leave folders alone.
    pub skip_folders: bool,
    /// Report what would happen without moving anything.
    pub dry_run: bool,
}

impl Default for OrganizeOptions {
    fn default() -> Self {
        Self {
            group: true,
            custom_group: None,
            extension_folders: true,
            search: None,
            skip_folders: false,
            dry_run: false,
        }
    }
}

/// Outcome of a pass.
#[derive(Debug, Default)]
pub struct OrganizeReport {
    pub operations: Vec<Operation>,
    /// Entries left untouched, with the reason.
    pub skipped: Vec<(PathBuf, String)>,
    /// Moves that were attempted but abandoned.
    pub failed: Vec<(PathBuf, String)>,
}

impl OrganizeReport {
    /// Number of operations per category.
    pub fn category_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for operation in &self.operations {
            *counts.entry(operation.category.clone()).or_insert(0) += 1;
        }
        counts
    }

    fn skip(&mut self, path: &Path, reason: &str) {
        tracing::debug!(path = %path.display(), reason, "Skipped");
        self.skipped.push((path.to_path_buf(), reason.to_string()));
    }
}

/// Runs sorting passes with a fixed context and filter set.
pub struct FileOrganizer<'a> {
    ctx: &'a SortContext,
    filters: &'a CompiledFilters,
    progress: Option<ProgressBar>,
}

impl<'a> FileOrganizer<'a> {
    pub fn new(ctx: &'a SortContext, filters: &'a CompiledFilters) -> Self {
        Self {
            ctx,
            filters,
            progress: None,
        }
    }

    /// Ticks `progress` once per child of the source directory.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Sorts the immediate children of `source` into `destination`.
    ///
    /// # Errors
    ///
    /// Returns an error if `source` is not a directory, cannot be listed, or if the
    /// engine fails on an entry for a reason other than a permission problem.
    pub fn organize(
        &self,
        source: &Path,
        destination: &Path,
        options: &OrganizeOptions,
        mut tracker: Option<&mut dyn Tracker>,
    ) -> SortResult<OrganizeReport> {
        if !source.is_dir() {
            return Err(SortError::NotADirectory(source.to_path_buf()));
        }
        let source = fs_ops::absolutize(source).map_err(|e| SortError::InvalidPath {
            path: source.to_path_buf(),
            source: e,
        })?;
        let destination = fs_ops::absolutize(destination).map_err(|e| SortError::InvalidPath {
            path: destination.to_path_buf(),
            source: e,
        })?;

        let children =
            fs_ops::immediate_children(&source).map_err(|e| SortError::ReadDirFailed {
                path: source.clone(),
                source: e,
            })?;
        if let Some(progress) = &self.progress {
            progress.set_length(children.len() as u64);
        }

        let search = options.search.as_ref().map(|s| s.to_lowercase());
        let mut report = OrganizeReport::default();

        for child in children {
            if let Some(progress) = &self.progress {
                progress.inc(1);
            }

            let name = child
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            if name == HISTORY_FILE_NAME || name == self.ctx.marker_name() {
                report.skip(&child, "managed by dirsort");
                continue;
            }
            if !self.filters.include_hidden() && self.ctx.hidden().has_hidden_attribute(&child) {
                report.skip(&child, "hidden");
                continue;
            }
            if !self.filters.should_include(&child) {
                report.skip(&child, "excluded by filters");
                continue;
            }
            if let Some(search) = &search
                && !name.to_lowercase().contains(search)
            {
                report.skip(&child, "does not match search");
                continue;
            }

            if child.is_dir() {
                if let Some(reason) = self.folder_skip_reason(&child, &destination, options) {
                    report.skip(&child, reason);
                    continue;
                }
            } else if let Some(tracker) = tracker.as_mut() {
                tracker.record_file(FileRecord::for_path(&child))?;
            }

            let entry = match &options.custom_group {
                Some(group) => Entry::custom(self.ctx, &child, group, options.extension_folders)?,
                None => Entry::from_path(self.ctx, &child)?,
            };
            let record = self.sort_entry(entry, &destination, options, &mut report)?;
            if let (Some(tracker), Some(record)) = (tracker.as_mut(), record) {
                tracker.record_path(record)?;
            }
        }

        if let Some(progress) = &self.progress {
            progress.finish_and_clear();
        }
        Ok(report)
    }

    fn folder_skip_reason(
        &self,
        folder: &Path,
        destination: &Path,
        options: &OrganizeOptions,
    ) -> Option<&'static str> {
        if options.skip_folders {
            Some("folders are skipped")
        } else if destination.starts_with(folder) {
            Some("contains the destination")
        } else if fs_ops::has_marker(folder, self.ctx.marker_name()) {
            Some("custom group folder")
        } else if FolderEntry::is_sorter_managed_path(folder, self.ctx.classifier()) {
            Some("already sorted")
        } else {
            None
        }
    }

    fn sort_entry(
        &self,
        entry: Entry,
        destination: &Path,
        options: &OrganizeOptions,
        report: &mut OrganizeReport,
    ) -> SortResult<Option<PathRecord>> {
        let original_path = entry.path().to_path_buf();
        let planned = entry.destination(self.ctx, destination, options.group)?;
        if planned == original_path {
            report.skip(&original_path, "already in place");
            return Ok(None);
        }

        let category = entry.category(self.ctx);
        let is_folder = matches!(entry, Entry::Folder(_));

        if options.dry_run {
            report.operations.push(Operation {
                original_path,
                new_path: planned,
                category,
                is_folder,
            });
            return Ok(None);
        }

        let moved = entry.relocate(self.ctx, destination, options.group)?;
        let accepted = moved.path() != original_path;
        let record = PathRecord::new(&original_path, moved.path(), accepted);
        if accepted {
            report.operations.push(Operation {
                original_path,
                new_path: moved.path().to_path_buf(),
                category,
                is_folder,
            });
        } else {
            report
                .failed
                .push((original_path, "permission denied".to_string()));
        }
        Ok(Some(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SorterConfig;
    use crate::history::JsonHistory;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (SortContext, CompiledFilters) {
        let config = SorterConfig::default();
        (
            config.sort_context().expect("Failed to build context"),
            config.compile_filters().expect("Failed to compile filters"),
        )
    }

    #[test]
    fn test_organize_files_in_place() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::write(base.join("a.jpg"), "a").expect("Failed to write file");
        fs::write(base.join("b.pdf"), "b").expect("Failed to write file");
        let (ctx, filters) = setup();

        let report = FileOrganizer::new(&ctx, &filters)
            .organize(base, base, &OrganizeOptions::default(), None)
            .expect("Failed to organize");

        assert_eq!(report.operations.len(), 2);
        assert!(base.join("IMAGE/JPG/a.jpg").is_file());
        assert!(base.join("DOCUMENT/PDF/b.pdf").is_file());
        assert_eq!(report.category_counts().get("IMAGE"), Some(&1));
    }

    #[test]
    fn test_second_pass_moves_nothing() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::write(base.join("a.jpg"), "a").expect("Failed to write file");
        fs::create_dir(base.join("misc")).expect("Failed to create directory");
        fs::write(base.join("misc/x.txt"), "x").expect("Failed to write file");
        let (ctx, filters) = setup();
        let organizer = FileOrganizer::new(&ctx, &filters);

        organizer
            .organize(base, base, &OrganizeOptions::default(), None)
            .expect("Failed to organize");
        let second = organizer
            .organize(base, base, &OrganizeOptions::default(), None)
            .expect("Failed to organize");

        assert!(second.operations.is_empty());
        assert!(second.failed.is_empty());
    }

    #[test]
    fn test_dry_run_changes_nothing() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::write(base.join("a.jpg"), "a").expect("Failed to write file");
        let (ctx, filters) = setup();
        let options = OrganizeOptions {
            dry_run: true,
            ..Default::default()
        };

        let report = FileOrganizer::new(&ctx, &filters)
            .organize(base, base, &options, None)
            .expect("Failed to organize");

        assert_eq!(report.operations.len(), 1);
        assert_eq!(report.operations[0].new_path, base.join("IMAGE/JPG/a.jpg"));
        assert!(base.join("a.jpg").is_file());
        assert!(!base.join("IMAGE").exists());
    }

    #[test]
    fn test_skips_hidden_and_marked_entries() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::write(base.join(".env"), "secret").expect("Failed to write file");
        fs::create_dir(base.join("Trip")).expect("Failed to create directory");
        fs::write(base.join("Trip").join(ctx_marker()), "").expect("Failed to write file");
        let (ctx, filters) = setup();

        let report = FileOrganizer::new(&ctx, &filters)
            .organize(base, base, &OrganizeOptions::default(), None)
            .expect("Failed to organize");

        assert!(report.operations.is_empty());
        assert_eq!(report.skipped.len(), 2);
        assert!(base.join(".env").is_file());
        assert!(base.join("Trip").is_dir());
    }

    fn ctx_marker() -> String {
        SortContext::default().marker_name().to_string()
    }

    /// Treats a fixed set of names as carrying the hidden attribute.
    #[derive(Debug)]
    struct AttributeHidden(Vec<&'static str>);

    impl crate::hidden::HiddenCheck for AttributeHidden {
        fn has_hidden_attribute(&self, path: &Path) -> bool {
            path.file_name()
                .map(|name| self.0.iter().any(|hidden| name == *hidden))
                .unwrap_or(false)
        }
    }

    #[test]
    fn test_hidden_attribute_is_respected() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::write(base.join("desktop.ini"), "d").expect("Failed to write file");
        fs::write(base.join("a.jpg"), "a").expect("Failed to write file");
        let ctx = SortContext::default()
            .with_hidden_check(Box::new(AttributeHidden(vec!["desktop.ini"])));
        let filters = SorterConfig::default()
            .compile_filters()
            .expect("Failed to compile filters");

        let report = FileOrganizer::new(&ctx, &filters)
            .organize(base, base, &OrganizeOptions::default(), None)
            .expect("Failed to organize");

        assert_eq!(report.operations.len(), 1);
        assert_eq!(report.skipped, vec![(base.join("desktop.ini"), "hidden".to_string())]);
        assert!(base.join("desktop.ini").is_file());
    }

    #[test]
    fn test_include_hidden_sorts_hidden_files() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::write(base.join(".profile.txt"), "p").expect("Failed to write file");
        let config = SorterConfig::from_toml("[filters]\ninclude_hidden = true\n")
            .expect("Failed to parse config");
        let ctx = config.sort_context().expect("Failed to build context");
        let filters = config.compile_filters().expect("Failed to compile filters");

        FileOrganizer::new(&ctx, &filters)
            .organize(base, base, &OrganizeOptions::default(), None)
            .expect("Failed to organize");

        assert!(base.join("DOCUMENT/TXT/.profile.txt").is_file());
    }

    #[test]
    fn test_history_and_marker_stay_put_with_include_hidden() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::write(base.join("a.jpg"), "a").expect("Failed to write file");
        fs::write(base.join(ctx_marker()), "").expect("Failed to write file");
        let config = SorterConfig::from_toml("[filters]\ninclude_hidden = true\n")
            .expect("Failed to parse config");
        let ctx = config.sort_context().expect("Failed to build context");
        let filters = config.compile_filters().expect("Failed to compile filters");
        let organizer = FileOrganizer::new(&ctx, &filters);

        for _ in 0..2 {
            let mut history = JsonHistory::load(base).expect("Failed to load history");
            organizer
                .organize(base, base, &OrganizeOptions::default(), Some(&mut history))
                .expect("Failed to organize");
            history.save().expect("Failed to save history");
        }

        assert!(JsonHistory::file_path(base).is_file());
        assert!(base.join(ctx_marker()).is_file());
        assert!(base.join("IMAGE/JPG/a.jpg").is_file());
        assert!(!base.join("CODE").exists());
        assert!(!base.join("UNDEFINED").exists());
        let history = JsonHistory::load(base).expect("Failed to load history");
        assert_eq!(history.paths().len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_permission_denied_moves_are_reported_as_failed() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let source = temp_dir.path().join("in");
        let destination = temp_dir.path().join("out");
        fs::create_dir(&source).expect("Failed to create directory");
        fs::write(source.join("a.txt"), "a").expect("Failed to write file");
        fs::write(source.join("b.txt"), "b").expect("Failed to write file");
        if !fs_ops::lock_dir(&source) {
            return;
        }
        let (ctx, filters) = setup();
        let mut history = JsonHistory::load(temp_dir.path()).expect("Failed to load history");

        let result = FileOrganizer::new(&ctx, &filters).organize(
            &source,
            &destination,
            &OrganizeOptions::default(),
            Some(&mut history),
        );
        fs_ops::unlock_dir(&source);
        let report = result.expect("Failed to organize");

        assert!(report.operations.is_empty());
        assert_eq!(
            report.failed,
            vec![
                (source.join("a.txt"), "permission denied".to_string()),
                (source.join("b.txt"), "permission denied".to_string()),
            ]
        );
        assert!(source.join("a.txt").is_file());
        assert!(source.join("b.txt").is_file());
        assert_eq!(history.paths().len(), 2);
        assert!(history.paths().iter().all(|record| !record.accepted));
    }

    #[test]
    fn test_custom_group_with_search() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::write(base.join("invoice_march.pdf"), "i").expect("Failed to write file");
        fs::write(base.join("Invoice_april.xlsx"), "i").expect("Failed to write file");
        fs::write(base.join("cat.png"), "c").expect("Failed to write file");
        let (ctx, filters) = setup();
        let options = OrganizeOptions {
            custom_group: Some("invoices".to_string()),
            search: Some("invoice".to_string()),
            ..Default::default()
        };

        let report = FileOrganizer::new(&ctx, &filters)
            .organize(base, base, &options, None)
            .expect("Failed to organize");

        assert_eq!(report.operations.len(), 2);
        assert!(base.join("Invoices/PDF/invoice_march.pdf").is_file());
        assert!(base.join("Invoices/XLSX/Invoice_april.xlsx").is_file());
        assert!(base.join("cat.png").is_file());
    }

    #[test]
    fn test_records_history() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::write(base.join("a.jpg"), "a").expect("Failed to write file");
        let (ctx, filters) = setup();
        let mut history = JsonHistory::load(base).expect("Failed to load history");

        FileOrganizer::new(&ctx, &filters)
            .organize(base, base, &OrganizeOptions::default(), Some(&mut history))
            .expect("Failed to organize");

        assert_eq!(history.files().len(), 1);
        let paths = history.paths_for("a.jpg");
        assert_eq!(paths.len(), 1);
        assert!(paths[0].accepted);
        assert_eq!(paths[0].destination, base.join("IMAGE/JPG/a.jpg"));
    }

    #[test]
    fn test_source_must_be_directory() {
        let (ctx, filters) = setup();
        let result = FileOrganizer::new(&ctx, &filters).organize(
            Path::new("/non/existent/path"),
            Path::new("/tmp"),
            &OrganizeOptions::default(),
            None,
        );
        assert!(matches!(result, Err(SortError::NotADirectory(_))));
    }
}

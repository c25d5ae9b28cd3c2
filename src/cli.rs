//! Command-line interface for dirsort.
//!
//! Parses arguments, loads the configuration, runs one sorting pass and reports the
//! outcome through [`OutputFormatter`].

use crate::config::SorterConfig;
use crate::file_organizer::{FileOrganizer, OrganizeOptions};
use crate::history::{JsonHistory, Tracker};
use crate::output::OutputFormatter;
use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(
    name = "dirsort",
    version,
    about = "Sort a directory into category and extension folders"
)]
pub struct Cli {
    /// Directory whose entries are sorted
    pub source: PathBuf,

    /// Root of the sorted tree (defaults to SOURCE)
    #[arg(short, long, value_name = "DIR")]
    pub destination: Option<PathBuf>,

    /// Sort files into EXT folders without a category level
    #[arg(long)]
    pub by_extension: bool,

    /// Put everything into the named custom group
    #[arg(short, long, value_name = "NAME")]
    pub group: Option<String>,

    /// With --group, do not create an extension folder per file type
    #[arg(long, requires = "group")]
    pub no_extension_folders: bool,

    /// Only sort entries whose name contains TEXT (case-insensitive)
    #[arg(short, long, value_name = "TEXT")]
    pub search: Option<String>,

    /// Leave folders where they are
    #[arg(long)]
    pub skip_folders: bool,

    /// Also sort hidden files and folders
    #[arg(long)]
    pub include_hidden: bool,

    /// Show what would be moved without moving anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Configuration file to use instead of the default lookup
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Do not write the history file
    #[arg(long)]
    pub no_history: bool,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    fn options(&self) -> OrganizeOptions {
        OrganizeOptions {
            group: !self.by_extension,
            custom_group: self.group.clone(),
            extension_folders: !self.no_extension_folders,
            search: self.search.clone(),
            skip_folders: self.skip_folders,
            dry_run: self.dry_run,
        }
    }

    /// The root of the sorted tree.
    pub fn destination(&self) -> PathBuf {
        self.destination
            .clone()
            .unwrap_or_else(|| self.source.clone())
    }
}

/// Runs one sorting pass as described by `cli`.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the source cannot be sorted, or the
/// history cannot be read or written.
pub fn run_cli(cli: &Cli) -> Result<()> {
    let mut config =
        SorterConfig::load(cli.config.as_deref()).context("Error loading configuration")?;
    if cli.include_hidden {
        config.filters.include_hidden = true;
    }
    let ctx = config.sort_context().context("Invalid engine configuration")?;
    let filters = config.compile_filters().context("Error compiling filters")?;

    let source = &cli.source;
    let destination = cli.destination();
    let options = cli.options();

    if options.dry_run {
        OutputFormatter::dry_run_notice(&format!("Analyzing {}", source.display()));
    } else {
        OutputFormatter::info(&format!(
            "Sorting {} into {}",
            source.display(),
            destination.display()
        ));
    }

    let mut history = if options.dry_run || cli.no_history {
        None
    } else {
        Some(JsonHistory::load(&destination).context("Error loading history")?)
    };

    let organizer = FileOrganizer::new(&ctx, &filters)
        .with_progress(OutputFormatter::create_progress_bar(0));
    let result = organizer.organize(
        source,
        &destination,
        &options,
        history.as_mut().map(|h| h as &mut dyn Tracker),
    );

    // Moves made before a failure are still recorded.
    let saved = match &history {
        Some(history) => save_history(history, &destination),
        None => Ok(()),
    };
    let report = result.with_context(|| format!("Error sorting {}", source.display()))?;
    saved?;

    if report.operations.is_empty() {
        OutputFormatter::info("Nothing to sort.");
    } else {
        OutputFormatter::operations(&report.operations, &destination, options.dry_run);
    }
    OutputFormatter::skipped(&report, cli.verbose > 0);
    OutputFormatter::summary_table(&report);

    if options.dry_run {
        OutputFormatter::success("Dry run complete. No files were modified.");
    } else if report.failed.is_empty() {
        OutputFormatter::success("Sorting complete!");
    } else {
        OutputFormatter::warning("Some entries could not be moved. Please review the list above.");
    }

    Ok(())
}

fn save_history(history: &JsonHistory, destination: &Path) -> Result<()> {
    fs::create_dir_all(destination)
        .with_context(|| format!("Error creating {}", destination.display()))?;
    history.save().context("Error saving history")
}

//! Operator-facing output.
//!
//! Everything the binary prints goes through [`OutputFormatter`] so symbols and colours
//! stay consistent. Engine diagnostics go through `tracing` instead.

use crate::file_organizer::{Operation, OrganizeReport};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

pub struct OutputFormatter;

impl OutputFormatter {
    fn status(symbol: ColoredString, message: &str) {
        println!("{} {}", symbol, message);
    }

    pub fn success(message: &str) {
        Self::status("✓".green().bold(), message);
    }

    /// Errors go to stderr.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red().bold(), message.red());
    }

    pub fn warning(message: &str) {
        Self::status("⚠".yellow(), message);
    }

    pub fn info(message: &str) {
        Self::status("›".cyan(), message);
    }

    pub fn header(title: &str) {
        println!("\n{}", title.bold().underline());
    }

    pub fn dry_run_notice(message: &str) {
        Self::status("[DRY RUN]".yellow().bold(), message);
    }

    /// Creates a progress bar over `total` directory entries.
    ///
    /// The bar draws to stderr and stays hidden when that is not a terminal.
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let bar = ProgressBar::new(total);
        if let Ok(style) =
            ProgressStyle::with_template("{spinner:.green} {wide_bar:.green/white} {pos}/{len} entries")
        {
            bar.set_style(style.progress_chars("=> "));
        }
        bar
    }

    /// Prints one line per move, with the destination relative to `root` when possible.
    pub fn operations(operations: &[Operation], root: &Path, dry_run: bool) {
        let arrow = if dry_run { "→ would move to" } else { "→" };
        for operation in operations {
            let name = operation
                .original_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let target = operation
                .new_path
                .strip_prefix(root)
                .unwrap_or(&operation.new_path);
            let name = if operation.is_folder {
                format!("{}/", name)
            } else {
                name
            };
            println!(" - {} {} {}", name, arrow.dimmed(), target.display());
        }
    }

    /// Lists skipped and failed entries with their reasons.
    pub fn skipped(report: &OrganizeReport, verbose: bool) {
        if verbose && !report.skipped.is_empty() {
            Self::header("SKIPPED");
            for (path, reason) in &report.skipped {
                println!(" - {} ({})", path.display(), reason.dimmed());
            }
        }
        for (path, reason) in &report.failed {
            Self::warning(&format!("Could not move {}: {}", path.display(), reason));
        }
    }

    /// Prints a table of moves per category.
    pub fn summary_table(report: &OrganizeReport) {
        Self::header("SUMMARY");

        let counts = report.category_counts();
        let total = report.operations.len();
        let width = counts.keys().map(String::len).max().unwrap_or(0).max(8);

        println!(
            "{:<width$} | {}",
            "Category".bold(),
            "Entries".bold(),
            width = width
        );
        println!("{}", "-".repeat(width + 12));
        for (category, count) in &counts {
            println!(
                "{:<width$} | {}",
                category,
                count.to_string().green(),
                width = width
            );
        }
        println!("{}", "-".repeat(width + 12));
        println!(
            "{:<width$} | {}  ({} skipped)",
            "Total".bold(),
            total.to_string().green().bold(),
            report.skipped.len(),
            width = width
        );
    }
}

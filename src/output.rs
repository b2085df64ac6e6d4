//! Output formatting and styling module.
//!
//! All user-facing CLI output goes through [`OutputFormatter`] so styling
//! stays consistent: colored status lines, a progress bar for the batch, and
//! the end-of-run summary.

use crate::file_organizer::RunStats;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;

/// Manages all CLI output with consistent styling and formatting.
///
/// This struct provides methods for:
/// - Status lines (success, error, warning, info)
/// - Dry-run notices
/// - A progress bar for the batch
/// - The run summary and per-destination table
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to display
    ///
    /// # Example
    ///
    /// ```no_run
    /// use tidyrules::output::OutputFormatter;
    /// OutputFormatter::success("Moved: a.png -> Images/");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark, on stderr.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to display
    ///
    /// # Example
    ///
    /// ```no_run
    /// use tidyrules::output::OutputFormatter;
    /// OutputFormatter::error("Error moving a.png: permission denied");
    /// ```
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to display
    ///
    /// # Example
    ///
    /// ```no_run
    /// use tidyrules::output::OutputFormatter;
    /// OutputFormatter::warning("No categories defined; every file will be skipped.");
    /// ```
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to display
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a message without styling.
    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints a section header.
    ///
    /// # Arguments
    ///
    /// * `header` - The header text
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Prints a dry-run notice message.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use tidyrules::output::OutputFormatter;
    /// OutputFormatter::dry_run_notice("Would move: a.png -> Images/a.png");
    /// ```
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Creates a progress bar for `total` files.
    ///
    /// Falls back to the default bar style if the template is rejected.
    ///
    /// # Arguments
    ///
    /// * `total` - Number of files in the batch
    ///
    /// # Example
    ///
    /// ```no_run
    /// use tidyrules::output::OutputFormatter;
    /// let pb = OutputFormatter::create_progress_bar(3);
    /// pb.inc(1);
    /// pb.finish_and_clear();
    /// ```
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        pb.set_style(style);
        pb
    }

    /// Prints the four run counters.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use tidyrules::file_organizer::RunStats;
    /// use tidyrules::output::OutputFormatter;
    ///
    /// let stats = RunStats { processed: 4, moved: 2, skipped: 1, errors: 1 };
    /// OutputFormatter::run_summary(&stats, false);
    /// ```
    pub fn run_summary(stats: &RunStats, dry_run: bool) {
        Self::header(if dry_run { "SUMMARY (dry run)" } else { "SUMMARY" });
        println!("  {:<10} {}", "Processed:", stats.processed);
        println!("  {:<10} {}", "Moved:", stats.moved.to_string().green());
        println!("  {:<10} {}", "Skipped:", stats.skipped.to_string().yellow());
        let errors = if stats.errors > 0 {
            stats.errors.to_string().red().bold()
        } else {
            stats.errors.to_string().normal()
        };
        println!("  {:<10} {}", "Errors:", errors);
    }

    /// Prints a table of moved files per destination folder.
    ///
    /// Nothing is printed when no file was moved.
    ///
    /// # Arguments
    ///
    /// * `category_counts` - Files per destination folder, relative to the organized directory
    /// * `total_files` - Total shown in the last row
    pub fn summary_table(category_counts: &HashMap<String, usize>, total_files: usize) {
        if category_counts.is_empty() {
            return;
        }
        Self::header("BY DESTINATION");

        // Sort for consistent output
        let mut categories: Vec<_> = category_counts.iter().collect();
        categories.sort_by_key(|&(name, _)| name);

        let max_category_len = categories
            .iter()
            .map(|(name, _)| name.len())
            .max()
            .unwrap_or(0)
            .max(11); // "Destination"

        println!(
            "{:<width$} | {}",
            "Destination".bold(),
            "Files".bold(),
            width = max_category_len
        );
        println!("{}", "-".repeat(max_category_len + 10));

        for (category, count) in &categories {
            println!(
                "{:<width$} | {} {}",
                category,
                count.to_string().green(),
                plural(**count),
                width = max_category_len
            );
        }

        println!("{}", "-".repeat(max_category_len + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total_files.to_string().green().bold(),
            plural(total_files),
            width = max_category_len
        );
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}

//! Workspace cleanup command
//!
//! Removes test artifacts and caches so the next run starts from a
//! clean slate. Required targets abort the command when they cannot be
//! removed; optional ones are reported and skipped.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use tracing::warn;

#[derive(Args)]
pub struct CleanArgs {
    /// Directory the suite was run from
    #[arg(long, default_value = ".")]
    pub root: PathBuf,
}

struct CleanupTarget {
    path: &'static str,
    description: &'static str,
    optional: bool,
}

const CLEANUP_TARGETS: &[CleanupTarget] = &[
    CleanupTarget {
        path: "test-results",
        description: "Test run artifacts",
        optional: false,
    },
    CleanupTarget {
        path: "downloads",
        description: "Downloaded test files",
        optional: true,
    },
    CleanupTarget {
        path: "playwright-report",
        description: "Stale HTML report output",
        optional: true,
    },
];

#[derive(Debug, PartialEq)]
enum Outcome {
    Cleaned,
    NotFound,
    Skipped,
}

impl Outcome {
    fn label(&self) -> &'static str {
        match self {
            Outcome::Cleaned => "cleaned",
            Outcome::NotFound => "not found",
            Outcome::Skipped => "skipped",
        }
    }
}

pub async fn execute(args: CleanArgs) -> anyhow::Result<()> {
    println!("🧹 Cleaning test artifacts under {}", args.root.display());
    println!();

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Target", "Description", "Status"]);

    let mut cleaned = 0;
    let mut not_found = 0;
    let mut skipped = 0;

    for target in CLEANUP_TARGETS {
        let outcome = remove_target(&args.root, target)?;
        match outcome {
            Outcome::Cleaned => cleaned += 1,
            Outcome::NotFound => not_found += 1,
            Outcome::Skipped => skipped += 1,
        }
        table.add_row(vec![target.path, target.description, outcome.label()]);
    }

    println!("{table}");
    println!();
    println!("📊 Cleanup Summary:");
    println!("   {} {}", "✓ Cleaned:".green(), cleaned);
    println!("   {} {}", "○ Not found:".dimmed(), not_found);
    if skipped > 0 {
        println!("   {} {}", "⚠ Skipped:".yellow(), skipped);
    }
    println!();
    println!("✨ Cleanup complete!");

    Ok(())
}

fn remove_target(root: &Path, target: &CleanupTarget) -> anyhow::Result<Outcome> {
    let full_path = root.join(target.path);
    if !full_path.exists() {
        return Ok(Outcome::NotFound);
    }

    let result = if full_path.is_dir() {
        fs::remove_dir_all(&full_path)
    } else {
        fs::remove_file(&full_path)
    };

    match result {
        Ok(()) => Ok(Outcome::Cleaned),
        Err(e) if target.optional => {
            warn!("Skipped {}: {}", full_path.display(), e);
            Ok(Outcome::Skipped)
        }
        Err(e) => Err(e).with_context(|| format!("Failed to remove {}", full_path.display())),
    }
}

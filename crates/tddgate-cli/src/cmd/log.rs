use crate::context::{enforcement_log, Overrides};
use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use std::path::Path;
use tddgate_core::log::summarize;
use tddgate_core::paths;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum LogSubcommand {
    /// Show the most recent decisions
    Tail {
        /// Number of entries to show
        #[arg(short = 'n', long, default_value = "20")]
        lines: usize,
    },

    /// Aggregate decisions by action and reason
    Summary {
        /// Number of most-blocked files to list
        #[arg(long, default_value = "10")]
        top: usize,
    },

    /// Move the active log to `<log>.old` now
    Rotate,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(
    root: &Path,
    overrides: &Overrides,
    subcmd: LogSubcommand,
    json: bool,
) -> anyhow::Result<()> {
    match subcmd {
        LogSubcommand::Tail { lines } => tail(root, overrides, lines, json),
        LogSubcommand::Summary { top } => summary(root, overrides, top, json),
        LogSubcommand::Rotate => rotate(root, overrides),
    }
}

// ---------------------------------------------------------------------------
// tail
// ---------------------------------------------------------------------------

fn tail(root: &Path, overrides: &Overrides, lines: usize, json: bool) -> anyhow::Result<()> {
    let log = enforcement_log(root, overrides)?;
    let (entries, _) = log
        .read_entries()
        .with_context(|| format!("failed to read {}", log.path().display()))?;
    let start = entries.len().saturating_sub(lines);
    let recent = &entries[start..];

    if json {
        return print_json(&recent);
    }
    if recent.is_empty() {
        println!("No entries in {}.", log.path().display());
        return Ok(());
    }
    for entry in recent {
        println!("{}", entry.to_line());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// summary
// ---------------------------------------------------------------------------

fn summary(root: &Path, overrides: &Overrides, top: usize, json: bool) -> anyhow::Result<()> {
    let log = enforcement_log(root, overrides)?;
    let (entries, malformed) = log
        .read_entries()
        .with_context(|| format!("failed to read {}", log.path().display()))?;
    let summary = summarize(&entries, malformed, top);

    if json {
        return print_json(&summary);
    }

    println!("Log:       {}", log.path().display());
    println!("Decisions: {}", summary.total);
    println!("Allowed:   {}", summary.allowed);
    println!("Blocked:   {}", summary.blocked);
    if summary.malformed > 0 {
        println!("Malformed: {}", summary.malformed);
    }
    if let (Some(first), Some(last)) = (summary.first, summary.last) {
        println!("Span:      {first} .. {last}");
    }
    if !summary.by_reason.is_empty() {
        println!();
        print_table(
            &["REASON", "COUNT"],
            summary
                .by_reason
                .iter()
                .map(|(reason, count)| vec![reason.to_string(), count.to_string()])
                .collect(),
        );
    }
    if !summary.top_blocked.is_empty() {
        println!();
        print_table(
            &["MOST BLOCKED", "COUNT"],
            summary
                .top_blocked
                .iter()
                .map(|b| vec![b.file_path.clone(), b.count.to_string()])
                .collect(),
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// rotate
// ---------------------------------------------------------------------------

fn rotate(root: &Path, overrides: &Overrides) -> anyhow::Result<()> {
    let log = enforcement_log(root, overrides)?;
    let rotated = log
        .rotate_now()
        .with_context(|| format!("failed to rotate {}", log.path().display()))?;
    if rotated {
        println!(
            "Rotated {} to {}.",
            log.path().display(),
            paths::rotated_path(log.path()).display()
        );
    } else {
        println!("Nothing to rotate: {} does not exist.", log.path().display());
    }
    Ok(())
}

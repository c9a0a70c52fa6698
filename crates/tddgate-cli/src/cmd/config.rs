use crate::context::{load_config, Overrides};
use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use std::path::Path;
use tddgate_core::config::{GuardConfig, WarnLevel};

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Print the effective configuration (defaults, file, and overrides merged)
    Show,

    /// Validate the config for common mistakes
    Validate,

    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(
    root: &Path,
    overrides: &Overrides,
    subcmd: ConfigSubcommand,
    json: bool,
) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Show => show(root, overrides, json),
        ConfigSubcommand::Validate => validate(root, overrides, json),
        ConfigSubcommand::Init { force } => init(root, overrides, force),
    }
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

fn show(root: &Path, overrides: &Overrides, json: bool) -> anyhow::Result<()> {
    let config = load_config(root, overrides)?;
    if json {
        let value = serde_json::json!({
            "config_file": overrides.config_path(root),
            "log_path": config.log.resolve_path(root),
            "config": config,
        });
        return print_json(&value);
    }
    println!("# config file: {}", overrides.config_path(root).display());
    println!("# log file:    {}", config.log.resolve_path(root).display());
    print!("{}", serde_yaml::to_string(&config)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

fn validate(root: &Path, overrides: &Overrides, json: bool) -> anyhow::Result<()> {
    let config = load_config(root, overrides)?;
    let warnings = config.validate();

    if json {
        let value = serde_json::json!({
            "warnings": warnings,
        });
        print_json(&value)?;
    } else if warnings.is_empty() {
        println!("Config is valid. No warnings.");
    } else {
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("[{prefix}] {}", w.message);
        }
    }

    let has_errors = warnings.iter().any(|w| w.level == WarnLevel::Error);
    if has_errors {
        anyhow::bail!("config validation found errors");
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// init
// ---------------------------------------------------------------------------

fn init(root: &Path, overrides: &Overrides, force: bool) -> anyhow::Result<()> {
    let path = overrides.config_path(root);
    GuardConfig::init_at(&path, force)
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("Wrote default config to {}.", path.display());
    Ok(())
}

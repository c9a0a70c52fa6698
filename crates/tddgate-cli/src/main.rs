mod cmd;
mod context;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{config::ConfigSubcommand, log::LogSubcommand};
use context::Overrides;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "tddgate",
    about = "Test-first gate for AI coding assistants: blocks edits to implementation files that have no tests",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: $CLAUDE_PROJECT_DIR, then the working directory)
    #[arg(long, global = true, env = "TDDGATE_ROOT")]
    root: Option<PathBuf>,

    /// Config file (default: <root>/.claude/tddgate.yaml)
    #[arg(long, global = true, env = "TDDGATE_CONFIG")]
    config: Option<PathBuf>,

    /// Enforcement log destination (overrides log.path)
    #[arg(long, global = true, env = "TDDGATE_LOG")]
    log_path: Option<PathBuf>,

    /// Rotate the enforcement log past this size (overrides log.max_size_bytes)
    #[arg(long, global = true, env = "TDDGATE_MAX_LOG_BYTES")]
    max_log_bytes: Option<u64>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Print debug diagnostics to stderr
    #[arg(long, global = true, short = 'v')]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pre-tool-use hook: read the payload from stdin, exit 1 to block
    Hook,

    /// Evaluate an edit to a path as if the host had requested it
    Check {
        /// File the edit would modify
        path: String,

        /// Tool name to evaluate as
        #[arg(long, default_value = "Write")]
        tool: String,

        /// Do not append the decision to the enforcement log
        #[arg(long)]
        no_log: bool,
    },

    /// Show how paths are classified (no filesystem access)
    Classify {
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// List the candidate test files for an implementation file and their status
    Candidates { path: String },

    /// Inspect, validate, or scaffold the configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Read, summarize, or rotate the enforcement log
    Log {
        #[command(subcommand)]
        subcommand: LogSubcommand,
    },
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // Hook calls may only exit 0 or 1.
        Err(e) if e.use_stderr() && is_hook_invocation() => {
            init_tracing(false);
            let error = e.to_string();
            tracing::warn!(error = %error.trim_end(), "unusable hook arguments, reading env only");
            let root = root::resolve_root(Overrides::root_from_env().as_deref());
            let code = cmd::hook::run(&root, &Overrides::from_env());
            std::process::exit(code);
        }
        Err(e) => e.exit(),
    };

    init_tracing(cli.verbose);

    let root = root::resolve_root(cli.root.as_deref());
    let overrides = Overrides {
        config: cli.config,
        log_path: cli.log_path,
        max_log_bytes: cli.max_log_bytes,
    };

    let result = match cli.command {
        Commands::Hook => Ok(cmd::hook::run(&root, &overrides)),
        Commands::Check {
            path,
            tool,
            no_log,
        } => cmd::check::run(&root, &overrides, &path, &tool, no_log, cli.json),
        Commands::Classify { paths } => {
            cmd::classify::run(&root, &overrides, &paths, cli.json).map(|()| 0)
        }
        Commands::Candidates { path } => {
            cmd::candidates::run(&root, &overrides, &path, cli.json).map(|()| 0)
        }
        Commands::Config { subcommand } => {
            cmd::config::run(&root, &overrides, subcommand, cli.json).map(|()| 0)
        }
        Commands::Log { subcommand } => {
            cmd::log::run(&root, &overrides, subcommand, cli.json).map(|()| 0)
        }
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            // Print the full error chain (anyhow's alternate Display)
            eprintln!("error: {e:#}");
            std::process::exit(1);
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    // stdout belongs to the host protocol; diagnostics go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn is_hook_invocation() -> bool {
    std::env::args_os().skip(1).any(|arg| arg == "hook")
}

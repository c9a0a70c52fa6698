use anyhow::Context;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tddgate_core::config::GuardConfig;
use tddgate_core::gate::Gate;
use tddgate_core::log::EnforcementLog;
use tddgate_core::paths;

pub const ROOT_ENV: &str = "TDDGATE_ROOT";
pub const CONFIG_ENV: &str = "TDDGATE_CONFIG";
pub const LOG_ENV: &str = "TDDGATE_LOG";
pub const MAX_LOG_BYTES_ENV: &str = "TDDGATE_MAX_LOG_BYTES";

/// Global flags / env vars layered over the config file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub config: Option<PathBuf>,
    pub log_path: Option<PathBuf>,
    pub max_log_bytes: Option<u64>,
}

impl Overrides {
    /// Overrides read straight from the environment, for a hook whose command
    /// line could not be parsed. Unusable values are dropped with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var_os(key))
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<OsString>) -> Self {
        let path = |key: &str| lookup(key).filter(|v| !v.is_empty()).map(PathBuf::from);
        let max_log_bytes = lookup(MAX_LOG_BYTES_ENV).and_then(|raw| {
            let raw = raw.to_string_lossy().into_owned();
            match raw.trim().parse::<u64>() {
                Ok(n) => Some(n),
                Err(_) => {
                    tracing::warn!(value = %raw, "ignoring invalid {MAX_LOG_BYTES_ENV}");
                    None
                }
            }
        });
        Self {
            config: path(CONFIG_ENV),
            log_path: path(LOG_ENV),
            max_log_bytes,
        }
    }

    pub fn root_from_env() -> Option<PathBuf> {
        std::env::var_os(ROOT_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }

    pub fn config_path(&self, root: &Path) -> PathBuf {
        match &self.config {
            Some(p) if p.is_absolute() => p.clone(),
            Some(p) => root.join(p),
            None => paths::config_path(root),
        }
    }

    pub fn apply(&self, config: &mut GuardConfig) {
        if let Some(p) = &self.log_path {
            config.log.path = Some(p.clone());
        }
        if let Some(n) = self.max_log_bytes {
            config.log.max_size_bytes = n;
        }
    }
}

/// Defaults ← config file ← overrides.
pub fn load_config(root: &Path, overrides: &Overrides) -> anyhow::Result<GuardConfig> {
    let path = overrides.config_path(root);
    let mut config = GuardConfig::load_from(&path)
        .with_context(|| format!("failed to load config from {}", path.display()))?;
    overrides.apply(&mut config);
    Ok(config)
}

pub fn build_gate(root: &Path, overrides: &Overrides) -> anyhow::Result<Gate> {
    let config = load_config(root, overrides)?;
    Gate::from_config(&config, root).context("invalid test file patterns in config")
}

pub fn enforcement_log(root: &Path, overrides: &Overrides) -> anyhow::Result<EnforcementLog> {
    let config = load_config(root, overrides)?;
    Ok(EnforcementLog::new(
        config.log.resolve_path(root),
        config.log.max_size_bytes,
    ))
}

/// Gate for the hook path: any config problem falls back to built-in
/// defaults (with overrides still applied) instead of failing the hook.
pub fn build_gate_or_default(root: &Path, overrides: &Overrides) -> Gate {
    match build_gate(root, overrides) {
        Ok(gate) => gate,
        Err(e) => {
            let error = format!("{e:#}");
            tracing::warn!(%error, "using default tddgate config");
            let mut config = GuardConfig::default();
            overrides.apply(&mut config);
            let log = EnforcementLog::new(
                config.log.resolve_path(root),
                config.log.max_size_bytes,
            );
            Gate::with_defaults(root, log)
        }
    }
}

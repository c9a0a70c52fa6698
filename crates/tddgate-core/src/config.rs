use crate::candidates::{template_placeholders, PLACEHOLDERS};
use crate::classifier::glob_to_regex;
use crate::error::{GuardError, Result};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// TestFileConfig
// ---------------------------------------------------------------------------

/// Patterns that mark a path as a test file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestFileConfig {
    /// Globs matched against the file name (`*` and `?` never cross `/`).
    #[serde(default = "default_test_file_names")]
    pub file_names: Vec<String>,
    /// Directory names; any parent component equal to one of these marks a test.
    #[serde(default = "default_test_directories")]
    pub directories: Vec<String>,
}

fn default_test_file_names() -> Vec<String> {
    [
        "test_*.py",
        "*_test.py",
        "*.test.ts",
        "*.spec.ts",
        "*spec*.js",
        "*test*.js",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_test_directories() -> Vec<String> {
    vec!["tests".to_string()]
}

impl Default for TestFileConfig {
    fn default() -> Self {
        Self {
            file_names: default_test_file_names(),
            directories: default_test_directories(),
        }
    }
}

// ---------------------------------------------------------------------------
// Convention
// ---------------------------------------------------------------------------

/// Candidate test locations for a family of implementation extensions.
///
/// Templates understand `{dir}`, `{stem}`, `{ext}` and `{root}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Convention {
    pub extensions: Vec<String>,
    pub candidates: Vec<String>,
}

/// Built-in conventions, consulted after any configured ones.
pub fn default_conventions() -> Vec<Convention> {
    vec![
        Convention {
            extensions: vec!["py".to_string()],
            candidates: vec![
                "{dir}/test_{stem}.py".to_string(),
                "{dir}/tests/test_{stem}.py".to_string(),
                "{dir}/../tests/test_{stem}.py".to_string(),
                "{root}/tests/test_{stem}.py".to_string(),
            ],
        },
        Convention {
            extensions: vec!["js".to_string(), "ts".to_string()],
            candidates: vec![
                "{dir}/{stem}.test.{ext}".to_string(),
                "{dir}/{stem}.spec.{ext}".to_string(),
                "{dir}/tests/{stem}.test.{ext}".to_string(),
                "{dir}/../tests/{stem}.test.{ext}".to_string(),
            ],
        },
    ]
}

// ---------------------------------------------------------------------------
// LogConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Enforcement log destination. `None` means [`paths::default_log_path`].
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Rotate once the active file grows past this many bytes.
    #[serde(default = "default_max_size_bytes")]
    pub max_size_bytes: u64,
}

pub const DEFAULT_MAX_LOG_BYTES: u64 = 1024 * 1024;

fn default_max_size_bytes() -> u64 {
    DEFAULT_MAX_LOG_BYTES
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            path: None,
            max_size_bytes: default_max_size_bytes(),
        }
    }
}

impl LogConfig {
    pub fn resolve_path(&self, root: &Path) -> PathBuf {
        match &self.path {
            Some(p) if p.is_absolute() => p.clone(),
            Some(p) => root.join(p),
            None => paths::default_log_path(root),
        }
    }
}

// ---------------------------------------------------------------------------
// GuardConfig (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    /// Host tool names that modify files and are therefore gated.
    #[serde(default = "default_edit_tools")]
    pub edit_tools: Vec<String>,
    #[serde(default)]
    pub test_files: TestFileConfig,
    #[serde(default = "default_config_extensions")]
    pub config_extensions: Vec<String>,
    #[serde(default = "default_implementation_extensions")]
    pub implementation_extensions: Vec<String>,
    /// Extra conventions. Checked before the built-in ones, so an entry here
    /// overrides the defaults for the extensions it lists.
    #[serde(default)]
    pub conventions: Vec<Convention>,
    /// Drop the built-in conventions and use only `conventions`.
    #[serde(default)]
    pub replace_default_conventions: bool,
    #[serde(default)]
    pub log: LogConfig,
}

fn default_version() -> u32 {
    1
}

fn default_edit_tools() -> Vec<String> {
    ["Write", "Edit", "MultiEdit"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_config_extensions() -> Vec<String> {
    ["md", "txt", "json", "yaml", "yml", "toml", "cfg", "ini"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_implementation_extensions() -> Vec<String> {
    ["py", "js", "ts", "go", "rs", "php"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            edit_tools: default_edit_tools(),
            test_files: TestFileConfig::default(),
            config_extensions: default_config_extensions(),
            implementation_extensions: default_implementation_extensions(),
            conventions: Vec::new(),
            replace_default_conventions: false,
            log: LogConfig::default(),
        }
    }
}

impl GuardConfig {
    /// Configured conventions followed by the built-in ones, unless
    /// `replace_default_conventions` is set. First match per extension wins.
    pub fn effective_conventions(&self) -> Vec<Convention> {
        let mut all = self.conventions.clone();
        if !self.replace_default_conventions {
            all.extend(default_conventions());
        }
        all
    }

    /// Load a config file, falling back to defaults when it is missing or
    /// empty.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)?;
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        let cfg: GuardConfig = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    /// Write the default config to `path`. Refuses to overwrite unless `force`.
    pub fn init_at(path: &Path, force: bool) -> Result<Self> {
        let cfg = Self::default();
        let data = serde_yaml::to_string(&cfg)?;
        if force {
            crate::io::atomic_write(path, data.as_bytes())?;
        } else if !crate::io::write_if_missing(path, data.as_bytes())? {
            return Err(GuardError::ConfigExists(path.display().to_string()));
        }
        Ok(cfg)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.edit_tools.is_empty() {
            warnings.push(warn("edit_tools is empty: no edit will ever be gated".to_string()));
        }

        for pattern in &self.test_files.file_names {
            if let Err(e) = glob_to_regex(pattern) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: e.to_string(),
                });
            }
        }

        let config_exts: BTreeSet<&str> =
            self.config_extensions.iter().map(String::as_str).collect();
        for ext in &self.implementation_extensions {
            if config_exts.contains(ext.as_str()) {
                warnings.push(warn(format!(
                    "extension '{ext}' is listed as both config and implementation; \
                     config wins"
                )));
            }
        }

        let conventions = self.effective_conventions();
        let covered: BTreeSet<&str> = conventions
            .iter()
            .flat_map(|c| c.extensions.iter().map(String::as_str))
            .collect();
        for ext in &self.implementation_extensions {
            if !covered.contains(ext.as_str()) {
                warnings.push(warn(format!(
                    "implementation extension '{ext}' has no test convention: \
                     every .{ext} edit will be blocked"
                )));
            }
        }

        for convention in &conventions {
            if convention.candidates.is_empty() {
                warnings.push(warn(format!(
                    "convention for [{}] lists no candidates",
                    convention.extensions.join(", ")
                )));
            }
            for template in &convention.candidates {
                for placeholder in template_placeholders(template) {
                    if !PLACEHOLDERS.contains(&placeholder) {
                        warnings.push(ConfigWarning {
                            level: WarnLevel::Error,
                            message: format!(
                                "unknown placeholder '{{{placeholder}}}' in candidate '{template}'"
                            ),
                        });
                    }
                }
            }
        }

        if self.log.max_size_bytes == 0 {
            warnings.push(warn(
                "log.max_size_bytes is 0: the log rotates on every write".to_string(),
            ));
        }

        warnings
    }
}

fn warn(message: String) -> ConfigWarning {
    ConfigWarning {
        level: WarnLevel::Warning,
        message,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

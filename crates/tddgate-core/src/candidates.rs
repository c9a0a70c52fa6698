//! Candidate test-file derivation.
//!
//! Each [`Convention`] maps a set of implementation extensions to path
//! templates. Expanding the templates for a file yields the places where its
//! tests are expected to live; the gate is satisfied if any of them holds a
//! non-empty regular file.

use crate::classifier::extension_of;
use crate::config::{Convention, GuardConfig};
use crate::error::{GuardError, Result};
use crate::paths::{display_relative, normalize};
use crate::types::TestStatus;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Placeholders understood by candidate templates.
pub const PLACEHOLDERS: &[&str] = &["dir", "stem", "ext", "root"];

/// Names of every `{...}` placeholder in `template`, in order.
pub fn template_placeholders(template: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                out.push(&after[..close]);
                rest = &after[close + 1..];
            }
            None => break,
        }
    }
    out
}

/// Values substituted into a template.
#[derive(Debug, Clone)]
pub struct TemplateVars {
    pub dir: String,
    pub stem: String,
    pub ext: String,
    pub root: String,
}

impl TemplateVars {
    fn get(&self, name: &str) -> Option<&str> {
        match name {
            "dir" => Some(&self.dir),
            "stem" => Some(&self.stem),
            "ext" => Some(&self.ext),
            "root" => Some(&self.root),
            _ => None,
        }
    }
}

/// Single-pass substitution; substituted values are never re-scanned.
pub fn expand(template: &str, vars: &TemplateVars) -> Result<String> {
    let mut out = String::with_capacity(template.len() + vars.dir.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            return Ok(out);
        };
        let name = &after[..close];
        let value = vars.get(name).ok_or_else(|| GuardError::InvalidTemplate {
            template: template.to_string(),
            placeholder: name.to_string(),
        })?;
        out.push_str(value);
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

// ---------------------------------------------------------------------------
// Candidate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct Candidate {
    pub path: PathBuf,
    /// `path` relative to the project root when it lives underneath it.
    pub display: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProbedCandidate {
    #[serde(flatten)]
    pub candidate: Candidate,
    pub status: TestStatus,
}

/// Inspect one candidate. Any metadata error counts as missing.
pub fn probe(path: &Path) -> TestStatus {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() && meta.len() > 0 => TestStatus::Present,
        Ok(meta) if meta.is_file() => TestStatus::Empty,
        Ok(_) => TestStatus::Missing,
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::debug!(path = %path.display(), error = %e, "candidate unreadable");
            }
            TestStatus::Missing
        }
    }
}

// ---------------------------------------------------------------------------
// Conventions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct Conventions {
    conventions: Vec<Convention>,
}

impl Conventions {
    pub fn new(conventions: Vec<Convention>) -> Self {
        Self { conventions }
    }

    pub fn from_config(config: &GuardConfig) -> Self {
        Self::new(config.effective_conventions())
    }

    /// Templates of the first convention that covers `ext`.
    pub fn templates_for(&self, ext: &str) -> Option<&[String]> {
        self.conventions
            .iter()
            .find(|c| c.extensions.iter().any(|e| e == ext))
            .map(|c| c.candidates.as_slice())
    }

    /// Candidate test paths for `file_path`, normalised and de-duplicated in
    /// template order. Relative inputs resolve against `root`. Templates with
    /// unknown placeholders are skipped.
    pub fn candidates(&self, file_path: &str, root: &Path) -> Vec<Candidate> {
        let file = Path::new(file_path);
        let Some(ext) = extension_of(file) else {
            return Vec::new();
        };
        let Some(templates) = self.templates_for(ext) else {
            return Vec::new();
        };
        let Some(stem) = file.file_stem().and_then(|s| s.to_str()) else {
            return Vec::new();
        };

        let abs = normalize(&root.join(file));
        let dir = abs.parent().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
        let vars = TemplateVars {
            dir: dir.display().to_string(),
            stem: stem.to_string(),
            ext: ext.to_string(),
            root: root.display().to_string(),
        };

        let mut out: Vec<Candidate> = Vec::with_capacity(templates.len());
        for template in templates {
            let expanded = match expand(template, &vars) {
                Ok(s) => s,
                Err(e) => {
                    tracing::warn!(error = %e, "skipping candidate template");
                    continue;
                }
            };
            let path = normalize(&root.join(expanded));
            if out.iter().any(|c| c.path == path) {
                continue;
            }
            out.push(Candidate {
                display: display_relative(&path, root),
                path,
            });
        }
        out
    }

    /// Candidates with their on-disk status.
    pub fn probe_all(&self, file_path: &str, root: &Path) -> Vec<ProbedCandidate> {
        self.candidates(file_path, root)
            .into_iter()
            .map(|candidate| ProbedCandidate {
                status: probe(&candidate.path),
                candidate,
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

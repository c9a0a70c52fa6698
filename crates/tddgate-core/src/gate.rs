use crate::candidates::Conventions;
use crate::classifier::{extension_of, Classifier};
use crate::config::GuardConfig;
use crate::error::Result;
use crate::log::{EnforcementLog, LogEntry};
use crate::paths;
use crate::request::{salvage_path, EditRequest};
use crate::types::{Action, FileClass, Reason};
use serde::Serialize;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// EnforcementDecision
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnforcementDecision {
    pub action: Action,
    pub reason: Reason,
    pub file_path: String,
    /// `None` when the gate decided before classifying (non-edit tool or
    /// unusable payload).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<FileClass>,
    /// Candidate test paths checked for an implementation file, relative to
    /// the project root where possible.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub expected: Vec<String>,
}

impl EnforcementDecision {
    fn new(reason: Reason, file_path: impl Into<String>, class: Option<FileClass>) -> Self {
        Self {
            action: reason.action(),
            reason,
            file_path: file_path.into(),
            class,
            expected: Vec::new(),
        }
    }

    pub fn is_blocked(&self) -> bool {
        self.action == Action::Block
    }

    pub fn log_entry(&self) -> LogEntry {
        LogEntry::now(self.action, self.reason, self.file_path.clone())
    }

    /// Explanation printed to the host when an edit is blocked.
    pub fn block_message(&self) -> Option<String> {
        if !self.is_blocked() {
            return None;
        }
        let mut msg = format!(
            "TDD violation: cannot modify implementation file '{}' before it has tests.\n",
            self.file_path
        );
        if self.expected.is_empty() {
            let ext = extension_of(Path::new(&self.file_path)).unwrap_or("");
            msg.push_str(&format!(
                "No test convention is configured for .{ext} files; add one under \
                 `conventions` in {}.\n",
                paths::CONFIG_FILE
            ));
        } else {
            msg.push_str(&format!(
                "Expected test files: {} (or similar)\n",
                self.expected.join(", ")
            ));
            msg.push_str("Write a failing, non-empty test first, then retry the edit.\n");
        }
        Some(msg)
    }
}

// ---------------------------------------------------------------------------
// Gate
// ---------------------------------------------------------------------------

/// The TDD enforcement gate: one decision and one log line per request.
#[derive(Debug, Clone)]
pub struct Gate {
    edit_tools: Vec<String>,
    classifier: Classifier,
    conventions: Conventions,
    root: PathBuf,
    log: EnforcementLog,
}

impl Gate {
    pub fn new(config: &GuardConfig, root: impl Into<PathBuf>, log: EnforcementLog) -> Result<Self> {
        Ok(Self {
            edit_tools: config.edit_tools.clone(),
            classifier: Classifier::from_config(config)?,
            conventions: Conventions::from_config(config),
            root: root.into(),
            log,
        })
    }

    /// Gate whose log destination and threshold come from `config.log`.
    pub fn from_config(config: &GuardConfig, root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let log = EnforcementLog::new(config.log.resolve_path(&root), config.log.max_size_bytes);
        Self::new(config, root, log)
    }

    /// Gate on the built-in rules. Infallible, for callers that must not fail.
    pub fn with_defaults(root: impl Into<PathBuf>, log: EnforcementLog) -> Self {
        let config = GuardConfig::default();
        Self {
            edit_tools: config.edit_tools.clone(),
            classifier: Classifier::default(),
            conventions: Conventions::from_config(&config),
            root: root.into(),
            log,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn log(&self) -> &EnforcementLog {
        &self.log
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn conventions(&self) -> &Conventions {
        &self.conventions
    }

    /// Decide and record. Always returns a decision; the log write is
    /// best-effort and cannot change it.
    pub fn evaluate(&self, request: &EditRequest) -> EnforcementDecision {
        let decision = self.decide(request);
        self.log.append(&decision.log_entry());
        decision
    }

    /// Parse a raw hook payload and evaluate it. Unusable payloads fail open
    /// as `ALLOW/DEFAULT`.
    pub fn evaluate_payload(&self, input: &str) -> EnforcementDecision {
        match EditRequest::parse(input) {
            Ok(request) => self.evaluate(&request),
            Err(e) => {
                tracing::warn!(error = %e, "unusable hook payload, allowing");
                let decision = EnforcementDecision::new(Reason::Default, salvage_path(input), None);
                self.log.append(&decision.log_entry());
                decision
            }
        }
    }

    /// The decision alone, without writing to the log.
    pub fn decide(&self, request: &EditRequest) -> EnforcementDecision {
        let path = request.file_path.as_str();

        if !self.edit_tools.iter().any(|t| *t == request.tool_name) {
            return EnforcementDecision::new(Reason::OtherFile, path, None);
        }
        if path.trim().is_empty() {
            return EnforcementDecision::new(Reason::Default, path, None);
        }

        let class = self.classifier.classify(path);
        tracing::debug!(file = path, class = %class, "classified");
        match class {
            FileClass::Test => EnforcementDecision::new(Reason::TestFile, path, Some(class)),
            FileClass::ConfigOrDoc => EnforcementDecision::new(Reason::ConfigFile, path, Some(class)),
            FileClass::Other => EnforcementDecision::new(Reason::OtherFile, path, Some(class)),
            FileClass::Implementation => {
                let probed = self.conventions.probe_all(path, &self.root);
                let has_tests = probed.iter().any(|p| p.status.satisfies());
                let reason = if has_tests {
                    Reason::HasTests
                } else {
                    Reason::NoTests
                };
                let mut decision = EnforcementDecision::new(reason, path, Some(class));
                decision.expected = probed.into_iter().map(|p| p.candidate.display).collect();
                decision
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

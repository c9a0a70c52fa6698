use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// FileClass
// ---------------------------------------------------------------------------

/// Category of a path proposed for editing. Checked in declaration order:
/// a path that looks like a test is a test even if its extension is also an
/// implementation extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileClass {
    Test,
    ConfigOrDoc,
    Implementation,
    Other,
}

impl FileClass {
    pub fn all() -> &'static [FileClass] {
        &[
            FileClass::Test,
            FileClass::ConfigOrDoc,
            FileClass::Implementation,
            FileClass::Other,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FileClass::Test => "test",
            FileClass::ConfigOrDoc => "config_or_doc",
            FileClass::Implementation => "implementation",
            FileClass::Other => "other",
        }
    }
}

impl fmt::Display for FileClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Allow,
    Block,
}

impl Action {
    /// Uppercase label used in the enforcement log.
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Allow => "ALLOW",
            Action::Block => "BLOCK",
        }
    }

    /// Hook exit code understood by the host: 0 lets the tool run.
    pub fn exit_code(self) -> i32 {
        match self {
            Action::Allow => 0,
            Action::Block => 1,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Action {
    type Err = crate::error::GuardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ALLOW" => Ok(Action::Allow),
            "BLOCK" => Ok(Action::Block),
            _ => Err(crate::error::GuardError::InvalidAction(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Reason
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Reason {
    TestFile,
    ConfigFile,
    HasTests,
    NoTests,
    OtherFile,
    /// Fail-open outcome for payloads the gate could not interpret.
    Default,
}

impl Reason {
    pub fn all() -> &'static [Reason] {
        &[
            Reason::TestFile,
            Reason::ConfigFile,
            Reason::HasTests,
            Reason::NoTests,
            Reason::OtherFile,
            Reason::Default,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Reason::TestFile => "TEST_FILE",
            Reason::ConfigFile => "CONFIG_FILE",
            Reason::HasTests => "HAS_TESTS",
            Reason::NoTests => "NO_TESTS",
            Reason::OtherFile => "OTHER_FILE",
            Reason::Default => "DEFAULT",
        }
    }

    /// The action every reason implies. `NO_TESTS` is the only blocking one.
    pub fn action(self) -> Action {
        match self {
            Reason::NoTests => Action::Block,
            _ => Action::Allow,
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Reason {
    type Err = crate::error::GuardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Reason::all()
            .iter()
            .copied()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| crate::error::GuardError::InvalidReason(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// TestStatus
// ---------------------------------------------------------------------------

/// What the filesystem says about one candidate test path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestStatus {
    /// Regular file with at least one byte.
    Present,
    /// Regular file of zero length. Does not satisfy the gate.
    Empty,
    /// Absent, not a regular file, or unreadable metadata.
    Missing,
}

impl TestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TestStatus::Present => "present",
            TestStatus::Empty => "empty",
            TestStatus::Missing => "missing",
        }
    }

    pub fn satisfies(self) -> bool {
        matches!(self, TestStatus::Present)
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

use crate::config::GuardConfig;
use crate::error::{GuardError, Result};
use crate::types::FileClass;
use regex::Regex;
use std::path::{Component, Path};

// ---------------------------------------------------------------------------
// Matcher
// ---------------------------------------------------------------------------

/// One way a path can match a classification rule.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Anchored regex compiled from a file-name glob.
    FileName { glob: String, regex: Regex },
    /// A parent directory component equal to this name.
    DirSegment(String),
    /// Final extension (without the dot), compared case-sensitively.
    Extension(Vec<String>),
}

impl Matcher {
    pub fn file_name(glob: &str) -> Result<Self> {
        Ok(Matcher::FileName {
            glob: glob.to_string(),
            regex: glob_to_regex(glob)?,
        })
    }

    fn matches(&self, path: &Path) -> bool {
        match self {
            Matcher::FileName { regex, .. } => path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| regex.is_match(n))
                .unwrap_or(false),
            Matcher::DirSegment(name) => path
                .parent()
                .map(|parent| {
                    parent.components().any(|c| match c {
                        Component::Normal(seg) => seg.to_str() == Some(name.as_str()),
                        _ => false,
                    })
                })
                .unwrap_or(false),
            Matcher::Extension(exts) => extension_of(path)
                .map(|ext| exts.iter().any(|e| e == ext))
                .unwrap_or(false),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Matcher::FileName { glob, .. } => format!("file name matches '{glob}'"),
            Matcher::DirSegment(name) => format!("inside a '{name}' directory"),
            Matcher::Extension(exts) => format!("extension in [{}]", exts.join(", ")),
        }
    }
}

/// Final extension of `path` without the dot.
pub fn extension_of(path: &Path) -> Option<&str> {
    path.extension().and_then(|e| e.to_str())
}

/// Translate a file-name glob into an anchored regex.
///
/// Supports `*`, `?` and `[...]` classes (`[!...]` negates). Wildcards never
/// match `/`.
pub fn glob_to_regex(glob: &str) -> Result<Regex> {
    let mut re = String::with_capacity(glob.len() * 2 + 2);
    re.push('^');
    let chars: Vec<char> = glob.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' => re.push_str("[^/]*"),
            '?' => re.push_str("[^/]"),
            '[' => {
                let close = chars[i + 1..].iter().position(|c| *c == ']');
                match close {
                    Some(offset) => {
                        let body: String = chars[i + 1..i + 1 + offset].iter().collect();
                        re.push('[');
                        match body.strip_prefix('!') {
                            Some(rest) => {
                                re.push('^');
                                re.push_str(rest);
                            }
                            None => re.push_str(&body),
                        }
                        re.push(']');
                        i += offset + 1;
                    }
                    // Left unbalanced so the regex compiler reports it.
                    None => re.push('['),
                }
            }
            c => re.push_str(&regex::escape(&c.to_string())),
        }
        i += 1;
    }
    re.push('$');
    Regex::new(&re).map_err(|source| GuardError::InvalidPattern {
        pattern: glob.to_string(),
        source,
    })
}

// ---------------------------------------------------------------------------
// ClassRule
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ClassRule {
    pub class: FileClass,
    pub matcher: Matcher,
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

/// Priority-ordered rule table; the first matching rule decides the class
/// and anything unmatched is [`FileClass::Other`].
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<ClassRule>,
}

impl Classifier {
    pub fn new(rules: Vec<ClassRule>) -> Self {
        Self { rules }
    }

    pub fn from_config(config: &GuardConfig) -> Result<Self> {
        let mut rules = Vec::new();
        for glob in &config.test_files.file_names {
            rules.push(ClassRule {
                class: FileClass::Test,
                matcher: Matcher::file_name(glob)?,
            });
        }
        for dir in &config.test_files.directories {
            rules.push(ClassRule {
                class: FileClass::Test,
                matcher: Matcher::DirSegment(dir.clone()),
            });
        }
        rules.push(ClassRule {
            class: FileClass::ConfigOrDoc,
            matcher: Matcher::Extension(config.config_extensions.clone()),
        });
        rules.push(ClassRule {
            class: FileClass::Implementation,
            matcher: Matcher::Extension(config.implementation_extensions.clone()),
        });
        Ok(Self::new(rules))
    }

    /// Pure function of the path string; never touches the filesystem.
    pub fn classify(&self, path: &str) -> FileClass {
        self.matching_rule(path)
            .map(|r| r.class)
            .unwrap_or(FileClass::Other)
    }

    /// The rule that decided the class, if any. Used for diagnostics.
    pub fn matching_rule(&self, path: &str) -> Option<&ClassRule> {
        let path = Path::new(path);
        self.rules.iter().find(|r| r.matcher.matches(path))
    }
}

impl Default for Classifier {
    fn default() -> Self {
        // Built-in globs always compile.
        Self::from_config(&GuardConfig::default()).unwrap_or_else(|_| Self::new(Vec::new()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(path: &str) -> FileClass {
        Classifier::default().classify(path)
    }

    #[test]
    fn test_files_by_name() {
        for path in [
            "test_foo.py",
            "src/test_foo.py",
            "pkg/foo_test.py",
            "web/app.test.ts",
            "web/app.spec.ts",
            "web/appspec.js",
            "web/app.test.js",
            "/abs/path/mytests.js",
        ] {
            assert_eq!(classify(path), FileClass::Test, "{path}");
        }
    }

    #[test]
    fn test_files_by_directory() {
        for path in ["tests/helpers.py", "pkg/tests/conftest.py", "/abs/tests/data/x.go"] {
            assert_eq!(classify(path), FileClass::Test, "{path}");
        }
        // A file merely named `tests` is not inside a tests directory.
        assert_eq!(classify("src/tests"), FileClass::Other);
    }

    #[test]
    fn config_and_doc_files() {
        for path in [
            "README.md",
            "notes.txt",
            "package.json",
            "ci.yaml",
            "ci.yml",
            "Cargo.toml",
            "setup.cfg",
            "tox.ini",
        ] {
            assert_eq!(classify(path), FileClass::ConfigOrDoc, "{path}");
        }
    }

    #[test]
    fn implementation_files() {
        for path in ["src/foo.py", "a.js", "b.ts", "main.go", "lib.rs", "index.php"] {
            assert_eq!(classify(path), FileClass::Implementation, "{path}");
        }
    }

    #[test]
    fn everything_else_is_other() {
        for path in ["Makefile", "style.css", "image.png", "", ".", "src/", "FOO.PY"] {
            assert_eq!(classify(path), FileClass::Other, "{path}");
        }
    }

    #[test]
    fn test_rules_take_priority_over_extensions() {
        // `.py` is an implementation extension but the name says test.
        assert_eq!(classify("test_config.py"), FileClass::Test);
        // `.md` under tests/ is still a test-directory file.
        assert_eq!(classify("tests/README.md"), FileClass::Test);
    }

    #[test]
    fn suffix_matching_is_case_sensitive() {
        assert_eq!(classify("src/Foo.PY"), FileClass::Other);
        assert_eq!(classify("README.MD"), FileClass::Other);
        assert_eq!(classify("Tests/foo.py"), FileClass::Implementation);
    }

    #[test]
    fn classification_is_total_and_stable() {
        let classifier = Classifier::default();
        for path in [
            "src/foo.py",
            "tests/test_foo.py",
            "README.md",
            "x.bin",
            "",
            "../../weird/../path.ts",
        ] {
            let first = classifier.classify(path);
            let second = classifier.classify(path);
            assert_eq!(first, second);
            assert!(FileClass::all().contains(&first));
        }
    }

    #[test]
    fn matching_rule_reports_cause() {
        let classifier = Classifier::default();
        let rule = classifier.matching_rule("pkg/foo_test.py").unwrap();
        assert_eq!(rule.class, FileClass::Test);
        assert!(rule.matcher.describe().contains("*_test.py"));
        assert!(classifier.matching_rule("Makefile").is_none());
    }

    #[test]
    fn glob_translation() {
        let re = glob_to_regex("test_*.py").unwrap();
        assert!(re.is_match("test_foo.py"));
        assert!(!re.is_match("test_foo.pyc"));
        assert!(!re.is_match("xtest_foo.py"));

        let re = glob_to_regex("file?.[!j]s").unwrap();
        assert!(re.is_match("file1.ts"));
        assert!(!re.is_match("file1.js"));

        let re = glob_to_regex("a+b(c).md").unwrap();
        assert!(re.is_match("a+b(c).md"));

        assert!(matches!(
            glob_to_regex("broken[.py"),
            Err(GuardError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn custom_table_from_config() {
        let mut cfg = GuardConfig::default();
        cfg.test_files.file_names.push("*_spec.rb".into());
        cfg.implementation_extensions.push("rb".into());
        let classifier = Classifier::from_config(&cfg).unwrap();
        assert_eq!(classifier.classify("lib/user_spec.rb"), FileClass::Test);
        assert_eq!(classifier.classify("lib/user.rb"), FileClass::Implementation);
    }
}

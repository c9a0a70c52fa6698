use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const CLAUDE_DIR: &str = ".claude";
pub const CONFIG_FILE: &str = ".claude/tddgate.yaml";
pub const LOG_FILE: &str = ".claude/logs/tdd-enforcement.log";

pub const ROTATED_SUFFIX: &str = ".old";
pub const LOCK_SUFFIX: &str = ".lock";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// Default enforcement log: `~/.claude/logs/tdd-enforcement.log`, or the same
/// layout under `root` when no home directory can be determined.
pub fn default_log_path(root: &Path) -> PathBuf {
    match home::home_dir() {
        Some(home) => home.join(LOG_FILE),
        None => root.join(LOG_FILE),
    }
}

/// `<log>.old`, the single rotated generation.
pub fn rotated_path(log: &Path) -> PathBuf {
    with_suffix(log, ROTATED_SUFFIX)
}

/// `<log>.lock`, held while rotating.
pub fn lock_path(log: &Path) -> PathBuf {
    with_suffix(log, LOCK_SUFFIX)
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut s: OsString = path.as_os_str().to_owned();
    s.push(suffix);
    PathBuf::from(s)
}

/// Collapse `.` and `..` components without touching the filesystem.
///
/// `..` at the start of a relative path is kept; `..` past the root of an
/// absolute path is dropped.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(comp),
            },
            other => out.push(other),
        }
    }
    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.iter().collect()
}

/// Render `path` relative to `root` when it lives underneath it.
pub fn display_relative(path: &Path, root: &Path) -> String {
    let root = normalize(root);
    match path.strip_prefix(&root) {
        Ok(rel) if !rel.as_os_str().is_empty() => rel.display().to_string(),
        _ => path.display().to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sidecar_paths() {
        let log = Path::new("/var/log/tdd.log");
        assert_eq!(rotated_path(log), PathBuf::from("/var/log/tdd.log.old"));
        assert_eq!(lock_path(log), PathBuf::from("/var/log/tdd.log.lock"));
    }

    #[test]
    fn config_path_is_under_claude_dir() {
        assert_eq!(
            config_path(Path::new("/tmp/proj")),
            PathBuf::from("/tmp/proj/.claude/tddgate.yaml")
        );
    }

    #[test]
    fn normalize_collapses_parent_segments() {
        assert_eq!(
            normalize(Path::new("/proj/src/../tests/test_foo.py")),
            PathBuf::from("/proj/tests/test_foo.py")
        );
        assert_eq!(
            normalize(Path::new("/proj/./src/./foo.py")),
            PathBuf::from("/proj/src/foo.py")
        );
        assert_eq!(normalize(Path::new("../a/b")), PathBuf::from("../a/b"));
        assert_eq!(normalize(Path::new("/..")), PathBuf::from("/"));
        assert_eq!(normalize(Path::new("a/..")), PathBuf::from("."));
    }

    #[test]
    fn display_relative_strips_root() {
        let root = Path::new("/proj");
        assert_eq!(
            display_relative(Path::new("/proj/tests/test_foo.py"), root),
            "tests/test_foo.py"
        );
        assert_eq!(
            display_relative(Path::new("/elsewhere/test_foo.py"), root),
            "/elsewhere/test_foo.py"
        );
    }
}

use std::path::{Path, PathBuf};

/// Environment variable the host sets to the project being edited.
pub const HOST_PROJECT_ENV: &str = "CLAUDE_PROJECT_DIR";

/// Resolve the project root.
///
/// Priority:
/// 1. `--root` flag / `TDDGATE_ROOT` env var (passed in as `explicit`)
/// 2. `CLAUDE_PROJECT_DIR`, set by the host when it runs hooks
/// 3. The working directory
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    let host = std::env::var_os(HOST_PROJECT_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from);
    resolve_from(explicit, host)
}

fn resolve_from(explicit: Option<&Path>, host: Option<PathBuf>) -> PathBuf {
    if let Some(p) = explicit {
        return absolute(p.to_path_buf());
    }
    if let Some(p) = host {
        return absolute(p);
    }
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

fn absolute(path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        return path;
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_root_wins() {
        let result = resolve_from(Some(Path::new("/a")), Some(PathBuf::from("/b")));
        assert_eq!(result, PathBuf::from("/a"));
    }

    #[test]
    fn host_project_dir_beats_cwd() {
        let result = resolve_from(None, Some(PathBuf::from("/b")));
        assert_eq!(result, PathBuf::from("/b"));
    }

    #[test]
    fn falls_back_to_cwd() {
        let result = resolve_from(None, None);
        assert_eq!(result, std::env::current_dir().unwrap());
    }

    #[test]
    fn relative_roots_become_absolute() {
        let result = resolve_from(Some(Path::new("proj")), None);
        assert!(result.is_absolute());
        assert!(result.ends_with("proj"));
    }
}

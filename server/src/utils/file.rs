//! Filesystem path helpers

use std::path::PathBuf;

/// Expand a user-supplied path into an absolute path.
///
/// Handles `~` and `~/...` via the home directory, and resolves relative
/// paths against the current working directory. An empty string yields the
/// working directory itself.
pub fn expand_path(path: &str) -> PathBuf {
    let path = path.trim();

    if path.is_empty() {
        return std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    }

    let expanded = if path == "~" {
        dirs::home_dir().unwrap_or_else(|| PathBuf::from(path))
    } else if let Some(rest) = path.strip_prefix("~/") {
        match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => PathBuf::from(path),
        }
    } else {
        PathBuf::from(path)
    };

    if expanded.is_relative() {
        std::env::current_dir()
            .map(|cwd| cwd.join(&expanded))
            .unwrap_or(expanded)
    } else {
        expanded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn test_expand_path_absolute_unix() {
        assert_eq!(expand_path("/data/structures.db"), PathBuf::from("/data/structures.db"));
    }

    #[test]
    fn test_expand_path_relative_becomes_absolute() {
        let result = expand_path("static");
        assert!(result.is_absolute());
        assert_eq!(result, std::env::current_dir().unwrap().join("static"));
    }

    #[test]
    fn test_expand_path_tilde() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_path("~"), home);
            assert_eq!(expand_path("~/poremap.json"), home.join("poremap.json"));
        }
    }

    #[test]
    fn test_expand_path_empty_is_cwd() {
        assert_eq!(expand_path("  "), std::env::current_dir().unwrap());
    }
}

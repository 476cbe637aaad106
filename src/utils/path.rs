//! Filesystem path helpers.

use std::path::{Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Canonicalizes when the path exists, otherwise joins relative paths
/// onto the current directory.
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Resolve a configured path against the project root, expanding `~`.
pub fn resolve_config_path(path: &Path, root: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    let expanded = PathBuf::from(shellexpand::tilde(&raw).into_owned());
    if expanded.is_absolute() {
        normalize_path(&expanded)
    } else {
        normalize_path(&root.join(expanded))
    }
}

/// Path relative to `base` with `/` separators, for logs and emitted indexes.
///
/// Falls back to the full path when `path` is outside `base`.
pub fn relative_slash(path: &Path, base: &Path) -> String {
    let rel = path.strip_prefix(base).unwrap_or(path);
    rel.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_relative() {
        assert!(normalize_path(Path::new("some/where.md")).is_absolute());
    }

    #[test]
    fn test_resolve_config_path() {
        let root = Path::new("/project");
        assert_eq!(
            resolve_config_path(Path::new("/abs/pkg"), root),
            PathBuf::from("/abs/pkg")
        );
        assert_eq!(
            resolve_config_path(Path::new("src/pkg"), root),
            PathBuf::from("/project/src/pkg")
        );
    }

    #[test]
    fn test_relative_slash() {
        let base = Path::new("/project");
        assert_eq!(
            relative_slash(Path::new("/project/src/pkg/math.py"), base),
            "src/pkg/math.py"
        );
        assert_eq!(relative_slash(Path::new("/other/x.py"), base), "/other/x.py");
    }
}

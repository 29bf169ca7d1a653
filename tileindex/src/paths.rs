//! Source path handling for absolute-path mode.

use std::path::{Path, PathBuf};

/// Compute the path recorded in a record's reference string.
///
/// In absolute-path mode a relative source path that resolves on disk
/// is rewritten against `base` (the working directory of the run);
/// absolute paths and paths that do not resolve are recorded exactly as
/// given on the command line.
pub fn effective_source_path(base: &Path, source: &Path) -> PathBuf {
    if source.is_relative() {
        let joined = base.join(source);
        if joined.exists() {
            return joined;
        }
    }
    source.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_relative_resolvable_path_is_rewritten() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("roads.shp"), b"").unwrap();

        let rewritten = effective_source_path(dir.path(), Path::new("roads.shp"));
        assert_eq!(rewritten, dir.path().join("roads.shp"));
    }

    #[test]
    fn test_absolute_path_is_kept_as_given() {
        let dir = TempDir::new().unwrap();
        let absolute = dir.path().join("roads.shp");
        fs::write(&absolute, b"").unwrap();

        assert_eq!(effective_source_path(dir.path(), &absolute), absolute);
    }

    #[test]
    fn test_unresolvable_relative_path_is_kept_as_given() {
        let dir = TempDir::new().unwrap();

        let kept = effective_source_path(dir.path(), Path::new("missing.shp"));
        assert_eq!(kept, PathBuf::from("missing.shp"));
    }
}

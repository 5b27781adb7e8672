//! Feature file discovery
//!
//! Turns command-line inputs into the list of feature files to run.
//! Directories are searched recursively; missing paths are skipped.

use anyhow::{Context, Result};
use glob::{glob, Pattern};
use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

/// Extension of Gherkin feature files
pub const FEATURE_EXTENSION: &str = "feature";

/// Resolve `inputs` to existing feature files.
///
/// With a `base` directory, relative inputs are looked up under it and the
/// returned paths are absolute, so they stay valid for a runner started in
/// `base`. Order follows the inputs; files found under a directory are
/// sorted. The same file reached twice keeps its first position.
pub fn resolve_feature_files<I, S>(inputs: I, base: Option<&Path>) -> Result<Vec<PathBuf>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let base = base.map(absolute).transpose()?;
    let mut seen = HashSet::new();
    let mut files = Vec::new();

    for input in inputs {
        let input = input.as_ref();
        let path = match &base {
            Some(base) => base.join(input),
            None => PathBuf::from(input),
        };

        let found = if path.is_dir() {
            find_in_dir(&path)?
        } else if path.is_file() {
            vec![path]
        } else {
            warn!("Warning: Feature file {} not found, skipping", input);
            continue;
        };

        for file in found {
            if seen.insert(identity(&file)) {
                files.push(file);
            }
        }
    }

    debug!("Resolved {} feature files", files.len());
    Ok(files)
}

/// `path` made absolute against the current directory
fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    Ok(cwd.join(path))
}

/// Key under which two spellings of the same file compare equal
fn identity(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| {
        path.components()
            .filter(|c| !matches!(c, Component::CurDir))
            .collect()
    })
}

/// All `*.feature` files below `dir`, sorted
pub fn find_in_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    let root = Pattern::escape(&dir.to_string_lossy());
    let pattern = format!("{root}/**/*.{FEATURE_EXTENSION}");

    let mut files: Vec<PathBuf> = glob(&pattern)
        .with_context(|| format!("Invalid search pattern: {pattern}"))?
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("Skipping unreadable path: {}", e);
                None
            }
        })
        .filter(|p| p.is_file())
        .collect();

    if files.is_empty() {
        warn!("No feature files under {}", dir.display());
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "Feature: x\n").unwrap();
    }

    fn as_str(path: &Path) -> String {
        path.to_string_lossy().to_string()
    }

    #[test]
    fn test_existing_files_keep_order() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.feature");
        let b = dir.path().join("b.feature");
        touch(&a);
        touch(&b);

        let files = resolve_feature_files([as_str(&b), as_str(&a)], None).unwrap();
        assert_eq!(files, vec![b, a]);
    }

    #[test]
    fn test_missing_files_are_skipped() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.feature");
        touch(&a);
        let missing = dir.path().join("missing.feature");

        let files = resolve_feature_files([as_str(&missing), as_str(&a)], None).unwrap();
        assert_eq!(files, vec![a]);
    }

    #[test]
    fn test_all_missing_yields_empty() {
        let files = resolve_feature_files(["/definitely/not/here.feature"], None).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_directory_is_searched_recursively() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("z.feature"));
        touch(&dir.path().join("nested/deeper/a.feature"));
        touch(&dir.path().join("notes.txt"));

        let files = find_in_dir(dir.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| f.extension().unwrap() == "feature"));

        let mut sorted = files.clone();
        sorted.sort();
        assert_eq!(files, sorted);
    }

    #[test]
    fn test_duplicates_are_removed() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.feature");
        touch(&a);

        let files =
            resolve_feature_files([as_str(&a), as_str(dir.path()), as_str(&a)], None).unwrap();
        assert_eq!(files, vec![a]);
    }

    #[test]
    fn test_different_spellings_of_one_file_run_once() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("features/a.feature"));

        let inputs = ["features/a.feature", "./features/a.feature", "features"];
        let files = resolve_feature_files(inputs, Some(dir.path())).unwrap();
        assert_eq!(files, vec![dir.path().join("features/a.feature")]);
    }

    #[test]
    fn test_relative_inputs_resolve_under_base() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("features/a.feature"));
        touch(&dir.path().join("features/more/b.feature"));

        let files =
            resolve_feature_files(["features/a.feature", "features/more"], Some(dir.path()))
                .unwrap();

        assert_eq!(
            files,
            vec![
                dir.path().join("features/a.feature"),
                dir.path().join("features/more/b.feature"),
            ]
        );
        assert!(files.iter().all(|f| f.is_absolute()));
    }

    #[test]
    fn test_base_does_not_fall_back_to_current_dir() {
        let dir = tempdir().unwrap();
        let files = resolve_feature_files(["Cargo.toml"], Some(dir.path())).unwrap();
        assert!(files.is_empty());
    }
}

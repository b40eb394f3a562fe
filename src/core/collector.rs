use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::fs;
use std::path::Path;

/// Name of the per-directory ignore file.
pub const IGNORE_FILE_NAME: &str = ".zipignore";

/// Reads the ignore patterns declared directly inside `dir`.
///
/// The file holds one glob pattern per line; lines are trimmed and blank
/// lines are dropped. A `.zipignore` that is itself a directory counts as
/// absent. A present but unreadable file is a fatal error.
fn read_ignore_patterns(dir: &Path) -> Result<Vec<String>> {
    let ignore_file = dir.join(IGNORE_FILE_NAME);

    if !ignore_file.is_file() {
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(&ignore_file)
        .with_context(|| format!("Failed to read ignore file {}", ignore_file.display()))?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}

/// Produces the effective pattern list for `dir`: the inherited patterns
/// plus whatever the directory's own `.zipignore` declares.
///
/// The inherited list is copied, never mutated, so sibling subtrees cannot
/// see each other's local rules.
fn resolve_patterns(dir: &Path, inherited: &[String]) -> Result<Vec<String>> {
    let mut effective = inherited.to_vec();
    effective.extend(read_ignore_patterns(dir)?);
    Ok(effective)
}

/// Compiles a pattern list into a single matcher set.
fn build_matcher(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();

    for pattern in patterns {
        let glob =
            Glob::new(pattern).with_context(|| format!("Invalid ignore pattern '{pattern}'"))?;
        builder.add(glob);
    }

    builder.build().context("Failed to compile ignore patterns")
}

/// Collects every regular file under `dir` recursively, excluding paths
/// matched by the active ignore patterns.
///
/// `default_patterns` (from the CLI) applies from the root down; each
/// directory level appends its own `.zipignore` lines for its subtree.
/// Entries are tested against the patterns by both their bare name and
/// their root-relative path; a matched directory is not descended into.
/// Symbolic links are always skipped. Returned paths are relative to `dir`
/// and forward-slash separated, in deterministic pre-order (entries sorted
/// by name per directory).
///
/// Any filesystem read error aborts the whole collection.
pub fn collect_files(dir: &Path, default_patterns: &[String]) -> Result<Vec<String>> {
    collect_level(dir, dir, default_patterns)
}

fn collect_level(root: &Path, dir: &Path, inherited: &[String]) -> Result<Vec<String>> {
    let patterns = resolve_patterns(dir, inherited)?;
    let matcher = build_matcher(&patterns)?;

    let mut entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to list directory {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()
        .with_context(|| format!("Failed to list directory {}", dir.display()))?;
    entries.sort_by_key(|entry| entry.file_name());

    let mut files = Vec::new();

    for entry in entries {
        let name = entry.file_name();
        let path = entry.path();
        let relative = relative_slash_path(root, &path);

        if matcher.is_match(&name) || matcher.is_match(&relative) {
            continue;
        }

        let file_type = entry
            .file_type()
            .with_context(|| format!("Failed to inspect {}", path.display()))?;

        if file_type.is_symlink() {
            continue;
        }

        if file_type.is_dir() {
            files.extend(collect_level(root, &path, &patterns)?);
        } else if file_type.is_file() {
            files.push(relative);
        }
    }

    Ok(files)
}

/// Root-relative path with forward slashes, regardless of the host
/// separator convention.
fn relative_slash_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);

    relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, relative: &str, content: &str) {
        let path = dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn collect(dir: &TempDir, defaults: &[&str]) -> Vec<String> {
        let defaults: Vec<String> = defaults.iter().map(|s| s.to_string()).collect();
        collect_files(dir.path(), &defaults).unwrap()
    }

    #[test]
    fn test_collects_every_file_without_ignores() {
        let dir = TempDir::new().unwrap();
        write(&dir, "z.txt", "z");
        write(&dir, "a.txt", "a");
        write(&dir, "sub/nested/deep.txt", "d");
        write(&dir, "sub/b.txt", "b");

        assert_eq!(
            collect(&dir, &[]),
            vec!["a.txt", "sub/b.txt", "sub/nested/deep.txt", "z.txt"]
        );
    }

    #[test]
    fn test_directory_pattern_prevents_descent() {
        let dir = TempDir::new().unwrap();
        write(&dir, "foo.md", "f");
        write(&dir, "dir1/bar.md", "b");
        write(&dir, "dir1/.zipignore", "subdir3\n");
        write(&dir, "dir1/subdir3/baz.md", "z");
        fs::create_dir_all(dir.path().join("dir1/subdir2")).unwrap();

        assert_eq!(
            collect(&dir, &[]),
            vec!["dir1/.zipignore", "dir1/bar.md", "foo.md"]
        );
    }

    #[test]
    fn test_subdirectory_rules_do_not_leak_to_siblings() {
        let dir = TempDir::new().unwrap();
        write(&dir, "dir1/.zipignore", "secret.txt\n");
        write(&dir, "dir1/secret.txt", "hidden");
        write(&dir, "dir1/kept.txt", "kept");
        write(&dir, "dir2/secret.txt", "visible");

        assert_eq!(
            collect(&dir, &[]),
            vec!["dir1/.zipignore", "dir1/kept.txt", "dir2/secret.txt"]
        );
    }

    #[test]
    fn test_nested_rules_inherit_from_parents() {
        let dir = TempDir::new().unwrap();
        write(&dir, ".zipignore", "*.log\n");
        write(&dir, "run.log", "top");
        write(&dir, "sub/run.log", "nested");
        write(&dir, "sub/kept.txt", "kept");

        assert_eq!(collect(&dir, &[]), vec![".zipignore", "sub/kept.txt"]);
    }

    #[test]
    fn test_default_patterns_apply_from_the_root() {
        let dir = TempDir::new().unwrap();
        write(&dir, "main.php", "<?php");
        write(&dir, "node_modules/dep/index.js", "x");
        write(&dir, "sub/node_modules/other.js", "y");

        assert_eq!(collect(&dir, &["node_modules"]), vec!["main.php"]);
    }

    #[test]
    fn test_patterns_match_relative_paths_too() {
        let dir = TempDir::new().unwrap();
        write(&dir, "docs/internal/notes.md", "n");
        write(&dir, "docs/readme.md", "r");

        assert_eq!(
            collect(&dir, &["docs/internal"]),
            vec!["docs/readme.md"]
        );
    }

    #[test]
    fn test_blank_and_padded_ignore_lines_are_dropped() {
        let dir = TempDir::new().unwrap();
        write(&dir, ".zipignore", "\n  *.tmp  \n\n");
        write(&dir, "a.tmp", "t");
        write(&dir, "a.txt", "k");

        assert_eq!(collect(&dir, &[]), vec![".zipignore", "a.txt"]);
    }

    #[test]
    fn test_ignore_file_that_is_a_directory_counts_as_absent() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join(IGNORE_FILE_NAME)).unwrap();
        write(&dir, "a.txt", "a");

        assert_eq!(collect(&dir, &[]), vec!["a.txt"]);
    }

    #[test]
    fn test_invalid_pattern_is_a_fatal_error() {
        let dir = TempDir::new().unwrap();
        write(&dir, ".zipignore", "broken[\n");
        write(&dir, "a.txt", "a");

        let error = collect_files(dir.path(), &[]).unwrap_err();
        assert!(error.to_string().contains("broken["));
    }

    #[test]
    fn test_missing_directory_is_a_fatal_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");

        assert!(collect_files(&missing, &[]).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_symbolic_links_are_skipped() {
        let dir = TempDir::new().unwrap();
        write(&dir, "real.txt", "r");
        write(&dir, "target.txt", "t");
        std::os::unix::fs::symlink(
            dir.path().join("target.txt"),
            dir.path().join("link.txt"),
        )
        .unwrap();

        assert_eq!(collect(&dir, &["target.txt"]), vec!["real.txt"]);
    }
}

//! Input file collection for `check` and `fix`.

use crate::error::{MarshalError, MarshalResult};
use glob::{glob_with, MatchOptions, Pattern};
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

/// Explicit files as given, followed by every `*.swift` below `dir`.
///
/// Hidden files and directories under `dir` are skipped, directory results
/// are sorted, and duplicates keep their first position.
pub fn collect_files(files: &[PathBuf], dir: Option<&Path>) -> MarshalResult<Vec<PathBuf>> {
    let mut out: Vec<PathBuf> = files.to_vec();
    if let Some(dir) = dir {
        out.extend(swift_files_under(dir)?);
    }
    let mut seen = HashSet::new();
    out.retain(|p| seen.insert(p.clone()));
    if out.is_empty() {
        return Err(MarshalError::Validation(
            "no Swift files to process (pass files or --path)".into(),
        ));
    }
    Ok(out)
}

fn swift_files_under(dir: &Path) -> MarshalResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(MarshalError::Validation(format!(
            "{} is not a directory",
            dir.display()
        )));
    }
    let pattern = format!(
        "{}/**/*.swift",
        Pattern::escape(&dir.to_string_lossy())
    );
    debug!(pattern = %pattern, "scanning for Swift files");
    let options = MatchOptions {
        require_literal_leading_dot: true,
        ..MatchOptions::new()
    };
    let entries = glob_with(&pattern, options)
        .map_err(|e| MarshalError::Validation(format!("invalid search path {}: {e}", dir.display())))?;

    let mut found = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() && !is_hidden_below(dir, &path) => found.push(path),
            Ok(_) => {}
            Err(e) => warn!("skipping unreadable entry: {e}"),
        }
    }
    found.sort();
    Ok(found)
}

fn is_hidden_below(root: &Path, path: &Path) -> bool {
    path.strip_prefix(root).unwrap_or(path).components().any(|c| match c {
        Component::Normal(name) => name.to_string_lossy().starts_with('.'),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn finds_swift_files_recursively_and_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("b/B.swift"));
        touch(&root.join("A.swift"));
        touch(&root.join("notes.md"));
        touch(&root.join(".build/Gen.swift"));
        touch(&root.join("c/.Hidden.swift"));
        let files = collect_files(&[], Some(root)).unwrap();
        assert_eq!(files, vec![root.join("A.swift"), root.join("b/B.swift")]);
    }

    #[test]
    fn explicit_files_come_first_without_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("A.swift"));
        touch(&root.join("Z.swift"));
        let files = collect_files(&[root.join("Z.swift")], Some(root)).unwrap();
        assert_eq!(files, vec![root.join("Z.swift"), root.join("A.swift")]);
    }

    #[test]
    fn non_directory_path_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("A.swift");
        touch(&file);
        let err = collect_files(&[], Some(&file)).unwrap_err();
        assert!(matches!(err, MarshalError::Validation(_)));
    }

    #[test]
    fn nothing_to_process_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            collect_files(&[], Some(dir.path())),
            Err(MarshalError::Validation(_))
        ));
        assert!(collect_files(&[], None).is_err());
    }
}

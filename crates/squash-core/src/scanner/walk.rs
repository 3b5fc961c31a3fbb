use super::FileDescriptor;
use glob::Pattern;
use std::io;
use std::path::Path;
use tracing::{error, trace, warn};
use walkdir::{DirEntry, WalkDir};

/// Recursive directory traversal. Emits a descriptor for every regular file
/// whose extension is in `include_extensions` (case-insensitive, no leading
/// dot), without descending into directories named in `exclude_dirs` or
/// matching one of the glob `ignore_globs`.
///
/// Entries that cannot be read are logged and skipped; only a failure to
/// open `root` itself is returned.
pub fn enumerate(
    root: &Path,
    include_extensions: &[String],
    exclude_dirs: &[String],
    ignore_globs: &[String],
) -> io::Result<Vec<FileDescriptor>> {
    let ignore_patterns: Vec<Pattern> = ignore_globs
        .iter()
        .filter_map(|glob| match Pattern::new(glob) {
            Ok(p) => Some(p),
            Err(e) => {
                error!("Invalid glob pattern '{}': {}", glob, e);
                None
            }
        })
        .collect();

    let extensions: Vec<String> = include_extensions
        .iter()
        .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
        .collect();

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_excluded(entry, exclude_dirs, &ignore_patterns));

    let mut files = Vec::new();
    for entry_result in walker {
        let entry = match entry_result {
            Ok(entry) => entry,
            Err(err) => {
                if err.depth() == 0 {
                    return Err(err.into());
                }
                warn!("Skipping unreadable entry: {}", err);
                continue;
            }
        };

        if !entry.file_type().is_file() || !has_extension(entry.path(), &extensions) {
            continue;
        }

        match entry.metadata() {
            Ok(metadata) => {
                trace!("Found {}", entry.path().display());
                files.push(FileDescriptor::new(entry.path(), metadata.len()));
            }
            Err(err) => warn!(
                "Error getting metadata for {}: {}",
                entry.path().display(),
                err
            ),
        }
    }

    Ok(files)
}

fn is_excluded(entry: &DirEntry, exclude_dirs: &[String], ignore_patterns: &[Pattern]) -> bool {
    // The root itself is never filtered out.
    if entry.depth() == 0 {
        return false;
    }
    if entry.file_type().is_dir() {
        let name = entry.file_name().to_string_lossy();
        if exclude_dirs.iter().any(|d| *d == name) {
            return true;
        }
    }
    ignore_patterns
        .iter()
        .any(|pattern| pattern.matches_path(entry.path()))
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn exts() -> Vec<String> {
        ["png", "jpg", "svg", "gif"].iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_only_image_extensions_are_enumerated() {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join("a.png"), b"png").unwrap();
        fs::write(tmp.path().join("notes.txt"), b"text").unwrap();
        fs::write(tmp.path().join("B.JPG"), b"jpeg").unwrap();

        let files = enumerate(tmp.path(), &exts(), &[], &[]).unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["B.JPG", "a.png"]);
    }

    #[test]
    fn test_excluded_directory_is_not_descended() {
        let tmp = tempdir().unwrap();
        let modules = tmp.path().join("node_modules").join("pkg");
        let images = tmp.path().join("images");
        fs::create_dir_all(&modules).unwrap();
        fs::create_dir_all(&images).unwrap();
        fs::write(modules.join("icon.png"), b"x").unwrap();
        fs::write(images.join("hero.gif"), b"gif89").unwrap();

        let files = enumerate(tmp.path(), &exts(), &["node_modules".to_string()], &[]).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "hero.gif");
        assert_eq!(files[0].size, 5);
    }

    #[test]
    fn test_ignore_glob_skips_matching_files() {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join("keep.png"), b"x").unwrap();
        fs::write(tmp.path().join("skip.min.png"), b"x").unwrap();

        let files = enumerate(tmp.path(), &exts(), &[], &["*.min.png".to_string()]).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "keep.png");
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let tmp = tempdir().unwrap();
        let result = enumerate(&tmp.path().join("absent"), &exts(), &[], &[]);
        assert!(result.is_err());
    }
}

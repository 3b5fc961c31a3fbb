pub mod filter;
pub mod walk;

use std::path::{Component, Path, PathBuf};

pub use filter::filter_unprocessed;
pub use walk::enumerate;

/// A candidate image found under the scanned root. Identity is the
/// normalized path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
}

impl FileDescriptor {
    pub fn new(path: impl Into<PathBuf>, size: u64) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { path, name, size }
    }

    pub fn normalized_path(&self) -> String {
        normalize_path(&self.path)
    }
}

/// Forward-slash form of `path` with `.` components dropped, so the same
/// file hashes identically regardless of how the root was spelled.
pub fn normalize_path(path: &Path) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut absolute = false;
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::RootDir => absolute = true,
            Component::Prefix(prefix) => {
                parts.push(prefix.as_os_str().to_string_lossy().into_owned())
            }
            Component::ParentDir => parts.push("..".to_string()),
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
        }
    }
    let joined = parts.join("/");
    if absolute {
        format!("/{}", joined)
    } else {
        joined
    }
}

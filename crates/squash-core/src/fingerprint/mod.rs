pub mod store;

use crate::scanner::{normalize_path, FileDescriptor};
use std::collections::HashSet;
use std::path::Path;

pub use store::FingerprintStore;

/// Hex BLAKE3 digest of the normalized path followed by the decimal size.
///
/// The same function produces both the pre-compression key (current size)
/// and the post-compression record (size after write), so a compressed
/// file's next scan yields exactly the recorded value.
pub fn fingerprint(path: &Path, size: u64) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(normalize_path(path).as_bytes());
    hasher.update(size.to_string().as_bytes());
    hasher.finalize().to_hex().to_string()
}

pub fn of_descriptor(file: &FileDescriptor) -> String {
    fingerprint(&file.path, file.size)
}

/// Insertion-ordered set of fingerprints. Duplicates collapse on insert.
#[derive(Debug, Clone, Default)]
pub struct FingerprintSet {
    order: Vec<String>,
    seen: HashSet<String>,
}

impl FingerprintSet {
    pub fn contains(&self, fingerprint: &str) -> bool {
        self.seen.contains(fingerprint)
    }

    /// Returns false when the fingerprint was already present.
    pub fn insert(&mut self, fingerprint: String) -> bool {
        if self.seen.insert(fingerprint.clone()) {
            self.order.push(fingerprint);
            true
        } else {
            false
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.order.iter()
    }
}

impl FromIterator<String> for FingerprintSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut set = FingerprintSet::default();
        set.extend(iter);
        set
    }
}

impl Extend<String> for FingerprintSet {
    fn extend<I: IntoIterator<Item = String>>(&mut self, iter: I) {
        for fingerprint in iter {
            self.insert(fingerprint);
        }
    }
}

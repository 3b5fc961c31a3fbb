use super::FingerprintSet;
use crate::error::Error;
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// On-disk shape: `{"list": [...]}`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreDocument {
    list: Vec<String>,
}

/// Fingerprints of files compressed by earlier runs, persisted as a single
/// JSON document. Read once at run start, rewritten once at run end.
#[derive(Debug)]
pub struct FingerprintStore {
    path: PathBuf,
    fingerprints: FingerprintSet,
}

impl FingerprintStore {
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            fingerprints: FingerprintSet::default(),
        }
    }

    /// An absent file is an empty store. A file that exists but cannot be
    /// read or parsed is fatal.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let path = path.into();
        let fingerprints = match fs::read(&path) {
            Ok(bytes) => {
                let doc: StoreDocument = serde_json::from_slice(&bytes).map_err(|source| {
                    Error::CorruptFingerprints {
                        path: path.clone(),
                        source,
                    }
                })?;
                let raw = doc.list.len();
                let set: FingerprintSet = doc.list.into_iter().collect();
                info!("Loaded {} fingerprints from {}", set.len(), path.display());
                if raw != set.len() {
                    debug!("Collapsed {} duplicate fingerprints", raw - set.len());
                }
                set
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("No fingerprint file at {}, starting empty", path.display());
                FingerprintSet::default()
            }
            Err(err) => return Err(err.into()),
        };

        Ok(Self { path, fingerprints })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn fingerprints(&self) -> &FingerprintSet {
        &self.fingerprints
    }

    pub fn len(&self) -> usize {
        self.fingerprints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fingerprints.is_empty()
    }

    /// Adds new fingerprints in memory. Returns how many were not already known.
    pub fn extend<I: IntoIterator<Item = String>>(&mut self, fingerprints: I) -> usize {
        fingerprints
            .into_iter()
            .filter(|fp| self.fingerprints.insert(fp.clone()))
            .count()
    }

    /// Overwrites the file with the full set, tab-indented.
    pub fn save(&self) -> io::Result<()> {
        let doc = StoreDocument {
            list: self.fingerprints.iter().cloned().collect(),
        };

        let mut buffer = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"\t");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        doc.serialize(&mut serializer)
            .map_err(|e| io::Error::new(ErrorKind::Other, e))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, buffer)?;
        info!(
            "Wrote {} fingerprints to {}",
            self.fingerprints.len(),
            self.path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_absent_file_loads_empty() {
        let tmp = tempdir().unwrap();
        let store = FingerprintStore::load(tmp.path().join("squash.json")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_corrupt_file_is_fatal() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("squash.json");
        fs::write(&path, "{ not json").unwrap();
        match FingerprintStore::load(&path) {
            Err(Error::CorruptFingerprints { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected CorruptFingerprints, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicates_tolerated_on_read_and_not_written() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("squash.json");
        fs::write(&path, r#"{"list": ["aa", "bb", "aa"]}"#).unwrap();

        let mut store = FingerprintStore::load(&path).unwrap();
        assert_eq!(store.len(), 2);

        let added = store.extend(vec!["bb".to_string(), "cc".to_string()]);
        assert_eq!(added, 1);
        store.save().unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["list"], serde_json::json!(["aa", "bb", "cc"]));
    }

    #[test]
    fn test_save_uses_tab_indent() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("squash.json");
        let mut store = FingerprintStore::load(&path).unwrap();
        store.extend(vec!["aa".to_string()]);
        store.save().unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\n\t\"list\""));
    }
}

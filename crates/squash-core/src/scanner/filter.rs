use super::FileDescriptor;
use crate::fingerprint::{self, FingerprintSet};
use rayon::prelude::*;

/// Keep only the candidates whose pre-compression fingerprint is unknown.
/// Hashing is spread over the global rayon pool; candidate order is kept.
pub fn filter_unprocessed(
    candidates: Vec<FileDescriptor>,
    known: &FingerprintSet,
) -> Vec<FileDescriptor> {
    candidates
        .into_par_iter()
        .filter(|file| !known.contains(&fingerprint::of_descriptor(file)))
        .collect()
}

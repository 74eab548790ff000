//! Deterministic seed derivation shared by every randomized system.

use sha2::{Digest, Sha256};

/// Derives an independent stream seed from a global seed.
///
/// Each consumer hashes its own label and an index (usually the episode
/// counter), so two systems never share a random stream and replays with the
/// same global seed produce the same draws.
#[must_use]
pub fn derive_seed(global: u64, label: &str, index: u64) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(global.to_le_bytes());
    hasher.update(label.as_bytes());
    hasher.update(index.to_le_bytes());
    finalize_seed(hasher)
}

fn finalize_seed(hasher: Sha256) -> u64 {
    let digest = hasher.finalize();
    let mut bytes = [0_u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

//! RFC 6962 style simple Merkle tree, as used by tendermint for validator-set
//! and header hashes.
//!
//! Leaves are hashed as `SHA256(0x00 || leaf)`, inner nodes as
//! `SHA256(0x01 || left || right)`, and the tree is split at the largest power
//! of two strictly less than the number of items.

use sha2::{Digest, Sha256};

use crate::types::Hash;

const LEAF_PREFIX: u8 = 0x00;
const INNER_PREFIX: u8 = 0x01;

/// The root of an empty tree, `SHA256("")`
#[must_use]
pub fn empty_hash() -> Hash {
    Sha256::digest(b"").into()
}

/// `SHA256(0x00 || leaf)`
#[must_use]
pub fn leaf_hash(leaf: &[u8]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update([LEAF_PREFIX]);
    hasher.update(leaf);
    hasher.finalize().into()
}

/// `SHA256(0x01 || left || right)`
#[must_use]
pub fn inner_hash(left: &Hash, right: &Hash) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update([INNER_PREFIX]);
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}

/// Computes the Merkle root of an ordered sequence of encoded items.
#[must_use]
pub fn compute_root<T: AsRef<[u8]>>(items: &[T]) -> Hash {
    match items.len() {
        0 => empty_hash(),
        1 => leaf_hash(items[0].as_ref()),
        n => {
            let k = split_point(n);
            let left = compute_root(&items[..k]);
            let right = compute_root(&items[k..]);
            inner_hash(&left, &right)
        }
    }
}

/// Largest power of two strictly less than `length`. `length` must be > 1.
const fn split_point(length: usize) -> usize {
    let bitlen = usize::BITS - (length - 1).leading_zeros();
    1 << (bitlen - 1)
}

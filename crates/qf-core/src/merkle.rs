//! BLAKE3 Merkle tree over byte-encoded payout claims.
//!
//! Uses domain-separated hashing to prevent second-preimage attacks:
//! - Leaf hash: `BLAKE3(0x00 || leaf bytes)`
//! - Internal node: `BLAKE3(0x01 || left || right)`
//!
//! Odd-length layers are padded by duplicating the last element.
//! Empty trees produce [`Hash256::ZERO`].
//!
//! Leaves here are arbitrary byte strings (the commitment layer encodes
//! `(index, payout address, amount)` per leaf), so proofs carry the leaf
//! hash rather than the raw leaf.

use serde::{Deserialize, Serialize};

use crate::types::Hash256;

/// Domain separation prefix for leaf hashes.
const LEAF_PREFIX: u8 = 0x00;

/// Domain separation prefix for internal node hashes.
const NODE_PREFIX: u8 = 0x01;

/// Compute a domain-separated leaf hash: `BLAKE3(0x00 || data)`.
pub fn leaf_hash(data: &[u8]) -> Hash256 {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&[LEAF_PREFIX]);
    hasher.update(data);
    Hash256(hasher.finalize().into())
}

/// Compute a domain-separated internal node hash: `BLAKE3(0x01 || left || right)`.
pub fn node_hash(left: &Hash256, right: &Hash256) -> Hash256 {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&[NODE_PREFIX]);
    hasher.update(left.as_bytes());
    hasher.update(right.as_bytes());
    Hash256(hasher.finalize().into())
}

/// Compute the Merkle root from encoded leaves without keeping the tree.
///
/// Returns [`Hash256::ZERO`] for an empty slice. Cheaper than building a
/// full [`MerkleTree`] when proofs are not needed (the verify path).
pub fn merkle_root<B: AsRef<[u8]>>(leaves: &[B]) -> Hash256 {
    if leaves.is_empty() {
        return Hash256::ZERO;
    }

    let mut current: Vec<Hash256> = leaves.iter().map(|l| leaf_hash(l.as_ref())).collect();

    while current.len() > 1 {
        current = next_layer(&current);
    }

    current[0]
}

/// Compute the next layer of the tree from the current one.
///
/// Pairs adjacent hashes with [`node_hash`]. Duplicates the last element
/// when the layer has an odd number of entries.
fn next_layer(layer: &[Hash256]) -> Vec<Hash256> {
    let mut next = Vec::with_capacity(layer.len().div_ceil(2));
    let mut i = 0;
    while i < layer.len() {
        let left = &layer[i];
        let right = if i + 1 < layer.len() {
            &layer[i + 1]
        } else {
            left
        };
        next.push(node_hash(left, right));
        i += 2;
    }
    next
}

/// Full Merkle tree supporting root computation and proof extraction.
///
/// Stores all intermediate layers so that inclusion proofs can be
/// extracted for any leaf index.
#[derive(Clone, Debug)]
pub struct MerkleTree {
    /// `layers[0]` = leaf hashes, `layers[last]` = `[root]`.
    layers: Vec<Vec<Hash256>>,
}

impl MerkleTree {
    /// Build a Merkle tree from encoded leaf byte strings.
    pub fn from_leaves<B: AsRef<[u8]>>(leaves: &[B]) -> Self {
        if leaves.is_empty() {
            return Self { layers: Vec::new() };
        }

        let mut layers = Vec::new();
        let leaf_layer: Vec<Hash256> = leaves.iter().map(|l| leaf_hash(l.as_ref())).collect();
        layers.push(leaf_layer);

        while layers.last().unwrap().len() > 1 {
            let prev = layers.last().unwrap();
            layers.push(next_layer(prev));
        }

        Self { layers }
    }

    /// The Merkle root. Returns [`Hash256::ZERO`] for an empty tree.
    pub fn root(&self) -> Hash256 {
        self.layers
            .last()
            .and_then(|l| l.first())
            .copied()
            .unwrap_or(Hash256::ZERO)
    }

    /// Number of leaves in the tree.
    pub fn leaf_count(&self) -> usize {
        self.layers.first().map_or(0, Vec::len)
    }

    /// Generate an inclusion proof for the leaf at `index`.
    ///
    /// Returns `None` if the index is out of bounds or the tree is empty.
    pub fn proof(&self, index: usize) -> Option<MerkleProof> {
        if self.layers.is_empty() || index >= self.leaf_count() {
            return None;
        }

        let mut path = Vec::new();
        let mut pos = index;

        // Walk from leaf layer to just below the root
        for layer in &self.layers[..self.layers.len() - 1] {
            let sibling_pos = pos ^ 1;
            let sibling = if sibling_pos < layer.len() {
                layer[sibling_pos]
            } else {
                // Odd layer: last element's sibling is itself (duplication)
                layer[pos]
            };

            let side = if pos % 2 == 0 {
                Side::Right
            } else {
                Side::Left
            };

            path.push(ProofStep {
                hash: sibling,
                side,
            });
            pos /= 2;
        }

        Some(MerkleProof {
            leaf_index: index,
            leaf: self.layers[0][index],
            path,
        })
    }
}

/// Which side a sibling hash is on relative to the current node.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq,
    bincode::Encode, bincode::Decode,
)]
pub enum Side {
    /// Sibling is on the left (we are on the right).
    Left,
    /// Sibling is on the right (we are on the left).
    Right,
}

/// A single step in a Merkle inclusion proof.
#[derive(
    Serialize, Deserialize, Clone, Debug, PartialEq, Eq,
    bincode::Encode, bincode::Decode,
)]
pub struct ProofStep {
    /// The sibling hash at this level of the tree.
    pub hash: Hash256,
    /// Which side the sibling is on.
    pub side: Side,
}

/// Merkle inclusion proof for a single claim leaf.
///
/// Carries the domain-separated hash of the leaf; callers holding the
/// raw claim bytes use [`verify_bytes`](Self::verify_bytes) to also pin
/// the hash to the data.
#[derive(
    Serialize, Deserialize, Clone, Debug, PartialEq, Eq,
    bincode::Encode, bincode::Decode,
)]
pub struct MerkleProof {
    /// Index of the leaf in the original tree.
    pub leaf_index: usize,
    /// Domain-separated hash of the leaf bytes.
    pub leaf: Hash256,
    /// Sibling hashes from leaf level up to root.
    pub path: Vec<ProofStep>,
}

impl MerkleProof {
    /// Verify this proof against an expected Merkle root.
    ///
    /// Folds the sibling path from the leaf hash up and compares.
    pub fn verify(&self, expected_root: &Hash256) -> bool {
        fold_path(self.leaf, &self.path) == *expected_root
    }

    /// Verify that `data` is the committed leaf and the proof holds.
    pub fn verify_bytes(&self, data: &[u8], expected_root: &Hash256) -> bool {
        leaf_hash(data) == self.leaf && self.verify(expected_root)
    }
}

/// Fold a sibling path upward from a leaf hash. Shared between
/// [`MerkleProof::verify`] and the commitment layer's claim checks.
pub fn fold_path(leaf: Hash256, path: &[ProofStep]) -> Hash256 {
    let mut current = leaf;
    for step in path {
        current = match step.side {
            Side::Left => node_hash(&step.hash, &current),
            Side::Right => node_hash(&current, &step.hash),
        };
    }
    current
}

//! Binary Merkle tree committing to the leaf encodings of the ephemeral verifying keys.
//!
//! Leaves are hashed as `H(0x00 || encoding)` and internal nodes as
//! `H(0x01 || left || right)`, with `H` being Blake2b-256. When the number of leaves is
//! not a power of two, the leaf level is padded with `Digest::EMPTY` up to the next
//! power of two. A tree with a single leaf has depth zero and its root is the leaf
//! digest.
//!
//! A proof is the list of sibling digests needed to recompute the root from a set of
//! leaves. Digests are listed level by level from the leaves upwards, and within a
//! level by increasing node index; a sibling is only listed when it cannot be derived
//! from the requested leaves. For a single leaf this is the classic audit path.
use crate::common::{tree_depth, Digest};
use crate::errors::Error;
use std::collections::{BTreeMap, BTreeSet};

#[cfg(feature = "parallel")]
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

#[cfg(feature = "serde_enabled")]
use serde::{Deserialize, Serialize};

/// Ordered sibling digests from the proven leaves up to the root.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde_enabled", derive(Serialize, Deserialize))]
pub struct Proof(pub Vec<Digest>);

impl Proof {
    /// Number of digests in the proof.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the proof holds no digest (single leaf trees).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Digests of the proof, bottom-up.
    pub fn digests(&self) -> &[Digest] {
        &self.0
    }
}

impl From<Vec<Digest>> for Proof {
    fn from(digests: Vec<Digest>) -> Self {
        Proof(digests)
    }
}

/// Merkle tree over an ordered sequence of leaf encodings. `levels[0]` holds the padded
/// leaf digests and the last level holds the root.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    levels: Vec<Vec<Digest>>,
    leaf_count: u64,
}

impl MerkleTree {
    /// Build the tree bottom-up from the leaf encodings.
    pub fn build<L: AsRef<[u8]> + Sync>(leaves: &[L]) -> Self {
        #[cfg(not(feature = "parallel"))]
        let mut level: Vec<Digest> = leaves
            .iter()
            .map(|leaf| Digest::hash_leaf(leaf.as_ref()))
            .collect();

        #[cfg(feature = "parallel")]
        let mut level: Vec<Digest> = leaves
            .par_iter()
            .map(|leaf| Digest::hash_leaf(leaf.as_ref()))
            .collect();

        let leaf_count = leaves.len() as u64;
        level.resize(1 << tree_depth(leaf_count), Digest::EMPTY);

        let mut levels = vec![level];
        while levels[levels.len() - 1].len() > 1 {
            let parents = levels[levels.len() - 1]
                .chunks(2)
                .map(|pair| pair[0].hash_pair(&pair[1]))
                .collect();
            levels.push(parents);
        }

        Self { levels, leaf_count }
    }

    /// Root of the tree.
    pub fn root(&self) -> Digest {
        self.levels[self.levels.len() - 1][0]
    }

    /// Number of committed (unpadded) leaves.
    pub fn leaf_count(&self) -> u64 {
        self.leaf_count
    }

    /// Height of the tree, which is the length of a single leaf proof.
    pub fn depth(&self) -> usize {
        self.levels.len() - 1
    }

    /// Produce the proof for `positions`. Duplicated positions are ignored and an
    /// empty set gives an empty proof.
    ///
    /// # Errors
    /// Fails with `PositionOutOfRange` if a position is not below `leaf_count`.
    pub fn prove(&self, positions: &[u64]) -> Result<Proof, Error> {
        let mut known = BTreeSet::new();
        for &position in positions {
            if position >= self.leaf_count {
                return Err(Error::PositionOutOfRange {
                    position,
                    len: self.leaf_count,
                });
            }
            known.insert(position);
        }

        let mut digests = Vec::new();
        for level in self.levels.iter().take(self.depth()) {
            let mut parents = BTreeSet::new();
            for &index in known.iter() {
                let sibling = index ^ 1;
                if !known.contains(&sibling) {
                    digests.push(level[sibling as usize]);
                }
                parents.insert(index >> 1);
            }
            known = parents;
        }

        Ok(Proof(digests))
    }
}

/// Recompute the root from a single leaf encoding and its audit path, taking the bits of
/// `position` from the least significant one to pick the side of each sibling. Returns
/// `true` iff the recomputed root equals `root`.
pub fn verify(root: &Digest, position: u64, leaf_encoding: &[u8], proof: &Proof) -> bool {
    // the position must fit in a tree of `proof.len()` levels
    if position.checked_shr(proof.len() as u32).unwrap_or(0) != 0 {
        return false;
    }

    let mut node = Digest::hash_leaf(leaf_encoding);
    let mut index = position;
    for sibling in proof.digests() {
        node = if index & 1 == 0 {
            node.hash_pair(sibling)
        } else {
            sibling.hash_pair(&node)
        };
        index >>= 1;
    }

    &node == root
}

/// Verify a multi-leaf proof produced by `MerkleTree::prove` for a tree of height
/// `depth`. `leaves` pairs each position with its leaf encoding. Every proof digest must
/// be consumed for the proof to be accepted.
pub fn verify_batch<L: AsRef<[u8]>>(
    root: &Digest,
    depth: usize,
    leaves: &[(u64, L)],
    proof: &Proof,
) -> bool {
    if leaves.is_empty() || depth >= 64 {
        return false;
    }

    let mut known = BTreeMap::new();
    for (position, leaf) in leaves {
        if *position >> depth != 0 {
            return false;
        }
        let digest = Digest::hash_leaf(leaf.as_ref());
        if let Some(previous) = known.insert(*position, digest) {
            if previous != digest {
                return false;
            }
        }
    }

    let mut siblings = proof.digests().iter();
    for _ in 0..depth {
        let mut parents = BTreeMap::new();
        for (&index, node) in known.iter() {
            let sibling_index = index ^ 1;
            if index & 1 == 1 && known.contains_key(&sibling_index) {
                // already combined with its left sibling
                continue;
            }
            let sibling = match known.get(&sibling_index) {
                Some(sibling) => sibling,
                None => match siblings.next() {
                    Some(sibling) => sibling,
                    None => return false,
                },
            };
            let parent = if index & 1 == 0 {
                node.hash_pair(sibling)
            } else {
                sibling.hash_pair(node)
            };
            parents.insert(index >> 1, parent);
        }
        known = parents;
    }

    siblings.next().is_none() && known.get(&0) == Some(root)
}

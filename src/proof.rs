//! Merkle Proof types, proof extraction and verification.

use crate::{
    error::Error,
    hash::{DigestProvider, MerkleHash},
    tree::ProofNode,
};
use log::{debug, trace};
use std::fmt;

/// Side occupied by the sibling digest relative to the node being
/// authenticated at that level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Direction {
    SiblingIsLeft = 0x0,
    SiblingIsRight = 0x1,
}

impl Direction {
    /// Tag byte written in front of the sibling digest
    pub fn tag(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Direction {
    type Error = Error;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        match tag {
            0x0 => Ok(Direction::SiblingIsLeft),
            0x1 => Ok(Direction::SiblingIsRight),
            other => Err(Error::InvalidDirectionTag(other)),
        }
    }
}

/// One level of a proof path
pub struct ProofStep<HF: DigestProvider> {
    pub direction: Direction,
    pub sibling: MerkleHash<HF>,
}

impl<HF: DigestProvider> ProofStep<HF> {
    pub fn new(direction: Direction, sibling: MerkleHash<HF>) -> Self {
        Self { direction, sibling }
    }

    /// Combine the running hash with this step's sibling
    pub fn apply(&self, current: &MerkleHash<HF>) -> MerkleHash<HF> {
        match self.direction {
            Direction::SiblingIsLeft => HF::hash_pair(&self.sibling, current),
            Direction::SiblingIsRight => HF::hash_pair(current, &self.sibling),
        }
    }
}

impl<HF: DigestProvider> Clone for ProofStep<HF> {
    fn clone(&self) -> Self {
        Self::new(self.direction, self.sibling.clone())
    }
}

impl<HF: DigestProvider> PartialEq for ProofStep<HF> {
    fn eq(&self, other: &Self) -> bool {
        self.direction == other.direction && self.sibling == other.sibling
    }
}

impl<HF: DigestProvider> Eq for ProofStep<HF> {}

impl<HF: DigestProvider> fmt::Debug for ProofStep<HF> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProofStep")
            .field("direction", &self.direction)
            .field("sibling", &self.sibling)
            .finish()
    }
}

/// Sibling digests needed to recompute the root from one block, ordered
/// from the leaf's sibling up to the child of the root.
pub struct ProofPath<HF: DigestProvider> {
    pub(crate) steps: Vec<ProofStep<HF>>,
}

impl<HF: DigestProvider> ProofPath<HF> {
    pub fn steps(&self) -> &[ProofStep<HF>] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ProofStep<HF>> {
        self.steps.iter()
    }

    /// Compute the implied Merkle Root Hash of `block` from the path
    pub fn reconstruct_root(&self, block: &[u8]) -> MerkleHash<HF> {
        self.steps
            .iter()
            .fold(HF::hash_one(block), |current, step| step.apply(&current))
    }

    /// Check that `block` hashed along the path yields `root`
    pub fn verify(&self, root: &MerkleHash<HF>, block: &[u8]) -> bool {
        let implied_root = self.reconstruct_root(block);
        let valid = &implied_root == root;
        trace!(
            "proof of {} steps implies root {}, expected {}: {}",
            self.len(),
            implied_root,
            root,
            if valid { "valid" } else { "mismatch" }
        );
        valid
    }
}

impl<HF: DigestProvider> Default for ProofPath<HF> {
    fn default() -> Self {
        Self { steps: Vec::new() }
    }
}

impl<HF: DigestProvider> Clone for ProofPath<HF> {
    fn clone(&self) -> Self {
        Self {
            steps: self.steps.clone(),
        }
    }
}

impl<HF: DigestProvider> PartialEq for ProofPath<HF> {
    fn eq(&self, other: &Self) -> bool {
        self.steps == other.steps
    }
}

impl<HF: DigestProvider> Eq for ProofPath<HF> {}

impl<HF: DigestProvider> fmt::Debug for ProofPath<HF> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.steps).finish()
    }
}

impl<HF: DigestProvider> From<Vec<ProofStep<HF>>> for ProofPath<HF> {
    fn from(steps: Vec<ProofStep<HF>>) -> Self {
        Self { steps }
    }
}

impl<HF: DigestProvider> IntoIterator for ProofPath<HF> {
    type Item = ProofStep<HF>;
    type IntoIter = std::vec::IntoIter<ProofStep<HF>>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.into_iter()
    }
}

impl<'a, HF: DigestProvider> IntoIterator for &'a ProofPath<HF> {
    type Item = &'a ProofStep<HF>;
    type IntoIter = std::slice::Iter<'a, ProofStep<HF>>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

/// Find the proof path of `block` in a proof tree.
///
/// The tree is searched depth first, left child before right. If the same
/// block was supplied more than once the path of its leftmost occurrence is
/// returned, callers that need a specific position must track it themselves.
/// Returns `None` if no leaf holds the hash of `block`.
pub fn find_proof_path<HF: DigestProvider>(
    tree: &ProofNode<HF>,
    block: &[u8],
) -> Option<ProofPath<HF>> {
    let target = HF::hash_one(block);
    let path = collect_path(tree, &target).map(ProofPath::from);
    match &path {
        Some(path) => trace!("found leaf {} at depth {}", target, path.len()),
        None => trace!("leaf {} is not part of the tree", target),
    }
    path
}

/// Steps are pushed while the recursion unwinds, so the deepest sibling
/// ends up first.
fn collect_path<HF: DigestProvider>(
    node: &ProofNode<HF>,
    target: &MerkleHash<HF>,
) -> Option<Vec<ProofStep<HF>>> {
    let (left, right) = match node.children() {
        None => return node.matches(target).then(Vec::new),
        Some(children) => children,
    };
    if let Some(mut path) = collect_path(left, target) {
        path.push(ProofStep::new(Direction::SiblingIsRight, right.digest().clone()));
        return Some(path);
    }
    let mut path = collect_path(right, target)?;
    path.push(ProofStep::new(Direction::SiblingIsLeft, left.digest().clone()));
    Some(path)
}

/// Recompute the root implied by `block` and its proof path
pub fn reconstruct_root<HF: DigestProvider>(path: &ProofPath<HF>, block: &[u8]) -> MerkleHash<HF> {
    path.reconstruct_root(block)
}

/// Verify `block` against a trusted `root`. Needs neither the tree nor the
/// other blocks.
pub fn verify<HF: DigestProvider>(
    root: &MerkleHash<HF>,
    path: &ProofPath<HF>,
    block: &[u8],
) -> bool {
    path.verify(root, block)
}

/// Decode a proof path from its byte encoding and verify it.
///
/// Sibling digests are expected to be `HF::hash_len()` bytes long. A
/// malformed encoding is an `Err`, a well formed path that does not lead to
/// `root` is `Ok(false)`.
pub fn verify_encoded<HF: DigestProvider>(
    root: &MerkleHash<HF>,
    encoded_path: &[u8],
    block: &[u8],
) -> Result<bool, Error> {
    let path = ProofPath::<HF>::from_bytes(encoded_path).map_err(|err| {
        debug!("rejecting encoded proof path: {}", err);
        err
    })?;
    Ok(path.verify(root, block))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        test_utils::{blocks, flip_byte},
        tree::{build, MerkleTree},
    };
    use blake2::Blake2s256;
    use hex_literal::hex;
    use proptest::prelude::*;
    use ripemd::Ripemd160;
    use sha3::{Sha3_256, Sha3_512};

    #[test]
    fn test_three_block_proofs() {
        let (root, tree) = build::<Sha3_256, _>(&["a", "b", "c"]).unwrap();
        let hash_a = Sha3_256::hash_one(b"a");
        let hash_b = Sha3_256::hash_one(b"b");
        let hash_c = Sha3_256::hash_one(b"c");
        let hash_ab = Sha3_256::hash_pair(&hash_a, &hash_b);

        let path_c = find_proof_path(&tree, b"c").unwrap();
        assert_eq!(
            path_c.steps(),
            &[ProofStep::new(Direction::SiblingIsLeft, hash_ab)]
        );
        assert_eq!(
            path_c.steps()[0].sibling,
            hex!("29df505440ebe180c00857e92b0694c56a33762b08944472492b0cbf6ec607e3")
        );

        let path_a = find_proof_path(&tree, b"a").unwrap();
        assert_eq!(
            path_a.steps(),
            &[
                ProofStep::new(Direction::SiblingIsRight, hash_b.clone()),
                ProofStep::new(Direction::SiblingIsRight, hash_c.clone()),
            ]
        );

        let path_b = find_proof_path(&tree, b"b").unwrap();
        assert_eq!(
            path_b.steps(),
            &[
                ProofStep::new(Direction::SiblingIsLeft, hash_a),
                ProofStep::new(Direction::SiblingIsRight, hash_c),
            ]
        );

        for (path, block) in [(&path_a, b"a"), (&path_b, b"b"), (&path_c, b"c")] {
            assert!(verify(&root, path, block));
        }
        assert!(!verify(&root, &path_a, b"b"));
    }

    #[test]
    fn test_ripemd160_proof() {
        let (root, tree) = build::<Ripemd160, _>(&["a", "b", "c"]).unwrap();
        let path = find_proof_path(&tree, b"c").unwrap();
        assert_eq!(path.len(), 1);
        assert_eq!(path.steps()[0].direction, Direction::SiblingIsLeft);
        assert_eq!(
            path.steps()[0].sibling,
            hex!("8b9afa381e96d10f51d7a16c61d271bb493c291b")
        );
        assert_eq!(
            reconstruct_root(&path, b"c"),
            hex!("f6485145b1b9e5e7cd79ac6d6bab72181111b785")
        );
        assert!(verify(&root, &path, b"c"));
    }

    #[test]
    fn test_single_block_empty_path() {
        let (root, tree) = build::<Sha3_256, _>(&[b"solo"]).unwrap();
        let path = find_proof_path(&tree, b"solo").unwrap();
        assert!(path.is_empty());
        assert_eq!(reconstruct_root(&path, b"solo"), root);
        assert!(verify(&root, &path, b"solo"));
        assert!(find_proof_path(&tree, b"other").is_none());
    }

    #[test]
    fn test_all_blocks_verify() {
        for n in 1..=20 {
            let data = blocks(n, 66);
            let tree = MerkleTree::<Blake2s256>::from_blocks(&data).unwrap();
            let wide = MerkleTree::<Sha3_512>::from_blocks(&data).unwrap();
            for block in &data {
                let path = tree.find_proof_path(block).unwrap();
                assert!(path.len() <= tree.proof_tree().height());
                assert!(verify(tree.root(), &path, block));

                let wide_path = wide.find_proof_path(block).unwrap();
                assert_eq!(wide_path.len(), path.len());
                assert!(verify(wide.root(), &wide_path, block));
            }
        }
    }

    #[test]
    fn test_encoded_path_is_tied_to_hash_length() {
        let data = blocks(7, 8);
        let tree = MerkleTree::<Sha3_256>::from_blocks(&data).unwrap();
        let encoded = tree.find_proof_path(&data[3]).unwrap().to_bytes();
        assert_eq!(verify_encoded::<Sha3_256>(tree.root(), &encoded, &data[3]), Ok(true));

        // Three 33 byte steps do not split into 65 byte ones
        assert_eq!(
            ProofPath::<Sha3_512>::from_bytes(&encoded),
            Err(Error::TruncatedStep {
                offset: 65,
                remaining: 34
            })
        );
        // nor into 21 byte ones, the second chunk starts with a digest byte
        assert!(ProofPath::<Ripemd160>::from_bytes(&encoded).is_err());
    }

    #[test]
    fn test_duplicate_blocks_use_leftmost_leaf() {
        let (root, tree) = build::<Sha3_256, _>(&["x", "y", "x", "z"]).unwrap();
        let path = find_proof_path(&tree, b"x").unwrap();
        assert_eq!(path.steps()[0].direction, Direction::SiblingIsRight);
        assert_eq!(path.steps()[0].sibling, Sha3_256::hash_one(b"y"));
        assert!(verify(&root, &path, b"x"));
    }

    #[test]
    fn test_verify_encoded_distinguishes_malformed() {
        let (root, tree) = build::<Sha3_256, _>(&["a", "b", "c"]).unwrap();
        let encoded = find_proof_path(&tree, b"a").unwrap().to_bytes();

        assert_eq!(verify_encoded(&root, &encoded, b"a"), Ok(true));
        assert_eq!(verify_encoded(&root, &encoded, b"c"), Ok(false));

        let mut bad_tag = encoded.clone();
        bad_tag[33] = 0x7;
        assert_eq!(
            verify_encoded(&root, &bad_tag, b"a"),
            Err(Error::UnknownDirection {
                tag: 0x7,
                offset: 33
            })
        );
        assert_eq!(
            verify_encoded(&root, &encoded[..40], b"a"),
            Err(Error::TruncatedStep {
                offset: 33,
                remaining: 7
            })
        );
    }

    #[test]
    fn test_shared_tree_across_threads() {
        let data = blocks(32, 24);
        let tree = MerkleTree::<Sha3_256>::from_blocks(&data).unwrap();
        std::thread::scope(|scope| {
            for chunk in data.chunks(8) {
                let tree = &tree;
                scope.spawn(move || {
                    for block in chunk {
                        let path = tree.find_proof_path(block).unwrap();
                        assert!(verify(tree.root(), &path, block));
                    }
                });
            }
        });
    }

    #[test]
    fn test_direction_tags() {
        assert_eq!(Direction::SiblingIsLeft.tag(), 0x0);
        assert_eq!(Direction::SiblingIsRight.tag(), 0x1);
        assert_eq!(Direction::try_from(0x0), Ok(Direction::SiblingIsLeft));
        assert_eq!(Direction::try_from(0x1), Ok(Direction::SiblingIsRight));
        assert_eq!(
            Direction::try_from(0x2),
            Err(Error::InvalidDirectionTag(0x2))
        );
    }

    proptest! {
        #[test]
        fn test_round_trip_and_tamper(
            data in prop::collection::vec(prop::collection::vec(any::<u8>(), 1..48), 1..40),
            pick in any::<prop::sample::Index>(),
            flip in any::<prop::sample::Index>(),
        ) {
            let tree = MerkleTree::<Sha3_256>::from_blocks(&data).unwrap();
            let block = &data[pick.index(data.len())];
            let path = tree.find_proof_path(block).unwrap();
            prop_assert!(verify(tree.root(), &path, block));

            let flipped_root = flip_byte(tree.root(), flip.index(32));
            let tampered_root = MerkleHash::try_from(&flipped_root[..]).unwrap();
            prop_assert!(!verify(&tampered_root, &path, block));

            let tampered_block = flip_byte(block, flip.index(block.len()));
            if !data.contains(&tampered_block) {
                prop_assert!(!verify(tree.root(), &path, &tampered_block));
                prop_assert!(tree.find_proof_path(&tampered_block).is_none());
            }

            if !path.is_empty() {
                let encoded = path.to_bytes();
                let step = flip.index(path.len());
                let tampered = flip_byte(&encoded, step * 33 + 1 + flip.index(32));
                let tampered_path = ProofPath::from_bytes(&tampered).unwrap();
                prop_assert!(!verify(tree.root(), &tampered_path, block));
            }
        }

        #[test]
        fn test_build_is_deterministic_and_order_sensitive(
            data in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..32), 2..24),
            i in any::<prop::sample::Index>(),
            j in any::<prop::sample::Index>(),
        ) {
            let (root, _) = build::<Blake2s256, _>(&data).unwrap();
            let (again, _) = build::<Blake2s256, _>(&data).unwrap();
            prop_assert_eq!(&root, &again);

            let (i, j) = (i.index(data.len()), j.index(data.len()));
            if data[i] != data[j] {
                let mut swapped = data.clone();
                swapped.swap(i, j);
                let (swapped_root, _) = build::<Blake2s256, _>(&swapped).unwrap();
                prop_assert_ne!(&root, &swapped_root);
            }
        }
    }
}

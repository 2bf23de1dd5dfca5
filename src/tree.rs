//! Proof tree construction.

use crate::{
    hash::{DigestProvider, MerkleHash},
    proof::{find_proof_path, ProofPath},
};
use log::debug;
use std::fmt;

/// Node of a proof tree. Leaves hold the hash of one data block, internal
/// nodes hold `hash_pair(left, right)` and own both children.
///
/// Nodes can only be produced by [`build`], which keeps every internal
/// digest consistent with its children:
///
/// ```compile_fail
/// use merkle_proof::{DigestProvider, ProofNode};
/// use sha3::Sha3_256;
///
/// let leaf = ProofNode::<Sha3_256>::Leaf(Sha3_256::hash_one(b"a"));
/// ```
pub enum ProofNode<HF: DigestProvider> {
    #[non_exhaustive]
    Leaf(MerkleHash<HF>),
    #[non_exhaustive]
    Internal {
        digest: MerkleHash<HF>,
        left: Box<ProofNode<HF>>,
        right: Box<ProofNode<HF>>,
    },
}

impl<HF: DigestProvider> ProofNode<HF> {
    /// Combine two subtrees under a new internal node
    pub(crate) fn internal(left: ProofNode<HF>, right: ProofNode<HF>) -> Self {
        let digest = HF::hash_pair(left.digest(), right.digest());
        ProofNode::Internal {
            digest,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn digest(&self) -> &MerkleHash<HF> {
        match self {
            ProofNode::Leaf(digest) | ProofNode::Internal { digest, .. } => digest,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, ProofNode::Leaf(..))
    }

    /// Left and right children of an internal node
    pub fn children(&self) -> Option<(&ProofNode<HF>, &ProofNode<HF>)> {
        match self {
            ProofNode::Leaf(..) => None,
            ProofNode::Internal { left, right, .. } => Some((&**left, &**right)),
        }
    }

    /// Whether this node is a leaf holding `hash`
    pub fn matches(&self, hash: &MerkleHash<HF>) -> bool {
        matches!(self, ProofNode::Leaf(digest) if digest == hash)
    }

    /// Number of data blocks committed to by this subtree
    pub fn leaf_count(&self) -> usize {
        match self.children() {
            None => 1,
            Some((left, right)) => left.leaf_count() + right.leaf_count(),
        }
    }

    /// Number of edges on the longest path down to a leaf
    pub fn height(&self) -> usize {
        match self.children() {
            None => 0,
            Some((left, right)) => 1 + left.height().max(right.height()),
        }
    }

    /// Render every internal node, depth first and left to right, using the
    /// node's `Display` format.
    pub fn tree_string(&self) -> String {
        let mut out = String::new();
        self.write_tree(&mut out);
        out
    }

    fn write_tree(&self, out: &mut String) {
        if let Some((left, right)) = self.children() {
            out.push_str(&self.to_string());
            left.write_tree(out);
            right.write_tree(out);
        }
    }
}

impl<HF: DigestProvider> Clone for ProofNode<HF> {
    fn clone(&self) -> Self {
        match self {
            ProofNode::Leaf(digest) => ProofNode::Leaf(digest.clone()),
            ProofNode::Internal {
                digest,
                left,
                right,
            } => ProofNode::Internal {
                digest: digest.clone(),
                left: left.clone(),
                right: right.clone(),
            },
        }
    }
}

impl<HF: DigestProvider> PartialEq for ProofNode<HF> {
    fn eq(&self, other: &Self) -> bool {
        self.digest() == other.digest() && self.children() == other.children()
    }
}

impl<HF: DigestProvider> Eq for ProofNode<HF> {}

impl<HF: DigestProvider> fmt::Debug for ProofNode<HF> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.children() {
            None => f.debug_tuple("Leaf").field(self.digest()).finish(),
            Some((left, right)) => f
                .debug_struct("Internal")
                .field("digest", self.digest())
                .field("left", left)
                .field("right", right)
                .finish(),
        }
    }
}

impl<HF: DigestProvider> fmt::Display for ProofNode<HF> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "hash:{}", self.digest())?;
        if let Some((left, right)) = self.children() {
            writeln!(f, "  left:{}", left.digest())?;
            writeln!(f, "  right:{}", right.digest())?;
        }
        Ok(())
    }
}

/// Build the proof tree of an ordered sequence of blocks.
///
/// Returns `None` for an empty sequence. Otherwise the blocks are split at
/// `ceil(n / 2)`, the larger half on the left, and each half is built
/// recursively. Any other split rule yields a different root for the same
/// blocks.
pub fn build<HF: DigestProvider, B: AsRef<[u8]>>(
    blocks: &[B],
) -> Option<(MerkleHash<HF>, ProofNode<HF>)> {
    if blocks.is_empty() {
        debug!("no blocks supplied, nothing to build");
        return None;
    }
    let tree = build_subtree::<HF, B>(blocks);
    let root = tree.digest().clone();
    debug!("built merkle tree over {} blocks, root: {}", blocks.len(), root);
    Some((root, tree))
}

fn build_subtree<HF: DigestProvider, B: AsRef<[u8]>>(blocks: &[B]) -> ProofNode<HF> {
    match blocks {
        [block] => ProofNode::Leaf(HF::hash_one(block.as_ref())),
        _ => {
            let (left, right) = blocks.split_at((blocks.len() + 1) / 2);
            ProofNode::internal(
                build_subtree::<HF, B>(left),
                build_subtree::<HF, B>(right),
            )
        }
    }
}

/// Merkle Tree built once from a fixed sequence of blocks
pub struct MerkleTree<HF: DigestProvider> {
    root: MerkleHash<HF>,
    tree: ProofNode<HF>,
}

impl<HF: DigestProvider> MerkleTree<HF> {
    /// Build a tree, `None` if `blocks` is empty
    pub fn from_blocks<B: AsRef<[u8]>>(blocks: &[B]) -> Option<Self> {
        let (root, tree) = build::<HF, B>(blocks)?;
        Some(Self { root, tree })
    }

    /// Get the merkle root of the tree
    pub fn root(&self) -> &MerkleHash<HF> {
        &self.root
    }

    pub fn proof_tree(&self) -> &ProofNode<HF> {
        &self.tree
    }

    /// Get the number of leaves in the tree
    pub fn num_leaves(&self) -> usize {
        self.tree.leaf_count()
    }

    /// Proof path for `block`, `None` if the block is not a leaf of the tree
    pub fn find_proof_path(&self, block: &[u8]) -> Option<ProofPath<HF>> {
        find_proof_path(&self.tree, block)
    }

    pub fn into_parts(self) -> (MerkleHash<HF>, ProofNode<HF>) {
        (self.root, self.tree)
    }
}

impl<HF: DigestProvider> Clone for MerkleTree<HF> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            tree: self.tree.clone(),
        }
    }
}

impl<HF: DigestProvider> fmt::Debug for MerkleTree<HF> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MerkleTree")
            .field("root", &self.root)
            .field("tree", &self.tree)
            .finish()
    }
}

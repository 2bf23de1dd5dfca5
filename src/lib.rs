//! Merkle Tree inclusion proofs
//!
//! Builds a binary hash tree over an ordered sequence of blocks, extracts the
//! sibling path of any block, and verifies such a path against nothing but
//! the root hash.
//!
//! ```
//! use merkle_proof::{build, find_proof_path, verify};
//! use sha3::Sha3_256;
//!
//! let (root, tree) = build::<Sha3_256, _>(&["a", "b", "c"]).unwrap();
//! let path = find_proof_path::<Sha3_256>(&tree, b"c").unwrap();
//! assert!(verify::<Sha3_256>(&root, &path, b"c"));
//! ```
//!
//! Any RustCrypto hasher can be used, the digest length follows it:
//!
//! ```
//! use merkle_proof::{verify_encoded, MerkleTree};
//! use ripemd::Ripemd160;
//!
//! let tree = MerkleTree::<Ripemd160>::from_blocks(&["a", "b", "c"]).unwrap();
//! let encoded = tree.find_proof_path(b"a").unwrap().to_bytes();
//! assert_eq!(encoded.len(), 2 * 21);
//! assert_eq!(verify_encoded(tree.root(), &encoded, b"a"), Ok(true));
//! ```

mod encoding;
mod error;
mod hash;
mod proof;
mod tree;

pub use crate::{
    error::Error,
    hash::{DigestProvider, MerkleHash},
    proof::{
        find_proof_path, reconstruct_root, verify, verify_encoded, Direction, ProofPath,
        ProofStep,
    },
    tree::{build, MerkleTree, ProofNode},
};

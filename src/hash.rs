//! Digest type and the hash function seam

use crate::error::Error;
use sha3::digest::{
    generic_array::GenericArray, typenum::Unsigned, Digest, Output, OutputSizeUser,
};
use std::{fmt, hash, ops::Deref};

/// Hash function used to build and verify trees.
///
/// Implemented for every RustCrypto hasher, so the primitive is picked with
/// a type parameter, e.g. `build::<Sha3_256, _>(..)` or
/// `build::<Ripemd160, _>(..)`. The digest length follows the hasher.
pub trait DigestProvider: OutputSizeUser + Sized {
    /// Hash a single data block
    fn hash_one(block: &[u8]) -> MerkleHash<Self>;

    /// Hash the concatenation `left || right`. Order matters.
    fn hash_pair(left: &[u8], right: &[u8]) -> MerkleHash<Self>;

    /// Length in bytes of every digest this hasher produces
    fn hash_len() -> usize {
        <<Self as OutputSizeUser>::OutputSize as Unsigned>::USIZE
    }
}

impl<D: Digest> DigestProvider for D {
    fn hash_one(block: &[u8]) -> MerkleHash<Self> {
        MerkleHash(D::digest(block))
    }

    fn hash_pair(left: &[u8], right: &[u8]) -> MerkleHash<Self> {
        let mut hasher = D::new();

        Digest::update(&mut hasher, left);
        Digest::update(&mut hasher, right);
        MerkleHash(hasher.finalize())
    }
}

/// Container for Merkle Hashes produced by `HF`
pub struct MerkleHash<HF: DigestProvider>(pub(crate) Output<HF>);

impl<HF: DigestProvider> MerkleHash<HF> {
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_slice()
    }
}

impl<HF: DigestProvider> Clone for MerkleHash<HF> {
    fn clone(&self) -> Self {
        MerkleHash(self.0.clone())
    }
}

impl<HF: DigestProvider> PartialEq for MerkleHash<HF> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<HF: DigestProvider> Eq for MerkleHash<HF> {}

impl<HF: DigestProvider> hash::Hash for MerkleHash<HF> {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state)
    }
}

impl<HF: DigestProvider> Deref for MerkleHash<HF> {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        self.0.as_slice()
    }
}

impl<HF: DigestProvider> AsRef<[u8]> for MerkleHash<HF> {
    fn as_ref(&self) -> &[u8] {
        self.0.as_slice()
    }
}

impl<HF: DigestProvider> From<Output<HF>> for MerkleHash<HF> {
    fn from(output: Output<HF>) -> Self {
        MerkleHash(output)
    }
}

impl<HF: DigestProvider> TryFrom<&[u8]> for MerkleHash<HF> {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        GenericArray::from_exact_iter(bytes.iter().copied())
            .map(MerkleHash)
            .ok_or(Error::InvalidHashLength {
                expected: HF::hash_len(),
                actual: bytes.len(),
            })
    }
}

impl<HF: DigestProvider, const N: usize> PartialEq<[u8; N]> for MerkleHash<HF> {
    fn eq(&self, other: &[u8; N]) -> bool {
        self.0.as_slice() == &other[..]
    }
}

impl<HF: DigestProvider> fmt::LowerHex for MerkleHash<HF> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0.as_slice()))
    }
}

impl<HF: DigestProvider> fmt::Display for MerkleHash<HF> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(self, f)
    }
}

impl<HF: DigestProvider> fmt::Debug for MerkleHash<HF> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MerkleHash({})", self)
    }
}

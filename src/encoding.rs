//! Byte encoding of proof paths.
//!
//! Each step is written as a direction tag (`0x00` sibling on the left,
//! `0x01` sibling on the right) followed by the sibling digest, whose length
//! is fixed by the hasher. A path is the concatenation of its steps, leaf
//! level first. There is no length prefix, an empty path encodes to no bytes
//! at all.

use crate::{
    error::Error,
    hash::{DigestProvider, MerkleHash},
    proof::{Direction, ProofPath, ProofStep},
};

impl<HF: DigestProvider> ProofStep<HF> {
    /// Encoded size of a single step: tag byte plus digest
    pub fn encoded_len() -> usize {
        1 + HF::hash_len()
    }

    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.push(self.direction.tag());
        out.extend_from_slice(&self.sibling);
    }

    fn read_from(bytes: &[u8], offset: usize) -> Result<Self, Error> {
        let step_len = Self::encoded_len();
        if bytes.len() < step_len {
            return Err(Error::TruncatedStep {
                offset,
                remaining: bytes.len(),
            });
        }
        let direction = Direction::try_from(bytes[0]).map_err(|_| Error::UnknownDirection {
            tag: bytes[0],
            offset,
        })?;
        let sibling = MerkleHash::try_from(&bytes[1..step_len])?;
        Ok(ProofStep::new(direction, sibling))
    }
}

impl<HF: DigestProvider> ProofPath<HF> {
    pub fn encoded_len(&self) -> usize {
        self.len() * ProofStep::<HF>::encoded_len()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        for step in self {
            step.write_to(&mut out);
        }
        out
    }

    /// Decode a path, rejecting unknown tags and truncated steps before any
    /// hashing takes place
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let step_len = ProofStep::<HF>::encoded_len();
        let mut steps = Vec::with_capacity(bytes.len() / step_len);
        let mut offset = 0;
        while offset < bytes.len() {
            steps.push(ProofStep::read_from(&bytes[offset..], offset)?);
            offset += step_len;
        }
        Ok(ProofPath::from(steps))
    }
}

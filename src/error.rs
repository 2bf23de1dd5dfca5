//! Merkle Proof Errors

use displaydoc::Display;

#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum Error {
    /// Direction tag: {0} is neither sibling-is-left (0) nor sibling-is-right (1)
    InvalidDirectionTag(u8),
    /// Unknown direction tag: {tag} at byte offset: {offset}
    UnknownDirection { tag: u8, offset: usize },
    /// Proof step at byte offset: {offset} is truncated, only {remaining} bytes left
    TruncatedStep { offset: usize, remaining: usize },
    /// Digest must be {expected} bytes, got: {actual}
    InvalidHashLength { expected: usize, actual: usize },
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            Error::InvalidDirectionTag(7).to_string(),
            "Direction tag: 7 is neither sibling-is-left (0) nor sibling-is-right (1)"
        );
        assert_eq!(
            Error::UnknownDirection { tag: 2, offset: 33 }.to_string(),
            "Unknown direction tag: 2 at byte offset: 33"
        );
        assert_eq!(
            Error::TruncatedStep {
                offset: 66,
                remaining: 5
            }
            .to_string(),
            "Proof step at byte offset: 66 is truncated, only 5 bytes left"
        );
        assert_eq!(
            Error::InvalidHashLength {
                expected: 20,
                actual: 32
            }
            .to_string(),
            "Digest must be 20 bytes, got: 32"
        );
    }
}

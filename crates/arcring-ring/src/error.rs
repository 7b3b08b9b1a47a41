//! Error types for ring operations.

use thiserror::Error;

use crate::KeyId;

/// Result type for ring operations.
pub type Result<T> = std::result::Result<T, RingError>;

/// Errors that can occur when querying or building a ring.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RingError {
    /// Ownership was requested from a ring with no nodes.
    #[error("ring has no nodes; at least one node is required to resolve a key")]
    EmptyRing,

    /// A position outside `[0, 360)` was supplied.
    #[error("position {0} is outside the ring (expected 0..360)")]
    PositionOutOfRange(u32),

    /// The key is not present on the ring.
    #[error("key {0} is not on the ring")]
    UnknownKey(KeyId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_value() {
        assert!(RingError::PositionOutOfRange(400).to_string().contains("400"));
        assert!(RingError::UnknownKey(KeyId::new(7)).to_string().contains("K7"));
    }
}

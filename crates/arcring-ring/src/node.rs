//! Nodes and keys placed on the ring.

use rand::Rng;

use crate::RingPosition;

/// Label of a node: `A`, `B`, ..., `Z`, `AA`, `AB`, ...
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct NodeId(String);

impl NodeId {
    /// Wrap an arbitrary label.
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// The label at `index` in the alphabetic sequence.
    ///
    /// Bijective base 26, so 0 is `A`, 25 is `Z` and 26 is `AA`.
    pub fn from_index(index: usize) -> Self {
        let mut n = index + 1;
        let mut label = Vec::new();
        while n > 0 {
            n -= 1;
            label.push(b'A' + (n % 26) as u8);
            n /= 26;
        }
        label.reverse();
        Self(label.into_iter().map(char::from).collect())
    }

    /// The first label in the sequence not already taken by `nodes`.
    ///
    /// At most `nodes.len()` labels can be taken, so one of the first
    /// `nodes.len() + 1` candidates is always free.
    pub fn next_unused(nodes: &[Node]) -> Self {
        let mut index = 0;
        loop {
            let candidate = Self::from_index(index);
            if nodes.iter().all(|n| n.id != candidate) {
                return candidate;
            }
            index += 1;
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Counter-based key identifier, displayed as `K<n>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct KeyId(u64);

impl KeyId {
    pub const fn new(counter: u64) -> Self {
        Self(counter)
    }

    pub const fn counter(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for KeyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "K{}", self.0)
    }
}

/// A participant owning the arc that ends at its position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    pub id: NodeId,
    pub position: RingPosition,
}

impl Node {
    pub fn new(id: NodeId, position: RingPosition) -> Self {
        Self { id, position }
    }

    /// A node with the next unused label at a random position.
    pub fn fresh<R: Rng + ?Sized>(existing: &[Node], rng: &mut R) -> Self {
        Self::new(NodeId::next_unused(existing), RingPosition::random(rng))
    }
}

/// A data item assigned to exactly one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Key {
    pub id: KeyId,
    pub position: RingPosition,
}

impl Key {
    pub fn new(id: KeyId, position: RingPosition) -> Self {
        Self { id, position }
    }
}

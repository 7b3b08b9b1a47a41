//! Arcring Ring Model
//!
//! Consistent-hashing ring assignment on a 360-degree circle.
//!
//! # Model
//!
//! Nodes and keys sit at whole-degree positions in `[0, 360)`. A key is owned
//! by the first node at or clockwise after its position; a key past the
//! highest node wraps around to the lowest one. Each node therefore owns the
//! arc between its predecessor (exclusive) and itself (inclusive).
//!
//! Adding a node only moves keys from the arc it splits, which is the
//! minimal-disruption property of consistent hashing.
//!
//! # Randomness
//!
//! New nodes and keys are placed with an injected [`rand::Rng`], so every
//! run is reproducible from a seed:
//!
//! ```
//! use arcring_ring::Ring;
//!
//! let mut ring = Ring::seeded(7);
//! let key = ring.add_key();
//! let owner = ring.owner_of(key.id).unwrap();
//! assert!(["A", "B", "C"].contains(&owner.as_str()));
//! ```

mod assign;
mod error;
mod node;
mod position;
mod ring;

pub use assign::{
    add_key, add_node, arcs, assignments, load, moved_keys, reset, responsible_node, Assignment,
    KeyMove, NodeArc, NodeLoad, RingState, FIRST_KEY, INITIAL_NODES,
};
pub use error::{Result, RingError};
pub use node::{Key, KeyId, Node, NodeId};
pub use position::{RingPosition, RING_DEGREES};
pub use ring::Ring;

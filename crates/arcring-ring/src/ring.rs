//! Mutable ring controller.
//!
//! Owns the node and key containers plus the random source used to place
//! new members. Nodes are kept sorted ascending by position.

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::assign::{self, insert_sorted, Assignment, NodeArc, NodeLoad, RingState, FIRST_KEY};
use crate::error::{Result, RingError};
use crate::{Key, KeyId, Node, NodeId, RingPosition};

/// A consistent-hashing ring with injected randomness.
#[derive(Debug, Clone)]
pub struct Ring<R> {
    nodes: Vec<Node>,
    keys: Vec<Key>,
    next_key: u64,
    rng: R,
}

impl Ring<StdRng> {
    /// A ring whose placements are reproducible from `seed`.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Ring<R> {
    /// Create a ring in the reset topology.
    pub fn new(rng: R) -> Self {
        let RingState { nodes, keys } = assign::reset();
        Self {
            nodes,
            keys,
            next_key: FIRST_KEY,
            rng,
        }
    }

    /// Nodes in ascending position order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Keys in creation order.
    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    /// Counter the next key will receive.
    pub fn next_key(&self) -> u64 {
        self.next_key
    }

    /// Add a node with the next unused label at a random position.
    pub fn add_node(&mut self) -> Node {
        let node = Node::fresh(&self.nodes, &mut self.rng);
        insert_sorted(&mut self.nodes, node.clone());
        node
    }

    /// Add a key at a random position. Node topology is unchanged.
    pub fn add_key(&mut self) -> Key {
        let key = Key::new(KeyId::new(self.next_key), RingPosition::random(&mut self.rng));
        self.next_key += 1;
        self.keys.push(key);
        key
    }

    /// Add a key and resolve its owner.
    ///
    /// Fails with `EmptyRing` before anything is placed, so the key counter
    /// and key list stay untouched on error.
    pub fn add_assigned_key(&mut self) -> Result<Assignment> {
        if self.nodes.is_empty() {
            return Err(RingError::EmptyRing);
        }
        let Key { id, position } = self.add_key();
        let owner = self.responsible(position)?.clone();
        Ok(Assignment { key: id, position, owner })
    }

    /// Restore the three-node starting topology and drop every key.
    pub fn reset(&mut self) {
        let RingState { nodes, keys } = assign::reset();
        self.nodes = nodes;
        self.keys = keys;
        self.next_key = FIRST_KEY;
    }

    /// Node responsible for an arbitrary position.
    pub fn responsible(&self, position: RingPosition) -> Result<&NodeId> {
        assign::responsible_node(position, &self.nodes)
    }

    /// Node responsible for a key already on the ring.
    pub fn owner_of(&self, key: KeyId) -> Result<&NodeId> {
        let key = self
            .keys
            .iter()
            .find(|k| k.id == key)
            .ok_or(RingError::UnknownKey(key))?;
        self.responsible(key.position)
    }

    /// Every key paired with its current owner.
    pub fn assignments(&self) -> Result<Vec<Assignment>> {
        assign::assignments(&self.keys, &self.nodes)
    }

    /// The arc each node owns, in ring order.
    pub fn arcs(&self) -> Vec<NodeArc> {
        assign::arcs(&self.nodes)
    }

    /// Key count per node, including idle nodes.
    pub fn load(&self) -> Result<Vec<NodeLoad>> {
        assign::load(&self.keys, &self.nodes)
    }

    /// Copy of the current nodes and keys.
    pub fn state(&self) -> RingState {
        RingState {
            nodes: self.nodes.clone(),
            keys: self.keys.clone(),
        }
    }
}

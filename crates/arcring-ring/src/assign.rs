//! Key-to-node assignment.
//!
//! A key is owned by the first node at or clockwise after its position.
//! Keys past the highest node wrap around to the lowest one. Everything here
//! is a pure function of its inputs; [`Ring`](crate::Ring) keeps the state.

use rand::Rng;

use crate::error::{Result, RingError};
use crate::{Key, KeyId, Node, NodeId, RingPosition, RING_DEGREES};

/// Labels and positions of the fixed starting topology.
pub const INITIAL_NODES: [(&str, u16); 3] = [("A", 0), ("B", 120), ("C", 240)];

/// Counter of the first key created after a reset.
pub const FIRST_KEY: u64 = 1;

/// Nodes and keys of a ring at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RingState {
    pub nodes: Vec<Node>,
    pub keys: Vec<Key>,
}

/// A key together with the node that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Assignment {
    pub key: KeyId,
    pub position: RingPosition,
    pub owner: NodeId,
}

/// The stretch of ring owned by one node.
///
/// Runs clockwise from `start` (exclusive, the predecessor's position) to
/// `end` (inclusive, the node's own position).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeArc {
    pub node: NodeId,
    pub start: RingPosition,
    pub end: RingPosition,
    /// Degrees covered, 0 to 360.
    pub length: u16,
}

impl NodeArc {
    /// Whether a key at `position` falls inside this arc.
    pub fn contains(&self, position: RingPosition) -> bool {
        match self.length {
            0 => false,
            RING_DEGREES => true,
            len => {
                let offset = self.start.clockwise_to(position);
                offset > 0 && offset <= len
            }
        }
    }
}

/// Number of keys owned by a node.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeLoad {
    pub node: NodeId,
    pub keys: usize,
}

/// A key whose owner differs between two node sets.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KeyMove {
    pub key: KeyId,
    pub from: NodeId,
    pub to: NodeId,
}

/// Find the node responsible for a key at `key_position`.
///
/// Returns the node with the smallest position `>=` the key's, or the node
/// with the smallest position overall when the key lies past every node.
/// Among nodes sharing a position, the one earliest in `nodes` wins, which
/// matches a stable ascending sort. `nodes` need not be sorted.
pub fn responsible_node(key_position: RingPosition, nodes: &[Node]) -> Result<&NodeId> {
    let mut successor: Option<&Node> = None;
    let mut lowest: Option<&Node> = None;

    for node in nodes {
        if lowest.map_or(true, |l| node.position < l.position) {
            lowest = Some(node);
        }
        if node.position >= key_position
            && successor.map_or(true, |s| node.position < s.position)
        {
            successor = Some(node);
        }
    }

    successor
        .or(lowest)
        .map(|node| &node.id)
        .ok_or(RingError::EmptyRing)
}

/// Insert `node` into an ascending node list, after any equal positions.
pub(crate) fn insert_sorted(nodes: &mut Vec<Node>, node: Node) {
    let at = nodes.partition_point(|n| n.position <= node.position);
    nodes.insert(at, node);
}

/// Return `nodes` plus one freshly labelled node at a random position,
/// sorted ascending by position.
pub fn add_node<R: Rng + ?Sized>(nodes: &[Node], rng: &mut R) -> Vec<Node> {
    let mut next = nodes.to_vec();
    next.push(Node::fresh(nodes, rng));
    next.sort_by_key(|n| n.position);
    next
}

/// Return `keys` plus one key labelled from `next_counter` at a random
/// position.
pub fn add_key<R: Rng + ?Sized>(keys: &[Key], next_counter: u64, rng: &mut R) -> Vec<Key> {
    let mut next = keys.to_vec();
    next.push(Key::new(KeyId::new(next_counter), RingPosition::random(rng)));
    next
}

/// The fixed starting topology: three evenly spaced nodes and no keys.
pub fn reset() -> RingState {
    let nodes = INITIAL_NODES
        .iter()
        .map(|&(label, degrees)| Node::new(NodeId::new(label), RingPosition::wrapping(degrees.into())))
        .collect();

    RingState {
        nodes,
        keys: Vec::new(),
    }
}

/// Resolve every key against `nodes`.
///
/// An empty key list never fails, even with no nodes.
pub fn assignments(keys: &[Key], nodes: &[Node]) -> Result<Vec<Assignment>> {
    keys.iter()
        .map(|key| {
            Ok(Assignment {
                key: key.id,
                position: key.position,
                owner: responsible_node(key.position, nodes)?.clone(),
            })
        })
        .collect()
}

/// Arc owned by each node, in ascending ring order.
///
/// Lengths always sum to 360 for a non-empty ring. When nodes share a
/// position, the first of them owns the arc and the rest own nothing.
pub fn arcs(nodes: &[Node]) -> Vec<NodeArc> {
    let mut sorted = nodes.to_vec();
    sorted.sort_by_key(|n| n.position);

    let count = sorted.len();
    (0..count)
        .map(|i| {
            let start = sorted[(i + count - 1) % count].position;
            let end = sorted[i].position;
            let length = match start.clockwise_to(end) {
                // Only the lowest node can see its predecessor at the same
                // position when every node is co-located.
                0 if i == 0 => RING_DEGREES,
                len => len,
            };
            NodeArc {
                node: sorted[i].id.clone(),
                start,
                end,
                length,
            }
        })
        .collect()
}

/// Keys owned by each node, in ascending ring order.
pub fn load(keys: &[Key], nodes: &[Node]) -> Result<Vec<NodeLoad>> {
    let mut sorted = nodes.to_vec();
    sorted.sort_by_key(|n| n.position);

    let mut counts: Vec<NodeLoad> = sorted
        .iter()
        .map(|n| NodeLoad {
            node: n.id.clone(),
            keys: 0,
        })
        .collect();

    for key in keys {
        let owner = responsible_node(key.position, &sorted)?;
        if let Some(entry) = counts.iter_mut().find(|c| &c.node == owner) {
            entry.keys += 1;
        }
    }

    Ok(counts)
}

/// Keys that change owner when the node set goes from `before` to `after`.
pub fn moved_keys(keys: &[Key], before: &[Node], after: &[Node]) -> Result<Vec<KeyMove>> {
    let mut moves = Vec::new();
    for key in keys {
        let from = responsible_node(key.position, before)?;
        let to = responsible_node(key.position, after)?;
        if from != to {
            moves.push(KeyMove {
                key: key.id,
                from: from.clone(),
                to: to.clone(),
            });
        }
    }
    Ok(moves)
}

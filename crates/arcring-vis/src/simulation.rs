//! Ring simulation with event recording.

use arcring_ring::{Assignment, Node, NodeId, Ring, RingPosition};
use rand::rngs::StdRng;

use crate::config::SimulationConfig;
use crate::error::Result;
use crate::events::{RingEvent, RingSnapshot};

/// Drives a seeded ring and records every mutation as an event.
pub struct Simulation {
    config: SimulationConfig,
    ring: Ring<StdRng>,
    events: Vec<RingEvent>,
    current_frame: u64,
}

impl Simulation {
    /// Create a simulation in the reset topology, pre-populated with
    /// `config.initial_keys` keys.
    pub fn new(config: SimulationConfig) -> Self {
        let mut sim = Self {
            ring: Ring::seeded(config.seed),
            config,
            events: Vec::new(),
            current_frame: 0,
        };
        sim.record_reset();

        for _ in 0..sim.config.initial_keys {
            // The reset topology always has nodes, so placement cannot fail.
            if let Err(e) = sim.add_key() {
                tracing::warn!(error = %e, "failed to place initial key");
                break;
            }
        }
        sim
    }

    /// Add a node at a random position.
    pub fn add_node(&mut self) -> Node {
        let before = self.ring.nodes().to_vec();
        let node = self.ring.add_node();

        self.events.push(RingEvent::NodeAdded {
            node: node.id.clone(),
            position: node.position,
            frame: self.current_frame,
        });

        match arcring_ring::moved_keys(self.ring.keys(), &before, self.ring.nodes()) {
            Ok(moves) => tracing::debug!(
                node = %node.id,
                position = %node.position,
                moved = moves.len(),
                "node added"
            ),
            Err(e) => tracing::debug!(node = %node.id, error = %e, "node added"),
        }

        self.current_frame += 1;
        node
    }

    /// Add a key at a random position and report its owner.
    pub fn add_key(&mut self) -> Result<Assignment> {
        let Assignment { key: id, position, owner } = self.ring.add_assigned_key()?;

        self.events.push(RingEvent::KeyAdded {
            key: id,
            position,
            owner: owner.clone(),
            frame: self.current_frame,
        });
        tracing::debug!(key = %id, %position, %owner, "key added");

        self.current_frame += 1;
        Ok(Assignment { key: id, position, owner })
    }

    /// Return to the starting topology.
    pub fn reset(&mut self) {
        self.ring.reset();
        self.record_reset();
        tracing::debug!(frame = self.current_frame, "ring reset");
    }

    fn record_reset(&mut self) {
        self.events.push(RingEvent::RingReset {
            frame: self.current_frame,
        });
        for node in self.ring.nodes() {
            self.events.push(RingEvent::NodeAdded {
                node: node.id.clone(),
                position: node.position,
                frame: self.current_frame,
            });
        }
        self.current_frame += 1;
    }

    /// Node owning an arbitrary position.
    pub fn lookup(&self, position: RingPosition) -> Result<NodeId> {
        Ok(self.ring.responsible(position)?.clone())
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Get all recorded events.
    pub fn events(&self) -> &[RingEvent] {
        &self.events
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    pub fn node_count(&self) -> usize {
        self.ring.nodes().len()
    }

    pub fn key_count(&self) -> usize {
        self.ring.keys().len()
    }

    /// Snapshot of the live ring, stamped with the frame of the latest event.
    pub fn snapshot(&self) -> RingSnapshot {
        let frame = self.events.last().map_or(0, RingEvent::frame);
        RingSnapshot::build(frame, self.ring.nodes(), self.ring.keys())
    }
}

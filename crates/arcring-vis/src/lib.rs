//! Arcring Ring Explainer
//!
//! Interactive consistent-hashing ring with timeline playback.
//!
//! # Architecture
//!
//! - **Simulation**: Drives a seeded ring and records every change as an event
//! - **Playback**: Scrub through the recorded timeline at any speed
//! - **WebSocket**: Ring operations and snapshots for the SVG frontend
//! - **REST API**: Add nodes and keys, reset, look up owners, control playback
//!
//! # Usage
//!
//! ```ignore
//! let mut sim = Simulation::new(SimulationConfig::default());
//! sim.add_node();
//! sim.add_key()?;
//!
//! let server = VisServer::new(sim);
//! server.serve(3000).await?;
//! ```

mod config;
mod error;
mod events;
mod playback;
mod server;
mod simulation;

pub use config::{SimulationConfig, VisConfig};
pub use error::{Error, Result};
pub use events::{KeyState, RingEvent, RingSnapshot};
pub use playback::{Playback, PlaybackSpeed, PlaybackState, PlaybackStatus};
pub use server::VisServer;
pub use simulation::Simulation;

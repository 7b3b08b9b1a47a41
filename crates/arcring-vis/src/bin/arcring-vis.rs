//! Arcring Ring Explainer Server
//!
//! Seed a ring and serve the interactive frontend.

use arcring_vis::{Simulation, VisConfig, VisServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "arcring_vis=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = VisConfig::from_env();
    tracing::info!(
        port = config.port,
        seed = config.simulation.seed,
        initial_keys = config.simulation.initial_keys,
        "starting ring explainer"
    );

    let sim = Simulation::new(config.simulation.clone());
    tracing::info!(
        nodes = sim.node_count(),
        keys = sim.key_count(),
        events = sim.event_count(),
        "ring ready"
    );

    let server = VisServer::new(sim);
    server.serve(config.port).await?;

    Ok(())
}

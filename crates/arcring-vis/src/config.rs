//! Explainer configuration.
//!
//! Positional arguments (`arcring-vis [port] [seed] [initial_keys]`) are
//! applied first, then `ARCRING_PORT` and `ARCRING_SEED` override them.
//! Values that fail to parse keep the default and log a warning.

use std::str::FromStr;

/// Configuration for the ring simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationConfig {
    /// Seed for deterministic placement
    pub seed: u64,
    /// Keys placed right after the initial reset
    pub initial_keys: usize,
    /// Playback interval per event at normal speed
    pub base_frame_ms: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            initial_keys: 0,
            base_frame_ms: 500,
        }
    }
}

/// Top-level configuration for the `arcring-vis` binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisConfig {
    pub port: u16,
    pub simulation: SimulationConfig,
}

impl Default for VisConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            simulation: SimulationConfig::default(),
        }
    }
}

impl VisConfig {
    /// Read from the process arguments and environment.
    pub fn from_env() -> Self {
        Self::from_sources(std::env::args().skip(1), |name| std::env::var(name).ok())
    }

    /// Build from positional arguments (program name already stripped) and
    /// an environment lookup.
    pub fn from_sources<I, E>(args: I, env: E) -> Self
    where
        I: IntoIterator<Item = String>,
        E: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let mut args = args.into_iter();

        if let Some(port) = args.next() {
            parse_into(&mut config.port, "port", &port);
        }
        if let Some(seed) = args.next() {
            parse_into(&mut config.simulation.seed, "seed", &seed);
        }
        if let Some(keys) = args.next() {
            parse_into(&mut config.simulation.initial_keys, "initial_keys", &keys);
        }

        if let Some(port) = env("ARCRING_PORT") {
            parse_into(&mut config.port, "ARCRING_PORT", &port);
        }
        if let Some(seed) = env("ARCRING_SEED") {
            parse_into(&mut config.simulation.seed, "ARCRING_SEED", &seed);
        }

        config
    }
}

fn parse_into<T: FromStr + std::fmt::Display>(slot: &mut T, name: &str, raw: &str) {
    match raw.parse() {
        Ok(value) => *slot = value,
        Err(_) => tracing::warn!(name, value = raw, default = %slot, "ignoring unparsable setting"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn defaults_without_sources() {
        let config = VisConfig::from_sources(Vec::new(), |_| None);
        assert_eq!(config, VisConfig::default());
    }

    #[test]
    fn positional_arguments() {
        let config = VisConfig::from_sources(args(&["8080", "7", "12"]), |_| None);
        assert_eq!(config.port, 8080);
        assert_eq!(config.simulation.seed, 7);
        assert_eq!(config.simulation.initial_keys, 12);
    }

    #[test]
    fn environment_overrides_arguments() {
        let config = VisConfig::from_sources(args(&["8080", "7"]), |name| match name {
            "ARCRING_PORT" => Some("9090".into()),
            "ARCRING_SEED" => Some("1".into()),
            _ => None,
        });
        assert_eq!(config.port, 9090);
        assert_eq!(config.simulation.seed, 1);
    }

    #[test]
    fn bad_values_keep_defaults() {
        let config = VisConfig::from_sources(args(&["not-a-port", "-3"]), |_| None);
        assert_eq!(config.port, 3000);
        assert_eq!(config.simulation.seed, 42);
    }
}

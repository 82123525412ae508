//! Planner configuration, deserialized from the YAML/JSON document a host
//! supplies. Mirrors the teacher's pattern of a flat, `serde`-derived
//! settings struct with `Default` fallbacks for anything a scenario
//! document omits.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RobotConfig {
    pub step_size: f64,
    pub diameter: f64,
    pub sensing_radius: f64,
}

impl Default for RobotConfig {
    fn default() -> Self {
        RobotConfig {
            step_size: 0.25,
            diameter: 0.2,
            sensing_radius: 1.0,
        }
    }
}

/// Dispersion bounds for RRG forward/backward extension:
/// a new vertex must lie within `eta.1` of its nearest neighbor but no
/// closer than `eta.0`, unless it reaches an existing vertex exactly.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct Eta {
    pub lo: f64,
    pub hi: f64,
}

impl Default for Eta {
    fn default() -> Self {
        // Matches the bundled IJRR case study's robot step size (0.999):
        // `hi` must stay above the per-step travel distance or a new
        // vertex can never see its own parent in `Far`.
        Eta { lo: 0.5, hi: 1.0 }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    #[serde(default)]
    pub eta: Eta,
    #[serde(default)]
    pub robot: RobotConfig,
    /// Local-request name to priority (lower wins).
    #[serde(default)]
    pub local_spec: HashMap<String, i32>,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default)]
    pub seed: u64,
}

fn default_iterations() -> u32 {
    2000
}

fn default_output_dir() -> String {
    "out".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            iterations: default_iterations(),
            eta: Eta::default(),
            robot: RobotConfig::default(),
            local_spec: HashMap::new(),
            output_dir: default_output_dir(),
            seed: 0,
        }
    }
}

impl Config {
    pub fn from_yaml_str(s: &str) -> crate::error::Result<Self> {
        serde_yaml::from_str(s).map_err(|e| crate::error::PlannerError::GeometryInvalid(format!(
            "config parse error: {e}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_round_trip_through_yaml() {
        let cfg = Config::default();
        let yaml = serde_yaml::to_string(&cfg).unwrap();
        let back: Config = Config::from_yaml_str(&yaml).unwrap();
        assert_eq!(back.iterations, cfg.iterations);
        assert_eq!(back.output_dir, cfg.output_dir);
    }

    #[test]
    fn partial_document_falls_back_to_defaults() {
        let cfg = Config::from_yaml_str("iterations: 50\n").unwrap();
        assert_eq!(cfg.iterations, 50);
        assert_eq!(cfg.robot.step_size, RobotConfig::default().step_size);
    }
}

//! Run configuration for the collision experiment.

use std::{fs::File, io::BufReader, path::Path};

use serde::{Deserialize, Serialize};

use crate::{error::LsbError, search::NeighborhoodParams};

pub const DEFAULT_TRIALS: usize = 100_000;
pub const DEFAULT_MAX_DISTANCE: usize = 6;

fn default_trials() -> usize {
    DEFAULT_TRIALS
}

fn default_max_distance() -> usize {
    DEFAULT_MAX_DISTANCE
}

/// Everything one run of the experiment needs.
///
/// Distances `1..=max_distance` are each tested with `trials` random pairs.
/// Without a seed the generator is seeded from the operating system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    pub neighborhood: NeighborhoodParams,
    #[serde(default = "default_trials")]
    pub trials: usize,
    #[serde(default = "default_max_distance")]
    pub max_distance: usize,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl RunConfig {
    pub fn new(neighborhood: NeighborhoodParams) -> Self {
        RunConfig {
            neighborhood,
            trials: DEFAULT_TRIALS,
            max_distance: DEFAULT_MAX_DISTANCE,
            seed: None,
        }
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, LsbError> {
        let reader = BufReader::new(File::open(path)?);
        let config: RunConfig = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), LsbError> {
        self.neighborhood.validate()?;
        if self.trials == 0 {
            return Err(LsbError::configuration("trials must be positive"));
        }
        if self.max_distance == 0 || self.max_distance > self.neighborhood.k {
            return Err(LsbError::configuration(format!(
                "max distance must be between 1 and k = {}, got {}",
                self.neighborhood.k, self.max_distance
            )));
        }
        Ok(())
    }
}

// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::simulated_invoker::SimulationProfile;
use map_reduce_core::{ConfigError, JobConfig};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub job: JobConfig,
    pub initial_workers: usize,
    pub registration_interval_ms: u64,
    pub failure_rate: f32,
    pub min_work_ms: u64,
    pub max_work_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            job: JobConfig {
                name: "word-count".to_string(),
                inputs: (0..20).map(|i| format!("input-{:02}.txt", i)).collect(),
                n_reduce: 5,
            },
            initial_workers: 4,
            registration_interval_ms: 100,
            failure_rate: 10.0,
            min_work_ms: 20,
            max_work_ms: 80,
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: Config =
            serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the job and the simulation knobs, rerun after any override
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.job.validate()?;
        if !(0.0..=100.0).contains(&self.failure_rate) {
            return Err(ConfigError::Invalid(format!(
                "failure_rate must be a percentage, got {}",
                self.failure_rate
            )));
        }
        Ok(())
    }

    pub fn profile(&self) -> SimulationProfile {
        SimulationProfile {
            failure_rate: self.failure_rate,
            min_work_ms: self.min_work_ms,
            max_work_ms: self.max_work_ms,
        }
    }

    pub fn registration_interval(&self) -> Duration {
        Duration::from_millis(self.registration_interval_ms)
    }
}

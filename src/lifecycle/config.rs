//! Process configuration.

use crate::model::Environment;
use serde::Deserialize;
use thiserror::Error;

pub const ENV_PROJECT: &str = "ACTOR_MANAGER_PROJECT";
pub const ENV_ENVIRONMENT: &str = "ACTOR_MANAGER_ENVIRONMENT";
pub const ENV_ENDPOINT: &str = "ACTOR_MANAGER_ENDPOINT";
pub const ENV_CHANNEL_CAPACITY: &str = "ACTOR_MANAGER_CHANNEL_CAPACITY";

const DEFAULT_CHANNEL_CAPACITY: usize = 32;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required variable {0}")]
    Missing(&'static str),

    #[error("Invalid value {value:?} for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Settings for a [`ManagerSystem`](super::ManagerSystem).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ManagerConfig {
    pub project: String,
    pub environment: String,
    /// Orchestration API endpoint. Unused by the in-memory services.
    pub endpoint: Option<String>,
    /// Request buffer of each service channel.
    pub channel_capacity: usize,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            project: "local".into(),
            environment: "dev".into(),
            endpoint: None,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl ManagerConfig {
    /// Reads the `ACTOR_MANAGER_*` process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Reads configuration through `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |var: &'static str| {
            lookup(var)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(var))
        };

        let channel_capacity = match lookup(ENV_CHANNEL_CAPACITY) {
            None => DEFAULT_CHANNEL_CAPACITY,
            Some(value) => match value.trim().parse::<usize>() {
                Ok(0) => {
                    return Err(ConfigError::Invalid {
                        var: ENV_CHANNEL_CAPACITY,
                        value,
                        reason: "must be greater than zero".into(),
                    })
                }
                Ok(n) => n,
                Err(e) => {
                    return Err(ConfigError::Invalid {
                        var: ENV_CHANNEL_CAPACITY,
                        value,
                        reason: e.to_string(),
                    })
                }
            },
        };

        Ok(Self {
            project: required(ENV_PROJECT)?,
            environment: required(ENV_ENVIRONMENT)?,
            endpoint: lookup(ENV_ENDPOINT),
            channel_capacity,
        })
    }

    /// The scope every resolution and creation runs in.
    pub fn environment(&self) -> Environment {
        Environment::new(self.project.clone(), self.environment.clone())
    }
}

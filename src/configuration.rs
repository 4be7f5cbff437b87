use std::time::Duration;

use config::{Config, Environment, File};
use secrecy::SecretString;
use serde::Deserialize;

use crate::assignment::CompensationPolicy;

#[derive(Deserialize, Debug)]
pub struct Settings{
    pub backend: BackendSettings,
    pub live: LiveSettings,
    pub workflow: WorkflowSettings
}

#[derive(Deserialize, Debug, Clone)]
pub struct BackendSettings{
    pub base_url: String,
    pub auth_token: SecretString,
    pub timeout_milliseconds: u64,
    #[serde(default = "default_reservation_type")]
    pub reservation_type: String
}

impl BackendSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_milliseconds)
    }
}

fn default_reservation_type() -> String {
    "restaurant".to_string()
}

#[derive(Deserialize, Debug, Clone)]
pub struct LiveSettings{
    // Events a lagging subscriber can fall behind by before it has to resync
    pub buffer: usize
}

#[derive(Deserialize, Debug, Clone)]
pub struct WorkflowSettings{
    pub compensation: CompensationPolicy
}

impl Settings{
    // Reads configuration/base.yaml, then APP__SECTION__KEY environment overrides
    pub fn get() -> Result<Self, config::ConfigError>{
        Self::from_file("configuration/base.yaml")
    }

    pub fn from_file(path: &str) -> Result<Self, config::ConfigError>{
        Config::builder()
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("__")
                    .separator("__")
            )
            .build()?
            .try_deserialize::<Settings>()
    }
}

use crate::constants;
use serde::{Deserialize, Serialize};


/// Whether resolvers may touch the network.
///
/// `Disabled` forces every resolution to return absence without issuing a
/// single request, so test suites never perform real calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Enabled,
    Disabled,
}

impl Mode {
    pub fn is_disabled(self) -> bool {
        self == Mode::Disabled
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Registry host recognized for expected-digest lookups
    #[serde(default = "default_registry_host")]
    pub registry_host: String,

    /// Container-engine management API base URL
    #[serde(default = "default_engine_url")]
    pub engine_url: String,

    /// Default repository to resolve the expected digest from
    pub repository: Option<String>,

    /// Candidate tags in priority order
    #[serde(default)]
    pub candidate_tags: Vec<String>,
}

fn default_registry_host() -> String {
    constants::endpoint::DEFAULT_REGISTRY_HOST.to_string()
}

fn default_engine_url() -> String {
    constants::endpoint::DEFAULT_ENGINE_URL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            registry_host: default_registry_host(),
            engine_url: default_engine_url(),
            repository: None,
            candidate_tags: Vec::new(),
        }
    }
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        if let Some(config_dir) = dirs::config_dir() {
            let config_path = config_dir.join("image-drift").join("config.toml");
            if config_path.exists() {
                let content = std::fs::read_to_string(config_path)?;
                let config: Config = toml::from_str(&content)?;
                return Ok(config);
            }
        }
        Ok(Config::default())
    }
}

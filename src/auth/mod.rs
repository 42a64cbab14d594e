//! Registry credential loading
//!
//! Credentials are read from Docker config files and only ever attached to
//! the bearer-token endpoint request; manifest requests themselves stay
//! token-or-anonymous.

use base64::Engine;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Authentication configuration containing credentials
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub auth: Option<String>,
    pub registry_token: Option<String>,
}

impl AuthConfig {
    /// Create an anonymous AuthConfig
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Check if this is anonymous authentication
    pub fn is_anonymous(&self) -> bool {
        self.username.is_none()
            && self.password.is_none()
            && self.auth.is_none()
            && self.registry_token.is_none()
    }

    /// Convert to an Authorization header value
    pub fn to_authorization_header(&self) -> Option<String> {
        if let Some(token) = &self.registry_token {
            return Some(format!("Bearer {}", token));
        }

        if let Some(auth) = &self.auth {
            return Some(format!("Basic {}", auth));
        }

        if let (Some(username), Some(password)) = (&self.username, &self.password) {
            let encoded = base64::engine::general_purpose::STANDARD
                .encode(format!("{}:{}", username, password));
            return Some(format!("Basic {}", encoded));
        }

        None
    }
}

/// Docker config file structure
#[derive(Debug, Clone, Deserialize)]
pub struct DockerConfig {
    #[serde(default)]
    pub auths: HashMap<String, DockerAuthEntry>,
}

/// Entry in the Docker config auths section
#[derive(Debug, Clone, Deserialize)]
pub struct DockerAuthEntry {
    pub auth: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(rename = "registrytoken")]
    pub registry_token: Option<String>,
}

impl DockerAuthEntry {
    fn to_auth_config(&self) -> AuthConfig {
        AuthConfig {
            username: self.username.clone(),
            password: self.password.clone(),
            auth: self.auth.clone(),
            registry_token: self.registry_token.clone(),
        }
    }
}

/// Paths to check for Docker config
fn config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(docker_config) = std::env::var("DOCKER_CONFIG") {
        paths.push(PathBuf::from(docker_config).join("config.json"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".docker/config.json"));
    }

    paths
}

/// Registry key variants to try in an auths map
fn host_variants(host: &str) -> Vec<String> {
    vec![
        host.to_string(),
        format!("https://{}", host),
        format!("https://{}/v2/", host),
    ]
}

/// Resolve credentials for a registry host, falling back to anonymous when
/// no config file exists, none parses, or none mentions the host.
pub fn credentials_for_host(host: &str) -> AuthConfig {
    for path in config_paths() {
        if !path.exists() {
            continue;
        }
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) => {
                warn!("failed to read Docker config at {}: {}", path.display(), err);
                continue;
            }
        };
        let config: DockerConfig = match serde_json::from_str(&content) {
            Ok(config) => config,
            Err(err) => {
                warn!("failed to parse Docker config at {}: {}", path.display(), err);
                continue;
            }
        };
        for variant in host_variants(host) {
            if let Some(entry) = config.auths.get(&variant) {
                debug!("found registry credentials for {} in {}", host, path.display());
                return entry.to_auth_config();
            }
        }
    }

    debug!("no credentials found for {}, using anonymous", host);
    AuthConfig::anonymous()
}

//! Running-container identity via the local container-engine management API
//!
//! The engine assigns a container's network namespace the container id as
//! its host name, so the local host name doubles as the container id for
//! the `/containers/{id}/json` lookup.

use crate::config::Mode;
use crate::reference::{self, ImageReference};
use crate::transport::{HttpRequest, HttpTransport};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, warn};

#[cfg(test)]
mod tests;

pub struct RunningContainerResolver {
    transport: Arc<dyn HttpTransport>,
    engine_url: String,
    registry_host: String,
    container_id: Option<String>,
    mode: Mode,
}

impl RunningContainerResolver {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        engine_url: impl Into<String>,
        registry_host: impl Into<String>,
        mode: Mode,
    ) -> Self {
        Self {
            transport,
            engine_url: engine_url.into(),
            registry_host: registry_host.into(),
            container_id: None,
            mode,
        }
    }

    /// Inspect a specific container instead of discovering the local one.
    pub fn with_container_id(mut self, container_id: impl Into<String>) -> Self {
        self.container_id = Some(container_id.into());
        self
    }

    /// The digest reference the running container's image was recorded
    /// under, preferring repo-digests hosted at the recognized registry.
    ///
    /// Returns `None` on any missing field, unparsable JSON, or failed
    /// call; never raises.
    pub async fn resolve(&self) -> Option<ImageReference> {
        if self.mode.is_disabled() {
            debug!("resolution disabled, skipping container inspection");
            return None;
        }
        match self.resolve_inner().await {
            Ok(reference) => Some(reference),
            Err(err) => {
                warn!("could not resolve the running image: {:#}", err);
                None
            }
        }
    }

    /// The tag of the image reference the container was launched with, or
    /// `None` when the reference is digest-pinned.
    pub async fn image_tag(&self) -> Option<String> {
        if self.mode.is_disabled() {
            debug!("resolution disabled, skipping container inspection");
            return None;
        }
        match self.start_reference_inner().await {
            Ok(reference) => reference::extract_tag(&reference),
            Err(err) => {
                warn!("could not read the container's image tag: {:#}", err);
                None
            }
        }
    }

    /// The raw image string the container was launched with, unmodified.
    pub async fn image_start_reference(&self) -> Option<String> {
        if self.mode.is_disabled() {
            debug!("resolution disabled, skipping container inspection");
            return None;
        }
        match self.start_reference_inner().await {
            Ok(reference) => Some(reference),
            Err(err) => {
                warn!("could not read the container's start reference: {:#}", err);
                None
            }
        }
    }

    async fn resolve_inner(&self) -> Result<ImageReference> {
        let container = self.inspect_container().await?;
        let image_ref = container
            .image
            .clone()
            .filter(|image| !image.is_empty())
            .or_else(|| container.config.as_ref().and_then(|config| config.image.clone()))
            .context("container inspect had no image field")?;

        let url = format!(
            "{}/images/{}/json",
            self.engine_url,
            urlencoding::encode(&image_ref)
        );
        let response = self.transport.execute(HttpRequest::get(url)).await?;
        if !response.is_success() {
            anyhow::bail!("image inspect returned status {}", response.status);
        }
        let image: ImageInspect =
            serde_json::from_slice(&response.body).context("image inspect body was not valid JSON")?;

        let host_prefix = format!("{}/", self.registry_host);
        let chosen = image
            .repo_digests
            .iter()
            .find(|digest| digest.starts_with(&host_prefix))
            .or_else(|| image.repo_digests.first())
            .context("image inspect listed no repo digests")?;

        Ok(ImageReference::new(chosen.clone()))
    }

    async fn start_reference_inner(&self) -> Result<String> {
        let container = self.inspect_container().await?;
        container
            .config
            .and_then(|config| config.image)
            .filter(|image| !image.is_empty())
            .context("container inspect had no configured image")
    }

    async fn inspect_container(&self) -> Result<ContainerInspect> {
        let container_id = self
            .container_id
            .clone()
            .or_else(local_container_id)
            .context("could not determine the local container id")?;

        let url = format!("{}/containers/{}/json", self.engine_url, container_id);
        let response = self.transport.execute(HttpRequest::get(url)).await?;
        if !response.is_success() {
            anyhow::bail!("container inspect returned status {}", response.status);
        }
        serde_json::from_slice(&response.body).context("container inspect body was not valid JSON")
    }
}

/// The local host name, which inside a container is the engine-assigned
/// container id.
fn local_container_id() -> Option<String> {
    if let Ok(hostname) = std::env::var("HOSTNAME") {
        let hostname = hostname.trim().to_string();
        if !hostname.is_empty() {
            return Some(hostname);
        }
    }
    std::fs::read_to_string("/etc/hostname")
        .ok()
        .map(|hostname| hostname.trim().to_string())
        .filter(|hostname| !hostname.is_empty())
}

#[derive(Debug, Clone, Deserialize)]
struct ContainerInspect {
    #[serde(rename = "Image")]
    image: Option<String>,
    #[serde(rename = "Config")]
    config: Option<ContainerConfig>,
}

#[derive(Debug, Clone, Deserialize)]
struct ContainerConfig {
    #[serde(rename = "Image")]
    image: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ImageInspect {
    #[serde(rename = "RepoDigests", default)]
    repo_digests: Vec<String>,
}

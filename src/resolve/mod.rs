//! Expected-digest resolution
//!
//! Walks an ordered candidate-tag list against the recognized registry and
//! returns the first digest that resolves. Tag order encodes priority, so
//! the search is strictly left to right and stops at the first success.

use crate::config::Mode;
use crate::platform::Platform;
use crate::reference::ImageReference;
use crate::registry::{parse_bearer_challenge, RegistryClient};
use crate::transport::{HttpResponse, HttpTransport};
use anyhow::Result;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};


pub struct ExpectedDigestResolver {
    transport: Arc<dyn HttpTransport>,
    registry_host: String,
    platform: Platform,
    mode: Mode,
}

impl ExpectedDigestResolver {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        registry_host: impl Into<String>,
        platform: Platform,
        mode: Mode,
    ) -> Self {
        Self {
            transport,
            registry_host: registry_host.into(),
            platform,
            mode,
        }
    }

    /// Resolve the digest the registry currently serves for `repository`,
    /// trying `candidate_tags` in order and stopping at the first success.
    ///
    /// Returns `None` when disabled, when the repository is not hosted at
    /// the recognized registry, when the cleaned tag list is empty, or when
    /// every tag fails. Never raises; per-tag failures are logged and only
    /// fail that tag.
    pub async fn resolve(
        &self,
        repository: &str,
        candidate_tags: &[String],
    ) -> Option<ImageReference> {
        if self.mode.is_disabled() {
            debug!("resolution disabled, skipping registry lookup");
            return None;
        }

        let host_prefix = format!("{}/", self.registry_host);
        let repository_path = match repository.strip_prefix(&host_prefix) {
            Some(path) if !path.is_empty() => path,
            _ => {
                debug!(
                    "repository {} is not hosted at {}, skipping",
                    repository, self.registry_host
                );
                return None;
            }
        };

        let tags = clean_candidate_tags(candidate_tags);
        if tags.is_empty() {
            debug!("no candidate tags for {}, skipping", repository);
            return None;
        }

        let client = RegistryClient::new(
            self.transport.clone(),
            &self.registry_host,
            repository_path,
        );

        for tag in &tags {
            match self.resolve_tag(&client, repository, tag).await {
                Ok(Some(reference)) => {
                    info!("registry serves {} for tag {}", reference, tag);
                    return Some(reference);
                }
                Ok(None) => {
                    debug!("tag {} did not yield a digest for {}", tag, repository);
                }
                Err(err) => {
                    warn!("resolving {}:{} failed: {:#}", repository, tag, err);
                }
            }
        }

        None
    }

    /// One candidate-tag attempt: HEAD, 401 challenge/token exchange and
    /// re-HEAD, GET (with one tokenless-401 retry), then digest extraction.
    async fn resolve_tag(
        &self,
        client: &RegistryClient,
        repository: &str,
        tag: &str,
    ) -> Result<Option<ImageReference>> {
        let mut token: Option<String> = None;
        let mut header_digest: Option<String> = None;

        let head = client.head_manifest(tag, None).await?;
        if head.is_success() {
            header_digest = digest_header(&head);
        } else if head.status == 401 {
            let challenge = parse_bearer_challenge(head.header("www-authenticate"));
            token = client.fetch_bearer_token(&challenge).await;
            if let Some(token) = token.as_deref() {
                let retry = client.head_manifest(tag, Some(token)).await?;
                if retry.is_success() {
                    header_digest = digest_header(&retry);
                }
            }
        }

        let mut get = client.get_manifest(tag, token.as_deref()).await?;
        if get.status == 401 && token.is_none() {
            let challenge = parse_bearer_challenge(get.header("www-authenticate"));
            token = client.fetch_bearer_token(&challenge).await;
            if let Some(token) = token.as_deref() {
                get = client.get_manifest(tag, Some(token)).await?;
            }
        }

        let digest = if get.is_success() {
            match platform_digest_from_index(&get.body, &self.platform) {
                Some(digest) => Some(digest),
                None => digest_header(&get).or(header_digest),
            }
        } else {
            header_digest
        };

        Ok(digest
            .filter(|digest| !digest.is_empty())
            .map(|digest| ImageReference::from_parts(repository, &digest)))
    }
}

/// Drop blank entries and duplicates, preserving first-occurrence order.
fn clean_candidate_tags(tags: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut cleaned = Vec::new();
    for tag in tags {
        let tag = tag.trim();
        if tag.is_empty() || !seen.insert(tag.to_string()) {
            continue;
        }
        cleaned.push(tag.to_string());
    }
    cleaned
}

fn digest_header(response: &HttpResponse) -> Option<String> {
    response
        .header("docker-content-digest")
        .map(str::to_string)
        .filter(|digest| !digest.is_empty())
}

#[derive(Debug, Deserialize)]
struct ManifestIndex {
    manifests: Vec<ManifestEntry>,
}

#[derive(Debug, Deserialize)]
struct ManifestEntry {
    digest: String,
    platform: Option<Platform>,
}

/// If the body is a manifest list/index, the digest of the entry matching
/// the host platform exactly. Plain manifests and malformed bodies yield
/// `None` so callers fall back to header digests.
fn platform_digest_from_index(body: &[u8], platform: &Platform) -> Option<String> {
    let index: ManifestIndex = serde_json::from_slice(body).ok()?;
    index
        .manifests
        .into_iter()
        .find(|entry| entry.platform.as_ref() == Some(platform))
        .map(|entry| entry.digest)
}

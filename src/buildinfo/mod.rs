//! Build-identity comparison record
//!
//! Composes the running-container and expected-digest resolutions into one
//! record for logging and alerting. Pure composition; all wire work happens
//! in the two resolvers.

use crate::engine::RunningContainerResolver;
use crate::reference::ImageReference;
use crate::resolve::ExpectedDigestResolver;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Serialize)]
pub struct BuildIdentity {
    /// Digest reference the running container was actually started from
    pub running: Option<ImageReference>,
    /// Digest reference the registry currently serves
    pub expected: Option<ImageReference>,
    /// Tag the container was launched with, when not digest-pinned
    pub running_tag: Option<String>,
    /// Digest comparison; `None` when either side is unresolved, so that
    /// "unknown" cannot be mistaken for "drifted"
    pub in_sync: Option<bool>,
    pub checked_at: DateTime<Utc>,
}

pub struct BuildInfo {
    running: RunningContainerResolver,
    expected: ExpectedDigestResolver,
    repository: Option<String>,
    candidate_tags: Vec<String>,
}

impl BuildInfo {
    pub fn new(running: RunningContainerResolver, expected: ExpectedDigestResolver) -> Self {
        Self {
            running,
            expected,
            repository: None,
            candidate_tags: Vec::new(),
        }
    }

    pub fn with_repository(mut self, repository: Option<String>) -> Self {
        self.repository = repository;
        self
    }

    pub fn with_candidate_tags(mut self, candidate_tags: Vec<String>) -> Self {
        self.candidate_tags = candidate_tags;
        self
    }

    /// Run both resolutions once and return the comparison record.
    ///
    /// When no repository was configured, the running reference's repository
    /// is used; when no candidate tags were configured, the running tag is.
    pub async fn report(&self) -> BuildIdentity {
        let running = self.running.resolve().await;
        let running_tag = self.running.image_tag().await;

        let repository = self.repository.clone().or_else(|| {
            running
                .as_ref()
                .and_then(|reference| reference.repository())
                .map(str::to_string)
        });

        let expected = match repository {
            Some(repository) => {
                let mut tags = self.candidate_tags.clone();
                if tags.is_empty() {
                    if let Some(tag) = &running_tag {
                        tags.push(tag.clone());
                    }
                }
                self.expected.resolve(&repository, &tags).await
            }
            None => {
                debug!("no repository known, skipping expected-digest resolution");
                None
            }
        };

        let in_sync = match (
            running.as_ref().and_then(|reference| reference.digest()),
            expected.as_ref().and_then(|reference| reference.digest()),
        ) {
            (Some(running), Some(expected)) => Some(running == expected),
            _ => None,
        };

        match in_sync {
            Some(true) => info!("running image matches what the registry serves"),
            Some(false) => warn!(
                "running image differs from what the registry serves: running {:?}, expected {:?}",
                running, expected
            ),
            None => debug!("build identity could not be fully determined"),
        }

        BuildIdentity {
            running,
            expected,
            running_tag,
            in_sync,
            checked_at: Utc::now(),
        }
    }
}

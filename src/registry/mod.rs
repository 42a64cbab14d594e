//! Minimal OCI Distribution API v2 exchange against one fixed registry host
//!
//! Covers only what build-identity verification needs: manifest HEAD/GET,
//! `WWW-Authenticate` bearer-challenge parsing, and the token exchange.

use crate::auth::{self, AuthConfig};
use crate::constants::media_type;
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, Method};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};


/// Manifest `Accept` value. Registries pick the most specific media type
/// they support, so the order communicates format preference.
fn manifest_accept() -> String {
    [
        media_type::OCI_MANIFEST,
        media_type::DOCKER_MANIFEST,
        media_type::OCI_INDEX,
        media_type::DOCKER_MANIFEST_LIST,
    ]
    .join(", ")
}

/// Stateless client scoped to one repository path on one registry host.
pub struct RegistryClient {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    repository: String,
    credentials: AuthConfig,
}

impl RegistryClient {
    /// Create a client for `repository` (the path below the host, e.g.
    /// `org/app`), picking up Docker config credentials for the host.
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        registry_host: &str,
        repository: impl Into<String>,
    ) -> Self {
        let credentials = auth::credentials_for_host(registry_host);
        Self::with_credentials(transport, registry_host, repository, credentials)
    }

    pub fn with_credentials(
        transport: Arc<dyn HttpTransport>,
        registry_host: &str,
        repository: impl Into<String>,
        credentials: AuthConfig,
    ) -> Self {
        Self {
            transport,
            base_url: format!("https://{}", registry_host),
            repository: repository.into(),
            credentials,
        }
    }

    /// HEAD the manifest for a tag. Callers inspect the status themselves;
    /// only transport failures are errors.
    pub async fn head_manifest(&self, tag: &str, token: Option<&str>) -> Result<HttpResponse> {
        self.manifest_request(Method::Head, tag, token).await
    }

    /// GET the manifest for a tag, used when a content digest cannot be read
    /// from response headers alone or a manifest list must be inspected.
    pub async fn get_manifest(&self, tag: &str, token: Option<&str>) -> Result<HttpResponse> {
        self.manifest_request(Method::Get, tag, token).await
    }

    async fn manifest_request(
        &self,
        method: Method,
        tag: &str,
        token: Option<&str>,
    ) -> Result<HttpResponse> {
        let url = format!("{}/v2/{}/manifests/{}", self.base_url, self.repository, tag);
        let mut request = match method {
            Method::Head => HttpRequest::head(&url),
            Method::Get => HttpRequest::get(&url),
        }
        .header("Accept", manifest_accept());

        if let Some(token) = token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        self.transport
            .execute(request)
            .await
            .with_context(|| format!("manifest request for {} failed", url))
    }

    /// Exchange a parsed bearer challenge for a token.
    ///
    /// Network errors, non-2xx statuses, malformed JSON, and missing token
    /// fields all collapse to `None`; this never raises to its caller.
    pub async fn fetch_bearer_token(
        &self,
        challenge: &BTreeMap<String, String>,
    ) -> Option<String> {
        let realm = match challenge.get("realm") {
            Some(realm) if !realm.is_empty() => realm,
            _ => {
                debug!("bearer challenge has no realm, no token flow possible");
                return None;
            }
        };

        let mut url = realm.clone();
        let mut separator = if realm.contains('?') { '&' } else { '?' };
        for key in ["service", "scope"] {
            if let Some(value) = challenge.get(key) {
                url.push(separator);
                url.push_str(key);
                url.push('=');
                url.push_str(&urlencoding::encode(value));
                separator = '&';
            }
        }

        let mut request = HttpRequest::get(url);
        if let Some(header) = self.credentials.to_authorization_header() {
            request = request.header("Authorization", header);
        }

        let response = match self.transport.execute(request).await {
            Ok(response) => response,
            Err(err) => {
                warn!("token request to {} failed: {:#}", realm, err);
                return None;
            }
        };
        if !response.is_success() {
            warn!("token endpoint {} returned status {}", realm, response.status);
            return None;
        }

        let body: TokenResponse = match serde_json::from_slice(&response.body) {
            Ok(body) => body,
            Err(err) => {
                warn!("token endpoint {} returned malformed JSON: {}", realm, err);
                return None;
            }
        };

        body.token
            .or(body.access_token)
            .filter(|token| !token.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: Option<String>,
    access_token: Option<String>,
}

/// Parse the parameter list of a `Bearer realm="…",service="…",scope="…"`
/// challenge into a map with lowercased keys.
///
/// Blank or malformed input yields an empty map, never an error. Quoted
/// values may contain commas (push scopes do).
pub fn parse_bearer_challenge(header: Option<&str>) -> BTreeMap<String, String> {
    let mut params = BTreeMap::new();
    let header = match header {
        Some(header) => header.trim(),
        None => return params,
    };

    let rest = match header.split_once(char::is_whitespace) {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest,
        _ => return params,
    };

    let mut chars = rest.chars().peekable();
    while chars.peek().is_some() {
        while matches!(chars.peek(), Some(&c) if c == ',' || c.is_whitespace()) {
            chars.next();
        }

        let mut key = String::new();
        while let Some(&c) = chars.peek() {
            if c == '=' || c == ',' {
                break;
            }
            key.push(c);
            chars.next();
        }
        if chars.next() != Some('=') {
            continue;
        }

        let mut value = String::new();
        if chars.peek() == Some(&'"') {
            chars.next();
            while let Some(&c) = chars.peek() {
                if c == '"' {
                    break;
                }
                value.push(c);
                chars.next();
            }
            chars.next();
        } else {
            while let Some(&c) = chars.peek() {
                if c == ',' {
                    break;
                }
                value.push(c);
                chars.next();
            }
        }

        let key = key.trim().to_ascii_lowercase();
        if !key.is_empty() {
            params.insert(key, value);
        }
    }

    params
}

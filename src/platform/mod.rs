use serde::Deserialize;

/// Host platform descriptor used to select one entry from a manifest list.
///
/// Injected into the resolver rather than read from process globals so that
/// tests can claim arbitrary platforms.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Platform {
    pub os: String,
    pub architecture: String,
}

impl Platform {
    pub fn new(os: impl Into<String>, architecture: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            architecture: architecture.into(),
        }
    }

    /// Detect the current host platform.
    ///
    /// Unrecognized CPU identifiers fall back to `amd64`, and the OS is
    /// always `linux`: containers run Linux regardless of what the host
    /// reports, and tightening either fallback would change which
    /// manifest-list entry gets selected on unusual hosts.
    pub fn detect() -> Self {
        let architecture = match std::env::consts::ARCH {
            "x86_64" => "amd64",
            "aarch64" => "arm64",
            "arm" => "arm",
            _ => "amd64",
        };
        Self::new("linux", architecture)
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.os, self.architecture)
    }
}

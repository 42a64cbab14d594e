/// Manifest media types, in the Accept-preference order sent to registries
pub mod media_type {
    /// OCI image manifest v1
    pub const OCI_MANIFEST: &str = "application/vnd.oci.image.manifest.v1+json";

    /// Docker image manifest v2
    pub const DOCKER_MANIFEST: &str = "application/vnd.docker.distribution.manifest.v2+json";

    /// OCI image index v1
    pub const OCI_INDEX: &str = "application/vnd.oci.image.index.v1+json";

    /// Docker manifest list v2
    pub const DOCKER_MANIFEST_LIST: &str =
        "application/vnd.docker.distribution.manifest.list.v2+json";
}

/// Container image tag constants
pub mod tag {
    /// Default container image tag
    pub const DEFAULT: &str = "latest";
}

/// Default endpoints for the two consumed APIs
pub mod endpoint {
    /// Registry host recognized for expected-digest lookups
    pub const DEFAULT_REGISTRY_HOST: &str = "ghcr.io";

    /// Container-engine management API base URL
    pub const DEFAULT_ENGINE_URL: &str = "http://localhost:2375";
}

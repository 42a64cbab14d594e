#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::transport::testing::{json_response, response, ScriptedTransport};
    use crate::transport::Method;

    fn resolver(transport: Arc<ScriptedTransport>) -> RunningContainerResolver {
        RunningContainerResolver::new(
            transport,
            "http://engine.local",
            "registry.example",
            Mode::Enabled,
        )
        .with_container_id("abc123")
    }

    fn container_body(image: &str, config_image: &str) -> String {
        format!(
            r#"{{"Image": "{}", "Config": {{"Image": "{}"}}}}"#,
            image, config_image
        )
    }

    #[tokio::test]
    async fn test_resolve_prefers_recognized_registry_digest() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(
            Method::Get,
            "/containers/abc123/json",
            json_response(200, &container_body("sha256:imageid", "registry.example/org/app:v1")),
        );
        transport.respond(
            Method::Get,
            "/images/sha256%3Aimageid/json",
            json_response(
                200,
                r#"{"RepoDigests": [
                    "mirror.example/org/app@sha256:other",
                    "registry.example/org/app@sha256:wanted"
                ]}"#,
            ),
        );

        let resolved = resolver(transport).resolve().await.unwrap();
        assert_eq!(
            resolved,
            ImageReference::new("registry.example/org/app@sha256:wanted")
        );
    }

    #[tokio::test]
    async fn test_resolve_takes_first_digest_when_host_absent() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(
            Method::Get,
            "/containers/abc123/json",
            json_response(200, &container_body("img", "img")),
        );
        transport.respond(
            Method::Get,
            "/images/img/json",
            json_response(
                200,
                r#"{"RepoDigests": ["mirror.example/org/app@sha256:first", "other.example/org/app@sha256:second"]}"#,
            ),
        );

        let resolved = resolver(transport).resolve().await.unwrap();
        assert_eq!(resolved.digest(), Some("sha256:first"));
    }

    #[tokio::test]
    async fn test_resolve_falls_back_to_config_image() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(
            Method::Get,
            "/containers/abc123/json",
            json_response(200, r#"{"Config": {"Image": "registry.example/org/app:v2"}}"#),
        );
        transport.respond(
            Method::Get,
            "/images/registry.example%2Forg%2Fapp%3Av2/json",
            json_response(200, r#"{"RepoDigests": ["registry.example/org/app@sha256:cfg"]}"#),
        );

        let resolved = resolver(transport).resolve().await.unwrap();
        assert_eq!(resolved.digest(), Some("sha256:cfg"));
    }

    #[tokio::test]
    async fn test_resolve_absent_on_missing_fields() {
        // No image fields at all
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(
            Method::Get,
            "/containers/abc123/json",
            json_response(200, "{}"),
        );
        assert!(resolver(transport).resolve().await.is_none());

        // Empty repo digests
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(
            Method::Get,
            "/containers/abc123/json",
            json_response(200, &container_body("img", "img")),
        );
        transport.respond(
            Method::Get,
            "/images/img/json",
            json_response(200, r#"{"RepoDigests": []}"#),
        );
        assert!(resolver(transport).resolve().await.is_none());
    }

    #[tokio::test]
    async fn test_resolve_absent_on_engine_error() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(Method::Get, "/containers/abc123/json", response(500));
        assert!(resolver(transport).resolve().await.is_none());

        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(
            Method::Get,
            "/containers/abc123/json",
            json_response(200, "not json"),
        );
        assert!(resolver(transport).resolve().await.is_none());
    }

    #[tokio::test]
    async fn test_image_tag_from_configured_reference() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(
            Method::Get,
            "/containers/abc123/json",
            json_response(200, &container_body("sha256:id", "registry.example/org/app:v3")),
        );
        assert_eq!(
            resolver(transport).image_tag().await.as_deref(),
            Some("v3")
        );
    }

    #[tokio::test]
    async fn test_image_tag_absent_for_digest_pinned_reference() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(
            Method::Get,
            "/containers/abc123/json",
            json_response(
                200,
                &container_body("sha256:id", "registry.example/org/app@sha256:abcd"),
            ),
        );
        assert!(resolver(transport).image_tag().await.is_none());
    }

    #[tokio::test]
    async fn test_image_tag_defaults_to_latest() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(
            Method::Get,
            "/containers/abc123/json",
            json_response(200, &container_body("sha256:id", "registry.example/org/app")),
        );
        assert_eq!(
            resolver(transport).image_tag().await.as_deref(),
            Some("latest")
        );
    }

    #[tokio::test]
    async fn test_image_start_reference_is_unmodified() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(
            Method::Get,
            "/containers/abc123/json",
            json_response(200, &container_body("sha256:id", "registry.example/org/app:v1")),
        );
        assert_eq!(
            resolver(transport).image_start_reference().await.as_deref(),
            Some("registry.example/org/app:v1")
        );
    }

    #[tokio::test]
    async fn test_disabled_mode_makes_no_calls() {
        let transport = Arc::new(ScriptedTransport::new());
        let resolver = RunningContainerResolver::new(
            transport.clone(),
            "http://engine.local",
            "registry.example",
            Mode::Disabled,
        )
        .with_container_id("abc123");

        assert!(resolver.resolve().await.is_none());
        assert!(resolver.image_tag().await.is_none());
        assert!(resolver.image_start_reference().await.is_none());
        assert_eq!(transport.call_count(), 0);
    }
}

use anyhow::Result;
use clap::Parser;
use image_drift::{
    buildinfo::BuildInfo,
    cli::{Cli, Commands},
    config::{Config, Mode},
    engine::RunningContainerResolver,
    platform::Platform,
    resolve::ExpectedDigestResolver,
    transport::{HttpTransport, ReqwestTransport},
};
use std::sync::Arc;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging to stderr; stdout is reserved for results
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load()?;
    let engine_url = cli.engine_url.unwrap_or(config.engine_url);
    let registry_host = cli.registry.unwrap_or(config.registry_host);
    let mode = if cli.disabled {
        Mode::Disabled
    } else {
        Mode::Enabled
    };

    let transport: Arc<dyn HttpTransport> = Arc::new(ReqwestTransport::new()?);
    let mut running = RunningContainerResolver::new(
        transport.clone(),
        engine_url,
        registry_host.clone(),
        mode,
    );
    if let Some(container_id) = cli.container_id {
        running = running.with_container_id(container_id);
    }
    let expected =
        ExpectedDigestResolver::new(transport, registry_host, Platform::detect(), mode);

    match cli.command {
        Commands::Check {
            repository,
            tags,
            json,
        } => {
            let repository = repository.or(config.repository);
            let tags = if tags.is_empty() {
                config.candidate_tags
            } else {
                tags
            };

            let identity = BuildInfo::new(running, expected)
                .with_repository(repository)
                .with_candidate_tags(tags)
                .report()
                .await;

            if json {
                println!("{}", serde_json::to_string_pretty(&identity)?);
            } else {
                let display = |reference: &Option<_>| match reference {
                    Some(reference) => format!("{}", reference),
                    None => "<unknown>".to_string(),
                };
                println!("running:  {}", display(&identity.running));
                println!("expected: {}", display(&identity.expected));
                println!(
                    "status:   {}",
                    match identity.in_sync {
                        Some(true) => "in sync",
                        Some(false) => "drift detected",
                        None => "unknown",
                    }
                );
            }

            if identity.in_sync == Some(false) {
                std::process::exit(1);
            }
        }
        Commands::Running => match running.resolve().await {
            Some(reference) => println!("{}", reference),
            None => {
                error!("could not determine the running image digest");
                std::process::exit(1);
            }
        },
        Commands::Expected { repository, tags } => {
            match expected.resolve(&repository, &tags).await {
                Some(reference) => println!("{}", reference),
                None => {
                    error!("no candidate tag resolved for {}", repository);
                    std::process::exit(1);
                }
            }
        }
        Commands::Version => {
            println!("image-drift {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

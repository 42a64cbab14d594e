use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "image-drift")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Container-engine management API base URL
    #[arg(long, env = "IMAGE_DRIFT_ENGINE_URL", global = true)]
    pub engine_url: Option<String>,

    /// Registry host recognized for expected-digest lookups
    #[arg(long, env = "IMAGE_DRIFT_REGISTRY", global = true)]
    pub registry: Option<String>,

    /// Container id to inspect instead of the local host name
    #[arg(long, global = true)]
    pub container_id: Option<String>,

    /// Skip all engine and registry calls and report absence
    #[arg(long, global = true)]
    pub disabled: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compare the running image digest against the registry
    Check {
        /// Repository to resolve the expected digest from
        /// (defaults to the running image's repository)
        #[arg(long, env = "IMAGE_DRIFT_REPOSITORY")]
        repository: Option<String>,

        /// Candidate tags in priority order
        /// Can be specified multiple times or as a comma-separated list
        #[arg(long = "tag", value_delimiter = ',')]
        tags: Vec<String>,

        /// Print the comparison record as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the digest reference of the image this container is running
    Running,

    /// Print the digest the registry currently serves for a repository
    Expected {
        /// Repository to resolve, e.g. ghcr.io/org/app
        #[arg(long, env = "IMAGE_DRIFT_REPOSITORY")]
        repository: String,

        /// Candidate tags in priority order
        #[arg(long = "tag", value_delimiter = ',', required = true)]
        tags: Vec<String>,
    },

    /// Show version information
    Version,
}

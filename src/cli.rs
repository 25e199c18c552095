//! Command-line interface definitions using clap derive macros.
//!
//! Contains the top-level [`Cli`] parser, the [`Commands`] enum for
//! subcommands (run, validate, health), and their associated argument
//! structs. Every `run` flag has an environment variable equivalent for
//! container deployments.

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "multireq",
    version,
    about = "HTTP fan-out dispatcher: first satisfying response wins",
    propagate_version = true,
    after_help = "\x1b[1mQuick start:\x1b[0m\n  \
        multireq run :8080 http://a:9000 http://b:9000    Race two backends\n  \
        multireq validate http://a:9000 http://b:9000     Check targets without starting"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the dispatcher
    Run(Box<RunArgs>),

    /// Validate a target list without starting
    Validate(ValidateArgs),

    /// Check health of a running instance
    Health(HealthArgs),
}

#[derive(Args)]
#[command(after_help = "\x1b[1mExamples:\x1b[0m\n  \
        multireq run :8080 http://a:9000 http://b:9000               Listen on every interface\n  \
        multireq run 127.0.0.1:8080 http://a:9000 --pretty            Local dev mode\n  \
        multireq run :8080 http://a:9000 --health-path /_multireq     Mount the health endpoint")]
pub struct RunArgs {
    /// Listen address (`host:port` or `:port`)
    #[arg(env = "LISTEN_ADDR")]
    pub listen: String,

    /// Backend targets (http:// or https:// URLs)
    #[arg(env = "TARGETS", value_delimiter = ',', required = true)]
    pub targets: Vec<String>,

    // -- Logging --
    /// Log level
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: LogLevel,

    /// Force pretty (human-readable) log output
    #[arg(long)]
    pub pretty: bool,

    /// Force JSON log output (overrides TTY detection)
    #[arg(long, conflicts_with = "pretty")]
    pub json: bool,

    // -- Tuning --
    /// Per-target timeout in milliseconds
    #[arg(
        long,
        env = "REQUEST_TIMEOUT_MS",
        default_value_t = 5000,
        help_heading = "Tuning"
    )]
    pub timeout: u64,

    /// Max request body size in bytes
    #[arg(
        long,
        env = "MAX_BODY_SIZE",
        default_value_t = 1_048_576,
        help_heading = "Tuning"
    )]
    pub max_body: usize,

    /// Serve the health endpoint at this path (every path is relayed when unset)
    #[arg(long, env = "HEALTH_PATH", help_heading = "Tuning")]
    pub health_path: Option<String>,
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Targets to validate
    #[arg(required = true)]
    pub targets: Vec<String>,

    /// Output format
    #[arg(long, default_value = "text")]
    pub format: ValidateFormat,
}

#[derive(Args)]
pub struct HealthArgs {
    /// Health endpoint URL of the running instance
    #[arg(default_value = "http://localhost:8080/_multireq/health")]
    pub url: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    #[must_use]
    pub const fn to_tracing_level(&self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Clone, Debug, ValueEnum)]
pub enum ValidateFormat {
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_parses_listen_and_targets() {
        let cli = Cli::try_parse_from(["multireq", "run", ":8080", "http://a", "http://b"]).unwrap();
        let Some(Commands::Run(args)) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.listen, ":8080");
        assert_eq!(args.targets, ["http://a", "http://b"]);
        assert_eq!(args.timeout, 5000);
        assert!(args.health_path.is_none());
    }

    #[test]
    fn run_requires_a_target() {
        assert!(Cli::try_parse_from(["multireq", "run", ":8080"]).is_err());
    }

    #[test]
    fn pretty_conflicts_with_json() {
        let result =
            Cli::try_parse_from(["multireq", "run", ":8080", "http://a", "--pretty", "--json"]);
        assert!(result.is_err());
    }
}

//! Startup configuration.
//!
//! multireq reads no config files: everything comes from CLI flags or
//! their environment variable equivalents. [`Settings::from_run_args`]
//! validates those once, before the listener is bound, so a bad target
//! list refuses to start instead of failing mid-request. Submodules hold
//! the target model and the validation logic.

pub mod model;
pub mod validation;

use std::net::SocketAddr;
use std::time::Duration;

use crate::cli::RunArgs;
use crate::error::MultireqError;
use model::TargetSet;

#[derive(Debug, Clone)]
pub struct Settings {
    pub listen: SocketAddr,
    pub targets: TargetSet,
    pub timeout: Duration,
    pub max_body: usize,
    pub health_path: Option<String>,
}

impl Settings {
    pub async fn from_run_args(args: &RunArgs) -> Result<Self, MultireqError> {
        let targets = validation::validate_targets(&args.targets)
            .map_err(|errors| MultireqError::TargetValidation { errors })?;
        let listen = validation::parse_listen_addr(&args.listen).await?;
        if let Some(ref path) = args.health_path {
            validation::validate_health_path(path)?;
        }

        Ok(Self {
            listen,
            targets,
            timeout: Duration::from_millis(args.timeout),
            max_body: args.max_body,
            health_path: args.health_path.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::{Cli, Commands};

    fn run_args(argv: &[&str]) -> RunArgs {
        let cli = Cli::try_parse_from(["multireq", "run"].iter().chain(argv)).unwrap();
        match cli.command {
            Some(Commands::Run(args)) => *args,
            _ => panic!("expected run"),
        }
    }

    #[tokio::test]
    async fn named_listen_host_is_accepted() {
        let settings = Settings::from_run_args(&run_args(&["localhost:8080", "http://a"]))
            .await
            .unwrap();
        assert_eq!(settings.listen.port(), 8080);
        assert_eq!(settings.targets.len(), 1);
    }

    #[tokio::test]
    async fn capture_health_path_is_refused_before_routing() {
        let err = Settings::from_run_args(&run_args(&[":0", "http://a", "--health-path", "/:status"]))
            .await
            .unwrap_err();
        assert!(matches!(err, MultireqError::HealthPath(_)));
    }
}

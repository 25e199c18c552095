//! Subcommand dispatch and execution.
//!
//! The [`dispatch`] function routes the parsed CLI to the appropriate
//! subcommand handler: [`run`], [`validate`], or [`health`]. Each handler
//! lives in its own submodule.

pub mod health;
pub mod run;
pub mod validate;

use crate::cli::{Cli, Commands};
use crate::error::MultireqError;

pub async fn dispatch(cli: Cli) -> Result<(), MultireqError> {
    match cli.command {
        Some(Commands::Run(args)) => run::execute(*args).await,
        Some(Commands::Validate(ref args)) => validate::execute(args),
        Some(Commands::Health(args)) => health::execute(args).await,
        None => {
            print_welcome();
            Ok(())
        }
    }
}

fn print_welcome() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        "\n  multireq v{version} \u{2014} HTTP fan-out dispatcher\n\n  \
         No command provided. To get started:\n\n    \
         multireq run :8080 http://a:9000 http://b:9000    Race requests across two backends\n    \
         multireq validate http://a:9000                   Check a target list\n    \
         multireq --help                                   See all commands and options\n"
    );
}

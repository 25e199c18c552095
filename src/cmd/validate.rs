//! `multireq validate` — check a target list without starting.
//!
//! Reports results in either human-readable text or machine-readable
//! JSON format.

use crate::cli::{ValidateArgs, ValidateFormat};
use crate::config::validation;
use crate::error::MultireqError;

pub fn execute(args: &ValidateArgs) -> Result<(), MultireqError> {
    let targets = match validation::validate_targets(&args.targets) {
        Ok(targets) => targets,
        Err(errors) => {
            match args.format {
                ValidateFormat::Text => {
                    eprintln!("\u{2717} target list has {} errors\n", errors.len());
                    for error in &errors {
                        eprintln!("{error}");
                    }
                }
                ValidateFormat::Json => {
                    let json_errors: Vec<serde_json::Value> = errors
                        .iter()
                        .map(|e| {
                            serde_json::json!({
                                "target": e.target,
                                "message": e.message,
                                "suggestion": e.suggestion,
                            })
                        })
                        .collect();
                    println!(
                        "{}",
                        serde_json::json!({
                            "valid": false,
                            "errors": json_errors,
                        })
                    );
                }
            }
            return Err(MultireqError::TargetValidation { errors });
        }
    };

    match args.format {
        ValidateFormat::Text => {
            println!("\u{2713} {}", validation::format_validation_report(&targets));
        }
        ValidateFormat::Json => {
            let urls: Vec<String> = targets.iter().map(ToString::to_string).collect();
            println!(
                "{}",
                serde_json::json!({
                    "valid": true,
                    "targets": urls,
                })
            );
        }
    }

    Ok(())
}

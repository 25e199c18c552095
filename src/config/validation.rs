//! Startup validation with detailed error reporting.
//!
//! [`validate_targets`] turns the raw target arguments into a
//! [`TargetSet`], collecting one [`ValidationError`] per bad entry instead
//! of stopping at the first. Nothing here runs once requests are flowing.

use std::io;
use std::net::SocketAddr;

use url::Url;

use super::model::{Target, TargetSet};
use crate::error::{MultireqError, ValidationError};

/// Validate a single target URL. Returns the parsed [`Target`] or a
/// human-readable error.
pub fn validate_target_url(raw: &str) -> Result<Target, String> {
    if !raw.starts_with("http://") && !raw.starts_with("https://") {
        return Err("must be an http(s) URL".into());
    }
    let parsed = Url::parse(raw).map_err(|e| format!("'{raw}' is not a valid URL ({e})"))?;
    Target::from_url(parsed)
}

pub fn validate_targets(raw: &[String]) -> Result<TargetSet, Vec<ValidationError>> {
    if raw.is_empty() {
        return Err(vec![ValidationError {
            target: "(none)".into(),
            message: "at least one target must be given".into(),
            suggestion: Some("e.g. http://localhost:8080".into()),
        }]);
    }

    let mut errors = Vec::new();
    let mut targets = Vec::with_capacity(raw.len());

    for (i, value) in raw.iter().enumerate() {
        let target_id = if value.is_empty() {
            format!("targets[{i}]")
        } else {
            value.clone()
        };

        match validate_target_url(value) {
            Ok(target) => targets.push(target),
            Err(message) => {
                let suggestion = if !value.is_empty() && !value.contains("://") {
                    Some(format!("did you mean 'http://{value}'?"))
                } else {
                    None
                };
                errors.push(ValidationError {
                    target: target_id,
                    message,
                    suggestion,
                });
            }
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    TargetSet::new(targets).map_err(|e| match e {
        MultireqError::TargetValidation { errors } => errors,
        other => vec![ValidationError {
            target: "(none)".into(),
            message: other.to_string(),
            suggestion: None,
        }],
    })
}

/// Resolve the listen address. Accepts `host:port`, where the host may be
/// a name, and the `:port` shorthand, which binds every interface. The
/// first resolved address wins.
pub async fn parse_listen_addr(raw: &str) -> Result<SocketAddr, MultireqError> {
    let normalized = if raw.starts_with(':') {
        format!("0.0.0.0{raw}")
    } else {
        raw.to_string()
    };
    let address_error = |source| MultireqError::AddressParse {
        addr: raw.to_string(),
        source,
    };

    let resolved = tokio::net::lookup_host(normalized.as_str())
        .await
        .map_err(address_error)?
        .next()
        .ok_or_else(|| {
            address_error(io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                "resolved to no addresses",
            ))
        });
    resolved
}

/// The health path is mounted as a literal route, so anything the router
/// would read as a capture or wildcard is refused here rather than at
/// mount time.
pub fn validate_health_path(path: &str) -> Result<(), MultireqError> {
    let literal = !path.contains(['{', '}'])
        && path
            .split('/')
            .all(|segment| !segment.starts_with([':', '*']));

    if path.starts_with('/') && path.len() > 1 && literal {
        Ok(())
    } else {
        Err(MultireqError::HealthPath(path.to_string()))
    }
}

#[must_use]
pub fn format_validation_report(targets: &TargetSet) -> String {
    let mut lines = vec![format!("  {} targets\n", targets.len())];
    for (i, target) in targets.iter().enumerate() {
        lines.push(format!("  [{i}] {target}"));
    }
    format!("target list is valid\n{}", lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn valid_targets_pass() {
        let set = validate_targets(&raw(&["http://a:8080", "https://b"])).unwrap();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn empty_list_fails() {
        let errors = validate_targets(&[]).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("at least one target"));
    }

    #[test]
    fn non_http_scheme_fails() {
        let errors = validate_targets(&raw(&["ftp://files"])).unwrap_err();
        assert!(errors[0].message.contains("http(s)"));
    }

    #[test]
    fn missing_scheme_suggests_http() {
        let errors = validate_targets(&raw(&["localhost:8080"])).unwrap_err();
        assert_eq!(
            errors[0].suggestion.as_deref(),
            Some("did you mean 'http://localhost:8080'?")
        );
    }

    #[test]
    fn every_bad_target_is_reported() {
        let errors =
            validate_targets(&raw(&["http://ok", "nope", "http://", "gopher://x"])).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[tokio::test]
    async fn listen_shorthand_binds_all_interfaces() {
        let addr = parse_listen_addr(":8080").await.unwrap();
        assert_eq!(addr.to_string(), "0.0.0.0:8080");
    }

    #[tokio::test]
    async fn listen_full_address() {
        let addr = parse_listen_addr("127.0.0.1:3000").await.unwrap();
        assert_eq!(addr.port(), 3000);
    }

    #[tokio::test]
    async fn listen_host_name_is_resolved() {
        let addr = parse_listen_addr("localhost:8080").await.unwrap();
        assert_eq!(addr.port(), 8080);
        assert!(addr.ip().is_loopback());
    }

    #[tokio::test]
    async fn listen_garbage_fails() {
        let err = parse_listen_addr("not-an-address").await.unwrap_err();
        assert!(matches!(err, MultireqError::AddressParse { .. }));
    }

    #[test]
    fn health_path_must_be_absolute() {
        assert!(validate_health_path("/_health").is_ok());
        assert!(validate_health_path("/_multireq/health").is_ok());
        assert!(validate_health_path("health").is_err());
        assert!(validate_health_path("/").is_err());
    }

    #[test]
    fn health_path_rejects_route_captures() {
        for path in ["/:status", "/ops/*rest", "/{", "/{id}", "/health}"] {
            let err = validate_health_path(path).unwrap_err();
            assert!(matches!(err, MultireqError::HealthPath(ref p) if p == path));
        }
    }

    #[test]
    fn report_lists_targets_in_order() {
        let set = validate_targets(&raw(&["http://a", "http://b:81"])).unwrap();
        let report = format_validation_report(&set);
        assert!(report.contains("[0] http://a"));
        assert!(report.contains("[1] http://b:81"));
    }
}

//! Target data structures.
//!
//! A [`Target`] is one validated backend endpoint; a [`TargetSet`] is the
//! immutable, non-empty, ordered list of them supplied once at startup and
//! shared by every dispatch.

use std::sync::Arc;

use axum::http::uri::{PathAndQuery, Uri};
use url::Url;

use crate::error::{MultireqError, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    url: Url,
    authority: String,
}

impl Target {
    /// Build a target from an already-parsed http(s) URL.
    ///
    /// Only the scheme and authority take part in dispatch. Credentials and
    /// any path on the target URL are ignored: the inbound path and query
    /// are always preserved as-is.
    pub fn from_url(url: Url) -> Result<Self, String> {
        let host = match url.host_str() {
            Some(h) if !h.is_empty() => h.to_string(),
            _ => return Err(format!("'{url}' has no host")),
        };
        let authority = url
            .port()
            .map_or_else(|| host.clone(), |port| format!("{host}:{port}"));
        Ok(Self { url, authority })
    }

    #[must_use]
    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    /// `host[:port]` as sent in the rewritten `Host` header.
    #[must_use]
    pub fn authority(&self) -> &str {
        &self.authority
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Redirect an inbound path and query to this target.
    pub fn uri_for(&self, path_and_query: Option<&PathAndQuery>) -> Result<Uri, axum::http::Error> {
        Uri::builder()
            .scheme(self.scheme())
            .authority(self.authority())
            .path_and_query(path_and_query.map_or("/", PathAndQuery::as_str))
            .build()
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}://{}", self.scheme(), self.authority)
    }
}

#[derive(Debug, Clone)]
pub struct TargetSet {
    targets: Arc<[Target]>,
}

impl TargetSet {
    pub fn new(targets: Vec<Target>) -> Result<Self, MultireqError> {
        if targets.is_empty() {
            return Err(MultireqError::TargetValidation {
                errors: vec![ValidationError {
                    target: "(none)".into(),
                    message: "at least one target must be given".into(),
                    suggestion: Some("e.g. http://localhost:8080".into()),
                }],
            });
        }
        Ok(Self {
            targets: targets.into(),
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Always `false`; a set is never constructed empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Target> {
        self.targets.iter()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Target> {
        self.targets.get(index)
    }
}

impl<'a> IntoIterator for &'a TargetSet {
    type Item = &'a Target;
    type IntoIter = std::slice::Iter<'a, Target>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

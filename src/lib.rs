//! multireq is an HTTP fan-out dispatcher.
//!
//! It receives an incoming HTTP request, replays it concurrently against
//! every configured target, and returns the first satisfying response.
//! A target response is unsatisfying when its status is `5xx` or `408`;
//! transport errors count as failures too. When every target fails the
//! caller gets `503` with an empty body. Losing attempts are cancelled.
//!
//! # Architecture
//!
//! - [`cli`] -- Command-line argument parsing with clap derive macros.
//! - [`cmd`] -- Subcommand dispatch and execution (run, validate, health).
//! - [`config`] -- Target model and startup validation.
//! - [`error`] -- Unified error types using `thiserror`.
//! - [`health`] -- Optional health endpoint handler.
//! - [`logging`] -- Structured tracing setup with JSON and pretty-print output.
//! - [`proxy`] -- The race: per-target invokers, first-success aggregation,
//!   cancellation of losers, and relaying the winner.
//! - [`server`] -- Axum server setup, shared application state, HTTP client, and
//!   graceful shutdown.

// Binary crate — public functions are internal, not consumed by external users.
#![allow(clippy::missing_errors_doc)]

pub mod cli;
pub mod cmd;
pub mod config;
pub mod error;
pub mod health;
pub mod logging;
pub mod proxy;
pub mod server;

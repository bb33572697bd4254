//! Common types and utilities shared across formprobe crates.
//!
//! This crate defines the shared error type, the [`Result`] alias, and the
//! [`observability`] helpers used throughout the workspace. It is
//! intentionally lightweight so that every crate can depend on it without
//! introducing heavy transitive costs.
//!
//! # Overview
//!
//! - [`observability`]: Centralised tracing/logging initialisation
//! - [`ProbeError`] and [`Result`]: Shared error handling
use serde::{Deserialize, Serialize};

pub mod observability;

/// Preferred output format for the terminal run report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
}

/// Error types used across the formprobe workspace.
#[derive(thiserror::Error, Debug)]
pub enum ProbeError {
    /// Configuration was incomplete or invalid (bad target, missing wordlist).
    #[error("Configuration error: {0}")]
    Config(String),

    /// The browser driver reported an unrecoverable error.
    #[error("Driver error: {0}")]
    Driver(#[from] anyhow::Error),

    /// The candidate wordlist could not be read or was empty.
    #[error("Wordlist error: {0}")]
    Wordlist(String),

    /// Operation exceeded the configured timeout.
    #[error("Timeout occurred")]
    Timeout,
}

/// Convenient alias for results that use [`ProbeError`].
pub type Result<T> = std::result::Result<T, ProbeError>;

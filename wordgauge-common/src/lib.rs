//! Common types and utilities shared across Wordgauge crates.
//!
//! This crate defines the observation record model, observability helpers,
//! and the shared error type used throughout the workspace. It is
//! intentionally lightweight so that every crate can depend on it without
//! pulling in the browser stack.
//!
//! # Overview
//!
//! - [`records`]: the session observation model and its wire contract
//! - [`observability`]: centralised tracing/logging initialisation
//! - [`GaugeError`] and [`Result`]: shared error handling

pub mod observability;
pub mod records;

/// Error types used across the Wordgauge system.
#[derive(thiserror::Error, Debug)]
pub enum GaugeError {
    /// The browser driver reported an error.
    #[error("Driver error: {0}")]
    Driver(#[from] anyhow::Error),

    /// The verification gate exceeded its wait ceiling without resolution.
    #[error("Verification gate timed out")]
    GateTimeout,

    /// The operator declined to continue.
    #[error("Aborted by operator: {0}")]
    Aborted(String),
}

/// Convenient alias for results that use [`GaugeError`].
pub type Result<T> = std::result::Result<T, GaugeError>;

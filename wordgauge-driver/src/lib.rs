//! Browser capability layer for the Wordgauge harness.
//!
//! This crate wraps a WebDriver client with the primitives the harness
//! needs: navigation, cookie injection, element queries by structural
//! locator, scroll-into-view, native and script-forced clicks, and page
//! readiness evaluation. Everything above this layer treats the browser as
//! an opaque capability.
//!
//! - [`gauge_browser::driver::GaugeDriver`]: WebDriver client wrapper
//! - [`gauge_browser::page::GaugePage`]: DOM helpers and readiness checks
//! - [`gauge_browser::pacing::Pacing`]: human-like timing between actions
//! - [`gauge_browser::stealth`]: anti-fingerprinting arguments and overrides
pub mod gauge_browser;

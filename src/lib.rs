//! # storefront-page
//!
//! WASM page behaviors for the storefront's server-rendered templates:
//! persisted light/dark theme, navbar scroll state, the AI chat widget, and
//! image skeleton/fallback affordances.
//!
//! The behavior modules are plain Rust over small port traits and are tested
//! natively. The `browser` module (feature `hydrate`) binds those ports to
//! `web-sys` and exports the WASM entry points.

pub mod chat;
pub mod config;
pub mod error;
pub mod images;
pub mod navbar;
pub mod theme;

#[cfg(feature = "hydrate")]
pub mod browser;

pub use config::PageConfig;
pub use error::PageError;

pub mod adapters;
pub mod app;
pub mod config;
pub mod domain;
pub mod ports;

/// Crate version from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// `git describe` output captured at build time.
pub const BUILD_VERSION: &str = env!("APITESTER_VERSION");

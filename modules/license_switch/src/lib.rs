// === PUBLIC CONTRACT ===
// Only the contract module should be public for other crates to consume
pub mod contract;

// Re-export the public contract components
pub use contract::{client, error, model};

// === CONFIGURATION ===
pub mod config;
pub use config::{LicenseSwitchConfig, MODULE_NAME};

// === INTERNAL MODULES ===
// WARNING: These modules are internal implementation details!
// They are exposed for wiring in the binary and for comprehensive testing.
// Only use the `contract` module for stable public APIs.
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod gateways;
#[doc(hidden)]
pub mod infra;

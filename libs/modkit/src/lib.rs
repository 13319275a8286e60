//! # ModKit
//!
//! Shared plumbing for talking to remote services. Currently this is the
//! traced HTTP client every outbound adapter goes through.

// HTTP utilities
pub mod http;
pub use http::client::TracedClient;

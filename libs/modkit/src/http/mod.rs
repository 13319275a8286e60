//! HTTP utilities for modkit
//!
//! Outbound request helpers shared by the service adapters.

pub mod client;
pub mod correlation;

//! Microsoft Graph implementation of the directory port.

pub mod auth;
pub mod client;
pub mod directory;
pub mod dto;
pub mod error;

pub use directory::GraphDirectory;
pub use error::{GraphError, GraphResult};

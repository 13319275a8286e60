pub mod catalog;
pub mod discovery;
pub mod error;
pub mod executor;
pub mod phase;
pub mod ports;
pub mod report;
pub mod sampler;
pub mod service;
pub mod validator;

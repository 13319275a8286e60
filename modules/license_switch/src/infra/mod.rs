pub mod confirm;
pub mod export;
pub mod graph;

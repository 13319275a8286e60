pub mod confirm;
pub mod directory;
pub mod export;

pub use confirm::ConfirmPort;
pub use directory::{DirectoryPort, FilteredUsers};
pub use export::{ExportBatch, ExportPort};

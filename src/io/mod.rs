mod format;
pub mod output;
pub mod responses;
pub mod schema;
pub mod store;

pub use format::DocumentFormat;
pub use output::{ExportDestination, ExportOptions};
pub use responses::{FormResponse, SavedForm};
pub use schema::ShapeError;
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};

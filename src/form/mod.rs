mod actions;
mod error;
mod fill;
mod history;
mod options;
mod reducers;
mod session;
mod state;

pub use actions::FormCommand;
pub use error::FormError;
pub use fill::Advance;
pub use history::History;
pub use options::FormOptions;
pub use reducers::{CommandOutcome, FormEngine, apply_command};
pub use session::{PreviewMode, SessionState, Theme};
pub use state::{FormSnapshot, FormStore};

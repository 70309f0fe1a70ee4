#![deny(rust_2018_idioms)]
//! Build, validate and fill multi-step forms.
//!
//! [`FormStore`] owns the steps of a form together with a bounded undo/redo
//! history. Presentations call its mutation methods (or dispatch
//! [`FormCommand`]s through a [`FormEngine`]) and render the resulting
//! [`FormSnapshot`]. Documents, builder sessions and submitted responses are
//! persisted through any [`KeyValueStore`].

pub mod domain;
pub mod form;
pub mod io;
pub mod validation;

pub use domain::{Field, FieldKind, FieldPatch, FieldValue, PersistedDocument, Step, Steps};
pub use form::{
    Advance, CommandOutcome, FormCommand, FormEngine, FormError, FormOptions, FormSnapshot,
    FormStore, PreviewMode, SessionState, Theme,
};
pub use io::{
    DocumentFormat, ExportDestination, ExportOptions, FileStore, FormResponse, KeyValueStore,
    MemoryStore, SavedForm, StoreError,
};
pub use validation::{StepReport, ValidationError};

pub mod prelude {
    pub use super::{
        FieldKind, FieldPatch, FieldValue, FileStore, FormCommand, FormEngine, FormOptions,
        FormStore, KeyValueStore, MemoryStore,
    };
}

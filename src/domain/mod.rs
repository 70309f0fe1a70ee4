mod document;
mod field;
mod patch;
mod value;

pub use document::{PersistedDocument, Step, Steps};
pub use field::{
    CheckboxInput, DateInput, Field, FieldKind, FieldVariant, SelectInput, TextInput,
    UnknownFieldKind,
};
pub use patch::FieldPatch;
pub use value::FieldValue;

use serde::{Deserialize, Serialize};

use crate::domain::{FieldKind, FieldPatch};

use super::session::PreviewMode;

/// Every operation a presentation layer can request from the form store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum FormCommand {
    AddField {
        kind: FieldKind,
    },
    RemoveField {
        id: String,
    },
    UpdateField {
        id: String,
        patch: FieldPatch,
    },
    MoveField {
        from: usize,
        to: usize,
    },
    SelectField {
        id: Option<String>,
    },
    AddStep,
    RemoveStep {
        index: usize,
    },
    SetCurrentStep {
        index: usize,
    },
    Undo,
    Redo,
    Reset,
    SetTitle {
        title: String,
    },
    SetDescription {
        description: String,
    },
    ToggleTheme,
    SetPreviewMode {
        mode: PreviewMode,
    },
    ClearValues,
    ValidateStep {
        #[serde(default)]
        final_submission: bool,
    },
    GenerateId,
    Save,
    Load {
        id: String,
    },
}

impl FormCommand {
    /// Whether running the command needs a storage adapter.
    pub fn touches_storage(&self) -> bool {
        matches!(
            self,
            FormCommand::GenerateId | FormCommand::Save | FormCommand::Load { .. }
        )
    }
}

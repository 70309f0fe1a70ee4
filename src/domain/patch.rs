use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::field::{Field, FieldKind, FieldVariant};

/// A partial update as issued by an editor panel.
///
/// `value` and `options` stay loosely typed on purpose: the merge repairs
/// whatever shape arrives instead of rejecting the whole update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldPatch {
    /// Ignored by [`Field::merge`]; a field never changes kind.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<FieldKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
    /// `Some(None)` (an explicit `null`) or a limit of 0 removes the limit.
    #[serde(deserialize_with = "explicit_null", skip_serializing_if = "Option::is_none")]
    pub min_length: Option<Option<usize>>,
    #[serde(deserialize_with = "explicit_null", skip_serializing_if = "Option::is_none")]
    pub max_length: Option<Option<usize>>,
    /// An empty pattern removes the constraint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

impl FieldPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_kind(mut self, kind: FieldKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    pub fn with_help_text(mut self, help_text: impl Into<String>) -> Self {
        self.help_text = Some(help_text.into());
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_options(mut self, options: impl Into<Value>) -> Self {
        self.options = Some(options.into());
        self
    }

    pub fn with_min_length(mut self, min: usize) -> Self {
        self.min_length = Some(Some(min));
        self
    }

    pub fn with_max_length(mut self, max: usize) -> Self {
        self.max_length = Some(Some(max));
        self
    }

    pub fn without_min_length(mut self) -> Self {
        self.min_length = Some(None);
        self
    }

    pub fn without_max_length(mut self) -> Self {
        self.max_length = Some(None);
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == FieldPatch::default()
    }
}

impl Field {
    /// Apply `patch` on top of this field. Never fails and never changes kind:
    /// values of the wrong shape fall back to the current value.
    pub fn merge(&self, patch: &FieldPatch) -> Field {
        let mut merged = self.clone();
        if let Some(label) = &patch.label {
            merged.label = label.clone();
        }
        if let Some(required) = patch.required {
            merged.required = required;
        }
        if let Some(help_text) = &patch.help_text {
            merged.help_text = Some(help_text.clone());
        }

        match &mut merged.variant {
            FieldVariant::Text(input) | FieldVariant::Textarea(input) => {
                merge_placeholder(&mut input.placeholder, patch);
                merge_text_value(&mut input.value, patch.value.as_ref());
                merge_lengths(&mut input.min_length, &mut input.max_length, patch);
                if let Some(pattern) = &patch.pattern {
                    input.pattern = (!pattern.is_empty()).then(|| pattern.clone());
                }
            }
            FieldVariant::Date(input) => {
                merge_placeholder(&mut input.placeholder, patch);
                merge_text_value(&mut input.value, patch.value.as_ref());
                merge_lengths(&mut input.min_length, &mut input.max_length, patch);
            }
            FieldVariant::Select(input) => {
                merge_placeholder(&mut input.placeholder, patch);
                merge_text_value(&mut input.value, patch.value.as_ref());
                if let Some(options) = patch.options.as_ref().and_then(coerce_options) {
                    input.options = options;
                }
                if input.options.is_empty() {
                    input.options = vec!["Option 1".to_string()];
                }
            }
            FieldVariant::Checkbox(input) => {
                if let Some(Value::Bool(flag)) = patch.value {
                    input.value = flag;
                }
            }
        }
        merged
    }
}

fn merge_placeholder(slot: &mut Option<String>, patch: &FieldPatch) {
    if let Some(placeholder) = &patch.placeholder {
        *slot = Some(placeholder.clone());
    }
}

fn merge_text_value(slot: &mut Option<String>, incoming: Option<&Value>) {
    match incoming {
        None => {}
        Some(Value::String(text)) => *slot = Some(text.clone()),
        Some(_) => {
            if slot.is_none() {
                *slot = Some(String::new());
            }
        }
    }
}

fn merge_lengths(min: &mut Option<usize>, max: &mut Option<usize>, patch: &FieldPatch) {
    if let Some(value) = patch.min_length {
        *min = value.filter(|limit| *limit > 0);
    }
    if let Some(value) = patch.max_length {
        *max = value.filter(|limit| *limit > 0);
    }
}

/// Tell a present `null` apart from a missing key.
fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn coerce_options(value: &Value) -> Option<Vec<String>> {
    let items = value.as_array()?;
    if items.is_empty() {
        return None;
    }
    items
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect()
}

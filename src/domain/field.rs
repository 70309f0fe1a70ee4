use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::value::FieldValue;

/// The closed set of field variants a form can be assembled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Textarea,
    Select,
    Checkbox,
    Date,
}

impl FieldKind {
    pub const ALL: [FieldKind; 5] = [
        FieldKind::Text,
        FieldKind::Textarea,
        FieldKind::Select,
        FieldKind::Checkbox,
        FieldKind::Date,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Textarea => "textarea",
            FieldKind::Select => "select",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Date => "date",
        }
    }

    /// Label given to freshly created fields, e.g. "Text Field".
    pub fn default_label(self) -> String {
        let name = self.as_str();
        let mut chars = name.chars();
        let capitalized = match chars.next() {
            Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
            None => String::new(),
        };
        format!("{capitalized} Field")
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported field type: {0}")]
pub struct UnknownFieldKind(pub String);

impl FromStr for FieldKind {
    type Err = UnknownFieldKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownFieldKind(s.to_string()))
    }
}

/// Shared configuration of free-text inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectInput {
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Checkboxes carry no placeholder; the shape makes one unrepresentable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckboxInput {
    #[serde(default)]
    pub value: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldVariant {
    Text(TextInput),
    Textarea(TextInput),
    Select(SelectInput),
    Checkbox(CheckboxInput),
    Date(DateInput),
}

impl FieldVariant {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldVariant::Text(_) => FieldKind::Text,
            FieldVariant::Textarea(_) => FieldKind::Textarea,
            FieldVariant::Select(_) => FieldKind::Select,
            FieldVariant::Checkbox(_) => FieldKind::Checkbox,
            FieldVariant::Date(_) => FieldKind::Date,
        }
    }

    fn defaults(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Text => FieldVariant::Text(TextInput {
                placeholder: Some("Enter text".to_string()),
                value: Some(String::new()),
                ..TextInput::default()
            }),
            FieldKind::Textarea => FieldVariant::Textarea(TextInput {
                placeholder: Some("Enter your text here".to_string()),
                value: Some(String::new()),
                ..TextInput::default()
            }),
            FieldKind::Select => FieldVariant::Select(SelectInput {
                options: vec!["Option 1".to_string(), "Option 2".to_string()],
                placeholder: Some("Select an option".to_string()),
                value: Some(String::new()),
            }),
            FieldKind::Checkbox => FieldVariant::Checkbox(CheckboxInput { value: false }),
            FieldKind::Date => FieldVariant::Date(DateInput {
                value: Some(String::new()),
                ..DateInput::default()
            }),
        }
    }
}

/// One input element: its configuration and its current value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    /// Transient message from the last validation pass.
    #[serde(default, skip_serializing)]
    pub error: Option<String>,
    #[serde(flatten)]
    pub variant: FieldVariant,
}

impl Field {
    /// Build a field of `kind` with a fresh identifier and kind defaults.
    pub fn create(kind: FieldKind) -> Self {
        Field {
            id: Uuid::new_v4().to_string(),
            label: kind.default_label(),
            required: false,
            help_text: None,
            error: None,
            variant: FieldVariant::defaults(kind),
        }
    }

    pub fn kind(&self) -> FieldKind {
        self.variant.kind()
    }

    pub fn placeholder(&self) -> Option<&str> {
        match &self.variant {
            FieldVariant::Text(input) | FieldVariant::Textarea(input) => input.placeholder.as_deref(),
            FieldVariant::Select(input) => input.placeholder.as_deref(),
            FieldVariant::Date(input) => input.placeholder.as_deref(),
            FieldVariant::Checkbox(_) => None,
        }
    }

    pub fn options(&self) -> Option<&[String]> {
        match &self.variant {
            FieldVariant::Select(input) => Some(&input.options),
            _ => None,
        }
    }

    pub fn min_length(&self) -> Option<usize> {
        match &self.variant {
            FieldVariant::Text(input) | FieldVariant::Textarea(input) => input.min_length,
            FieldVariant::Date(input) => input.min_length,
            FieldVariant::Select(_) | FieldVariant::Checkbox(_) => None,
        }
    }

    pub fn max_length(&self) -> Option<usize> {
        match &self.variant {
            FieldVariant::Text(input) | FieldVariant::Textarea(input) => input.max_length,
            FieldVariant::Date(input) => input.max_length,
            FieldVariant::Select(_) | FieldVariant::Checkbox(_) => None,
        }
    }

    pub fn pattern(&self) -> Option<&str> {
        match &self.variant {
            FieldVariant::Text(input) | FieldVariant::Textarea(input) => input.pattern.as_deref(),
            _ => None,
        }
    }

    /// The live value, `None` when a string-valued field holds nothing.
    pub fn value(&self) -> Option<FieldValue> {
        match &self.variant {
            FieldVariant::Text(input) | FieldVariant::Textarea(input) => {
                input.value.clone().map(FieldValue::Text)
            }
            FieldVariant::Select(input) => input.value.clone().map(FieldValue::Text),
            FieldVariant::Date(input) => input.value.clone().map(FieldValue::Text),
            FieldVariant::Checkbox(input) => Some(FieldValue::Bool(input.value)),
        }
    }

    /// Whether the value counts as answered: not absent, not "", not false.
    pub fn is_filled(&self) -> bool {
        self.value().is_some_and(|value| !value.is_blank())
    }

    /// Drop the current value back to absent (unchecked for checkboxes).
    pub fn clear_value(&mut self) {
        match &mut self.variant {
            FieldVariant::Text(input) | FieldVariant::Textarea(input) => input.value = None,
            FieldVariant::Select(input) => input.value = None,
            FieldVariant::Date(input) => input.value = None,
            FieldVariant::Checkbox(input) => input.value = false,
        }
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn set_error(&mut self, message: String) {
        self.error = Some(message);
    }

    /// Label/id hint that marks a trailing consent checkbox.
    pub fn matches_any(&self, keywords: &[String]) -> bool {
        let label = self.label.to_lowercase();
        let id = self.id.to_lowercase();
        keywords.iter().any(|keyword| {
            let keyword = keyword.to_lowercase();
            label.contains(&keyword) || id.contains(&keyword)
        })
    }
}

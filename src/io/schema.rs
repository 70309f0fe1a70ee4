use jsonschema::validator_for;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::domain::{PersistedDocument, Steps};

const JSON_SCHEMA_DRAFT: &str = "http://json-schema.org/draft-07/schema#";

/// Persisted data that does not have the expected structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeError {
    pub pointer: String,
    pub message: String,
}

impl std::fmt::Display for ShapeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pointer = if self.pointer.is_empty() {
            "<root>"
        } else {
            self.pointer.as_str()
        };
        write!(f, "{pointer}: {}", self.message)
    }
}

impl std::error::Error for ShapeError {}

impl ShapeError {
    fn new(pointer: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            pointer: pointer.into(),
            message: message.into(),
        }
    }
}

fn field_schema() -> Value {
    json!({
        "type": "object",
        "required": ["id", "type", "label"],
        "properties": {
            "id": {"type": "string", "minLength": 1},
            "type": {"enum": ["text", "textarea", "select", "checkbox", "date"]},
            "label": {"type": "string"},
            "required": {"type": "boolean"},
            "helpText": {"type": ["string", "null"]},
            "placeholder": {"type": ["string", "null"]},
            "error": {"type": ["string", "null"]},
            "minLength": {"type": ["integer", "null"], "minimum": 0},
            "maxLength": {"type": ["integer", "null"], "minimum": 0},
            "pattern": {"type": ["string", "null"]}
        },
        "oneOf": [
            {
                "properties": {
                    "type": {"enum": ["text", "textarea", "date"]},
                    "value": {"type": ["string", "null"]}
                }
            },
            {
                "required": ["options"],
                "properties": {
                    "type": {"const": "select"},
                    "options": {
                        "type": "array",
                        "minItems": 1,
                        "items": {"type": "string"}
                    },
                    "value": {"type": ["string", "null"]}
                }
            },
            {
                "properties": {
                    "type": {"const": "checkbox"},
                    "value": {"type": "boolean"}
                }
            }
        ]
    })
}

fn steps_schema() -> Value {
    json!({
        "type": "array",
        "minItems": 1,
        "items": {
            "type": "array",
            "items": {"$ref": "#/definitions/field"}
        }
    })
}

/// JSON Schema of a saved form document.
pub fn document_schema() -> Value {
    json!({
        "$schema": JSON_SCHEMA_DRAFT,
        "title": "Form document",
        "type": "object",
        "required": ["steps"],
        "properties": {
            "steps": steps_schema(),
            "title": {"type": "string"},
            "description": {"type": "string"},
            "createdAt": {"type": "string"},
            "updatedAt": {"type": "string"}
        },
        "definitions": {"field": field_schema()}
    })
}

/// JSON Schema of the persisted builder session.
pub fn session_schema() -> Value {
    json!({
        "$schema": JSON_SCHEMA_DRAFT,
        "title": "Form builder session",
        "type": "object",
        "required": ["steps"],
        "properties": {
            "steps": steps_schema(),
            "formTitle": {"type": "string"},
            "formDescription": {"type": "string"},
            "theme": {"enum": ["light", "dark"]},
            "previewMode": {"enum": ["desktop", "tablet", "mobile"]},
            "formId": {"type": ["string", "null"]},
            "currentStep": {"type": "integer", "minimum": 0}
        },
        "definitions": {"field": field_schema()}
    })
}

/// Check `raw` against `schema`, then deserialize it.
pub fn decode_with_schema<T: DeserializeOwned>(raw: Value, schema: &Value) -> Result<T, ShapeError> {
    let validator = validator_for(schema)
        .map_err(|err| ShapeError::new("", format!("schema failed to compile: {err}")))?;
    if let Some(error) = validator.iter_errors(&raw).next() {
        return Err(ShapeError::new(error.instance_path.to_string(), error.to_string()));
    }
    serde_json::from_value(raw).map_err(|err| ShapeError::new("", err.to_string()))
}

/// Ensure a decoded step collection upholds the document invariants.
pub fn check_steps(steps: &Steps) -> Result<(), ShapeError> {
    if steps.is_empty() {
        return Err(ShapeError::new("/steps", "a form needs at least one step"));
    }
    if let Some(id) = steps.duplicate_field_id() {
        return Err(ShapeError::new(
            "/steps",
            format!("field id '{id}' is used more than once"),
        ));
    }
    Ok(())
}

/// Decode a saved form. A bare `Field[][]` payload is read as the steps of
/// an untitled document.
pub fn decode_document(raw: Value) -> Result<PersistedDocument, ShapeError> {
    let raw = match raw {
        Value::Array(steps) => json!({ "steps": steps }),
        other => other,
    };
    let document: PersistedDocument = decode_with_schema(raw, &document_schema())?;
    check_steps(&document.steps)?;
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FieldKind;

    #[test]
    fn decodes_saved_documents() {
        let raw = json!({
            "steps": [[
                {"id": "name", "type": "text", "label": "Name", "required": true, "value": "Ada"},
                {"id": "plan", "type": "select", "label": "Plan", "options": ["Free", "Pro"]}
            ], [
                {"id": "terms", "type": "checkbox", "label": "Accept terms", "value": false}
            ]],
            "title": "Signup",
            "description": "",
            "createdAt": "2024-05-01T10:00:00.000Z"
        });
        let document = decode_document(raw).unwrap();
        assert_eq!(document.title, "Signup");
        assert_eq!(document.steps.len(), 2);
        assert_eq!(document.steps[1][0].kind(), FieldKind::Checkbox);
        assert!(document.created_at.is_some());
    }

    #[test]
    fn accepts_bare_step_arrays() {
        let raw = json!([[{"id": "a", "type": "date", "label": "When"}]]);
        let document = decode_document(raw).unwrap();
        assert_eq!(document.title, "");
        assert_eq!(document.steps.field_count(), 1);
    }

    #[test]
    fn rejects_missing_steps() {
        let err = decode_document(json!({"title": "No steps"})).unwrap_err();
        assert!(err.message.contains("steps"), "{err}");
    }

    #[test]
    fn rejects_wrongly_typed_values() {
        let raw = json!({"steps": [[
            {"id": "a", "type": "checkbox", "label": "Box", "value": "yes"}
        ]]});
        assert!(decode_document(raw).is_err());

        let raw = json!({"steps": [[
            {"id": "b", "type": "select", "label": "Pick"}
        ]]});
        assert!(decode_document(raw).is_err());

        let raw = json!({"steps": [[
            {"id": "c", "type": "radio", "label": "Radio"}
        ]]});
        assert!(decode_document(raw).is_err());
    }

    #[test]
    fn rejects_empty_and_duplicated_documents() {
        assert!(decode_document(json!({"steps": []})).is_err());
        let raw = json!({"steps": [
            [{"id": "a", "type": "text", "label": "A"}],
            [{"id": "a", "type": "text", "label": "A again"}]
        ]});
        let err = decode_document(raw).unwrap_err();
        assert_eq!(err.pointer, "/steps");
    }
}

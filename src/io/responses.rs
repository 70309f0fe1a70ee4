use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::FieldValue;

use super::store::{KeyValueStore, StoreError, form_id_from_key, form_key, form_prefix, responses_key};

/// One submitted fill-out, keyed by field id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormResponse {
    #[serde(flatten)]
    pub values: IndexMap<String, FieldValue>,
    #[serde(rename = "submittedAt")]
    pub submitted_at: DateTime<Utc>,
    pub id: String,
}

/// Summary row for a saved form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedForm {
    pub id: String,
    pub title: String,
    pub step_count: usize,
    pub field_count: usize,
    pub response_count: usize,
}

/// All responses recorded for `form_id`, oldest first.
pub fn responses<S>(store: &S, form_id: &str) -> Result<Vec<FormResponse>, StoreError>
where
    S: KeyValueStore + ?Sized,
{
    let key = responses_key(form_id);
    match store.get(&key)? {
        None => Ok(Vec::new()),
        Some(raw) => serde_json::from_value(raw).map_err(|source| StoreError::Decode { key, source }),
    }
}

/// Append a response stamped with a fresh id and the submission time.
pub fn record_response<S>(
    store: &mut S,
    form_id: &str,
    values: IndexMap<String, FieldValue>,
) -> Result<FormResponse, StoreError>
where
    S: KeyValueStore + ?Sized,
{
    let mut log = responses(store, form_id)?;
    let response = FormResponse {
        values,
        submitted_at: Utc::now(),
        id: Uuid::new_v4().to_string(),
    };
    log.push(response.clone());
    let key = responses_key(form_id);
    let payload = serde_json::to_value(&log).map_err(|source| StoreError::Encode {
        key: key.clone(),
        source,
    })?;
    store.put(&key, payload)?;
    info!(form_id, response_id = %response.id, total = log.len(), "recorded response");
    Ok(response)
}

pub fn clear_responses<S>(store: &mut S, form_id: &str) -> Result<(), StoreError>
where
    S: KeyValueStore + ?Sized,
{
    store.remove(&responses_key(form_id))
}

/// Remove a saved form together with its responses.
pub fn delete_form<S>(store: &mut S, form_id: &str) -> Result<(), StoreError>
where
    S: KeyValueStore + ?Sized,
{
    store.remove(&form_key(form_id))?;
    store.remove(&responses_key(form_id))?;
    info!(form_id, "deleted form");
    Ok(())
}

/// Every saved form in `store`. Entries that cannot be read are skipped.
pub fn list_forms<S>(store: &S) -> Result<Vec<SavedForm>, StoreError>
where
    S: KeyValueStore + ?Sized,
{
    let mut forms = Vec::new();
    for key in store.list_keys(form_prefix())? {
        let Some(id) = form_id_from_key(&key) else {
            continue;
        };
        let raw = match store.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => continue,
            Err(err) => {
                warn!(key = %key, error = %err, "skipping unreadable form");
                continue;
            }
        };
        let response_count = match responses(store, id) {
            Ok(log) => log.len(),
            Err(err) => {
                warn!(form_id = id, error = %err, "unreadable response log");
                0
            }
        };
        forms.push(summarize(id, &raw, response_count));
    }
    Ok(forms)
}

fn summarize(id: &str, raw: &Value, response_count: usize) -> SavedForm {
    let steps = raw
        .get("steps")
        .or_else(|| raw.is_array().then_some(raw))
        .and_then(Value::as_array);
    let step_count = steps.map(Vec::len).unwrap_or(0);
    let field_count = steps
        .map(|steps| steps.iter().filter_map(Value::as_array).map(Vec::len).sum())
        .unwrap_or(0);
    let first_label = steps
        .and_then(|steps| steps.first())
        .and_then(|step| step.get(0))
        .and_then(|field| field.get("label"))
        .and_then(Value::as_str)
        .filter(|label| !label.is_empty());
    let title = raw
        .get("title")
        .and_then(Value::as_str)
        .filter(|title| !title.is_empty())
        .or(first_label)
        .unwrap_or(id)
        .to_string();
    SavedForm {
        id: id.to_string(),
        title,
        step_count,
        field_count,
        response_count,
    }
}

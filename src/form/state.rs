use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    domain::{Field, FieldKind, FieldPatch, FieldValue, PersistedDocument, Step, Steps},
    io::{
        ShapeError, StoreError,
        schema,
        store::{self, KeyValueStore, SESSION_KEY},
    },
    validation::{self, StepReport, ValidationError},
};

use super::{
    error::FormError,
    history::History,
    options::FormOptions,
    session::{PreviewMode, SessionState, Theme},
};

/// Read-only view of everything a presentation layer renders.
#[derive(Debug, Clone, PartialEq)]
pub struct FormSnapshot {
    pub steps: Steps,
    pub current_step: usize,
    pub selected_field_id: Option<String>,
    pub theme: Theme,
    pub preview_mode: PreviewMode,
    pub form_id: Option<String>,
    pub title: String,
    pub description: String,
    pub past_len: usize,
    pub future_len: usize,
}

/// The single source of truth of a form being built or filled.
///
/// Every mutation replaces the step containers it touches instead of editing
/// them in place, so snapshots handed out earlier (and the undo history) stay
/// valid. Malformed requests such as an unknown id or an out-of-range index
/// leave the state untouched.
#[derive(Debug, Clone)]
pub struct FormStore {
    steps: Steps,
    current_step: usize,
    selected_field_id: Option<String>,
    history: History,
    theme: Theme,
    preview_mode: PreviewMode,
    form_id: Option<String>,
    title: String,
    description: String,
    created_at: Option<DateTime<Utc>>,
    options: FormOptions,
}

impl Default for FormStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FormStore {
    pub fn new() -> Self {
        Self::with_options(FormOptions::default())
    }

    pub fn with_options(options: FormOptions) -> Self {
        Self {
            steps: Steps::single_empty(),
            current_step: 0,
            selected_field_id: None,
            history: History::new(options.history_limit),
            theme: Theme::default(),
            preview_mode: PreviewMode::default(),
            form_id: None,
            title: options.default_title.clone(),
            description: String::new(),
            created_at: None,
            options,
        }
    }

    pub fn steps(&self) -> &Steps {
        &self.steps
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn is_last_step(&self) -> bool {
        self.current_step + 1 >= self.steps.len()
    }

    pub fn current_fields(&self) -> &[Field] {
        self.steps
            .get(self.current_step)
            .map(Step::fields)
            .unwrap_or_default()
    }

    pub fn selected_field_id(&self) -> Option<&str> {
        self.selected_field_id.as_deref()
    }

    pub fn selected_field(&self) -> Option<&Field> {
        let id = self.selected_field_id.as_deref()?;
        self.steps.get(self.current_step)?.find(id)
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn preview_mode(&self) -> PreviewMode {
        self.preview_mode
    }

    pub fn form_id(&self) -> Option<&str> {
        self.form_id.as_deref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn options(&self) -> &FormOptions {
        &self.options
    }

    pub fn past_len(&self) -> usize {
        self.history.past_len()
    }

    pub fn future_len(&self) -> usize {
        self.history.future_len()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn snapshot(&self) -> FormSnapshot {
        FormSnapshot {
            steps: self.steps.clone(),
            current_step: self.current_step,
            selected_field_id: self.selected_field_id.clone(),
            theme: self.theme,
            preview_mode: self.preview_mode,
            form_id: self.form_id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            past_len: self.history.past_len(),
            future_len: self.history.future_len(),
        }
    }

    /// The document as it would be persisted, without timestamps.
    pub fn document(&self) -> PersistedDocument {
        PersistedDocument {
            steps: self.steps.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            created_at: self.created_at,
            updated_at: None,
        }
    }

    /// Append a new field of `kind` to the current step and select it.
    pub fn add_field(&mut self, kind: FieldKind) -> String {
        self.checkpoint();
        let field = Field::create(kind);
        let id = field.id.clone();
        let mut fields = self.current_step_fields();
        fields.push(field);
        self.replace_current_step(fields);
        self.selected_field_id = Some(id.clone());
        debug!(field_id = %id, %kind, step = self.current_step, "added field");
        id
    }

    pub fn remove_field(&mut self, id: &str) {
        let Some(index) = self.position_in_current_step(id) else {
            debug!(field_id = id, "remove ignored: field not on current step");
            return;
        };
        self.checkpoint();
        let mut fields = self.current_step_fields();
        fields.remove(index);
        self.replace_current_step(fields);
        if self.selected_field_id.as_deref() == Some(id) {
            self.selected_field_id = None;
        }
        debug!(field_id = id, step = self.current_step, "removed field");
    }

    /// Merge `patch` into a field of the current step. Value edits are not
    /// recorded in the undo history.
    pub fn update_field(&mut self, id: &str, patch: &FieldPatch) {
        let Some(index) = self.position_in_current_step(id) else {
            debug!(field_id = id, "update ignored: field not on current step");
            return;
        };
        let mut fields = self.current_step_fields();
        fields[index] = fields[index].merge(patch);
        self.replace_current_step(fields);
    }

    pub fn move_field(&mut self, from: usize, to: usize) {
        let len = self.current_fields().len();
        if from >= len || to >= len || from == to {
            debug!(from, to, len, "move ignored: indices out of range or equal");
            return;
        }
        self.checkpoint();
        let mut fields = self.current_step_fields();
        let moved = fields.remove(from);
        fields.insert(to, moved);
        self.replace_current_step(fields);
    }

    /// Select a field of the current step, or clear the selection.
    pub fn select_field(&mut self, id: Option<&str>) {
        match id {
            None => self.selected_field_id = None,
            Some(id) if self.position_in_current_step(id).is_some() => {
                self.selected_field_id = Some(id.to_string());
            }
            Some(id) => debug!(field_id = id, "select ignored: field not on current step"),
        }
    }

    pub fn add_step(&mut self) {
        self.checkpoint();
        let mut steps = self.steps.to_vec();
        steps.push(Step::default());
        self.steps = Steps::new(steps);
        debug!(steps = self.steps.len(), "added step");
    }

    /// Remove step `index`. The last remaining step is never removed.
    pub fn remove_step(&mut self, index: usize) {
        if self.steps.len() <= 1 || index >= self.steps.len() {
            debug!(index, steps = self.steps.len(), "remove step ignored");
            return;
        }
        self.checkpoint();
        let mut steps = self.steps.to_vec();
        let removed = steps.remove(index);
        self.steps = Steps::new(steps);

        if index < self.current_step {
            self.current_step -= 1;
        }
        self.clamp_current_step();
        if let Some(selected) = self.selected_field_id.as_deref()
            && removed.position(selected).is_some()
        {
            self.selected_field_id = None;
        }
        debug!(index, steps = self.steps.len(), "removed step");
    }

    /// Move to step `index` when it exists. Selection is cleared either way.
    pub fn set_current_step(&mut self, index: usize) {
        if index < self.steps.len() {
            self.current_step = index;
        }
        self.selected_field_id = None;
    }

    pub fn undo(&mut self) {
        let Some(previous) = self.history.undo(&self.steps) else {
            return;
        };
        self.steps = previous;
        self.selected_field_id = None;
        self.clamp_current_step();
    }

    pub fn redo(&mut self) {
        let Some(next) = self.history.redo(&self.steps) else {
            return;
        };
        self.steps = next;
        self.selected_field_id = None;
        self.clamp_current_step();
    }

    /// Start over with a single empty step. Cannot be undone.
    pub fn reset(&mut self) {
        self.steps = Steps::single_empty();
        self.current_step = 0;
        self.selected_field_id = None;
        self.history.clear();
        self.form_id = None;
        self.title = self.options.default_title.clone();
        self.description.clear();
        self.created_at = None;
        debug!("reset form");
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
    }

    pub fn set_preview_mode(&mut self, mode: PreviewMode) {
        self.preview_mode = mode;
    }

    /// Drop every entered value and validation message on all steps.
    pub fn clear_values(&mut self) {
        let steps = self
            .steps
            .iter()
            .map(|step| {
                let fields = step
                    .iter()
                    .map(|field| {
                        let mut field = field.clone();
                        field.clear_value();
                        field.clear_error();
                        field
                    })
                    .collect();
                Step::new(fields)
            })
            .collect();
        self.steps = Steps::new(steps);
    }

    /// Set a field's value from the fill-out view and validate it on the spot.
    /// The outcome is also stored as the field's error message.
    pub fn answer(&mut self, id: &str, value: FieldValue) -> Result<(), ValidationError> {
        let Some(index) = self.position_in_current_step(id) else {
            debug!(field_id = id, "answer ignored: field not on current step");
            return Ok(());
        };
        let mut fields = self.current_step_fields();
        let mut field = fields[index].merge(&FieldPatch::new().with_value(value.to_json()));
        let outcome = validation::validate_field(&field);
        match &outcome {
            Ok(()) => field.clear_error(),
            Err(err) => field.set_error(err.to_string()),
        }
        fields[index] = field;
        self.replace_current_step(fields);
        outcome
    }

    /// Validate the current step and record each field's message on it.
    pub fn validate_current_step(&mut self, final_submission: bool) -> StepReport {
        let report = validation::validate_step(
            self.current_fields(),
            final_submission,
            &self.options.consent_keywords,
        );
        let changed = self.current_fields().iter().any(|field| {
            let message = report.get(&field.id).map(ToString::to_string);
            field.error != message
        });
        if changed {
            let fields = self
                .current_fields()
                .iter()
                .map(|field| {
                    let mut field = field.clone();
                    match report.get(&field.id) {
                        Some(err) => field.set_error(err.to_string()),
                        None => field.clear_error(),
                    }
                    field
                })
                .collect();
            self.replace_current_step(fields);
        }
        report
    }

    /// Allocate a fresh identifier and persist the document under it.
    pub fn generate_id<S>(&mut self, store: &mut S) -> Result<String, FormError>
    where
        S: KeyValueStore + ?Sized,
    {
        let id = Uuid::new_v4().to_string();
        let created_at = Utc::now();
        let document = PersistedDocument {
            created_at: Some(created_at),
            ..self.document()
        };
        put_document(store, &id, &document)?;
        self.form_id = Some(id.clone());
        self.created_at = Some(created_at);
        info!(form_id = %id, "published form");
        Ok(id)
    }

    /// Persist the document under its identifier. Returns `false` when no
    /// identifier has been generated yet.
    pub fn save<S>(&self, store: &mut S) -> Result<bool, FormError>
    where
        S: KeyValueStore + ?Sized,
    {
        let Some(id) = self.form_id.as_deref() else {
            debug!("save skipped: form has no identifier");
            return Ok(false);
        };
        let document = PersistedDocument {
            updated_at: Some(Utc::now()),
            ..self.document()
        };
        put_document(store, id, &document)?;
        info!(form_id = id, "saved form");
        Ok(true)
    }

    /// Replace the live document with the one stored under `id`. Anything
    /// missing or malformed is reported and the current state kept as is.
    pub fn load<S>(&mut self, store: &S, id: &str) -> Result<(), FormError>
    where
        S: KeyValueStore + ?Sized,
    {
        let key = store::form_key(id);
        let raw = match store.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Err(FormError::NotFound { id: id.to_string() }),
            Err(StoreError::Decode { key, source }) => {
                return Err(corrupt(key, ShapeError {
                    pointer: String::new(),
                    message: source.to_string(),
                }));
            }
            Err(err) => return Err(err.into()),
        };
        let document = schema::decode_document(raw).map_err(|source| corrupt(key.clone(), source))?;

        self.steps = document.steps;
        self.form_id = Some(id.to_string());
        self.current_step = 0;
        self.selected_field_id = None;
        self.title = if document.title.is_empty() {
            self.options.default_title.clone()
        } else {
            document.title
        };
        self.description = document.description;
        self.created_at = document.created_at;
        self.history.clear();
        info!(form_id = id, steps = self.steps.len(), "loaded form");
        Ok(())
    }

    pub fn session(&self) -> SessionState {
        SessionState {
            steps: self.steps.clone(),
            form_title: self.title.clone(),
            form_description: self.description.clone(),
            theme: self.theme,
            preview_mode: self.preview_mode,
            form_id: self.form_id.clone(),
            current_step: self.current_step,
        }
    }

    /// Adopt a previously saved session. History starts empty.
    ///
    /// Sessions built by callers are taken as is, unlike [`FormStore::resume`]
    /// which checks the stored shape first: an empty step list becomes a
    /// single empty step and the step index is clamped.
    pub fn restore_session(&mut self, session: SessionState) {
        self.steps = if session.steps.is_empty() {
            Steps::single_empty()
        } else {
            session.steps
        };
        self.current_step = session.current_step;
        self.clamp_current_step();
        self.selected_field_id = None;
        self.history.clear();
        self.title = session.form_title;
        self.description = session.form_description;
        self.theme = session.theme;
        self.preview_mode = session.preview_mode;
        self.form_id = session.form_id;
        self.created_at = None;
    }

    pub fn persist_session<S>(&self, store: &mut S) -> Result<(), FormError>
    where
        S: KeyValueStore + ?Sized,
    {
        let payload = serde_json::to_value(self.session()).map_err(|source| StoreError::Encode {
            key: SESSION_KEY.to_string(),
            source,
        })?;
        store.put(SESSION_KEY, payload)?;
        Ok(())
    }

    /// Build a store from the saved session in `store`, or a fresh one when
    /// nothing was saved yet.
    pub fn resume<S>(store: &S, options: FormOptions) -> Result<Self, FormError>
    where
        S: KeyValueStore + ?Sized,
    {
        let mut form = FormStore::with_options(options);
        let Some(raw) = store.get(SESSION_KEY)? else {
            return Ok(form);
        };
        let session: SessionState = schema::decode_with_schema(raw, &schema::session_schema())
            .and_then(|session: SessionState| {
                schema::check_steps(&session.steps)?;
                Ok(session)
            })
            .map_err(|source| corrupt(SESSION_KEY.to_string(), source))?;
        form.restore_session(session);
        Ok(form)
    }

    fn checkpoint(&mut self) {
        self.history.checkpoint(&self.steps);
    }

    fn position_in_current_step(&self, id: &str) -> Option<usize> {
        self.current_fields().iter().position(|field| field.id == id)
    }

    fn current_step_fields(&self) -> Vec<Field> {
        self.steps
            .get(self.current_step)
            .map(Step::to_vec)
            .unwrap_or_default()
    }

    fn replace_current_step(&mut self, fields: Vec<Field>) {
        self.steps = self.steps.with_step(self.current_step, Step::new(fields));
    }

    fn clamp_current_step(&mut self) {
        let last = self.steps.len().saturating_sub(1);
        if self.current_step > last {
            self.current_step = last;
        }
    }
}

fn put_document<S>(store: &mut S, id: &str, document: &PersistedDocument) -> Result<(), FormError>
where
    S: KeyValueStore + ?Sized,
{
    let key = store::form_key(id);
    let payload = serde_json::to_value(document).map_err(|source| StoreError::Encode {
        key: key.clone(),
        source,
    })?;
    store.put(&key, payload)?;
    Ok(())
}

fn corrupt(key: String, source: ShapeError) -> FormError {
    warn!(key = %key, error = %source, "rejected corrupt persisted data");
    FormError::Corrupt { key, source }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::io::MemoryStore;

    #[test]
    fn starts_with_one_empty_untitled_step() {
        let form = FormStore::new();
        assert_eq!(form.steps().len(), 1);
        assert!(form.current_fields().is_empty());
        assert_eq!(form.title(), "Untitled Form");
        assert_eq!(form.form_id(), None);
        assert!(!form.can_undo());
    }

    #[test]
    fn add_undo_redo_round_trips_steps() {
        let mut form = FormStore::new();
        let before = form.steps().clone();
        let id = form.add_field(FieldKind::Text);
        let after = form.steps().clone();
        assert_eq!(form.selected_field_id(), Some(id.as_str()));

        form.undo();
        assert_eq!(form.steps(), &before);
        assert_eq!(form.selected_field_id(), None);
        form.redo();
        assert_eq!(form.steps(), &after);
        assert_eq!(form.future_len(), 0);
    }

    #[test]
    fn history_is_capped() {
        let mut form = FormStore::new();
        for _ in 0..15 {
            form.add_field(FieldKind::Checkbox);
        }
        assert_eq!(form.past_len(), 10);
        for _ in 0..10 {
            form.undo();
        }
        assert_eq!(form.current_fields().len(), 5);
        form.undo();
        assert_eq!(form.current_fields().len(), 5);
    }

    #[test]
    fn new_checkpoint_drops_redo() {
        let mut form = FormStore::new();
        form.add_field(FieldKind::Text);
        form.undo();
        assert!(form.can_redo());
        form.add_step();
        assert!(!form.can_redo());
    }

    #[test]
    fn invalid_move_keeps_steps_pointer() {
        let mut form = FormStore::new();
        form.add_field(FieldKind::Text);
        form.add_field(FieldKind::Date);
        let before = form.steps().clone();
        let past = form.past_len();
        form.move_field(0, 2);
        form.move_field(1, 1);
        assert!(form.steps().ptr_eq(&before));
        assert_eq!(form.past_len(), past);

        form.move_field(1, 0);
        assert!(!form.steps().ptr_eq(&before));
        assert_eq!(form.current_fields()[0].kind(), FieldKind::Date);
    }

    #[test]
    fn mutations_leave_earlier_snapshots_intact() {
        let mut form = FormStore::new();
        let id = form.add_field(FieldKind::Text);
        let snapshot = form.snapshot();
        form.update_field(&id, &FieldPatch::new().with_label("Changed"));
        assert_eq!(snapshot.steps[0][0].label, "Text Field");
        assert_eq!(form.current_fields()[0].label, "Changed");
    }

    #[test]
    fn update_field_does_not_checkpoint() {
        let mut form = FormStore::new();
        let id = form.add_field(FieldKind::Select);
        let past = form.past_len();
        form.update_field(&id, &FieldPatch::new().with_options(json!(["A"])));
        form.update_field(&id, &FieldPatch::new().with_value("A"));
        assert_eq!(form.past_len(), past);
        let field = &form.current_fields()[0];
        assert_eq!(field.options(), Some(&["A".to_string()][..]));
        assert_eq!(field.value(), Some(FieldValue::from("A")));
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let mut form = FormStore::new();
        form.add_field(FieldKind::Text);
        let before = form.steps().clone();
        let past = form.past_len();
        form.remove_field("missing");
        form.update_field("missing", &FieldPatch::new().with_label("x"));
        form.select_field(Some("missing"));
        assert!(form.steps().ptr_eq(&before));
        assert_eq!(form.past_len(), past);
        assert!(form.selected_field_id().is_some());
    }

    #[test]
    fn remove_field_clears_selection() {
        let mut form = FormStore::new();
        let id = form.add_field(FieldKind::Textarea);
        form.remove_field(&id);
        assert!(form.current_fields().is_empty());
        assert_eq!(form.selected_field_id(), None);
    }

    #[test]
    fn step_lifecycle() {
        let mut form = FormStore::new();
        form.remove_step(0);
        assert_eq!(form.steps().len(), 1);
        assert_eq!(form.past_len(), 0);

        form.add_step();
        form.add_step();
        assert_eq!(form.steps().len(), 3);

        form.set_current_step(2);
        form.remove_step(0);
        assert_eq!(form.current_step(), 1);
        form.remove_step(1);
        assert_eq!(form.current_step(), 0);
        form.remove_step(7);
        assert_eq!(form.steps().len(), 1);

        form.set_current_step(5);
        assert_eq!(form.current_step(), 0);
    }

    #[test]
    fn undo_clamps_current_step() {
        let mut form = FormStore::new();
        form.add_step();
        form.set_current_step(1);
        form.undo();
        assert_eq!(form.steps().len(), 1);
        assert_eq!(form.current_step(), 0);
    }

    #[test]
    fn reset_restores_defaults() {
        let mut form = FormStore::new();
        form.add_field(FieldKind::Text);
        form.set_title("Survey");
        form.set_description("About you");
        form.reset();
        assert_eq!(form.steps().field_count(), 0);
        assert_eq!(form.title(), "Untitled Form");
        assert_eq!(form.description(), "");
        assert!(!form.can_undo());
    }

    #[test]
    fn settings_are_outside_history() {
        let mut form = FormStore::new();
        form.toggle_theme();
        form.set_preview_mode(PreviewMode::Mobile);
        assert_eq!(form.theme(), Theme::Dark);
        assert_eq!(form.preview_mode(), PreviewMode::Mobile);
        assert!(!form.can_undo());
    }

    #[test]
    fn validation_writes_and_clears_errors() {
        let mut form = FormStore::new();
        let id = form.add_field(FieldKind::Text);
        form.update_field(
            &id,
            &FieldPatch::new().with_required(true).with_pattern("^[0-9]+$"),
        );
        let report = form.validate_current_step(false);
        assert_eq!(report.get(&id), Some(&ValidationError::Required));
        assert_eq!(form.current_fields()[0].error.as_deref(), Some("This field is required"));

        assert_eq!(form.answer(&id, "abc".into()), Err(ValidationError::InvalidFormat));
        assert_eq!(form.answer(&id, "42".into()), Ok(()));
        let unchanged = form.steps().clone();
        assert!(form.validate_current_step(false).is_valid());
        assert!(form.steps().ptr_eq(&unchanged));
        assert_eq!(form.current_fields()[0].error, None);
    }

    #[test]
    fn publish_save_and_load() {
        let mut store = MemoryStore::new();
        let mut form = FormStore::new();
        assert!(!form.save(&mut store).unwrap());

        form.add_field(FieldKind::Select);
        form.set_title("Plans");
        let id = form.generate_id(&mut store).unwrap();
        let stored = store.get(&store::form_key(&id)).unwrap().unwrap();
        assert!(stored["createdAt"].is_string());
        assert!(stored["steps"][0][0].get("error").is_none());
        assert!(form.save(&mut store).unwrap());

        let mut other = FormStore::new();
        other.add_step();
        other.load(&store, &id).unwrap();
        assert_eq!(other.steps(), form.steps());
        assert_eq!(other.title(), "Plans");
        assert_eq!(other.form_id(), Some(id.as_str()));
        assert!(!other.can_undo());
    }

    #[test]
    fn corrupt_or_missing_documents_leave_state_untouched() {
        let mut store = MemoryStore::new();
        store.put("form-bad", json!({"title": "no steps"})).unwrap();
        let mut form = FormStore::new();
        form.add_field(FieldKind::Text);
        let before = form.steps().clone();

        let err = form.load(&store, "bad").unwrap_err();
        assert!(matches!(err, FormError::Corrupt { .. }));
        let err = form.load(&store, "gone").unwrap_err();
        assert!(matches!(err, FormError::NotFound { .. }));
        assert!(form.steps().ptr_eq(&before));
        assert_eq!(form.form_id(), None);
    }

    #[test]
    fn legacy_payload_gets_default_title() {
        let mut store = MemoryStore::new();
        store
            .put("form-old", json!([[{"id": "a", "type": "text", "label": "Name"}]]))
            .unwrap();
        let mut form = FormStore::new();
        form.set_title("Something else");
        form.load(&store, "old").unwrap();
        assert_eq!(form.title(), "Untitled Form");
        assert_eq!(form.current_fields()[0].id, "a");
    }

    #[test]
    fn session_resumes_without_history() {
        let mut store = MemoryStore::new();
        let mut form = FormStore::new();
        form.add_field(FieldKind::Date);
        form.set_title("Booking");
        form.toggle_theme();
        form.add_step();
        form.set_current_step(1);
        form.persist_session(&mut store).unwrap();

        let resumed = FormStore::resume(&store, FormOptions::default()).unwrap();
        assert_eq!(resumed.steps(), form.steps());
        assert_eq!(resumed.title(), "Booking");
        assert_eq!(resumed.theme(), Theme::Dark);
        assert_eq!(resumed.current_step(), 1);
        assert!(!resumed.can_undo());

        let fresh = FormStore::resume(&MemoryStore::new(), FormOptions::default()).unwrap();
        assert_eq!(fresh.steps().len(), 1);
    }

    #[test]
    fn redo_clears_selection() {
        let mut form = FormStore::new();
        let first = form.add_field(FieldKind::Text);
        form.add_field(FieldKind::Select);
        form.undo();
        form.select_field(Some(&first));
        assert_eq!(form.selected_field().map(|field| field.id.as_str()), Some(first.as_str()));

        form.redo();
        assert_eq!(form.current_fields().len(), 2);
        assert_eq!(form.selected_field_id(), None);
        assert!(form.selected_field().is_none());
    }

    #[test]
    fn redo_clamps_current_step() {
        let mut form = FormStore::new();
        form.add_step();
        form.remove_step(1);
        form.undo();
        assert_eq!(form.steps().len(), 2);
        form.set_current_step(1);
        assert_eq!(form.current_step(), 1);

        form.redo();
        assert_eq!(form.steps().len(), 1);
        assert_eq!(form.current_step(), 0);
    }

    #[test]
    fn restoring_an_unchecked_session_normalises_it() {
        let mut form = FormStore::new();
        form.add_field(FieldKind::Text);
        form.restore_session(SessionState {
            steps: Steps::new(Vec::new()),
            form_title: "Draft".into(),
            form_description: String::new(),
            theme: Theme::Light,
            preview_mode: PreviewMode::Desktop,
            form_id: None,
            current_step: 4,
        });
        assert_eq!(form.steps(), &Steps::single_empty());
        assert_eq!(form.current_step(), 0);
        assert!(form.current_fields().is_empty());
        assert_eq!(form.title(), "Draft");
        assert!(!form.can_undo());
    }
}

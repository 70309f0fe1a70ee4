use formkit::io::{responses, store};
use formkit::prelude::*;
use formkit::{Advance, FormError};
use serde_json::json;

#[test]
fn load_without_steps_is_rejected_and_state_kept() {
    let dir = tempfile::tempdir().unwrap();
    let mut files = FileStore::new(dir.path());
    files
        .put(&store::form_key("broken"), json!({"title": "Lost"}))
        .unwrap();

    let mut form = FormStore::new();
    form.add_field(FieldKind::Text);
    let before = form.snapshot();
    let err = form.load(&files, "broken").unwrap_err();
    assert!(matches!(err, FormError::Corrupt { .. }), "{err}");
    assert_eq!(form.snapshot(), before);
}

#[test]
fn documents_survive_a_file_store_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let mut files = FileStore::new(dir.path());

    let mut form = FormStore::new();
    let id = form.add_field(FieldKind::Text);
    form.update_field(
        &id,
        &FieldPatch::new()
            .with_label("Zip")
            .with_pattern("^[0-9]{5}$")
            .with_max_length(5),
    );
    form.set_description("Where do you live?");
    let form_id = form.generate_id(&mut files).unwrap();

    let mut reopened = FormStore::new();
    reopened.load(&FileStore::new(dir.path()), &form_id).unwrap();
    assert_eq!(reopened.steps(), form.steps());
    assert_eq!(reopened.description(), "Where do you live?");
    assert_eq!(reopened.current_fields()[0].pattern(), Some("^[0-9]{5}$"));
}

#[test]
fn fill_out_records_responses_per_form() {
    let mut store = MemoryStore::new();
    let mut form = FormStore::new();
    let email = form.add_field(FieldKind::Text);
    form.update_field(&email, &FieldPatch::new().with_label("Email").with_required(true));
    let form_id = form.generate_id(&mut store).unwrap();

    for address in ["a@example.com", "b@example.com"] {
        form.answer(&email, address.into()).unwrap();
        assert!(matches!(form.advance(&mut store).unwrap(), Advance::Submitted(_)));
    }

    let log = responses::responses(&store, &form_id).unwrap();
    assert_eq!(log.len(), 2);
    assert_eq!(log[1].values[&email], FieldValue::from("b@example.com"));

    let forms = responses::list_forms(&store).unwrap();
    assert_eq!(forms.len(), 1);
    assert_eq!(forms[0].title, "Untitled Form");
    assert_eq!(forms[0].response_count, 2);
}

#[test]
fn session_resume_restores_builder() {
    let dir = tempfile::tempdir().unwrap();
    let mut files = FileStore::new(dir.path());
    let mut form = FormStore::new();
    form.add_field(FieldKind::Textarea);
    form.set_preview_mode(formkit::PreviewMode::Tablet);
    form.persist_session(&mut files).unwrap();

    let resumed = FormStore::resume(&files, FormOptions::default()).unwrap();
    assert_eq!(resumed.steps(), form.steps());
    assert_eq!(resumed.preview_mode(), formkit::PreviewMode::Tablet);

    files
        .put(store::SESSION_KEY, json!({"steps": []}))
        .unwrap();
    assert!(FormStore::resume(&files, FormOptions::default()).is_err());
}

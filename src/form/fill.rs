//! Guided fill-out of a built form: step-by-step validation and submission.

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::{
    domain::FieldValue,
    io::{FormResponse, KeyValueStore, responses},
    validation::StepReport,
};

use super::{error::FormError, state::FormStore};

/// Result of trying to move past the current step.
#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    /// The step has errors; they were written onto its fields.
    Blocked(StepReport),
    NextStep(usize),
    Submitted(FormResponse),
}

impl FormStore {
    /// Share of fields across all steps holding an answer, in percent.
    pub fn progress(&self) -> f64 {
        let total = self.steps().field_count();
        if total == 0 {
            return 0.0;
        }
        let filled = self
            .steps()
            .iter_fields()
            .filter(|field| field.is_filled())
            .count();
        filled as f64 * 100.0 / total as f64
    }

    /// Every present value keyed by field id, in document order.
    pub fn answers(&self) -> IndexMap<String, FieldValue> {
        self.steps()
            .iter_fields()
            .filter_map(|field| field.value().map(|value| (field.id.clone(), value)))
            .collect()
    }

    /// Validate the current step and move on. On the last step the answers
    /// are recorded in `store`, every value is cleared and the form starts
    /// over at the first step.
    pub fn advance<S>(&mut self, store: &mut S) -> Result<Advance, FormError>
    where
        S: KeyValueStore + ?Sized,
    {
        let final_submission = self.is_last_step();
        let report = self.validate_current_step(final_submission);
        if !report.is_valid() {
            debug!(step = self.current_step(), errors = report.error_count(), "step blocked");
            return Ok(Advance::Blocked(report));
        }
        if !final_submission {
            let next = self.current_step() + 1;
            self.set_current_step(next);
            return Ok(Advance::NextStep(next));
        }

        let form_id = self.form_id().ok_or(FormError::MissingId)?.to_string();
        let response = responses::record_response(store, &form_id, self.answers())?;
        self.clear_values();
        self.set_current_step(0);
        info!(form_id = %form_id, response_id = %response.id, "form submitted");
        Ok(Advance::Submitted(response))
    }

    /// Go back one step without validating.
    pub fn retreat(&mut self) {
        if let Some(previous) = self.current_step().checked_sub(1) {
            self.set_current_step(previous);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{FieldKind, FieldPatch},
        io::MemoryStore,
    };

    fn two_step_form() -> (FormStore, String, String) {
        let mut form = FormStore::new();
        let name = form.add_field(FieldKind::Text);
        form.update_field(&name, &FieldPatch::new().with_label("Name").with_required(true));
        form.add_step();
        form.set_current_step(1);
        let terms = form.add_field(FieldKind::Checkbox);
        form.update_field(
            &terms,
            &FieldPatch::new().with_label("I agree to the terms").with_required(true),
        );
        form.set_current_step(0);
        (form, name, terms)
    }

    #[test]
    fn progress_counts_filled_fields() {
        let (mut form, name, _) = two_step_form();
        assert_eq!(form.progress(), 0.0);
        form.answer(&name, "Ada".into()).unwrap();
        assert_eq!(form.progress(), 50.0);
        assert_eq!(FormStore::new().progress(), 0.0);
    }

    #[test]
    fn blocked_step_writes_errors() {
        let (mut form, name, _) = two_step_form();
        let mut store = MemoryStore::new();
        let Advance::Blocked(report) = form.advance(&mut store).unwrap() else {
            panic!("empty required field must block");
        };
        assert_eq!(report.error_count(), 1);
        assert_eq!(
            form.current_fields()[0].error.as_deref(),
            Some("This field is required")
        );
        assert_eq!(form.current_step(), 0);
        assert_eq!(form.current_fields()[0].id, name);
    }

    #[test]
    fn submission_records_and_starts_over() {
        let (mut form, name, terms) = two_step_form();
        let mut store = MemoryStore::new();
        let id = form.generate_id(&mut store).unwrap();

        form.answer(&name, "Ada".into()).unwrap();
        assert_eq!(form.advance(&mut store).unwrap(), Advance::NextStep(1));

        assert!(matches!(form.advance(&mut store).unwrap(), Advance::Blocked(_)));
        form.answer(&terms, true.into()).unwrap();
        let Advance::Submitted(response) = form.advance(&mut store).unwrap() else {
            panic!("last step should submit");
        };
        assert_eq!(response.values.get(&name), Some(&FieldValue::from("Ada")));
        assert_eq!(response.values.get(&terms).and_then(FieldValue::as_bool), Some(true));

        assert_eq!(form.current_step(), 0);
        assert_eq!(form.progress(), 0.0);
        assert_eq!(responses::responses(&store, &id).unwrap().len(), 1);
    }

    #[test]
    fn submission_requires_identifier() {
        let mut form = FormStore::new();
        let mut store = MemoryStore::new();
        let err = form.advance(&mut store).unwrap_err();
        assert!(matches!(err, FormError::MissingId));
        assert!(store.is_empty());
    }

    #[test]
    fn retreat_stops_at_first_step() {
        let (mut form, _, _) = two_step_form();
        form.set_current_step(1);
        form.retreat();
        form.retreat();
        assert_eq!(form.current_step(), 0);
    }
}

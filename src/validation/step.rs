use indexmap::IndexMap;

use crate::domain::Field;

use super::{ValidationError, check_format, check_required};

/// Outcome of validating every field of one step, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepReport {
    errors: IndexMap<String, ValidationError>,
}

impl StepReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn get(&self, field_id: &str) -> Option<&ValidationError> {
        self.errors.get(field_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ValidationError)> {
        self.errors.iter().map(|(id, err)| (id.as_str(), err))
    }
}

/// Validate a step against the values stored on its fields.
///
/// Required fields whose label or id contains one of `consent_keywords` only
/// have their required check enforced when `final_submission` is set, so a
/// trailing "I agree to the terms" box does not block earlier steps.
pub fn validate_step(
    fields: &[Field],
    final_submission: bool,
    consent_keywords: &[String],
) -> StepReport {
    let mut errors = IndexMap::new();
    for field in fields {
        let value = field.value();
        let deferred = !final_submission && field.matches_any(consent_keywords);
        let outcome = if deferred {
            check_format(field, value.as_ref())
        } else {
            check_required(field, value.as_ref()).and_then(|_| check_format(field, value.as_ref()))
        };
        if let Err(err) = outcome {
            errors.insert(field.id.clone(), err);
        }
    }
    StepReport { errors }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FieldKind, FieldPatch};

    fn keywords() -> Vec<String> {
        vec!["terms".to_string(), "agree".to_string()]
    }

    fn consent_box() -> Field {
        Field::create(FieldKind::Checkbox).merge(
            &FieldPatch::new()
                .with_label("I agree to the Terms")
                .with_required(true),
        )
    }

    #[test]
    fn consent_is_deferred_until_final_submission() {
        let fields = vec![consent_box()];
        assert!(validate_step(&fields, false, &keywords()).is_valid());
        let report = validate_step(&fields, true, &keywords());
        assert_eq!(report.get(&fields[0].id), Some(&ValidationError::Required));
    }

    #[test]
    fn reports_errors_in_field_order() {
        let name = Field::create(FieldKind::Text).merge(&FieldPatch::new().with_required(true));
        let code = Field::create(FieldKind::Text)
            .merge(&FieldPatch::new().with_pattern("^\\d+$").with_value("abc"));
        let note = Field::create(FieldKind::Textarea);
        let fields = vec![name.clone(), note, code.clone()];

        let report = validate_step(&fields, false, &keywords());
        let ids: Vec<_> = report.iter().map(|(id, _)| id.to_string()).collect();
        assert_eq!(ids, vec![name.id.clone(), code.id.clone()]);
        assert_eq!(report.get(&code.id), Some(&ValidationError::InvalidFormat));
        assert_eq!(report.error_count(), 2);
    }

    #[test]
    fn ordinary_required_checkbox_is_not_deferred() {
        let newsletter = Field::create(FieldKind::Checkbox)
            .merge(&FieldPatch::new().with_label("Subscribe").with_required(true));
        let report = validate_step(std::slice::from_ref(&newsletter), false, &keywords());
        assert_eq!(report.get(&newsletter.id), Some(&ValidationError::Required));
    }
}

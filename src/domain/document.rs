use std::{ops::Deref, sync::Arc};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::field::Field;

/// An ordered group of fields shown together before advancing.
///
/// Steps are immutable once built; editing produces a new `Step`, so any
/// clone held elsewhere (history, a renderer) keeps seeing the old fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Step(Arc<[Field]>);

impl Step {
    pub fn new(fields: Vec<Field>) -> Self {
        Step(fields.into())
    }

    pub fn fields(&self) -> &[Field] {
        &self.0
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.0.iter().position(|field| field.id == id)
    }

    pub fn find(&self, id: &str) -> Option<&Field> {
        self.0.iter().find(|field| field.id == id)
    }

    /// Same allocation, i.e. nothing changed since this handle was taken.
    pub fn ptr_eq(&self, other: &Step) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn to_vec(&self) -> Vec<Field> {
        self.0.to_vec()
    }
}

impl Deref for Step {
    type Target = [Field];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// The full ordered step collection of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Steps(Arc<[Step]>);

impl Steps {
    pub fn single_empty() -> Self {
        Steps::new(vec![Step::default()])
    }

    pub fn new(steps: Vec<Step>) -> Self {
        Steps(steps.into())
    }

    pub fn get(&self, index: usize) -> Option<&Step> {
        self.0.get(index)
    }

    pub fn iter_fields(&self) -> impl Iterator<Item = &Field> {
        self.0.iter().flat_map(|step| step.iter())
    }

    pub fn field_count(&self) -> usize {
        self.0.iter().map(|step| step.len()).sum()
    }

    pub fn find_field(&self, id: &str) -> Option<&Field> {
        self.iter_fields().find(|field| field.id == id)
    }

    pub fn ptr_eq(&self, other: &Steps) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Build a new collection with step `index` replaced; other steps are shared.
    pub(crate) fn with_step(&self, index: usize, step: Step) -> Steps {
        let mut steps = self.0.to_vec();
        if let Some(slot) = steps.get_mut(index) {
            *slot = step;
        }
        Steps::new(steps)
    }

    pub(crate) fn to_vec(&self) -> Vec<Step> {
        self.0.to_vec()
    }

    /// First identifier that appears on more than one field.
    pub fn duplicate_field_id(&self) -> Option<&str> {
        let mut seen = std::collections::HashSet::new();
        self.iter_fields()
            .map(|field| field.id.as_str())
            .find(|id| !seen.insert(*id))
    }
}

impl Default for Steps {
    fn default() -> Self {
        Steps::single_empty()
    }
}

impl Deref for Steps {
    type Target = [Step];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// The on-disk shape of a saved form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedDocument {
    pub steps: Steps,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FieldKind;

    #[test]
    fn with_step_shares_untouched_steps() {
        let first = Step::new(vec![Field::create(FieldKind::Text)]);
        let second = Step::new(vec![Field::create(FieldKind::Date)]);
        let steps = Steps::new(vec![first.clone(), second.clone()]);

        let replaced = steps.with_step(1, Step::default());
        assert!(!replaced.ptr_eq(&steps));
        assert!(replaced[0].ptr_eq(&first));
        assert!(replaced[1].is_empty());
        assert_eq!(steps[1], second);
    }

    #[test]
    fn detects_duplicate_ids_across_steps() {
        let field = Field::create(FieldKind::Text);
        let steps = Steps::new(vec![
            Step::new(vec![field.clone()]),
            Step::new(vec![field.clone()]),
        ]);
        assert_eq!(steps.duplicate_field_id(), Some(field.id.as_str()));
        assert_eq!(Steps::single_empty().duplicate_field_id(), None);
    }
}

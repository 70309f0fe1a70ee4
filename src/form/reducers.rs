use tracing::debug;

use crate::{io::KeyValueStore, validation::StepReport};

use super::{actions::FormCommand, error::FormError, state::FormStore};

/// What a command produced besides the state change itself.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    Done,
    FieldAdded(String),
    Validated(StepReport),
    Published(String),
    Saved(bool),
    /// A storage command reached a reducer that has no adapter.
    Ignored,
}

/// Apply a command that only touches in-memory state.
pub fn apply_command(form: &mut FormStore, command: FormCommand) -> CommandOutcome {
    match command {
        FormCommand::AddField { kind } => return CommandOutcome::FieldAdded(form.add_field(kind)),
        FormCommand::RemoveField { id } => form.remove_field(&id),
        FormCommand::UpdateField { id, patch } => form.update_field(&id, &patch),
        FormCommand::MoveField { from, to } => form.move_field(from, to),
        FormCommand::SelectField { id } => form.select_field(id.as_deref()),
        FormCommand::AddStep => form.add_step(),
        FormCommand::RemoveStep { index } => form.remove_step(index),
        FormCommand::SetCurrentStep { index } => form.set_current_step(index),
        FormCommand::Undo => form.undo(),
        FormCommand::Redo => form.redo(),
        FormCommand::Reset => form.reset(),
        FormCommand::SetTitle { title } => form.set_title(title),
        FormCommand::SetDescription { description } => form.set_description(description),
        FormCommand::ToggleTheme => form.toggle_theme(),
        FormCommand::SetPreviewMode { mode } => form.set_preview_mode(mode),
        FormCommand::ClearValues => form.clear_values(),
        FormCommand::ValidateStep { final_submission } => {
            return CommandOutcome::Validated(form.validate_current_step(final_submission));
        }
        FormCommand::GenerateId | FormCommand::Save | FormCommand::Load { .. } => {
            debug!(?command, "storage command without adapter");
            return CommandOutcome::Ignored;
        }
    }
    CommandOutcome::Done
}

/// Runs commands against a form store backed by a storage adapter.
pub struct FormEngine<'a, S: KeyValueStore + ?Sized> {
    form: &'a mut FormStore,
    storage: &'a mut S,
}

impl<'a, S: KeyValueStore + ?Sized> FormEngine<'a, S> {
    pub fn new(form: &'a mut FormStore, storage: &'a mut S) -> Self {
        Self { form, storage }
    }

    pub fn form(&self) -> &FormStore {
        self.form
    }

    pub fn dispatch(&mut self, command: FormCommand) -> Result<CommandOutcome, FormError> {
        match command {
            FormCommand::GenerateId => {
                let id = self.form.generate_id(&mut *self.storage)?;
                Ok(CommandOutcome::Published(id))
            }
            FormCommand::Save => Ok(CommandOutcome::Saved(self.form.save(&mut *self.storage)?)),
            FormCommand::Load { id } => {
                self.form.load(&*self.storage, &id)?;
                Ok(CommandOutcome::Done)
            }
            other => Ok(apply_command(&mut *self.form, other)),
        }
    }

    /// Dispatch `commands` in order, stopping at the first failure.
    pub fn dispatch_all<I>(&mut self, commands: I) -> Result<Vec<CommandOutcome>, FormError>
    where
        I: IntoIterator<Item = FormCommand>,
    {
        commands
            .into_iter()
            .map(|command| self.dispatch(command))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{domain::FieldKind, io::MemoryStore};

    #[test]
    fn pure_reducer_ignores_storage_commands() {
        let mut form = FormStore::new();
        assert_eq!(apply_command(&mut form, FormCommand::Save), CommandOutcome::Ignored);
        let outcome = apply_command(&mut form, FormCommand::AddField { kind: FieldKind::Text });
        let CommandOutcome::FieldAdded(id) = outcome else {
            panic!("expected a new field id");
        };
        assert_eq!(form.selected_field_id(), Some(id.as_str()));
    }

    #[test]
    fn engine_publishes_and_reloads() {
        let mut storage = MemoryStore::new();
        let mut form = FormStore::new();
        let mut engine = FormEngine::new(&mut form, &mut storage);
        let outcomes = engine
            .dispatch_all([
                FormCommand::AddField { kind: FieldKind::Date },
                FormCommand::SetTitle { title: "Booking".into() },
                FormCommand::GenerateId,
            ])
            .unwrap();
        let CommandOutcome::Published(id) = &outcomes[2] else {
            panic!("expected publish outcome");
        };
        let id = id.clone();

        engine.dispatch(FormCommand::Reset).unwrap();
        assert_eq!(engine.form().steps().field_count(), 0);
        engine.dispatch(FormCommand::Load { id: id.clone() }).unwrap();
        assert_eq!(engine.form().title(), "Booking");
        assert_eq!(engine.form().form_id(), Some(id.as_str()));
        assert_eq!(
            engine.dispatch(FormCommand::Save).unwrap(),
            CommandOutcome::Saved(true)
        );
    }

    #[test]
    fn engine_reports_missing_documents() {
        let mut storage = MemoryStore::new();
        let mut form = FormStore::new();
        let mut engine = FormEngine::new(&mut form, &mut storage);
        let err = engine
            .dispatch(FormCommand::Load { id: "nope".into() })
            .unwrap_err();
        assert!(matches!(err, FormError::NotFound { .. }));
    }
}

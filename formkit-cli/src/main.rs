use std::fmt::Write as FmtWrite;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Args, Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, bail, eyre};
use serde_json::{Value, json};
use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use formkit::{
    Advance, DocumentFormat, ExportDestination, ExportOptions, Field, FieldKind, FieldPatch,
    FieldValue, FileStore, FormOptions, FormStore, KeyValueStore, PreviewMode,
    io::{output, responses},
};

#[derive(Debug, Parser)]
#[command(
    name = "formkit",
    version,
    about = "Build, fill and export multi-step forms"
)]
struct Cli {
    /// Directory holding saved forms, responses and the builder session
    #[arg(
        long = "store",
        env = "FORMKIT_STORE",
        default_value = ".formkit",
        value_name = "DIR",
        global = true
    )]
    store: PathBuf,

    /// Emit compact JSON/TOML rather than pretty formatting
    #[arg(long = "no-pretty", global = true)]
    no_pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Start a new form, discarding the current builder session
    New {
        #[arg(long, value_name = "TEXT")]
        title: Option<String>,
        #[arg(long, value_name = "TEXT")]
        description: Option<String>,
    },
    /// Append a field (text, textarea, select, checkbox, date) to the current step
    Add {
        kind: FieldKind,
        #[arg(long, value_name = "TEXT")]
        label: Option<String>,
        #[arg(long)]
        required: bool,
    },
    /// Change a field's configuration or value
    Update(UpdateArgs),
    /// Remove a field
    Remove { id: String },
    /// Reorder the fields of the current step (zero-based positions)
    Move { from: usize, to: usize },
    /// Add, remove or select steps
    #[command(subcommand)]
    Step(StepCommand),
    /// Change title, description, theme or preview mode
    Settings {
        #[arg(long, value_name = "TEXT")]
        title: Option<String>,
        #[arg(long, value_name = "TEXT")]
        description: Option<String>,
        #[arg(long = "toggle-theme")]
        toggle_theme: bool,
        /// desktop, tablet or mobile
        #[arg(long, value_name = "MODE")]
        preview: Option<PreviewMode>,
    },
    /// Print the builder state
    Show,
    /// Assign an identifier to the form and save it
    Publish,
    /// Save the published form
    Save,
    /// Open a saved form in the builder
    Load { id: String },
    /// List saved forms
    Forms,
    /// Fill out a saved form and record the response
    Fill {
        id: String,
        /// Answer as FIELD=VALUE, where FIELD is a field id or label
        #[arg(short = 'a', long = "answer", value_name = "FIELD=VALUE", action = ArgAction::Append)]
        answers: Vec<String>,
    },
    /// Print or clear the responses of a form
    Responses {
        id: String,
        #[arg(long)]
        clear: bool,
    },
    /// Delete a saved form and its responses
    Delete { id: String },
    /// Export a form document or its responses
    Export {
        /// Saved form to export; defaults to the builder session
        id: Option<String>,
        /// Export the response log instead of the document
        #[arg(long)]
        responses: bool,
        #[arg(long, value_name = "FORMAT")]
        format: Option<DocumentFormat>,
        /// Output destinations ("-" writes to stdout). Accepts multiple values per flag use.
        #[arg(short = 'o', long = "output", value_name = "DEST", num_args = 1.., action = ArgAction::Append)]
        outputs: Vec<String>,
    },
}

#[derive(Debug, Args)]
struct UpdateArgs {
    id: String,
    #[arg(long, value_name = "TEXT")]
    label: Option<String>,
    #[arg(long, value_name = "BOOL")]
    required: Option<bool>,
    #[arg(long = "help-text", value_name = "TEXT")]
    help_text: Option<String>,
    #[arg(long, value_name = "TEXT")]
    placeholder: Option<String>,
    /// New value; checkboxes take true or false
    #[arg(long, value_name = "VALUE")]
    value: Option<String>,
    /// Comma separated select options
    #[arg(long, value_name = "LIST", value_delimiter = ',')]
    options: Vec<String>,
    /// Minimum length; 0 removes the limit
    #[arg(long = "min-length", value_name = "N")]
    min_length: Option<usize>,
    /// Maximum length; 0 removes the limit
    #[arg(long = "max-length", value_name = "N")]
    max_length: Option<usize>,
    /// Regex the value must match; an empty string removes it
    #[arg(long, value_name = "REGEX")]
    pattern: Option<String>,
    /// Raw JSON patch applied before the other flags
    #[arg(long, value_name = "JSON")]
    patch: Option<String>,
}

#[derive(Debug, Subcommand)]
enum StepCommand {
    /// Append an empty step
    Add,
    /// Remove a step (zero-based)
    Remove { index: usize },
    /// Make a step current (zero-based)
    Select { index: usize },
}

fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();
    let cli = Cli::parse();
    let mut store = FileStore::new(&cli.store);
    debug!(store = %cli.store.display(), "opened form store");
    run(cli.command, &mut store, !cli.no_pretty)
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(command: Command, store: &mut FileStore, pretty: bool) -> Result<()> {
    match command {
        Command::New { title, description } => {
            let mut form = FormStore::new();
            if let Some(title) = title {
                form.set_title(title);
            }
            if let Some(description) = description {
                form.set_description(description);
            }
            finish(&form, store)
        }
        Command::Add {
            kind,
            label,
            required,
        } => {
            let mut form = resume(store)?;
            let id = form.add_field(kind);
            let mut patch = FieldPatch::new().with_required(required);
            if let Some(label) = label {
                patch = patch.with_label(label);
            }
            form.update_field(&id, &patch);
            form.persist_session(store)?;
            println!("{id}");
            Ok(())
        }
        Command::Update(args) => {
            let mut form = resume(store)?;
            let field = focus_field(&mut form, &args.id)?;
            let patch = build_patch(&field, &args)?;
            form.update_field(&args.id, &patch);
            finish(&form, store)
        }
        Command::Remove { id } => {
            let mut form = resume(store)?;
            focus_field(&mut form, &id)?;
            form.remove_field(&id);
            finish(&form, store)
        }
        Command::Move { from, to } => {
            let mut form = resume(store)?;
            let len = form.current_fields().len();
            if from >= len || to >= len {
                bail!("positions must be below {len}, the number of fields on this step");
            }
            form.move_field(from, to);
            finish(&form, store)
        }
        Command::Step(step) => {
            let mut form = resume(store)?;
            match step {
                StepCommand::Add => form.add_step(),
                StepCommand::Remove { index } => {
                    if form.steps().len() == 1 {
                        bail!("a form keeps at least one step");
                    }
                    ensure_step(&form, index)?;
                    form.remove_step(index);
                }
                StepCommand::Select { index } => {
                    ensure_step(&form, index)?;
                    form.set_current_step(index);
                }
            }
            finish(&form, store)
        }
        Command::Settings {
            title,
            description,
            toggle_theme,
            preview,
        } => {
            let mut form = resume(store)?;
            if let Some(title) = title {
                form.set_title(title);
            }
            if let Some(description) = description {
                form.set_description(description);
            }
            if toggle_theme {
                form.toggle_theme();
            }
            if let Some(mode) = preview {
                form.set_preview_mode(mode);
            }
            finish(&form, store)
        }
        Command::Show => {
            let form = resume(store)?;
            print_value(&session_view(&form), pretty)
        }
        Command::Publish => {
            let mut form = resume(store)?;
            let id = form.generate_id(store)?;
            form.persist_session(store)?;
            println!("{id}");
            Ok(())
        }
        Command::Save => {
            let form = resume(store)?;
            if !form.save(store)? {
                bail!("form has no identifier yet; run `formkit publish` first");
            }
            finish(&form, store)
        }
        Command::Load { id } => {
            let mut form = resume(store)?;
            form.load(&*store, &id)?;
            finish(&form, store)
        }
        Command::Forms => {
            let forms = responses::list_forms(&*store)?;
            if forms.is_empty() {
                eprintln!("no saved forms in {}", store.root().display());
            }
            for form in forms {
                println!(
                    "{}\t{}\t{} step(s)\t{} field(s)\t{} response(s)",
                    form.id, form.title, form.step_count, form.field_count, form.response_count
                );
            }
            Ok(())
        }
        Command::Fill { id, answers } => fill(store, &id, &answers),
        Command::Responses { id, clear } => {
            if clear {
                responses::clear_responses(store, &id)?;
                println!("cleared responses of {id}");
                return Ok(());
            }
            let log = responses::responses(&*store, &id)?;
            let payload = output::responses_payload(&id, &log).map_err(|err| eyre!("{err:#}"))?;
            print_value(&payload, pretty)
        }
        Command::Delete { id } => {
            if store.get(&formkit::io::store::form_key(&id))?.is_none() {
                bail!("form '{id}' not found");
            }
            responses::delete_form(store, &id)?;
            println!("deleted {id}");
            Ok(())
        }
        Command::Export {
            id,
            responses: export_responses,
            format,
            outputs,
        } => {
            let options = export_options(format, &outputs, pretty)?;
            let payload = if export_responses {
                let form = resume(store)?;
                let Some(id) = id.or_else(|| form.form_id().map(str::to_string)) else {
                    bail!("no form id given and the builder form is not published");
                };
                let log = responses::responses(&*store, &id)?;
                output::responses_payload(&id, &log)
            } else {
                let form = match id {
                    Some(id) => {
                        let mut form = FormStore::new();
                        form.load(&*store, &id)?;
                        form
                    }
                    None => resume(store)?,
                };
                output::document_payload(&form.document())
            }
            .map_err(|err| eyre!("{err:#}"))?;
            output::export(&payload, &options).map_err(|err| eyre!("{err:#}"))
        }
    }
}

fn resume(store: &FileStore) -> Result<FormStore> {
    FormStore::resume(store, FormOptions::default())
        .wrap_err_with(|| format!("failed to resume builder session in {}", store.root().display()))
}

/// Persist the session and print a one-line summary.
fn finish(form: &FormStore, store: &mut FileStore) -> Result<()> {
    form.persist_session(store)?;
    println!(
        "{}: step {} of {}, {} field(s)",
        form.title(),
        form.current_step() + 1,
        form.steps().len(),
        form.current_fields().len()
    );
    Ok(())
}

/// Make the step holding `id` current and return the field.
fn focus_field(form: &mut FormStore, id: &str) -> Result<Field> {
    let Some(field) = form.steps().find_field(id).cloned() else {
        bail!("no field with id '{id}'");
    };
    let index = form
        .steps()
        .iter()
        .position(|step| step.position(id).is_some())
        .ok_or_else(|| eyre!("no field with id '{id}'"))?;
    if index != form.current_step() {
        form.set_current_step(index);
    }
    Ok(field)
}

fn ensure_step(form: &FormStore, index: usize) -> Result<()> {
    if index >= form.steps().len() {
        bail!(
            "step {index} does not exist; the form has {} step(s)",
            form.steps().len()
        );
    }
    Ok(())
}

fn build_patch(field: &Field, args: &UpdateArgs) -> Result<FieldPatch> {
    let mut patch = match &args.patch {
        Some(raw) => serde_json::from_str(raw).wrap_err("--patch must be a JSON object")?,
        None => FieldPatch::new(),
    };
    if let Some(label) = &args.label {
        patch = patch.with_label(label.clone());
    }
    if let Some(required) = args.required {
        patch = patch.with_required(required);
    }
    if let Some(help_text) = &args.help_text {
        patch = patch.with_help_text(help_text.clone());
    }
    if let Some(placeholder) = &args.placeholder {
        patch = patch.with_placeholder(placeholder.clone());
    }
    if let Some(value) = &args.value {
        patch = patch.with_value(parse_value(field, value)?.to_json());
    }
    if !args.options.is_empty() {
        patch = patch.with_options(json!(args.options));
    }
    if let Some(min) = args.min_length {
        patch = patch.with_min_length(min);
    }
    if let Some(max) = args.max_length {
        patch = patch.with_max_length(max);
    }
    if let Some(pattern) = &args.pattern {
        patch = patch.with_pattern(pattern.clone());
    }
    Ok(patch)
}

fn parse_value(field: &Field, raw: &str) -> Result<FieldValue> {
    if field.kind() != FieldKind::Checkbox {
        return Ok(FieldValue::from(raw));
    }
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(FieldValue::Bool(true)),
        "false" | "no" | "off" | "0" => Ok(FieldValue::Bool(false)),
        other => bail!("checkbox '{}' takes true or false, got '{other}'", field.label),
    }
}

fn fill(store: &mut FileStore, id: &str, raw_answers: &[String]) -> Result<()> {
    let mut form = FormStore::new();
    form.load(&*store, id)?;

    let mut answers = Vec::with_capacity(raw_answers.len());
    for raw in raw_answers {
        let Some((key, value)) = raw.split_once('=') else {
            bail!("answer '{raw}' must look like FIELD=VALUE");
        };
        let Some(field) = form
            .steps()
            .iter_fields()
            .find(|field| field.id == key)
            .or_else(|| {
                form.steps()
                    .iter_fields()
                    .find(|field| field.label.eq_ignore_ascii_case(key.trim()))
            })
        else {
            bail!("form '{id}' has no field '{key}'");
        };
        answers.push((field.id.clone(), parse_value(field, value)?));
    }

    loop {
        let step = form.current_step();
        for (field_id, value) in &answers {
            if form.current_fields().iter().any(|field| &field.id == field_id)
                && let Err(err) = form.answer(field_id, value.clone())
            {
                debug!(field_id = %field_id, error = %err, "answer rejected");
            }
        }
        match form.advance(store)? {
            Advance::Blocked(report) => {
                let mut message = String::new();
                for (field_id, err) in report.iter() {
                    let label = form
                        .current_fields()
                        .iter()
                        .find(|field| field.id == field_id)
                        .map_or(field_id, |field| field.label.as_str());
                    let _ = writeln!(message, "  {label}: {err}");
                }
                bail!(
                    "step {} has {} invalid field(s):\n{}",
                    step + 1,
                    report.error_count(),
                    message.trim_end()
                );
            }
            Advance::NextStep(next) => debug!(step = next, "moved to next step"),
            Advance::Submitted(response) => {
                println!("{}", response.id);
                return Ok(());
            }
        }
    }
}

fn export_options(
    format: Option<DocumentFormat>,
    outputs: &[String],
    pretty: bool,
) -> Result<ExportOptions> {
    let mut destinations = Vec::new();
    for raw in outputs {
        if raw.trim().is_empty() {
            bail!("output destination cannot be empty");
        }
        if raw == "-" {
            destinations.push(ExportDestination::Stdout);
        } else {
            destinations.push(ExportDestination::file(raw));
        }
    }
    if destinations.is_empty() {
        destinations.push(ExportDestination::Stdout);
    }

    let inferred = destinations.iter().find_map(|dest| match dest {
        ExportDestination::File(path) => Some(infer_format(path)),
        ExportDestination::Stdout => None,
    });
    let format = match (format, inferred) {
        (Some(format), _) => format,
        (None, Some(inferred)) => inferred?,
        (None, None) => DocumentFormat::default(),
    };
    Ok(ExportOptions::new(format)
        .with_pretty(pretty)
        .with_destinations(destinations))
}

fn infer_format(path: &Path) -> Result<DocumentFormat> {
    DocumentFormat::from_path(path).ok_or_else(|| {
        eyre!(
            "cannot infer format from output file {}; use .json/.yaml/.toml or --format",
            path.display()
        )
    })
}

fn session_view(form: &FormStore) -> Value {
    json!({
        "formId": form.form_id(),
        "title": form.title(),
        "description": form.description(),
        "theme": form.theme(),
        "previewMode": form.preview_mode(),
        "currentStep": form.current_step(),
        "progress": form.progress(),
        "steps": form.steps(),
    })
}

fn print_value(value: &Value, pretty: bool) -> Result<()> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .wrap_err("failed to serialize JSON")?;
    println!("{rendered}");
    Ok(())
}

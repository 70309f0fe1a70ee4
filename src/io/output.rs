use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{Value, json};

use crate::domain::PersistedDocument;

use super::{DocumentFormat, responses::FormResponse};

/// Where an export is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportDestination {
    Stdout,
    File(PathBuf),
}

impl ExportDestination {
    pub fn file(path: impl AsRef<Path>) -> Self {
        ExportDestination::File(path.as_ref().to_path_buf())
    }
}

/// Controls how documents and response logs are serialized on export.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub format: DocumentFormat,
    pub pretty: bool,
    pub destinations: Vec<ExportDestination>,
}

impl ExportOptions {
    pub fn new(format: DocumentFormat) -> Self {
        Self {
            format,
            pretty: true,
            destinations: vec![ExportDestination::Stdout],
        }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn with_destinations(mut self, destinations: Vec<ExportDestination>) -> Self {
        self.destinations = destinations;
        self
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self::new(DocumentFormat::Json)
    }
}

/// Export payload for a saved form.
pub fn document_payload(document: &PersistedDocument) -> Result<Value> {
    serde_json::to_value(document).context("failed to encode form document")
}

/// Export payload for a response log; always an object so every format can hold it.
pub fn responses_payload(form_id: &str, responses: &[FormResponse]) -> Result<Value> {
    let responses = serde_json::to_value(responses).context("failed to encode responses")?;
    Ok(json!({ "formId": form_id, "responses": responses }))
}

/// Serialize `value` and write it to every configured destination.
pub fn export<T: Serialize>(value: &T, options: &ExportOptions) -> Result<()> {
    if options.destinations.is_empty() {
        return Ok(());
    }
    let payload = render(value, options)?;
    for destination in &options.destinations {
        write_payload(destination, &payload).with_context(|| match destination {
            ExportDestination::Stdout => "failed to write to stdout".to_string(),
            ExportDestination::File(path) => {
                format!("failed to write to file {}", path.display())
            }
        })?;
    }
    Ok(())
}

/// Serialize `value` in the configured format without writing it anywhere.
pub fn render<T: Serialize>(value: &T, options: &ExportOptions) -> Result<String> {
    match options.format {
        DocumentFormat::Json => {
            if options.pretty {
                serde_json::to_string_pretty(value).context("failed to serialize JSON")
            } else {
                serde_json::to_string(value).context("failed to serialize JSON")
            }
        }
        #[cfg(feature = "yaml")]
        DocumentFormat::Yaml => serde_yaml::to_string(value).context("failed to serialize YAML"),
        #[cfg(feature = "toml")]
        DocumentFormat::Toml => {
            if options.pretty {
                toml::to_string_pretty(value).context("failed to serialize TOML")
            } else {
                toml::to_string(value).context("failed to serialize TOML")
            }
        }
    }
}

fn write_payload(destination: &ExportDestination, payload: &str) -> Result<()> {
    match destination {
        ExportDestination::Stdout => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(payload.as_bytes())
                .and_then(|_| stdout.write_all(b"\n"))
                .context("failed to write to stdout")?;
            stdout.flush().context("failed to flush stdout")
        }
        ExportDestination::File(path) => {
            let mut file = File::create(path)?;
            file.write_all(payload.as_bytes())?;
            file.write_all(b"\n")?;
            file.flush()?;
            Ok(())
        }
    }
}

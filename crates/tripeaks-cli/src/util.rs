use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use anyhow::Context;
use tripeaks_analysis::config::AuditConfig;

use crate::ingest::SourceTable;

/// Destination of a JSON document: a file, or stdout when no path is given.
pub struct Output {
    writer: Box<dyn Write>,
    label: String,
}

impl Output {
    pub fn save_json<T>(value: &T, path: Option<&Path>) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        Output::open(path)?.write_json(value)
    }

    pub fn open(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Output {
                writer: Box::new(io::stdout().lock()),
                label: "stdout".to_owned(),
            });
        };
        let file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Output {
            writer: Box::new(BufWriter::new(file)),
            label: path.display().to_string(),
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn write_json<T>(&mut self, value: &T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        serde_json::to_writer_pretty(&mut self.writer, value)
            .with_context(|| format!("Failed to write JSON to {}", self.label))?;
        writeln!(self.writer)
            .and_then(|()| self.writer.flush())
            .with_context(|| format!("Failed to finish writing {}", self.label))?;
        Ok(())
    }
}

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;

    let reader = io::BufReader::new(file);
    let value = serde_json::from_reader(reader).with_context(|| {
        format!(
            "Failed to parse {} JSON file: {}",
            file_kind,
            path.display()
        )
    })?;

    Ok(value)
}

/// Read a source table (JSON array of row objects)
pub fn read_source_file<P>(path: P) -> anyhow::Result<SourceTable>
where
    P: AsRef<Path>,
{
    read_json_file("source", path)
}

/// Load and validate the audit configuration
///
/// Falls back to the built-in defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<AuditConfig> {
    let config = match path {
        Some(path) => read_json_file::<AuditConfig, _>("config", path)?,
        None => AuditConfig::default(),
    };
    config.validate().context("Invalid audit configuration")?;
    Ok(config)
}

//! CSV-backed history persistence.
//!
//! One row per calculation, with the header
//! `operation,operand1,operand2,result,timestamp`.

use std::path::{Path, PathBuf};

use abacus_common::ValidationError;
use abacus_ops::OperationRegistry;

use crate::calculation::{Calculation, CalculationRecord};
use crate::memento::CalculatorMemento;

const COLUMNS: [&str; 5] = ["operation", "operand1", "operand2", "result", "timestamp"];

/// Errors from file-backed history persistence.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("history file is missing required column {0:?}")]
    MissingColumn(&'static str),
    #[error("row {row}: {source}")]
    Parse {
        row: usize,
        #[source]
        source: ValidationError,
    },
}

/// Reads and writes history snapshots at a fixed path.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    /// A store for the file at `path`. Nothing is touched until save or load.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where [`quarantine`](Self::quarantine) moves an unreadable file.
    pub fn backup_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".bak");
        PathBuf::from(name)
    }

    /// Move the history file aside to [`backup_path`](Self::backup_path),
    /// replacing any earlier backup, so later saves cannot overwrite it.
    pub fn quarantine(&self) -> Result<PathBuf, StoreError> {
        let backup = self.backup_path();
        std::fs::rename(&self.path, &backup)?;
        tracing::warn!(
            path = %self.path.display(),
            backup = %backup.display(),
            "history file moved aside"
        );
        Ok(backup)
    }

    /// Write the memento's history, replacing any previous file.
    pub fn save(&self, memento: &CalculatorMemento) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        // Header is written by hand so an empty history still yields one.
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&self.path)?;
        writer.write_record(COLUMNS)?;
        for calculation in memento.history() {
            writer.serialize(calculation.to_record())?;
        }
        writer.flush()?;

        tracing::debug!(
            path = %self.path.display(),
            rows = memento.len(),
            "history saved"
        );
        Ok(())
    }

    /// Read the history file into a fresh memento.
    ///
    /// A missing or zero-length file is an empty history.
    pub fn load(&self, registry: &OperationRegistry) -> Result<CalculatorMemento, StoreError> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "no history file, starting empty");
            return Ok(CalculatorMemento::empty());
        }

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&self.path)?;
        let headers = reader.headers()?.clone();
        if headers.is_empty() {
            return Ok(CalculatorMemento::empty());
        }
        for column in COLUMNS {
            if !headers.iter().any(|h| h == column) {
                return Err(StoreError::MissingColumn(column));
            }
        }

        let mut history = Vec::new();
        for (index, row) in reader.deserialize::<CalculationRecord>().enumerate() {
            let record = row?;
            let calculation = Calculation::from_record(registry, &record).map_err(|source| {
                StoreError::Parse {
                    row: index + 1,
                    source,
                }
            })?;
            history.push(calculation);
        }

        tracing::debug!(
            path = %self.path.display(),
            rows = history.len(),
            "history loaded"
        );
        Ok(CalculatorMemento::from_history(history))
    }
}

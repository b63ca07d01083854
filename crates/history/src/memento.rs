use abacus_common::ValidationError;
use abacus_ops::OperationRegistry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::calculation::{Calculation, CalculationRecord};
use crate::timestamp;

/// Immutable snapshot of the full calculation history, used for undo/redo
/// and as the unit of persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculatorMemento {
    history: Vec<Calculation>,
    timestamp: DateTime<Utc>,
}

/// Serialized form of a [`CalculatorMemento`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MementoRecord {
    pub history: Vec<CalculationRecord>,
    pub timestamp: String,
}

impl CalculatorMemento {
    /// Snapshot a history. The memento keeps its own copy.
    pub fn capture(history: &[Calculation]) -> Self {
        Self::from_history(history.to_vec())
    }

    /// Wrap an owned history, stamped with the current time.
    pub fn from_history(history: Vec<Calculation>) -> Self {
        Self {
            history,
            timestamp: timestamp::now(),
        }
    }

    /// A snapshot of an empty history.
    pub fn empty() -> Self {
        Self::from_history(Vec::new())
    }

    /// The captured history, oldest first.
    pub fn history(&self) -> &[Calculation] {
        &self.history
    }

    /// Take the captured history out of the memento.
    pub fn into_history(self) -> Vec<Calculation> {
        self.history
    }

    /// When the snapshot was taken.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Number of calculations in the snapshot.
    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Text form of the snapshot and every calculation in it.
    pub fn to_record(&self) -> MementoRecord {
        MementoRecord {
            history: self.history.iter().map(Calculation::to_record).collect(),
            timestamp: timestamp::format(&self.timestamp),
        }
    }

    pub fn from_record(
        registry: &OperationRegistry,
        record: &MementoRecord,
    ) -> Result<Self, ValidationError> {
        let timestamp = timestamp::parse(&record.timestamp).ok_or_else(|| {
            ValidationError::MalformedRecord(format!(
                "invalid memento timestamp {:?}",
                record.timestamp
            ))
        })?;
        let history = record
            .history
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                Calculation::from_record(registry, entry).map_err(|e| match e {
                    ValidationError::MalformedRecord(msg) => {
                        ValidationError::MalformedRecord(format!("history entry {index}: {msg}"))
                    }
                    other => other,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { history, timestamp })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn sample_history(registry: &OperationRegistry) -> Vec<Calculation> {
        vec![
            Calculation::new(registry, "add", Decimal::from(2), Decimal::from(3)).unwrap(),
            Calculation::new(registry, "divide", Decimal::from(1), Decimal::from(8)).unwrap(),
            Calculation::new(registry, "root", Decimal::from(81), Decimal::from(2)).unwrap(),
        ]
    }

    #[test]
    fn capture_copies_history() {
        let registry = OperationRegistry::with_builtins();
        let mut live = sample_history(&registry);
        let memento = CalculatorMemento::capture(&live);

        live.clear();
        assert_eq!(memento.len(), 3);
        assert_eq!(memento.history()[0].operation(), "Addition");
    }

    #[test]
    fn to_record_serializes_history_and_timestamp() {
        let registry = OperationRegistry::with_builtins();
        let memento = CalculatorMemento::capture(&sample_history(&registry));
        let record = memento.to_record();

        assert_eq!(record.history.len(), 3);
        assert_eq!(record.history[0].operation, "Addition");
        assert!(chrono::DateTime::parse_from_rfc3339(&record.timestamp).is_ok());
    }

    #[test]
    fn record_roundtrip_reproduces_memento() {
        let registry = OperationRegistry::with_builtins();
        let memento = CalculatorMemento::capture(&sample_history(&registry));
        let restored = CalculatorMemento::from_record(&registry, &memento.to_record()).unwrap();
        assert_eq!(restored, memento);
    }

    #[test]
    fn json_roundtrip_reproduces_memento() {
        let registry = OperationRegistry::with_builtins();
        let memento = CalculatorMemento::capture(&sample_history(&registry));
        let json = serde_json::to_string_pretty(&memento.to_record()).unwrap();
        let record: MementoRecord = serde_json::from_str(&json).unwrap();
        let restored = CalculatorMemento::from_record(&registry, &record).unwrap();
        assert_eq!(restored.history(), memento.history());
        assert_eq!(restored.timestamp(), memento.timestamp());
    }

    #[test]
    fn from_record_accepts_naive_timestamp() {
        let registry = OperationRegistry::with_builtins();
        let calc = Calculation::new(&registry, "add", Decimal::from(2), Decimal::from(3)).unwrap();
        let record = MementoRecord {
            history: vec![calc.to_record()],
            timestamp: "2025-01-31T23:59:59.000001".into(),
        };
        let restored = CalculatorMemento::from_record(&registry, &record).unwrap();
        assert_eq!(restored.history()[0].result(), Decimal::from(5));
    }

    #[test]
    fn malformed_timestamp_rejected() {
        let registry = OperationRegistry::with_builtins();
        let record = MementoRecord {
            history: Vec::new(),
            timestamp: "not a time".into(),
        };
        assert!(matches!(
            CalculatorMemento::from_record(&registry, &record),
            Err(ValidationError::MalformedRecord(_))
        ));
    }

    #[test]
    fn malformed_entry_reports_index() {
        let registry = OperationRegistry::with_builtins();
        let mut record = CalculatorMemento::capture(&sample_history(&registry)).to_record();
        record.history[1].operand2 = String::new();
        match CalculatorMemento::from_record(&registry, &record) {
            Err(ValidationError::MalformedRecord(msg)) => {
                assert!(msg.starts_with("history entry 1:"), "{msg}");
            }
            other => panic!("expected MalformedRecord, got {other:?}"),
        }
    }
}

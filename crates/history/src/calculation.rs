use std::fmt;
use std::str::FromStr;

use abacus_common::ValidationError;
use abacus_ops::{OperationError, OperationRegistry};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::timestamp;

/// One executed operation: inputs, result and when it ran.
#[derive(Debug, Clone, PartialEq)]
pub struct Calculation {
    operation: String,
    operand1: Decimal,
    operand2: Decimal,
    result: Decimal,
    timestamp: DateTime<Utc>,
}

/// Primitive-field form of a [`Calculation`], used for serialization and as
/// the CSV row layout.
///
/// Absent fields deserialize as empty strings and are rejected by
/// [`Calculation::from_record`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationRecord {
    #[serde(default)]
    pub operation: String,
    #[serde(default)]
    pub operand1: String,
    #[serde(default)]
    pub operand2: String,
    #[serde(default)]
    pub result: String,
    #[serde(default)]
    pub timestamp: String,
}

impl Calculation {
    /// Resolve `operation` through the registry and execute it on the operands.
    pub fn new(
        registry: &OperationRegistry,
        operation: &str,
        operand1: Decimal,
        operand2: Decimal,
    ) -> Result<Self, OperationError> {
        let op = registry.create(operation)?;
        let result = op.execute(operand1, operand2)?;
        Ok(Self {
            operation: op.name().to_string(),
            operand1,
            operand2,
            result,
            timestamp: timestamp::now(),
        })
    }

    /// Display name of the operation, e.g. "Addition".
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Left operand.
    pub fn operand1(&self) -> Decimal {
        self.operand1
    }

    /// Right operand.
    pub fn operand2(&self) -> Decimal {
        self.operand2
    }

    /// Result at full decimal precision.
    pub fn result(&self) -> Decimal {
        self.result
    }

    /// When the calculation was performed, in UTC.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Text form used by the CSV store and JSON output.
    pub fn to_record(&self) -> CalculationRecord {
        CalculationRecord {
            operation: self.operation.clone(),
            operand1: self.operand1.to_string(),
            operand2: self.operand2.to_string(),
            result: self.result.to_string(),
            timestamp: timestamp::format(&self.timestamp),
        }
    }

    /// Rebuild a calculation from its record.
    ///
    /// The result is recomputed with the registered operation and must equal
    /// the stored one.
    pub fn from_record(
        registry: &OperationRegistry,
        record: &CalculationRecord,
    ) -> Result<Self, ValidationError> {
        let operation = required("operation", &record.operation)?;
        let operand1 = decimal_field("operand1", &record.operand1)?;
        let operand2 = decimal_field("operand2", &record.operand2)?;
        let stored = decimal_field("result", &record.result)?;
        let ts = required("timestamp", &record.timestamp)?;
        let timestamp = timestamp::parse(ts).ok_or_else(|| {
            ValidationError::MalformedRecord(format!("invalid timestamp {ts:?}"))
        })?;

        let op = registry
            .create(operation)
            .map_err(|e| ValidationError::MalformedRecord(e.to_string()))?;
        let computed = op
            .execute(operand1, operand2)
            .map_err(|e| ValidationError::MalformedRecord(e.to_string()))?;
        if computed != stored {
            return Err(ValidationError::MalformedRecord(format!(
                "stored result {stored} does not match recomputed {computed} for {}",
                op.name()
            )));
        }

        Ok(Self {
            operation: op.name().to_string(),
            operand1,
            operand2,
            result: stored,
            timestamp,
        })
    }
}

impl fmt::Display for Calculation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}, {}) = {}",
            self.operation, self.operand1, self.operand2, self.result
        )
    }
}

fn required<'a>(field: &str, value: &'a str) -> Result<&'a str, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::MalformedRecord(format!(
            "missing field {field}"
        )));
    }
    Ok(value)
}

fn decimal_field(field: &str, value: &str) -> Result<Decimal, ValidationError> {
    let value = required(field, value)?;
    Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .map_err(|_| ValidationError::MalformedRecord(format!("{field} is not a number: {value:?}")))
}

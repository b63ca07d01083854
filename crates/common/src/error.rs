/// Bad user input or bad persisted data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid number format: {0:?}")]
    InvalidNumber(String),
    #[error("value exceeds maximum allowed: {value} (limit {limit})")]
    OutOfRange { value: String, limit: String },
    #[error("division by zero is not allowed")]
    DivisionByZero,
    #[error("zero root is undefined")]
    ZeroRoot,
    #[error("cannot take root {degree} of negative number {radicand}")]
    NegativeRoot { radicand: String, degree: String },
    #[error("malformed record: {0}")]
    MalformedRecord(String),
}

/// Errors from configuration validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

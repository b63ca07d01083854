use std::str::FromStr;

use rust_decimal::Decimal;

use crate::error::ValidationError;

/// Parse user input into a decimal operand.
///
/// Accepts plain decimals ("2", "-3.75") and scientific notation ("1e3").
/// When `limit` is set, values whose magnitude exceeds it are rejected.
pub fn parse_operand(input: &str, limit: Option<Decimal>) -> Result<Decimal, ValidationError> {
    let trimmed = input.trim();
    let value = Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| ValidationError::InvalidNumber(trimmed.to_string()))?;

    if let Some(limit) = limit {
        if value.abs() > limit {
            return Err(ValidationError::OutOfRange {
                value: value.to_string(),
                limit: limit.to_string(),
            });
        }
    }
    Ok(value)
}

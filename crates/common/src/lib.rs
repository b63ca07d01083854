//! Shared pieces of the calculator: the validation error taxonomy, the
//! engine configuration and operand parsing.

pub mod config;
pub mod error;
pub mod operand;

pub use config::{CalculatorConfig, Rounding, HISTORY_FILE_NAME};
pub use error::{ConfigError, ValidationError};
pub use operand::parse_operand;
pub use rust_decimal::Decimal;

use std::path::{Path, PathBuf};
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::ConfigError;

/// File name of the persisted history inside `history_dir`.
pub const HISTORY_FILE_NAME: &str = "calculator_history.csv";

/// rust_decimal carries at most 28 fractional digits.
const MAX_PRECISION: u32 = 28;

/// Rounding mode applied when a result is formatted for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rounding {
    /// Banker's rounding.
    #[default]
    HalfEven,
    HalfUp,
    /// Truncate toward zero.
    Down,
    /// Round away from zero.
    Up,
}

impl Rounding {
    fn strategy(self) -> RoundingStrategy {
        match self {
            Self::HalfEven => RoundingStrategy::MidpointNearestEven,
            Self::HalfUp => RoundingStrategy::MidpointAwayFromZero,
            Self::Down => RoundingStrategy::ToZero,
            Self::Up => RoundingStrategy::AwayFromZero,
        }
    }
}

impl FromStr for Rounding {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "halfeven" => Ok(Self::HalfEven),
            "halfup" => Ok(Self::HalfUp),
            "down" => Ok(Self::Down),
            "up" => Ok(Self::Up),
            other => Err(ConfigError::InvalidValue {
                field: "rounding",
                reason: format!("unknown rounding mode {other:?}"),
            }),
        }
    }
}

/// Calculator engine configuration, consumed once at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculatorConfig {
    /// Directory holding the history file.
    pub history_dir: PathBuf,
    /// Oldest calculations are dropped once history grows past this.
    pub max_history_size: usize,
    /// Whether the autosave observer writes history after each operation.
    pub auto_save: bool,
    /// Fractional digits kept when formatting results.
    pub precision: u32,
    pub rounding: Rounding,
    /// Operands with an absolute value above this are rejected. `None` means no limit.
    pub max_input_value: Option<Decimal>,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            history_dir: PathBuf::from("history"),
            max_history_size: 1000,
            auto_save: true,
            precision: 10,
            rounding: Rounding::default(),
            max_input_value: None,
        }
    }
}

impl CalculatorConfig {
    /// Default configuration rooted at the given history directory.
    pub fn with_history_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            history_dir: dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Check value ranges. Called by the engine before it accepts the config.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_history_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_history_size",
                reason: "must be positive".into(),
            });
        }
        if self.precision > MAX_PRECISION {
            return Err(ConfigError::InvalidValue {
                field: "precision",
                reason: format!("must be at most {MAX_PRECISION}"),
            });
        }
        if let Some(limit) = self.max_input_value {
            if limit <= Decimal::ZERO {
                return Err(ConfigError::InvalidValue {
                    field: "max_input_value",
                    reason: "must be positive".into(),
                });
            }
        }
        Ok(())
    }

    /// Full path of the persisted history file.
    pub fn history_file(&self) -> PathBuf {
        self.history_dir.join(HISTORY_FILE_NAME)
    }

    /// Round a result to the configured precision for display.
    pub fn format_result(&self, value: Decimal) -> Decimal {
        value
            .round_dp_with_strategy(self.precision, self.rounding.strategy())
            .normalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = CalculatorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_history_size, 1000);
        assert!(config.auto_save);
    }

    #[test]
    fn history_file_lives_in_history_dir() {
        let config = CalculatorConfig::with_history_dir("/tmp/calc");
        assert_eq!(
            config.history_file(),
            PathBuf::from("/tmp/calc").join(HISTORY_FILE_NAME)
        );
    }

    #[test]
    fn zero_history_size_rejected() {
        let config = CalculatorConfig {
            max_history_size: 0,
            ..CalculatorConfig::default()
        };
        match config.validate() {
            Err(ConfigError::InvalidValue { field, .. }) => assert_eq!(field, "max_history_size"),
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn excessive_precision_rejected() {
        let config = CalculatorConfig {
            precision: 29,
            ..CalculatorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn non_positive_input_limit_rejected() {
        let config = CalculatorConfig {
            max_input_value: Some(Decimal::ZERO),
            ..CalculatorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn format_result_rounds_and_normalizes() {
        let config = CalculatorConfig {
            precision: 3,
            ..CalculatorConfig::default()
        };
        let third = Decimal::ONE / Decimal::from(3);
        assert_eq!(config.format_result(third).to_string(), "0.333");
        assert_eq!(config.format_result(Decimal::new(500, 2)).to_string(), "5");
    }

    #[test]
    fn rounding_modes_differ_at_midpoint() {
        let value = Decimal::new(25, 1); // 2.5
        let mut config = CalculatorConfig {
            precision: 0,
            ..CalculatorConfig::default()
        };
        assert_eq!(config.format_result(value), Decimal::from(2));
        config.rounding = Rounding::HalfUp;
        assert_eq!(config.format_result(value), Decimal::from(3));
        config.rounding = Rounding::Down;
        assert_eq!(config.format_result(value), Decimal::from(2));
        config.rounding = Rounding::Up;
        assert_eq!(config.format_result(value), Decimal::from(3));
    }

    #[test]
    fn rounding_parses_from_str() {
        assert_eq!("half-even".parse::<Rounding>().unwrap(), Rounding::HalfEven);
        assert_eq!("HALF_UP".parse::<Rounding>().unwrap(), Rounding::HalfUp);
        assert_eq!("down".parse::<Rounding>().unwrap(), Rounding::Down);
        assert!("sideways".parse::<Rounding>().is_err());
    }
}

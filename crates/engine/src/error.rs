use abacus_common::{ConfigError, ValidationError};
use abacus_history::StoreError;
use abacus_ops::OperationError;

/// Errors surfaced by calculator commands.
#[derive(Debug, thiserror::Error)]
pub enum CalculatorError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Operation(OperationError),
    #[error("nothing to undo")]
    NothingToUndo,
    #[error("nothing to redo")]
    NothingToRedo,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Input problems raised while executing (e.g. a zero divisor) surface as
/// validation errors; everything else stays an operation error.
impl From<OperationError> for CalculatorError {
    fn from(err: OperationError) -> Self {
        match err {
            OperationError::Invalid(invalid) => Self::Validation(invalid),
            other => Self::Operation(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_operands_become_validation_errors() {
        let err = CalculatorError::from(OperationError::Invalid(ValidationError::DivisionByZero));
        assert!(matches!(
            err,
            CalculatorError::Validation(ValidationError::DivisionByZero)
        ));
    }

    #[test]
    fn unknown_operation_stays_operation_error() {
        let err = CalculatorError::from(OperationError::Unknown("bogus".into()));
        assert!(matches!(err, CalculatorError::Operation(OperationError::Unknown(_))));
        assert_eq!(err.to_string(), "unknown operation: bogus");
    }
}

use thiserror::Error;

/// Failure of a single formula evaluation.
///
/// Every variant is an ordinary outcome: the caller shows it next to the
/// formula and keeps evaluating the others.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("unbalanced parenthesis at token {position}")]
    UnbalancedParens { position: usize },

    #[error("unexpected token '{token}' at position {position}")]
    UnexpectedToken { token: String, position: usize },

    #[error("incomplete expression")]
    IncompleteExpression,

    #[error("unknown identifier '{0}'")]
    UnknownIdentifier(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("invalid operation: {0}")]
    InvalidOperation(String),
}

impl EvalError {
    pub(crate) fn unexpected(token: &str, position: usize) -> Self {
        EvalError::UnexpectedToken {
            token: token.to_string(),
            position,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SheetError {
    #[error("row {0} does not exist")]
    RowOutOfRange(usize),

    #[error("row {0} is locked")]
    RowLocked(usize),

    #[error("row {0} already has a lock request in flight")]
    LockPending(usize),

    #[error("lock task for row {0} did not complete")]
    LockInterrupted(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {var}")]
    InvalidValue { var: &'static str, value: String },
}

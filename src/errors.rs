use serde::Serialize;
use thiserror::Error;

/// Everything that can go wrong while turning panel options and a record
/// into a display value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// A referenced field is not present in the record.
    #[error("undefined field: {0}")]
    MissingField(String),

    /// The expression could not be parsed or evaluated.
    #[error("expression error: {0}")]
    Expression(String),

    /// The option document itself is unusable.
    #[error("invalid options: {0}")]
    Options(String),
}

/// Stable tag for each error variant, used by hosts to pick an error marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MissingField,
    Expression,
    Options,
}

impl EvalError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EvalError::MissingField(_) => ErrorKind::MissingField,
            EvalError::Expression(_) => ErrorKind::Expression,
            EvalError::Options(_) => ErrorKind::Options,
        }
    }
}

pub type Result<T> = std::result::Result<T, EvalError>;

use crate::errors::{ErrorKind, EvalError, Result};
use crate::functions::Registry;
use crate::options::PanelOptions;
use crate::panel::Panel;
use crate::values::to_display;
use serde::Serialize;
use serde_json::Value;

// =========================
// Public API (Evaluation)
// =========================

/// Outcome of one evaluation, as handed to the host for display.
///
/// Serializes as `{"status":"value","value":...}` or
/// `{"status":"error","kind":"missing_field","message":"..."}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EvaluationResult {
    Value { value: Value },
    Error { kind: ErrorKind, message: String },
}

impl EvaluationResult {
    pub fn value(&self) -> Option<&Value> {
        match self {
            EvaluationResult::Value { value } => Some(value),
            EvaluationResult::Error { .. } => None,
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            EvaluationResult::Value { .. } => None,
            EvaluationResult::Error { kind, .. } => Some(*kind),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, EvaluationResult::Error { .. })
    }

    /// Text a panel shows: the value as display text, or the error message.
    pub fn display_text(&self) -> String {
        match self {
            EvaluationResult::Value { value } => to_display(value),
            EvaluationResult::Error { message, .. } => message.clone(),
        }
    }
}

impl From<Result<Value>> for EvaluationResult {
    fn from(result: Result<Value>) -> Self {
        match result {
            Ok(value) => EvaluationResult::Value { value },
            Err(err) => err.into(),
        }
    }
}

impl From<EvalError> for EvaluationResult {
    fn from(err: EvalError) -> Self {
        EvaluationResult::Error { kind: err.kind(), message: err.to_string() }
    }
}

/// Evaluate panel options against one record with the built-in functions.
///
/// Never fails: missing fields and bad expressions come back as
/// [`EvaluationResult::Error`].
pub fn evaluate(options: &PanelOptions, record: &Value) -> EvaluationResult {
    Panel::new(options).evaluate(record)
}

/// Same as [`evaluate`] with a caller-supplied function registry.
pub fn evaluate_with(options: &PanelOptions, record: &Value, registry: &Registry) -> EvaluationResult {
    Panel::with_registry(options, registry.clone()).evaluate(record)
}

/// Like [`evaluate`] but keeps the typed error.
pub fn try_evaluate(options: &PanelOptions, record: &Value) -> Result<Value> {
    Panel::new(options).try_evaluate(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn serializes_for_the_host() {
        let ok = EvaluationResult::from(Ok::<_, EvalError>(json!(5)));
        assert_eq!(serde_json::to_value(&ok).unwrap(), json!({"status": "value", "value": 5}));

        let err: EvaluationResult = EvalError::MissingField("b".into()).into();
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            json!({"status": "error", "kind": "missing_field", "message": "undefined field: b"})
        );
        assert_eq!(err.display_text(), "undefined field: b");
    }

    #[test]
    fn field_passthrough() {
        let record = json!({"title": "Q3", "total": 12.0});
        assert_eq!(evaluate(&PanelOptions::with_field("total"), &record).value(), Some(&json!(12.0)));
        assert_eq!(
            try_evaluate(&PanelOptions::with_field("missing"), &record),
            Err(EvalError::MissingField("missing".into()))
        );
    }

    #[test]
    fn computed_sum() {
        let opts = PanelOptions::with_expression("a,b", "a+b");
        assert_eq!(try_evaluate(&opts, &json!({"a": 2, "b": 3})), Ok(json!(5)));
        assert!(evaluate(&opts, &json!({"a": 2})).is_error());
    }
}

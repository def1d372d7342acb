use serde_json::{Number, Value};

use crate::errors::{EvalError, Result};

/// Largest integer an `f64` holds exactly.
const MAX_SAFE_INT: f64 = 9_007_199_254_740_991.0;

pub fn truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Numeric view of a value: numbers as-is, numeric strings parsed.
pub fn as_number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

/// Wrap an `f64` result, folding integral values back to integers.
pub fn number(f: f64) -> Result<Value> {
    if !f.is_finite() {
        return Err(EvalError::Expression(format!("result is not a finite number ({f})")));
    }
    if f.fract() == 0.0 && f.abs() <= MAX_SAFE_INT {
        return Ok(Value::from(f as i64));
    }
    Number::from_f64(f)
        .map(Value::Number)
        .ok_or_else(|| EvalError::Expression(format!("cannot represent {f}")))
}

/// Fold integral floats inside a result back to integers.
pub fn normalize(v: Value) -> Value {
    let float = match &v {
        Value::Number(n) if n.is_f64() => n.as_f64(),
        _ => None,
    };
    match float {
        Some(f) => number(f).unwrap_or(v),
        None => v,
    }
}

/// Text form used for string concatenation.
pub fn to_display(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(_) => normalize(v.clone()).to_string(),
        other => other.to_string(),
    }
}

pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

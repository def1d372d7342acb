use std::collections::HashMap;

use serde_json::Value;

use crate::errors::{EvalError, Result};
use crate::record;

/// Variable bindings for one evaluation: field name -> value taken from the
/// record. Built fresh on every call, never shared.
#[derive(Clone, Debug, Default)]
pub struct Context {
    bindings: HashMap<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind every listed field from `record`, failing on the first one that
    /// is absent.
    pub fn bind_fields(fields: &[String], record: &Value) -> Result<Self> {
        let mut ctx = Self::new();
        for field in fields {
            let value = record::resolve(record, field)
                .ok_or_else(|| EvalError::MissingField(field.clone()))?;
            ctx.bind(field.clone(), value.clone());
        }
        Ok(ctx)
    }

    pub fn bind(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

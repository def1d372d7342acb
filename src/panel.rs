use serde::Serialize;
use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::context::Context;
use crate::engine::EvaluationResult;
use crate::errors::{EvalError, Result};
use crate::expression::{self, ENode};
use crate::functions::Registry;
use crate::options::{PanelMode, PanelOptions};
use crate::record;
use crate::values::normalize;

/// What the panel asks of the host's data layer on each refresh.
///
/// `filter` is the option value verbatim; the host applies it and hands back
/// only matching records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataRequest {
    pub fields: Vec<String>,
    pub filter: Option<Value>,
}

/// A configured panel instance.
///
/// The mode is resolved and the expression parsed once at construction;
/// [`Panel::evaluate`] is then a pure function of the record.
#[derive(Clone)]
pub struct Panel {
    mode: PanelMode,
    program: Option<std::result::Result<ENode, String>>,
    filter: Option<Value>,
    registry: Registry,
}

impl Panel {
    pub fn new(options: &PanelOptions) -> Self {
        Self::with_registry(options, Registry::with_builtins())
    }

    pub fn with_registry(options: &PanelOptions, registry: Registry) -> Self {
        let mode = options.mode();
        let program = match &mode {
            PanelMode::Computed { fields, expression } => Some(compile(fields, expression)),
            _ => None,
        };
        debug!(?mode, "panel configured");
        Self {
            mode,
            program,
            filter: options.filter.clone(),
            registry,
        }
    }

    pub fn mode(&self) -> &PanelMode {
        &self.mode
    }

    /// Configuration-time check of the expression: it must parse and may
    /// only reference listed fields.
    pub fn validate(&self) -> Result<()> {
        match &self.program {
            Some(Err(msg)) => Err(EvalError::Expression(msg.clone())),
            _ => Ok(()),
        }
    }

    pub fn data_request(&self) -> DataRequest {
        let fields = match &self.mode {
            PanelMode::Field { field } => vec![field.clone()],
            PanelMode::Computed { fields, .. } => fields.clone(),
            PanelMode::Static { .. } | PanelMode::Unconfigured => Vec::new(),
        };
        DataRequest { fields, filter: self.filter.clone() }
    }

    /// Evaluate against one record, folding failures into an error marker.
    pub fn evaluate(&self, record: &Value) -> EvaluationResult {
        let result = self.try_evaluate(record);
        if let Err(err) = &result {
            warn!(%err, "panel evaluation failed");
        }
        result.into()
    }

    pub fn try_evaluate(&self, record: &Value) -> Result<Value> {
        match &self.mode {
            PanelMode::Static { text } => Ok(Value::String(text.clone())),
            PanelMode::Field { field } => record::resolve(record, field)
                .cloned()
                .ok_or_else(|| EvalError::MissingField(field.clone())),
            PanelMode::Computed { fields, .. } => {
                let ctx = Context::bind_fields(fields, record)?;
                trace!(bound = ctx.len(), "fields bound");
                let ast = match &self.program {
                    Some(Ok(ast)) => ast,
                    Some(Err(msg)) => return Err(EvalError::Expression(msg.clone())),
                    None => return Err(EvalError::Expression("no expression".into())),
                };
                let value = expression::eval_ast(ast, &ctx, &self.registry)?;
                debug!(%value, "expression evaluated");
                Ok(normalize(value))
            }
            PanelMode::Unconfigured => Ok(Value::Null),
        }
    }

    /// Evaluate every record the host returned, in order.
    pub fn evaluate_all(&self, records: &[Value]) -> Vec<EvaluationResult> {
        records.iter().map(|r| self.evaluate(r)).collect()
    }
}

fn compile(fields: &[String], expression: &str) -> std::result::Result<ENode, String> {
    let ast = expression::parse_expr(expression).map_err(|e| e.to_string())?;
    if let Some(unknown) = ast.referenced_fields().into_iter().find(|f| !fields.contains(f)) {
        return Err(format!("unknown field `{unknown}` (not listed in fields)"));
    }
    Ok(ast)
}

use crate::errors::{EvalError, Result};
use crate::values::type_name;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Option document as the host stores it for one panel instance.
///
/// Every key is optional; which ones are present decides the display mode
/// (see [`PanelMode`]). Unknown keys are ignored so hosts can keep their own
/// bookkeeping next to ours.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PanelOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Query predicate for the host's data layer. Never interpreted here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Value>,
}

impl PanelOptions {
    /// Read options from a raw JSON document. Only objects are accepted.
    pub fn from_value(value: &Value) -> Result<Self> {
        if !value.is_object() {
            return Err(EvalError::Options(format!(
                "expected an object, got {}",
                type_name(value)
            )));
        }
        serde_json::from_value(value.clone()).map_err(|e| EvalError::Options(e.to_string()))
    }

    pub fn from_json(json_str: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(json_str).map_err(|e| EvalError::Options(e.to_string()))?;
        Self::from_value(&value)
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        Self { text: Some(text.into()), ..Self::default() }
    }

    pub fn with_field(field: impl Into<String>) -> Self {
        Self { field: Some(field.into()), ..Self::default() }
    }

    pub fn with_expression(fields: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            fields: Some(fields.into()),
            expression: Some(expression.into()),
            ..Self::default()
        }
    }

    pub fn mode(&self) -> PanelMode {
        PanelMode::from(self)
    }
}

/// The display mode a panel runs in, decided once from its options.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelMode {
    /// Show `text` as-is.
    Static { text: String },
    /// Show one record field unchanged.
    Field { field: String },
    /// Bind `fields` from the record and evaluate `expression` over them.
    Computed { fields: Vec<String>, expression: String },
    /// Nothing usable was configured; renders as null.
    Unconfigured,
}

impl From<&PanelOptions> for PanelMode {
    fn from(opts: &PanelOptions) -> Self {
        let field = present(&opts.field).map(str::to_string);
        let fields = present(&opts.fields)
            .map(parse_field_list)
            .filter(|list| !list.is_empty());
        let expression = present(&opts.expression).map(str::to_string);

        match (fields, field, expression) {
            (Some(fields), _, Some(expression)) => PanelMode::Computed { fields, expression },
            (None, Some(field), Some(expression)) => PanelMode::Computed {
                fields: vec![field.trim().to_string()],
                expression,
            },
            (_, Some(field), None) => PanelMode::Field { field },
            (Some(mut fields), None, None) => {
                if fields.len() == 1 {
                    PanelMode::Field { field: fields.remove(0) }
                } else {
                    PanelMode::Unconfigured
                }
            }
            (None, None, expression) => match (present(&opts.text), expression) {
                (Some(text), _) => PanelMode::Static { text: text.to_string() },
                (None, Some(expression)) => PanelMode::Computed { fields: Vec::new(), expression },
                // blank values lose only against other options; alone they are used verbatim
                (None, None) => match (&opts.field, &opts.text) {
                    (Some(field), _) => PanelMode::Field { field: field.clone() },
                    (None, Some(text)) => PanelMode::Static { text: text.clone() },
                    (None, None) => PanelMode::Unconfigured,
                },
            },
        }
    }
}

/// Split a `fields` option into field names.
///
/// Accepts `,`, `;` and whitespace as separators, drops empty entries and
/// keeps the first occurrence of duplicates.
pub fn parse_field_list(raw: &str) -> Vec<String> {
    raw.split(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unique()
        .map(str::to_string)
        .collect()
}

fn present(opt: &Option<String>) -> Option<&str> {
    opt.as_deref().filter(|s| !s.trim().is_empty())
}

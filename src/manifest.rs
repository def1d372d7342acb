//! Registration manifest handed to the host.
//!
//! Everything here is descriptive: the host reads it to list the panel and
//! build its settings form. Option names starting with `$t:` are translation
//! keys the host resolves.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelManifest {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub description: String,
    pub component: String,
    pub options: Vec<OptionSchema>,
    pub min_width: u32,
    pub min_height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionSchema {
    pub field: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: OptionType,
    pub meta: OptionMeta,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    String,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionMeta {
    pub interface: Interface,
    pub width: Width,
}

/// Editor widget the host uses for an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Interface {
    Input,
    SystemField,
    SystemFilter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Width {
    Full,
    Half,
}

impl OptionSchema {
    pub fn new(field: &str, name: &str, kind: OptionType, interface: Interface, width: Width) -> Self {
        Self {
            field: field.to_string(),
            name: name.to_string(),
            kind,
            meta: OptionMeta { interface, width },
        }
    }
}

impl PanelManifest {
    /// The calculated-value panel as registered with the host.
    ///
    /// Follows the multi-field variant of the panel: `field` and `filter` use
    /// the host's field and filter pickers. The single-field variant declared
    /// both as plain `input` options at full width.
    pub fn calculated() -> Self {
        Self {
            id: "panel-calculated".into(),
            name: "Calculated Panel".into(),
            icon: "box".into(),
            description: "This is a flexible panel that can display calculated values.".into(),
            component: "calculated-panel".into(),
            options: vec![
                OptionSchema::new("field", "$t:panels.metric.field", OptionType::String, Interface::SystemField, Width::Half),
                OptionSchema::new("fields", "Fields", OptionType::String, Interface::Input, Width::Half),
                OptionSchema::new("expression", "Expression", OptionType::String, Interface::Input, Width::Full),
                OptionSchema::new("text", "Text", OptionType::String, Interface::Input, Width::Full),
                OptionSchema::new("filter", "$t:filter", OptionType::Json, Interface::SystemFilter, Width::Full),
            ],
            min_width: 12,
            min_height: 8,
        }
    }

    pub fn option(&self, field: &str) -> Option<&OptionSchema> {
        self.options.iter().find(|o| o.field == field)
    }
}

impl Default for PanelManifest {
    fn default() -> Self {
        Self::calculated()
    }
}

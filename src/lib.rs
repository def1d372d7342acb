//! Calculated-value dashboard panel.
//!
//! The host stores a [`PanelOptions`] document per panel, fetches the
//! records it needs (applying the panel's filter itself) and calls
//! [`evaluate`] or [`Panel::evaluate`] on every refresh. The result is either
//! a display value or a tagged error marker; evaluation never panics.

pub mod errors;
pub mod context;
pub mod engine;
pub mod functions;  // plugin model
pub mod manifest;
pub mod options;
pub mod panel;
pub mod record;
pub mod expression;
mod parser;
mod comparison;
mod values;

pub use engine::{evaluate, evaluate_with, try_evaluate, EvaluationResult};
pub use errors::{ErrorKind, EvalError, Result};
pub use functions::{Function, Registry};
pub use manifest::PanelManifest;
pub use options::{PanelMode, PanelOptions};
pub use panel::{DataRequest, Panel};

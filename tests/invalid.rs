use calculated_panel as cp;
use cp::{ErrorKind, EvalError, PanelOptions};
use serde_json::json;

// Malformed expressions come back as tagged results; nothing panics.
#[test]
fn test_unparsable_expressions() {
    let record = json!({"a": 1, "b": 2});
    for expr in ["a +", "(a + b", "a b", "a = b", "'open", "a ? b", "#"] {
        let out = cp::evaluate(&PanelOptions::with_expression("a,b", expr), &record);
        assert_eq!(out.error_kind(), Some(ErrorKind::Expression), "expression {expr:?}");
    }
}

#[test]
fn test_runtime_failures() {
    let record = json!({"a": 1, "zero": 0, "name": "x", "list": [1]});
    let fields = "a, zero, name, list";
    let cases = [
        ("a / zero", "expression error: division by zero"),
        ("name - 1", "expression error: cannot apply `-` to string"),
        ("list * 2", "expression error: cannot apply `*` to array"),
        ("missing + 1", "expression error: unknown field `missing` (not listed in fields)"),
        ("sqrt(a)", "expression error: unknown function `sqrt`"),
        ("10 ^ 400", "expression error: result is not a finite number (inf)"),
    ];
    for (expr, message) in cases {
        let out = cp::try_evaluate(&PanelOptions::with_expression(fields, expr), &record);
        assert_eq!(out.unwrap_err().to_string(), message, "expression {expr:?}");
    }
}

#[test]
fn test_non_object_records() {
    let out = cp::try_evaluate(&PanelOptions::with_field("a"), &json!([1, 2]));
    assert_eq!(out, Err(EvalError::MissingField("a".into())));
    let out = cp::try_evaluate(&PanelOptions::with_field("a"), &json!(null));
    assert_eq!(out, Err(EvalError::MissingField("a".into())));
}

#[test]
fn test_rejected_option_documents() {
    assert!(matches!(PanelOptions::from_json("[]"), Err(EvalError::Options(_))));
    assert!(matches!(PanelOptions::from_json(r#"{"text": 5}"#), Err(EvalError::Options(_))));
    assert!(matches!(PanelOptions::from_json("{"), Err(EvalError::Options(_))));
}

// Long operator chains are rejected by depth, not by exhausting the stack.
#[test]
fn test_long_operator_chains() {
    let record = json!({"a": 1});
    for op in ["+", "*", "^", "&&", "||"] {
        let expr = vec!["a"; 100_000].join(op);
        let out = cp::try_evaluate(&PanelOptions::with_expression("a", expr), &record);
        let msg = out.unwrap_err().to_string();
        assert!(msg.contains("expression nested too deeply"), "operator {op}: {msg}");
    }
    let expr = vec!["a"; 5_000].join("^");
    let out = cp::evaluate(&PanelOptions::with_expression("a", expr), &record);
    assert_eq!(out.error_kind(), Some(ErrorKind::Expression));

    // realistic chains still evaluate
    let expr = vec!["a"; 200].join(" + ");
    assert_eq!(cp::try_evaluate(&PanelOptions::with_expression("a", expr), &record), Ok(json!(200)));
}

use calculated_panel as cp;
use cp::{EvalError, PanelOptions};
use serde_json::json;

#[test]
fn test_static_text_ignores_record() {
    let opts = PanelOptions::with_text("Quarterly revenue");
    let out = cp::evaluate(&opts, &json!({"text": "not this"}));
    assert_eq!(out.value(), Some(&json!("Quarterly revenue")));
}

#[test]
fn test_field_passthrough_keeps_value_as_is() {
    let record = json!({"tags": ["a", "b"], "count": 7});
    assert_eq!(cp::try_evaluate(&PanelOptions::with_field("count"), &record), Ok(json!(7)));
    assert_eq!(cp::try_evaluate(&PanelOptions::with_field("tags"), &record), Ok(json!(["a", "b"])));
}

#[test]
fn test_field_missing_is_marked() {
    let out = cp::try_evaluate(&PanelOptions::with_field("count"), &json!({"total": 1}));
    assert_eq!(out, Err(EvalError::MissingField("count".into())));
}

#[test]
fn test_sum_of_two_fields() {
    let opts = PanelOptions::with_expression("a,b", "a+b");
    assert_eq!(cp::try_evaluate(&opts, &json!({"a": 2, "b": 3})), Ok(json!(5)));
}

#[test]
fn test_sum_with_missing_field() {
    let opts = PanelOptions::with_expression("a,b", "a+b");
    let out = cp::evaluate(&opts, &json!({"a": 2}));
    assert_eq!(out.error_kind(), Some(cp::ErrorKind::MissingField));
    assert_eq!(out.display_text(), "undefined field: b");
}

#[test]
fn test_host_options_document() {
    let opts = PanelOptions::from_json(
        r#"{
            "fields": "revenue; cost",
            "expression": "round((revenue - cost) / revenue * 100, 1) + '%'",
            "filter": {"year": {"_eq": 2024}}
        }"#,
    )
    .unwrap();
    let out = cp::evaluate(&opts, &json!({"revenue": 1200, "cost": 900}));
    assert_eq!(out.value(), Some(&json!("25%")));
}

#[test]
fn test_nested_field_references() {
    let opts = PanelOptions::with_expression("order.qty, order.unit_price", "order.qty * order.unit_price");
    let record = json!({"order": {"qty": 4, "unit_price": "2.25"}});
    assert_eq!(cp::try_evaluate(&opts, &record), Ok(json!(9)));
}

#[test]
fn test_manifest_registration() {
    let manifest = cp::PanelManifest::calculated();
    assert_eq!(manifest.id, "panel-calculated");
    assert_eq!(manifest.name, "Calculated Panel");
    assert_eq!((manifest.min_width, manifest.min_height), (12, 8));
}

#[test]
fn test_blank_text_and_padded_field_names() {
    let record = json!({" x": 1, "": "empty key"});
    assert_eq!(cp::try_evaluate(&PanelOptions::with_text("   "), &record), Ok(json!("   ")));
    assert_eq!(cp::try_evaluate(&PanelOptions::with_text(""), &record), Ok(json!("")));
    assert_eq!(cp::try_evaluate(&PanelOptions::with_field(" x"), &record), Ok(json!(1)));
    assert_eq!(cp::try_evaluate(&PanelOptions::with_field(""), &record), Ok(json!("empty key")));
}

use calculated_panel as cp;
use cp::{Function, PanelOptions, Registry};
use serde_json::{json, Value};
use std::ops::RangeInclusive;

fn run(fields: &str, expr: &str, record: Value) -> Value {
    cp::try_evaluate(&PanelOptions::with_expression(fields, expr), &record).unwrap()
}

#[test]
fn test_builtin_aggregates() {
    let record = json!({"scores": [3, 9, 6]});
    assert_eq!(run("scores", "sum(scores)", record.clone()), json!(18));
    assert_eq!(run("scores", "avg(scores)", record.clone()), json!(6));
    assert_eq!(run("scores", "max(scores, 12)", record.clone()), json!(12));
    assert_eq!(run("scores", "len(scores)", record), json!(3));
}

#[test]
fn test_builtin_text() {
    let record = json!({"first": "ada", "last": null});
    assert_eq!(run("first,last", "concat(upper(first), ' ', coalesce(last, '?'))", record), json!("ADA ?"));
}

struct Percent;
impl Function for Percent {
    fn name(&self) -> &'static str { "percent" }
    fn arity(&self) -> RangeInclusive<usize> { 2..=2 }
    fn call(&self, args: &[Value]) -> cp::Result<Value> {
        let part = args[0].as_f64().unwrap_or(0.0);
        let whole = args[1].as_f64().unwrap_or(1.0);
        Ok(json!(format!("{:.0}%", part / whole * 100.0)))
    }
}

#[test]
fn test_custom_function() {
    let mut registry = Registry::with_builtins();
    registry.register(Percent);
    let opts = PanelOptions::with_expression("done,total", "percent(done, total)");
    let out = cp::evaluate_with(&opts, &json!({"done": 3, "total": 4}), &registry);
    assert_eq!(out.value(), Some(&json!("75%")));

    // the default registry does not know it
    let out = cp::evaluate(&opts, &json!({"done": 3, "total": 4}));
    assert!(out.is_error());
}

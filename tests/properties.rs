use calculated_panel as cp;
use cp::PanelOptions;
use proptest::prelude::*;
use serde_json::{json, Map, Value};

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "[a-z ]{0,12}".prop_map(Value::from),
    ]
}

fn record() -> impl Strategy<Value = Value> {
    prop::collection::btree_map("[a-z]{1,6}", scalar(), 0..6)
        .prop_map(|m| Value::Object(m.into_iter().collect::<Map<_, _>>()))
}

proptest! {
    #[test]
    fn static_text_is_independent_of_record(text in "\\s{0,3}.{0,20}", r in record()) {
        let out = cp::try_evaluate(&PanelOptions::with_text(text.clone()), &r);
        prop_assert_eq!(out, Ok(Value::String(text)));
    }

    #[test]
    fn field_passthrough_returns_record_value(r in record(), key in "[ a-z.]{0,8}", v in scalar()) {
        let mut r = r;
        r.as_object_mut().unwrap().insert(key.clone(), v.clone());
        prop_assert_eq!(cp::try_evaluate(&PanelOptions::with_field(key), &r), Ok(v));
    }

    #[test]
    fn integer_sums_match(a in -1_000_000i64..1_000_000, b in -1_000_000i64..1_000_000) {
        let opts = PanelOptions::with_expression("a,b", "a+b");
        prop_assert_eq!(cp::try_evaluate(&opts, &json!({"a": a, "b": b})), Ok(json!(a + b)));
    }

    #[test]
    fn evaluation_is_idempotent(expr in "[ab0-9+*/()<>=!&| -]{1,16}", a in scalar(), b in scalar()) {
        let opts = PanelOptions::with_expression("a,b", expr);
        let r = json!({"a": a, "b": b});
        prop_assert_eq!(cp::evaluate(&opts, &r), cp::evaluate(&opts, &r));
    }
}

use std::cmp::Ordering;

use serde_json::Value;

/// Order two scalars for the comparison operators.
///
/// Numbers compare numerically, strings lexicographically (case-sensitive),
/// and a number against a numeric string compares numerically. `None` means
/// the pair has no ordering (mixed kinds, arrays, objects).
pub fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::String(sa), Value::String(sb)) => Some(sa.cmp(sb)),
        (Value::Number(na), Value::Number(nb)) => match (na.as_i64(), nb.as_i64()) {
            (Some(ia), Some(ib)) => Some(ia.cmp(&ib)),
            _ => cmp_f64(na.as_f64()?, nb.as_f64()?),
        },
        (Value::Bool(ba), Value::Bool(bb)) => Some(ba.cmp(bb)),
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        (Value::Number(na), Value::String(sb)) => cmp_f64(na.as_f64()?, sb.trim().parse().ok()?),
        (Value::String(sa), Value::Number(nb)) => cmp_f64(sa.trim().parse().ok()?, nb.as_f64()?),
        _ => None,
    }
}

/// Equality used by `==` / `!=`: ordered pairs that compare equal, or
/// structurally equal arrays and objects.
pub fn loosely_equal(a: &Value, b: &Value) -> bool {
    match compare(a, b) {
        Some(ord) => ord == Ordering::Equal,
        None => a == b,
    }
}

fn cmp_f64(da: f64, db: f64) -> Option<Ordering> {
    if (da - db).abs() < f64::EPSILON {
        Some(Ordering::Equal)
    } else {
        da.partial_cmp(&db)
    }
}

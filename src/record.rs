use serde_json::Value;

/// Look up a field reference in a record.
///
/// A reference is either a literal key of the record or a dotted path
/// (`author.name`, `tags.0`) walking nested objects and arrays. The literal
/// key is tried first so keys that contain dots still resolve.
pub fn resolve<'a>(record: &'a Value, reference: &str) -> Option<&'a Value> {
    if let Value::Object(map) = record {
        if let Some(v) = map.get(reference) {
            return Some(v);
        }
    }
    if !reference.contains('.') {
        return None;
    }
    let mut current = record;
    for segment in reference.split('.') {
        current = step(current, segment)?;
    }
    Some(current)
}

fn step<'a>(value: &'a Value, segment: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(segment),
        Value::Array(arr) => segment.parse::<usize>().ok().and_then(|idx| arr.get(idx)),
        _ => None,
    }
}

use serde_json::Map;
use serde_json::Value;

/// Apply a JSON merge patch to `target`.
/// Objects merge key by key, `null` removes a key, anything else replaces.
pub fn merge_patch(target: &mut Value, patch: &Value) {
    let patch_map = match patch {
        Value::Object(map) => map,
        _ => {
            *target = patch.clone();
            return;
        }
    };

    if !target.is_object() {
        *target = Value::Object(Map::new());
    }

    if let Value::Object(target_map) = target {
        for (key, value) in patch_map {
            if value.is_null() {
                target_map.remove(key);
            } else {
                merge_patch(
                    target_map.entry(key.clone()).or_insert(Value::Null),
                    value,
                );
            }
        }
    }
}

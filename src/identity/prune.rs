//! Recursive removal of null and empty entries from JSON objects.

// self
use crate::_prelude::*;

/// Removes every entry whose value is null, an empty string, an empty array, or an empty
/// object.
///
/// Nested objects are pruned first, so an object that only held blank entries disappears
/// from its parent as well. Arrays are kept as-is unless empty. `false` and `0` survive.
pub fn prune(mut map: JsonMap<String, JsonValue>) -> JsonMap<String, JsonValue> {
	map.retain(|_, value| {
		if let JsonValue::Object(nested) = value {
			*nested = prune(std::mem::take(nested));
		}

		!is_blank(value)
	});

	map
}

/// Borrowing variant of [`prune`] that leaves `map` untouched.
pub fn pruned(map: &JsonMap<String, JsonValue>) -> JsonMap<String, JsonValue> {
	prune(map.clone())
}

/// Applies [`prune`] to any JSON value; non-object values are returned unchanged.
pub fn prune_value(value: JsonValue) -> JsonValue {
	match value {
		JsonValue::Object(map) => JsonValue::Object(prune(map)),
		other => other,
	}
}

/// Returns `true` for null and for empty strings, arrays, and objects.
pub fn is_blank(value: &JsonValue) -> bool {
	match value {
		JsonValue::Null => true,
		JsonValue::String(text) => text.is_empty(),
		JsonValue::Array(items) => items.is_empty(),
		JsonValue::Object(map) => map.is_empty(),
		JsonValue::Bool(_) | JsonValue::Number(_) => false,
	}
}

//! Identity normalization: turns the provider's raw profile into the generic
//! `uid` / `info` / `credentials` / `extra` record consumed by host applications.
//!
//! Every projection is a pure function over an owned or cloned [`RawProfile`], so callers can
//! share a cached profile between projections without observing mutation.

pub mod prune;
pub mod record;

pub use prune::*;
pub use record::*;

// self
use crate::_prelude::*;

/// Raw JSON object returned by the provider's token-introspection endpoint.
pub type RawProfile = JsonMap<String, JsonValue>;

/// Returns a clone of `profile[key]`, or `None` when the key is absent or null.
pub fn compute_uid(profile: &RawProfile, key: &str) -> Option<JsonValue> {
	profile.get(key).filter(|value| !value.is_null()).cloned()
}

/// Projects `(destination, source)` renames out of `profile` and prunes the result.
///
/// Sources missing from the profile simply do not appear in the output.
pub fn compute_info(profile: &RawProfile, fields: &[(&str, &str)]) -> JsonMap<String, JsonValue> {
	let mut info = JsonMap::new();

	for (destination, source) in fields {
		if let Some(value) = profile.get(*source) {
			info.insert((*destination).to_owned(), value.clone());
		}
	}

	prune(info)
}

/// Wraps the pruned profile under `user`; the key is kept even when the profile prunes to `{}`.
pub fn compute_extra(profile: &RawProfile) -> JsonMap<String, JsonValue> {
	let mut extra = JsonMap::new();

	extra.insert("user".into(), JsonValue::Object(pruned(profile)));

	extra
}

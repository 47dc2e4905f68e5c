//! Shared helpers for flow implementations.

// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::auth::ScopeSet;

/// Joins normalized scopes with the provider's delimiter when building requests.
pub(crate) fn format_scope(scope: &ScopeSet, delimiter: char) -> Option<String> {
	if scope.is_empty() { None } else { Some(scope.join(delimiter)) }
}

/// Random alphanumeric string for `state` values and PKCE verifiers.
pub(crate) fn random_string(len: usize) -> String {
	rand::rng().sample_iter(Alphanumeric).take(len).map(char::from).collect()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn scope_formatting_handles_custom_delimiters() {
		let scope = ScopeSet::new(["oauth", "crm.objects.contacts.read"])
			.expect("Failed to build test scope.");

		assert_eq!(format_scope(&scope, ' '), Some("crm.objects.contacts.read oauth".into()));
		assert_eq!(format_scope(&scope, ','), Some("crm.objects.contacts.read,oauth".into()));
		assert_eq!(format_scope(&ScopeSet::default(), ' '), None);
	}

	#[test]
	fn random_strings_are_alphanumeric() {
		let value = random_string(32);

		assert_eq!(value.len(), 32);
		assert!(value.chars().all(|ch| ch.is_ascii_alphanumeric()));
	}
}

//! Explicit strategy registry.
//!
//! Hosts build one [`StrategyRegistry`], call each strategy's `register` function during
//! startup, and look strategies up by name afterwards. Nothing is registered implicitly.

// self
use crate::{_prelude::*, provider::Strategy};

/// Errors raised while registering strategies.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum RegistryError {
	/// A strategy with the same name is already registered.
	#[error("Strategy `{name}` is already registered.")]
	DuplicateStrategy {
		/// Conflicting strategy name.
		name: String,
	},
}

/// Name-indexed collection of strategies plus their display-name overrides.
#[derive(Default)]
pub struct StrategyRegistry {
	strategies: RwLock<BTreeMap<String, Arc<dyn Strategy>>>,
	camelizations: RwLock<BTreeMap<String, String>>,
}
impl StrategyRegistry {
	/// Adds `strategy` under its [`Strategy::name`].
	pub fn register(&self, strategy: Arc<dyn Strategy>) -> Result<(), RegistryError> {
		let name = strategy.name().to_owned();
		let mut strategies = self.strategies.write();

		if strategies.contains_key(&name) {
			return Err(RegistryError::DuplicateStrategy { name });
		}

		strategies.insert(name, strategy);

		Ok(())
	}

	/// Records the display form of `name` (e.g., `hubspot` → `HubSpot`).
	pub fn add_camelization(&self, name: impl Into<String>, display: impl Into<String>) {
		self.camelizations.write().insert(name.into(), display.into());
	}

	/// Returns the display form of `name`.
	///
	/// Registered camelizations win; otherwise each `_`-separated word is capitalized.
	pub fn camelize(&self, name: &str) -> String {
		if let Some(display) = self.camelizations.read().get(name) {
			return display.clone();
		}

		name.split('_')
			.map(|word| {
				let mut chars = word.chars();

				match chars.next() {
					Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
					None => String::new(),
				}
			})
			.collect()
	}

	/// Looks a strategy up by name.
	pub fn get(&self, name: &str) -> Option<Arc<dyn Strategy>> {
		self.strategies.read().get(name).cloned()
	}

	/// Lists registered strategy names in sorted order.
	pub fn names(&self) -> Vec<String> {
		self.strategies.read().keys().cloned().collect()
	}
}
impl Debug for StrategyRegistry {
	fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
		f.debug_struct("StrategyRegistry")
			.field("strategies", &self.names())
			.field("camelizations", &*self.camelizations.read())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::provider::HubSpotStrategy;

	#[test]
	fn camelize_falls_back_to_word_capitalization() {
		let registry = StrategyRegistry::default();

		assert_eq!(registry.camelize("hubspot"), "Hubspot");
		assert_eq!(registry.camelize("google_oauth2"), "GoogleOauth2");

		registry.add_camelization("hubspot", "HubSpot");

		assert_eq!(registry.camelize("hubspot"), "HubSpot");
	}

	#[test]
	fn duplicate_names_are_rejected() {
		let registry = StrategyRegistry::default();
		let strategy = || -> Arc<dyn Strategy> {
			Arc::new(HubSpotStrategy::new().expect("HubSpot defaults should build."))
		};

		registry.register(strategy()).expect("First registration should succeed.");

		assert_eq!(
			registry.register(strategy()),
			Err(RegistryError::DuplicateStrategy { name: "hubspot".into() })
		);
		assert_eq!(registry.names(), vec!["hubspot".to_string()]);
		assert!(registry.get("github").is_none());
	}
}

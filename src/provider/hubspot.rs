//! HubSpot strategy.
//!
//! HubSpot issues access tokens through its v1 OAuth API and exposes token metadata
//! (portal, app, user, scopes) via `GET /oauth/v1/access-tokens/{token}`. That
//! introspection payload is the raw profile: it carries no stable `id` field, so the
//! portal identifier (`hub_id`) is the default uid.

// self
use crate::{
	_prelude::*,
	auth::ProviderId,
	error::ConfigError,
	provider::{ClientAuthMethod, ProviderDescriptor, Strategy},
	registry::StrategyRegistry,
};

/// Registry name.
pub const HUBSPOT_NAME: &str = "hubspot";
/// Display name registered as the camelization of [`HUBSPOT_NAME`].
pub const HUBSPOT_DISPLAY_NAME: &str = "HubSpot";
/// Default API base URL.
pub const HUBSPOT_SITE: &str = "https://api.hubapi.com";
/// Default authorization endpoint.
pub const HUBSPOT_AUTHORIZE_URL: &str = "https://app.hubspot.com/oauth/authorize";
/// Default token endpoint.
pub const HUBSPOT_TOKEN_URL: &str = "https://api.hubapi.com/oauth/v1/token";

const RAW_INFO_PATH: [&str; 3] = ["oauth", "v1", "access-tokens"];
const DEFAULT_UID_KEY: &str = "hub_id";
const INFO_FIELDS: [(&str, &str); 7] = [
	("hub_id", "hub_id"),
	("app_id", "app_id"),
	("user_id", "user_id"),
	("token_type", "token_type"),
	("scopes", "scopes"),
	("email", "user"),
	("hub_domain", "hub_domain"),
];

/// Strategy for HubSpot's OAuth 2.0 authorization-code flow.
#[derive(Clone, Debug)]
pub struct HubSpotStrategy {
	descriptor: ProviderDescriptor,
	uid_key: String,
}
impl HubSpotStrategy {
	/// Creates the strategy with HubSpot's production endpoints.
	pub fn new() -> Result<Self> {
		Ok(Self::with_descriptor(default_descriptor()?))
	}

	/// Creates the strategy with caller-provided endpoints (staging hosts, mocks).
	pub fn with_descriptor(descriptor: ProviderDescriptor) -> Self {
		Self { descriptor, uid_key: DEFAULT_UID_KEY.into() }
	}

	/// Overrides the profile key used as uid (e.g., `user_id` for per-user identities).
	pub fn with_uid_key(mut self, key: impl Into<String>) -> Self {
		self.uid_key = key.into();

		self
	}
}
impl Strategy for HubSpotStrategy {
	fn name(&self) -> &str {
		HUBSPOT_NAME
	}

	fn descriptor(&self) -> &ProviderDescriptor {
		&self.descriptor
	}

	fn uid_key(&self) -> &str {
		&self.uid_key
	}

	fn info_fields(&self) -> &[(&'static str, &'static str)] {
		&INFO_FIELDS
	}

	fn raw_info_url(&self, site: &Url, access_token: &str) -> Result<Url> {
		let mut url = site.clone();

		url.path_segments_mut()
			.map_err(|_| ConfigError::InvalidRawInfoUrl { site: site.to_string() })?
			.pop_if_empty()
			.extend(RAW_INFO_PATH)
			.push(access_token);
		url.set_query(None);
		url.set_fragment(None);

		Ok(url)
	}
}

/// Registers [`HubSpotStrategy`] and its display name with `registry`.
pub fn register(registry: &StrategyRegistry) -> Result<()> {
	registry.register(Arc::new(HubSpotStrategy::new()?)).map_err(ConfigError::from)?;
	registry.add_camelization(HUBSPOT_NAME, HUBSPOT_DISPLAY_NAME);

	Ok(())
}

fn default_descriptor() -> Result<ProviderDescriptor> {
	let parse = |raw: &str| Url::parse(raw).map_err(|source| ConfigError::InvalidDescriptor { source });
	let id = ProviderId::new(HUBSPOT_NAME).map_err(ConfigError::from)?;
	let descriptor = ProviderDescriptor::builder(id)
		.site_endpoint(parse(HUBSPOT_SITE)?)
		.authorization_endpoint(parse(HUBSPOT_AUTHORIZE_URL)?)
		.token_endpoint(parse(HUBSPOT_TOKEN_URL)?)
		.authorize_option("scope")
		.preferred_client_auth_method(ClientAuthMethod::ClientSecretPost)
		.build()
		.map_err(ConfigError::from)?;

	Ok(descriptor)
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;
	use crate::identity::RawProfile;

	fn strategy() -> HubSpotStrategy {
		HubSpotStrategy::new().expect("HubSpot defaults should build.")
	}

	fn profile(value: JsonValue) -> RawProfile {
		match value {
			JsonValue::Object(map) => map,
			other => panic!("Fixture must be a JSON object, got {other}."),
		}
	}

	#[test]
	fn defaults_match_hubspot_endpoints() {
		let strategy = strategy();
		let descriptor = strategy.descriptor();

		assert_eq!(strategy.name(), "hubspot");
		assert_eq!(descriptor.endpoints.site.as_str(), "https://api.hubapi.com/");
		assert_eq!(
			descriptor.endpoints.authorization.as_str(),
			"https://app.hubspot.com/oauth/authorize"
		);
		assert_eq!(descriptor.endpoints.token.as_str(), "https://api.hubapi.com/oauth/v1/token");
		assert_eq!(descriptor.authorize_options, vec!["scope".to_string()]);
		assert_eq!(descriptor.preferred_client_auth_method, ClientAuthMethod::ClientSecretPost);
	}

	#[test]
	fn raw_info_url_embeds_the_token_as_one_segment() {
		let strategy = strategy();
		let site = Url::parse("https://api.hubapi.com").expect("Site fixture should parse.");
		let url = strategy.raw_info_url(&site, "abc/def").expect("Raw info URL should resolve.");

		assert_eq!(url.as_str(), "https://api.hubapi.com/oauth/v1/access-tokens/abc%2Fdef");

		let nested = Url::parse("https://proxy.example.com/hubspot/?x=1")
			.expect("Nested site fixture should parse.");
		let url = strategy.raw_info_url(&nested, "tok").expect("Nested raw info URL should resolve.");

		assert_eq!(url.as_str(), "https://proxy.example.com/hubspot/oauth/v1/access-tokens/tok");
	}

	#[test]
	fn uid_defaults_to_hub_id_and_can_be_overridden() {
		let raw = profile(json!({ "hub_id": 62515, "user_id": 123 }));

		assert_eq!(strategy().uid(&raw), Some(json!(62515)));
		assert_eq!(strategy().with_uid_key("user_id").uid(&raw), Some(json!(123)));
		assert_eq!(strategy().uid(&profile(json!({ "user_id": 123 }))), None);
	}

	#[test]
	fn info_maps_introspection_fields() {
		let raw = profile(json!({
			"token": "CJSP5qf1KhICAQEYs",
			"user": "fred@smith.com",
			"hub_domain": "demo.hubspot.net",
			"scopes": ["oauth", "crm.objects.contacts.read"],
			"hub_id": 62515,
			"app_id": 456,
			"expires_in": 21588,
			"user_id": 123,
			"token_type": "access"
		}));
		let info = strategy().info(&raw);

		assert_eq!(
			JsonValue::Object(info),
			json!({
				"hub_id": 62515,
				"app_id": 456,
				"user_id": 123,
				"token_type": "access",
				"scopes": ["oauth", "crm.objects.contacts.read"],
				"email": "fred@smith.com",
				"hub_domain": "demo.hubspot.net"
			})
		);
	}

	#[test]
	fn registration_adds_strategy_and_display_name() {
		let registry = StrategyRegistry::default();

		register(&registry).expect("First registration should succeed.");

		assert!(registry.get("hubspot").is_some());
		assert_eq!(registry.camelize("hubspot"), "HubSpot");
		assert!(register(&registry).is_err(), "Duplicate registration must be rejected.");
	}
}

//! Provider descriptor data structures shared by all flows.
//!
//! The module exposes validated configuration, the builder that enforces it, and the
//! endpoint/quirk vocabulary so strategies can describe a provider in a transport-agnostic
//! way. Descriptors are serde-friendly so hosts can load overrides from their own config.

/// Builder API for assembling provider descriptors.
pub mod builder;
/// Endpoint labels used by error mapping and telemetry.
pub mod endpoint;
/// Provider-specific quirk toggles.
pub mod quirks;

pub use builder::*;
pub use endpoint::*;
pub use quirks::*;

// self
use crate::{_prelude::*, auth::ProviderId};

/// Preferred client authentication modes for token endpoint calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientAuthMethod {
	#[default]
	/// HTTP Basic with `client_id`/`client_secret`.
	ClientSecretBasic,
	/// Form POST body parameters for `client_id`/`client_secret`.
	ClientSecretPost,
	/// Public clients that prove possession via PKCE.
	NoneWithPkce,
}

/// Endpoint set declared by a provider descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEndpoints {
	/// API base URL; the raw info path is resolved against it.
	pub site: Url,
	/// Authorization endpoint users are redirected to.
	pub authorization: Url,
	/// Token endpoint used for the code exchange.
	pub token: Url,
}

/// Immutable provider descriptor consumed by flows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
	/// Descriptor identifier.
	pub id: ProviderId,
	/// Endpoint definitions exposed by the provider.
	pub endpoints: ProviderEndpoints,
	/// Request parameters a host may forward to the authorization endpoint.
	#[serde(default)]
	pub authorize_options: Vec<String>,
	/// Preferred client authentication mechanism.
	#[serde(default)]
	pub preferred_client_auth_method: ClientAuthMethod,
	/// Provider-specific quirks.
	#[serde(default)]
	pub quirks: ProviderQuirks,
}
impl ProviderDescriptor {
	/// Creates a new builder for the provided identifier.
	pub fn builder(id: ProviderId) -> ProviderDescriptorBuilder {
		ProviderDescriptorBuilder::new(id)
	}

	/// Returns `true` when `name` may be forwarded to the authorization endpoint.
	pub fn permits_authorize_option(&self, name: &str) -> bool {
		self.authorize_options.iter().any(|option| option == name)
	}

	/// Re-runs builder validation, e.g. after deserializing a descriptor from host config.
	pub fn validated(self) -> Result<Self, ProviderDescriptorError> {
		self.validate()?;

		Ok(self)
	}
}

// std
use std::iter::IntoIterator;
// self
use crate::{
	_prelude::*,
	auth::ProviderId,
	provider::{ClientAuthMethod, EndpointKind, ProviderDescriptor, ProviderEndpoints, ProviderQuirks},
};

/// Errors raised while constructing or validating descriptors.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum ProviderDescriptorError {
	/// Site (API base) endpoint is required to locate the raw profile.
	#[error("Missing site endpoint.")]
	MissingSiteEndpoint,
	/// Authorization endpoint is required for the Authorization Code flow.
	#[error("Missing authorization endpoint.")]
	MissingAuthorizationEndpoint,
	/// Token endpoint is mandatory for the code exchange.
	#[error("Missing token endpoint.")]
	MissingTokenEndpoint,
	/// Public clients can only authenticate with PKCE.
	#[error("The `none_with_pkce` client auth method requires the `pkce_required` quirk.")]
	PublicClientWithoutPkce,
	/// Endpoints must use HTTPS.
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Authorize options must be non-empty parameter names the flow does not set itself.
	#[error("Authorize option `{option}` must be a non-empty, non-reserved name without whitespace.")]
	InvalidAuthorizeOption {
		/// Offending option name.
		option: String,
	},
	/// Reject scope delimiters that are control characters.
	#[error("Scope delimiter must be a printable character.")]
	InvalidScopeDelimiter {
		/// Invalid delimiter that was supplied.
		delimiter: char,
	},
}

/// Builder for [`ProviderDescriptor`] values.
#[derive(Debug)]
pub struct ProviderDescriptorBuilder {
	/// Identifier for the descriptor being constructed.
	pub id: ProviderId,
	/// API base URL.
	pub site_endpoint: Option<Url>,
	/// Authorization endpoint.
	pub authorization_endpoint: Option<Url>,
	/// Token endpoint used for the code exchange.
	pub token_endpoint: Option<Url>,
	/// Request parameters that may be forwarded to the authorization endpoint.
	pub authorize_options: Vec<String>,
	/// Preferred client authentication method for the token endpoint.
	pub preferred_client_auth_method: ClientAuthMethod,
	/// Provider-specific quirks.
	pub quirks: ProviderQuirks,
}
impl ProviderDescriptorBuilder {
	/// Creates a new builder seeded with the provided identifier.
	pub fn new(id: ProviderId) -> Self {
		Self {
			id,
			site_endpoint: None,
			authorization_endpoint: None,
			token_endpoint: None,
			authorize_options: Vec::new(),
			preferred_client_auth_method: ClientAuthMethod::default(),
			quirks: ProviderQuirks::default(),
		}
	}

	/// Sets the API base URL.
	pub fn site_endpoint(mut self, url: Url) -> Self {
		self.site_endpoint = Some(url);

		self
	}

	/// Sets the authorization endpoint.
	pub fn authorization_endpoint(mut self, url: Url) -> Self {
		self.authorization_endpoint = Some(url);

		self
	}

	/// Sets the token endpoint.
	pub fn token_endpoint(mut self, url: Url) -> Self {
		self.token_endpoint = Some(url);

		self
	}

	/// Permits a single authorize-time request parameter.
	pub fn authorize_option(mut self, name: impl Into<String>) -> Self {
		let name = name.into();

		if !self.authorize_options.contains(&name) {
			self.authorize_options.push(name);
		}

		self
	}

	/// Permits multiple authorize-time request parameters.
	pub fn authorize_options<I, S>(mut self, names: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		for name in names.into_iter() {
			self = self.authorize_option(name);
		}

		self
	}

	/// Overrides the preferred client authentication method.
	pub fn preferred_client_auth_method(mut self, method: ClientAuthMethod) -> Self {
		self.preferred_client_auth_method = method;

		self
	}

	/// Overrides the provider quirks.
	pub fn quirks(mut self, quirks: ProviderQuirks) -> Self {
		self.quirks = quirks;

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<ProviderDescriptor, ProviderDescriptorError> {
		let site = self.site_endpoint.ok_or(ProviderDescriptorError::MissingSiteEndpoint)?;
		let authorization = self
			.authorization_endpoint
			.ok_or(ProviderDescriptorError::MissingAuthorizationEndpoint)?;
		let token = self.token_endpoint.ok_or(ProviderDescriptorError::MissingTokenEndpoint)?;
		let descriptor = ProviderDescriptor {
			id: self.id,
			endpoints: ProviderEndpoints { site, authorization, token },
			authorize_options: self.authorize_options,
			preferred_client_auth_method: self.preferred_client_auth_method,
			quirks: self.quirks,
		};

		descriptor.validate()?;

		Ok(descriptor)
	}
}

impl ProviderDescriptor {
	/// Validates invariants for the descriptor.
	pub(crate) fn validate(&self) -> Result<(), ProviderDescriptorError> {
		if matches!(self.preferred_client_auth_method, ClientAuthMethod::NoneWithPkce)
			&& !self.quirks.pkce_required
		{
			return Err(ProviderDescriptorError::PublicClientWithoutPkce);
		}

		validate_endpoint("site", &self.endpoints.site)?;
		validate_endpoint(EndpointKind::Authorization.as_str(), &self.endpoints.authorization)?;
		validate_endpoint(EndpointKind::Token.as_str(), &self.endpoints.token)?;

		for option in &self.authorize_options {
			validate_authorize_option(option)?;
		}

		validate_scope_delimiter(self.quirks.scope_delimiter)?;

		Ok(())
	}
}

fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), ProviderDescriptorError> {
	if url.scheme() != "https" {
		Err(ProviderDescriptorError::InsecureEndpoint { endpoint: name, url: url.to_string() })
	} else {
		Ok(())
	}
}

const RESERVED_AUTHORIZE_PARAMS: [&str; 6] =
	["response_type", "client_id", "redirect_uri", "state", "code_challenge", "code_challenge_method"];

fn validate_authorize_option(option: &str) -> Result<(), ProviderDescriptorError> {
	if option.is_empty()
		|| option.chars().any(char::is_whitespace)
		|| RESERVED_AUTHORIZE_PARAMS.contains(&option)
	{
		Err(ProviderDescriptorError::InvalidAuthorizeOption { option: option.to_owned() })
	} else {
		Ok(())
	}
}

fn validate_scope_delimiter(delimiter: char) -> Result<(), ProviderDescriptorError> {
	if delimiter.is_control() {
		Err(ProviderDescriptorError::InvalidScopeDelimiter { delimiter })
	} else {
		Ok(())
	}
}

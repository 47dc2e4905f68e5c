//! The pluggable strategy contract.
//!
//! A [`Strategy`] describes one identity provider: its default configuration, where the
//! raw profile lives, and how that profile maps onto the generic identity record. Token
//! error classification is part of the same contract so providers with unusual error
//! payloads can override it, but the provided heuristics cover RFC 6749 responses.

// self
use crate::{
	_prelude::*,
	identity::{self, RawProfile},
	provider::{EndpointKind, ProviderDescriptor},
};

/// Identity-provider strategy consumed by [`Authenticator`](crate::flows::Authenticator).
///
/// Implementors are required to be `Send + Sync` so one instance can back every concurrent
/// authentication attempt. Only the provider-specific hooks are required; `uid`, `info`,
/// `extra`, and `classify_token_error` have provided implementations built on
/// [`identity`](crate::identity).
pub trait Strategy: Send + Sync {
	/// Registry name (e.g., `hubspot`).
	fn name(&self) -> &str;

	/// Default provider configuration.
	fn descriptor(&self) -> &ProviderDescriptor;

	/// Key whose value becomes the identity `uid`.
	fn uid_key(&self) -> &str;

	/// Ordered `(destination, source)` renames that make up the `info` bucket.
	fn info_fields(&self) -> &[(&'static str, &'static str)];

	/// Resolves the raw profile URL for `access_token` against the configured `site`.
	fn raw_info_url(&self, site: &Url, access_token: &str) -> Result<Url>;

	/// Selects the scalar identifier; absent keys yield `None`.
	fn uid(&self, profile: &RawProfile) -> Option<JsonValue> {
		identity::compute_uid(profile, self.uid_key())
	}

	/// Builds the pruned `info` projection.
	fn info(&self, profile: &RawProfile) -> JsonMap<String, JsonValue> {
		identity::compute_info(profile, self.info_fields())
	}

	/// Builds the pruned `extra` bucket.
	fn extra(&self, profile: &RawProfile) -> JsonMap<String, JsonValue> {
		identity::compute_extra(profile)
	}

	/// Maps token endpoint failures into the crate taxonomy.
	fn classify_token_error(&self, ctx: &ProviderErrorContext) -> ProviderErrorKind {
		classify_with_heuristics(ctx)
	}
}

/// Canonical provider error categories used by strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderErrorKind {
	/// Provider rejected the authorization grant (bad or reused code).
	InvalidGrant,
	/// Client authentication failed.
	InvalidClient,
	/// Requested scopes exceed what the app may request.
	InsufficientScope,
	/// Failure is temporary and should be retried.
	Transient,
}

/// Context passed to strategies when classifying endpoint errors.
///
/// The struct keeps only primitive data (status codes, OAuth fields, body preview) so
/// strategies stay decoupled from any HTTP client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderErrorContext {
	/// Endpoint associated with the failing request.
	pub endpoint: EndpointKind,
	/// HTTP status code returned by the provider, when available.
	pub http_status: Option<u16>,
	/// Provider-supplied OAuth `error` field.
	pub oauth_error: Option<String>,
	/// Provider-supplied OAuth `error_description` field.
	pub error_description: Option<String>,
	/// Preview of the response body for non-JSON payloads.
	pub body_preview: Option<String>,
	/// Indicates whether the failure originated from the network/transport layer.
	pub network_error: bool,
}
impl ProviderErrorContext {
	pub(crate) const BODY_PREVIEW_LIMIT: usize = 256;

	/// Creates a new context scoped to the provided endpoint.
	pub fn new(endpoint: EndpointKind) -> Self {
		Self {
			endpoint,
			http_status: None,
			oauth_error: None,
			error_description: None,
			body_preview: None,
			network_error: false,
		}
	}

	/// Convenience constructor for transport-level/network failures.
	pub fn network_failure(endpoint: EndpointKind) -> Self {
		let mut ctx = Self::new(endpoint);

		ctx.network_error = true;

		ctx
	}

	/// Adds an HTTP status code (e.g., 400, 401, 500).
	pub fn with_http_status(mut self, status: u16) -> Self {
		self.http_status = Some(status);

		self
	}

	/// Adds the OAuth error code string returned by the provider.
	pub fn with_oauth_error(mut self, error: impl Into<String>) -> Self {
		self.oauth_error = Some(error.into());

		self
	}

	/// Adds the OAuth `error_description` field.
	pub fn with_error_description(mut self, description: impl Into<String>) -> Self {
		self.error_description = Some(description.into());

		self
	}

	/// Adds a body preview for providers that return non-JSON payloads.
	pub fn with_body_preview(mut self, body: impl Into<String>) -> Self {
		self.body_preview = Some(truncate_preview(body.into()));

		self
	}
}

/// RFC-guided classification used by [`Strategy::classify_token_error`].
///
/// It prioritizes structured OAuth fields (`error`, `error_description`), then falls back to
/// body text hints, and finally the HTTP status code. Network failures are always transient.
pub fn classify_with_heuristics(ctx: &ProviderErrorContext) -> ProviderErrorKind {
	if ctx.network_error {
		return ProviderErrorKind::Transient;
	}

	if let Some(kind) =
		classify_oauth_error(ctx.oauth_error.as_deref(), ctx.error_description.as_deref())
	{
		return kind;
	}
	if let Some(kind) = classify_body(ctx.body_preview.as_deref()) {
		return kind;
	}

	classify_status(ctx.http_status)
}

pub(crate) fn truncate_preview(body: String) -> String {
	if body.chars().count() <= ProviderErrorContext::BODY_PREVIEW_LIMIT {
		return body;
	}

	let mut buf = String::new();

	for (idx, ch) in body.chars().enumerate() {
		if idx >= ProviderErrorContext::BODY_PREVIEW_LIMIT {
			buf.push('…');

			break;
		}
		buf.push(ch);
	}

	buf
}

fn classify_oauth_error(
	oauth_error: Option<&str>,
	error_description: Option<&str>,
) -> Option<ProviderErrorKind> {
	oauth_error
		.and_then(match_exact_value)
		.or_else(|| error_description.and_then(match_exact_value))
		.or_else(|| classify_body(error_description))
}

fn match_exact_value(value: &str) -> Option<ProviderErrorKind> {
	if value.eq_ignore_ascii_case("invalid_grant") || value.eq_ignore_ascii_case("access_denied") {
		Some(ProviderErrorKind::InvalidGrant)
	} else if value.eq_ignore_ascii_case("invalid_client")
		|| value.eq_ignore_ascii_case("unauthorized_client")
	{
		Some(ProviderErrorKind::InvalidClient)
	} else if value.eq_ignore_ascii_case("invalid_scope")
		|| value.eq_ignore_ascii_case("insufficient_scope")
	{
		Some(ProviderErrorKind::InsufficientScope)
	} else if value.eq_ignore_ascii_case("temporarily_unavailable")
		|| value.eq_ignore_ascii_case("server_error")
	{
		Some(ProviderErrorKind::Transient)
	} else {
		None
	}
}

fn classify_body(body: Option<&str>) -> Option<ProviderErrorKind> {
	let body = body?;
	let lowered = body.to_ascii_lowercase();

	match lowered.as_str() {
		text if text.contains("invalid_grant") || text.contains("bad_auth_code") =>
			Some(ProviderErrorKind::InvalidGrant),
		text if text.contains("invalid_client") || text.contains("bad_client_id") =>
			Some(ProviderErrorKind::InvalidClient),
		text if text.contains("insufficient_scope") || text.contains("invalid_scope") =>
			Some(ProviderErrorKind::InsufficientScope),
		text if text.contains("temporarily_unavailable") || text.contains("retry") =>
			Some(ProviderErrorKind::Transient),
		_ => None,
	}
}

fn classify_status(status: Option<u16>) -> ProviderErrorKind {
	match status {
		Some(400 | 404 | 410) => ProviderErrorKind::InvalidGrant,
		Some(401) => ProviderErrorKind::InvalidClient,
		Some(403) => ProviderErrorKind::InsufficientScope,
		_ => ProviderErrorKind::Transient,
	}
}

//! Request phase: authorize URL construction and session bootstrap.

pub mod session;

pub use session::*;

// self
use crate::{
	_prelude::*,
	auth::{AttemptId, ScopeSet},
	error::ConfigError,
	flows::{Authenticator, common},
	http::TokenHttpClient,
	oauth::TransportErrorMapper,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

const STATE_LEN: usize = 32;
const SCOPE_PARAM: &str = "scope";

/// Host request data consumed by the request phase.
///
/// `params` mirrors the query parameters of the host's sign-in request; only names listed in
/// the descriptor's `authorize_options` are forwarded to the provider.
#[derive(Clone, Debug)]
pub struct AuthorizeRequest {
	/// Callback URL registered with the provider.
	pub redirect_uri: Url,
	/// Request parameters offered for forwarding.
	pub params: BTreeMap<String, String>,
	/// Scopes used when `params` carries no `scope` entry.
	pub scope: ScopeSet,
	/// Caller-chosen `state`; a random one is generated when absent.
	pub state: Option<String>,
}
impl AuthorizeRequest {
	/// Creates a request that redirects back to `redirect_uri`.
	pub fn new(redirect_uri: Url) -> Self {
		Self { redirect_uri, params: BTreeMap::new(), scope: ScopeSet::default(), state: None }
	}

	/// Adds one request parameter.
	pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.params.insert(name.into(), value.into());

		self
	}

	/// Sets the fallback scope set.
	pub fn with_scope(mut self, scope: ScopeSet) -> Self {
		self.scope = scope;

		self
	}

	/// Pins the `state` value instead of generating one.
	pub fn with_state(mut self, state: impl Into<String>) -> Self {
		self.state = Some(state.into());

		self
	}
}

impl<C, M> Authenticator<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Returns the permitted authorize-time parameters `request` would forward.
	///
	/// Empty values are skipped. When `scope` is permitted but absent from the request
	/// parameters, the request's [`ScopeSet`] is joined with the provider delimiter instead.
	pub fn authorize_params(&self, request: &AuthorizeRequest) -> BTreeMap<String, String> {
		let mut params = request
			.params
			.iter()
			.filter(|(name, value)| {
				!value.is_empty() && self.descriptor.permits_authorize_option(name)
			})
			.map(|(name, value)| (name.clone(), value.clone()))
			.collect::<BTreeMap<_, _>>();

		if self.descriptor.permits_authorize_option(SCOPE_PARAM)
			&& !params.contains_key(SCOPE_PARAM)
			&& let Some(scope) =
				common::format_scope(&request.scope, self.descriptor.quirks.scope_delimiter)
		{
			params.insert(SCOPE_PARAM.into(), scope);
		}

		params
	}

	/// Starts an attempt: allocates an [`AttemptId`] and builds the authorize URL.
	pub fn start_authorization(&self, request: AuthorizeRequest) -> Result<AuthorizationSession> {
		let attempt = AttemptId::generate();
		let _guard =
			FlowSpan::new(FlowKind::Authorize, "start_authorization").for_attempt(&attempt).entered();

		obs::record_flow_outcome(FlowKind::Authorize, FlowOutcome::Attempt);

		obs::record_result(FlowKind::Authorize, self.build_session(attempt, request))
	}

	fn build_session(
		&self,
		attempt: AttemptId,
		request: AuthorizeRequest,
	) -> Result<AuthorizationSession> {
		let params = self.authorize_params(&request);
		let scope = match params.get(SCOPE_PARAM) {
			Some(raw) => ScopeSet::from_delimited(raw, self.descriptor.quirks.scope_delimiter)
				.map_err(ConfigError::from)?,
			None => request.scope,
		};
		let state = request
			.state
			.filter(|state| !state.is_empty())
			.unwrap_or_else(|| common::random_string(STATE_LEN));
		let pkce = self.descriptor.quirks.pkce_required.then(PkcePair::generate);
		let mut authorize_url = self.descriptor.endpoints.authorization.clone();
		let mut pairs = authorize_url.query_pairs_mut();

		pairs.append_pair("response_type", "code");
		pairs.append_pair("client_id", &self.client_id);
		pairs.append_pair("redirect_uri", request.redirect_uri.as_str());

		for (name, value) in &params {
			pairs.append_pair(name, value);
		}

		pairs.append_pair("state", &state);

		if let Some(pkce) = &pkce {
			pairs.append_pair("code_challenge", &pkce.challenge);
			pairs.append_pair("code_challenge_method", pkce.method.as_str());
		}

		drop(pairs);

		Ok(AuthorizationSession::new(
			attempt,
			scope,
			request.redirect_uri,
			authorize_url,
			state,
			pkce,
		))
	}
}

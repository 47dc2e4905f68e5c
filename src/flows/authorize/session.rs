//! Authorization session handed from the request phase to the callback, plus PKCE helpers.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use sha2::{Digest, Sha256};
// self
use crate::{
	_prelude::*,
	auth::{AttemptId, ScopeSet},
	flows::common,
};

const PKCE_VERIFIER_LEN: usize = 64;

/// Supported PKCE challenge methods surfaced via [`AuthorizationSession`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PkceCodeChallengeMethod {
	/// SHA-256 based PKCE (RFC 7636 S256).
	S256,
}
impl PkceCodeChallengeMethod {
	/// Returns the RFC 7636 identifier for the challenge method.
	pub fn as_str(self) -> &'static str {
		match self {
			PkceCodeChallengeMethod::S256 => "S256",
		}
	}
}

/// Request-phase state returned by
/// [`Authenticator::start_authorization`](crate::flows::Authenticator::start_authorization).
///
/// Hosts keep the session (server side) between redirect and callback and hand it back to
/// [`Authenticator::authenticate`](crate::flows::Authenticator::authenticate).
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthorizationSession {
	/// Attempt that keys the raw profile cache.
	pub attempt: AttemptId,
	/// Requested scope set.
	pub scope: ScopeSet,
	/// Opaque state value that must round-trip via the redirect handler.
	pub state: String,
	/// Redirect URI supplied when constructing the authorize URL.
	pub redirect_uri: Url,
	/// Fully-formed HTTPS authorize URL that callers should send end-users to.
	pub authorize_url: Url,
	pkce: Option<PkcePair>,
}
impl AuthorizationSession {
	pub(super) fn new(
		attempt: AttemptId,
		scope: ScopeSet,
		redirect_uri: Url,
		authorize_url: Url,
		state: String,
		pkce: Option<PkcePair>,
	) -> Self {
		Self { attempt, scope, state, redirect_uri, authorize_url, pkce }
	}

	/// PKCE code challenge derived from the secret verifier, when PKCE is in use.
	pub fn code_challenge(&self) -> Option<&str> {
		self.pkce.as_ref().map(|pkce| pkce.challenge.as_str())
	}

	/// PKCE challenge method, when PKCE is in use.
	pub fn code_challenge_method(&self) -> Option<PkceCodeChallengeMethod> {
		self.pkce.as_ref().map(|pkce| pkce.method)
	}

	/// Validates the returned `state` parameter after the authorization redirect.
	pub fn validate_state(&self, returned_state: &str) -> Result<()> {
		if returned_state == self.state {
			Ok(())
		} else {
			Err(Error::InvalidGrant { reason: "authorization state mismatch".into() })
		}
	}

	pub(crate) fn pkce_verifier(&self) -> Option<&str> {
		self.pkce.as_ref().map(|pkce| pkce.verifier.as_str())
	}
}
impl Debug for AuthorizationSession {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthorizationSession")
			.field("attempt", &self.attempt)
			.field("scope", &self.scope)
			.field("state", &self.state)
			.field("redirect_uri", &self.redirect_uri)
			.field("authorize_url", &self.authorize_url)
			.field("code_challenge", &self.code_challenge())
			.field("code_challenge_method", &self.code_challenge_method())
			.finish()
	}
}

#[derive(Clone, Serialize, Deserialize)]
pub(super) struct PkcePair {
	verifier: String,
	pub(super) challenge: String,
	pub(super) method: PkceCodeChallengeMethod,
}
impl PkcePair {
	pub(super) fn generate() -> Self {
		let verifier = common::random_string(PKCE_VERIFIER_LEN);
		let challenge = compute_pkce_challenge(&verifier);

		Self { verifier, challenge, method: PkceCodeChallengeMethod::S256 }
	}
}

fn compute_pkce_challenge(verifier: &str) -> String {
	let mut hasher = Sha256::new();

	hasher.update(verifier.as_bytes());

	URL_SAFE_NO_PAD.encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn session(pkce: Option<PkcePair>) -> AuthorizationSession {
		AuthorizationSession::new(
			AttemptId::new("attempt-1").expect("Attempt fixture should be valid."),
			ScopeSet::default(),
			Url::parse("https://example.com/cb").expect("Redirect URL fixture should parse."),
			Url::parse("https://app.hubspot.com/oauth/authorize?state=expected")
				.expect("Authorization URL fixture should parse."),
			"expected".into(),
			pkce,
		)
	}

	#[test]
	fn state_validation_errors_on_mismatch() {
		let session = session(None);

		assert!(session.validate_state("expected").is_ok());

		let err = session.validate_state("other").expect_err("State mismatch should fail.");

		assert!(matches!(err, Error::InvalidGrant { .. }));
	}

	#[test]
	fn pkce_challenge_matches_rfc_7636_example() {
		assert_eq!(
			compute_pkce_challenge("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk"),
			"E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
		);
	}

	#[test]
	fn debug_output_hides_the_verifier() {
		let pkce = PkcePair::generate();
		let verifier = pkce.verifier.clone();
		let session = session(Some(pkce));
		let rendered = format!("{session:?}");

		assert!(!rendered.contains(&verifier));
		assert_eq!(session.pkce_verifier(), Some(verifier.as_str()));
		assert_eq!(session.code_challenge_method(), Some(PkceCodeChallengeMethod::S256));
	}
}

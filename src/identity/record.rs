//! Normalized identity record handed back to the host application.

// self
use crate::{
	_prelude::*,
	auth::{TokenRecord, TokenSecret},
};

/// Credentials bucket derived from the exchanged access token.
///
/// `expires_at` and `refresh_token` only appear when the token expires; a refresh token
/// attached to a non-expiring token is dropped.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
	/// Access token secret.
	pub token: TokenSecret,
	/// Whether the token has a finite lifetime.
	pub expires: bool,
	/// Expiry as UNIX seconds.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub expires_at: Option<i64>,
	/// Refresh token secret.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub refresh_token: Option<TokenSecret>,
}
impl Credentials {
	/// Builds the credentials bucket for `record`.
	pub fn from_token(record: &TokenRecord) -> Self {
		match record.expires_at {
			Some(expires_at) => Self {
				token: record.access_token.clone(),
				expires: true,
				expires_at: Some(expires_at.unix_timestamp()),
				refresh_token: record.refresh_token.clone(),
			},
			None => Self {
				token: record.access_token.clone(),
				expires: false,
				expires_at: None,
				refresh_token: None,
			},
		}
	}
}

/// Provider-agnostic identity produced by a strategy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IdentityRecord {
	/// Name of the strategy that produced the record.
	pub provider: String,
	/// Scalar identifier; `None` when the provider omitted it.
	pub uid: Option<JsonValue>,
	/// Pruned projection of well-known profile fields.
	pub info: JsonMap<String, JsonValue>,
	/// Token credentials.
	pub credentials: Credentials,
	/// Pruned copy of the whole raw profile under `user`.
	pub extra: JsonMap<String, JsonValue>,
}
impl IdentityRecord {
	/// Renders the uid as a string, the way host session stores usually key users.
	///
	/// Strings are returned verbatim, numbers and booleans in their JSON form. Composite
	/// values yield `None`.
	pub fn uid_string(&self) -> Option<String> {
		match self.uid.as_ref()? {
			JsonValue::String(text) => Some(text.clone()),
			JsonValue::Number(number) => Some(number.to_string()),
			JsonValue::Bool(flag) => Some(flag.to_string()),
			_ => None,
		}
	}
}

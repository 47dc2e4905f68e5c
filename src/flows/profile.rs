//! Raw profile retrieval and identity assembly.

mod cache;

pub use cache::*;

// crates.io
use oauth2::AsyncHttpClient;
// self
use crate::{
	_prelude::*,
	auth::{AttemptId, TokenRecord},
	error::ProfileError,
	flows::Authenticator,
	http::{self, ResponseMetadataSlot, TokenHttpClient},
	identity::{Credentials, IdentityRecord, RawProfile},
	oauth::TransportErrorMapper,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	provider::{EndpointKind, strategy::truncate_preview},
};

impl<C, M> Authenticator<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Returns the raw profile for `attempt`, fetching it on first use.
	///
	/// Repeated and concurrent calls for the same attempt share one request until
	/// [`finish_attempt`](Self::finish_attempt) drops the entry.
	pub async fn raw_info(&self, attempt: &AttemptId, access_token: &str) -> Result<RawProfile> {
		self.profiles.get_or_fetch(attempt, || self.fetch_raw_profile(attempt, access_token)).await
	}

	/// Builds the [`IdentityRecord`] for `attempt` from the token and its cached raw profile.
	pub async fn identity(&self, attempt: &AttemptId, token: &TokenRecord) -> Result<IdentityRecord> {
		let profile = self.raw_info(attempt, token.access_token.expose()).await?;

		Ok(IdentityRecord {
			provider: self.strategy.name().to_owned(),
			uid: self.strategy.uid(&profile),
			info: self.strategy.info(&profile),
			credentials: Credentials::from_token(token),
			extra: self.strategy.extra(&profile),
		})
	}

	/// Drops the cached raw profile of `attempt`; returns whether one was tracked.
	pub fn finish_attempt(&self, attempt: &AttemptId) -> bool {
		self.profiles.forget(attempt)
	}

	async fn fetch_raw_profile(&self, attempt: &AttemptId, access_token: &str) -> Result<RawProfile> {
		let span = FlowSpan::new(FlowKind::Profile, "fetch_raw_profile").for_attempt(attempt);

		span.instrument(async move {
			obs::record_flow_outcome(FlowKind::Profile, FlowOutcome::Attempt);

			let result = async {
				let url =
					self.strategy.raw_info_url(&self.descriptor.endpoints.site, access_token)?;
				let request = http::bearer_get(&url, access_token)?;
				let meta = ResponseMetadataSlot::default();
				let handle = self.http_client.with_metadata(meta.clone());
				let response = handle.call(request).await.map_err(|err| {
					self.transport_mapper.map_transport_error(
						self.strategy.as_ref(),
						EndpointKind::RawInfo,
						meta.take().as_ref(),
						err,
					)
				})?;

				parse_raw_profile(response.status().as_u16(), response.body()).map_err(Error::from)
			}
			.await;

			obs::record_result(FlowKind::Profile, result)
		})
		.await
	}
}

fn parse_raw_profile(status: u16, body: &[u8]) -> Result<RawProfile, ProfileError> {
	if !(200..300).contains(&status) {
		let preview = String::from_utf8_lossy(body).trim().to_owned();

		return Err(ProfileError::Status {
			status,
			body_preview: (!preview.is_empty()).then(|| truncate_preview(preview)),
		});
	}

	let mut deserializer = serde_json::Deserializer::from_slice(body);
	let value: JsonValue = serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| ProfileError::Parse { source })?;

	match value {
		JsonValue::Object(profile) => Ok(profile),
		other => Err(ProfileError::NotAnObject { found: json_kind(&other) }),
	}
}

fn json_kind(value: &JsonValue) -> &'static str {
	match value {
		JsonValue::Null => "null",
		JsonValue::Bool(_) => "boolean",
		JsonValue::Number(_) => "number",
		JsonValue::String(_) => "string",
		JsonValue::Array(_) => "array",
		JsonValue::Object(_) => "object",
	}
}

//! Callback phase: state validation, code exchange, and identity assembly.

// self
use crate::{
	_prelude::*,
	auth::TokenRecord,
	flows::{Authenticator, AuthorizationSession},
	http::TokenHttpClient,
	identity::IdentityRecord,
	oauth::{BasicFacade, OAuth2Facade, TransportErrorMapper},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

impl<C, M> Authenticator<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Validates the returned `state` and exchanges `code` for a [`TokenRecord`].
	///
	/// A state mismatch or an empty code is reported as [`Error::InvalidGrant`] before any
	/// request is made.
	pub async fn exchange_code(
		&self,
		session: &AuthorizationSession,
		returned_state: &str,
		code: &str,
	) -> Result<TokenRecord> {
		let span = FlowSpan::new(FlowKind::Callback, "exchange_code").for_attempt(&session.attempt);

		span.instrument(async move {
			obs::record_flow_outcome(FlowKind::Callback, FlowOutcome::Attempt);

			let result = async {
				session.validate_state(returned_state)?;

				if code.is_empty() {
					return Err(Error::InvalidGrant { reason: "missing authorization code".into() });
				}

				let facade = <BasicFacade<C, M>>::from_descriptor(
					&self.descriptor,
					&self.client_id,
					self.client_secret.as_deref(),
					self.http_client.clone(),
					self.transport_mapper.clone(),
				)?;

				facade
					.exchange_authorization_code(
						self.strategy.as_ref(),
						code,
						session.pkce_verifier(),
						&session.scope,
						&session.redirect_uri,
					)
					.await
			}
			.await;

			obs::record_result(FlowKind::Callback, result)
		})
		.await
	}

	/// Runs the whole callback phase and returns the normalized identity.
	///
	/// The attempt's cached raw profile is dropped whether or not the phase succeeds.
	pub async fn authenticate(
		&self,
		session: &AuthorizationSession,
		returned_state: &str,
		code: &str,
	) -> Result<IdentityRecord> {
		let result = async {
			let token = self.exchange_code(session, returned_state, code).await?;

			self.identity(&session.attempt, &token).await
		}
		.await;

		self.finish_attempt(&session.attempt);

		result
	}
}

//! Sign-in flows driven by a single [`Strategy`].

pub mod authorize;
pub mod callback;
pub mod common;
pub mod profile;

pub use authorize::*;
pub use profile::*;

// self
use crate::{
	_prelude::*,
	http::TokenHttpClient,
	oauth::TransportErrorMapper,
	provider::{ProviderDescriptor, Strategy},
};
#[cfg(feature = "reqwest")]
use crate::{http::ReqwestHttpClient, oauth::ReqwestTransportErrorMapper};

#[cfg(feature = "reqwest")]
/// Authenticator specialized for the crate's default reqwest transport stack.
pub type ReqwestAuthenticator = Authenticator<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Runs the request and callback phases of the authorization-code flow for one strategy.
///
/// The authenticator owns the HTTP client, the strategy, and the effective provider
/// descriptor. The descriptor defaults to the strategy's own and can be swapped for staging
/// hosts or mock servers. Raw profiles are memoized per attempt in a [`ProfileCache`], so one
/// instance can serve every concurrent sign-in of the host application.
#[derive(Clone)]
pub struct Authenticator<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// HTTP client wrapper used for every outbound provider request.
	pub http_client: Arc<C>,
	/// Mapper applied to transport-layer errors before surfacing them to callers.
	pub transport_mapper: Arc<M>,
	/// Strategy that names the provider and shapes its profile.
	pub strategy: Arc<dyn Strategy>,
	/// Effective provider configuration.
	pub descriptor: ProviderDescriptor,
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// Optional client secret for confidential authentication methods.
	pub client_secret: Option<String>,
	profiles: ProfileCache,
}
impl<C, M> Authenticator<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates an authenticator that reuses the caller-provided transport + mapper pair.
	pub fn with_http_client(
		strategy: Arc<dyn Strategy>,
		client_id: impl Into<String>,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			transport_mapper: mapper.into(),
			descriptor: strategy.descriptor().clone(),
			strategy,
			client_id: client_id.into(),
			client_secret: None,
			profiles: ProfileCache::default(),
		}
	}

	/// Replaces the strategy's default descriptor.
	pub fn with_descriptor(mut self, descriptor: ProviderDescriptor) -> Self {
		self.descriptor = descriptor;

		self
	}

	/// Sets or replaces the client secret used for confidential client auth modes.
	pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
		self.client_secret = Some(secret.into());

		self
	}

	/// Raw profile cache shared by every attempt of this authenticator.
	pub fn profiles(&self) -> &ProfileCache {
		&self.profiles
	}
}
#[cfg(feature = "reqwest")]
impl Authenticator<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates an authenticator backed by a default reqwest client.
	///
	/// Use [`Authenticator::with_client_secret`] to attach the app's client secret, which
	/// HubSpot requires for the code exchange.
	pub fn new(strategy: Arc<dyn Strategy>, client_id: impl Into<String>) -> Self {
		Self::with_http_client(
			strategy,
			client_id,
			ReqwestHttpClient::default(),
			Arc::new(ReqwestTransportErrorMapper),
		)
	}
}
impl<C, M> Debug for Authenticator<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Authenticator")
			.field("strategy", &self.strategy.name())
			.field("descriptor", &self.descriptor)
			.field("client_id", &self.client_id)
			.field("client_secret_set", &self.client_secret.is_some())
			.field("cached_attempts", &self.profiles.len())
			.finish()
	}
}

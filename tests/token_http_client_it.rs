#![cfg(feature = "reqwest")]

// self
use oauth2_hubspot::{
	_preludet::*,
	auth::{AttemptId, ProviderId},
	error::{ConfigError, TransientError, TransportError},
	flows::{Authenticator, AuthorizeRequest},
	http::{ResponseMetadata, ResponseMetadataSlot, TokenHttpClient},
	oauth::{
		TransportErrorMapper,
		oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse},
	},
	provider::{ClientAuthMethod, EndpointKind, HubSpotStrategy, ProviderDescriptor, Strategy},
};

#[derive(Debug)]
enum FakeTransportError {
	Throttled,
}
impl Display for FakeTransportError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Throttled => write!(f, "Transport throttled."),
		}
	}
}
impl StdError for FakeTransportError {}

#[derive(Clone, Copy)]
struct FakeHttpClient {
	retry_after: Duration,
}
impl FakeHttpClient {
	fn throttled(retry_after: Duration) -> Self {
		Self { retry_after }
	}
}
impl TokenHttpClient for FakeHttpClient {
	type Handle = FakeHttpHandle;
	type TransportError = FakeTransportError;

	fn with_metadata(&self, slot: ResponseMetadataSlot) -> Self::Handle {
		FakeHttpHandle { slot, retry_after: self.retry_after }
	}
}

struct FakeHttpHandle {
	slot: ResponseMetadataSlot,
	retry_after: Duration,
}
impl<'a> AsyncHttpClient<'a> for FakeHttpHandle {
	type Error = HttpClientError<FakeTransportError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'a + Send + Sync>>;

	fn call(&'a self, _request: HttpRequest) -> Self::Future {
		let slot = self.slot.clone();
		let retry_after = self.retry_after;

		Box::pin(async move {
			assert!(
				slot.take().is_none(),
				"ResponseMetadataSlot must be clear before dispatching a request."
			);
			slot.store(ResponseMetadata { status: Some(429), retry_after: Some(retry_after) });

			Err(HttpClientError::Other(FakeTransportError::Throttled.to_string()))
		})
	}
}

#[derive(Clone, Default)]
struct RecordingTransportErrorMapper {
	calls: Arc<Mutex<Vec<(EndpointKind, Option<ResponseMetadata>)>>>,
}
impl RecordingTransportErrorMapper {
	fn recorded(&self) -> Vec<(EndpointKind, Option<ResponseMetadata>)> {
		self.calls.lock().clone()
	}
}
impl TransportErrorMapper<FakeTransportError> for RecordingTransportErrorMapper {
	fn map_transport_error(
		&self,
		_strategy: &dyn Strategy,
		endpoint: EndpointKind,
		meta: Option<&ResponseMetadata>,
		err: HttpClientError<FakeTransportError>,
	) -> Error {
		let status = meta.and_then(|value| value.status);
		let retry_after = meta.and_then(|value| value.retry_after);

		self.calls.lock().push((endpoint, meta.cloned()));

		match err {
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => TransportError::Io(inner).into(),
			HttpClientError::Other(message) =>
				TransientError::Endpoint { endpoint, message, status, retry_after }.into(),
			other => TransientError::Endpoint {
				endpoint,
				message: format!("unhandled HTTP client error: {other:?}"),
				status,
				retry_after,
			}
			.into(),
		}
	}
}

type FakeAuthenticator = Authenticator<FakeHttpClient, RecordingTransportErrorMapper>;

fn build_authenticator(retry_after: Duration) -> (FakeAuthenticator, RecordingTransportErrorMapper) {
	let url = |value: &str| Url::parse(value).expect("Fixture URL should parse.");
	let descriptor =
		ProviderDescriptor::builder(ProviderId::new("hubspot").expect("Provider id should be valid."))
			.site_endpoint(url("https://mock.example.com"))
			.authorization_endpoint(url("https://mock.example.com/oauth/authorize"))
			.token_endpoint(url("https://mock.example.com/oauth/v1/token"))
			.authorize_option("scope")
			.preferred_client_auth_method(ClientAuthMethod::ClientSecretPost)
			.build()
			.expect("Failed to build mock provider descriptor.");
	let strategy: Arc<dyn Strategy> =
		Arc::new(HubSpotStrategy::new().expect("HubSpot defaults should build."));
	let mapper = RecordingTransportErrorMapper::default();
	let authenticator = Authenticator::with_http_client(
		strategy,
		"throttled-client",
		Arc::new(FakeHttpClient::throttled(retry_after)),
		Arc::new(mapper.clone()),
	)
	.with_descriptor(descriptor)
	.with_client_secret("throttled-secret");

	(authenticator, mapper)
}

#[tokio::test]
async fn code_exchange_surfaces_transport_metadata() {
	let (authenticator, mapper) = build_authenticator(Duration::seconds(5));
	let session = authenticator
		.start_authorization(AuthorizeRequest::new(
			Url::parse("https://app.example.com/callback").expect("Redirect URI should parse."),
		))
		.expect("Authorization session should start.");
	let err = authenticator
		.exchange_code(&session, &session.state, "code")
		.await
		.expect_err("Request should be throttled with HTTP 429.");

	match err {
		Error::Transient(TransientError::Endpoint { endpoint, status, retry_after, .. }) => {
			assert_eq!(endpoint, EndpointKind::Token);
			assert_eq!(status, Some(429));
			assert_eq!(retry_after, Some(Duration::seconds(5)));
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}

	let recorded = mapper.recorded();

	assert_eq!(recorded.len(), 1);
	assert_eq!(recorded[0].0, EndpointKind::Token);
}

#[tokio::test]
async fn raw_info_failures_use_the_same_mapper() {
	let (authenticator, mapper) = build_authenticator(Duration::seconds(30));
	let attempt = AttemptId::generate();
	let err = authenticator
		.raw_info(&attempt, "token")
		.await
		.expect_err("Raw info request should be throttled.");

	assert!(matches!(
		err,
		Error::Transient(TransientError::Endpoint { endpoint: EndpointKind::RawInfo, .. })
	));

	let recorded = mapper.recorded();

	assert_eq!(recorded.len(), 1);
	assert_eq!(recorded[0].0, EndpointKind::RawInfo);
	assert_eq!(
		recorded[0].1.as_ref().and_then(|meta| meta.retry_after),
		Some(Duration::seconds(30))
	);
	assert!(!authenticator.profiles().contains(&attempt));
	assert!(!authenticator.finish_attempt(&attempt));
}

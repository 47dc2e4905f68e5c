#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use oauth2_hubspot::{
	_preludet::*,
	auth::ProviderId,
	error::TransientError,
	flows::{AuthorizationSession, AuthorizeRequest},
	identity::Credentials,
	provider::{ClientAuthMethod, EndpointKind, ProviderDescriptor},
};

const CLIENT_ID: &str = "client-it";
const CLIENT_SECRET: &str = "secret-it";
const TOKEN_PATH: &str = "/oauth/v1/token";

fn build_descriptor(server: &MockServer) -> ProviderDescriptor {
	let provider_id = ProviderId::new("hubspot").expect("Provider identifier should be valid.");

	ProviderDescriptor::builder(provider_id)
		.site_endpoint(Url::parse(&server.base_url()).expect("Mock site should parse."))
		.authorization_endpoint(
			Url::parse(&server.url("/oauth/authorize"))
				.expect("Mock authorization endpoint should parse."),
		)
		.token_endpoint(
			Url::parse(&server.url(TOKEN_PATH)).expect("Mock token endpoint should parse."),
		)
		.authorize_option("scope")
		.preferred_client_auth_method(ClientAuthMethod::ClientSecretPost)
		.build()
		.expect("Provider descriptor should build successfully.")
}

fn start(authenticator: &ReqwestTestAuthenticator) -> AuthorizationSession {
	let redirect_uri =
		Url::parse("https://app.example.com/callback").expect("Redirect URI should parse.");
	let request = AuthorizeRequest::new(redirect_uri).with_param("scope", "oauth");

	authenticator.start_authorization(request).expect("Authorization session should start.")
}

#[tokio::test]
async fn authenticate_builds_the_identity_record() {
	let server = MockServer::start_async().await;
	let authenticator =
		build_reqwest_test_authenticator(build_descriptor(&server), CLIENT_ID, CLIENT_SECRET);
	let session = start(&authenticator);
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(TOKEN_PATH)
				.header("content-type", "application/x-www-form-urlencoded");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"access-hub\",\"refresh_token\":\"refresh-hub\",\"token_type\":\"bearer\",\"expires_in\":21600}",
			);
		})
		.await;
	let profile_mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/oauth/v1/access-tokens/access-hub")
				.header("authorization", "Bearer access-hub");
			then.status(200).header("content-type", "application/json").body(
				"{\"hub_id\":62515,\"app_id\":456,\"user_id\":123,\"token_type\":\"access\",\"scopes\":[]}",
			);
		})
		.await;
	let identity = authenticator
		.authenticate(&session, &session.state, "valid-code")
		.await
		.expect("Callback phase should succeed.");

	token_mock.assert_async().await;
	profile_mock.assert_async().await;

	assert_eq!(identity.provider, "hubspot");
	assert_eq!(identity.uid, Some(json!(62515)));
	assert_eq!(identity.uid_string().as_deref(), Some("62515"));
	assert_eq!(
		JsonValue::Object(identity.info.clone()),
		json!({ "hub_id": 62515, "app_id": 456, "user_id": 123, "token_type": "access" })
	);
	assert_eq!(
		JsonValue::Object(identity.extra.clone()),
		json!({ "user": { "hub_id": 62515, "app_id": 456, "user_id": 123, "token_type": "access" } })
	);
	assert!(identity.credentials.expires);
	assert!(identity.credentials.expires_at.is_some());
	assert_eq!(identity.credentials.token.expose(), "access-hub");
	assert_eq!(
		identity.credentials.refresh_token.as_ref().map(|secret| secret.expose()),
		Some("refresh-hub")
	);
	assert!(authenticator.profiles().is_empty(), "Finished attempts must leave no cache entry.");
}

#[tokio::test]
async fn non_expiring_tokens_drop_refresh_credentials() {
	let server = MockServer::start_async().await;
	let authenticator =
		build_reqwest_test_authenticator(build_descriptor(&server), CLIENT_ID, CLIENT_SECRET);
	let session = start(&authenticator);

	server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"forever\",\"refresh_token\":\"ignored\",\"token_type\":\"bearer\"}",
			);
		})
		.await;

	let record = authenticator
		.exchange_code(&session, &session.state, "valid-code")
		.await
		.expect("Code exchange should succeed.");

	assert!(!record.expires());
	assert_eq!(record.scope, session.scope);

	let credentials = serde_json::to_value(Credentials::from_token(&record))
		.expect("Credentials should serialize.");

	assert_eq!(credentials, json!({ "token": "forever", "expires": false }));
}

#[tokio::test]
async fn state_mismatch_fails_before_any_request() {
	let server = MockServer::start_async().await;
	let authenticator =
		build_reqwest_test_authenticator(build_descriptor(&server), CLIENT_ID, CLIENT_SECRET);
	let session = start(&authenticator);
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(500);
		})
		.await;
	let err = authenticator
		.authenticate(&session, "forged-state", "valid-code")
		.await
		.expect_err("State mismatch should be rejected.");

	assert!(matches!(err, Error::InvalidGrant { .. }));

	token_mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn oauth_error_responses_are_classified() {
	let server = MockServer::start_async().await;
	let authenticator =
		build_reqwest_test_authenticator(build_descriptor(&server), CLIENT_ID, CLIENT_SECRET);
	let session = start(&authenticator);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(400)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_grant\",\"error_description\":\"already used\"}");
		})
		.await;
	let err = authenticator
		.authenticate(&session, &session.state, "stale-code")
		.await
		.expect_err("Invalid grant errors should be classified correctly.");

	assert!(matches!(err, Error::InvalidGrant { .. }));

	mock.assert_async().await;
}

#[tokio::test]
async fn hubspot_error_payloads_are_classified() {
	let server = MockServer::start_async().await;
	let authenticator =
		build_reqwest_test_authenticator(build_descriptor(&server), CLIENT_ID, CLIENT_SECRET);
	let session = start(&authenticator);
	let bad_code = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(400).header("content-type", "application/json").body(
				"{\"status\":\"BAD_AUTH_CODE\",\"message\":\"missing or unknown auth code\",\"correlationId\":\"2c4c1f0a\"}",
			);
		})
		.await;
	let err = authenticator
		.exchange_code(&session, &session.state, "unknown-code")
		.await
		.expect_err("HubSpot BAD_AUTH_CODE should be rejected.");

	assert!(matches!(err, Error::InvalidGrant { .. }));

	bad_code.delete_async().await;
	server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(503).header("content-type", "text/plain").body("maintenance");
		})
		.await;

	let session = start(&authenticator);
	let err = authenticator
		.exchange_code(&session, &session.state, "any-code")
		.await
		.expect_err("Unavailable token endpoint should fail.");

	match err {
		Error::Transient(TransientError::Endpoint { endpoint, status, .. }) => {
			assert_eq!(endpoint, EndpointKind::Token);
			assert_eq!(status, Some(503));
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}
}

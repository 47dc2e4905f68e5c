#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use oauth2_hubspot::{
	_preludet::*,
	auth::{AttemptId, ProviderId, ScopeSet, TokenRecord},
	error::ProfileError,
	provider::{ClientAuthMethod, ProviderDescriptor},
};

const CLIENT_ID: &str = "client-it";
const CLIENT_SECRET: &str = "secret-it";

fn build_descriptor(server: &MockServer) -> ProviderDescriptor {
	let provider_id = ProviderId::new("hubspot").expect("Provider identifier should be valid.");

	ProviderDescriptor::builder(provider_id)
		.site_endpoint(Url::parse(&server.base_url()).expect("Mock site should parse."))
		.authorization_endpoint(
			Url::parse(&server.url("/oauth/authorize"))
				.expect("Mock authorization endpoint should parse."),
		)
		.token_endpoint(
			Url::parse(&server.url("/oauth/v1/token")).expect("Mock token endpoint should parse."),
		)
		.authorize_option("scope")
		.preferred_client_auth_method(ClientAuthMethod::ClientSecretPost)
		.build()
		.expect("Provider descriptor should build successfully.")
}

fn attempt() -> AttemptId {
	AttemptId::generate()
}

#[tokio::test]
async fn raw_info_is_fetched_once_per_attempt() {
	let server = MockServer::start_async().await;
	let authenticator =
		build_reqwest_test_authenticator(build_descriptor(&server), CLIENT_ID, CLIENT_SECRET);
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/oauth/v1/access-tokens/token-1")
				.header("authorization", "Bearer token-1")
				.header("accept", "application/json");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"hub_id\":62515,\"user\":\"fred@smith.com\"}");
		})
		.await;
	let attempt = attempt();
	let (first, second) = tokio::join!(
		authenticator.raw_info(&attempt, "token-1"),
		authenticator.raw_info(&attempt, "token-1")
	);
	let first = first.expect("First lookup should succeed.");

	assert_eq!(first, second.expect("Concurrent lookup should succeed."));

	let third = authenticator.raw_info(&attempt, "token-1").await.expect("Cached lookup should succeed.");

	assert_eq!(third.get("hub_id"), Some(&json!(62515)));

	mock.assert_calls_async(1).await;

	assert!(authenticator.finish_attempt(&attempt));

	authenticator.raw_info(&attempt, "token-1").await.expect("Refetch should succeed.");

	mock.assert_calls_async(2).await;
}

#[tokio::test]
async fn identity_tolerates_missing_uid() {
	let server = MockServer::start_async().await;
	let authenticator =
		build_reqwest_test_authenticator(build_descriptor(&server), CLIENT_ID, CLIENT_SECRET);

	server
		.mock_async(|when, then| {
			when.method(GET).path("/oauth/v1/access-tokens/token-2");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"user\":\"fred@smith.com\",\"hub_domain\":\"\",\"scopes\":[\"oauth\"]}");
		})
		.await;

	let token = TokenRecord::builder(ScopeSet::default())
		.access_token("token-2")
		.build()
		.expect("Token fixture should build.");
	let identity =
		authenticator.identity(&attempt(), &token).await.expect("Identity should build.");

	assert_eq!(identity.uid, None);
	assert_eq!(
		JsonValue::Object(identity.info),
		json!({ "email": "fred@smith.com", "scopes": ["oauth"] })
	);
	assert_eq!(
		JsonValue::Object(identity.extra),
		json!({ "user": { "user": "fred@smith.com", "scopes": ["oauth"] } })
	);
}

#[tokio::test]
async fn error_statuses_surface_as_profile_errors() {
	let server = MockServer::start_async().await;
	let authenticator =
		build_reqwest_test_authenticator(build_descriptor(&server), CLIENT_ID, CLIENT_SECRET);

	server
		.mock_async(|when, then| {
			when.method(GET).path("/oauth/v1/access-tokens/expired");
			then.status(401)
				.header("content-type", "application/json")
				.body("{\"status\":\"error\",\"message\":\"The OAuth token used to make this call expired.\"}");
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/oauth/v1/access-tokens/listy");
			then.status(200).header("content-type", "application/json").body("[62515]");
		})
		.await;

	let attempt = attempt();
	let err = authenticator
		.raw_info(&attempt, "expired")
		.await
		.expect_err("Expired token should be rejected.");

	match err {
		Error::Profile(ProfileError::Status { status, body_preview }) => {
			assert_eq!(status, 401);
			assert!(body_preview.is_some_and(|body| body.contains("expired")));
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}

	assert!(!authenticator.profiles().contains(&attempt), "Failed lookups must not stay cached.");

	let err = authenticator
		.raw_info(&AttemptId::generate(), "listy")
		.await
		.expect_err("Array bodies should be rejected.");

	assert!(matches!(err, Error::Profile(ProfileError::NotAnObject { found: "array" })));
}

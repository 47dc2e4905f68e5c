//! Registers the HubSpot strategy, starts a sign-in attempt, and shows what the redirect handler
//! needs to keep until the callback arrives.

// std
use std::collections::HashMap;
// crates.io
use color_eyre::{Result, eyre::eyre};
use url::Url;
// self
use oauth2_hubspot::{
	flows::{AuthorizeRequest, ReqwestAuthenticator},
	provider::{self, Strategy},
	registry::StrategyRegistry,
};

fn main() -> Result<()> {
	color_eyre::install()?;

	let registry = StrategyRegistry::default();

	provider::hubspot::register(&registry)?;

	let strategy = registry.get("hubspot").ok_or_else(|| eyre!("HubSpot is not registered."))?;

	println!("Registered strategies: {:?}.", registry.names());
	println!("Display name: {}.", registry.camelize(strategy.name()));

	let authenticator =
		ReqwestAuthenticator::new(strategy, "demo-client").with_client_secret("demo-secret");
	let request = AuthorizeRequest::new(Url::parse("https://app.example.com/auth/hubspot/callback")?)
		.with_param("scope", "oauth crm.objects.contacts.read")
		.with_param("prompt", "consent");

	println!("Forwarded authorize params: {:?}.", authenticator.authorize_params(&request));

	let session = authenticator.start_authorization(request)?;

	println!("Send your user to {}.", &session.authorize_url);
	println!("Attempt {} requested scope `{}`.", &session.attempt, &session.scope);

	let mut sessions: HashMap<String, _> = HashMap::new();

	sessions.insert(session.state.clone(), session.clone());

	// Simulate the redirect handler looking up the stored session by `state`.
	let returned_state = session.state.clone();

	match sessions.remove(&returned_state) {
		Some(stashed) => {
			stashed.validate_state(&returned_state)?;
			println!("State validated; call `authenticate` with the returned `code` next.");
		},
		None => eprintln!("State `{returned_state}` was not recognized."),
	}

	Ok(())
}

#![cfg(feature = "reqwest")]

// std
use std::sync::Arc;
// crates.io
use httpmock::prelude::*;
// self
use oidc_rp::{
	auth::{Identity, TokenSecret},
	config::ProviderConfig,
	flows::{LogoutCompletion, LogoutInitiation, RelyingParty},
	provider::ZitadelAdapter,
	session::{MemorySessionStore, SessionData, SessionId, SessionStore},
	url::Url,
};

fn build_relier(server: &MockServer) -> (RelyingParty, Arc<MemorySessionStore>) {
	let domain = Url::parse(&server.base_url()).expect("Mock server URL should parse.");
	let config = ProviderConfig::new(
		domain,
		"client-it",
		"secret-it",
		Url::parse("https://app.example.com/auth/callback/zitadel")
			.expect("Redirect fixture should parse."),
		Url::parse("https://app.example.com/auth/logout/callback")
			.expect("Post-logout fixture should parse."),
	);
	let adapter = ZitadelAdapter::new(config).expect("Adapter fixture should build.");
	let store_backend = Arc::new(MemorySessionStore::default());
	let store: Arc<dyn SessionStore> = store_backend.clone();
	let relier = RelyingParty::new(store, Arc::new(adapter));

	(relier, store_backend)
}

fn session_id(value: &str) -> SessionId {
	SessionId::new(value).expect("Session id fixture should be valid.")
}

async fn seed_signed_in_session(store: &MemorySessionStore, id: &SessionId) {
	let data = SessionData {
		identity: Some(Identity { subject: Some("user-1".into()), ..Default::default() }),
		access_token: Some(TokenSecret::new("access-1")),
		id_token: Some(TokenSecret::new("jwt-1")),
		..Default::default()
	};

	store.save(id, data).await.expect("Session seed should succeed.");
}

fn query_value(url: &Url, key: &str) -> Option<String> {
	url.query_pairs().find(|(name, _)| name == key).map(|(_, value)| value.into_owned())
}

#[tokio::test]
async fn logout_without_an_id_token_goes_home_with_a_flash() {
	let server = MockServer::start_async().await;
	let (relier, store) = build_relier(&server);
	let id = session_id("logout-anonymous");
	let initiation = relier.start_logout(&id).await.expect("Logout initiation should succeed.");

	match initiation {
		LogoutInitiation::NoSession { target, message } => {
			assert_eq!(target, "/");
			assert!(!message.is_empty());
		},
		other => panic!("Expected the no-session path, got {other:?}."),
	}

	// No handshake began: nothing may be stored.
	let data = store.load(&id).await.expect("Session load should succeed.").unwrap_or_default();

	assert_eq!(data.logout_state, None);
}

#[tokio::test]
async fn logout_round_trip_destroys_the_session() {
	let server = MockServer::start_async().await;
	let (relier, store) = build_relier(&server);
	let id = session_id("logout-round-trip");

	seed_signed_in_session(&store, &id).await;

	let initiation = relier.start_logout(&id).await.expect("Logout initiation should succeed.");
	let url = match initiation {
		LogoutInitiation::Redirect { url } => url,
		other => panic!("Expected the end-session redirect, got {other:?}."),
	};

	assert!(url.path().ends_with("/oidc/v1/end_session"));
	assert_eq!(query_value(&url, "id_token_hint").as_deref(), Some("jwt-1"));
	assert_eq!(
		query_value(&url, "post_logout_redirect_uri").as_deref(),
		Some("https://app.example.com/auth/logout/callback")
	);

	let state = query_value(&url, "state").expect("End-session URL should carry a state.");

	assert_eq!(state.len(), 32);

	let stored = store
		.load(&id)
		.await
		.expect("Session load should succeed.")
		.expect("Session should persist the logout state.");

	assert_eq!(stored.logout_state.as_deref(), Some(state.as_str()));

	let completion = relier
		.complete_logout(&id, Some(&state))
		.await
		.expect("Logout completion should succeed.");

	assert_eq!(completion, LogoutCompletion::Success { target: "/auth/logout/success".into() });
	assert_eq!(store.load(&id).await.expect("Session load should succeed."), None);
}

#[tokio::test]
async fn mismatched_state_leaves_the_session_untouched() {
	let server = MockServer::start_async().await;
	let (relier, store) = build_relier(&server);
	let id = session_id("logout-mismatch");

	seed_signed_in_session(&store, &id).await;

	let initiation = relier.start_logout(&id).await.expect("Logout initiation should succeed.");
	let state = match initiation {
		LogoutInitiation::Redirect { url } =>
			query_value(&url, "state").expect("End-session URL should carry a state."),
		other => panic!("Expected the end-session redirect, got {other:?}."),
	};
	let completion = relier
		.complete_logout(&id, Some("forged-state"))
		.await
		.expect("Logout completion should succeed.");

	match completion {
		LogoutCompletion::Failure { target } => {
			assert_eq!(target, "/auth/logout/error?reason=Invalid+or+missing+state+parameter.");
		},
		other => panic!("Expected the failure path, got {other:?}."),
	}

	let data = store
		.load(&id)
		.await
		.expect("Session load should succeed.")
		.expect("Session should survive a rejected logout callback.");

	assert!(data.is_authenticated());
	assert_eq!(data.id_token.as_ref().map(|secret| secret.expose()), Some("jwt-1"));
	// The stored state is single-use: a replay with the real value must fail too.
	assert_eq!(data.logout_state, None);

	let replay = relier
		.complete_logout(&id, Some(&state))
		.await
		.expect("Logout completion should succeed.");

	assert!(matches!(replay, LogoutCompletion::Failure { .. }));
}

#[tokio::test]
async fn missing_state_takes_the_failure_path() {
	let server = MockServer::start_async().await;
	let (relier, store) = build_relier(&server);
	let id = session_id("logout-missing-state");

	seed_signed_in_session(&store, &id).await;

	relier.start_logout(&id).await.expect("Logout initiation should succeed.");

	let completion =
		relier.complete_logout(&id, None).await.expect("Logout completion should succeed.");

	assert!(matches!(completion, LogoutCompletion::Failure { .. }));

	let empty = relier
		.complete_logout(&id, Some(""))
		.await
		.expect("Logout completion should succeed.");

	assert!(matches!(empty, LogoutCompletion::Failure { .. }));
}

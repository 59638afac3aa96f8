#![cfg(feature = "reqwest")]

// std
use std::sync::Arc;
// crates.io
use httpmock::prelude::*;
// self
use oidc_rp::{
	auth::ScopeSet,
	config::ProviderConfig,
	flows::{AuthErrorCode, CallbackOutcome, CallbackQuery, RelyingParty},
	provider::ZitadelAdapter,
	session::{MemorySessionStore, SessionData, SessionId, SessionStore},
	url::Url,
};

const CLIENT_ID: &str = "client-it";
const CLIENT_SECRET: &str = "secret-it";
// base64("client-it:secret-it")
const BASIC_AUTH: &str = "Basic Y2xpZW50LWl0OnNlY3JldC1pdA==";

fn build_relier(server: &MockServer) -> (RelyingParty, Arc<MemorySessionStore>) {
	let domain = Url::parse(&server.base_url()).expect("Mock server URL should parse.");
	let config = ProviderConfig::new(
		domain,
		CLIENT_ID,
		CLIENT_SECRET,
		Url::parse("https://app.example.com/auth/callback/zitadel")
			.expect("Redirect fixture should parse."),
		Url::parse("https://app.example.com/auth/logout/callback")
			.expect("Post-logout fixture should parse."),
	)
	.with_scopes(ScopeSet::new(["openid", "offline_access"]).expect("Scope fixture should be valid."));
	let adapter = ZitadelAdapter::new(config).expect("Adapter fixture should build.");
	let store_backend = Arc::new(MemorySessionStore::default());
	let store: Arc<dyn SessionStore> = store_backend.clone();
	let relier = RelyingParty::new(store, Arc::new(adapter));

	(relier, store_backend)
}

fn session_id(value: &str) -> SessionId {
	SessionId::new(value).expect("Session id fixture should be valid.")
}

async fn load_session(store: &MemorySessionStore, id: &SessionId) -> SessionData {
	store.load(id).await.expect("Session load should succeed.").unwrap_or_default()
}

async fn pending_callback(
	relier: &RelyingParty,
	store: &MemorySessionStore,
	id: &SessionId,
) -> (String, String) {
	let authorize_url =
		relier.start_sign_in(id).await.expect("Sign-in initiation should succeed.");
	let data = load_session(store, id).await;
	let verifier = data
		.pkce_verifier
		.expect("Sign-in should persist the PKCE verifier.")
		.expose()
		.to_owned();
	let state = data.sign_in_state.expect("Sign-in should persist the state.");

	assert!(authorize_url.query().unwrap_or_default().contains(&format!("state={state}")));

	(verifier, state)
}

#[tokio::test]
async fn start_sign_in_builds_the_authorization_redirect() {
	let server = MockServer::start_async().await;
	let (relier, store) = build_relier(&server);
	let id = session_id("session-start");
	let authorize_url =
		relier.start_sign_in(&id).await.expect("Sign-in initiation should succeed.");

	assert!(authorize_url.path().ends_with("/oauth/v2/authorize"));

	let query = authorize_url.query().unwrap_or_default();

	assert!(query.contains("response_type=code"));
	assert!(query.contains("scope=openid+offline_access+profile+email"));
	assert!(query.contains("code_challenge_method=S256"));

	let data = load_session(&store, &id).await;

	assert!(data.pkce_verifier.is_some());
	assert!(data.sign_in_state.is_some());
	assert!(!data.is_authenticated());
}

#[tokio::test]
async fn callback_success_materializes_the_session() {
	let server = MockServer::start_async().await;
	let (relier, store) = build_relier(&server);
	let id = session_id("session-success");
	let (verifier, state) = pending_callback(&relier, &store, &id).await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/oauth/v2/token")
				.header("authorization", BASIC_AUTH)
				.body_includes("grant_type=authorization_code")
				.body_includes("code=code-42")
				.body_includes(format!("code_verifier={verifier}"))
				.body_includes(
					"redirect_uri=https%3A%2F%2Fapp.example.com%2Fauth%2Fcallback%2Fzitadel",
				);
			then.status(200).header("content-type", "application/json").json_body(
				serde_json::json!({
					"access_token": "access-1",
					"refresh_token": "refresh-1",
					"id_token": "jwt-1",
					"token_type": "Bearer",
					"expires_in": 300,
				}),
			);
		})
		.await;
	let user_info_mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/oidc/v1/userinfo")
				.header("authorization", "Bearer access-1");
			then.status(200).header("content-type", "application/json").json_body(
				serde_json::json!({
					"sub": "user-1",
					"name": "Jane Doe",
					"email": "jane@example.com",
					"picture": "https://example.com/jane.png",
				}),
			);
		})
		.await;
	let query = CallbackQuery { code: Some("code-42".into()), state: Some(state) };
	let outcome = relier.complete_sign_in(&id, &query).await;

	token_mock.assert_async().await;
	user_info_mock.assert_async().await;

	assert_eq!(outcome, CallbackOutcome::SignedIn { target: "/profile".into() });

	let data = load_session(&store, &id).await;
	let identity = data.identity.clone().expect("Callback should persist the identity.");

	assert_eq!(identity.subject.as_deref(), Some("user-1"));
	assert_eq!(identity.email.as_deref(), Some("jane@example.com"));
	assert_eq!(data.access_token.as_ref().map(|secret| secret.expose()), Some("access-1"));
	assert_eq!(data.refresh_token.as_ref().map(|secret| secret.expose()), Some("refresh-1"));
	assert_eq!(data.id_token.as_ref().map(|secret| secret.expose()), Some("jwt-1"));

	let now = time::OffsetDateTime::now_utc();
	let expires_at = data.expires_at.expect("Callback should persist the expiry.");

	assert!(expires_at > now + time::Duration::seconds(200));
	assert!(expires_at <= now + time::Duration::seconds(300));
	assert_eq!(data.pkce_verifier, None);
	assert_eq!(data.sign_in_state, None);
}

#[tokio::test]
async fn missing_id_token_fails_closed() {
	let server = MockServer::start_async().await;
	let (relier, store) = build_relier(&server);
	let id = session_id("session-no-id-token");
	let (_verifier, state) = pending_callback(&relier, &store, &id).await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/v2/token");
			then.status(200).header("content-type", "application/json").json_body(
				serde_json::json!({
					"access_token": "access-1",
					"token_type": "Bearer",
					"expires_in": 300,
				}),
			);
		})
		.await;
	let user_info_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/oidc/v1/userinfo");
			then.status(200).json_body(serde_json::json!({ "sub": "user-1" }));
		})
		.await;
	let query = CallbackQuery { code: Some("code-42".into()), state: Some(state) };
	let outcome = relier.complete_sign_in(&id, &query).await;

	token_mock.assert_async().await;

	assert_eq!(user_info_mock.hits_async().await, 0);
	assert_eq!(
		outcome,
		CallbackOutcome::Failed {
			code: AuthErrorCode::MissingIdToken,
			target: "/auth/error?error=missing_id_token".into(),
		}
	);

	// Fail closed: no session fields may be written.
	let data = load_session(&store, &id).await;

	assert!(!data.is_authenticated());
	assert_eq!(data.access_token, None);
	assert_eq!(data.refresh_token, None);
	assert_eq!(data.id_token, None);
	assert_eq!(data.expires_at, None);
}

#[tokio::test]
async fn provider_rejection_surfaces_as_an_opaque_code() {
	let server = MockServer::start_async().await;
	let (relier, store) = build_relier(&server);
	let id = session_id("session-rejected");
	let (_verifier, state) = pending_callback(&relier, &store, &id).await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/v2/token");
			then.status(400)
				.header("content-type", "application/json")
				.json_body(serde_json::json!({ "error": "invalid_grant" }));
		})
		.await;
	let query = CallbackQuery { code: Some("code-42".into()), state: Some(state) };
	let outcome = relier.complete_sign_in(&id, &query).await;

	token_mock.assert_async().await;

	assert_eq!(
		outcome,
		CallbackOutcome::Failed {
			code: AuthErrorCode::ProviderRejection,
			target: "/auth/error?error=provider_rejection".into(),
		}
	);
	assert!(!load_session(&store, &id).await.is_authenticated());
}

#[tokio::test]
async fn state_mismatch_never_reaches_the_provider() {
	let server = MockServer::start_async().await;
	let (relier, store) = build_relier(&server);
	let id = session_id("session-mismatch");
	let (_verifier, _state) = pending_callback(&relier, &store, &id).await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/v2/token");
			then.status(200);
		})
		.await;
	let query = CallbackQuery { code: Some("code-42".into()), state: Some("forged".into()) };
	let outcome = relier.complete_sign_in(&id, &query).await;

	assert_eq!(token_mock.hits_async().await, 0);
	assert!(matches!(
		outcome,
		CallbackOutcome::Failed { code: AuthErrorCode::Generic, .. }
	));
}

#[tokio::test]
async fn replayed_callbacks_find_no_verifier() {
	let server = MockServer::start_async().await;
	let (relier, store) = build_relier(&server);
	let id = session_id("session-replay");
	let (_verifier, state) = pending_callback(&relier, &store, &id).await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/v2/token");
			then.status(400).json_body(serde_json::json!({ "error": "invalid_grant" }));
		})
		.await;
	let query = CallbackQuery { code: Some("code-42".into()), state: Some(state) };

	relier.complete_sign_in(&id, &query).await;

	// The verifier was consumed by the failed attempt; the replay must not call out.
	let outcome = relier.complete_sign_in(&id, &query).await;

	assert_eq!(token_mock.hits_async().await, 1);
	assert!(matches!(
		outcome,
		CallbackOutcome::Failed { code: AuthErrorCode::Generic, .. }
	));
}

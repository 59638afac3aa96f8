//! ZITADEL provider adapter.
//!
//! Encodes the instance's protocol deviations: the token endpoint requires HTTP Basic
//! client authentication for the authorization-code grant (credentials in the form body
//! are rejected with a 400), the refresh grant expects credentials in the form body
//! instead, and every authorization request must carry the `openid` scope or the
//! provider issues no ID token.

// crates.io
use oauth2::{
	AuthType, AuthUrl, AuthorizationCode, Client, ClientId, ClientSecret, EndpointNotSet,
	EndpointSet, ExtraTokenFields, HttpClientError, PkceCodeVerifier, RedirectUrl, RefreshToken,
	RequestTokenError, StandardRevocableToken, StandardTokenResponse, TokenResponse as _,
	TokenUrl,
	basic::{
		BasicErrorResponse, BasicRequestTokenError, BasicRevocationErrorResponse,
		BasicTokenIntrospectionResponse, BasicTokenType,
	},
	http::{
		Method, Request,
		header::{ACCEPT, AUTHORIZATION},
	},
};
// self
use crate::{
	_prelude::*,
	auth::{RawClaims, ScopeSet, TokenExchange, TokenSecret},
	config::ProviderConfig,
	error::ConfigError,
	http::{self, ResponseMetadata, ResponseMetadataSlot, TokenHttpClient},
	provider::{AdapterFuture, PkceChallenge, ProviderAdapter, TransportErrorMapper},
};
#[cfg(feature = "reqwest")]
use crate::{http::ReqwestHttpClient, provider::ReqwestTransportErrorMapper};

const AUTHORIZE_PATH: &str = "/oauth/v2/authorize";
const TOKEN_PATH: &str = "/oauth/v2/token";
const USERINFO_PATH: &str = "/oidc/v1/userinfo";
const END_SESSION_PATH: &str = "/oidc/v1/end_session";

/// Extra token endpoint fields: ZITADEL returns the OIDC `id_token` alongside the
/// access token whenever `openid` was granted.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IdTokenFields {
	/// Raw JWT asserting the end-user identity.
	pub id_token: Option<String>,
}
impl ExtraTokenFields for IdTokenFields {}

/// Token endpoint response carrying the standard fields plus the ID token.
pub type ZitadelTokenResponse = StandardTokenResponse<IdTokenFields, BasicTokenType>;

type ConfiguredOidcClient = Client<
	BasicErrorResponse,
	ZitadelTokenResponse,
	BasicTokenIntrospectionResponse,
	StandardRevocableToken,
	BasicRevocationErrorResponse,
	EndpointSet,
	EndpointNotSet,
	EndpointNotSet,
	EndpointNotSet,
	EndpointSet,
>;

/// Resolved endpoint set derived from the instance domain.
#[derive(Clone, Debug)]
struct ZitadelEndpoints {
	authorization: Url,
	token: Url,
	user_info: Url,
	end_session: Url,
}
impl ZitadelEndpoints {
	fn from_domain(domain: &Url) -> Result<Self, ConfigError> {
		let join = |path: &str| {
			domain.join(path).map_err(|source| ConfigError::InvalidEndpoint { source })
		};

		Ok(Self {
			authorization: join(AUTHORIZE_PATH)?,
			token: join(TOKEN_PATH)?,
			user_info: join(USERINFO_PATH)?,
			end_session: join(END_SESSION_PATH)?,
		})
	}
}

/// [`ProviderAdapter`] implementation for a ZITADEL instance.
///
/// Two differently configured OAuth clients encode the client-auth quirk: the code
/// exchange authenticates via the `Authorization: Basic` header while the refresh grant
/// posts credentials in the form body.
#[derive(Clone)]
pub struct ZitadelAdapter<C = ReqwestHttpClient, M = ReqwestTransportErrorMapper>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	endpoints: ZitadelEndpoints,
	client_id: String,
	redirect_url: Url,
	post_logout_url: Url,
	scopes: ScopeSet,
	exchange_client: ConfiguredOidcClient,
	refresh_client: ConfiguredOidcClient,
	http_client: Arc<C>,
	transport_mapper: Arc<M>,
}
impl<C, M> ZitadelAdapter<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates an adapter that reuses the caller-provided transport + mapper pair.
	pub fn with_http_client(
		config: ProviderConfig,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Result<Self> {
		let endpoints = ZitadelEndpoints::from_domain(&config.domain)?;
		let scopes = config.scopes.with_oidc_required();
		let auth_url = AuthUrl::new(endpoints.authorization.to_string())
			.map_err(|source| ConfigError::InvalidEndpoint { source })?;
		let token_url = TokenUrl::new(endpoints.token.to_string())
			.map_err(|source| ConfigError::InvalidEndpoint { source })?;
		let redirect_url = RedirectUrl::new(config.redirect_url.to_string())
			.map_err(|source| ConfigError::InvalidRedirect { source })?;
		let base = Client::new(ClientId::new(config.client_id.clone()))
			.set_client_secret(ClientSecret::new(config.client_secret.expose().to_owned()))
			.set_auth_uri(auth_url)
			.set_token_uri(token_url)
			.set_redirect_uri(redirect_url);
		let exchange_client = base.clone();
		let refresh_client = base.set_auth_type(AuthType::RequestBody);

		Ok(Self {
			endpoints,
			client_id: config.client_id,
			redirect_url: config.redirect_url,
			post_logout_url: config.post_logout_url,
			scopes,
			exchange_client,
			refresh_client,
			http_client: http_client.into(),
			transport_mapper: mapper.into(),
		})
	}

	/// Final scope set sent with every authorization request.
	pub fn scopes(&self) -> &ScopeSet {
		&self.scopes
	}
}
#[cfg(feature = "reqwest")]
impl ZitadelAdapter<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates an adapter backed by the crate's default reqwest transport.
	pub fn new(config: ProviderConfig) -> Result<Self> {
		Self::with_http_client(
			config,
			ReqwestHttpClient::default(),
			Arc::new(ReqwestTransportErrorMapper),
		)
	}
}
impl<C, M> Debug for ZitadelAdapter<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ZitadelAdapter")
			.field("endpoints", &self.endpoints)
			.field("client_id", &self.client_id)
			.field("scopes", &self.scopes)
			.finish()
	}
}
impl<C, M> ProviderAdapter for ZitadelAdapter<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn authorization_url(&self, state: &str, challenge: &PkceChallenge) -> Url {
		let mut url = self.endpoints.authorization.clone();
		let mut pairs = url.query_pairs_mut();

		pairs.append_pair("response_type", "code");
		pairs.append_pair("client_id", &self.client_id);
		pairs.append_pair("redirect_uri", self.redirect_url.as_str());
		pairs.append_pair("scope", &self.scopes.normalized());
		pairs.append_pair("state", state);
		pairs.append_pair("code_challenge", &challenge.value);
		pairs.append_pair("code_challenge_method", challenge.method.as_str());

		drop(pairs);

		url
	}

	fn exchange_code<'a>(
		&'a self,
		code: &'a str,
		pkce_verifier: &'a str,
	) -> AdapterFuture<'a, TokenExchange> {
		let meta = ResponseMetadataSlot::default();

		Box::pin(async move {
			let instrumented = self.http_client.with_metadata(meta.clone());
			let response = self
				.exchange_client
				.exchange_code(AuthorizationCode::new(code.to_owned()))
				.set_pkce_verifier(PkceCodeVerifier::new(pkce_verifier.to_owned()))
				.request_async(&instrumented)
				.await
				.map_err(|err| {
					map_request_error(meta.take(), err, self.transport_mapper.as_ref())
				})?;

			Ok(map_token_response(response))
		})
	}

	fn refresh_token<'a>(&'a self, refresh_token: &'a str) -> AdapterFuture<'a, TokenExchange> {
		let meta = ResponseMetadataSlot::default();

		Box::pin(async move {
			let instrumented = self.http_client.with_metadata(meta.clone());
			let secret = RefreshToken::new(refresh_token.to_owned());
			let response = self
				.refresh_client
				.exchange_refresh_token(&secret)
				.request_async(&instrumented)
				.await
				.map_err(|err| {
					map_request_error(meta.take(), err, self.transport_mapper.as_ref())
				})?;

			Ok(map_token_response(response))
		})
	}

	fn fetch_user_info<'a>(&'a self, access_token: &'a str) -> AdapterFuture<'a, RawClaims> {
		let meta = ResponseMetadataSlot::default();

		Box::pin(async move {
			let instrumented = self.http_client.with_metadata(meta.clone());
			let request = Request::builder()
				.method(Method::GET)
				.uri(self.endpoints.user_info.as_str())
				.header(AUTHORIZATION, format!("Bearer {access_token}"))
				.header(ACCEPT, "application/json")
				.body(Vec::new())
				.map_err(ConfigError::from)?;
			let response = oauth2::AsyncHttpClient::call(&instrumented, request)
				.await
				.map_err(|err| {
					self.transport_mapper.map_transport_error(meta.take().as_ref(), err)
				})?;
			let status = response.status();

			if !status.is_success() {
				return Err(Error::ProviderRejection {
					status: Some(status.as_u16()),
					body: Some(String::from_utf8_lossy(response.body()).into_owned()),
				});
			}

			let deserializer = &mut serde_json::Deserializer::from_slice(response.body());
			let claims: RawClaims = serde_path_to_error::deserialize(deserializer)
				.map_err(|source| Error::MalformedResponse {
					source,
					status: Some(status.as_u16()),
				})?;

			Ok(claims)
		})
	}

	fn end_session_url(&self, id_token: &str, state: &str) -> Url {
		let mut url = self.endpoints.end_session.clone();
		let mut pairs = url.query_pairs_mut();

		pairs.append_pair("id_token_hint", id_token);
		pairs.append_pair("post_logout_redirect_uri", self.post_logout_url.as_str());
		pairs.append_pair("state", state);

		drop(pairs);

		url
	}
}

fn map_token_response(response: ZitadelTokenResponse) -> TokenExchange {
	let access_token = TokenSecret::new(response.access_token().secret().clone());
	let refresh_token =
		response.refresh_token().map(|token| TokenSecret::new(token.secret().clone()));
	let id_token = response.extra_fields().id_token.clone().map(TokenSecret::new);
	let expires_in = response
		.expires_in()
		.and_then(|value| i64::try_from(value.as_secs()).ok())
		.map(Duration::seconds);

	TokenExchange { access_token, refresh_token, id_token, expires_in }
}

fn map_request_error<E, M>(
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<E>>,
	mapper: &M,
) -> Error
where
	E: 'static + Send + Sync + StdError,
	M: ?Sized + TransportErrorMapper<E>,
{
	let meta_ref = meta.as_ref();
	let status = meta_ref.and_then(|value| value.status);

	match err {
		RequestTokenError::ServerResponse(response) => {
			let body = meta_ref
				.and_then(|value| value.body_preview.clone())
				.or_else(|| Some(format_oauth_error(&response)));

			Error::ProviderRejection { status, body }
		},
		RequestTokenError::Request(error) => mapper.map_transport_error(meta_ref, error),
		RequestTokenError::Parse(source, body) => match status {
			// A non-success body is frequently not valid token JSON at all; that is a
			// rejection, not a decoding defect.
			Some(code) if !(200..300).contains(&code) => Error::ProviderRejection {
				status: Some(code),
				body: Some(http::truncate_preview(String::from_utf8_lossy(&body).into_owned())),
			},
			_ => Error::MalformedResponse { source, status },
		},
		RequestTokenError::Other(message) => {
			Error::ProviderRejection { status, body: Some(message) }
		},
	}
}

fn format_oauth_error(response: &BasicErrorResponse) -> String {
	match response.error_description() {
		Some(description) => format!("{}: {description}", response.error()),
		None => response.error().to_string(),
	}
}

#[cfg(all(test, feature = "reqwest"))]
mod tests {
	// self
	use super::*;
	use crate::provider::PkceCodeChallengeMethod;

	fn test_adapter() -> ZitadelAdapter {
		let config = ProviderConfig::new(
			Url::parse("https://issuer.example.com").expect("Domain fixture should parse."),
			"client-1",
			"secret-1",
			Url::parse("https://app.example.com/auth/callback/zitadel")
				.expect("Redirect fixture should parse."),
			Url::parse("https://app.example.com/auth/logout/callback")
				.expect("Post-logout fixture should parse."),
		)
		.with_scopes(
			ScopeSet::new(["openid", "urn:zitadel:iam:org:projects:roles"])
				.expect("Scope fixture should be valid."),
		);

		ZitadelAdapter::new(config).expect("Adapter fixture should build.")
	}

	fn query_value(url: &Url, key: &str) -> Option<String> {
		url.query_pairs().find(|(name, _)| name == key).map(|(_, value)| value.into_owned())
	}

	#[test]
	fn authorization_url_carries_the_full_handshake() {
		let adapter = test_adapter();
		let challenge =
			PkceChallenge { value: "challenge-42".into(), method: PkceCodeChallengeMethod::S256 };
		let url = adapter.authorization_url("state-42", &challenge);

		assert!(url.as_str().starts_with("https://issuer.example.com/oauth/v2/authorize?"));
		assert_eq!(query_value(&url, "response_type").as_deref(), Some("code"));
		assert_eq!(query_value(&url, "client_id").as_deref(), Some("client-1"));
		assert_eq!(
			query_value(&url, "scope").as_deref(),
			Some("openid urn:zitadel:iam:org:projects:roles profile email")
		);
		assert_eq!(query_value(&url, "state").as_deref(), Some("state-42"));
		assert_eq!(query_value(&url, "code_challenge").as_deref(), Some("challenge-42"));
		assert_eq!(query_value(&url, "code_challenge_method").as_deref(), Some("S256"));
	}

	#[test]
	fn end_session_url_carries_the_logout_handshake() {
		let adapter = test_adapter();
		let url = adapter.end_session_url("jwt-id-token", "logout-state");

		assert!(url.as_str().starts_with("https://issuer.example.com/oidc/v1/end_session?"));
		assert_eq!(query_value(&url, "id_token_hint").as_deref(), Some("jwt-id-token"));
		assert_eq!(
			query_value(&url, "post_logout_redirect_uri").as_deref(),
			Some("https://app.example.com/auth/logout/callback")
		);
		assert_eq!(query_value(&url, "state").as_deref(), Some("logout-state"));
	}

	#[test]
	fn forced_scopes_survive_empty_configuration() {
		let config = ProviderConfig::new(
			Url::parse("https://issuer.example.com").expect("Domain fixture should parse."),
			"client-1",
			"secret-1",
			Url::parse("https://app.example.com/cb").expect("Redirect fixture should parse."),
			Url::parse("https://app.example.com/done").expect("Post-logout fixture should parse."),
		);
		let adapter = ZitadelAdapter::new(config).expect("Adapter fixture should build.");

		assert_eq!(adapter.scopes().normalized(), "openid profile email");
	}
}

//! Provider adapter contract and the built-in ZITADEL implementation.
//!
//! The adapter boundary isolates one identity provider's protocol deviations
//! (client-auth quirks, forced scopes, endpoint layout) so the flow controller stays
//! protocol-generic: another provider can be substituted without touching any
//! orchestration logic.

pub mod zitadel;

pub use zitadel::*;

// crates.io
use oauth2::HttpClientError;
// self
use crate::{
	_prelude::*,
	auth::{Identity, RawClaims, TokenExchange},
	http::ResponseMetadata,
};
#[cfg(feature = "reqwest")] use crate::error::{ConfigError, TransportError};

/// Future alias for adapter operations.
pub type AdapterFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// Supported PKCE challenge methods surfaced to authorization requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PkceCodeChallengeMethod {
	/// SHA-256 based PKCE (RFC 7636 S256).
	S256,
}
impl PkceCodeChallengeMethod {
	/// Returns the RFC 7636 identifier for the challenge method.
	pub fn as_str(self) -> &'static str {
		match self {
			PkceCodeChallengeMethod::S256 => "S256",
		}
	}
}

/// Derived PKCE challenge sent with the authorization request.
///
/// Only the challenge crosses the adapter boundary; the secret verifier stays with the
/// in-flight sign-in attempt.
#[derive(Clone, Debug)]
pub struct PkceChallenge {
	/// Challenge value derived from the verifier.
	pub value: String,
	/// Method used to derive the challenge.
	pub method: PkceCodeChallengeMethod,
}

/// Capability interface implemented once per identity provider.
///
/// Flows depend only on this trait, which keeps them protocol-generic while each
/// implementation encodes its provider's quirks (ZITADEL: Basic-auth code exchange,
/// body-credential refresh, forced `openid` scope).
pub trait ProviderAdapter: Send + Sync {
	/// Builds the authorization URL the end-user is redirected to.
	fn authorization_url(&self, state: &str, challenge: &PkceChallenge) -> Url;

	/// Exchanges an authorization code (plus its PKCE verifier) for tokens.
	fn exchange_code<'a>(
		&'a self,
		code: &'a str,
		pkce_verifier: &'a str,
	) -> AdapterFuture<'a, TokenExchange>;

	/// Redeems a refresh token for a replacement token set.
	fn refresh_token<'a>(&'a self, refresh_token: &'a str) -> AdapterFuture<'a, TokenExchange>;

	/// Fetches the raw UserInfo claim set with bearer authentication.
	fn fetch_user_info<'a>(&'a self, access_token: &'a str) -> AdapterFuture<'a, RawClaims>;

	/// Maps a raw claim set onto the crate identity model.
	///
	/// Missing claims become `None`; the mapping never fails.
	fn map_identity(&self, claims: RawClaims) -> Identity {
		Identity::from_claims(claims)
	}

	/// Builds the provider's end-session URL for federated logout.
	fn end_session_url(&self, id_token: &str, state: &str) -> Url;
}

/// Maps HTTP transport failures into relying-party [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport into a crate error.
	fn map_transport_error(
		&self,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<E>,
	) -> Error;
}

/// Default mapper for reqwest-backed transports.
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		_meta: Option<&ResponseMetadata>,
		err: HttpClientError<ReqwestError>,
	) -> Error {
		match err {
			HttpClientError::Reqwest(inner) => TransportError::from(*inner).into(),
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => TransportError::Io(inner).into(),
			HttpClientError::Other(message) => TransportError::Unexpected { message }.into(),
			_ => TransportError::Unexpected {
				message: "Transport reported an unclassified failure.".into(),
			}
			.into(),
		}
	}
}

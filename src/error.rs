//! Relying-party error types shared across flows, the provider adapter, and session stores.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical relying-party error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Session-storage failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::session::SessionStoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Token endpoint response carried no `id_token`.
	///
	/// Fatal to the sign-in flow: the ID token is the identity assertion and is required
	/// for federated logout, so no session is materialized without one.
	#[error("Token endpoint response is missing the id_token.")]
	MissingIdToken,
	/// Authorization callback arrived without a usable handshake context.
	#[error("Authorization callback is invalid: {reason}.")]
	InvalidCallback {
		/// Which precondition failed (missing code, missing verifier, state mismatch).
		reason: &'static str,
	},
	/// Provider answered with a non-success status during an exchange or UserInfo call.
	#[error("Provider rejected the request with status {}.", .status.map_or_else(|| "unknown".to_owned(), |code| code.to_string()))]
	ProviderRejection {
		/// HTTP status code returned by the provider, when the transport captured one.
		status: Option<u16>,
		/// Raw response body, kept for server-side logs and the UserInfo proxy.
		body: Option<String>,
	},
	/// Provider answered with a success status but an undecodable payload.
	#[error("Provider returned a malformed response.")]
	MalformedResponse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
}

/// Configuration and validation failures raised by the relying party.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Provider domain does not yield a valid endpoint URL.
	#[error("Provider domain does not yield a valid endpoint URL.")]
	InvalidEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Redirect URI cannot be parsed.
	#[error("Redirect URI is invalid.")]
	InvalidRedirect {
		/// Underlying parsing failure.
		#[source]
		source: oauth2::url::ParseError,
	},
	/// Requested scopes cannot be normalized.
	#[error("Requested scopes are invalid.")]
	InvalidScope(#[from] crate::auth::ScopeValidationError),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the provider.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the provider.")]
	Io(#[from] std::io::Error),
	/// HTTP client reported a failure without a structured error value.
	#[error("HTTP client failed while calling the provider: {message}.")]
	Unexpected {
		/// Transport-supplied message summarizing the failure.
		message: String,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

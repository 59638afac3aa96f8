//! Session records, storage contracts, and the built-in memory backend.

pub mod memory;

pub use memory::MemorySessionStore;

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::{
	_prelude::*,
	auth::{Identity, TokenSecret},
};

const SESSION_ID_MAX_LEN: usize = 128;

/// Error returned when session identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum SessionIdError {
	/// The identifier was empty.
	#[error("Session identifier cannot be empty.")]
	Empty,
	/// The identifier contains whitespace characters.
	#[error("Session identifier contains whitespace.")]
	ContainsWhitespace,
	/// The identifier exceeded the allowed character count.
	#[error("Session identifier exceeds {max} characters.")]
	TooLong {
		/// Maximum permitted character count.
		max: usize,
	},
}

/// Opaque identifier for one browser session, typically the session cookie value.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionId(String);
impl SessionId {
	/// Creates a new identifier after validation.
	pub fn new(value: impl AsRef<str>) -> Result<Self, SessionIdError> {
		let view = value.as_ref();

		validate_view(view)?;

		Ok(Self(view.to_owned()))
	}
}
impl Deref for SessionId {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for SessionId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl From<SessionId> for String {
	fn from(value: SessionId) -> Self {
		value.0
	}
}
impl TryFrom<String> for SessionId {
	type Error = SessionIdError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		validate_view(&value)?;

		Ok(Self(value))
	}
}
impl Borrow<str> for SessionId {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl Debug for SessionId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Session({})", self.0)
	}
}
impl Display for SessionId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}
impl FromStr for SessionId {
	type Err = SessionIdError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}

fn validate_view(view: &str) -> Result<(), SessionIdError> {
	if view.is_empty() {
		return Err(SessionIdError::Empty);
	}
	if view.chars().any(char::is_whitespace) {
		return Err(SessionIdError::ContainsWhitespace);
	}
	if view.len() > SESSION_ID_MAX_LEN {
		return Err(SessionIdError::TooLong { max: SESSION_ID_MAX_LEN });
	}

	Ok(())
}

/// Per-user session record owned exclusively by the session store.
///
/// Created at callback success, mutated by the guard on silent refresh, destroyed on
/// logout completion or failed refresh. The record is authenticated if and only if
/// [`identity`](Self::identity) is present — token expiry alone never deauthenticates,
/// it only triggers a refresh attempt.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
	/// Mapped end-user identity; presence defines the authenticated state.
	pub identity: Option<Identity>,
	/// Bearer access token for resource and UserInfo calls.
	pub access_token: Option<TokenSecret>,
	/// Refresh token used by the guard for silent renewal.
	pub refresh_token: Option<TokenSecret>,
	/// Raw OIDC ID token; required to exist after a completed sign-in.
	pub id_token: Option<TokenSecret>,
	/// Absolute access-token expiry, serialized as unix seconds.
	#[serde(default, with = "time::serde::timestamp::option")]
	pub expires_at: Option<OffsetDateTime>,
	/// Transient PKCE verifier owned by the in-flight sign-in attempt; single-use.
	pub pkce_verifier: Option<TokenSecret>,
	/// Transient sign-in CSRF state; single-use.
	pub sign_in_state: Option<String>,
	/// Transient logout CSRF state; single-use.
	pub logout_state: Option<String>,
}
impl SessionData {
	/// Returns true when the record carries an identity.
	pub fn is_authenticated(&self) -> bool {
		self.identity.is_some()
	}

	/// Consumes the sign-in transients (PKCE verifier + state).
	///
	/// Both values are single-use: they must be taken exactly once per callback,
	/// whatever the outcome, to prevent replay.
	pub fn take_sign_in_transients(&mut self) -> (Option<TokenSecret>, Option<String>) {
		(self.pkce_verifier.take(), self.sign_in_state.take())
	}

	/// Consumes the logout state. Single-use, whatever the comparison outcome.
	pub fn take_logout_state(&mut self) -> Option<String> {
		self.logout_state.take()
	}
}

/// Future alias for session store operations.
pub type SessionFuture<'a, T> =
	Pin<Box<dyn Future<Output = Result<T, SessionStoreError>> + 'a + Send>>;

/// Storage backend contract for per-user session records.
///
/// A record is scoped to one browser session and never shared across users; backends
/// range from in-process maps to cookie or cache stores chosen by the embedder.
pub trait SessionStore: Send + Sync {
	/// Fetches the record associated with the session, if present.
	fn load<'a>(&'a self, id: &'a SessionId) -> SessionFuture<'a, Option<SessionData>>;

	/// Persists or replaces the record for the session.
	fn save<'a>(&'a self, id: &'a SessionId, data: SessionData) -> SessionFuture<'a, ()>;

	/// Destroys the record for the session.
	fn clear<'a>(&'a self, id: &'a SessionId) -> SessionFuture<'a, ()>;
}

/// Error type produced by [`SessionStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum SessionStoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

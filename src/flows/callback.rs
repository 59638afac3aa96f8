//! Authorization callback: code exchange, the ID-token gate, and session
//! materialization.

// self
use crate::{
	_prelude::*,
	flows::{RelyingParty, common},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	session::SessionId,
};

/// Query parameters delivered to the authorization callback.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CallbackQuery {
	/// Authorization code issued by the provider.
	pub code: Option<String>,
	/// Round-tripped sign-in state.
	pub state: Option<String>,
}

/// Opaque error codes surfaced to the error page after a failed sign-in.
///
/// Raw failure details never reach the user; they are logged server-side and the
/// error page resolves these codes through [`crate::messages::describe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthErrorCode {
	/// Provider omitted the ID token; the flow fails closed.
	MissingIdToken,
	/// Provider answered an exchange with a non-success status.
	ProviderRejection,
	/// Any other failure during the handshake.
	Generic,
}
impl AuthErrorCode {
	/// Returns the stable code carried in the error-page query string.
	pub const fn as_str(self) -> &'static str {
		match self {
			AuthErrorCode::MissingIdToken => "missing_id_token",
			AuthErrorCode::ProviderRejection => "provider_rejection",
			AuthErrorCode::Generic => "generic_error",
		}
	}
}
impl Display for AuthErrorCode {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl From<&Error> for AuthErrorCode {
	fn from(err: &Error) -> Self {
		match err {
			Error::MissingIdToken => AuthErrorCode::MissingIdToken,
			Error::ProviderRejection { .. } => AuthErrorCode::ProviderRejection,
			_ => AuthErrorCode::Generic,
		}
	}
}

/// Outcome of the authorization callback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallbackOutcome {
	/// Session established; redirect to the landing page.
	SignedIn {
		/// Application path to redirect to.
		target: String,
	},
	/// Handshake failed; redirect to the error page with an opaque code.
	Failed {
		/// Code the error page resolves into a user-facing message.
		code: AuthErrorCode,
		/// Application path to redirect to.
		target: String,
	},
}

impl RelyingParty {
	/// Completes the sign-in handshake for the session.
	///
	/// Consumes the pending PKCE verifier and sign-in state before any provider call,
	/// exchanges the code, and fails closed when the provider omits the `id_token`: no
	/// session fields are written without the identity assertion. Every failure —
	/// provider, transport, or storage — is converted into an error-page redirect with
	/// an opaque code; details are only logged.
	pub async fn complete_sign_in(
		&self,
		session_id: &SessionId,
		query: &CallbackQuery,
	) -> CallbackOutcome {
		const KIND: FlowKind = FlowKind::Callback;

		let span = FlowSpan::new(KIND, "complete_sign_in");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		match span.instrument(self.try_complete_sign_in(session_id, query)).await {
			Ok(target) => {
				obs::record_flow_outcome(KIND, FlowOutcome::Success);

				CallbackOutcome::SignedIn { target }
			},
			Err(err) => {
				log_callback_failure(&err);
				obs::record_flow_outcome(KIND, FlowOutcome::Failure);

				let code = AuthErrorCode::from(&err);

				CallbackOutcome::Failed { code, target: self.routes.error_with_code(code.as_str()) }
			},
		}
	}

	async fn try_complete_sign_in(
		&self,
		session_id: &SessionId,
		query: &CallbackQuery,
	) -> Result<String> {
		let guard = common::session_guard(self, session_id);
		let _serialized = guard.lock().await;
		let mut data = self.store.load(session_id).await?.unwrap_or_default();
		let (verifier, expected_state) = data.take_sign_in_transients();

		// The verifier and state are single-use: persist the consumption before any
		// provider call so a replayed callback finds nothing to reuse.
		self.store.save(session_id, data.clone()).await?;

		let verifier =
			verifier.ok_or(Error::InvalidCallback { reason: "no sign-in attempt is pending" })?;
		let expected_state =
			expected_state.ok_or(Error::InvalidCallback { reason: "no sign-in state is pending" })?;
		let returned_state = query.state.as_deref().unwrap_or_default();

		if returned_state.is_empty() || returned_state != expected_state {
			return Err(Error::InvalidCallback { reason: "state mismatch" });
		}

		let code = query
			.code
			.as_deref()
			.ok_or(Error::InvalidCallback { reason: "no authorization code" })?;
		let exchange = self.adapter.exchange_code(code, verifier.expose()).await?;
		let id_token = exchange.id_token.clone().ok_or(Error::MissingIdToken)?;
		let claims = self.adapter.fetch_user_info(exchange.access_token.expose()).await?;
		let identity = self.adapter.map_identity(claims);
		let expires_at =
			OffsetDateTime::now_utc() + exchange.expires_in.unwrap_or(self.default_token_ttl);

		data.identity = Some(identity);
		data.access_token = Some(exchange.access_token);
		data.refresh_token = exchange.refresh_token;
		data.id_token = Some(id_token);
		data.expires_at = Some(expires_at);

		self.store.save(session_id, data).await?;

		Ok(self.routes.profile.clone())
	}
}

#[cfg(feature = "tracing")]
fn log_callback_failure(err: &Error) {
	match err {
		Error::MissingIdToken => tracing::error!(
			"Provider did not return an id_token; check that the openid scope is granted."
		),
		Error::ProviderRejection { status, body } =>
			tracing::error!(?status, ?body, "Provider rejected the sign-in exchange."),
		err => tracing::error!(error = %err, "Unexpected error during the sign-in callback."),
	}
}
#[cfg(not(feature = "tracing"))]
fn log_callback_failure(_err: &Error) {}

//! Logout handshake: provider-initiated end-session with CSRF-safe state matching.

// self
use crate::{
	_prelude::*,
	flows::{RelyingParty, common},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	session::SessionId,
};

const NO_SESSION_MESSAGE: &str = "No valid session or ID token found";
const INVALID_STATE_REASON: &str = "Invalid or missing state parameter.";

/// Outcome of a logout initiation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogoutInitiation {
	/// Redirect the end-user to the provider's end-session endpoint.
	Redirect {
		/// Fully-formed end-session URL.
		url: Url,
	},
	/// No ID token in session; no outbound request was made.
	NoSession {
		/// Home page target.
		target: String,
		/// User-visible flash message.
		message: &'static str,
	},
}

/// Outcome of the logout callback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogoutCompletion {
	/// State matched; the whole session has been destroyed.
	Success {
		/// Logout success page target.
		target: String,
	},
	/// State missing or mismatched; the session record is left untouched.
	Failure {
		/// Logout error page target carrying the reason.
		target: String,
	},
}

impl RelyingParty {
	/// Initiates the federated logout handshake.
	///
	/// An ID token is required: without one there is no provider session to terminate,
	/// so the user is sent home with a flash message and no outbound request is made.
	/// Otherwise a fresh logout state is stored in the session and the end-session
	/// redirect is returned.
	pub async fn start_logout(&self, session_id: &SessionId) -> Result<LogoutInitiation> {
		const KIND: FlowKind = FlowKind::Logout;

		let span = FlowSpan::new(KIND, "start_logout");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let guard = common::session_guard(self, session_id);
				let _serialized = guard.lock().await;
				let mut data = self.store.load(session_id).await?.unwrap_or_default();
				let Some(id_token) = data.id_token.clone() else {
					return Ok(LogoutInitiation::NoSession {
						target: self.routes.home.clone(),
						message: NO_SESSION_MESSAGE,
					});
				};
				let ticket = self.build_logout_url(id_token.expose());

				data.logout_state = Some(ticket.state);

				self.store.save(session_id, data).await?;

				Ok(LogoutInitiation::Redirect { url: ticket.url })
			})
			.await;

		match &result {
			Ok(LogoutInitiation::Redirect { .. }) =>
				obs::record_flow_outcome(KIND, FlowOutcome::Success),
			_ => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Completes the federated logout handshake.
	///
	/// The stored state is consumed whatever the outcome, so a replayed callback always
	/// lands on the failure path. Byte-exact match of two non-empty states destroys the
	/// whole session; anything else leaves the record untouched apart from the consumed
	/// state.
	pub async fn complete_logout(
		&self,
		session_id: &SessionId,
		returned_state: Option<&str>,
	) -> Result<LogoutCompletion> {
		const KIND: FlowKind = FlowKind::Logout;

		let span = FlowSpan::new(KIND, "complete_logout");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let guard = common::session_guard(self, session_id);
				let _serialized = guard.lock().await;
				let mut data = self.store.load(session_id).await?.unwrap_or_default();
				let stored = data.take_logout_state();
				let returned = returned_state.unwrap_or_default();
				let matched = match stored.as_deref() {
					Some(expected) =>
						!expected.is_empty() && !returned.is_empty() && returned == expected,
					None => false,
				};

				if matched {
					// Destroying the session also consumes the stored state.
					self.store.clear(session_id).await?;

					return Ok(LogoutCompletion::Success {
						target: self.routes.logout_success.clone(),
					});
				}

				log_invalid_state(returned_state.is_some(), stored.is_some());

				// The stored state is single-use even on mismatch.
				self.store.save(session_id, data).await?;

				Ok(LogoutCompletion::Failure {
					target: self.routes.logout_error_with_reason(INVALID_STATE_REASON),
				})
			})
			.await;

		match &result {
			Ok(LogoutCompletion::Success { .. }) =>
				obs::record_flow_outcome(KIND, FlowOutcome::Success),
			_ => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}
}

#[cfg(feature = "tracing")]
fn log_invalid_state(returned_present: bool, stored_present: bool) {
	tracing::warn!(
		returned_present,
		stored_present,
		"Logout callback state did not match; leaving the session untouched."
	);
}
#[cfg(not(feature = "tracing"))]
fn log_invalid_state(_returned_present: bool, _stored_present: bool) {}

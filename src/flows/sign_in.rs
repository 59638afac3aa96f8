//! Sign-in initiation: state + PKCE generation and the authorization redirect.

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	flows::{RelyingParty, common},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	session::SessionId,
};

impl RelyingParty {
	/// Starts the sign-in handshake for the session.
	///
	/// Generates a fresh CSRF state and PKCE pair, persists both as single-use session
	/// transients, and returns the authorization URL the end-user must be redirected
	/// to. The pending callback consumes the transients whatever its outcome.
	pub async fn start_sign_in(&self, session_id: &SessionId) -> Result<Url> {
		const KIND: FlowKind = FlowKind::SignIn;

		let span = FlowSpan::new(KIND, "start_sign_in");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let guard = common::session_guard(self, session_id);
				let _serialized = guard.lock().await;
				let mut data = self.store.load(session_id).await?.unwrap_or_default();
				let state = common::random_string(common::STATE_LEN);
				let pkce = common::PkcePair::generate();
				let authorize_url = self.adapter.authorization_url(&state, pkce.challenge());

				data.sign_in_state = Some(state);
				data.pkce_verifier = Some(TokenSecret::new(pkce.into_verifier()));

				self.store.save(session_id, data).await?;

				Ok(authorize_url)
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}
}

//! Session guard applied to protected requests: identity gate plus silent refresh.

// self
use crate::{
	_prelude::*,
	flows::{RelyingParty, common, refresh},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	session::SessionId,
};

/// Decision produced by the guard for one protected request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardDecision {
	/// The request may proceed; the session was refreshed in place when needed.
	Proceed,
	/// No usable session; redirect to sign-in with the original URL preserved.
	SignInRequired {
		/// Sign-in page target carrying the `callbackUrl` parameter.
		target: String,
	},
}

impl RelyingParty {
	/// Gates one protected request.
	///
	/// Unauthenticated sessions are redirected to sign-in with the requested URL
	/// preserved as the callback target. Expired sessions holding a refresh token are
	/// refreshed silently: on success the access/refresh/expiry fields are overwritten
	/// in place, on failure the whole session is cleared — never partially updated —
	/// and the user is sent back to sign-in. Sessions whose token has not expired pass
	/// unconditionally; expiry time is the sole trust signal, the access token itself
	/// is not re-validated per request.
	pub async fn guard(
		&self,
		session_id: &SessionId,
		requested_url: &str,
	) -> Result<GuardDecision> {
		const KIND: FlowKind = FlowKind::Guard;

		let span = FlowSpan::new(KIND, "guard");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let guard = common::session_guard(self, session_id);
				let _serialized = guard.lock().await;
				let mut data = self.store.load(session_id).await?.unwrap_or_default();

				if !data.is_authenticated() {
					return Ok(GuardDecision::SignInRequired {
						target: self.routes.sign_in_with_callback(requested_url),
					});
				}

				let now = OffsetDateTime::now_utc();

				if refresh::is_token_expired(data.expires_at, now) {
					if let Some(refresh_token) = data.refresh_token.clone() {
						match self.refresh_tokens(refresh_token.expose()).await {
							Some(renewed) => {
								data.access_token = Some(renewed.access_token);
								data.refresh_token = Some(renewed.refresh_token);
								data.expires_at = Some(renewed.expires_at);

								self.store.save(session_id, data).await?;
							},
							None => {
								self.store.clear(session_id).await?;

								return Ok(GuardDecision::SignInRequired {
									target: self.routes.sign_in_with_callback(requested_url),
								});
							},
						}
					}
				}

				Ok(GuardDecision::Proceed)
			})
			.await;

		match &result {
			Ok(GuardDecision::Proceed) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			_ => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}
}

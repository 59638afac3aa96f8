//! Token lifecycle service: expiry detection, silent refresh, logout ticket minting.

mod metrics;

pub use metrics::RefreshMetrics;

// self
use crate::{
	_prelude::*,
	auth::{RefreshedTokens, TokenSecret},
	flows::{RelyingParty, common},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

/// Ticket for the provider's end-session redirect.
#[derive(Clone, Debug)]
pub struct LogoutTicket {
	/// Fully-formed end-session URL to redirect the end-user to.
	pub url: Url,
	/// CSRF state that must round-trip via the logout callback.
	pub state: String,
}

/// Returns true when the expiry instant is absent or has passed.
///
/// Expiry is the sole trust signal evaluated for the access token; a true result
/// triggers a refresh attempt, never a deauthentication.
pub fn is_token_expired(expires_at: Option<OffsetDateTime>, now: OffsetDateTime) -> bool {
	expires_at.is_none_or(|instant| now >= instant)
}

impl RelyingParty {
	/// Redeems the refresh token, normalizing the outcome for session storage.
	///
	/// Returns `None` on any provider or transport failure — callers must treat that
	/// as "refresh failed, re-authenticate". Refresh-token rotation is optional per
	/// provider: when the response omits a replacement, the prior refresh token is
	/// preserved. A single attempt is made; there are no retries.
	pub async fn refresh_tokens(&self, refresh_token: &str) -> Option<RefreshedTokens> {
		const KIND: FlowKind = FlowKind::Refresh;

		let span = FlowSpan::new(KIND, "refresh_tokens");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);
		self.refresh_metrics.record_attempt();

		match span.instrument(self.adapter.refresh_token(refresh_token)).await {
			Ok(exchange) => {
				let expires_at = OffsetDateTime::now_utc()
					+ exchange.expires_in.unwrap_or(self.default_token_ttl);
				let refreshed = RefreshedTokens {
					access_token: exchange.access_token,
					refresh_token: exchange
						.refresh_token
						.unwrap_or_else(|| TokenSecret::new(refresh_token)),
					expires_at,
				};

				obs::record_flow_outcome(KIND, FlowOutcome::Success);
				self.refresh_metrics.record_success();

				Some(refreshed)
			},
			Err(err) => {
				log_refresh_failure(&err);
				obs::record_flow_outcome(KIND, FlowOutcome::Failure);
				self.refresh_metrics.record_failure();

				None
			},
		}
	}

	/// Mints a logout ticket: a fresh CSRF state and the matching end-session URL.
	///
	/// The state is unpredictable (over 128 bits of entropy) and serves purely as a
	/// correlation token between the logout initiation and its callback.
	pub fn build_logout_url(&self, id_token: &str) -> LogoutTicket {
		let _guard = FlowSpan::new(FlowKind::Logout, "build_logout_url").entered();
		let state = common::random_string(common::STATE_LEN);
		let url = self.adapter.end_session_url(id_token, &state);

		LogoutTicket { url, state }
	}
}

#[cfg(feature = "tracing")]
fn log_refresh_failure(err: &Error) {
	tracing::warn!(error = %err, "Refresh token grant failed; the session will be cleared.");
}
#[cfg(not(feature = "tracing"))]
fn log_refresh_failure(_err: &Error) {}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn expiry_predicate_covers_the_contract() {
		let now = OffsetDateTime::now_utc();

		assert!(is_token_expired(None, now));
		assert!(is_token_expired(Some(now - Duration::seconds(1)), now));
		assert!(is_token_expired(Some(now), now));
		assert!(!is_token_expired(Some(now + Duration::seconds(3600)), now));
	}
}

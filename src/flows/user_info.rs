//! Authenticated UserInfo proxy.

// self
use crate::{
	_prelude::*,
	auth::RawClaims,
	flows::RelyingParty,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	session::SessionId,
};

/// Reply for the guarded UserInfo proxy endpoint.
#[derive(Clone, Debug, PartialEq)]
pub enum UserInfoReply {
	/// Live claim set fetched from the provider (HTTP 200).
	Json {
		/// Raw claims to serialize verbatim.
		claims: RawClaims,
	},
	/// No access token in the session (HTTP 401).
	Unauthenticated,
	/// Provider answered non-2xx; its status and body are surfaced verbatim.
	Upstream {
		/// Upstream status code to mirror.
		status: u16,
		/// Upstream response body to mirror.
		body: String,
	},
	/// Transport or decoding failure while contacting the provider (HTTP 500).
	TransportFailed,
}

impl RelyingParty {
	/// Proxies the provider's UserInfo endpoint for the current session.
	///
	/// Always performs a live fetch — claims changed server-side since sign-in are
	/// observable here, unlike the snapshot captured in the session identity.
	pub async fn user_info(&self, session_id: &SessionId) -> Result<UserInfoReply> {
		const KIND: FlowKind = FlowKind::UserInfo;

		let span = FlowSpan::new(KIND, "user_info");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let data = self.store.load(session_id).await?.unwrap_or_default();
				let Some(access_token) = data.access_token else {
					return Ok(UserInfoReply::Unauthenticated);
				};

				match self.adapter.fetch_user_info(access_token.expose()).await {
					Ok(claims) => Ok(UserInfoReply::Json { claims }),
					Err(Error::ProviderRejection { status, body }) => Ok(UserInfoReply::Upstream {
						status: status.unwrap_or(502),
						body: body.unwrap_or_default(),
					}),
					Err(err) => {
						log_user_info_failure(&err);

						Ok(UserInfoReply::TransportFailed)
					},
				}
			})
			.await;

		match &result {
			Ok(UserInfoReply::Json { .. }) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			_ => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}
}

#[cfg(feature = "tracing")]
fn log_user_info_failure(err: &Error) {
	tracing::error!(error = %err, "UserInfo fetch failed.");
}
#[cfg(not(feature = "tracing"))]
fn log_user_info_failure(_err: &Error) {}

//! Optional observability helpers for relying-party flows.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `oidc_rp.flow` with the `flow` and
//!   `stage` (call site) fields.
//! - Enable `metrics` to increment the `oidc_rp_flow_total` counter for every
//!   attempt/success/failure, labeled by `flow` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Flow kinds observed by the relying party.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Sign-in initiation.
	SignIn,
	/// Authorization callback handling.
	Callback,
	/// Session guard evaluation.
	Guard,
	/// Silent token refresh.
	Refresh,
	/// Federated logout handshake.
	Logout,
	/// UserInfo proxy calls.
	UserInfo,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::SignIn => "sign_in",
			FlowKind::Callback => "callback",
			FlowKind::Guard => "guard",
			FlowKind::Refresh => "refresh",
			FlowKind::Logout => "logout",
			FlowKind::UserInfo => "user_info",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a flow operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure or error-path outcome surfaced to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

//! High-level authentication flows powered by the relying-party facade.

pub mod callback;
pub mod common;
pub mod guard;
pub mod logout;
pub mod refresh;
pub mod sign_in;
pub mod user_info;

pub use callback::*;
pub use common::*;
pub use guard::*;
pub use logout::*;
pub use refresh::*;
pub use user_info::*;

// self
use crate::{
	_prelude::*,
	config::AppRoutes,
	provider::ProviderAdapter,
	session::{SessionId, SessionStore},
};

/// Coordinates the relying-party flows against a single provider adapter.
///
/// The facade owns the adapter, session store, application routes, and refresh
/// bookkeeping so individual flow implementations can focus on handshake-specific logic
/// (state + PKCE generation, the ID-token gate, logout state matching, silent refresh).
/// Session read-modify-write sections run under per-session guards so concurrent
/// requests for the same browser session cannot interleave a refresh-then-store.
#[derive(Clone)]
pub struct RelyingParty {
	/// Provider adapter encoding the protocol specifics.
	pub adapter: Arc<dyn ProviderAdapter>,
	/// Session store holding one record per browser session.
	pub store: Arc<dyn SessionStore>,
	/// Application paths used as redirect targets.
	pub routes: AppRoutes,
	/// Token lifetime assumed when the provider omits `expires_in`.
	pub default_token_ttl: Duration,
	/// Shared metrics recorder for refresh outcomes.
	pub refresh_metrics: Arc<RefreshMetrics>,
	session_guards: Arc<Mutex<HashMap<SessionId, Arc<AsyncMutex<()>>>>>,
}
impl RelyingParty {
	const DEFAULT_TOKEN_TTL: Duration = Duration::seconds(3600);

	/// Creates a relying party with default routes and token lifetime.
	pub fn new(store: Arc<dyn SessionStore>, adapter: Arc<dyn ProviderAdapter>) -> Self {
		Self {
			adapter,
			store,
			routes: AppRoutes::default(),
			default_token_ttl: Self::DEFAULT_TOKEN_TTL,
			refresh_metrics: Default::default(),
			session_guards: Default::default(),
		}
	}

	/// Replaces the application route table.
	pub fn with_routes(mut self, routes: AppRoutes) -> Self {
		self.routes = routes;

		self
	}

	/// Overrides the token lifetime assumed when the provider omits `expires_in`.
	pub fn with_default_token_ttl(mut self, ttl: Duration) -> Self {
		self.default_token_ttl = if ttl.is_negative() { Duration::ZERO } else { ttl };

		self
	}
}
impl Debug for RelyingParty {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RelyingParty")
			.field("routes", &self.routes)
			.field("default_token_ttl", &self.default_token_ttl)
			.finish()
	}
}

//! Externally supplied, process-lifetime configuration for the relying party.

// self
use crate::{
	_prelude::*,
	auth::{ScopeSet, TokenSecret},
};

/// Identity-provider registration data. Immutable for the process lifetime.
#[derive(Clone, Debug)]
pub struct ProviderConfig {
	/// Base URL of the provider instance, e.g. `https://issuer.example.com`.
	pub domain: Url,
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// Confidential client secret.
	pub client_secret: TokenSecret,
	/// Redirect URL registered for the authorization callback.
	pub redirect_url: Url,
	/// Redirect URL registered for the post-logout return.
	pub post_logout_url: Url,
	/// Requested scopes; the OIDC base set is forced in on top of these.
	pub scopes: ScopeSet,
}
impl ProviderConfig {
	/// Creates a configuration with an empty scope list.
	pub fn new(
		domain: Url,
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
		redirect_url: Url,
		post_logout_url: Url,
	) -> Self {
		Self {
			domain,
			client_id: client_id.into(),
			client_secret: TokenSecret::new(client_secret),
			redirect_url,
			post_logout_url,
			scopes: ScopeSet::default(),
		}
	}

	/// Replaces the requested scope list.
	pub fn with_scopes(mut self, scopes: ScopeSet) -> Self {
		self.scopes = scopes;

		self
	}
}

/// Application-side paths that flow outcomes redirect to.
///
/// Defaults match the conventional mounting: the embedding router is free to move any
/// page, as long as it updates the matching field here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppRoutes {
	/// Home page.
	pub home: String,
	/// Sign-in page; receives `error` and `callbackUrl` query parameters.
	pub sign_in: String,
	/// Authentication error page; receives an `error` query parameter.
	pub error: String,
	/// Post-sign-in landing page.
	pub profile: String,
	/// Terminal logout success page.
	pub logout_success: String,
	/// Terminal logout error page; receives a `reason` query parameter.
	pub logout_error: String,
}
impl AppRoutes {
	/// Sign-in page target carrying the originally requested URL, URL-encoded.
	pub fn sign_in_with_callback(&self, requested_url: &str) -> String {
		with_query(&self.sign_in, "callbackUrl", requested_url)
	}

	/// Error page target carrying an opaque error code.
	pub fn error_with_code(&self, code: &str) -> String {
		with_query(&self.error, "error", code)
	}

	/// Logout error page target carrying a user-visible reason.
	pub fn logout_error_with_reason(&self, reason: &str) -> String {
		with_query(&self.logout_error, "reason", reason)
	}
}
impl Default for AppRoutes {
	fn default() -> Self {
		Self {
			home: "/".into(),
			sign_in: "/auth/signin".into(),
			error: "/auth/error".into(),
			profile: "/profile".into(),
			logout_success: "/auth/logout/success".into(),
			logout_error: "/auth/logout/error".into(),
		}
	}
}

fn with_query(path: &str, key: &str, value: &str) -> String {
	let query =
		url::form_urlencoded::Serializer::new(String::new()).append_pair(key, value).finish();

	format!("{path}?{query}")
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn callback_targets_are_url_encoded() {
		let routes = AppRoutes::default();

		assert_eq!(routes.sign_in_with_callback("/profile"), "/auth/signin?callbackUrl=%2Fprofile");
		assert_eq!(
			routes.sign_in_with_callback("/profile?tab=tokens"),
			"/auth/signin?callbackUrl=%2Fprofile%3Ftab%3Dtokens"
		);
		assert_eq!(routes.error_with_code("missing_id_token"), "/auth/error?error=missing_id_token");
	}

	#[test]
	fn provider_config_redacts_the_secret() {
		let config = ProviderConfig::new(
			Url::parse("https://issuer.example.com").expect("Domain fixture should parse."),
			"client-1",
			"super-secret",
			Url::parse("https://app.example.com/auth/callback/zitadel")
				.expect("Redirect fixture should parse."),
			Url::parse("https://app.example.com/auth/logout/callback")
				.expect("Post-logout fixture should parse."),
		);

		assert!(!format!("{config:?}").contains("super-secret"));
	}
}

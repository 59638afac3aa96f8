//! Token secrets and transient token-endpoint results.

// self
use crate::_prelude::*;

/// Redacted token secret wrapper keeping sensitive material out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Transient payload returned by the provider's token endpoint.
///
/// Never persisted verbatim: flows normalize it into a session record, computing the
/// absolute expiry instant from [`expires_in`](Self::expires_in) and the configured
/// default lifetime.
#[derive(Clone, Debug)]
pub struct TokenExchange {
	/// Bearer access token for resource and UserInfo calls.
	pub access_token: TokenSecret,
	/// Refresh token, if the provider issued one.
	pub refresh_token: Option<TokenSecret>,
	/// Raw OIDC ID token asserting the end-user identity.
	pub id_token: Option<TokenSecret>,
	/// Relative token lifetime, if the provider supplied one.
	pub expires_in: Option<Duration>,
}

/// Normalized output of a successful refresh grant.
#[derive(Clone, Debug)]
pub struct RefreshedTokens {
	/// Replacement access token.
	pub access_token: TokenSecret,
	/// Refresh token to keep using; the prior one is preserved when the provider omits
	/// rotation.
	pub refresh_token: TokenSecret,
	/// Absolute expiry instant of the replacement access token.
	pub expires_at: OffsetDateTime,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn secret_formatters_redact() {
		let secret = TokenSecret::new("super-secret");

		assert_eq!(format!("{secret:?}"), "TokenSecret(\"<redacted>\")");
		assert_eq!(format!("{secret}"), "<redacted>");
		assert_eq!(secret.expose(), "super-secret");
	}
}

//! End-user identity mapped from raw OIDC claims.

// self
use crate::_prelude::*;

/// Raw claim set as returned by the provider's UserInfo endpoint.
pub type RawClaims = serde_json::Map<String, serde_json::Value>;

/// Mapped end-user identity.
///
/// Standard OIDC claims are lifted into typed fields; the full claim set stays available
/// in [`claims`](Self::claims). Missing claims map to `None`, never to an error.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Identity {
	/// Stable subject identifier (`sub`).
	pub subject: Option<String>,
	/// Display name (`name`).
	pub name: Option<String>,
	/// Email address (`email`).
	pub email: Option<String>,
	/// Avatar URL (`picture`).
	pub avatar: Option<String>,
	/// Complete raw claim set captured at mapping time.
	pub claims: RawClaims,
}
impl Identity {
	/// Lifts the standard OIDC claims out of a raw claim set.
	pub fn from_claims(claims: RawClaims) -> Self {
		let text =
			|key: &str| claims.get(key).and_then(|value| value.as_str()).map(str::to_owned);
		let subject = text("sub");
		let name = text("name");
		let email = text("email");
		let avatar = text("picture");

		Self { subject, name, email, avatar, claims }
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	fn claims_from(value: serde_json::Value) -> RawClaims {
		match value {
			serde_json::Value::Object(map) => map,
			_ => unreachable!("Claim fixtures are JSON objects."),
		}
	}

	#[test]
	fn standard_claims_are_lifted() {
		let identity = Identity::from_claims(claims_from(json!({
			"sub": "248289761001",
			"name": "Jane Doe",
			"email": "jane@example.com",
			"picture": "https://example.com/jane.png",
			"locale": "en",
		})));

		assert_eq!(identity.subject.as_deref(), Some("248289761001"));
		assert_eq!(identity.name.as_deref(), Some("Jane Doe"));
		assert_eq!(identity.email.as_deref(), Some("jane@example.com"));
		assert_eq!(identity.avatar.as_deref(), Some("https://example.com/jane.png"));
		assert_eq!(identity.claims.get("locale"), Some(&json!("en")));
	}

	#[test]
	fn missing_and_non_string_claims_map_to_none() {
		let identity = Identity::from_claims(claims_from(json!({ "sub": 42 })));

		assert_eq!(identity.subject, None);
		assert_eq!(identity.name, None);
		assert_eq!(identity.email, None);
		assert_eq!(identity.avatar, None);
	}
}

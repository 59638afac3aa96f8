//! Scope modeling helpers for authorization requests.

// self
use crate::_prelude::*;

/// Scopes every authorization request must carry.
///
/// Without `openid` the provider issues no ID token, which breaks user identification and
/// federated logout.
pub const REQUIRED_OIDC_SCOPES: [&str; 3] = ["openid", "profile", "email"];

/// Errors emitted when validating scopes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum ScopeValidationError {
	/// Empty scope entries are not allowed.
	#[error("Scope entries cannot be empty.")]
	Empty,
	/// Scopes cannot contain embedded whitespace characters.
	#[error("Scope contains whitespace: {scope}.")]
	ContainsWhitespace {
		/// The offending scope string.
		scope: String,
	},
}

/// Deduplicated scope list that preserves the caller's ordering.
///
/// Configured scopes keep their declared order and union helpers append missing entries
/// at the end, so the final `scope` request parameter stays stable across requests.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct ScopeSet {
	scopes: Vec<String>,
}
impl ScopeSet {
	/// Creates a validated, deduplicated scope set from any iterator.
	pub fn new<I, S>(scopes: I) -> Result<Self, ScopeValidationError>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let mut normalized = Vec::new();

		for scope in scopes {
			let owned: String = scope.into();

			if owned.is_empty() {
				return Err(ScopeValidationError::Empty);
			}
			if owned.chars().any(char::is_whitespace) {
				return Err(ScopeValidationError::ContainsWhitespace { scope: owned });
			}
			if !normalized.contains(&owned) {
				normalized.push(owned);
			}
		}

		Ok(Self { scopes: normalized })
	}

	/// Number of distinct scopes.
	pub fn len(&self) -> usize {
		self.scopes.len()
	}

	/// Returns true if no scopes are defined.
	pub fn is_empty(&self) -> bool {
		self.scopes.is_empty()
	}

	/// Returns true if the set contains the provided scope.
	pub fn contains(&self, scope: &str) -> bool {
		self.scopes.iter().any(|candidate| candidate == scope)
	}

	/// Iterator over the scopes in declaration order.
	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.scopes.iter().map(|s| s.as_str())
	}

	/// Returns a copy with the given scopes appended when absent.
	pub fn with_required<I, S>(&self, required: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let mut scopes = self.scopes.clone();

		for scope in required {
			let view = scope.as_ref();

			if !scopes.iter().any(|existing| existing == view) {
				scopes.push(view.to_owned());
			}
		}

		Self { scopes }
	}

	/// Returns a copy guaranteed to carry [`REQUIRED_OIDC_SCOPES`].
	pub fn with_oidc_required(&self) -> Self {
		self.with_required(REQUIRED_OIDC_SCOPES)
	}

	/// Returns the space-delimited string sent as the `scope` request parameter.
	pub fn normalized(&self) -> String {
		self.scopes.join(" ")
	}

	/// Returns the underlying slice of scope strings.
	pub fn as_slice(&self) -> &[String] {
		&self.scopes
	}
}
impl Display for ScopeSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.normalized())
	}
}
impl From<ScopeSet> for Vec<String> {
	fn from(value: ScopeSet) -> Self {
		value.scopes
	}
}
impl TryFrom<Vec<String>> for ScopeSet {
	type Error = ScopeValidationError;

	fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}
impl FromStr for ScopeSet {
	type Err = ScopeValidationError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		if s.is_empty() {
			return Ok(Self::default());
		}
		if s.chars().all(char::is_whitespace) {
			return Err(ScopeValidationError::Empty);
		}

		Self::new(s.split_whitespace())
	}
}
impl<'a> IntoIterator for &'a ScopeSet {
	type IntoIter = std::slice::Iter<'a, String>;
	type Item = &'a String;

	fn into_iter(self) -> Self::IntoIter {
		self.scopes.iter()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn oidc_union_is_deduplicated_and_order_stable() {
		let configured =
			ScopeSet::new(["openid", "custom"]).expect("Scope fixture should be valid.");
		let unioned = configured.with_oidc_required();

		assert_eq!(unioned.normalized(), "openid custom profile email");
		assert_eq!(unioned.iter().filter(|scope| *scope == "openid").count(), 1);
	}

	#[test]
	fn declaration_order_survives_deduplication() {
		let scopes = ScopeSet::new(["offline_access", "email", "offline_access", "openid"])
			.expect("Scope fixture should be valid.");

		assert_eq!(scopes.normalized(), "offline_access email openid");
	}

	#[test]
	fn validation_rejects_empty_and_whitespace() {
		assert_eq!(ScopeSet::new([""]).expect_err("Empty scope must fail."), ScopeValidationError::Empty);
		assert!(matches!(
			ScopeSet::new(["open id"]).expect_err("Embedded whitespace must fail."),
			ScopeValidationError::ContainsWhitespace { .. }
		));
	}

	#[test]
	fn parses_from_space_delimited_strings() {
		let scopes: ScopeSet =
			"openid profile".parse().expect("Space-delimited scopes should parse.");

		assert_eq!(scopes.as_slice(), ["openid", "profile"]);
		assert!("   ".parse::<ScopeSet>().is_err());
		assert!("".parse::<ScopeSet>().expect("Empty input yields an empty set.").is_empty());
	}
}

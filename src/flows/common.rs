//! Shared helpers for flow implementations (state + PKCE generation, session guards).

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};
// self
use crate::{
	_prelude::*,
	flows::RelyingParty,
	provider::{PkceChallenge, PkceCodeChallengeMethod},
	session::SessionId,
};

// 32 alphanumeric characters carry over 190 bits of entropy, comfortably above the
// 128-bit floor required of CSRF correlation states.
pub(crate) const STATE_LEN: usize = 32;
const PKCE_VERIFIER_LEN: usize = 64;

/// PKCE verifier/challenge pair owned by one in-flight sign-in attempt.
///
/// Only the challenge leaves the process; the verifier is persisted as a single-use
/// session transient and consumed by the callback.
#[derive(Clone)]
pub struct PkcePair {
	verifier: String,
	challenge: PkceChallenge,
}
impl PkcePair {
	/// Generates a fresh verifier and its S256 challenge.
	pub fn generate() -> Self {
		let verifier = random_string(PKCE_VERIFIER_LEN);
		let challenge = PkceChallenge {
			value: compute_pkce_challenge(&verifier),
			method: PkceCodeChallengeMethod::S256,
		};

		Self { verifier, challenge }
	}

	/// Challenge half sent with the authorization request.
	pub fn challenge(&self) -> &PkceChallenge {
		&self.challenge
	}

	/// Consumes the pair, returning the secret verifier.
	pub fn into_verifier(self) -> String {
		self.verifier
	}
}
impl Debug for PkcePair {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("PkcePair")
			.field("verifier", &"<redacted>")
			.field("challenge", &self.challenge)
			.finish()
	}
}

/// Generates an unpredictable alphanumeric value for states and verifiers.
pub(crate) fn random_string(len: usize) -> String {
	rand::rng().sample_iter(Alphanumeric).take(len).map(char::from).collect()
}

fn compute_pkce_challenge(verifier: &str) -> String {
	let mut hasher = Sha256::new();

	hasher.update(verifier.as_bytes());

	let digest = hasher.finalize();

	URL_SAFE_NO_PAD.encode(digest)
}

/// Returns (and creates on demand) the serialization guard for a session.
pub(crate) fn session_guard(rp: &RelyingParty, id: &SessionId) -> Arc<AsyncMutex<()>> {
	let mut guards = rp.session_guards.lock();

	guards.entry(id.clone()).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn challenge_matches_the_rfc_7636_vector() {
		// RFC 7636 appendix B.
		assert_eq!(
			compute_pkce_challenge("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk"),
			"E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
		);
	}

	#[test]
	fn random_values_are_alphanumeric_and_unique() {
		let state = random_string(STATE_LEN);

		assert_eq!(state.len(), STATE_LEN);
		assert!(state.chars().all(|ch| ch.is_ascii_alphanumeric()));
		assert_ne!(state, random_string(STATE_LEN));
	}

	#[test]
	fn pkce_pair_redacts_the_verifier() {
		let pair = PkcePair::generate();
		let rendered = format!("{pair:?}");

		assert!(rendered.contains("<redacted>"));
		assert!(!rendered.contains(&pair.clone().into_verifier()));
	}
}

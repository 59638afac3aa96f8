//! User-facing heading/message pairs for authentication error codes.

// self
use crate::_prelude::*;

/// Message category selecting which error vocabulary applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageCategory {
	/// Errors shown on the sign-in page.
	SignIn,
	/// Errors shown on the general authentication error page.
	Auth,
}
impl Display for MessageCategory {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(match self {
			MessageCategory::SignIn => "signin-error",
			MessageCategory::Auth => "auth-error",
		})
	}
}

/// Heading/message pair ready for display.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ErrorMessage {
	/// Short heading.
	pub heading: &'static str,
	/// Explanatory text.
	pub message: &'static str,
}

/// Resolves an error code into a user-facing heading and message.
///
/// Matching is case-insensitive; unknown or absent codes normalize to the category
/// default. Pure lookup, no state.
pub fn describe(code: Option<&str>, category: MessageCategory) -> ErrorMessage {
	let normalized = code.unwrap_or("default").to_ascii_lowercase();

	match category {
		MessageCategory::SignIn => sign_in_message(&normalized),
		MessageCategory::Auth => auth_message(&normalized),
	}
}

fn sign_in_message(normalized: &str) -> ErrorMessage {
	match normalized {
		"signin" | "oauthsignin" | "oauthcallback" | "oauthcreateaccount"
		| "emailcreateaccount" | "callback" => ErrorMessage {
			heading: "Sign-in Failed",
			message: "Try signing in with a different account.",
		},
		"oauthaccountnotlinked" => ErrorMessage {
			heading: "Account Not Linked",
			message: "To confirm your identity, sign in with the same account you used originally.",
		},
		"emailsignin" =>
			ErrorMessage { heading: "Email Not Sent", message: "The email could not be sent." },
		"credentialssignin" => ErrorMessage {
			heading: "Sign-in Failed",
			message: "Sign in failed. Check the details you provided are correct.",
		},
		"sessionrequired" => ErrorMessage {
			heading: "Sign-in Required",
			message: "Please sign in to access this page.",
		},
		_ => ErrorMessage {
			heading: "Unable to Sign in",
			message: "An unexpected error occurred during sign-in. Please try again.",
		},
	}
}

fn auth_message(normalized: &str) -> ErrorMessage {
	match normalized {
		"configuration" => ErrorMessage {
			heading: "Server Error",
			message: "There is a problem with the server configuration. Check the server logs for more information.",
		},
		"accessdenied" => ErrorMessage {
			heading: "Access Denied",
			message: "You do not have permission to sign in.",
		},
		"verification" => ErrorMessage {
			heading: "Sign-in Link Invalid",
			message: "The sign-in link is no longer valid. It may have been used already or it may have expired.",
		},
		_ => ErrorMessage {
			heading: "Authentication Error",
			message: "An unexpected error occurred during authentication. Please try again.",
		},
	}
}

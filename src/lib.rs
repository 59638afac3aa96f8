//! Rust’s turnkey OpenID Connect relying party—Authorization Code + PKCE handshakes,
//! session-backed token lifecycles, and federated logout in one crate built for production.
//!
//! The crate is the authentication core of a web application that delegates sign-in to an
//! external identity provider (ZITADEL by default). It owns the protocol state machine and
//! nothing else: routing, view rendering, and cookie plumbing stay with the embedding
//! application, which mounts the flow operations of [`flows::RelyingParty`] onto its routes
//! and persists [`session::SessionData`] behind any [`session::SessionStore`] backend.
//!
//! Flow operations return typed outcomes (redirect targets, JSON replies, status
//! directives) instead of HTTP responses, so the same core drives any router:
//!
//! - [`flows::RelyingParty::start_sign_in`] → `302` to the provider's authorize URL.
//! - [`flows::RelyingParty::complete_sign_in`] → `302` to the profile page or the error
//!   page carrying an opaque error code.
//! - [`flows::RelyingParty::guard`] → pass-through (refreshing expired tokens silently) or
//!   `302` to the sign-in page with the original URL preserved.
//! - [`flows::RelyingParty::start_logout`] / [`flows::RelyingParty::complete_logout`] →
//!   the provider end-session round trip with CSRF-safe state matching.
//! - [`flows::RelyingParty::user_info`] → a JSON proxy for the provider's UserInfo
//!   endpoint.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod error;
pub mod flows;
pub mod http;
pub mod messages;
pub mod obs;
pub mod provider;
pub mod session;

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {httpmock as _, tokio as _};

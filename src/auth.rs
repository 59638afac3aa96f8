//! Auth-domain identity, scope, and token models.

pub mod identity;
pub mod scope;
pub mod token;

pub use identity::*;
pub use scope::*;
pub use token::*;

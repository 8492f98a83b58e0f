//! Credentials, account identifiers, and the token extractor.

pub mod authenticator;
pub mod claims;
pub mod extract;
pub mod iam;
pub mod id;
pub mod secret;

pub use authenticator::*;
pub use claims::*;
pub use extract::*;
pub use iam::*;
pub use id::*;
pub use secret::*;

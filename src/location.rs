//! Account location resolution and endpoint verification.
//!
//! `service` names the services whose endpoints vary by location, `model` holds the admin
//! backend payloads and the [`ResolvedLocation`] value object (which owns endpoint
//! verification), `cache` keeps the latest resolution per account, and `resolver` drives the
//! two dependent admin backend calls.

pub mod cache;
pub mod model;
pub mod resolver;
pub mod service;

pub use cache::*;
pub use model::*;
pub use resolver::*;
pub use service::*;

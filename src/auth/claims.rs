//! Unverified JWT claim decoding.
//!
//! Tokens reaching this layer were issued by IAM and are only inspected for the tenant
//! they belong to. No verification key is available here, so the signature segment is
//! never checked; callers that need authenticity must verify upstream.

// crates.io
use base64::{
	Engine as _,
	engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD},
};
use serde_json::{Map, Value};
// self
use crate::{_prelude::*, auth::AccountId, error::TokenError};

/// Scheme prefix expected on `Authorization` header values.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Claims payload decoded from a bearer token.
#[derive(Clone, Debug, PartialEq)]
pub struct AccountClaims(Map<String, Value>);
impl AccountClaims {
	/// Decodes the payload segment of a compact JWT without checking its signature.
	pub fn decode(jwt: &str) -> Result<Self, TokenError> {
		let mut segments = jwt.split('.');
		let (Some(_header), Some(payload), Some(_signature), None) =
			(segments.next(), segments.next(), segments.next(), segments.next())
		else {
			return Err(TokenError::MalformedToken { reason: "expected three segments" });
		};
		let bytes = if payload.ends_with('=') {
			URL_SAFE.decode(payload)
		} else {
			URL_SAFE_NO_PAD.decode(payload)
		}
		.map_err(|_| TokenError::MalformedToken { reason: "payload is not base64url" })?;

		match serde_json::from_slice::<Value>(&bytes) {
			Ok(Value::Object(map)) => Ok(Self(map)),
			_ => Err(TokenError::MalformedToken { reason: "payload is not a JSON object" }),
		}
	}

	/// Decodes claims from an `Authorization` header value (`Bearer <jwt>`).
	pub fn from_authorization(header: &str) -> Result<Self, TokenError> {
		let jwt = header.strip_prefix(BEARER_PREFIX).ok_or(TokenError::MalformedAuthorization)?;

		Self::decode(jwt)
	}

	/// Returns the tenant identifier stored under `account.bss`.
	pub fn account_id(&self) -> Result<AccountId, TokenError> {
		let bss = self
			.0
			.get("account")
			.and_then(|account| account.get("bss"))
			.and_then(Value::as_str)
			.ok_or(TokenError::MissingAccountClaim)?;

		Ok(AccountId::new(bss)?)
	}

	/// Returns a raw claim by name.
	pub fn get(&self, name: &str) -> Option<&Value> {
		self.0.get(name)
	}
}

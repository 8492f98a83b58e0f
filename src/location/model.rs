//! Admin backend payloads and the resolved location value object.

// self
use crate::{
	_prelude::*,
	auth::{AccountId, LocationId},
	location::ServiceName,
	obs::{self, OpKind},
};

/// Body of `GET {admin}/accounts/{account}/settings`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationSettings {
	/// Location the account selected for data residency.
	pub location: SelectedLocation,
}

/// The `location` object inside [`LocationSettings`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedLocation {
	/// Selected location identifier.
	pub id: LocationId,
}

/// Body of `GET {admin}/locations/{location}`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationDetails {
	/// Location identifier echoed by the backend.
	#[serde(default)]
	pub id: String,
	/// Notifications API endpoint for this location.
	#[serde(default, rename = "si_notifications_endpoint_url")]
	pub notifications_endpoint_url: String,
	/// Findings API endpoint for this location.
	#[serde(default, rename = "si_findings_endpoint_url")]
	pub findings_endpoint_url: String,
	/// Fields the SDK does not interpret.
	#[serde(flatten)]
	pub extra: BTreeMap<String, serde_json::Value>,
}
impl LocationDetails {
	/// Returns the endpoint URL recorded for `service`.
	pub fn endpoint(&self, service: ServiceName) -> &str {
		match service {
			ServiceName::Notifications => &self.notifications_endpoint_url,
			ServiceName::Findings => &self.findings_endpoint_url,
		}
	}
}

/// Location resolved for one account.
///
/// Resolution returns this value directly; the resolver additionally keeps the latest
/// value per account in its [`LocationCache`](crate::location::LocationCache).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLocation {
	/// Account the location was resolved for.
	pub account: AccountId,
	/// Location selected in the account settings.
	pub location_id: LocationId,
	/// Endpoint map for the selected location.
	pub details: LocationDetails,
	/// Instant the resolution completed.
	#[serde(with = "time::serde::rfc3339")]
	pub resolved_at: OffsetDateTime,
}
impl ResolvedLocation {
	/// Returns the expected endpoint URL for `service`.
	pub fn endpoint(&self, service: ServiceName) -> &str {
		self.details.endpoint(service)
	}

	/// Checks `candidate` against the expected endpoint for `service`.
	///
	/// Comparison is byte-for-byte: trailing slashes, scheme, and case all matter.
	pub fn verify_endpoint(&self, candidate: &str, service: ServiceName) -> Result<()> {
		obs::observe_sync(OpKind::EndpointVerification, "verify_endpoint", || {
			let expected = self.endpoint(service);

			if candidate == expected {
				Ok(())
			} else {
				Err(Error::Mismatch {
					service,
					expected: expected.to_owned(),
					actual: candidate.to_owned(),
				})
			}
		})
	}
}

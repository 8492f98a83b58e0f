//! Services whose endpoints depend on the account's location.

// self
use crate::_prelude::*;

/// Service whose regional endpoint can be resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ServiceName {
	/// Notification channels API.
	#[serde(rename = "notifications_api")]
	Notifications,
	/// Findings (notes, occurrences, providers) API.
	#[serde(rename = "findings_api")]
	Findings,
}
impl ServiceName {
	/// Every supported service.
	pub const ALL: [ServiceName; 2] = [ServiceName::Notifications, ServiceName::Findings];

	/// Returns the service's configuration key (`notifications_api`, `findings_api`).
	pub const fn as_str(self) -> &'static str {
		match self {
			ServiceName::Notifications => "notifications_api",
			ServiceName::Findings => "findings_api",
		}
	}

	/// Default us-south endpoint of the service.
	pub const fn default_url(self) -> &'static str {
		match self {
			ServiceName::Notifications => "https://us-south.secadvisor.cloud.ibm.com/notifications",
			ServiceName::Findings => "https://us-south.secadvisor.cloud.ibm.com/findings",
		}
	}

	/// Prefix for external configuration keys (`NOTIFICATIONS_API_`).
	pub fn env_prefix(self) -> String {
		format!("{}_", self.as_str().to_ascii_uppercase())
	}
}
impl Display for ServiceName {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for ServiceName {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|service| service.as_str() == s)
			.ok_or_else(|| Error::UnknownService { name: s.to_owned() })
	}
}

//! Base configuration handed to the generated findings and notifications clients.

// self
use crate::{
	_prelude::*,
	auth::Authenticator,
	error::ConfigError,
	http::HttpClient,
	location::{LocationResolver, ResolvedLocation, ServiceName},
};

/// SDK name reported in the `User-Agent` header.
pub const SDK_NAME: &str = "security-advisor-sdk-rust";
/// SDK version reported in the `User-Agent` header.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Verified base URL and location for one service client.
#[derive(Clone, Debug, PartialEq)]
pub struct ServiceClientConfig {
	/// Service the configuration targets.
	pub service: ServiceName,
	/// Base URL every operation path is appended to.
	pub base_url: Url,
	/// Location the base URL was resolved from.
	pub location: ResolvedLocation,
}
impl ServiceClientConfig {
	/// Builds `{base}/v1/{segments...}`, percent-encoding each segment.
	pub fn operation_url<I, S>(&self, segments: I) -> Result<Url, ConfigError>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let mut url = self.base_url.clone();

		url.path_segments_mut()
			.map_err(|()| ConfigError::UnsupportedUrl {
				what: "service",
				url: self.base_url.to_string(),
			})?
			.pop_if_empty()
			.push("v1")
			.extend(segments);

		Ok(url)
	}
}

/// Returns the analytics headers every generated operation sends.
pub fn sdk_headers(
	service: ServiceName,
	version: &str,
	operation: &str,
) -> BTreeMap<String, String> {
	BTreeMap::from([
		("User-Agent".to_owned(), format!("{SDK_NAME}/{SDK_VERSION}")),
		(
			"X-IBMCloud-SDK-Analytics".to_owned(),
			format!("service_name={service};service_version={version};operation_id={operation}"),
		),
	])
}

impl<C> LocationResolver<C>
where
	C: ?Sized + HttpClient,
{
	/// Resolves the base URL a generated client for `service` must use.
	///
	/// A `requested_url` must match the resolved endpoint exactly; without one the resolved
	/// endpoint is adopted. Any failure means the client must not be configured.
	pub async fn configure_service(
		&self,
		auth: &dyn Authenticator,
		service: ServiceName,
		requested_url: Option<&str>,
	) -> Result<ServiceClientConfig> {
		let location = self.resolve_location(auth).await?;

		if let Some(requested) = requested_url {
			location.verify_endpoint(requested, service)?;
		}

		let endpoint = location.endpoint(service);

		if endpoint.is_empty() {
			return Err(ConfigError::MissingEndpoint {
				location: location.location_id.to_string(),
				service,
			}
			.into());
		}

		let base_url = Url::parse(endpoint)
			.map_err(|source| ConfigError::InvalidUrl { what: "service", source })?;

		Ok(ServiceClientConfig { service, base_url, location })
	}
}

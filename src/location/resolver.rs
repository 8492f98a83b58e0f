//! Location resolution against the admin backend.
//!
//! [`LocationResolver::resolve_location`] runs the full sequence: extract the bearer
//! token and account from an [`Authenticator`], read the account settings to learn the
//! selected location, then read that location's endpoint map. The two admin calls are
//! strictly sequential and every step fails fast. The result is returned to the caller
//! and recorded in the resolver's per-account [`LocationCache`], which is only written
//! once both calls succeed.

// std
use std::time::Duration as StdDuration;
// self
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;
use crate::{
	_prelude::*,
	auth::{self, AccountToken, Authenticator},
	error::ConfigError,
	http::{DEFAULT_TIMEOUT, HttpClient, HttpRequest},
	location::{LocationCache, LocationDetails, LocationSettings, ResolvedLocation, ServiceName},
	obs::{self, OpKind},
};

/// Default admin backend base URL.
pub const DEFAULT_ADMIN_URL: &str = "https://dev.compliance.test.cloud.ibm.com/admin/v1";

#[cfg(feature = "reqwest")]
/// Resolver specialized for the crate's default reqwest transport.
pub type ReqwestLocationResolver = LocationResolver<ReqwestHttpClient>;

/// Resolves account locations and their per-service endpoints.
#[derive(Clone)]
pub struct LocationResolver<C>
where
	C: ?Sized + HttpClient,
{
	/// HTTP client used for admin backend calls.
	pub http_client: Arc<C>,
	/// Admin backend base URL.
	pub admin_url: Url,
	/// Per-request deadline; `None` waits indefinitely.
	pub timeout: Option<StdDuration>,
	/// Latest resolution per account.
	pub cache: LocationCache,
}
impl<C> LocationResolver<C>
where
	C: ?Sized + HttpClient,
{
	/// Creates a resolver for `admin_url` that reuses the caller-provided transport.
	pub fn with_http_client(
		admin_url: &str,
		http_client: impl Into<Arc<C>>,
	) -> Result<Self, ConfigError> {
		Ok(Self {
			http_client: http_client.into(),
			admin_url: parse_admin_url(admin_url)?,
			timeout: Some(DEFAULT_TIMEOUT),
			cache: LocationCache::default(),
		})
	}

	/// Replaces the admin backend base URL.
	pub fn with_admin_url(mut self, admin_url: &str) -> Result<Self, ConfigError> {
		self.admin_url = parse_admin_url(admin_url)?;

		Ok(self)
	}

	/// Overrides the per-request deadline.
	pub fn with_timeout(mut self, timeout: Option<StdDuration>) -> Self {
		self.timeout = timeout;

		self
	}

	/// Shares an existing cache with this resolver.
	pub fn with_cache(mut self, cache: LocationCache) -> Self {
		self.cache = cache;

		self
	}

	/// Resolves the location selected by the account behind `auth`.
	pub async fn resolve_location(&self, auth: &dyn Authenticator) -> Result<ResolvedLocation> {
		obs::observe(OpKind::LocationResolution, "resolve_location", async move {
			let token = auth::extract_account_and_token(auth).await?;
			let settings_url =
				self.admin_endpoint(&["accounts", token.account.as_ref(), "settings"])?;
			let settings: LocationSettings =
				self.get_json(settings_url, &token, "account settings").await?;
			let location_id = settings.location.id;
			let details_url = self.admin_endpoint(&["locations", location_id.as_ref()])?;
			let mut details: LocationDetails =
				self.get_json(details_url, &token, "location details").await?;

			if details.id.is_empty() {
				details.id = location_id.to_string();
			}

			let resolved = ResolvedLocation {
				account: token.account,
				location_id,
				details,
				resolved_at: OffsetDateTime::now_utc(),
			};

			self.cache.store(resolved.clone());

			Ok(resolved)
		})
		.await
	}

	/// Resolves the endpoint URL of `service` for the account behind `auth`.
	///
	/// The URL is returned exactly as the admin backend reported it, including an empty
	/// string when the location has no endpoint for the service.
	pub async fn resolve_service_url(
		&self,
		auth: &dyn Authenticator,
		service: ServiceName,
	) -> Result<String> {
		let location = self.resolve_location(auth).await?;

		Ok(location.endpoint(service).to_owned())
	}

	/// Returns the last location resolved for `account`.
	pub fn cached_location(&self, account: &str) -> Option<ResolvedLocation> {
		self.cache.get(account)
	}

	/// Verifies `candidate` against the cached location of `account`.
	///
	/// Fails with [`Error::NotResolved`] when the account has not been resolved through
	/// this resolver's cache.
	pub fn verify_endpoint(
		&self,
		account: &str,
		candidate: &str,
		service: ServiceName,
	) -> Result<()> {
		self.cache
			.get(account)
			.ok_or_else(|| Error::NotResolved { account: account.to_string() })?
			.verify_endpoint(candidate, service)
	}

	fn admin_endpoint(&self, segments: &[&str]) -> Result<Url, ConfigError> {
		let mut url = self.admin_url.clone();

		url.path_segments_mut()
			.map_err(|()| ConfigError::UnsupportedUrl {
				what: "admin",
				url: self.admin_url.to_string(),
			})?
			.pop_if_empty()
			.extend(segments);

		Ok(url)
	}

	async fn get_json<T>(&self, url: Url, token: &AccountToken, what: &'static str) -> Result<T>
	where
		T: for<'de> Deserialize<'de>,
	{
		let request = HttpRequest::get(url)
			.with_header("Authorization", token.authorization.expose())
			.with_header("Content-Type", "application/json")
			.with_header("Accept", "application/json")
			.with_timeout(self.timeout);
		let response = self.http_client.execute(request).await?;

		if response.is_error() {
			return Err(Error::LocationFetch { status: response.status, reason: response.reason() });
		}

		Ok(response.json(what)?)
	}
}
#[cfg(feature = "reqwest")]
impl LocationResolver<ReqwestHttpClient> {
	/// Creates a resolver against [`DEFAULT_ADMIN_URL`] with its own reqwest transport.
	pub fn new() -> Result<Self, ConfigError> {
		Self::with_http_client(DEFAULT_ADMIN_URL, ReqwestHttpClient::default())
	}
}
impl<C> Debug for LocationResolver<C>
where
	C: ?Sized + HttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("LocationResolver")
			.field("admin_url", &self.admin_url.as_str())
			.field("timeout", &self.timeout)
			.field("cached_accounts", &self.cache.len())
			.finish()
	}
}

fn parse_admin_url(raw: &str) -> Result<Url, ConfigError> {
	let url = Url::parse(raw).map_err(|source| ConfigError::InvalidUrl { what: "admin", source })?;

	if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
		return Err(ConfigError::UnsupportedUrl { what: "admin", url: url.to_string() });
	}

	Ok(url)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		error::TransportError,
		http::{HttpFuture, HttpResponse},
	};

	struct Unreachable;
	impl HttpClient for Unreachable {
		fn execute(&self, request: HttpRequest) -> HttpFuture<'_, HttpResponse> {
			Box::pin(async move { Err(TransportError::Timeout { url: request.url.to_string() }) })
		}
	}

	fn resolver(admin_url: &str) -> LocationResolver<Unreachable> {
		LocationResolver::with_http_client(admin_url, Unreachable)
			.expect("Fixture admin URL should be accepted.")
	}

	#[test]
	fn admin_endpoints_append_encoded_segments() {
		let resolver = resolver("https://admin.example.com/admin/v1/");
		let url = resolver
			.admin_endpoint(&["accounts", "a b#c", "settings"])
			.expect("Base URL can carry segments.");

		assert_eq!(url.as_str(), "https://admin.example.com/admin/v1/accounts/a%20b%23c/settings");

		let resolver = self::resolver("http://127.0.0.1:8080");
		let url = resolver.admin_endpoint(&["locations", "us"]).expect("Root base should work.");

		assert_eq!(url.as_str(), "http://127.0.0.1:8080/locations/us");
	}

	#[test]
	fn admin_url_must_be_http_base() {
		assert!(matches!(
			LocationResolver::with_http_client("not a url", Unreachable),
			Err(ConfigError::InvalidUrl { what: "admin", .. })
		));
		assert!(matches!(
			LocationResolver::with_http_client("mailto:admin@example.com", Unreachable),
			Err(ConfigError::UnsupportedUrl { what: "admin", .. })
		));
		assert!(matches!(
			LocationResolver::with_http_client("ftp://admin.example.com", Unreachable),
			Err(ConfigError::UnsupportedUrl { .. })
		));
	}

	#[test]
	fn verification_before_resolution_is_rejected() {
		let resolver = resolver(DEFAULT_ADMIN_URL);
		let err = resolver
			.verify_endpoint("123", "https://ss.ss", ServiceName::Notifications)
			.expect_err("Unresolved accounts cannot be verified.");

		assert!(matches!(err, Error::NotResolved { account } if account == "123"));
	}

	#[test]
	fn defaults_apply_timeout() {
		let resolver = resolver(DEFAULT_ADMIN_URL);

		assert_eq!(resolver.timeout, Some(DEFAULT_TIMEOUT));
		assert_eq!(resolver.with_timeout(None).timeout, None);
	}
}

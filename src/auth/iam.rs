//! IAM API key authenticator with cached, singleflight token exchanges.
//!
//! The authenticator trades an API key for an IAM access token at the identity
//! endpoint and reuses the token until 80% of its lifetime has elapsed. Concurrent
//! callers that observe a stale token wait on one shared exchange instead of each
//! hitting the identity endpoint.

// std
use std::time::Duration as StdDuration;
// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
use url::form_urlencoded::Serializer as FormSerializer;
// self
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;
use crate::{
	_prelude::*,
	auth::{AuthFuture, Authenticator, BEARER_PREFIX, TokenSecret},
	error::{ConfigError, TokenError},
	http::{DEFAULT_TIMEOUT, HttpClient, HttpRequest},
	obs::{self, OpKind},
};

/// Default IAM identity endpoint.
pub const DEFAULT_IAM_URL: &str = "https://iam.cloud.ibm.com/identity/token";

const API_KEY_GRANT_TYPE: &str = "urn:ibm:params:oauth:grant-type:apikey";

#[cfg(feature = "reqwest")]
/// IAM authenticator backed by the crate's default reqwest transport.
pub type ReqwestIamAuthenticator = IamAuthenticator<ReqwestHttpClient>;

#[derive(Debug, Deserialize)]
struct IamTokenResponse {
	access_token: String,
	#[serde(default)]
	expires_in: i64,
	#[serde(default)]
	expiration: Option<i64>,
}

#[derive(Clone, Debug)]
struct CachedIamToken {
	access_token: TokenSecret,
	issued_at: OffsetDateTime,
	expires_at: OffsetDateTime,
}
impl CachedIamToken {
	fn from_response(response: IamTokenResponse, issued_at: OffsetDateTime) -> Self {
		// Out-of-range lifetimes leave the token already expired.
		let expires_at = match response.expiration {
			Some(secs) => OffsetDateTime::from_unix_timestamp(secs).ok(),
			None => issued_at.checked_add(Duration::seconds(response.expires_in)),
		}
		.unwrap_or(issued_at);

		Self { access_token: TokenSecret::new(response.access_token), issued_at, expires_at }
	}

	fn needs_refresh(&self, now: OffsetDateTime) -> bool {
		let lifetime = self.expires_at - self.issued_at;

		if !lifetime.is_positive() {
			return true;
		}

		// Refresh once 80% of the lifetime has elapsed.
		self.issued_at
			.checked_add(lifetime - lifetime / 5)
			.is_none_or(|refresh_at| now >= refresh_at)
	}
}

/// Authenticator that exchanges an API key for IAM bearer tokens.
pub struct IamAuthenticator<C>
where
	C: ?Sized + HttpClient,
{
	api_key: TokenSecret,
	url: Url,
	client_credentials: Option<(String, TokenSecret)>,
	timeout: Option<StdDuration>,
	http_client: Arc<C>,
	cached: Arc<RwLock<Option<CachedIamToken>>>,
	exchange_guard: Arc<AsyncMutex<()>>,
}
impl<C> IamAuthenticator<C>
where
	C: ?Sized + HttpClient,
{
	/// Creates an authenticator that exchanges `api_key` through `http_client`.
	pub fn with_http_client(
		api_key: impl Into<String>,
		http_client: impl Into<Arc<C>>,
	) -> Result<Self, ConfigError> {
		let api_key = TokenSecret::new(api_key);

		if api_key.is_blank() {
			return Err(ConfigError::MissingCredential { name: "apikey" });
		}

		let url = Url::parse(DEFAULT_IAM_URL)
			.map_err(|source| ConfigError::InvalidUrl { what: "IAM", source })?;

		Ok(Self {
			api_key,
			url,
			client_credentials: None,
			timeout: Some(DEFAULT_TIMEOUT),
			http_client: http_client.into(),
			cached: Default::default(),
			exchange_guard: Arc::new(AsyncMutex::new(())),
		})
	}

	/// Overrides the identity endpoint URL.
	pub fn with_url(mut self, url: &str) -> Result<Self, ConfigError> {
		self.url =
			Url::parse(url).map_err(|source| ConfigError::InvalidUrl { what: "IAM", source })?;

		Ok(self)
	}

	/// Sends HTTP basic client credentials with each exchange.
	pub fn with_client_credentials(
		mut self,
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
	) -> Self {
		self.client_credentials = Some((client_id.into(), TokenSecret::new(client_secret)));

		self
	}

	/// Overrides the per-request deadline of exchanges; `None` waits indefinitely.
	pub fn with_timeout(mut self, timeout: Option<StdDuration>) -> Self {
		self.timeout = timeout;

		self
	}

	/// Identity endpoint in use.
	pub fn url(&self) -> &Url {
		&self.url
	}

	/// Returns a fresh access token, exchanging the API key when the cached one is stale.
	pub async fn access_token(&self) -> Result<TokenSecret> {
		if let Some(token) = self.fresh_cached(OffsetDateTime::now_utc()) {
			return Ok(token);
		}

		let _singleflight = self.exchange_guard.lock().await;

		// Another caller may have completed the exchange while we waited.
		if let Some(token) = self.fresh_cached(OffsetDateTime::now_utc()) {
			return Ok(token);
		}

		let fresh = self.exchange().await?;
		let token = fresh.access_token.clone();

		*self.cached.write() = Some(fresh);

		Ok(token)
	}

	/// Drops the cached token so the next call performs a new exchange.
	pub fn invalidate(&self) {
		self.cached.write().take();
	}

	fn fresh_cached(&self, now: OffsetDateTime) -> Option<TokenSecret> {
		self.cached
			.read()
			.as_ref()
			.filter(|cached| !cached.needs_refresh(now))
			.map(|cached| cached.access_token.clone())
	}

	async fn exchange(&self) -> Result<CachedIamToken> {
		obs::observe(OpKind::IamTokenExchange, "exchange", async move {
			let body = FormSerializer::new(String::new())
				.append_pair("grant_type", API_KEY_GRANT_TYPE)
				.append_pair("apikey", self.api_key.expose())
				.append_pair("response_type", "cloud_iam")
				.finish();
			let mut request = HttpRequest::post(self.url.clone())
				.with_header("Content-Type", "application/x-www-form-urlencoded")
				.with_header("Accept", "application/json")
				.with_body(body)
				.with_timeout(self.timeout);

			if let Some((id, secret)) = &self.client_credentials {
				let encoded = STANDARD.encode(format!("{id}:{}", secret.expose()));

				request.set_header("Authorization", format!("Basic {encoded}"));
			}

			let issued_at = OffsetDateTime::now_utc();
			let response = self.http_client.execute(request).await?;

			if response.is_error() {
				return Err(TokenError::Exchange {
					status: response.status,
					reason: response.reason(),
				}
				.into());
			}

			let payload = response.json::<IamTokenResponse>("IAM token")?;

			Ok(CachedIamToken::from_response(payload, issued_at))
		})
		.await
	}
}
#[cfg(feature = "reqwest")]
impl IamAuthenticator<ReqwestHttpClient> {
	/// Creates an authenticator with its own reqwest transport.
	pub fn new(api_key: impl Into<String>) -> Result<Self, ConfigError> {
		Self::with_http_client(api_key, ReqwestHttpClient::default())
	}
}
impl<C> Authenticator for IamAuthenticator<C>
where
	C: ?Sized + HttpClient,
{
	fn authenticate<'a>(&'a self, request: &'a mut HttpRequest) -> AuthFuture<'a> {
		Box::pin(async move {
			let token = self.access_token().await?;

			request.set_header("Authorization", format!("{BEARER_PREFIX}{}", token.expose()));

			Ok(())
		})
	}
}
impl<C> Debug for IamAuthenticator<C>
where
	C: ?Sized + HttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("IamAuthenticator")
			.field("url", &self.url.as_str())
			.field("client_credentials_set", &self.client_credentials.is_some())
			.field("token_cached", &self.cached.read().is_some())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		error::TransportError,
		http::{HttpFuture, HttpResponse},
	};

	fn cached(lifetime_secs: i64) -> (CachedIamToken, OffsetDateTime) {
		let issued_at = OffsetDateTime::now_utc();
		let response = IamTokenResponse {
			access_token: "token".into(),
			expires_in: lifetime_secs,
			expiration: None,
		};

		(CachedIamToken::from_response(response, issued_at), issued_at)
	}

	#[test]
	fn refresh_kicks_in_after_eighty_percent_of_lifetime() {
		let (token, issued_at) = cached(100);

		assert!(!token.needs_refresh(issued_at));
		assert!(!token.needs_refresh(issued_at + Duration::seconds(79)));
		assert!(token.needs_refresh(issued_at + Duration::seconds(80)));
	}

	#[test]
	fn non_positive_lifetimes_are_always_stale() {
		let (token, issued_at) = cached(0);

		assert!(token.needs_refresh(issued_at));
	}

	#[test]
	fn absolute_expiration_wins_over_relative_lifetime() {
		let issued_at = OffsetDateTime::from_unix_timestamp(1_000).expect("Timestamp is valid.");
		let response = IamTokenResponse {
			access_token: "token".into(),
			expires_in: 5,
			expiration: Some(4_600),
		};
		let token = CachedIamToken::from_response(response, issued_at);

		assert_eq!(token.expires_at.unix_timestamp(), 4_600);
	}

	#[test]
	fn out_of_range_lifetimes_are_treated_as_expired() {
		let issued_at = OffsetDateTime::now_utc();

		for (expires_in, expiration) in [(i64::MAX, None), (3_600, Some(i64::MAX))] {
			let response =
				IamTokenResponse { access_token: "token".into(), expires_in, expiration };
			let token = CachedIamToken::from_response(response, issued_at);

			assert_eq!(token.expires_at, issued_at);
			assert!(token.needs_refresh(issued_at));
		}
	}

	#[test]
	fn exchanges_default_to_a_request_deadline() {
		struct Unused;
		impl HttpClient for Unused {
			fn execute(&self, request: HttpRequest) -> HttpFuture<'_, HttpResponse> {
				Box::pin(async move {
					Err(TransportError::Timeout { url: request.url.to_string() })
				})
			}
		}

		let auth = IamAuthenticator::with_http_client("key", Unused).expect("API key is valid.");

		assert_eq!(auth.timeout, Some(DEFAULT_TIMEOUT));
		assert_eq!(auth.with_timeout(None).timeout, None);
	}
}

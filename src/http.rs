//! Transport primitives for admin backend and IAM calls.
//!
//! The module exposes [`HttpClient`] alongside the client-agnostic [`HttpRequest`] and
//! [`HttpResponse`] values so downstream crates can plug in custom HTTP stacks (or fakes in
//! tests) without the SDK depending on their types. Authenticators decorate an
//! [`HttpRequest`] before it is dispatched, which keeps header attachment independent of the
//! transport that eventually sends it.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
use std::time::Duration as StdDuration;
// self
use crate::{
	_prelude::*,
	error::{DecodeError, TransportError},
};

/// Default per-request deadline for admin backend and IAM calls.
pub const DEFAULT_TIMEOUT: StdDuration = StdDuration::from_secs(30);

/// Boxed future returned by [`HttpClient::execute`].
pub type HttpFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, TransportError>> + 'a + Send>>;

/// HTTP verbs issued by the SDK.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
	/// `GET`
	Get,
	/// `POST`
	Post,
}
impl HttpMethod {
	/// Returns the canonical verb string.
	pub const fn as_str(self) -> &'static str {
		match self {
			HttpMethod::Get => "GET",
			HttpMethod::Post => "POST",
		}
	}
}
impl Display for HttpMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outgoing request in a transport-agnostic shape.
///
/// Header names are stored lowercase so lookups are case-insensitive.
#[derive(Clone, Debug)]
pub struct HttpRequest {
	/// HTTP verb.
	pub method: HttpMethod,
	/// Fully resolved request URL.
	pub url: Url,
	/// Request headers keyed by lowercase name.
	pub headers: BTreeMap<String, String>,
	/// Optional request body.
	pub body: Option<Vec<u8>>,
	/// Per-request deadline applied by the transport.
	pub timeout: Option<StdDuration>,
}
impl HttpRequest {
	/// Creates a request with no headers, body, or timeout.
	pub fn new(method: HttpMethod, url: Url) -> Self {
		Self { method, url, headers: BTreeMap::new(), body: None, timeout: None }
	}

	/// Shorthand for a `GET` request.
	pub fn get(url: Url) -> Self {
		Self::new(HttpMethod::Get, url)
	}

	/// Shorthand for a `POST` request.
	pub fn post(url: Url) -> Self {
		Self::new(HttpMethod::Post, url)
	}

	/// Sets (or replaces) a header.
	pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
		self.headers.insert(name.to_ascii_lowercase(), value.into());
	}

	/// Builder-style variant of [`HttpRequest::set_header`].
	pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
		self.set_header(name, value);

		self
	}

	/// Returns a header value, if present.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
	}

	/// Attaches a request body.
	pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
		self.body = Some(body.into());

		self
	}

	/// Applies a per-request deadline.
	pub fn with_timeout(mut self, timeout: Option<StdDuration>) -> Self {
		self.timeout = timeout;

		self
	}
}

/// Response captured by an [`HttpClient`].
#[derive(Clone, Debug, Default)]
pub struct HttpResponse {
	/// HTTP status code.
	pub status: u16,
	/// Canonical status text, when the transport knows it.
	pub reason: Option<String>,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl HttpResponse {
	/// Returns `true` for status codes the SDK treats as failures (`> 399`).
	pub fn is_error(&self) -> bool {
		self.status > 399
	}

	/// Status text used in error messages.
	pub fn reason(&self) -> String {
		self.reason.clone().unwrap_or_else(|| format!("HTTP {}", self.status))
	}

	/// Decodes the body as JSON, reporting the failing path on error.
	pub fn json<T>(&self, what: &'static str) -> Result<T, DecodeError>
	where
		T: for<'de> Deserialize<'de>,
	{
		let mut deserializer = serde_json::Deserializer::from_slice(&self.body);

		serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| DecodeError { what, source })
	}
}

/// Abstraction over HTTP transports used for admin backend and IAM calls.
///
/// Implementations must be `Send + Sync + 'static` so they can be shared behind `Arc`
/// across resolvers and authenticators, and the futures they return must be `Send`.
/// Transports apply [`HttpRequest::timeout`] and report expired deadlines as
/// [`TransportError::Timeout`].
pub trait HttpClient
where
	Self: 'static + Send + Sync,
{
	/// Sends `request` and returns the captured response.
	fn execute(&self, request: HttpRequest) -> HttpFuture<'_, HttpResponse>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	fn map_error(url: &Url, err: ReqwestError) -> TransportError {
		if err.is_timeout() {
			TransportError::Timeout { url: url.to_string() }
		} else {
			TransportError::network(url, err)
		}
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpClient for ReqwestHttpClient {
	fn execute(&self, request: HttpRequest) -> HttpFuture<'_, HttpResponse> {
		Box::pin(async move {
			let HttpRequest { method, url, headers, body, timeout } = request;
			let method = match method {
				HttpMethod::Get => reqwest::Method::GET,
				HttpMethod::Post => reqwest::Method::POST,
			};
			let mut builder = self.0.request(method, url.clone());

			for (name, value) in &headers {
				builder = builder.header(name.as_str(), value.as_str());
			}
			if let Some(body) = body {
				builder = builder.body(body);
			}
			if let Some(timeout) = timeout {
				builder = builder.timeout(timeout);
			}

			let response = builder.send().await.map_err(|e| Self::map_error(&url, e))?;
			let status = response.status();
			let body = response.bytes().await.map_err(|e| Self::map_error(&url, e))?.to_vec();

			Ok(HttpResponse {
				status: status.as_u16(),
				reason: status.canonical_reason().map(str::to_owned),
				body,
			})
		})
	}
}

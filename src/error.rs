//! SDK-level error types shared by token extraction, location resolution, and verification.

// self
use crate::{_prelude::*, location::ServiceName};

/// SDK-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical SDK error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Credentials are missing, malformed, or carry unusable claims.
	#[error(transparent)]
	Token(#[from] TokenError),
	/// Admin backend JSON could not be decoded.
	#[error(transparent)]
	Decode(#[from] DecodeError),
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),

	/// Admin backend answered with an error status; retry with backoff.
	#[error("Error while fetching location details: {reason}.")]
	LocationFetch {
		/// HTTP status code returned by the admin backend.
		status: u16,
		/// Canonical status text (e.g. `Bad Request`).
		reason: String,
	},
	/// Caller-supplied service URL does not match the account's location.
	#[error(
		"Service URL specified is incorrect for the selected location. Correct URL for {service} is `{expected}`."
	)]
	Mismatch {
		/// Service whose endpoint was checked.
		service: ServiceName,
		/// Endpoint resolved for the account's location.
		expected: String,
		/// Endpoint supplied by the caller.
		actual: String,
	},
	/// Service name outside the supported set.
	#[error("Unknown service name `{name}`.")]
	UnknownService {
		/// Name supplied by the caller.
		name: String,
	},
	/// Verification requested before the account's location was resolved.
	#[error("Location for account `{account}` has not been resolved yet.")]
	NotResolved {
		/// Account identifier without a cached location.
		account: String,
	},
}
impl Error {
	/// Returns `true` when retrying the same call may succeed.
	pub fn is_retryable(&self) -> bool {
		match self {
			Self::LocationFetch { .. } | Self::Transport(_) => true,
			Self::Token(TokenError::Exchange { status, .. }) => *status >= 500,
			_ => false,
		}
	}
}

/// Authentication and claim failures. Not retryable; the caller must supply valid credentials.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum TokenError {
	/// Authenticator did not attach an `Authorization` header.
	#[error("Authenticator did not attach an Authorization header.")]
	MissingAuthorization,
	/// `Authorization` header lacks the `Bearer ` scheme prefix.
	#[error("Authorization header is not a bearer token.")]
	MalformedAuthorization,
	/// Token could not be parsed into a claims map.
	#[error(
		"Failed to parse token: {reason}. Verify that the api key/bearer token that you specified is correct."
	)]
	MalformedToken {
		/// Parsing step that failed.
		reason: &'static str,
	},
	/// Claims lack a string `account.bss` field.
	#[error("Token claims are missing the account.bss field.")]
	MissingAccountClaim,
	/// `account.bss` is present but not a usable identifier.
	#[error("Token carries an invalid account identifier.")]
	InvalidAccount(#[from] crate::auth::IdentifierError),
	/// IAM token endpoint rejected the API key exchange.
	#[error("IAM token exchange failed: {reason}.")]
	Exchange {
		/// HTTP status code returned by the token endpoint.
		status: u16,
		/// Canonical status text.
		reason: String,
	},
}

/// Malformed JSON received from a backend; signals a contract violation.
#[derive(Debug, ThisError)]
#[error("{what} response is malformed JSON.")]
pub struct DecodeError {
	/// Response being decoded (`account settings`, `location details`, ...).
	pub what: &'static str,
	/// Structured parsing failure including the JSON path.
	#[source]
	pub source: serde_path_to_error::Error<serde_json::Error>,
}

/// Transport-level failures (network, timeouts).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling {url}.")]
	Network {
		/// URL being requested.
		url: String,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Request exceeded its deadline.
	#[error("Request to {url} timed out.")]
	Timeout {
		/// URL being requested.
		url: String,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(url: &Url, src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { url: url.to_string(), source: Box::new(src) }
	}
}

/// Configuration and validation failures raised by the SDK.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// A configured URL cannot be parsed.
	#[error("The {what} URL is invalid.")]
	InvalidUrl {
		/// Which URL failed to parse.
		what: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A configured URL uses a scheme other than HTTP(S) or cannot carry path segments.
	#[error("The {what} URL must be an http(s) base URL: {url}.")]
	UnsupportedUrl {
		/// Which URL failed validation.
		what: &'static str,
		/// URL that failed validation.
		url: String,
	},
	/// A required credential is empty or absent.
	#[error("Missing credential: {name}.")]
	MissingCredential {
		/// Credential name (`apikey`, `bearer token`, ...).
		name: &'static str,
	},
	/// External configuration names an authentication type the SDK does not support.
	#[error("Unsupported authentication type `{auth_type}`.")]
	UnsupportedAuthType {
		/// Raw value supplied by the configuration.
		auth_type: String,
	},
	/// Resolved location carries no endpoint for the requested service.
	#[error("Location `{location}` has no endpoint for {service}.")]
	MissingEndpoint {
		/// Location identifier.
		location: String,
		/// Service without an endpoint.
		service: ServiceName,
	},
}

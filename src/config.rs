//! External configuration for service clients.
//!
//! Keys follow the IBM Cloud SDK convention of prefixing each setting with the upper-cased
//! service name, e.g. `NOTIFICATIONS_API_APIKEY` or `FINDINGS_API_AUTH_TYPE`. Blank values
//! are treated as absent.

// self
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;
use crate::{
	_prelude::*,
	auth::{Authenticator, BearerTokenAuthenticator, IamAuthenticator, TokenSecret},
	error::ConfigError,
	http::HttpClient,
	location::ServiceName,
};

/// Credentials an [`Authenticator`] is built from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthenticatorConfig {
	/// Pre-obtained bearer token.
	BearerToken {
		/// Raw token without the scheme prefix.
		token: TokenSecret,
	},
	/// IAM API key exchange.
	Iam {
		/// API key traded for access tokens.
		api_key: TokenSecret,
		/// Identity endpoint override.
		url: Option<String>,
		/// Optional client credentials sent as HTTP basic auth.
		client: Option<(String, TokenSecret)>,
	},
}
impl AuthenticatorConfig {
	/// Builds the authenticator, routing any token exchange through `http_client`.
	pub fn build_with<C>(
		&self,
		http_client: impl Into<Arc<C>>,
	) -> Result<Arc<dyn Authenticator>, ConfigError>
	where
		C: ?Sized + HttpClient,
	{
		match self {
			Self::BearerToken { token } =>
				Ok(Arc::new(BearerTokenAuthenticator::new(token.expose())?)),
			Self::Iam { api_key, url, client } => {
				let mut auth =
					IamAuthenticator::<C>::with_http_client(api_key.expose(), http_client)?;

				if let Some(url) = url {
					auth = auth.with_url(url)?;
				}
				if let Some((id, secret)) = client {
					auth = auth.with_client_credentials(id, secret.expose());
				}

				Ok(Arc::new(auth))
			},
		}
	}

	/// Builds the authenticator on the default reqwest transport.
	#[cfg(feature = "reqwest")]
	pub fn build(&self) -> Result<Arc<dyn Authenticator>, ConfigError> {
		self.build_with::<ReqwestHttpClient>(ReqwestHttpClient::default())
	}
}

/// Settings for one service client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceConfig {
	/// Service the settings apply to.
	pub service: ServiceName,
	/// Explicit service URL; verified against the resolved location when present.
	pub url: Option<String>,
	/// Credentials for the service.
	pub auth: AuthenticatorConfig,
}
impl ServiceConfig {
	/// Loads settings for `service` from the process environment.
	pub fn from_env(service: ServiceName) -> Result<Self, ConfigError> {
		Self::from_lookup(service, |key| std::env::var(key).ok())
	}

	/// Loads settings for `service` through an arbitrary key lookup.
	pub fn from_lookup<F>(service: ServiceName, lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let prefix = service.env_prefix();
		let get = |key: &str| {
			lookup(&format!("{prefix}{key}"))
				.map(|value| value.trim().to_owned())
				.filter(|value| !value.is_empty())
		};
		let api_key = get("APIKEY");
		let bearer = get("BEARER_TOKEN");
		let auth_type = match get("AUTH_TYPE") {
			Some(raw) => raw.to_ascii_lowercase(),
			None if api_key.is_some() => "iam".into(),
			None if bearer.is_some() => "bearertoken".into(),
			None => return Err(ConfigError::MissingCredential { name: "apikey" }),
		};
		let auth = match auth_type.as_str() {
			"iam" => AuthenticatorConfig::Iam {
				api_key: TokenSecret::new(
					api_key.ok_or(ConfigError::MissingCredential { name: "apikey" })?,
				),
				url: get("AUTH_URL"),
				client: get("CLIENT_ID").zip(get("CLIENT_SECRET").map(TokenSecret::new)),
			},
			"bearertoken" | "bearer_token" => AuthenticatorConfig::BearerToken {
				token: TokenSecret::new(
					bearer.ok_or(ConfigError::MissingCredential { name: "bearer token" })?,
				),
			},
			_ => return Err(ConfigError::UnsupportedAuthType { auth_type }),
		};

		Ok(Self { service, url: get("URL"), auth })
	}
}

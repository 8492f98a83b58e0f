//! Authentication contracts that attach credentials to outgoing requests.

// self
use crate::{
	_prelude::*,
	auth::{BEARER_PREFIX, TokenSecret},
	error::ConfigError,
	http::HttpRequest,
};

/// Boxed future returned by [`Authenticator::authenticate`].
pub type AuthFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + 'a + Send>>;

/// Anything capable of attaching an `Authorization` header to an [`HttpRequest`].
///
/// Implementations may perform network calls (token exchanges) before decorating the
/// request, which is why the hook is asynchronous.
pub trait Authenticator
where
	Self: Send + Sync,
{
	/// Attaches credentials to `request`.
	fn authenticate<'a>(&'a self, request: &'a mut HttpRequest) -> AuthFuture<'a>;
}
impl<T> Authenticator for Arc<T>
where
	T: ?Sized + Authenticator,
{
	fn authenticate<'a>(&'a self, request: &'a mut HttpRequest) -> AuthFuture<'a> {
		(**self).authenticate(request)
	}
}

/// Authenticator that forwards a pre-obtained bearer token.
#[derive(Clone, Debug)]
pub struct BearerTokenAuthenticator {
	token: TokenSecret,
}
impl BearerTokenAuthenticator {
	/// Wraps a raw token (without the `Bearer ` prefix); blank tokens are rejected.
	pub fn new(token: impl Into<String>) -> Result<Self, ConfigError> {
		let token = TokenSecret::new(token);

		if token.is_blank() {
			return Err(ConfigError::MissingCredential { name: "bearer token" });
		}

		Ok(Self { token })
	}
}
impl Authenticator for BearerTokenAuthenticator {
	fn authenticate<'a>(&'a self, request: &'a mut HttpRequest) -> AuthFuture<'a> {
		Box::pin(async move {
			request.set_header("Authorization", format!("{BEARER_PREFIX}{}", self.token.expose()));

			Ok(())
		})
	}
}

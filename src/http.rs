//! Transport primitives for signed requests.
//!
//! The client depends on an HTTP stack only through [`JobHttpClient`]: one request in, one
//! response out. Implementations must not follow redirects themselves. The client follows every
//! 3xx on its own so each hop can be re-signed for the method and path it actually targets; a
//! transport that follows redirects internally would replay a token scoped to the previous hop,
//! which the server rejects.

// self
use crate::_prelude::*;
#[cfg(feature = "reqwest")] use crate::error::ConfigError;

/// Outgoing request handed to a [`JobHttpClient`]. The URI is always absolute.
pub type HttpRequest = http::Request<Vec<u8>>;
/// Response returned by a [`JobHttpClient`].
pub type HttpResponse = http::Response<Vec<u8>>;

/// Boxed future returned by [`JobHttpClient::execute`].
pub type TransportFuture<'a, E> = Pin<Box<dyn Future<Output = Result<HttpResponse, E>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of sending signed requests.
///
/// Implementations are shared behind `Arc<T>` by every clone of a
/// [`Client`](crate::client::Client), so they must be `Send + Sync + 'static` and the futures
/// they return must be `Send`. A transport is configured once and reused for every request and
/// every poll iteration.
pub trait JobHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// Sends `request` exactly as given and returns the first response, redirects included.
	fn execute(&self, request: HttpRequest) -> TransportFuture<'_, Self::TransportError>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// [`ReqwestHttpClient::new`] disables redirect following. Any client passed to
/// [`ReqwestHttpClient::with_client`] must be built with
/// `reqwest::redirect::Policy::none()` for the same reason.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Builds a reqwest client that leaves redirects to the caller.
	pub fn new() -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder().redirect(reqwest::redirect::Policy::none()).build()?;

		Ok(Self(client))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl JobHttpClient for ReqwestHttpClient {
	type TransportError = ReqwestError;

	fn execute(&self, request: HttpRequest) -> TransportFuture<'_, Self::TransportError> {
		let client = self.0.clone();

		Box::pin(async move {
			let response = client.execute(reqwest::Request::try_from(request)?).await?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let mut response_new = HttpResponse::new(response.bytes().await?.to_vec());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}

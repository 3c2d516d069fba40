//! Signed request dispatch against a single server.

pub mod poll;

mod redirect;

pub use poll::*;
pub use redirect::MAX_REDIRECTS;

// self
use crate::{
	_prelude::*,
	api_error::{BodyErrorExtractor, ErrorExtractor},
	auth::Identity,
	error::TransportError,
	http::{HttpRequest, JobHttpClient},
	obs::{self, OpKind},
	response::ServerResponse,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestJobClient = Client<ReqwestHttpClient>;

/// Talks to one server on behalf of one [`Identity`].
///
/// The client owns the transport, the identity, and the error extractor; every clone shares
/// them. Each request is signed at the moment it is sent, for the exact method and path being
/// transmitted, and every redirect hop is signed again for its own target. Nothing about a
/// token outlives the request it was made for.
pub struct Client<C>
where
	C: ?Sized + JobHttpClient,
{
	/// HTTP transport used for every outbound request, including polls and redirects.
	pub http_client: Arc<C>,
	/// Extractor applied to failed job responses and unexpected statuses.
	pub error_extractor: Arc<dyn ErrorExtractor>,
	/// Shared counters for poll loop outcomes.
	pub poll_stats: Arc<PollStats>,
	identity: Arc<Identity>,
}
impl<C> Client<C>
where
	C: ?Sized + JobHttpClient,
{
	/// Creates a client that reuses the caller-provided transport.
	pub fn with_http_client(identity: Identity, http_client: impl Into<Arc<C>>) -> Self {
		Self {
			http_client: http_client.into(),
			error_extractor: Arc::new(BodyErrorExtractor),
			poll_stats: Default::default(),
			identity: Arc::new(identity),
		}
	}

	/// Replaces the extractor used to build [`ApiError`](crate::api_error::ApiError) values.
	pub fn with_error_extractor(mut self, extractor: Arc<dyn ErrorExtractor>) -> Self {
		self.error_extractor = extractor;

		self
	}

	/// Identity every request is signed with.
	pub fn identity(&self) -> &Identity {
		&self.identity
	}

	/// Builds an empty-bodied request for `path` relative to the server address.
	pub fn request(&self, method: Method, path: &str) -> Result<HttpRequest> {
		let url = self.identity.endpoint(path)?;

		Ok(http::Request::builder()
			.method(method)
			.uri(url.as_str())
			.body(Vec::new())
			.map_err(TransportError::from)?)
	}

	/// Builds a request for `path` whose body is `payload` encoded as JSON.
	pub fn json_request<T>(&self, method: Method, path: &str, payload: &T) -> Result<HttpRequest>
	where
		T: ?Sized + Serialize,
	{
		let body = serde_json::to_vec(payload).map_err(TransportError::Payload)?;
		let mut request = self.request(method, path)?;

		request
			.headers_mut()
			.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));

		*request.body_mut() = body;

		Ok(request)
	}

	/// Signs and sends `request`, following redirects, and returns the final response as-is.
	///
	/// Any `Authorization` header already on the request is replaced. Network failures are
	/// returned immediately and never retried.
	pub async fn send(&self, request: HttpRequest) -> Result<ServerResponse> {
		let target = request.uri().path().to_owned();

		obs::observe(OpKind::Send, &target, self.dispatch(request)).await
	}

	/// Passes `response` through when its status is `expected`, otherwise converts it into
	/// [`Error::Api`] with the configured extractor.
	pub fn ensure_status(
		&self,
		response: ServerResponse,
		expected: StatusCode,
	) -> Result<ServerResponse> {
		if response.status() == expected {
			Ok(response)
		} else {
			Err(Error::Api(self.error_extractor.extract(&response)))
		}
	}
}
#[cfg(feature = "reqwest")]
impl Client<ReqwestHttpClient> {
	/// Creates a client for `server`, signing as `user` with `secret`.
	///
	/// The client provisions its own reqwest transport with redirect following disabled.
	pub fn new(server: &str, user: impl Into<String>, secret: impl Into<String>) -> Result<Self> {
		let identity = Identity::new(server, user, secret)?;

		Ok(Self::with_http_client(identity, ReqwestHttpClient::new()?))
	}

	/// Creates a client for a server running without authentication.
	pub fn new_no_auth(server: &str) -> Result<Self> {
		Self::new(server, "", "")
	}
}
impl<C> Clone for Client<C>
where
	C: ?Sized + JobHttpClient,
{
	fn clone(&self) -> Self {
		Self {
			http_client: Arc::clone(&self.http_client),
			error_extractor: Arc::clone(&self.error_extractor),
			poll_stats: Arc::clone(&self.poll_stats),
			identity: Arc::clone(&self.identity),
		}
	}
}
impl<C> Debug for Client<C>
where
	C: ?Sized + JobHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Client").field("identity", &self.identity).finish()
	}
}

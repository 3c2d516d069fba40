//! Server responses paired with the URL that produced them.

// std
use std::borrow::Cow;
// self
use crate::{_prelude::*, error::TransportError, http::HttpResponse};

/// Header the server sets to `true` while the addressed job is still running.
pub const PENDING_HEADER: &str = "x-pending";

/// Response received from the server, remembering the URL it answered so relative `Location`
/// values can be resolved.
#[derive(Debug)]
pub struct ServerResponse {
	url: Url,
	inner: HttpResponse,
}
impl ServerResponse {
	/// Pairs a transport response with the URL that was requested.
	pub fn new(url: Url, inner: HttpResponse) -> Self {
		Self { url, inner }
	}

	/// URL of the request that produced this response.
	pub fn url(&self) -> &Url {
		&self.url
	}

	/// HTTP status code.
	pub fn status(&self) -> StatusCode {
		self.inner.status()
	}

	/// Response headers.
	pub fn headers(&self) -> &HeaderMap {
		self.inner.headers()
	}

	/// Raw response body.
	pub fn body(&self) -> &[u8] {
		self.inner.body()
	}

	/// Body decoded as UTF-8, replacing invalid sequences.
	pub fn text(&self) -> Cow<'_, str> {
		String::from_utf8_lossy(self.inner.body())
	}

	/// Returns `true` when the pending indicator is present and exactly `true`.
	pub fn is_pending(&self) -> bool {
		self.headers().get(PENDING_HEADER).is_some_and(|value| value.as_bytes() == b"true")
	}

	/// Returns `true` when a `Location` header is present, regardless of whether it parses.
	pub fn has_location(&self) -> bool {
		self.headers().contains_key(header::LOCATION)
	}

	/// Resolves the `Location` header against [`ServerResponse::url`].
	pub fn location(&self) -> Result<Url, TransportError> {
		let value = self
			.headers()
			.get(header::LOCATION)
			.ok_or(TransportError::MissingLocation { status: self.status().as_u16() })?;
		let invalid = || TransportError::InvalidLocation {
			value: String::from_utf8_lossy(value.as_bytes()).into_owned(),
		};
		let raw = value.to_str().map_err(|_| invalid())?;

		self.url.join(raw).map_err(|_| invalid())
	}

	/// Releases the underlying transport response.
	pub fn into_inner(self) -> HttpResponse {
		self.inner
	}
}

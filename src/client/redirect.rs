//! Redirect following with per-hop re-signing.

// self
use crate::{
	_prelude::*,
	auth,
	client::Client,
	error::TransportError,
	http::{HttpRequest, JobHttpClient},
	obs,
	response::ServerResponse,
};

/// Maximum number of redirects followed for a single request.
pub const MAX_REDIRECTS: usize = 10;

/// How the next hop of a redirect is issued.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct RedirectHop {
	pub(crate) method: Method,
	pub(crate) keep_body: bool,
}
impl RedirectHop {
	/// Returns the follow-up for `status`, or `None` when the status is not a followed redirect.
	///
	/// 301/302/303 keep GET and HEAD and turn every other method into GET, dropping the body.
	/// 307/308 replay the request unchanged.
	pub(crate) fn after(status: StatusCode, method: &Method) -> Option<Self> {
		match status {
			StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND | StatusCode::SEE_OTHER => {
				let method = if method == Method::GET || method == Method::HEAD {
					method.clone()
				} else {
					Method::GET
				};

				Some(Self { method, keep_body: false })
			},
			StatusCode::TEMPORARY_REDIRECT | StatusCode::PERMANENT_REDIRECT =>
				Some(Self { method: method.clone(), keep_body: true }),
			_ => None,
		}
	}
}

impl<C> Client<C>
where
	C: ?Sized + JobHttpClient,
{
	/// Signs and sends `request`, then follows redirects, signing every hop for its own method
	/// and path. A redirect without a `Location` header is returned to the caller untouched.
	pub(crate) async fn dispatch(&self, request: HttpRequest) -> Result<ServerResponse> {
		let (parts, mut body) = request.into_parts();
		let mut method = parts.method;
		let mut headers = parts.headers;
		let mut url = absolute_url(&parts.uri)?;
		let mut redirects = 0;

		loop {
			let mut outgoing = build_request(&method, &url, &headers, body.clone())?;

			auth::sign_request(&mut outgoing, self.identity())?;

			let response =
				self.http_client.execute(outgoing).await.map_err(TransportError::network)?;
			let response = ServerResponse::new(url, response);
			let Some(hop) = RedirectHop::after(response.status(), &method) else {
				return Ok(response);
			};

			if !response.has_location() {
				return Ok(response);
			}
			if redirects == MAX_REDIRECTS {
				return Err(TransportError::TooManyRedirects { max: MAX_REDIRECTS }.into());
			}

			let target = response.location()?;

			obs::redirect(response.status(), &target);

			if !hop.keep_body {
				body = Vec::new();

				headers.remove(header::CONTENT_TYPE);
				headers.remove(header::CONTENT_LENGTH);
			}

			redirects += 1;
			method = hop.method;
			url = target;
		}
	}
}

fn absolute_url(uri: &http::Uri) -> Result<Url, TransportError> {
	let raw = uri.to_string();

	Url::parse(&raw).map_err(|source| TransportError::InvalidUri { uri: raw, source })
}

fn build_request(
	method: &Method,
	url: &Url,
	headers: &HeaderMap,
	body: Vec<u8>,
) -> Result<HttpRequest, TransportError> {
	let mut request =
		http::Request::builder().method(method.clone()).uri(url.as_str()).body(body)?;

	*request.headers_mut() = headers.clone();

	Ok(request)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn see_other_switches_to_get_except_for_head() {
		assert_eq!(
			RedirectHop::after(StatusCode::SEE_OTHER, &Method::DELETE),
			Some(RedirectHop { method: Method::GET, keep_body: false })
		);
		assert_eq!(
			RedirectHop::after(StatusCode::SEE_OTHER, &Method::HEAD),
			Some(RedirectHop { method: Method::HEAD, keep_body: false })
		);
	}

	#[test]
	fn moved_and_found_rewrite_every_method_but_get_and_head() {
		for method in [Method::POST, Method::PUT, Method::DELETE, Method::PATCH] {
			assert_eq!(
				RedirectHop::after(StatusCode::FOUND, &method),
				Some(RedirectHop { method: Method::GET, keep_body: false })
			);
			assert_eq!(
				RedirectHop::after(StatusCode::MOVED_PERMANENTLY, &method),
				Some(RedirectHop { method: Method::GET, keep_body: false })
			);
		}

		assert_eq!(
			RedirectHop::after(StatusCode::FOUND, &Method::HEAD),
			Some(RedirectHop { method: Method::HEAD, keep_body: false })
		);
		assert_eq!(
			RedirectHop::after(StatusCode::MOVED_PERMANENTLY, &Method::GET),
			Some(RedirectHop { method: Method::GET, keep_body: false })
		);
	}

	#[test]
	fn temporary_and_permanent_redirects_replay_the_request() {
		assert_eq!(
			RedirectHop::after(StatusCode::TEMPORARY_REDIRECT, &Method::POST),
			Some(RedirectHop { method: Method::POST, keep_body: true })
		);
		assert_eq!(
			RedirectHop::after(StatusCode::PERMANENT_REDIRECT, &Method::DELETE),
			Some(RedirectHop { method: Method::DELETE, keep_body: true })
		);
	}

	#[test]
	fn other_statuses_are_not_followed() {
		for status in [StatusCode::OK, StatusCode::ACCEPTED, StatusCode::NOT_MODIFIED] {
			assert_eq!(RedirectHop::after(status, &Method::GET), None);
		}
	}

	#[test]
	fn relative_request_uris_are_rejected() {
		let uri: http::Uri = "/volumes".parse().expect("Relative URI should parse.");

		assert!(matches!(absolute_url(&uri), Err(TransportError::InvalidUri { .. })));
	}
}

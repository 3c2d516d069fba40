//! Structured errors extracted from non-success server responses.

// self
use crate::{_prelude::*, response::ServerResponse};

/// Server-provided failure: the originating status plus a human-readable message.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("{status}: {message}")]
pub struct ApiError {
	/// HTTP status of the failing response.
	pub status: StatusCode,
	/// Message reported by the server.
	pub message: String,
}
impl ApiError {
	/// Creates a new error for the given status and message.
	pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
		Self { status, message: message.into() }
	}
}

/// Turns a non-success response body into an [`ApiError`].
///
/// Clients hold one extractor behind an `Arc` and call it whenever a poll fails while pending
/// or [`Client::ensure_status`](crate::client::Client::ensure_status) sees an unexpected code.
pub trait ErrorExtractor
where
	Self: 'static + Send + Sync,
{
	/// Builds the structured error for `response`.
	fn extract(&self, response: &ServerResponse) -> ApiError;
}

/// Default extractor.
///
/// JSON bodies shaped like `{"message": ".."}` or `{"error": ".."}` yield that field; any other
/// body is used as trimmed text; an empty body falls back to the status reason phrase.
#[derive(Clone, Debug, Default)]
pub struct BodyErrorExtractor;
impl ErrorExtractor for BodyErrorExtractor {
	fn extract(&self, response: &ServerResponse) -> ApiError {
		let status = response.status();

		if let Ok(body) = serde_json::from_slice::<ErrorBody>(response.body()) {
			return ApiError::new(status, body.message.trim());
		}

		let text = response.text();
		let text = text.trim();

		if text.is_empty() {
			ApiError::new(status, status.canonical_reason().unwrap_or("Unknown error"))
		} else {
			ApiError::new(status, text)
		}
	}
}

#[derive(Deserialize)]
struct ErrorBody {
	#[serde(alias = "error")]
	message: String,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::http::HttpResponse;

	fn response(status: StatusCode, body: &str) -> ServerResponse {
		let mut inner = HttpResponse::new(body.as_bytes().to_vec());

		*inner.status_mut() = status;

		ServerResponse::new(
			Url::parse("http://heketi.test/queue/1").expect("Failed to parse test URL."),
			inner,
		)
	}

	#[test]
	fn plain_text_bodies_are_trimmed() {
		let err = BodyErrorExtractor
			.extract(&response(StatusCode::INTERNAL_SERVER_ERROR, "  No space left on device\n"));

		assert_eq!(err, ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "No space left on device"));
	}

	#[test]
	fn json_bodies_yield_message_or_error_field() {
		let from_message =
			BodyErrorExtractor.extract(&response(StatusCode::CONFLICT, "{\"message\":\"busy\"}"));
		let from_error =
			BodyErrorExtractor.extract(&response(StatusCode::BAD_REQUEST, "{\"error\":\"bad size\"}"));

		assert_eq!(from_message.message, "busy");
		assert_eq!(from_error.message, "bad size");
		assert_eq!(from_error.status, StatusCode::BAD_REQUEST);
	}

	#[test]
	fn empty_bodies_fall_back_to_reason_phrase() {
		let err = BodyErrorExtractor.extract(&response(StatusCode::SERVICE_UNAVAILABLE, ""));

		assert_eq!(err.message, "Service Unavailable");
	}
}

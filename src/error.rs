//! Client-level error types shared by signing, transport, and job polling.

// self
use crate::{_prelude::*, api_error::ApiError, auth::SigningError};

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// The signing primitive rejected the key or claims; never retried.
	#[error(transparent)]
	Signing(#[from] SigningError),
	/// Request construction, dispatch, or location extraction failed; never retried.
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// A poll reported a non-success status while the job was still pending.
	#[error("Job failed: {0}")]
	JobFailed(#[source] ApiError),
	/// A response carried a status the caller did not expect.
	#[error("Server rejected the request: {0}")]
	Api(#[source] ApiError),
	/// The poll loop issued the configured maximum number of requests without a verdict.
	#[error("Job was still pending after {attempts} poll attempts.")]
	PollExhausted {
		/// Number of poll requests issued before giving up.
		attempts: u32,
	},
	/// The poll loop ran past its configured deadline.
	#[error("Job did not finish within {deadline}.")]
	PollDeadline {
		/// Deadline configured on the poll policy.
		deadline: Duration,
	},
}

/// Configuration and validation failures raised while assembling a client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Server address cannot be parsed as an absolute URL.
	#[error("Server address `{address}` is invalid.")]
	InvalidServerAddress {
		/// Address as supplied by the caller.
		address: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Server address uses a scheme other than http or https.
	#[error("Server address must use http or https, got `{scheme}`.")]
	UnsupportedScheme {
		/// Scheme found in the address.
		scheme: String,
	},
	/// Configuration document could not be deserialized.
	#[error("JSON document is malformed.")]
	Json(#[from] serde_json::Error),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, request construction, redirects, locations).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the server.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Outgoing request could not be assembled.
	#[error(transparent)]
	Request(#[from] ::http::Error),
	/// Request path cannot be joined onto the server address.
	#[error("Request path `{path}` is invalid.")]
	InvalidPath {
		/// Path as supplied by the caller.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Request payload could not be encoded as JSON.
	#[error("Request payload could not be encoded as JSON.")]
	Payload(#[source] serde_json::Error),
	/// Outgoing request targets a URI that is not an absolute URL.
	#[error("Request URI `{uri}` is not an absolute URL.")]
	InvalidUri {
		/// URI carried by the request.
		uri: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Response was expected to name a job location but carried no `Location` header.
	#[error("Response with status {status} carries no Location header.")]
	MissingLocation {
		/// HTTP status of the response.
		status: u16,
	},
	/// `Location` header is not valid text or does not resolve to a URL.
	#[error("Location header `{value}` cannot be resolved.")]
	InvalidLocation {
		/// Raw header value, lossily decoded.
		value: String,
	},
	/// Server kept redirecting past the supported hop count.
	#[error("Stopped after {max} redirects.")]
	TooManyRedirects {
		/// Maximum number of redirects followed per request.
		max: usize,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn job_failures_surface_server_message() {
		let err = Error::JobFailed(ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "disk gone"));

		assert_eq!(err.to_string(), "Job failed: 500 Internal Server Error: disk gone");
		assert!(err.source().is_some());
	}

	#[test]
	fn network_errors_keep_their_source() {
		let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
		let err = Error::from(TransportError::network(io));

		assert!(matches!(err, Error::Transport(TransportError::Network { .. })));
		assert_eq!(err.source().map(ToString::to_string).as_deref(), Some("refused"));
	}
}

//! Async client for Heketi-style storage orchestration services: every request carries a
//! freshly signed, method+path-scoped token, redirects are re-signed hop by hop, and
//! long-running jobs are polled until they finish, fail, or exhaust a caller-supplied budget.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod api_error;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod obs;
pub mod response;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::Identity,
		client::{Client, PollPolicy, ReqwestJobClient},
		http::ReqwestHttpClient,
	};

	/// Builds a reqwest transport with redirect following disabled, as the client expects.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		ReqwestHttpClient::new().expect("Failed to build Reqwest client for tests.")
	}

	/// Constructs a reqwest-backed [`Client`] pointed at `server` (usually an `httpmock` URL).
	pub fn build_reqwest_test_client(server: &str, user: &str, secret: &str) -> ReqwestJobClient {
		let identity =
			Identity::new(server, user, secret).expect("Failed to build test client identity.");

		Client::with_http_client(identity, test_reqwest_http_client())
	}

	/// Poll policy with a short interval so integration tests stay fast.
	pub fn fast_poll_policy() -> PollPolicy {
		PollPolicy::default().with_interval(Duration::milliseconds(10))
	}
}

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use ::http::{HeaderMap, HeaderValue, Method, StatusCode, header};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use ::http as http_types;
#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};

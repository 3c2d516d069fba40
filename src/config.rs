//! Declarative client configuration.

// self
use crate::{
	_prelude::*,
	auth::{Identity, Secret},
	client::PollPolicy,
	error::ConfigError,
};
#[cfg(feature = "reqwest")]
use crate::{client::ReqwestJobClient, http::ReqwestHttpClient};

/// Serializable description of a client: where to connect, who to sign as, how to poll.
///
/// ```
/// let config = heketi_client::config::ClientConfig::from_json_str(
/// 	r#"{ "server": "http://heketi.example:8080", "user": "admin", "secret": "key" }"#,
/// )
/// .unwrap();
///
/// assert_eq!(config.poll_interval_secs, 2);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
	/// Server base URL.
	pub server: String,
	/// User placed in the token issuer claim; empty when authentication is disabled.
	#[serde(default)]
	pub user: String,
	/// Shared signing secret; empty when authentication is disabled.
	#[serde(default)]
	pub secret: Secret,
	/// Seconds between polls of a pending job.
	#[serde(default = "default_poll_interval_secs")]
	pub poll_interval_secs: u64,
	/// Optional ceiling on poll requests per job.
	#[serde(default)]
	pub poll_max_attempts: Option<u32>,
	/// Optional wall-clock budget per job, in seconds.
	#[serde(default)]
	pub poll_deadline_secs: Option<u64>,
}
impl ClientConfig {
	/// Parses a JSON configuration document.
	pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
		Ok(serde_json::from_str(raw)?)
	}

	/// Validates the server address and builds the signing identity.
	pub fn identity(&self) -> Result<Identity, ConfigError> {
		Identity::new(&self.server, self.user.as_str(), self.secret.expose())
	}

	/// Poll policy described by the `poll_*` fields.
	pub fn poll_policy(&self) -> PollPolicy {
		let mut policy = PollPolicy::new(seconds(self.poll_interval_secs));

		if let Some(attempts) = self.poll_max_attempts {
			policy = policy.with_max_attempts(attempts);
		}
		if let Some(deadline) = self.poll_deadline_secs {
			policy = policy.with_deadline(seconds(deadline));
		}

		policy
	}

	/// Builds a reqwest-backed client for this configuration.
	#[cfg(feature = "reqwest")]
	pub fn build(&self) -> Result<ReqwestJobClient> {
		let identity = self.identity()?;

		Ok(ReqwestJobClient::with_http_client(identity, ReqwestHttpClient::new()?))
	}
}

fn default_poll_interval_secs() -> u64 {
	2
}

fn seconds(value: u64) -> Duration {
	Duration::seconds(i64::try_from(value).unwrap_or(i64::MAX))
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn minimal_document_uses_defaults() {
		let config = ClientConfig::from_json_str(r#"{ "server": "http://heketi.test" }"#)
			.expect("Minimal config should parse.");
		let identity = config.identity().expect("Identity should build.");

		assert_eq!(identity.user(), "");
		assert!(identity.secret().is_empty());
		assert_eq!(config.poll_policy(), PollPolicy::default());
	}

	#[test]
	fn poll_fields_shape_the_policy() {
		let config = ClientConfig::from_json_str(
			r#"{
				"server": "https://heketi.test",
				"user": "admin",
				"secret": "key",
				"poll_interval_secs": 5,
				"poll_max_attempts": 12,
				"poll_deadline_secs": 600
			}"#,
		)
		.expect("Full config should parse.");
		let policy = config.poll_policy();

		assert_eq!(config.secret.expose(), "key");
		assert_eq!(policy.interval, Duration::seconds(5));
		assert_eq!(policy.max_attempts, Some(12));
		assert_eq!(policy.deadline, Some(Duration::minutes(10)));
	}

	#[test]
	fn unknown_fields_are_rejected() {
		let err = ClientConfig::from_json_str(r#"{ "server": "http://heketi.test", "key": "x" }"#)
			.expect_err("Unknown fields should be rejected.");

		assert!(matches!(err, ConfigError::Json(_)));
	}

	#[test]
	fn invalid_server_fails_identity() {
		let config = ClientConfig::from_json_str(r#"{ "server": "not a url" }"#)
			.expect("Syntactically valid config should parse.");

		assert!(matches!(config.identity(), Err(ConfigError::InvalidServerAddress { .. })));
	}

	#[test]
	fn secret_stays_redacted_in_debug() {
		let config =
			ClientConfig::from_json_str(r#"{ "server": "http://heketi.test", "secret": "hunter2" }"#)
				.expect("Config should parse.");

		assert!(!format!("{config:?}").contains("hunter2"));
	}
}

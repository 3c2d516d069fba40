//! Immutable client identity: server address, user, and shared secret.

// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransportError},
};

/// Redacted shared-secret wrapper keeping key material out of logs.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);
impl Secret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the raw secret. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Returns `true` for the empty secret used by servers running without authentication.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl Debug for Secret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("Secret").field(&"<redacted>").finish()
	}
}
impl Display for Secret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Who the client is and where it talks to.
///
/// Built once and never mutated; every signed request reads it, so concurrent calls need no
/// coordination. An empty user and secret describe a server with authentication disabled,
/// which still receives a syntactically valid token.
#[derive(Clone, PartialEq, Eq)]
pub struct Identity {
	server: Url,
	user: String,
	secret: Secret,
}
impl Identity {
	/// Creates an identity after validating the server address.
	pub fn new(
		server: &str,
		user: impl Into<String>,
		secret: impl Into<String>,
	) -> Result<Self, ConfigError> {
		let url = Url::parse(server).map_err(|source| ConfigError::InvalidServerAddress {
			address: server.to_owned(),
			source,
		})?;

		if !matches!(url.scheme(), "http" | "https") {
			return Err(ConfigError::UnsupportedScheme { scheme: url.scheme().to_owned() });
		}

		Ok(Self { server: url, user: user.into(), secret: Secret::new(secret) })
	}

	/// Creates an identity for a server running without authentication.
	pub fn no_auth(server: &str) -> Result<Self, ConfigError> {
		Self::new(server, "", "")
	}

	/// Base URL of the server.
	pub fn server(&self) -> &Url {
		&self.server
	}

	/// User name placed in the token's `iss` claim.
	pub fn user(&self) -> &str {
		&self.user
	}

	/// Shared secret used as the HMAC key.
	pub fn secret(&self) -> &Secret {
		&self.secret
	}

	/// Resolves `path` against the server address.
	pub fn endpoint(&self, path: &str) -> Result<Url, TransportError> {
		self.server
			.join(path)
			.map_err(|source| TransportError::InvalidPath { path: path.to_owned(), source })
	}
}
impl Debug for Identity {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Identity")
			.field("server", &self.server.as_str())
			.field("user", &self.user)
			.field("secret_set", &!self.secret.is_empty())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn secret_formatters_redact() {
		let secret = Secret::new("super-secret");

		assert_eq!(format!("{secret:?}"), "Secret(\"<redacted>\")");
		assert_eq!(format!("{secret}"), "<redacted>");
	}

	#[test]
	fn identity_debug_hides_secret() {
		let identity =
			Identity::new("http://heketi.test:8080", "admin", "key").expect("Identity should build.");
		let rendered = format!("{identity:?}");

		assert!(rendered.contains("admin"));
		assert!(rendered.contains("secret_set: true"));
		assert!(!rendered.contains("key\""));
	}

	#[test]
	fn no_auth_identity_is_empty() {
		let identity = Identity::no_auth("http://heketi.test").expect("Identity should build.");

		assert_eq!(identity.user(), "");
		assert!(identity.secret().is_empty());
		assert_eq!(identity.server().as_str(), "http://heketi.test/");
	}

	#[test]
	fn rejects_unusable_server_addresses() {
		assert!(matches!(
			Identity::new("heketi.test", "u", "s"),
			Err(ConfigError::InvalidServerAddress { .. })
		));
		assert!(matches!(
			Identity::new("ftp://heketi.test", "u", "s"),
			Err(ConfigError::UnsupportedScheme { .. })
		));
	}

	#[test]
	fn endpoints_join_onto_server() {
		let identity = Identity::no_auth("http://heketi.test:8080").expect("Identity should build.");
		let url = identity.endpoint("/volumes/abc").expect("Endpoint should resolve.");

		assert_eq!(url.as_str(), "http://heketi.test:8080/volumes/abc");
	}

	#[test]
	fn unparseable_endpoints_are_request_errors() {
		let identity = Identity::no_auth("http://heketi.test:8080").expect("Identity should build.");

		assert!(matches!(
			identity.endpoint("//[not-a-host"),
			Err(TransportError::InvalidPath { .. })
		));
	}
}

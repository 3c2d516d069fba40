//! Short-lived HS256 tokens bound to one HTTP method and path.
//!
//! Every outgoing request gets its own token: `iss` is the client user, `iat`/`exp` span a
//! five minute window, and `qsh` is the hex SHA-256 of `"<METHOD>&<path>"`. A token signed for
//! one (method, path) pair is rejected by the server for any other, so tokens are recomputed at
//! the point of send and never cached.

// crates.io
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use percent_encoding::percent_decode_str;
use sha2::{Digest, Sha256};
// self
use crate::{_prelude::*, auth::Identity, http::HttpRequest};

/// Lifetime of every signed token, in seconds.
pub const TOKEN_TTL_SECS: i64 = 300;
/// Scheme prefix of the `Authorization` header value.
pub const AUTHORIZATION_SCHEME: &str = "bearer";

/// Failures raised while signing a request; fatal and never retried.
#[derive(Debug, ThisError)]
pub enum SigningError {
	/// The signing primitive rejected the key or claims.
	#[error("Token could not be signed.")]
	Encode(#[source] jsonwebtoken::errors::Error),
	/// The signed token cannot be carried in an HTTP header.
	#[error("Signed token is not a valid header value.")]
	HeaderValue(#[from] http::header::InvalidHeaderValue),
}

/// Failures raised while checking a token against a secret and a request.
#[derive(Debug, ThisError)]
pub enum VerificationError {
	/// Signature, structure, or expiry check failed.
	#[error("Token failed validation.")]
	Decode(#[source] jsonwebtoken::errors::Error),
	/// Token was issued for a different method or path.
	#[error("Token is scoped to another request: expected qsh {expected}, found {found}.")]
	QueryHashMismatch {
		/// Hash computed for the request being checked.
		expected: String,
		/// Hash carried by the token.
		found: String,
	},
	/// Token lifetime is not the fixed five minute window.
	#[error("Token lifetime spans {iat}..{exp} instead of 300 seconds.")]
	Lifetime {
		/// Issued-at claim.
		iat: i64,
		/// Expiry claim.
		exp: i64,
	},
}

/// Claims carried by every signed token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
	/// Issuer: the client user, empty when authentication is disabled.
	pub iss: String,
	/// Issued-at, seconds since the Unix epoch.
	pub iat: i64,
	/// Expiry, always `iat + TOKEN_TTL_SECS`.
	pub exp: i64,
	/// Query string hash binding the token to one method and path.
	pub qsh: String,
}
impl TokenClaims {
	/// Builds claims for `method` + `path` issued at `issued_at`.
	pub fn new(
		issuer: impl Into<String>,
		method: &str,
		path: &str,
		issued_at: OffsetDateTime,
	) -> Self {
		let iat = issued_at.unix_timestamp();

		Self {
			iss: issuer.into(),
			iat,
			exp: iat + TOKEN_TTL_SECS,
			qsh: query_string_hash(method, path),
		}
	}
}

/// Hex-encoded SHA-256 of `"<method>&<path>"`.
pub fn query_string_hash(method: &str, path: &str) -> String {
	let mut hasher = Sha256::new();

	hasher.update(method.as_bytes());
	hasher.update(b"&");
	hasher.update(path.as_bytes());

	hex::encode(hasher.finalize())
}

/// Serializes and signs `claims` with `secret` as the raw HMAC-SHA256 key.
pub fn encode_claims(claims: &TokenClaims, secret: &[u8]) -> Result<String, SigningError> {
	jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &EncodingKey::from_secret(secret))
		.map_err(SigningError::Encode)
}

/// Produces a fresh token for `method` + `path` on behalf of `identity`.
pub fn sign(identity: &Identity, method: &Method, path: &str) -> Result<String, SigningError> {
	let claims =
		TokenClaims::new(identity.user(), method.as_str(), path, OffsetDateTime::now_utc());

	encode_claims(&claims, identity.secret().expose().as_bytes())
}

/// Signs `request` for its own method and path and stores the token in `Authorization`,
/// replacing any previous value. No other part of the request is touched.
///
/// The path is hashed percent-decoded, the form the server recomputes on its side.
pub fn sign_request(request: &mut HttpRequest, identity: &Identity) -> Result<(), SigningError> {
	let path = percent_decode_str(request.uri().path()).decode_utf8_lossy();
	let token = sign(identity, request.method(), &path)?;
	let mut value = HeaderValue::from_str(&format!("{AUTHORIZATION_SCHEME} {token}"))?;

	value.set_sensitive(true);
	request.headers_mut().insert(header::AUTHORIZATION, value);

	Ok(())
}

/// Validates `token` against `secret` and checks that it authorizes `method` + `path`.
///
/// Signature and expiry are checked by the JWT layer (with its default leeway); the `qsh`
/// binding and the fixed lifetime are checked here.
pub fn verify(
	token: &str,
	secret: &[u8],
	method: &str,
	path: &str,
) -> Result<TokenClaims, VerificationError> {
	let mut validation = Validation::new(Algorithm::HS256);

	validation.set_required_spec_claims(&["exp", "iss"]);

	let claims =
		jsonwebtoken::decode::<TokenClaims>(token, &DecodingKey::from_secret(secret), &validation)
			.map_err(VerificationError::Decode)?
			.claims;
	let expected = query_string_hash(method, path);

	if claims.qsh != expected {
		return Err(VerificationError::QueryHashMismatch { expected, found: claims.qsh });
	}
	if claims.exp - claims.iat != TOKEN_TTL_SECS {
		return Err(VerificationError::Lifetime { iat: claims.iat, exp: claims.exp });
	}

	Ok(claims)
}

/// Extracts the raw token from an `Authorization: bearer <token>` header value.
pub fn bearer_token(value: &HeaderValue) -> Option<&str> {
	let raw = value.to_str().ok()?;
	let (scheme, token) = raw.split_once(' ')?;

	scheme.eq_ignore_ascii_case(AUTHORIZATION_SCHEME).then_some(token)
}

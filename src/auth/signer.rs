//! Signed auth request construction.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Computes the auth signature: lowercase hex MD5 over
/// `app_id + app_key + timestamp_ms + app_secret`.
///
/// Inputs pass through unchecked; configuration validation rejects blank identities and secrets
/// before a client can sign anything.
pub fn sign(app_id: &str, app_key: &str, timestamp_ms: i64, app_secret: &str) -> String {
	let mut context = md5::Context::new();

	context.consume(app_id.as_bytes());
	context.consume(app_key.as_bytes());
	context.consume(timestamp_ms.to_string().as_bytes());
	context.consume(app_secret.as_bytes());

	format!("{:x}", context.compute())
}

/// JSON body posted to the auth endpoint; built once per fetch attempt.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedRequest {
	/// Application identifier.
	pub app_id: String,
	/// Application key.
	pub app_key: String,
	/// Millisecond Unix timestamp included in the signature.
	pub timestamp: i64,
	/// Signature produced by [`sign`].
	pub sign: String,
}
impl SignedRequest {
	/// Signs a request for the given identity at `timestamp_ms`.
	pub fn new(app_id: &str, app_key: &str, app_secret: &TokenSecret, timestamp_ms: i64) -> Self {
		Self {
			app_id: app_id.to_owned(),
			app_key: app_key.to_owned(),
			timestamp: timestamp_ms,
			sign: sign(app_id, app_key, timestamp_ms, app_secret.expose()),
		}
	}
}
impl Debug for SignedRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SignedRequest")
			.field("app_id", &self.app_id)
			.field("timestamp", &self.timestamp)
			.finish_non_exhaustive()
	}
}

/// Milliseconds since the Unix epoch.
pub fn unix_millis(instant: OffsetDateTime) -> i64 {
	(instant.unix_timestamp_nanos() / 1_000_000) as i64
}

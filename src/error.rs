//! Client-level error types shared across transport, token, and dispatch layers.

// self
use crate::_prelude::*;

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// No response was obtained (DNS, connect, timeout, I/O).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// A response arrived but could not be accepted.
	#[error(transparent)]
	Protocol(#[from] ProtocolError),
	/// Arguments were rejected before any request was issued.
	#[error(transparent)]
	Validation(#[from] ValidationError),

	/// The provider answered with a non-zero result code.
	#[error("{description}")]
	Domain {
		/// Provider result code.
		code: i64,
		/// Provider-supplied human-readable description.
		description: String,
	},
}
impl Error {
	/// Returns the provider result code when this is a [`Error::Domain`] failure.
	pub fn domain_code(&self) -> Option<i64> {
		match self {
			Self::Domain { code, .. } => Some(*code),
			_ => None,
		}
	}
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
	/// A required identity or secret field is empty.
	#[error("Configuration field `{field}` must not be empty.")]
	EmptyField {
		/// Name of the offending field.
		field: &'static str,
	},
	/// Host must use HTTP or HTTPS.
	#[error("Host must use http or https: {url}.")]
	UnsupportedHostScheme {
		/// Host URL that failed validation.
		url: String,
	},
	/// Endpoint path cannot be joined onto the host.
	#[error("Endpoint `{path}` cannot be joined onto the configured host.")]
	InvalidEndpoint {
		/// Endpoint path.
		path: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Retry budget must allow at least one attempt.
	#[error("Retry budget must allow at least one attempt.")]
	ZeroRetryBudget,
	/// Token validity window must be positive.
	#[error("Token validity window must be positive.")]
	NonPositiveValidity,
	/// Token validity window exceeds the accepted maximum.
	#[error("Token validity window must not exceed {max}.")]
	ValidityTooLong {
		/// Largest accepted window.
		max: Duration,
	},
	/// Request timeout must be positive.
	#[error("Request timeout must be positive.")]
	NonPositiveTimeout,
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

/// Transport-level failures where no response was obtained.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Connection could not be established; the request never left the local machine.
	#[error("Connection to the push endpoint could not be established.")]
	Connect {
		/// Transport-specific connect failure.
		#[source]
		source: BoxError,
	},
	/// The request may have reached the server but no response was read back.
	#[error("Network error occurred while calling the push endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a failure that happened before the request left the machine.
	pub fn connect(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Connect { source: Box::new(src) }
	}

	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Returns `true` when the request never left the local machine and is safe to resend.
	pub fn is_connect(&self) -> bool {
		matches!(self, Self::Connect { .. })
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_connect() { Self::connect(e) } else { Self::network(e) }
	}
}

/// The provider responded, but the response could not be accepted.
#[derive(Debug, ThisError)]
pub enum ProtocolError {
	/// Non-success HTTP status line.
	#[error("Push endpoint responded with HTTP {status}.")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Leading part of the response body for diagnostics.
		body_preview: String,
	},
	/// Response body is not the expected JSON document.
	#[error("Push endpoint returned malformed JSON.")]
	MalformedBody {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Response omitted a field required by the client.
	#[error("Push endpoint response is missing `{field}`.")]
	MissingField {
		/// Name of the missing field.
		field: &'static str,
	},
	/// Request body could not be encoded.
	#[error("Request body could not be encoded as JSON.")]
	Encode(#[source] serde_json::Error),
}

/// Arguments rejected before any network call.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ValidationError {
	/// Bulk send target count is outside the accepted range.
	#[error("Target count must be between {min} and {max} inclusive, got {count}.")]
	TargetCount {
		/// Number of targets supplied.
		count: usize,
		/// Inclusive lower bound.
		min: usize,
		/// Inclusive upper bound.
		max: usize,
	},
}

//! Client configuration, endpoint paths, and the validating builder.

// self
use crate::{
	_prelude::*,
	auth::{Credential, TokenSecret},
	error::ConfigError,
	transport::RetryBudget,
};

/// Provider endpoint paths resolved beneath [`PushConfig::host`].
pub mod endpoint {
	/// Production API host.
	pub const PRODUCTION_HOST: &str = "https://api-push.vivo.com.cn";
	/// Auth token endpoint.
	pub const AUTH: &str = "/message/auth";
	/// Single-device send.
	pub const SEND: &str = "/message/send";
	/// Stores a multicast payload and returns its task identifier.
	pub const SAVE_LIST_PAYLOAD: &str = "/message/saveListPayload";
	/// Pushes a saved payload to a device list.
	pub const PUSH_TO_LIST: &str = "/message/pushToList";
	/// Broadcast to every device.
	pub const PUSH_TO_ALL: &str = "/message/all";
	/// Delivery statistics by task identifier.
	pub const MESSAGE_STATUS: &str = "/report/getStatistics";
}

/// Immutable client configuration.
#[derive(Clone, Debug)]
pub struct PushConfig {
	/// Application identifier issued by the provider.
	pub app_id: String,
	/// Application key issued by the provider.
	pub app_key: String,
	/// Application secret used only for signing.
	pub app_secret: TokenSecret,
	/// Base URL every endpoint path is resolved beneath; always ends with `/`.
	pub host: Url,
	/// Period between background token refreshes.
	pub refresh_interval: Duration,
	/// Attempt ceiling for POST calls that fail before leaving the machine.
	pub retry: RetryBudget,
	/// Validity window stamped onto tokens when the provider does not declare one.
	pub validity_window: Duration,
	/// Upper bound on a single HTTP exchange, connect through body read.
	pub request_timeout: Duration,
}
impl PushConfig {
	/// Refresh period used when the caller supplies a zero or negative interval.
	pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::seconds(300);
	/// Request timeout applied by the default reqwest transport.
	pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::seconds(10);

	/// Creates a new builder for the provided application identity.
	pub fn builder(
		app_id: impl Into<String>,
		app_key: impl Into<String>,
		app_secret: impl Into<TokenSecret>,
	) -> PushConfigBuilder {
		PushConfigBuilder::new(app_id, app_key, app_secret)
	}

	/// Resolves an endpoint path beneath the configured host, keeping any host path prefix.
	pub fn endpoint(&self, path: &'static str) -> Result<Url, ConfigError> {
		self.host
			.join(path.trim_start_matches('/'))
			.map_err(|source| ConfigError::InvalidEndpoint { path, source })
	}
}

/// Builder for [`PushConfig`] values.
#[derive(Debug)]
pub struct PushConfigBuilder {
	/// Application identifier.
	pub app_id: String,
	/// Application key.
	pub app_key: String,
	/// Application secret.
	pub app_secret: TokenSecret,
	/// Optional host override.
	pub host: Option<Url>,
	/// Requested refresh period; non-positive values fall back to the default.
	pub refresh_interval: Duration,
	/// Transport retry budget.
	pub retry: RetryBudget,
	/// Fallback token validity window.
	pub validity_window: Duration,
	/// Per-request timeout.
	pub request_timeout: Duration,
}
impl PushConfigBuilder {
	/// Creates a new builder seeded with the application identity.
	pub fn new(
		app_id: impl Into<String>,
		app_key: impl Into<String>,
		app_secret: impl Into<TokenSecret>,
	) -> Self {
		Self {
			app_id: app_id.into(),
			app_key: app_key.into(),
			app_secret: app_secret.into(),
			host: None,
			refresh_interval: PushConfig::DEFAULT_REFRESH_INTERVAL,
			retry: RetryBudget::default(),
			validity_window: Credential::DEFAULT_VALIDITY,
			request_timeout: PushConfig::DEFAULT_REQUEST_TIMEOUT,
		}
	}

	/// Overrides the API host (defaults to the production host).
	pub fn host(mut self, url: Url) -> Self {
		self.host = Some(url);

		self
	}

	/// Sets the background refresh period.
	pub fn refresh_interval(mut self, interval: Duration) -> Self {
		self.refresh_interval = interval;

		self
	}

	/// Sets the refresh period in whole seconds.
	pub fn refresh_interval_secs(self, secs: i64) -> Self {
		self.refresh_interval(Duration::seconds(secs))
	}

	/// Overrides the transport retry budget.
	pub fn retry(mut self, retry: RetryBudget) -> Self {
		self.retry = retry;

		self
	}

	/// Overrides the fallback token validity window.
	pub fn validity_window(mut self, window: Duration) -> Self {
		self.validity_window = window;

		self
	}

	/// Overrides the per-request timeout.
	pub fn request_timeout(mut self, timeout: Duration) -> Self {
		self.request_timeout = timeout;

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<PushConfig, ConfigError> {
		let mut host = match self.host {
			Some(host) => host,
			None => Url::parse(endpoint::PRODUCTION_HOST).map_err(|source| {
				ConfigError::InvalidEndpoint { path: endpoint::PRODUCTION_HOST, source }
			})?,
		};
		if !host.path().ends_with('/') {
			let path = format!("{}/", host.path());

			host.set_path(&path);
		}

		let refresh_interval = if self.refresh_interval.is_positive() {
			self.refresh_interval
		} else {
			PushConfig::DEFAULT_REFRESH_INTERVAL
		};
		let config = PushConfig {
			app_id: self.app_id,
			app_key: self.app_key,
			app_secret: self.app_secret,
			host,
			refresh_interval,
			retry: self.retry,
			validity_window: self.validity_window,
			request_timeout: self.request_timeout,
		};

		config.validate()?;

		Ok(config)
	}
}

impl PushConfig {
	fn validate(&self) -> Result<(), ConfigError> {
		validate_field("app_id", &self.app_id)?;
		validate_field("app_key", &self.app_key)?;

		if self.app_secret.is_blank() {
			return Err(ConfigError::EmptyField { field: "app_secret" });
		}
		if !matches!(self.host.scheme(), "http" | "https") {
			return Err(ConfigError::UnsupportedHostScheme { url: self.host.to_string() });
		}
		if self.retry.max_attempts() == 0 {
			return Err(ConfigError::ZeroRetryBudget);
		}
		if !self.validity_window.is_positive() {
			return Err(ConfigError::NonPositiveValidity);
		}
		if self.validity_window > Credential::MAX_VALIDITY {
			return Err(ConfigError::ValidityTooLong { max: Credential::MAX_VALIDITY });
		}
		if !self.request_timeout.is_positive() {
			return Err(ConfigError::NonPositiveTimeout);
		}

		Ok(())
	}
}

fn validate_field(field: &'static str, value: &str) -> Result<(), ConfigError> {
	if value.trim().is_empty() { Err(ConfigError::EmptyField { field }) } else { Ok(()) }
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn defaults_target_production() {
		let config = PushConfig::builder("10086", "key", "secret")
			.build()
			.expect("Default configuration should be valid.");

		assert_eq!(config.host.as_str(), "https://api-push.vivo.com.cn/");
		assert_eq!(config.refresh_interval, Duration::seconds(300));
		assert_eq!(config.retry, RetryBudget::default());
		assert_eq!(config.validity_window, Duration::hours(1));
		assert_eq!(config.request_timeout, Duration::seconds(10));
		assert_eq!(
			config.endpoint(endpoint::AUTH).expect("Auth endpoint should resolve.").as_str(),
			"https://api-push.vivo.com.cn/message/auth"
		);
	}

	#[test]
	fn non_positive_refresh_interval_falls_back_to_default() {
		for secs in [0, -5] {
			let config = PushConfig::builder("10086", "key", "secret")
				.refresh_interval_secs(secs)
				.build()
				.expect("Non-positive intervals should fall back instead of failing.");

			assert_eq!(config.refresh_interval, PushConfig::DEFAULT_REFRESH_INTERVAL);
		}

		let config = PushConfig::builder("10086", "key", "secret")
			.refresh_interval_secs(1)
			.build()
			.expect("Positive intervals should be kept.");

		assert_eq!(config.refresh_interval, Duration::seconds(1));
	}

	#[test]
	fn blank_identity_fields_are_rejected() {
		let err = PushConfig::builder(" ", "key", "secret")
			.build()
			.expect_err("Blank app_id should be rejected.");

		assert!(matches!(err, ConfigError::EmptyField { field: "app_id" }));

		let err = PushConfig::builder("10086", "", "secret")
			.build()
			.expect_err("Blank app_key should be rejected.");

		assert!(matches!(err, ConfigError::EmptyField { field: "app_key" }));

		let err = PushConfig::builder("10086", "key", "")
			.build()
			.expect_err("Blank app_secret should be rejected.");

		assert!(matches!(err, ConfigError::EmptyField { field: "app_secret" }));
	}

	#[test]
	fn unsupported_host_and_zero_budget_are_rejected() {
		let err = PushConfig::builder("10086", "key", "secret")
			.host(Url::parse("ftp://example.com").expect("Fixture URL should parse."))
			.build()
			.expect_err("Non-HTTP hosts should be rejected.");

		assert!(matches!(err, ConfigError::UnsupportedHostScheme { .. }));

		let err = PushConfig::builder("10086", "key", "secret")
			.retry(RetryBudget::new(0))
			.build()
			.expect_err("A zero retry budget should be rejected.");

		assert!(matches!(err, ConfigError::ZeroRetryBudget));

		let err = PushConfig::builder("10086", "key", "secret")
			.validity_window(Duration::ZERO)
			.build()
			.expect_err("A zero validity window should be rejected.");

		assert!(matches!(err, ConfigError::NonPositiveValidity));
	}

	#[test]
	fn oversized_validity_and_zero_timeout_are_rejected() {
		let err = PushConfig::builder("10086", "key", "secret")
			.validity_window(Duration::days(2))
			.build()
			.expect_err("A validity window over a day should be rejected.");

		assert!(matches!(err, ConfigError::ValidityTooLong { .. }));

		let err = PushConfig::builder("10086", "key", "secret")
			.request_timeout(Duration::ZERO)
			.build()
			.expect_err("A zero request timeout should be rejected.");

		assert!(matches!(err, ConfigError::NonPositiveTimeout));
	}

	#[test]
	fn host_path_prefix_is_kept() {
		for host in ["https://gw.example.com/vivo", "https://gw.example.com/vivo/"] {
			let config = PushConfig::builder("10086", "key", "secret")
				.host(Url::parse(host).expect("Fixture URL should parse."))
				.build()
				.expect("Prefixed hosts should be accepted.");

			assert_eq!(config.host.as_str(), "https://gw.example.com/vivo/");
			assert_eq!(
				config.endpoint(endpoint::SEND).expect("Send endpoint should resolve.").as_str(),
				"https://gw.example.com/vivo/message/send"
			);
		}
	}
}

//! Request execution with a bounded, side-effect-safe retry policy.
//!
//! [`Transport`] owns the shared [`PushHttpClient`] and turns raw responses into body bytes.
//! POST calls whose failure is classified as a connect failure are resent immediately until the
//! [`RetryBudget`] is spent. Nothing else is retried: a GET, a timeout, or a broken response
//! might have reached the provider, and resending a push would deliver it twice.

// self
use crate::{
	_prelude::*,
	error::{ProtocolError, TransportError},
	http::{HttpMethod, HttpRequest, HttpResponse, PushHttpClient},
};

const BODY_PREVIEW_LIMIT: usize = 256;

/// Attempt ceiling for a single logical POST call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RetryBudget(u32);
impl RetryBudget {
	/// Total attempts allowed by default.
	pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

	/// Creates a budget allowing `max_attempts` attempts in total.
	pub const fn new(max_attempts: u32) -> Self {
		Self(max_attempts)
	}

	/// A budget that never resends.
	pub const fn single() -> Self {
		Self(1)
	}

	/// Total attempts allowed, including the first.
	pub const fn max_attempts(self) -> u32 {
		self.0
	}

	/// Returns `true` if another attempt may follow attempt number `attempt` (1-based).
	pub const fn allows_after(self, attempt: u32) -> bool {
		attempt < self.0
	}
}
impl Default for RetryBudget {
	fn default() -> Self {
		Self(Self::DEFAULT_MAX_ATTEMPTS)
	}
}

/// Executes push API calls over a shared HTTP client.
pub struct Transport<C>
where
	C: ?Sized + PushHttpClient,
{
	http_client: Arc<C>,
	retry: RetryBudget,
}
impl<C> Transport<C>
where
	C: ?Sized + PushHttpClient,
{
	/// Wraps a long-lived HTTP client.
	pub fn new(http_client: impl Into<Arc<C>>, retry: RetryBudget) -> Self {
		Self { http_client: http_client.into(), retry }
	}

	/// Executes a call and returns the response body of a 2xx response.
	///
	/// Every request carries `Content-Type: application/json` followed by `headers`.
	pub async fn execute(
		&self,
		method: HttpMethod,
		url: Url,
		body: Vec<u8>,
		headers: &[(&'static str, &str)],
	) -> Result<Vec<u8>> {
		let mut request_headers = Vec::with_capacity(headers.len() + 1);

		request_headers.push(("Content-Type", "application/json".to_owned()));
		request_headers.extend(headers.iter().map(|(name, value)| (*name, (*value).to_owned())));

		let request = HttpRequest { method, url, headers: request_headers, body };
		let response = match method {
			HttpMethod::Post => self.call_with_retry(request).await?,
			HttpMethod::Get => self.http_client.call(request).await?,
		};

		if !response.is_success() {
			return Err(ProtocolError::Status {
				status: response.status,
				body_preview: body_preview(&response.body),
			}
			.into());
		}

		Ok(response.body)
	}

	async fn call_with_retry(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
		let mut attempt = 1;

		loop {
			match self.http_client.call(request.clone()).await {
				Err(err) if err.is_connect() && self.retry.allows_after(attempt) => {
					#[cfg(feature = "tracing")]
					tracing::debug!(
						attempt,
						max_attempts = self.retry.max_attempts(),
						url = request.url.as_str(),
						error = %err,
						"Connection failed before dispatch; resending."
					);

					attempt += 1;
				},
				result => return result,
			}
		}
	}
}
impl<C> Debug for Transport<C>
where
	C: ?Sized + PushHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Transport").field("retry", &self.retry).finish()
	}
}

fn body_preview(body: &[u8]) -> String {
	String::from_utf8_lossy(body).chars().take(BODY_PREVIEW_LIMIT).collect()
}

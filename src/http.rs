//! HTTP client seam used by the transport layer.
//!
//! [`PushHttpClient`] is the crate's only dependency on an HTTP stack. Implementations execute a
//! single request without retrying and classify failures: anything that happened before the
//! request left the machine must surface as [`TransportError::Connect`], because the transport
//! only resends those. The default [`ReqwestHttpClient`] wraps one pooled
//! [`ReqwestClient`](reqwest::Client) that is shared by every call a client makes.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// self
use crate::{_prelude::*, error::TransportError};

/// Boxed future returned by [`PushHttpClient::call`].
pub type HttpFuture<'a> =
	Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of executing push API calls.
///
/// Implementations must be `Send + Sync + 'static` so one instance can be shared by the
/// dispatcher and the background refresher.
pub trait PushHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Executes `request` once.
	fn call(&self, request: HttpRequest) -> HttpFuture<'_>;
}

/// HTTP methods used by the push API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
	/// Read-only query.
	Get,
	/// State-changing call with a JSON body.
	Post,
}
impl HttpMethod {
	/// Returns the method token.
	pub const fn as_str(self) -> &'static str {
		match self {
			HttpMethod::Get => "GET",
			HttpMethod::Post => "POST",
		}
	}
}
impl Display for HttpMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outbound request handed to a [`PushHttpClient`].
#[derive(Clone)]
pub struct HttpRequest {
	/// Request method.
	pub method: HttpMethod,
	/// Absolute URL, including any query string.
	pub url: Url,
	/// Header pairs in dispatch order.
	pub headers: Vec<(&'static str, String)>,
	/// Request body; empty for GET.
	pub body: Vec<u8>,
}
impl Debug for HttpRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let header_names = self.headers.iter().map(|(name, _)| *name).collect::<Vec<_>>();

		f.debug_struct("HttpRequest")
			.field("method", &self.method)
			.field("url", &self.url.as_str())
			.field("headers", &header_names)
			.field("body_len", &self.body.len())
			.finish()
	}
}

/// Raw response returned by a [`PushHttpClient`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
	/// HTTP status code.
	pub status: u16,
	/// Response body bytes.
	pub body: Vec<u8>,
}
impl HttpResponse {
	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// Thin wrapper around [`ReqwestClient`] so connection pooling is shared across calls.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client whose requests give up after `timeout`.
	pub fn with_timeout(timeout: std::time::Duration) -> Result<Self, crate::error::ConfigError> {
		Ok(Self(ReqwestClient::builder().timeout(timeout).build()?))
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl PushHttpClient for ReqwestHttpClient {
	fn call(&self, request: HttpRequest) -> HttpFuture<'_> {
		Box::pin(async move {
			let method = match request.method {
				HttpMethod::Get => reqwest::Method::GET,
				HttpMethod::Post => reqwest::Method::POST,
			};
			let mut builder = self.0.request(method, request.url);

			for (name, value) in request.headers {
				builder = builder.header(name, value);
			}
			if request.method == HttpMethod::Post {
				builder = builder.body(request.body);
			}

			let response = builder.send().await?;
			let status = response.status().as_u16();
			let body = response.bytes().await?.to_vec();

			Ok::<_, TransportError>(HttpResponse { status, body })
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn request_debug_hides_header_values() {
		let request = HttpRequest {
			method: HttpMethod::Post,
			url: Url::parse("https://api-push.vivo.com.cn/message/send")
				.expect("Fixture URL should parse."),
			headers: vec![("authToken", "live-token".into())],
			body: b"{}".to_vec(),
		};
		let rendered = format!("{request:?}");

		assert!(rendered.contains("authToken"));
		assert!(!rendered.contains("live-token"));
	}

	#[test]
	fn success_covers_2xx_only() {
		assert!(HttpResponse { status: 200, body: Vec::new() }.is_success());
		assert!(HttpResponse { status: 204, body: Vec::new() }.is_success());
		assert!(!HttpResponse { status: 302, body: Vec::new() }.is_success());
		assert!(!HttpResponse { status: 500, body: Vec::new() }.is_success());
	}
}

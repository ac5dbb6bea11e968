//! Async vivo push client with a self-refreshing auth token, bounded transport retries, and typed
//! dispatch results.
//!
//! [`PushClient`](dispatch::PushClient) signs and fetches the first auth token while it is being
//! constructed, keeps it in a per-client [`TokenStore`](store::TokenStore), and spawns a
//! cancellable background refresher that replaces the token on a fixed interval. Every send or
//! status query attaches the current token, runs through a [`Transport`](transport::Transport)
//! that only retries POST calls which never left the machine, and turns non-zero provider result
//! codes into [`Error::Domain`](error::Error::Domain).

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod message;
pub mod obs;
pub mod store;
pub mod token;
pub mod transport;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for tests; enabled via `cfg(test)` or the `test` crate
	//! feature.

	pub use crate::_prelude::*;

	// std
	use std::collections::VecDeque;
	// self
	use crate::{
		config::PushConfig,
		error::TransportError,
		http::{HttpFuture, HttpMethod, HttpRequest, HttpResponse, PushHttpClient},
	};

	/// Canned reply served by [`ScriptedHttpClient`].
	#[derive(Clone, Debug)]
	pub enum Reply {
		/// A response with the given status line and body.
		Respond {
			/// HTTP status code.
			status: u16,
			/// Raw response body.
			body: String,
		},
		/// The connection could not be established; the request never left the machine.
		ConnectFailure,
		/// The request was dispatched but no response was read back.
		NetworkFailure,
	}
	impl Reply {
		/// `200 OK` with the provided JSON body.
		pub fn ok(body: impl Into<String>) -> Self {
			Self::Respond { status: 200, body: body.into() }
		}

		/// Auth endpoint success carrying `token`.
		pub fn auth_token(token: &str) -> Self {
			Self::ok(
				serde_json::json!({ "result": 0, "desc": "请求成功", "authToken": token }).to_string(),
			)
		}

		/// Result envelope with the provided code, description, and optional task identifier.
		pub fn envelope(result: i64, desc: &str, task_id: Option<&str>) -> Self {
			match task_id {
				Some(task_id) => Self::ok(format!(
					"{{\"result\":{result},\"desc\":\"{desc}\",\"taskId\":\"{task_id}\"}}"
				)),
				None => Self::ok(format!("{{\"result\":{result},\"desc\":\"{desc}\"}}")),
			}
		}
	}

	/// Request observed by [`ScriptedHttpClient`].
	#[derive(Clone, Debug)]
	pub struct RecordedCall {
		/// HTTP method.
		pub method: HttpMethod,
		/// Request path without the query string.
		pub path: String,
		/// Raw query string, if any.
		pub query: Option<String>,
		/// Header pairs in dispatch order.
		pub headers: Vec<(&'static str, String)>,
		/// Request body.
		pub body: Vec<u8>,
	}
	impl RecordedCall {
		/// Returns the first header value registered under `name`.
		pub fn header(&self, name: &str) -> Option<&str> {
			self.headers.iter().find(|(key, _)| *key == name).map(|(_, value)| value.as_str())
		}

		/// Parses the body as JSON.
		pub fn json(&self) -> serde_json::Value {
			serde_json::from_slice(&self.body).expect("Recorded body should be valid JSON.")
		}
	}

	/// In-process [`PushHttpClient`] that serves scripted replies per path and records calls.
	///
	/// Replies queued for a path are consumed in order; the last one keeps repeating.
	#[derive(Debug, Default)]
	pub struct ScriptedHttpClient {
		replies: Mutex<HashMap<String, VecDeque<Reply>>>,
		calls: Mutex<Vec<RecordedCall>>,
	}
	impl ScriptedHttpClient {
		/// Appends a reply for `path`.
		pub fn push(&self, path: &str, reply: Reply) -> &Self {
			self.replies.lock().entry(path.to_owned()).or_default().push_back(reply);

			self
		}

		/// Replaces every queued reply for `path`.
		pub fn set(&self, path: &str, reply: Reply) -> &Self {
			self.replies.lock().insert(path.to_owned(), VecDeque::from([reply]));

			self
		}

		/// Every call observed so far.
		pub fn calls(&self) -> Vec<RecordedCall> {
			self.calls.lock().clone()
		}

		/// Calls observed for `path`.
		pub fn calls_to(&self, path: &str) -> Vec<RecordedCall> {
			self.calls.lock().iter().filter(|call| call.path == path).cloned().collect()
		}

		fn next_reply(&self, path: &str) -> Option<Reply> {
			let mut replies = self.replies.lock();
			let queue = replies.get_mut(path)?;

			if queue.len() > 1 { queue.pop_front() } else { queue.front().cloned() }
		}
	}
	impl PushHttpClient for ScriptedHttpClient {
		fn call(&self, request: HttpRequest) -> HttpFuture<'_> {
			let path = request.url.path().to_owned();

			self.calls.lock().push(RecordedCall {
				method: request.method,
				path: path.clone(),
				query: request.url.query().map(ToOwned::to_owned),
				headers: request.headers,
				body: request.body,
			});

			let reply = self.next_reply(&path);

			Box::pin(async move {
				match reply {
					Some(Reply::Respond { status, body }) =>
						Ok(HttpResponse { status, body: body.into_bytes() }),
					Some(Reply::ConnectFailure) => Err(TransportError::connect(
						std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused"),
					)),
					Some(Reply::NetworkFailure) => Err(TransportError::network(
						std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset"),
					)),
					None => Err(TransportError::network(std::io::Error::new(
						std::io::ErrorKind::NotFound,
						format!("no reply scripted for {path}"),
					))),
				}
			})
		}
	}

	/// Builds a configuration pointing at `host` with fixed test credentials.
	pub fn test_config(host: &str) -> PushConfig {
		PushConfig::builder("10086", "test-app-key", "test-app-secret")
			.host(Url::parse(host).expect("Test host should parse."))
			.build()
			.expect("Test configuration should be valid.")
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};

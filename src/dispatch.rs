//! Authenticated dispatch against the push API.
//!
//! [`PushClient`] ties the shared [`Transport`], the [`Authenticator`] that owns the client's
//! token store, and the background refresher together. Every operation obtains the current
//! credential, attaches it as the `authToken` header, decodes the provider's result envelope,
//! and turns a non-zero result code into [`Error::Domain`].

mod sender;
mod tracer;

pub use sender::{MAX_LIST_TARGETS, MIN_LIST_TARGETS};

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	config::PushConfig,
	error::ProtocolError,
	http::{HttpMethod, PushHttpClient},
	message::ResultEnvelope,
	store::TokenStore,
	token::{self, Authenticator, RefreshMetrics, RefresherHandle},
	transport::Transport,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

/// Header carrying the auth token on every authenticated request.
pub const AUTH_TOKEN_HEADER: &str = "authToken";

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestPushClient = PushClient<ReqwestHttpClient>;

/// Push API client with a self-refreshing auth token.
///
/// Cloning is cheap and every clone shares the same transport, token store, and refresher. The
/// refresher stops once [`PushClient::shutdown`] is called or the last clone is dropped.
pub struct PushClient<C>
where
	C: ?Sized + PushHttpClient,
{
	config: Arc<PushConfig>,
	transport: Arc<Transport<C>>,
	authenticator: Arc<Authenticator<C>>,
	refresher: Arc<RefresherHandle>,
}
impl<C> PushClient<C>
where
	C: ?Sized + PushHttpClient,
{
	/// Fetches the first auth token over `http_client` and starts the background refresher.
	///
	/// Fails if the first token cannot be obtained. Must be called from within a tokio runtime.
	pub async fn with_http_client(
		config: PushConfig,
		http_client: impl Into<Arc<C>>,
	) -> Result<Self> {
		let config = Arc::new(config);
		let transport = Arc::new(Transport::new(http_client, config.retry));
		let authenticator =
			Arc::new(Authenticator::connect(config.clone(), transport.clone()).await?);
		let refresher = Arc::new(token::spawn(authenticator.clone(), config.refresh_interval));

		#[cfg(feature = "tracing")]
		tracing::info!(
			app_id = %config.app_id,
			refresh_secs = config.refresh_interval.whole_seconds(),
			"Push client connected."
		);

		Ok(Self { config, transport, authenticator, refresher })
	}

	/// Returns the client configuration.
	pub fn config(&self) -> &PushConfig {
		&self.config
	}

	/// Returns the store holding the current credential.
	pub fn token_store(&self) -> &TokenStore {
		self.authenticator.store()
	}

	/// Returns the background refresh counters.
	pub fn refresh_metrics(&self) -> &RefreshMetrics {
		self.refresher.metrics()
	}

	/// Stops the background refresher and waits for it to exit.
	///
	/// Dispatch keeps working afterwards; expired tokens are then fetched inline.
	pub async fn shutdown(&self) {
		self.refresher.shutdown().await;
	}

	async fn post<B, T>(&self, path: &'static str, body: &B) -> Result<T>
	where
		B: ?Sized + Serialize,
		T: DeserializeOwned + ResultEnvelope,
	{
		let url = self.config.endpoint(path)?;
		let body = serde_json::to_vec(body).map_err(ProtocolError::Encode)?;

		self.dispatch(HttpMethod::Post, url, body).await
	}

	async fn get<T>(&self, url: Url) -> Result<T>
	where
		T: DeserializeOwned + ResultEnvelope,
	{
		self.dispatch(HttpMethod::Get, url, Vec::new()).await
	}

	async fn dispatch<T>(&self, method: HttpMethod, url: Url, body: Vec<u8>) -> Result<T>
	where
		T: DeserializeOwned + ResultEnvelope,
	{
		let credential = self.authenticator.credential().await?;
		let bytes = self
			.transport
			.execute(method, url, body, &[(AUTH_TOKEN_HEADER, credential.token.expose())])
			.await?;

		ensure_success(decode(&bytes)?)
	}
}
#[cfg(feature = "reqwest")]
impl PushClient<ReqwestHttpClient> {
	/// Connects with a fresh pooled reqwest client bounded by [`PushConfig::request_timeout`].
	pub async fn connect(config: PushConfig) -> Result<Self> {
		let http_client = ReqwestHttpClient::with_timeout(config.request_timeout.unsigned_abs())?;

		Self::with_http_client(config, http_client).await
	}
}
impl<C> Clone for PushClient<C>
where
	C: ?Sized + PushHttpClient,
{
	fn clone(&self) -> Self {
		Self {
			config: self.config.clone(),
			transport: self.transport.clone(),
			authenticator: self.authenticator.clone(),
			refresher: self.refresher.clone(),
		}
	}
}
impl<C> Debug for PushClient<C>
where
	C: ?Sized + PushHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("PushClient")
			.field("host", &self.config.host.as_str())
			.field("app_id", &self.config.app_id)
			.field("transport", &self.transport)
			.field("refresher", &self.refresher)
			.finish()
	}
}

/// Decodes a JSON response body, keeping the path of the first offending field.
pub(crate) fn decode<T>(bytes: &[u8]) -> Result<T>
where
	T: DeserializeOwned,
{
	let mut deserializer = serde_json::Deserializer::from_slice(bytes);

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| ProtocolError::MalformedBody { source }.into())
}

/// Turns a non-zero provider result code into [`Error::Domain`].
pub(crate) fn ensure_success<T>(envelope: T) -> Result<T>
where
	T: ResultEnvelope,
{
	match envelope.result_code() {
		0 => Ok(envelope),
		code => Err(Error::Domain { code, description: envelope.description().to_owned() }),
	}
}

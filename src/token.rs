//! Auth token lifecycle: signed fetches, the cached fast path, and the background refresher.
//!
//! [`Authenticator`] owns the client's [`TokenStore`]. [`Authenticator::credential`] answers from
//! the store while the current credential is still valid and only falls back to a signed fetch
//! once it has expired; a single-flight guard makes concurrent callers share one fetch.
//! [`Authenticator::refresh`] always fetches and overwrites the store, which is what the
//! [`refresher`] task runs on every tick.

pub mod refresher;

pub use refresher::*;

// self
use crate::{
	_prelude::*,
	auth::{Credential, SignedRequest, unix_millis},
	config::{PushConfig, endpoint},
	dispatch::decode,
	error::ProtocolError,
	http::{HttpMethod, PushHttpClient},
	message::ResultEnvelope,
	obs::{self, OpKind},
	store::TokenStore,
	transport::Transport,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
	#[serde(default)]
	result: i64,
	#[serde(default)]
	desc: String,
	auth_token: Option<String>,
	/// Provider-declared token lifetime in seconds.
	expire_time: Option<i64>,
}
impl ResultEnvelope for AuthResponse {
	fn result_code(&self) -> i64 {
		self.result
	}

	fn description(&self) -> &str {
		&self.desc
	}
}

/// Fetches credentials and keeps the latest one in a [`TokenStore`].
pub struct Authenticator<C>
where
	C: ?Sized + PushHttpClient,
{
	config: Arc<PushConfig>,
	transport: Arc<Transport<C>>,
	store: TokenStore,
	fetch_guard: AsyncMutex<()>,
}
impl<C> Authenticator<C>
where
	C: ?Sized + PushHttpClient,
{
	/// Fetches the first credential and seeds the store with it.
	///
	/// Fails when the first fetch fails; there is no credential to fall back on yet.
	pub async fn connect(config: Arc<PushConfig>, transport: Arc<Transport<C>>) -> Result<Self> {
		let credential =
			obs::observe(OpKind::Auth, "connect", fetch_credential(&config, &transport)).await?;

		Ok(Self::with_store(config, transport, TokenStore::new(credential)))
	}

	/// Wraps an existing store without fetching.
	pub fn with_store(
		config: Arc<PushConfig>,
		transport: Arc<Transport<C>>,
		store: TokenStore,
	) -> Self {
		Self { config, transport, store, fetch_guard: AsyncMutex::new(()) }
	}

	/// Returns the store holding the current credential.
	pub fn store(&self) -> &TokenStore {
		&self.store
	}

	/// Returns a usable credential, fetching only when the stored one has expired.
	pub async fn credential(&self) -> Result<Arc<Credential>> {
		if let Some(current) = self.store.valid_at(OffsetDateTime::now_utc()) {
			return Ok(current);
		}

		let _singleflight = self.fetch_guard.lock().await;

		// Another caller may have installed a fresh credential while this one waited.
		if let Some(current) = self.store.valid_at(OffsetDateTime::now_utc()) {
			return Ok(current);
		}

		obs::observe(OpKind::Auth, "credential", async {
			let credential = fetch_credential(&self.config, &self.transport).await?;

			self.store.replace(credential);

			Ok(self.store.current())
		})
		.await
	}

	/// Fetches a new credential and installs it regardless of the current one's validity.
	///
	/// The store is left untouched when the fetch fails.
	pub async fn refresh(&self) -> Result<Arc<Credential>> {
		let _singleflight = self.fetch_guard.lock().await;

		obs::observe(OpKind::Refresh, "refresh", async {
			let credential = fetch_credential(&self.config, &self.transport).await?;

			self.store.replace(credential);

			Ok(self.store.current())
		})
		.await
	}
}
impl<C> Debug for Authenticator<C>
where
	C: ?Sized + PushHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Authenticator")
			.field("app_id", &self.config.app_id)
			.field("store", &self.store)
			.finish()
	}
}

/// Signs and posts one auth request, stamping the token with its validity window.
///
/// A positive provider-declared lifetime wins over the configured fallback window.
async fn fetch_credential<C>(config: &PushConfig, transport: &Transport<C>) -> Result<Credential>
where
	C: ?Sized + PushHttpClient,
{
	let issued_at = OffsetDateTime::now_utc();
	let request = SignedRequest::new(
		&config.app_id,
		&config.app_key,
		&config.app_secret,
		unix_millis(issued_at),
	);
	let body = serde_json::to_vec(&request).map_err(ProtocolError::Encode)?;
	let url = config.endpoint(endpoint::AUTH)?;
	let bytes = transport.execute(HttpMethod::Post, url, body, &[]).await?;
	let response = decode::<AuthResponse>(&bytes)?;

	if response.result_code() != 0 {
		return Err(Error::Domain { code: response.result_code(), description: response.desc });
	}

	let token = response
		.auth_token
		.filter(|token| !token.is_empty())
		.ok_or(ProtocolError::MissingField { field: "authToken" })?;
	let validity = provider_validity(response.expire_time).unwrap_or(config.validity_window);

	#[cfg(feature = "tracing")]
	tracing::debug!(
		app_id = %config.app_id,
		validity_secs = validity.whole_seconds(),
		"Fetched auth token."
	);

	Ok(Credential::new(token, issued_at, validity))
}

/// Accepts a provider-declared lifetime in seconds only when it is positive and within
/// [`Credential::MAX_VALIDITY`].
fn provider_validity(expire_time: Option<i64>) -> Option<Duration> {
	let secs = expire_time.filter(|secs| *secs > 0)?;

	if secs > Credential::MAX_VALIDITY.whole_seconds() {
		#[cfg(feature = "tracing")]
		tracing::warn!(expire_time = secs, "Ignoring implausible provider token lifetime.");

		return None;
	}

	Some(Duration::seconds(secs))
}

//! Background refresh task with cooperative shutdown.
//!
//! [`spawn`] starts one task per client. Each tick forces [`Authenticator::refresh`]; a failed
//! cycle is logged and counted, the previous credential stays in the store, and the task simply
//! waits for the next tick. The task stops when [`RefresherHandle::shutdown`] is called or when
//! the handle is dropped.

mod metrics;

pub use metrics::RefreshMetrics;

// crates.io
use tokio::{
	sync::watch,
	task::JoinHandle,
	time::{self, MissedTickBehavior},
};
// self
use crate::{_prelude::*, config::PushConfig, http::PushHttpClient, token::Authenticator};

/// Owns the background refresh task; dropping it stops the task.
#[derive(Debug)]
pub struct RefresherHandle {
	shutdown: watch::Sender<bool>,
	task: Mutex<Option<JoinHandle<()>>>,
	metrics: Arc<RefreshMetrics>,
	interval: Duration,
}
impl RefresherHandle {
	/// Returns the refresh cycle counters.
	pub fn metrics(&self) -> &RefreshMetrics {
		&self.metrics
	}

	/// Returns the effective refresh period.
	pub fn interval(&self) -> Duration {
		self.interval
	}

	/// Returns `true` while the task has neither finished nor been shut down.
	pub fn is_running(&self) -> bool {
		self.task.lock().as_ref().is_some_and(|task| !task.is_finished())
	}

	/// Signals the task to stop and waits for it to exit.
	///
	/// An in-flight refresh cycle is allowed to finish first. Calling this more than once is a
	/// no-op.
	pub async fn shutdown(&self) {
		self.shutdown.send_replace(true);

		let task = self.task.lock().take();

		let Some(task) = task else { return };

		if let Err(err) = task.await {
			#[cfg(feature = "tracing")]
			tracing::error!(error = %err, "Auth token refresher exited abnormally.");
			#[cfg(not(feature = "tracing"))]
			let _ = err;
		}
	}
}

/// Spawns the refresh task on the current tokio runtime.
///
/// The first refresh happens one full `interval` after spawning, since the store was seeded
/// during construction. A non-positive `interval` falls back to
/// [`PushConfig::DEFAULT_REFRESH_INTERVAL`].
pub fn spawn<C>(authenticator: Arc<Authenticator<C>>, interval: Duration) -> RefresherHandle
where
	C: ?Sized + PushHttpClient,
{
	let interval =
		if interval.is_positive() { interval } else { PushConfig::DEFAULT_REFRESH_INTERVAL };
	let (shutdown, receiver) = watch::channel(false);
	let metrics = Arc::<RefreshMetrics>::default();
	let task = tokio::spawn(run(authenticator, interval, receiver, metrics.clone()));

	RefresherHandle { shutdown, task: Mutex::new(Some(task)), metrics, interval }
}

async fn run<C>(
	authenticator: Arc<Authenticator<C>>,
	interval: Duration,
	mut shutdown: watch::Receiver<bool>,
	metrics: Arc<RefreshMetrics>,
) where
	C: ?Sized + PushHttpClient,
{
	let period = interval.unsigned_abs();
	let mut ticker = time::interval_at(time::Instant::now() + period, period);

	ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

	loop {
		tokio::select! {
			_ = ticker.tick() => refresh_cycle(&authenticator, &metrics).await,
			changed = shutdown.changed() => {
				if changed.is_err() || *shutdown.borrow() {
					break;
				}
			},
		}
	}

	#[cfg(feature = "tracing")]
	tracing::debug!("Auth token refresher stopped.");
}

async fn refresh_cycle<C>(authenticator: &Authenticator<C>, metrics: &RefreshMetrics)
where
	C: ?Sized + PushHttpClient,
{
	metrics.record_attempt();

	match authenticator.refresh().await {
		Ok(credential) => {
			metrics.record_success();

			#[cfg(feature = "tracing")]
			tracing::info!(valid_until = %credential.valid_until, "Refreshed auth token.");
			#[cfg(not(feature = "tracing"))]
			let _ = credential;
		},
		Err(err) => {
			metrics.record_failure();

			#[cfg(feature = "tracing")]
			tracing::warn!(
				error = %err,
				"Auth token refresh failed; keeping the current token until the next cycle."
			);
			#[cfg(not(feature = "tracing"))]
			let _ = err;
		},
	}
}

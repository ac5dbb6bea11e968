//! Optional observability helpers for client operations.
//!
//! # Feature Flags
//!
//! - Enable `tracing` (on by default) to emit structured spans named `vivo_push.op` with the `op`
//!   (operation) and `stage` (call site) fields, plus debug/warn events from the transport and
//!   refresher.
//! - Enable `metrics` to increment the `vivo_push_op_total` counter for every
//!   attempt/success/failure, labeled by `op` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Operations observed by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpKind {
	/// Auth token fetch on the inline path.
	Auth,
	/// Background token refresh cycle.
	Refresh,
	/// Single-device send.
	Send,
	/// Multicast payload save.
	SaveListPayload,
	/// Save + push to a device list.
	SendList,
	/// Broadcast to every device.
	SendAll,
	/// Delivery statistics query.
	MessageStatus,
}
impl OpKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpKind::Auth => "auth",
			OpKind::Refresh => "refresh",
			OpKind::Send => "send",
			OpKind::SaveListPayload => "save_list_payload",
			OpKind::SendList => "send_list",
			OpKind::SendAll => "send_all",
			OpKind::MessageStatus => "message_status",
		}
	}
}
impl Display for OpKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpOutcome {
	/// Entry to a client operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl OpOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpOutcome::Attempt => "attempt",
			OpOutcome::Success => "success",
			OpOutcome::Failure => "failure",
		}
	}
}
impl Display for OpOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Runs `fut` inside an operation span and records attempt plus success/failure outcomes.
pub(crate) async fn observe<T, Fut>(kind: OpKind, stage: &'static str, fut: Fut) -> Result<T>
where
	Fut: Future<Output = Result<T>>,
{
	let span = OpSpan::new(kind, stage);

	record_op_outcome(kind, OpOutcome::Attempt);

	let result = span.instrument(fut).await;

	match &result {
		Ok(_) => record_op_outcome(kind, OpOutcome::Success),
		Err(_) => record_op_outcome(kind, OpOutcome::Failure),
	}

	result
}

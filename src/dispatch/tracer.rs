// self
use crate::{
	_prelude::*,
	config::endpoint,
	dispatch::PushClient,
	http::PushHttpClient,
	message::BatchStatusResult,
	obs::{self, OpKind},
};

impl<C> PushClient<C>
where
	C: ?Sized + PushHttpClient,
{
	/// Fetches delivery statistics for the task identified by `task_id`.
	pub async fn message_status_by_job_key(&self, task_id: &str) -> Result<BatchStatusResult> {
		self.message_status_by_job_keys([task_id]).await
	}

	/// Fetches delivery statistics for several tasks in one query.
	pub async fn message_status_by_job_keys<I, S>(&self, task_ids: I) -> Result<BatchStatusResult>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let joined = task_ids.into_iter().fold(String::new(), |mut joined, id| {
			if !joined.is_empty() {
				joined.push(',');
			}

			joined.push_str(id.as_ref());

			joined
		});
		let mut url = self.config.endpoint(endpoint::MESSAGE_STATUS)?;

		url.query_pairs_mut().append_pair("taskIds", &joined);

		obs::observe(OpKind::MessageStatus, "message_status", self.get(url)).await
	}
}

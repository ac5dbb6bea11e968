// self
use crate::{
	_prelude::*,
	config::endpoint,
	dispatch::PushClient,
	error::{ProtocolError, ValidationError},
	http::PushHttpClient,
	message::{ListMessage, Message, MessagePayload, SendResult},
	obs::{self, OpKind},
};

/// Fewest targets a list push accepts.
pub const MIN_LIST_TARGETS: usize = 2;
/// Most targets a list push accepts.
pub const MAX_LIST_TARGETS: usize = 1_000;

impl<C> PushClient<C>
where
	C: ?Sized + PushHttpClient,
{
	/// Sends `message` to the device registered as `reg_id`.
	pub async fn send(
		&self,
		mut message: Message,
		reg_id: impl Into<String>,
	) -> Result<SendResult> {
		message.reg_id = reg_id.into();

		obs::observe(OpKind::Send, "send", self.post(endpoint::SEND, &message)).await
	}

	/// Stores a multicast payload and returns the task identifier assigned to it.
	pub async fn save_list_payload(&self, payload: &MessagePayload) -> Result<SendResult> {
		obs::observe(
			OpKind::SaveListPayload,
			"save_list_payload",
			self.post(endpoint::SAVE_LIST_PAYLOAD, payload),
		)
		.await
	}

	/// Saves `payload` and pushes it to every device in `reg_ids`.
	///
	/// The target count is checked before any request is made. The push step only runs when
	/// the save succeeded and returned a task identifier.
	pub async fn send_list<I, S>(&self, payload: &MessagePayload, reg_ids: I) -> Result<SendResult>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let reg_ids = reg_ids.into_iter().map(Into::into).collect::<Vec<_>>();

		check_target_count(reg_ids.len())?;

		obs::observe(OpKind::SendList, "send_list", async {
			let saved = self.save_list_payload(payload).await?;
			let task_id = saved
				.task_id
				.filter(|task_id| !task_id.is_empty())
				.ok_or(ProtocolError::MissingField { field: "taskId" })?;

			#[cfg(feature = "tracing")]
			tracing::debug!(task_id = %task_id, targets = reg_ids.len(), "Saved list payload.");

			let list = ListMessage::new(reg_ids, task_id, payload.push_mode);

			self.post(endpoint::PUSH_TO_LIST, &list).await
		})
		.await
	}

	/// Broadcasts `payload` to every device of the app.
	pub async fn send_all(&self, payload: &MessagePayload) -> Result<SendResult> {
		obs::observe(OpKind::SendAll, "send_all", self.post(endpoint::PUSH_TO_ALL, payload)).await
	}
}

fn check_target_count(count: usize) -> Result<(), ValidationError> {
	if (MIN_LIST_TARGETS..=MAX_LIST_TARGETS).contains(&count) {
		Ok(())
	} else {
		Err(ValidationError::TargetCount { count, min: MIN_LIST_TARGETS, max: MAX_LIST_TARGETS })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		_preludet::{Reply, ScriptedHttpClient, test_config},
		dispatch::AUTH_TOKEN_HEADER,
		message::PushMode,
	};

	async fn client(http: &Arc<ScriptedHttpClient>) -> PushClient<ScriptedHttpClient> {
		http.set(endpoint::AUTH, Reply::auth_token("token-1"));

		PushClient::with_http_client(test_config("https://push.test"), http.clone())
			.await
			.expect("Client should connect.")
	}

	fn targets(count: usize) -> Vec<String> {
		(0..count).map(|i| format!("reg-{i}")).collect()
	}

	#[tokio::test]
	async fn send_attaches_token_and_target() {
		let http = Arc::new(ScriptedHttpClient::default());
		let client = client(&http).await;

		http.set(endpoint::SEND, Reply::envelope(0, "请求成功", Some("task-1")));

		let result = client
			.send(Message::new("title", "content").with_request_id("req-1"), "reg-1")
			.await
			.expect("Send should succeed.");

		assert_eq!(result.task_id.as_deref(), Some("task-1"));

		let calls = http.calls_to(endpoint::SEND);
		let body = calls[0].json();

		assert_eq!(calls.len(), 1);
		assert_eq!(calls[0].header(AUTH_TOKEN_HEADER), Some("token-1"));
		assert_eq!(body["regId"], "reg-1");
		assert_eq!(body["title"], "title");
		assert_eq!(body["requestId"], "req-1");

		client.shutdown().await;
	}

	#[tokio::test]
	async fn send_surfaces_provider_rejections() {
		let http = Arc::new(ScriptedHttpClient::default());
		let client = client(&http).await;

		http.set(endpoint::SEND, Reply::envelope(10070, "推送消息数超限", None));

		let err = client
			.send(Message::new("t", "c"), "reg-1")
			.await
			.expect_err("A non-zero result should fail.");

		assert_eq!(err.domain_code(), Some(10070));
		assert_eq!(err.to_string(), "推送消息数超限");

		client.shutdown().await;
	}

	#[tokio::test]
	async fn send_list_rejects_out_of_range_targets_without_calls() {
		let http = Arc::new(ScriptedHttpClient::default());
		let client = client(&http).await;
		let payload = MessagePayload::new("t", "c");

		for count in [0, 1, MAX_LIST_TARGETS + 1] {
			let err = client
				.send_list(&payload, targets(count))
				.await
				.expect_err("Out-of-range target counts should be rejected.");

			assert!(matches!(
				err,
				Error::Validation(ValidationError::TargetCount { count: c, min: 2, max: 1_000 })
					if c == count
			));
		}

		assert!(http.calls_to(endpoint::SAVE_LIST_PAYLOAD).is_empty());
		assert!(http.calls_to(endpoint::PUSH_TO_LIST).is_empty());

		client.shutdown().await;
	}

	#[tokio::test]
	async fn send_list_accepts_both_bounds() {
		let http = Arc::new(ScriptedHttpClient::default());
		let client = client(&http).await;
		let payload = MessagePayload::new("t", "c");

		http.set(endpoint::SAVE_LIST_PAYLOAD, Reply::envelope(0, "ok", Some("task-9")));
		http.set(endpoint::PUSH_TO_LIST, Reply::envelope(0, "ok", Some("task-9")));

		for count in [MIN_LIST_TARGETS, MAX_LIST_TARGETS] {
			client.send_list(&payload, targets(count)).await.expect("Bounds should be accepted.");
		}

		let pushes = http.calls_to(endpoint::PUSH_TO_LIST);

		assert_eq!(pushes.len(), 2);
		assert_eq!(pushes[1].json()["regIds"].as_array().map(Vec::len), Some(MAX_LIST_TARGETS));

		client.shutdown().await;
	}

	#[tokio::test]
	async fn send_list_pushes_the_saved_task() {
		let http = Arc::new(ScriptedHttpClient::default());
		let client = client(&http).await;
		let payload = MessagePayload::new("t", "c").with_push_mode(PushMode::Test);

		http.set(endpoint::SAVE_LIST_PAYLOAD, Reply::envelope(0, "ok", Some("task-42")));
		http.set(endpoint::PUSH_TO_LIST, Reply::envelope(0, "ok", Some("task-42")));

		let result =
			client.send_list(&payload, ["a", "b"]).await.expect("List send should succeed.");

		assert_eq!(result.task_id.as_deref(), Some("task-42"));

		let push = &http.calls_to(endpoint::PUSH_TO_LIST)[0];
		let body = push.json();

		assert_eq!(body["taskId"], "task-42");
		assert_eq!(body["regIds"], serde_json::json!(["a", "b"]));
		assert_eq!(body["pushMode"], 1);
		assert_eq!(push.header(AUTH_TOKEN_HEADER), Some("token-1"));
		assert_eq!(http.calls_to(endpoint::SAVE_LIST_PAYLOAD)[0].json()["pushMode"], 1);

		client.shutdown().await;
	}

	#[tokio::test]
	async fn failed_save_skips_the_push() {
		let http = Arc::new(ScriptedHttpClient::default());
		let client = client(&http).await;

		http.set(endpoint::SAVE_LIST_PAYLOAD, Reply::envelope(5, "save failed", None));

		let err = client
			.send_list(&MessagePayload::new("t", "c"), ["a", "b"])
			.await
			.expect_err("A failed save should abort the list send.");

		assert_eq!(err.domain_code(), Some(5));
		assert_eq!(err.to_string(), "save failed");
		assert!(http.calls_to(endpoint::PUSH_TO_LIST).is_empty());

		client.shutdown().await;
	}

	#[tokio::test]
	async fn save_without_task_id_skips_the_push() {
		let http = Arc::new(ScriptedHttpClient::default());
		let client = client(&http).await;

		http.set(endpoint::SAVE_LIST_PAYLOAD, Reply::envelope(0, "ok", None));

		let err = client
			.send_list(&MessagePayload::new("t", "c"), ["a", "b"])
			.await
			.expect_err("A save without a task identifier should abort the list send.");

		assert!(matches!(err, Error::Protocol(ProtocolError::MissingField { field: "taskId" })));
		assert!(http.calls_to(endpoint::PUSH_TO_LIST).is_empty());

		client.shutdown().await;
	}

	#[tokio::test]
	async fn send_all_posts_the_payload() {
		let http = Arc::new(ScriptedHttpClient::default());
		let client = client(&http).await;

		http.set(endpoint::PUSH_TO_ALL, Reply::envelope(0, "ok", Some("task-all")));

		let result = client
			.send_all(&MessagePayload::new("t", "c").with_time_to_live(600))
			.await
			.expect("Broadcast should succeed.");

		assert_eq!(result.task_id.as_deref(), Some("task-all"));

		let call = &http.calls_to(endpoint::PUSH_TO_ALL)[0];

		assert_eq!(call.json()["timeToLive"], 600);
		assert_eq!(call.header(AUTH_TOKEN_HEADER), Some("token-1"));

		client.shutdown().await;
	}

	#[test]
	fn target_count_bounds_are_inclusive() {
		assert!(check_target_count(1).is_err());
		assert!(check_target_count(2).is_ok());
		assert!(check_target_count(1_000).is_ok());
		assert!(check_target_count(1_001).is_err());
	}
}

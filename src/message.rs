//! Push payloads and provider result envelopes.
//!
//! Field names follow the provider's JSON contract; optional fields are omitted from the wire
//! when unset.

// std
use std::collections::BTreeMap;
// self
use crate::_prelude::*;

/// How the notification alerts the user.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum NotifyType {
	/// Silent.
	Silent,
	/// Ring only.
	Ring,
	/// Vibrate only.
	Vibrate,
	/// Ring and vibrate.
	#[default]
	RingAndVibrate,
}
impl From<NotifyType> for u8 {
	fn from(value: NotifyType) -> Self {
		match value {
			NotifyType::Silent => 1,
			NotifyType::Ring => 2,
			NotifyType::Vibrate => 3,
			NotifyType::RingAndVibrate => 4,
		}
	}
}
impl TryFrom<u8> for NotifyType {
	type Error = String;

	fn try_from(value: u8) -> Result<Self, Self::Error> {
		match value {
			1 => Ok(Self::Silent),
			2 => Ok(Self::Ring),
			3 => Ok(Self::Vibrate),
			4 => Ok(Self::RingAndVibrate),
			other => Err(format!("unknown notify type {other}")),
		}
	}
}

/// What happens when the user taps the notification.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum SkipType {
	/// Open the app's launcher activity.
	#[default]
	OpenApp,
	/// Open the URL carried in `skipContent`.
	OpenUrl,
	/// Custom handling by the app.
	Custom,
	/// Open the in-app page named by `skipContent`.
	AppPage,
}
impl From<SkipType> for u8 {
	fn from(value: SkipType) -> Self {
		match value {
			SkipType::OpenApp => 1,
			SkipType::OpenUrl => 2,
			SkipType::Custom => 3,
			SkipType::AppPage => 4,
		}
	}
}
impl TryFrom<u8> for SkipType {
	type Error = String;

	fn try_from(value: u8) -> Result<Self, Self::Error> {
		match value {
			1 => Ok(Self::OpenApp),
			2 => Ok(Self::OpenUrl),
			3 => Ok(Self::Custom),
			4 => Ok(Self::AppPage),
			other => Err(format!("unknown skip type {other}")),
		}
	}
}

/// Delivery channel: production or the provider's test channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum PushMode {
	/// Regular delivery.
	#[default]
	Production,
	/// Delivered only to devices registered as test devices.
	Test,
}
impl From<PushMode> for u8 {
	fn from(value: PushMode) -> Self {
		match value {
			PushMode::Production => 0,
			PushMode::Test => 1,
		}
	}
}
impl TryFrom<u8> for PushMode {
	type Error = String;

	fn try_from(value: u8) -> Result<Self, Self::Error> {
		match value {
			0 => Ok(Self::Production),
			1 => Ok(Self::Test),
			other => Err(format!("unknown push mode {other}")),
		}
	}
}

/// Presentation fields shared by single and multicast messages.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
	/// Alert style.
	pub notify_type: NotifyType,
	/// Notification title.
	pub title: String,
	/// Notification body.
	pub content: String,
	/// Offline retention in seconds.
	pub time_to_live: u32,
	/// Tap action.
	pub skip_type: SkipType,
	/// Tap action target (URL, page, or custom content).
	#[serde(skip_serializing_if = "Option::is_none")]
	pub skip_content: Option<String>,
	/// Network restriction; `-1` means any network.
	pub network_type: i8,
	/// Key/value pairs delivered to the app.
	#[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
	pub client_custom_map: BTreeMap<String, String>,
	/// Provider extension fields.
	#[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
	pub extra: BTreeMap<String, String>,
	/// Caller-generated identifier used by the provider to deduplicate requests.
	pub request_id: String,
}
impl Notification {
	/// Default offline retention: one day.
	pub const DEFAULT_TIME_TO_LIVE: u32 = 86_400;

	/// Creates a notification with default presentation and a fresh request identifier.
	pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
		Self {
			notify_type: NotifyType::default(),
			title: title.into(),
			content: content.into(),
			time_to_live: Self::DEFAULT_TIME_TO_LIVE,
			skip_type: SkipType::default(),
			skip_content: None,
			network_type: -1,
			client_custom_map: BTreeMap::new(),
			extra: BTreeMap::new(),
			request_id: new_request_id(),
		}
	}
}

macro_rules! impl_notification_setters {
	($ty:ident) => {
		impl $ty {
			/// Overrides the alert style.
			pub fn with_notify_type(mut self, notify_type: NotifyType) -> Self {
				self.notification.notify_type = notify_type;

				self
			}

			/// Overrides the offline retention in seconds.
			pub fn with_time_to_live(mut self, secs: u32) -> Self {
				self.notification.time_to_live = secs;

				self
			}

			/// Sets the tap action and its target.
			pub fn with_skip(mut self, skip_type: SkipType, content: impl Into<String>) -> Self {
				self.notification.skip_type = skip_type;
				self.notification.skip_content = Some(content.into());

				self
			}

			/// Restricts delivery to a network type.
			pub fn with_network_type(mut self, network_type: i8) -> Self {
				self.notification.network_type = network_type;

				self
			}

			/// Adds a key/value pair delivered to the app.
			pub fn with_custom(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
				self.notification.client_custom_map.insert(key.into(), value.into());

				self
			}

			/// Adds a provider extension field.
			pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
				self.notification.extra.insert(key.into(), value.into());

				self
			}

			/// Overrides the generated request identifier.
			pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
				self.notification.request_id = request_id.into();

				self
			}

			/// Routes delivery through the provider's test channel.
			pub fn with_push_mode(mut self, push_mode: PushMode) -> Self {
				self.push_mode = push_mode;

				self
			}
		}
	};
}

/// Single-device message posted to the send endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
	/// Target device registration identifier; set by the dispatcher.
	#[serde(default)]
	pub reg_id: String,
	/// Presentation fields.
	#[serde(flatten)]
	pub notification: Notification,
	/// Delivery channel.
	#[serde(default)]
	pub push_mode: PushMode,
}
impl Message {
	/// Creates a message with default presentation.
	pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
		Self {
			reg_id: String::new(),
			notification: Notification::new(title, content),
			push_mode: PushMode::default(),
		}
	}
}
impl_notification_setters!(Message);

/// Payload shared by multicast and broadcast sends.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePayload {
	/// Presentation fields.
	#[serde(flatten)]
	pub notification: Notification,
	/// Delivery channel; sent with broadcasts and saved with list payloads, and copied onto the
	/// follow-up list push.
	#[serde(default)]
	pub push_mode: PushMode,
}
impl MessagePayload {
	/// Creates a payload with default presentation.
	pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
		Self { notification: Notification::new(title, content), push_mode: PushMode::default() }
	}
}
impl_notification_setters!(MessagePayload);

/// Body posted to the push-to-list endpoint after the payload has been saved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMessage {
	/// Target device registration identifiers.
	pub reg_ids: Vec<String>,
	/// Task identifier returned by the payload save.
	pub task_id: String,
	/// Caller-generated identifier used for deduplication.
	pub request_id: String,
	/// Delivery channel.
	pub push_mode: PushMode,
}
impl ListMessage {
	/// Creates a list push for a saved payload.
	pub fn new(reg_ids: Vec<String>, task_id: impl Into<String>, push_mode: PushMode) -> Self {
		Self { reg_ids, task_id: task_id.into(), request_id: new_request_id(), push_mode }
	}
}

/// Common accessors for provider result envelopes.
pub trait ResultEnvelope {
	/// Provider result code; zero means success.
	fn result_code(&self) -> i64;

	/// Provider-supplied description.
	fn description(&self) -> &str;
}

/// Result envelope returned by send, save, and push endpoints.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendResult {
	/// Provider result code.
	#[serde(default)]
	pub result: i64,
	/// Provider description.
	#[serde(default)]
	pub desc: String,
	/// Task identifier assigned to the message.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub task_id: Option<String>,
	/// Target that the provider reported as invalid.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub invalid_user: Option<InvalidUser>,
	/// Per-target rejections reported by list pushes.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub invalid_users: Option<Vec<InvalidUser>>,
}
impl ResultEnvelope for SendResult {
	fn result_code(&self) -> i64 {
		self.result
	}

	fn description(&self) -> &str {
		&self.desc
	}
}

/// Target rejected by the provider.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidUser {
	/// Provider rejection status.
	#[serde(default)]
	pub status: i64,
	/// Rejected registration identifier.
	#[serde(default)]
	pub userid: String,
}

/// Delivery statistics for one or more tasks.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchStatusResult {
	/// Provider result code.
	#[serde(default)]
	pub result: i64,
	/// Provider description.
	#[serde(default)]
	pub desc: String,
	/// Per-task counters.
	#[serde(default)]
	pub statistics: Vec<TaskStatistics>,
}
impl ResultEnvelope for BatchStatusResult {
	fn result_code(&self) -> i64 {
		self.result
	}

	fn description(&self) -> &str {
		&self.desc
	}
}

/// Delivery counters for a single task; unknown counters are kept in `other`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatistics {
	/// Task identifier.
	#[serde(default)]
	pub task_id: String,
	/// Targets submitted.
	#[serde(default)]
	pub target: i64,
	/// Targets that passed validation.
	#[serde(default)]
	pub valid: i64,
	/// Messages sent.
	#[serde(default)]
	pub send: i64,
	/// Messages received by devices.
	#[serde(default)]
	pub receive: i64,
	/// Notifications displayed.
	#[serde(default)]
	pub display: i64,
	/// Notifications tapped.
	#[serde(default)]
	pub click: i64,
	/// Additional provider counters.
	#[serde(flatten)]
	pub other: BTreeMap<String, serde_json::Value>,
}

fn new_request_id() -> String {
	format!("{:032x}", rand::random::<u128>())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn message_serializes_with_provider_field_names() {
		let mut message = Message::new("hi", "hello")
			.with_request_id("req-1")
			.with_custom("k", "v")
			.with_skip(SkipType::OpenUrl, "https://example.com");

		message.reg_id = "reg-1".into();

		let body = serde_json::to_value(&message).expect("Message should serialize.");

		assert_eq!(body["regId"], "reg-1");
		assert_eq!(body["title"], "hi");
		assert_eq!(body["content"], "hello");
		assert_eq!(body["notifyType"], 4);
		assert_eq!(body["skipType"], 2);
		assert_eq!(body["skipContent"], "https://example.com");
		assert_eq!(body["timeToLive"], 86_400);
		assert_eq!(body["networkType"], -1);
		assert_eq!(body["clientCustomMap"]["k"], "v");
		assert_eq!(body["requestId"], "req-1");
		assert_eq!(body["pushMode"], 0);
		assert!(body.get("extra").is_none());
	}

	#[test]
	fn request_ids_are_unique() {
		let first = MessagePayload::new("t", "c");
		let second = MessagePayload::new("t", "c");

		assert_eq!(first.notification.request_id.len(), 32);
		assert_ne!(first.notification.request_id, second.notification.request_id);
	}

	#[test]
	fn list_message_uses_camel_case() {
		let list = ListMessage::new(vec!["a".into(), "b".into()], "task-1", PushMode::Test);
		let body = serde_json::to_value(&list).expect("List message should serialize.");

		assert_eq!(body["regIds"], serde_json::json!(["a", "b"]));
		assert_eq!(body["taskId"], "task-1");
		assert_eq!(body["pushMode"], 1);
		assert!(body["requestId"].is_string());
	}

	#[test]
	fn status_result_keeps_unknown_counters() {
		let raw = serde_json::json!({
			"result": 0,
			"desc": "ok",
			"statistics": [{ "taskId": "t1", "send": 10, "click": 2, "covered": 7 }]
		});
		let parsed: BatchStatusResult =
			serde_json::from_value(raw).expect("Status result should deserialize.");
		let task = &parsed.statistics[0];

		assert_eq!(task.task_id, "t1");
		assert_eq!(task.send, 10);
		assert_eq!(task.click, 2);
		assert_eq!(task.other.get("covered"), Some(&serde_json::json!(7)));
	}
}

//! Request, response and event envelopes.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Metadata attached to every outbound call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
	/// Unix timestamp in milliseconds
	#[serde(rename = "wallTime")]
	pub wall_time: i64,
	/// Whether this is an internal call (not user-facing API)
	#[serde(skip_serializing_if = "Option::is_none")]
	pub internal: Option<bool>,
	/// Optional title shown in driver traces
	#[serde(skip_serializing_if = "Option::is_none")]
	pub title: Option<String>,
}

impl Metadata {
	/// Minimal metadata stamped with the current wall time.
	pub fn now() -> Self {
		let wall_time = std::time::SystemTime::now()
			.duration_since(std::time::UNIX_EPOCH)
			.map(|d| d.as_millis() as i64)
			.unwrap_or_default();
		Self {
			wall_time,
			internal: Some(false),
			title: None,
		}
	}

	/// Metadata carrying a trace title (the step or page-object operation name).
	pub fn titled(title: impl Into<String>) -> Self {
		Self {
			title: Some(title.into()),
			..Self::now()
		}
	}
}

/// Call sent to the driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
	/// Correlation id echoed by the response
	pub id: u32,
	/// Target object (format: "type@hash", empty for the root)
	#[serde(serialize_with = "serialize_arc_str", deserialize_with = "deserialize_arc_str")]
	pub guid: Arc<str>,
	pub method: String,
	pub params: Value,
	pub metadata: Metadata,
}

/// Reply to a [`Request`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
	pub id: u32,
	/// Success payload (mutually exclusive with `error`)
	#[serde(skip_serializing_if = "Option::is_none")]
	pub result: Option<Value>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<ErrorWrapper>,
}

/// Wrapper the driver puts around error payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorWrapper {
	pub error: ErrorPayload,
}

/// Error details reported by the driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorPayload {
	pub message: String,
	/// Error class name (e.g. "TimeoutError", "TargetClosedError")
	#[serde(skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub stack: Option<String>,
}

/// Notification emitted by a remote object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
	#[serde(serialize_with = "serialize_arc_str", deserialize_with = "deserialize_arc_str")]
	pub guid: Arc<str>,
	pub method: String,
	#[serde(default)]
	pub params: Value,
}

/// Any inbound message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Message {
	/// Has an `id`
	Response(Response),
	/// Has no `id`
	Event(Event),
	/// Forward-compatible catch-all
	Unknown(Value),
}

/// Reference to a remote object inside a result payload (`{"guid": "..."}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRef {
	#[serde(serialize_with = "serialize_arc_str", deserialize_with = "deserialize_arc_str")]
	pub guid: Arc<str>,
}

pub fn serialize_arc_str<S>(arc: &Arc<str>, serializer: S) -> Result<S::Ok, S::Error>
where
	S: serde::Serializer,
{
	serializer.serialize_str(arc)
}

pub fn deserialize_arc_str<'de, D>(deserializer: D) -> Result<Arc<str>, D::Error>
where
	D: serde::Deserializer<'de>,
{
	let s: String = Deserialize::deserialize(deserializer)?;
	Ok(Arc::from(s.as_str()))
}

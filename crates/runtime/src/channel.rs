//! Typed calls on behalf of one remote object.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use shop_protocol::Metadata;

use crate::connection::Connection;
use crate::error::Result;

/// Sends method calls to the object identified by `guid`.
#[derive(Debug, Clone)]
pub struct Channel {
	guid: Arc<str>,
	connection: Arc<Connection>,
}

impl Channel {
	pub fn new(guid: impl Into<Arc<str>>, connection: Arc<Connection>) -> Self {
		Self {
			guid: guid.into(),
			connection,
		}
	}

	pub async fn send<P: Serialize, R: DeserializeOwned>(&self, method: &str, params: P) -> Result<R> {
		let params = serde_json::to_value(params)?;
		let response = self.connection.send_message(&self.guid, method, params).await?;
		Ok(serde_json::from_value(response)?)
	}

	/// Like [`send`](Self::send) with a trace title, shown by the driver's tracing UI.
	pub async fn send_titled<P: Serialize, R: DeserializeOwned>(&self, title: &str, method: &str, params: P) -> Result<R> {
		let params = serde_json::to_value(params)?;
		let response = self
			.connection
			.send_with_metadata(&self.guid, method, params, Metadata::titled(title))
			.await?;
		Ok(serde_json::from_value(response)?)
	}

	pub async fn send_no_params<R: DeserializeOwned>(&self, method: &str) -> Result<R> {
		self.send(method, serde_json::json!({})).await
	}

	pub async fn send_no_result<P: Serialize>(&self, method: &str, params: P) -> Result<()> {
		let _: Value = self.send(method, params).await?;
		Ok(())
	}

	pub fn guid(&self) -> &str {
		&self.guid
	}

	pub fn connection(&self) -> &Arc<Connection> {
		&self.connection
	}
}

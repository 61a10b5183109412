//! Request/response correlation on top of a transport.
//!
//! 1. [`Connection::send_message`] allocates an id and parks a oneshot sender
//! 2. The writer task frames the request onto the transport
//! 3. [`Connection::run`] decodes inbound frames and completes the matching callback
//! 4. `__create__`, `__dispose__` and `__adopt__` events keep the [`ObjectStore`] in sync
//!
//! When the inbound stream ends every pending call fails with [`Error::ChannelClosed`].

mod object_store;

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::task::{Context, Poll};
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::Value;
use shop_protocol::{ErrorPayload, Event, Message, Metadata, ObjectRef, Request};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, trace, warn};

pub use self::object_store::{ObjectStore, RemoteObject};
use crate::error::{Error, Result};
use crate::transport::{TransportParts, TransportReceiver, TransportSender};

type CallbackMap = Arc<Mutex<HashMap<u32, oneshot::Sender<Result<Value>>>>>;

/// How long a reference returned in a result may lag behind its `__create__`.
const OBJECT_WAIT: Duration = Duration::from_secs(10);

/// Removes the callback of a call whose future was dropped before completion.
struct CancelGuard {
	id: u32,
	callbacks: CallbackMap,
	completed: bool,
}

impl Drop for CancelGuard {
	fn drop(&mut self) {
		if !self.completed && self.callbacks.lock().remove(&self.id).is_some() {
			debug!(target = "shop.connection", id = self.id, "removed orphaned callback");
		}
	}
}

struct ResponseFuture {
	rx: oneshot::Receiver<Result<Value>>,
	guard: CancelGuard,
}

impl Future for ResponseFuture {
	type Output = Result<Value>;

	fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
		match Pin::new(&mut self.rx).poll(cx) {
			Poll::Ready(result) => {
				self.guard.completed = true;
				Poll::Ready(result.map_err(|_| Error::ChannelClosed).and_then(|r| r))
			}
			Poll::Pending => Poll::Pending,
		}
	}
}

/// Halves handed to [`Connection::run`] exactly once.
struct Pending {
	sender: Box<dyn TransportSender>,
	receiver: Box<dyn TransportReceiver>,
	message_rx: mpsc::UnboundedReceiver<Value>,
	outbound_rx: mpsc::UnboundedReceiver<Value>,
}

/// Connection to a Playwright driver.
pub struct Connection {
	last_id: AtomicU32,
	callbacks: CallbackMap,
	outbound_tx: mpsc::UnboundedSender<Value>,
	pending: Mutex<Option<Pending>>,
	objects: ObjectStore,
}

impl std::fmt::Debug for Connection {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Connection")
			.field("last_id", &self.last_id.load(Ordering::Relaxed))
			.field("objects", &self.objects.len())
			.finish_non_exhaustive()
	}
}

impl Connection {
	pub fn new(parts: TransportParts) -> Self {
		let TransportParts { sender, receiver, message_rx } = parts;
		let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();

		let objects = ObjectStore::new();
		objects.insert(RemoteObject::root());

		Self {
			last_id: AtomicU32::new(1),
			callbacks: Arc::new(Mutex::new(HashMap::new())),
			outbound_tx,
			pending: Mutex::new(Some(Pending {
				sender,
				receiver,
				message_rx,
				outbound_rx,
			})),
			objects,
		}
	}

	pub fn objects(&self) -> &ObjectStore {
		&self.objects
	}

	/// Sends a call and awaits its result.
	pub async fn send_message(&self, guid: &str, method: &str, params: Value) -> Result<Value> {
		self.send_with_metadata(guid, method, params, Metadata::now()).await
	}

	pub async fn send_with_metadata(&self, guid: &str, method: &str, params: Value, metadata: Metadata) -> Result<Value> {
		let id = self.last_id.fetch_add(1, Ordering::SeqCst);
		trace!(target = "shop.connection", id, guid, method, "send");

		let (tx, rx) = oneshot::channel();
		self.callbacks.lock().insert(id, tx);
		let guard = CancelGuard {
			id,
			callbacks: Arc::clone(&self.callbacks),
			completed: false,
		};

		let request = Request {
			id,
			guid: Arc::from(guid),
			method: method.to_string(),
			params,
			metadata,
		};

		if self.outbound_tx.send(serde_json::to_value(&request)?).is_err() {
			error!(target = "shop.connection", id, "outbound channel closed");
			return Err(Error::ChannelClosed);
		}

		ResponseFuture { rx, guard }.await
	}

	/// Performs the `initialize` handshake and returns the root Playwright object.
	pub async fn initialize(&self) -> Result<Arc<RemoteObject>> {
		let result = self.send_message("", "initialize", serde_json::json!({"sdkLanguage": "javascript"})).await?;
		let playwright = result
			.get("playwright")
			.cloned()
			.ok_or_else(|| Error::Protocol("initialize result missing 'playwright'".to_string()))?;
		let playwright: ObjectRef = serde_json::from_value(playwright)?;
		self.wait_for_object(&playwright.guid).await
	}

	/// Resolves `{"<key>": {"guid": ...}}` in a call result to its object.
	pub async fn result_object(&self, result: &Value, key: &str) -> Result<Arc<RemoteObject>> {
		let guid = result
			.get(key)
			.and_then(|v| v.get("guid"))
			.and_then(Value::as_str)
			.ok_or_else(|| Error::Protocol(format!("result missing '{key}.guid'")))?;
		self.wait_for_object(guid).await
	}

	pub async fn wait_for_object(&self, guid: &str) -> Result<Arc<RemoteObject>> {
		self.objects.wait_for(guid, OBJECT_WAIT).await
	}

	/// Runs the read/dispatch loop until the driver goes away.
	///
	/// # Errors
	///
	/// Returns [`Error::Protocol`] when called a second time.
	pub async fn run(self: &Arc<Self>) -> Result<()> {
		let Pending {
			mut sender,
			receiver,
			mut message_rx,
			mut outbound_rx,
		} = self
			.pending
			.lock()
			.take()
			.ok_or_else(|| Error::Protocol("connection is already running".to_string()))?;

		let reader = tokio::spawn(async move {
			if let Err(e) = receiver.run().await {
				error!(target = "shop.connection", error = %e, "transport read failed");
			}
		});

		let writer = tokio::spawn(async move {
			while let Some(message) = outbound_rx.recv().await {
				if let Err(e) = sender.send(message).await {
					error!(target = "shop.connection", error = %e, "transport write failed");
					break;
				}
			}
		});

		while let Some(value) = message_rx.recv().await {
			match serde_json::from_value::<Message>(value) {
				Ok(message) => {
					if let Err(e) = self.dispatch(message) {
						warn!(target = "shop.connection", error = %e, "dispatch failed");
					}
				}
				Err(e) => warn!(target = "shop.connection", error = %e, "unparseable message"),
			}
		}

		self.fail_pending();
		writer.abort();
		let _ = reader.await;
		debug!(target = "shop.connection", "dispatch loop finished");
		Ok(())
	}

	fn fail_pending(&self) {
		let pending: Vec<_> = self.callbacks.lock().drain().collect();
		for (id, callback) in pending {
			debug!(target = "shop.connection", id, "failing pending call");
			let _ = callback.send(Err(Error::ChannelClosed));
		}
	}

	pub(crate) fn dispatch(&self, message: Message) -> Result<()> {
		match message {
			Message::Response(response) => {
				let callback = self
					.callbacks
					.lock()
					.remove(&response.id)
					.ok_or_else(|| Error::Protocol(format!("no pending call for response id={}", response.id)))?;

				let result = match response.error {
					Some(wrapper) => Err(parse_protocol_error(wrapper.error)),
					None => Ok(response.result.unwrap_or(Value::Null)),
				};
				let _ = callback.send(result);
				Ok(())
			}
			Message::Event(event) => match event.method.as_str() {
				"__create__" => self.handle_create(&event),
				"__dispose__" => {
					let removed = self.objects.remove_tree(&event.guid);
					trace!(target = "shop.connection", guid = %event.guid, removed, "disposed");
					Ok(())
				}
				"__adopt__" => {
					let child = event.params["guid"]
						.as_str()
						.ok_or_else(|| Error::Protocol("__adopt__ missing 'guid'".to_string()))?;
					self.objects.reparent(child, &event.guid)
				}
				method => {
					trace!(target = "shop.connection", guid = %event.guid, method, "event");
					Ok(())
				}
			},
			Message::Unknown(value) => {
				debug!(target = "shop.connection", %value, "ignoring unknown message");
				Ok(())
			}
		}
	}

	fn handle_create(&self, event: &Event) -> Result<()> {
		let params = &event.params;
		let type_name = params["type"]
			.as_str()
			.ok_or_else(|| Error::Protocol("__create__ missing 'type'".to_string()))?;
		let guid = params["guid"]
			.as_str()
			.ok_or_else(|| Error::Protocol("__create__ missing 'guid'".to_string()))?;

		if !self.objects.contains(&event.guid) {
			return Err(Error::ObjectNotFound(event.guid.to_string()));
		}

		trace!(target = "shop.connection", type_name, guid, parent = %event.guid, "created");
		self.objects.insert(RemoteObject {
			guid: Arc::from(guid),
			type_name: type_name.to_string(),
			parent: Some(Arc::clone(&event.guid)),
			initializer: params["initializer"].clone(),
		});
		Ok(())
	}
}

fn parse_protocol_error(error: ErrorPayload) -> Error {
	Error::Remote {
		name: error.name.unwrap_or_else(|| "Error".to_string()),
		message: error.message,
		stack: error.stack,
	}
}

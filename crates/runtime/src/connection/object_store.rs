//! Registry of remote objects by GUID, with per-GUID notification.
//!
//! [`ObjectStore::wait_for`] registers its waiter before checking the map, so an
//! object created between the check and the wait still wakes it up.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::Notify;

use crate::error::{Error, Result};

/// A driver-side object announced by `__create__`.
#[derive(Debug, Clone)]
pub struct RemoteObject {
	pub guid: Arc<str>,
	/// Protocol type, e.g. "Page" or "Frame".
	pub type_name: String,
	/// `None` only for the root.
	pub parent: Option<Arc<str>>,
	pub initializer: Value,
}

impl RemoteObject {
	pub(crate) fn root() -> Self {
		Self {
			guid: Arc::from(""),
			type_name: "Root".to_string(),
			parent: None,
			initializer: Value::Null,
		}
	}

	/// GUID of an object reference stored under `key` in the initializer
	/// (`{"mainFrame": {"guid": "frame@..."}}`).
	pub fn initializer_ref(&self, key: &str) -> Option<&str> {
		self.initializer.get(key)?.get("guid")?.as_str()
	}
}

#[derive(Default)]
pub struct ObjectStore {
	objects: DashMap<Arc<str>, Arc<RemoteObject>>,
	waiters: DashMap<Arc<str>, Arc<Notify>>,
}

impl ObjectStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Inserts an object and wakes anyone waiting on its GUID.
	pub fn insert(&self, object: RemoteObject) {
		let guid = Arc::clone(&object.guid);
		self.objects.insert(Arc::clone(&guid), Arc::new(object));
		if let Some((_, notify)) = self.waiters.remove(&guid) {
			notify.notify_waiters();
		}
	}

	pub fn get(&self, guid: &str) -> Option<Arc<RemoteObject>> {
		self.objects.get(guid).map(|r| Arc::clone(r.value()))
	}

	pub fn contains(&self, guid: &str) -> bool {
		self.objects.contains_key(guid)
	}

	pub fn len(&self) -> usize {
		self.objects.len()
	}

	pub fn is_empty(&self) -> bool {
		self.objects.is_empty()
	}

	/// Removes `guid` and everything parented under it. Returns how many objects went away.
	pub fn remove_tree(&self, guid: &str) -> usize {
		let mut stack: Vec<Arc<str>> = vec![Arc::from(guid)];
		let mut removed = 0;
		while let Some(current) = stack.pop() {
			if self.objects.remove(&current).is_some() {
				removed += 1;
			}
			stack.extend(
				self.objects
					.iter()
					.filter(|entry| entry.value().parent.as_deref() == Some(&*current))
					.map(|entry| Arc::clone(entry.key())),
			);
		}
		removed
	}

	/// Moves `child` under `new_parent`.
	pub fn reparent(&self, child: &str, new_parent: &str) -> Result<()> {
		if !self.objects.contains_key(new_parent) {
			return Err(Error::ObjectNotFound(new_parent.to_string()));
		}
		let mut entry = self.objects.get_mut(child).ok_or_else(|| Error::ObjectNotFound(child.to_string()))?;
		let mut moved = RemoteObject::clone(entry.value());
		moved.parent = Some(Arc::from(new_parent));
		*entry.value_mut() = Arc::new(moved);
		Ok(())
	}

	/// Waits for an object to be registered.
	pub async fn wait_for(&self, guid: &str, timeout: Duration) -> Result<Arc<RemoteObject>> {
		let g: Arc<str> = Arc::from(guid);
		let deadline = tokio::time::Instant::now() + timeout;

		loop {
			let notify = self.waiters.entry(Arc::clone(&g)).or_insert_with(|| Arc::new(Notify::new())).clone();
			let notified = notify.notified();

			if let Some(obj) = self.get(&g) {
				return Ok(obj);
			}

			let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
			if remaining.is_zero() {
				return Err(timeout_error(&g));
			}

			tokio::select! {
				biased;
				_ = notified => {}
				_ = tokio::time::sleep(remaining) => {
					return Err(timeout_error(&g));
				}
			}
		}
	}
}

fn timeout_error(guid: &str) -> Error {
	let kind = guid.split_once('@').map(|(kind, _)| kind).unwrap_or("object");
	Error::Timeout(format!("waiting for {kind} object {guid}"))
}

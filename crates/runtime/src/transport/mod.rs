//! Length-prefixed JSON framing over the driver's stdio.
//!
//! Each frame is a little-endian `u32` byte count followed by that many bytes of
//! UTF-8 JSON. The transport is split into a sender (owned by the connection's
//! writer task) and a receiver that pushes decoded frames into an unbounded channel.

use std::future::Future;
use std::pin::Pin;

use serde_json::Value;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::error::{Error, Result};

/// Largest frame accepted from the driver.
pub const MAX_FRAME_LEN: usize = 64 * 1024 * 1024;

/// Writing half of a transport.
pub trait TransportSender: Send {
	fn send(&mut self, message: Value) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Reading half of a transport.
///
/// `run` reads until EOF, forwarding each decoded frame, and resolves once the
/// stream or the consuming channel closes.
pub trait TransportReceiver: Send {
	fn run(self: Box<Self>) -> Pin<Box<dyn Future<Output = Result<()>> + Send>>;
}

/// The pieces a [`Connection`](crate::Connection) is built from.
pub struct TransportParts {
	pub sender: Box<dyn TransportSender>,
	pub receiver: Box<dyn TransportReceiver>,
	pub message_rx: mpsc::UnboundedReceiver<Value>,
}

impl std::fmt::Debug for TransportParts {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("TransportParts").finish_non_exhaustive()
	}
}

/// Transport over a pair of byte streams (normally the driver's stdin/stdout).
pub struct PipeTransport;

impl PipeTransport {
	/// Splits `writer`/`reader` into transport parts.
	pub fn new<W, R>(writer: W, reader: R) -> TransportParts
	where
		W: AsyncWrite + Unpin + Send + 'static,
		R: AsyncRead + Unpin + Send + 'static,
	{
		let (message_tx, message_rx) = mpsc::unbounded_channel();
		TransportParts {
			sender: Box::new(PipeSender { writer }),
			receiver: Box::new(PipeReceiver { reader, message_tx }),
			message_rx,
		}
	}
}

struct PipeSender<W> {
	writer: W,
}

impl<W> TransportSender for PipeSender<W>
where
	W: AsyncWrite + Unpin + Send,
{
	fn send(&mut self, message: Value) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
		Box::pin(async move {
			let bytes = serde_json::to_vec(&message)?;
			let len = u32::try_from(bytes.len()).map_err(|_| Error::Transport(format!("outbound frame too large: {} bytes", bytes.len())))?;

			trace!(target = "shop.transport", len, "send frame");
			self.writer.write_all(&len.to_le_bytes()).await?;
			self.writer.write_all(&bytes).await?;
			self.writer.flush().await?;
			Ok(())
		})
	}
}

struct PipeReceiver<R> {
	reader: R,
	message_tx: mpsc::UnboundedSender<Value>,
}

impl<R> PipeReceiver<R>
where
	R: AsyncRead + Unpin + Send,
{
	async fn read_frame(&mut self) -> Result<Option<Value>> {
		let mut len_buf = [0u8; 4];
		let mut filled = 0;
		while filled < len_buf.len() {
			let n = self
				.reader
				.read(&mut len_buf[filled..])
				.await
				.map_err(|e| Error::Transport(format!("failed to read length prefix: {e}")))?;
			if n == 0 {
				// EOF between frames is a clean shutdown; inside a prefix it is not.
				if filled == 0 {
					return Ok(None);
				}
				return Err(Error::Transport(format!("failed to read length prefix: EOF after {filled} of 4 bytes")));
			}
			filled += n;
		}

		let len = u32::from_le_bytes(len_buf) as usize;
		if len > MAX_FRAME_LEN {
			return Err(Error::Transport(format!("frame of {len} bytes exceeds limit of {MAX_FRAME_LEN}")));
		}

		let mut body = vec![0u8; len];
		self.reader
			.read_exact(&mut body)
			.await
			.map_err(|e| Error::Transport(format!("failed to read frame body ({len} bytes): {e}")))?;

		Ok(Some(serde_json::from_slice(&body)?))
	}
}

impl<R> TransportReceiver for PipeReceiver<R>
where
	R: AsyncRead + Unpin + Send + 'static,
{
	fn run(mut self: Box<Self>) -> Pin<Box<dyn Future<Output = Result<()>> + Send>> {
		Box::pin(async move {
			while let Some(message) = self.read_frame().await? {
				if self.message_tx.send(message).is_err() {
					debug!(target = "shop.transport", "message channel closed; stopping reader");
					return Ok(());
				}
			}
			debug!(target = "shop.transport", "driver closed stdout");
			Ok(())
		})
	}
}

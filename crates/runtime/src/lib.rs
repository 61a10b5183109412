//! Runtime for talking to the Playwright driver.
//!
//! - **Driver discovery**: locating `node` and the Playwright `cli.js`
//! - **Driver process**: spawning `run-driver` and owning its lifetime
//! - **Transport**: little-endian length-prefixed JSON frames over stdio
//! - **Connection**: request/response correlation and `__create__`/`__dispose__` bookkeeping
//! - **Object store**: remote objects by GUID, with waiting for late creations
//!
//! ```text
//! ┌──────────────┐  Channel::send   ┌────────────┐  frames  ┌──────────┐
//! │ page backend │ ───────────────▶ │ Connection │ ───────▶ │  driver  │
//! └──────────────┘ ◀─────────────── └────────────┘ ◀─────── └──────────┘
//!                     result/error      ObjectStore   events
//! ```

pub mod channel;
pub mod connection;
pub mod driver;
pub mod error;
pub mod server;
pub mod transport;

pub use channel::Channel;
pub use connection::{Connection, RemoteObject};
pub use driver::{DriverPaths, locate_driver};
pub use error::{Error, Result};
pub use server::DriverProcess;
pub use transport::{PipeTransport, TransportParts, TransportReceiver, TransportSender};

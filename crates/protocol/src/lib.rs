//! Wire types shared by the driver runtime and the page backends.
//!
//! Messages are JSON objects framed by the runtime's transport. Requests carry an
//! `id`, responses echo it, and events carry only a `guid` and `method`.

pub mod message;
pub mod options;

pub use message::{ErrorPayload, ErrorWrapper, Event, Message, Metadata, ObjectRef, Request, Response};
pub use options::{BrowserName, DEFAULT_TIMEOUT_MS, LaunchOptions, WaitForState};

//! Hook event types shared by every hookrelay crate.

pub mod event;

pub use event::{EventKind, EventRecord, HookInput, NotificationKind};

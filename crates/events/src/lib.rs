//! Review notifications.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`ReviewEvent`]: the envelope every review state change is published as.
//! - [`event_types`]: the event names the store emits.

pub mod bus;
pub mod event_types;

pub use bus::{EventBus, ReviewEvent};

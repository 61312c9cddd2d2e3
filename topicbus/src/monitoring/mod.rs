//! Monitoring API for observing message flow through a bus.
//!
//! # Overview
//!
//! The monitoring system provides hooks into the bus lifecycle:
//! - Subscriptions added and removed
//! - Messages posted, dispatched, handled, or failed
//! - Worker start, stop, and messages discarded at stop
//!
//! Monitors are the injectable sink for handler failures. Failures are
//! always logged through `tracing`; attach a monitor to react to them in code.
//!
//! # Example
//!
//! ```rust
//! use topicbus::{Bus, Error, Meta, SubscriptionId};
//! use topicbus::monitoring::{DispatchMode, Monitor};
//!
//! struct FailureLogger;
//!
//! impl Monitor for FailureLogger {
//!     fn on_handler_failed(
//!         &self,
//!         meta: &Meta,
//!         id: SubscriptionId,
//!         error: &Error,
//!         _mode: DispatchMode,
//!     ) {
//!         eprintln!("[failed] {} on {} by {}: {}", meta.id(), meta.topic(), id, error);
//!     }
//! }
//!
//! let bus = Bus::new();
//! let monitor_id = bus.monitors().add(FailureLogger);
//! # bus.monitors().remove(monitor_id);
//! ```

mod monitor;
mod registry;

use std::fmt;

/// Unique identifier for a registered monitor.
pub type MonitorId = u16;

pub use monitor::Monitor;
pub use registry::MonitorRegistry;

/// Which publish path a message travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DispatchMode {
    /// [`Bus::post`](crate::Bus::post): handlers run on the caller's thread.
    Sync,
    /// [`Bus::post_async`](crate::Bus::post_async): handlers run on the worker thread.
    Async,
}

impl fmt::Display for DispatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchMode::Sync => write!(f, "sync"),
            DispatchMode::Async => write!(f, "async"),
        }
    }
}

//! Handler implementations

pub mod console;
pub mod file;
pub mod null;

#[cfg(feature = "slack")]
pub mod slack;

pub use console::{ConsoleHandler, ConsoleStream};
pub use file::FileHandler;
pub use null::NullHandler;

#[cfg(feature = "slack")]
pub use slack::{DeliveryStatus, SlackPayload, SlackWebhookHandler};

pub use crate::core::Handler;

//! Shared types
//!
//! Values exchanged between the UI collaborator, the offline core and the
//! gateway: activity entries, worker/client messages, configuration and the
//! errors raised while validating them.

pub mod activity;
pub mod config;
pub mod error;
pub mod message;

pub use activity::{Activity, ActivityId, ActivityType, NewActivity};
pub use config::{AppConfig, AppConfigBuilder, ConfigError};
pub use error::SharedError;
pub use message::{ClientMessage, WorkerMessage};

//! Server Module
//!
//! - **`state`** - shared application state
//! - **`init`** - router creation around a running [`OfflineRuntime`]
//!
//! [`OfflineRuntime`]: crate::runtime::OfflineRuntime

/// Application state
pub mod state;

/// Server initialization
pub mod init;

pub use init::create_app;
pub use state::AppState;

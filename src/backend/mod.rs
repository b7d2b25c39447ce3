//! Backend Module
//!
//! The HTTP gateway in front of the offline core. Every UI instance sends
//! its resource requests here; they are answered by the worker's `fetch`
//! handler (cache partitions or the configured origin). A small set of
//! control routes under the control prefix (default `/__ecotravel`) lets
//! the UI submit and list activities, force a sync, report connectivity and
//! follow worker messages.
//!
//! This module is only compiled when the `server` feature is enabled.
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── main.rs         - Gateway binary
//! ├── server/         - App state and initialization
//! ├── routes/         - Control routes, event stream, interception fallback
//! └── error/          - Gateway error type and its HTTP conversion
//! ```
//!
//! # Control Routes
//!
//! - `GET /activities` - pending activities
//! - `POST /activities` - submit a new activity
//! - `DELETE /activities` - clear the store
//! - `POST /reset` - delete and recreate the store
//! - `POST /messages` - post a client message (`{"type":"force-sync"}`)
//! - `GET /events` - Server-Sent Events stream of worker messages
//! - `PUT /connectivity` - platform connectivity signal (`{"online":true}`)
//! - `GET /status` - lifecycle, partitions and queue status
//!
//! Any other request goes through request interception. A request that
//! produces no response at all is answered with `504 Gateway Timeout`.

/// Server setup
pub mod server;

/// Route configuration
pub mod routes;

/// Gateway error types
pub mod error;

pub use error::GatewayError;
pub use server::create_app;

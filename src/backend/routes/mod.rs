//! Route Configuration Module
//!
//! - **`router`** - router assembly and layers
//! - **`control_routes`** - activity, connectivity and status handlers
//! - **`events`** - Server-Sent Events stream of worker messages
//! - **`proxy`** - fallback that hands every other request to the worker
//!
//! Control routes are nested under the configured prefix and always take
//! precedence over interception.

/// Main router creation
pub mod router;

/// Control route handlers
pub mod control_routes;

/// Worker message stream
pub mod events;

/// Request interception fallback
pub mod proxy;

pub use router::create_router;

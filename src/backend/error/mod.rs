//! Gateway Error Module
//!
//! - **`types`** - [`GatewayError`] and its status code mapping
//! - **`conversion`** - `IntoResponse`, rendering errors as JSON:
//!
//! ```json
//! { "error": "Error message", "status": 504 }
//! ```

/// Error type definitions
pub mod types;

/// Error conversion implementations
pub mod conversion;

pub use types::GatewayError;

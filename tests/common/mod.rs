//! Common test utilities and helpers
//!
//! - scripted in-memory network
//! - configuration, store and runtime fixtures
//! - assertion macros

#![allow(dead_code)]

pub mod assertions;
pub mod fixtures;
pub mod network;

pub use fixtures::*;
pub use network::*;

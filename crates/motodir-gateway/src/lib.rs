//! Data access for the motorcycle shop directory.
//!
//! [`Gateway`] and [`Auth`] describe what the application needs from its
//! hosted backend. [`SupabaseGateway`] implements both over HTTP; with the
//! `memory` feature, [`memory::MemoryGateway`] implements them in-process.

mod client;
pub mod error;
pub mod gateway;
#[cfg(any(test, feature = "memory"))]
pub mod memory;
pub mod query;

pub use client::SupabaseGateway;
pub use error::GatewayError;
pub use gateway::{Auth, Gateway, SignUpOutcome, SignUpRequest, MAX_PAGES};
pub use query::{Order, Query};

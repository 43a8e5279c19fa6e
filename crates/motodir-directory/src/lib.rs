//! Application services for the motorcycle shop directory, layered over the
//! backend gateway.

pub mod account;
pub mod bikes;
pub mod catalog;
pub mod controller;
pub mod error;
pub mod personalization;
pub mod profile;

pub use account::RegistrationOutcome;
pub use bikes::{PhotoUploadReport, Upload};
pub use controller::{Directory, DirectorySettings};
pub use error::{DirectoryError, PersonalizationError};

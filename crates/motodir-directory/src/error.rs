use motodir_core::{RecordId, ValidationError};
use motodir_gateway::GatewayError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("data access failed: {0}")]
    DataAccess(#[from] GatewayError),

    /// The catalog loaded without a single shop.
    #[error("no shops found in the directory")]
    NoData,

    #[error("invalid form: {0}")]
    Validation(#[from] ValidationError),

    #[error("bike {0} not found")]
    BikeNotFound(RecordId),

    #[error("you need to be signed in")]
    NotSignedIn,

    /// The account exists but its `bikers` row could not be written.
    #[error("account created but profile setup failed: {0}")]
    ProfileSetup(#[source] GatewayError),

    #[error("catalog has not been loaded")]
    NotStarted,
}

/// Failure while resolving the signed-in user's bike brands. Never surfaced
/// to the user; personalization silently falls back to the full catalog.
#[derive(Debug, Error)]
#[error("personalization failed: {0}")]
pub struct PersonalizationError(#[from] pub GatewayError);

//! Biker profiles, one `bikers` row per auth user.

use chrono::Utc;
use motodir_core::{AuthUser, BikerProfile, NewBikerProfile, ProfilePatch, ProfileUpdate};
use motodir_gateway::{Gateway, GatewayError, Query};

use crate::error::DirectoryError;

pub const BIKERS_TABLE: &str = "bikers";

/// Profile row seeded from the auth user's sign-up metadata.
#[must_use]
pub fn new_profile_for(user: &AuthUser) -> NewBikerProfile {
    NewBikerProfile {
        user_id: user.id,
        email: user.email.clone(),
        full_name: user.display_name(),
        phone: user
            .user_metadata
            .phone
            .clone()
            .filter(|p| !p.trim().is_empty()),
    }
}

/// # Errors
///
/// Returns any [`GatewayError`] from the lookup.
pub async fn find_profile<G: Gateway>(
    gateway: &G,
    user: &AuthUser,
) -> Result<Option<BikerProfile>, GatewayError> {
    gateway
        .fetch_one(BIKERS_TABLE, &Query::new().eq("user_id", user.id))
        .await
}

/// Returns the user's profile, creating it from the auth metadata when the
/// user has none yet.
///
/// # Errors
///
/// Returns any [`GatewayError`] from the lookup or the insert.
pub async fn get_or_create_profile<G: Gateway>(
    gateway: &G,
    user: &AuthUser,
) -> Result<BikerProfile, GatewayError> {
    if let Some(profile) = find_profile(gateway, user).await? {
        return Ok(profile);
    }
    tracing::info!(user_id = %user.id, "no profile found, creating one");
    gateway.insert(BIKERS_TABLE, &new_profile_for(user)).await
}

/// Saves name and phone and stamps `updated_at`.
///
/// # Errors
///
/// Returns [`DirectoryError::Validation`] for a blank name,
/// [`DirectoryError::NotSignedIn`] when the user has no profile row, and
/// [`DirectoryError::DataAccess`] for backend failures.
pub async fn update_profile<G: Gateway>(
    gateway: &G,
    user: &AuthUser,
    update: ProfileUpdate,
) -> Result<BikerProfile, DirectoryError> {
    let update = update.validate()?;
    let patch = ProfilePatch {
        full_name: update.full_name,
        phone: update.phone,
        updated_at: Utc::now(),
    };
    let updated: Vec<BikerProfile> = gateway
        .update_where(BIKERS_TABLE, &Query::new().eq("user_id", user.id), &patch)
        .await?;
    let profile = updated.into_iter().next().ok_or(DirectoryError::NotSignedIn)?;
    tracing::info!(user_id = %user.id, "profile updated");
    Ok(profile)
}

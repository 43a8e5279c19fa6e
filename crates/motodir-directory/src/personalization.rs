use motodir_core::{AuthUser, BikeBrand, PersonalizationContext};
use motodir_gateway::{Gateway, Query};

use crate::bikes::BIKES_TABLE;
use crate::error::PersonalizationError;
use crate::profile::get_or_create_profile;

/// Brands of the signed-in user's bikes.
///
/// Returns an empty context when nobody is signed in. Lookup failures are
/// logged and also produce an empty context, so the catalog is shown
/// unpersonalized rather than not at all.
pub async fn resolve_brands<G: Gateway>(
    gateway: &G,
    user: Option<&AuthUser>,
) -> PersonalizationContext {
    let Some(user) = user else {
        return PersonalizationContext::default();
    };
    match try_resolve_brands(gateway, user).await {
        Ok(context) => {
            tracing::debug!(
                user_id = %user.id,
                brands = context.brands().count(),
                "resolved personalization"
            );
            context
        }
        Err(e) => {
            tracing::warn!(user_id = %user.id, error = %e, "personalization unavailable");
            PersonalizationContext::default()
        }
    }
}

/// # Errors
///
/// Returns [`PersonalizationError`] when the profile or bikes cannot be read.
pub async fn try_resolve_brands<G: Gateway>(
    gateway: &G,
    user: &AuthUser,
) -> Result<PersonalizationContext, PersonalizationError> {
    let profile = get_or_create_profile(gateway, user).await?;
    let bikes: Vec<BikeBrand> = gateway
        .fetch_many(
            BIKES_TABLE,
            &Query::new().select("brand,model").eq("biker_id", &profile.id),
        )
        .await?;
    Ok(PersonalizationContext::from_bikes(&bikes))
}

//! Sign-in, registration and sign-out flows.

use motodir_core::{Registration, Session};
use motodir_gateway::{Auth, Gateway, GatewayError, SignUpOutcome, SignUpRequest};

use crate::error::DirectoryError;
use crate::profile::{new_profile_for, BIKERS_TABLE};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    SignedIn(Session),
    /// The account was created; the user must confirm the e-mail address
    /// before signing in.
    ConfirmationPending { email: String },
}

/// # Errors
///
/// Returns [`DirectoryError::DataAccess`] wrapping
/// [`GatewayError::InvalidCredentials`] or [`GatewayError::EmailNotConfirmed`]
/// for rejected logins.
pub async fn sign_in<A: Auth>(
    auth: &A,
    email: &str,
    password: &str,
) -> Result<Session, DirectoryError> {
    Ok(auth.sign_in(email.trim(), password).await?)
}

/// Creates the account and its profile row, then signs in.
///
/// # Errors
///
/// Returns [`DirectoryError::Validation`] before contacting the backend for an
/// invalid form, [`DirectoryError::ProfileSetup`] when the account was created
/// but its profile could not be stored, and [`DirectoryError::DataAccess`] for
/// any other failure.
pub async fn sign_up<G>(
    gateway: &G,
    registration: Registration,
) -> Result<RegistrationOutcome, DirectoryError>
where
    G: Gateway + Auth,
{
    let form = registration.validate()?;
    let request = SignUpRequest {
        email: form.email.clone(),
        password: form.password.clone(),
        full_name: form.full_name.clone(),
        phone: form.phone.clone(),
    };
    let outcome = gateway.sign_up(&request).await?;
    let user = outcome.user().clone();
    tracing::info!(user_id = %user.id, "account created");

    let mut profile = new_profile_for(&user);
    profile.full_name = form.full_name;
    profile.email = Some(form.email.clone());
    let inserted: Result<serde_json::Value, GatewayError> =
        gateway.insert(BIKERS_TABLE, &profile).await;
    match (inserted, &outcome) {
        (Ok(_), _) => {}
        // Without a session, row-level security may refuse the insert; the
        // profile is then created on first sign-in.
        (
            Err(GatewayError::PermissionDenied { message }),
            SignUpOutcome::ConfirmationRequired(_),
        ) => {
            tracing::warn!(user_id = %user.id, %message, "profile deferred until first sign-in");
        }
        (Err(e), _) => return Err(DirectoryError::ProfileSetup(e)),
    }

    if let SignUpOutcome::SignedIn(session) = outcome {
        return Ok(RegistrationOutcome::SignedIn(session));
    }
    match gateway.sign_in(&form.email, &form.password).await {
        Ok(session) => Ok(RegistrationOutcome::SignedIn(session)),
        Err(GatewayError::EmailNotConfirmed) => Ok(RegistrationOutcome::ConfirmationPending {
            email: form.email,
        }),
        Err(e) => Err(e.into()),
    }
}

/// # Errors
///
/// Returns any backend failure; the local session is cleared regardless.
pub async fn sign_out<A: Auth>(auth: &A) -> Result<(), DirectoryError> {
    Ok(auth.sign_out().await?)
}

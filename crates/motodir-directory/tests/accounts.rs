use motodir_core::{BikeForm, Registration, ValidationError};
use motodir_directory::account::{sign_in, sign_up};
use motodir_directory::bikes::{save_bike, BIKES_TABLE};
use motodir_directory::personalization::{resolve_brands, try_resolve_brands};
use motodir_directory::profile::{get_or_create_profile, BIKERS_TABLE};
use motodir_directory::{DirectoryError, RegistrationOutcome};
use motodir_gateway::memory::MemoryGateway;
use motodir_gateway::{Auth, GatewayError};

fn registration(email: &str) -> Registration {
    Registration {
        full_name: " Giulia Bianchi ".to_owned(),
        email: email.to_owned(),
        phone: Some(String::new()),
        password: "s3cret!".to_owned(),
    }
}

#[tokio::test]
async fn sign_up_creates_profile_and_signs_in() {
    let gateway = MemoryGateway::new();
    let outcome = sign_up(&gateway, registration("giulia@example.com"))
        .await
        .unwrap();

    let session = match outcome {
        RegistrationOutcome::SignedIn(session) => session,
        other => panic!("expected a session, got {other:?}"),
    };
    assert_eq!(session.user.email.as_deref(), Some("giulia@example.com"));
    assert!(gateway.current_session().is_some());

    let rows = gateway.rows(BIKERS_TABLE);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["full_name"], "Giulia Bianchi");
    assert_eq!(rows[0]["phone"], serde_json::Value::Null);
}

#[tokio::test]
async fn unconfirmed_sign_up_is_pending() {
    let gateway = MemoryGateway::new().requiring_confirmation();
    let outcome = sign_up(&gateway, registration("new@example.com"))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        RegistrationOutcome::ConfirmationPending {
            email: "new@example.com".to_owned()
        }
    );
    assert!(gateway.current_session().is_none());

    gateway.confirm("new@example.com");
    let session = sign_in(&gateway, " new@example.com ", "s3cret!")
        .await
        .unwrap();
    assert_eq!(session.user.email.as_deref(), Some("new@example.com"));
}

#[tokio::test]
async fn refused_profile_insert_is_deferred_until_sign_in() {
    let gateway = MemoryGateway::new().requiring_confirmation();
    gateway.deny_table(BIKERS_TABLE);

    let outcome = sign_up(&gateway, registration("later@example.com"))
        .await
        .unwrap();
    assert!(matches!(
        outcome,
        RegistrationOutcome::ConfirmationPending { .. }
    ));
    assert!(gateway.rows(BIKERS_TABLE).is_empty());
}

#[tokio::test]
async fn refused_profile_insert_with_session_is_an_error() {
    let gateway = MemoryGateway::new();
    gateway.deny_table(BIKERS_TABLE);

    let err = sign_up(&gateway, registration("denied@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DirectoryError::ProfileSetup(GatewayError::PermissionDenied { .. })
    ));
}

#[tokio::test]
async fn invalid_registration_creates_no_account() {
    let gateway = MemoryGateway::new();
    let mut short = registration("short@example.com");
    short.password = "12345".to_owned();

    let err = sign_up(&gateway, short).await.unwrap_err();
    assert!(matches!(
        err,
        DirectoryError::Validation(ValidationError::PasswordTooShort { min: 6 })
    ));
    let err = sign_in(&gateway, "short@example.com", "12345")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DirectoryError::DataAccess(GatewayError::InvalidCredentials)
    ));
}

#[tokio::test]
async fn duplicate_sign_up_is_rejected() {
    let gateway = MemoryGateway::new();
    sign_up(&gateway, registration("twice@example.com"))
        .await
        .unwrap();
    let err = sign_up(&gateway, registration("twice@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DirectoryError::DataAccess(GatewayError::Api { status: 422, .. })
    ));
}

#[tokio::test]
async fn personalization_uses_the_riders_bike_brands() {
    let gateway = MemoryGateway::new();
    let RegistrationOutcome::SignedIn(session) =
        sign_up(&gateway, registration("rider@example.com"))
            .await
            .unwrap()
    else {
        panic!("expected a session");
    };
    let profile = get_or_create_profile(&gateway, &session.user).await.unwrap();
    for (brand, model) in [("Honda", "CB500X"), ("BMW", "R nineT")] {
        let form = BikeForm {
            brand: brand.to_owned(),
            model: model.to_owned(),
            year: "2020".to_owned(),
            mileage: "0".to_owned(),
            ..BikeForm::default()
        };
        save_bike(&gateway, &profile, None, form).await.unwrap();
    }

    let context = resolve_brands(&gateway, Some(&session.user)).await;
    let mut brands: Vec<_> = context.brands().collect();
    brands.sort_unstable();
    assert_eq!(brands, vec!["bmw", "honda"]);

    assert!(resolve_brands(&gateway, None).await.is_empty());
}

#[tokio::test]
async fn personalization_failure_falls_back_to_empty() {
    let gateway = MemoryGateway::new();
    let RegistrationOutcome::SignedIn(session) =
        sign_up(&gateway, registration("locked@example.com"))
            .await
            .unwrap()
    else {
        panic!("expected a session");
    };
    gateway.deny_table(BIKES_TABLE);

    assert!(try_resolve_brands(&gateway, &session.user).await.is_err());
    assert!(resolve_brands(&gateway, Some(&session.user))
        .await
        .is_empty());
}

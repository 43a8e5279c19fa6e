//! Account command handlers: registration and the biker profile.

use anyhow::Context as _;
use clap::Subcommand;
use motodir_core::{BikeCard, ProfileUpdate, Registration};
use motodir_directory::bikes::list_bikes;
use motodir_directory::profile::{get_or_create_profile, update_profile};
use motodir_directory::{account, RegistrationOutcome};

use crate::Context;

/// Sub-commands available under `profile`.
#[derive(Debug, Subcommand)]
pub enum ProfileCommands {
    /// Show the profile and its bikes
    Show,
    /// Change name and phone
    Update {
        #[arg(long)]
        name: String,
        /// Phone number; pass an empty value to clear it
        #[arg(long)]
        phone: Option<String>,
    },
}

/// Create an account for the configured credentials.
///
/// # Errors
///
/// Returns an error for an invalid form or when the backend rejects the
/// sign-up.
pub(crate) async fn run_register(
    ctx: &Context,
    name: String,
    phone: Option<String>,
) -> anyhow::Result<()> {
    let (email, password) = ctx.credentials()?;
    let registration = Registration {
        full_name: name,
        email: email.to_owned(),
        phone,
        password: password.to_owned(),
    };
    match account::sign_up(ctx.gateway.as_ref(), registration).await? {
        RegistrationOutcome::SignedIn(session) => {
            println!(
                "account created; signed in as {}",
                session.user.email.as_deref().unwrap_or(email)
            );
        }
        RegistrationOutcome::ConfirmationPending { email } => {
            println!("account created; confirm the address sent to {email}, then sign in");
        }
    }
    Ok(())
}

/// # Errors
///
/// Returns an error if sign-in or any backend call fails.
pub(crate) async fn run_profile(ctx: &Context, command: ProfileCommands) -> anyhow::Result<()> {
    let session = ctx.sign_in().await?;
    let gateway = ctx.gateway.as_ref();

    match command {
        ProfileCommands::Show => {
            let profile = get_or_create_profile(gateway, &session.user)
                .await
                .context("failed to load profile")?;
            println!("{:<8}{}", "NAME", profile.full_name.as_deref().unwrap_or("\u{2014}"));
            println!("{:<8}{}", "EMAIL", profile.email.as_deref().unwrap_or("\u{2014}"));
            println!("{:<8}{}", "PHONE", profile.phone.as_deref().unwrap_or("\u{2014}"));

            let bikes = list_bikes(gateway, &profile).await?;
            println!();
            if bikes.is_empty() {
                println!("no bikes yet; add one with `motodir bikes add`");
            }
            for bike in &bikes {
                print!("{}", BikeCard::from(bike));
                println!();
            }
        }
        ProfileCommands::Update { name, phone } => {
            let profile = update_profile(
                gateway,
                &session.user,
                ProfileUpdate {
                    full_name: name,
                    phone,
                },
            )
            .await?;
            println!(
                "profile updated: {}",
                profile.full_name.as_deref().unwrap_or_default()
            );
        }
    }
    Ok(())
}

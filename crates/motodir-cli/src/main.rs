mod account;
mod bikes;
mod shops;

use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use motodir_core::{AppConfig, Session};
use motodir_gateway::SupabaseGateway;
use tracing_subscriber::EnvFilter;

use crate::account::ProfileCommands;
use crate::bikes::BikesCommands;
use crate::shops::ShopFilterArgs;

#[derive(Debug, Parser)]
#[command(name = "motodir")]
#[command(about = "Motorcycle shop directory")]
struct Cli {
    /// Account e-mail (falls back to MOTODIR_EMAIL)
    #[arg(long, global = true)]
    email: Option<String>,

    /// Account password (falls back to MOTODIR_PASSWORD)
    #[arg(long, global = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List shops matching the filters
    Shops(ShopFilterArgs),
    /// Show catalog statistics
    Stats {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// List countries with their shop counts
    Countries,
    /// List cities of a country with their shop counts
    Cities {
        #[arg(long)]
        country: String,
    },
    /// List business types with their shop counts
    Types,
    /// Create an account with the given e-mail and password
    Register {
        /// Full name shown on the profile
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Show or edit the biker profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },
    /// Manage bikes, photos and service documents
    Bikes {
        #[command(subcommand)]
        command: BikesCommands,
    },
}

/// Loaded configuration, the backend client and the credentials to use.
pub(crate) struct Context {
    pub(crate) config: AppConfig,
    pub(crate) gateway: Arc<SupabaseGateway>,
    email: Option<String>,
    password: Option<String>,
}

impl Context {
    fn new(
        config: AppConfig,
        email: Option<String>,
        password: Option<String>,
    ) -> anyhow::Result<Self> {
        let gateway = SupabaseGateway::from_config(&config)
            .map_err(|e| anyhow::anyhow!("failed to build backend client: {e}"))?;
        let email = email.or_else(|| config.email.clone());
        let password = password.or_else(|| config.password.clone());
        Ok(Self {
            config,
            gateway: Arc::new(gateway),
            email,
            password,
        })
    }

    pub(crate) fn credentials(&self) -> anyhow::Result<(&str, &str)> {
        let email = self
            .email
            .as_deref()
            .context("--email or MOTODIR_EMAIL is required for this command")?;
        let password = self
            .password
            .as_deref()
            .context("--password or MOTODIR_PASSWORD is required for this command")?;
        Ok((email, password))
    }

    /// Signs in with the configured credentials.
    pub(crate) async fn sign_in(&self) -> anyhow::Result<Session> {
        let (email, password) = self.credentials()?;
        let session = motodir_directory::account::sign_in(self.gateway.as_ref(), email, password)
            .await
            .context("sign-in failed")?;
        Ok(session)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("motodir: run `motodir --help` for the list of commands");
        return Ok(());
    };

    let config = motodir_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!(env = %config.env, "configuration loaded");

    let ctx = Context::new(config, cli.email, cli.password)?;
    match command {
        Commands::Shops(args) => shops::run_shops(&ctx, &args).await,
        Commands::Stats { json } => shops::run_stats(&ctx, json).await,
        Commands::Countries => shops::run_countries(&ctx).await,
        Commands::Cities { country } => shops::run_cities(&ctx, &country).await,
        Commands::Types => shops::run_types(&ctx).await,
        Commands::Register { name, phone } => account::run_register(&ctx, name, phone).await,
        Commands::Profile { command } => account::run_profile(&ctx, command).await,
        Commands::Bikes { command } => bikes::run_bikes(&ctx, command).await,
    }
}

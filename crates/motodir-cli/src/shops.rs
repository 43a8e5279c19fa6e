//! Catalog command handlers: shop listing, statistics and facet lists.

use std::sync::Arc;

use anyhow::Context as _;
use clap::Args;
use motodir_core::{DirectoryState, FacetOption, ShopCard};
use motodir_directory::{Directory, DirectorySettings};
use motodir_gateway::SupabaseGateway;

use crate::Context;

/// Filters for `shops`.
#[derive(Debug, Args)]
pub struct ShopFilterArgs {
    /// Case-insensitive text matched against name, city, country, type and address
    #[arg(long)]
    pub search: Option<String>,
    /// Exact country
    #[arg(long)]
    pub country: Option<String>,
    /// Exact city
    #[arg(long)]
    pub city: Option<String>,
    /// Business type, compared case-insensitively
    #[arg(long = "type")]
    pub business_type: Option<String>,
    /// Sign in and rank shops by the brands of your bikes
    #[arg(long)]
    pub personalize: bool,
    /// Maximum number of shops to print
    #[arg(long)]
    pub limit: Option<usize>,
    /// Print JSON instead of cards
    #[arg(long)]
    pub json: bool,
}

async fn load_directory(ctx: &Context) -> anyhow::Result<Directory<SupabaseGateway>> {
    let mut directory = Directory::new(
        Arc::clone(&ctx.gateway),
        DirectorySettings::from(&ctx.config),
    );
    directory
        .start()
        .await
        .context("failed to load the shop catalog")?;
    Ok(directory)
}

fn loaded(directory: &Directory<SupabaseGateway>) -> anyhow::Result<&DirectoryState> {
    directory.state().context("catalog has not been loaded")
}

fn print_facets(options: &[FacetOption], empty: &str) {
    if options.is_empty() {
        println!("{empty}");
        return;
    }
    for option in options {
        println!("{option}");
    }
}

/// List shops matching the filters.
///
/// Country, city and type are applied in that order, so a city or type given
/// together with a country narrows within that country.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded or, with `--personalize`,
/// the sign-in fails.
pub(crate) async fn run_shops(ctx: &Context, args: &ShopFilterArgs) -> anyhow::Result<()> {
    let mut directory = load_directory(ctx).await?;
    if args.personalize {
        let (email, password) = ctx.credentials()?;
        directory
            .sign_in(email, password)
            .await
            .context("sign-in failed")?;
    }

    let state = directory.state_mut()?;
    if args.country.is_some() {
        state.select_country(args.country.clone());
    }
    if args.city.is_some() {
        state.select_city(args.city.clone());
    }
    if args.business_type.is_some() {
        state.select_business_type(args.business_type.clone());
    }
    if let Some(search) = &args.search {
        state.set_search(search.as_str());
    }

    let total = state.shops().len();
    let results = state.results();
    let shown: Vec<_> = results
        .iter()
        .take(args.limit.unwrap_or(usize::MAX))
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&shown)?);
        return Ok(());
    }

    println!("Showing {} of {total} shops", results.len());
    let labels = state.personalization().bike_labels();
    if !labels.is_empty() {
        println!("Personalized for your bikes: {}", labels.join(", "));
    }
    if results.is_empty() {
        println!("No shops match the current filters.");
    }
    for shop in shown {
        println!();
        print!("{}", ShopCard::from(shop));
    }
    Ok(())
}

/// Print headline catalog numbers.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded.
pub(crate) async fn run_stats(ctx: &Context, json: bool) -> anyhow::Result<()> {
    let directory = load_directory(ctx).await?;
    let stats = loaded(&directory)?.stats();
    if json {
        println!("{}", serde_json::to_string_pretty(stats)?);
        return Ok(());
    }
    println!("{:<12}{}", "SHOPS", stats.total_shops);
    println!("{:<12}{}", "COUNTRIES", stats.total_countries);
    println!("{:<12}{}", "CITIES", stats.total_cities);
    println!("{:<12}{}", "AVG RATING", stats.avg_rating);
    Ok(())
}

/// # Errors
///
/// Returns an error if the catalog cannot be loaded.
pub(crate) async fn run_countries(ctx: &Context) -> anyhow::Result<()> {
    let directory = load_directory(ctx).await?;
    print_facets(loaded(&directory)?.countries(), "no countries found");
    Ok(())
}

/// # Errors
///
/// Returns an error if the catalog cannot be loaded.
pub(crate) async fn run_cities(ctx: &Context, country: &str) -> anyhow::Result<()> {
    let mut directory = load_directory(ctx).await?;
    let (_, cities) = directory
        .state_mut()?
        .select_country(Some(country.to_owned()));
    print_facets(&cities, &format!("no cities found for {country}"));
    Ok(())
}

/// # Errors
///
/// Returns an error if the catalog cannot be loaded.
pub(crate) async fn run_types(ctx: &Context) -> anyhow::Result<()> {
    let directory = load_directory(ctx).await?;
    print_facets(
        loaded(&directory)?.business_types(),
        "no business types found",
    );
    Ok(())
}

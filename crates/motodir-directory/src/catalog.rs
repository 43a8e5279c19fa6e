use motodir_core::Shop;
use motodir_gateway::{Gateway, GatewayError, Query};

pub const DEFAULT_SHOPS_TABLE: &str = "motorcycle_shops";

/// Reads the whole shop catalog in fetch order.
///
/// An empty table is returned as an empty list; deciding whether that is an
/// error is left to the caller.
///
/// # Errors
///
/// Returns the first [`GatewayError`] of any page.
pub async fn load_all_shops<G: Gateway>(
    gateway: &G,
    table: &str,
) -> Result<Vec<Shop>, GatewayError> {
    let shops: Vec<Shop> = gateway.fetch_all(table, &Query::new()).await?;
    tracing::info!(table, count = shops.len(), "loaded shop catalog");
    Ok(shops)
}

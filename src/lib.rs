#![doc = include_str!("../README.md")]
mod api;
mod client;
mod config;
mod enrich;
mod error;
mod filter;
mod money;
mod orders;
mod report;
mod tally;
#[cfg(test)]
mod testing;

pub use api::{
    CatalogObject, CommerceApi, InventoryCount, InventoryCountsPage, ItemVariationData, LineItem,
    Order, OrdersPage,
};
pub use client::SquareClient;
pub use config::{Config, Environment, DEFAULT_API_VERSION, DEFAULT_TIMEOUT};
pub use enrich::{enrich, enrich_catalog, enrich_inventory, EnrichmentPolicy, BATCH_LIMIT};
pub use error::{ApiError, ApiErrors, Error, Result};
pub use filter::{DateRange, OrderFilter, SortOrder, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
pub use money::Money;
pub use orders::OrderPages;
pub use report::{Report, SortBy, NOT_AVAILABLE};
pub use tally::{ItemSales, ItemTally};

use tracing::info;

/// Retrieves every order matching `filter`, totals sales per catalog item,
/// and enriches the totals with catalog and inventory details.
///
/// # Errors
///
/// Returns the first failed order search. Enrichment failures are returned
/// or logged according to `policy`.
pub fn aggregate_sales<A: CommerceApi + ?Sized>(
    api: &A,
    filter: &OrderFilter,
    policy: EnrichmentPolicy,
) -> Result<ItemTally> {
    info!(
        start = %filter.closed_at.start_rfc3339(),
        end = %filter.closed_at.end_rfc3339(),
        "retrieving orders"
    );
    let mut tally = ItemTally::new();
    let mut pages = OrderPages::new(api, filter);
    let orders = tally.accumulate(&mut pages)?;
    info!(
        orders,
        pages = pages.pages_fetched(),
        items = tally.len(),
        "orders retrieved"
    );
    enrich(api, &mut tally, &filter.location_id, policy)?;
    Ok(tally)
}

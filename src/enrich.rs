use tracing::{info, warn};

use std::collections::{HashMap, HashSet};

use crate::{
    api::{next_cursor, CommerceApi},
    error::{Error, Result},
    tally::ItemTally,
};

/// The most ids sent in a single batch lookup.
pub const BATCH_LIMIT: usize = 1000;

/// What to do when a catalog or inventory lookup fails.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum EnrichmentPolicy {
    /// Abandon the run on the first failed lookup.
    #[default]
    FailFast,
    /// Log the failure and report the sales figures without the details
    /// that lookup would have supplied.
    Partial,
}

/// Adds SKU, unit price and remaining quantity to every item in `tally`.
///
/// Issues one catalog lookup and one inventory lookup (more only for very
/// large tallies, or when the inventory response is paginated). Running it
/// again against unchanged data gives the same result.
///
/// # Errors
///
/// Under [`EnrichmentPolicy::FailFast`], returns the first lookup failure;
/// the inventory lookup is not attempted if the catalog lookup fails.
pub fn enrich<A: CommerceApi + ?Sized>(
    api: &A,
    tally: &mut ItemTally,
    location_id: &str,
    policy: EnrichmentPolicy,
) -> Result<()> {
    if tally.is_empty() {
        return Ok(());
    }
    let ids = tally.ids();
    settle(enrich_catalog(api, tally, &ids), policy)?;
    settle(enrich_inventory(api, tally, &ids, location_id), policy)
}

fn settle(result: Result<()>, policy: EnrichmentPolicy) -> Result<()> {
    match (result, policy) {
        (Err(err), EnrichmentPolicy::Partial) => {
            warn!("{err}; continuing without these details");
            Ok(())
        }
        (result, _) => result,
    }
}

/// Fills in `sku` and `unit_price` from the catalog.
///
/// # Errors
///
/// Returns [`Error::Remote`] if a lookup fails.
pub fn enrich_catalog<A: CommerceApi + ?Sized>(
    api: &A,
    tally: &mut ItemTally,
    ids: &[String],
) -> Result<()> {
    let mut found = HashSet::new();
    for chunk in ids.chunks(BATCH_LIMIT) {
        let objects = api
            .batch_retrieve_catalog_objects(chunk)
            .map_err(|errors| Error::remote("BatchRetrieveCatalogObjects", errors))?;
        for object in objects {
            let Some(item) = tally.get_mut(&object.id) else {
                continue;
            };
            found.insert(object.id.clone());
            let Some(data) = object.item_variation_data else {
                warn!(item = %object.id, kind = %object.kind, "catalog object is not an item variation");
                continue;
            };
            if data.sku.is_none() {
                warn!(item = %object.id, "item variation doesn't have a SKU");
            }
            if data.price_money.is_none() {
                warn!(item = %object.id, "item variation doesn't have a price");
            }
            item.sku = data.sku;
            item.unit_price = data.price_money;
        }
    }
    for id in ids.iter().filter(|id| !found.contains(*id)) {
        warn!(item = %id, "no catalog details for item");
    }
    info!(items = found.len(), "retrieved catalog details");
    Ok(())
}

/// Fills in `quantity_remaining` from in-stock inventory counts at
/// `location_id`. Items without tracked inventory are left as `None`.
///
/// # Errors
///
/// Returns [`Error::Remote`] if a lookup fails.
pub fn enrich_inventory<A: CommerceApi + ?Sized>(
    api: &A,
    tally: &mut ItemTally,
    ids: &[String],
    location_id: &str,
) -> Result<()> {
    let mut remaining: HashMap<String, i64> = HashMap::new();
    for chunk in ids.chunks(BATCH_LIMIT) {
        let mut cursor = None;
        loop {
            let page = api
                .batch_retrieve_inventory_counts(chunk, location_id, cursor.as_deref())
                .map_err(|errors| Error::remote("BatchRetrieveInventoryCounts", errors))?;
            for count in page.counts {
                if count.is_in_stock_at(location_id) {
                    *remaining.entry(count.catalog_object_id).or_default() += count.quantity;
                }
            }
            cursor = next_cursor(page.cursor);
            if cursor.is_none() {
                break;
            }
        }
    }
    for id in ids {
        let Some(item) = tally.get_mut(id) else {
            continue;
        };
        item.quantity_remaining = remaining.get(id).copied();
        if item.quantity_remaining.is_none() {
            warn!(item = %id, "no inventory count for item");
        }
    }
    info!(items = remaining.len(), "retrieved inventory counts");
    Ok(())
}

//! The three remote operations a sales report depends on, and the wire
//! types they exchange.
//!
//! [`CommerceApi`] is implemented over HTTPS by [`crate::SquareClient`];
//! anything else that can answer these calls (a fake, a recording proxy)
//! can stand in for it.

use serde::Deserialize;
use serde_with::{serde_as, DefaultOnError, DisplayFromStr, PickFirst};

use crate::{error::ApiErrors, filter::OrderFilter, money::Money};

/// Remote operations used to build a report.
///
/// Every method either returns the decoded response or the structured
/// error list the provider sent back. Implementations never retry.
pub trait CommerceApi {
    /// Returns one page of orders matching `filter`, starting at `cursor`
    /// (or at the beginning, if `cursor` is `None`).
    ///
    /// # Errors
    ///
    /// Returns the provider's error list if the search failed.
    fn search_orders(
        &self,
        filter: &OrderFilter,
        cursor: Option<&str>,
    ) -> Result<OrdersPage, ApiErrors>;

    /// Looks up the catalog objects with the given ids in a single request.
    ///
    /// # Errors
    ///
    /// Returns the provider's error list if the lookup failed.
    fn batch_retrieve_catalog_objects(
        &self,
        ids: &[String],
    ) -> Result<Vec<CatalogObject>, ApiErrors>;

    /// Returns one page of inventory counts for the given catalog ids at
    /// `location_id`.
    ///
    /// # Errors
    ///
    /// Returns the provider's error list if the lookup failed.
    fn batch_retrieve_inventory_counts(
        &self,
        ids: &[String],
        location_id: &str,
        cursor: Option<&str>,
    ) -> Result<InventoryCountsPage, ApiErrors>;
}

/// One page of search results. A missing `orders` key decodes as an empty
/// page.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct OrdersPage {
    #[serde(default)]
    pub orders: Vec<Order>,
    #[serde(default)]
    pub cursor: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Order {
    pub id: String,
    #[serde(default)]
    pub closed_at: Option<String>,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
}

/// A line of an order. Ad hoc items have no `catalog_object_id`.
///
/// `quantity` and `base_price_money` decode to `None` when they are missing
/// or malformed, so one bad line never loses the rest of its page.
#[serde_as]
#[derive(Clone, Debug, Default, Deserialize)]
pub struct LineItem {
    #[serde(default)]
    pub catalog_object_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub variation_name: Option<String>,
    // Sent as a decimal string ("2"), but plain numbers are accepted too.
    // Fractional quantities ("1.5") are for measured items and aren't counted.
    #[serde_as(as = "DefaultOnError<Option<PickFirst<(_, DisplayFromStr)>>>")]
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub base_price_money: Option<Money>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CatalogObject {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub item_variation_data: Option<ItemVariationData>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ItemVariationData {
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub price_money: Option<Money>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct InventoryCountsPage {
    #[serde(default)]
    pub counts: Vec<InventoryCount>,
    #[serde(default)]
    pub cursor: Option<String>,
}

#[serde_as]
#[derive(Clone, Debug, Deserialize)]
pub struct InventoryCount {
    pub catalog_object_id: String,
    #[serde(default)]
    pub location_id: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub quantity: i64,
}

impl InventoryCount {
    /// Whether this count describes sellable stock at `location_id`.
    #[must_use]
    pub fn is_in_stock_at(&self, location_id: &str) -> bool {
        self.state.as_deref().unwrap_or("IN_STOCK") == "IN_STOCK"
            && self
                .location_id
                .as_deref()
                .is_none_or(|loc| loc == location_id)
    }
}

/// Treats an empty cursor the same as a missing one.
pub(crate) fn next_cursor(cursor: Option<String>) -> Option<String> {
    cursor.filter(|c| !c.is_empty())
}

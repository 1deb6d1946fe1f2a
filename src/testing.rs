//! An in-memory [`CommerceApi`] with scripted responses, for tests.

use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
};

use crate::{
    api::{
        CatalogObject, CommerceApi, InventoryCount, InventoryCountsPage, ItemVariationData,
        LineItem, Order, OrdersPage,
    },
    error::ApiErrors,
    filter::{DateRange, OrderFilter},
    money::Money,
};

type Scripted<T> = RefCell<VecDeque<Result<T, ApiErrors>>>;

/// Search results are served from a script, one entry per call. Catalog
/// and inventory lookups are answered from `catalog` and `counts` unless a
/// failure or explicit pages have been scripted.
#[derive(Default)]
pub struct FakeApi {
    search_pages: Scripted<OrdersPage>,
    search_calls: RefCell<Vec<(OrderFilter, Option<String>)>>,
    catalog: Vec<CatalogObject>,
    catalog_failure: Option<ApiErrors>,
    catalog_calls: Cell<usize>,
    counts: Vec<InventoryCount>,
    inventory_pages: Scripted<InventoryCountsPage>,
    inventory_failure: Option<ApiErrors>,
    inventory_cursors: RefCell<Vec<Option<String>>>,
}

impl FakeApi {
    pub fn with_pages(mut self, pages: Vec<Result<OrdersPage, ApiErrors>>) -> Self {
        self.search_pages = RefCell::new(pages.into());
        self
    }

    pub fn with_catalog(mut self, objects: Vec<CatalogObject>) -> Self {
        self.catalog = objects;
        self
    }

    pub fn with_catalog_failure(mut self, errors: ApiErrors) -> Self {
        self.catalog_failure = Some(errors);
        self
    }

    pub fn with_counts(mut self, counts: Vec<InventoryCount>) -> Self {
        self.counts = counts;
        self
    }

    pub fn with_inventory_pages(
        mut self,
        pages: Vec<Result<InventoryCountsPage, ApiErrors>>,
    ) -> Self {
        self.inventory_pages = RefCell::new(pages.into());
        self
    }

    pub fn with_inventory_failure(mut self, errors: ApiErrors) -> Self {
        self.inventory_failure = Some(errors);
        self
    }

    pub fn search_cursors(&self) -> Vec<Option<String>> {
        self.search_calls
            .borrow()
            .iter()
            .map(|(_, cursor)| cursor.clone())
            .collect()
    }

    pub fn search_filters(&self) -> Vec<OrderFilter> {
        self.search_calls
            .borrow()
            .iter()
            .map(|(filter, _)| filter.clone())
            .collect()
    }

    pub fn catalog_calls(&self) -> usize {
        self.catalog_calls.get()
    }

    pub fn inventory_cursors(&self) -> Vec<Option<String>> {
        self.inventory_cursors.borrow().clone()
    }
}

impl CommerceApi for FakeApi {
    fn search_orders(
        &self,
        filter: &OrderFilter,
        cursor: Option<&str>,
    ) -> Result<OrdersPage, ApiErrors> {
        self.search_calls
            .borrow_mut()
            .push((filter.clone(), cursor.map(String::from)));
        self.search_pages
            .borrow_mut()
            .pop_front()
            .expect("unexpected SearchOrders call")
    }

    fn batch_retrieve_catalog_objects(
        &self,
        ids: &[String],
    ) -> Result<Vec<CatalogObject>, ApiErrors> {
        self.catalog_calls.set(self.catalog_calls.get() + 1);
        if let Some(errors) = &self.catalog_failure {
            return Err(errors.clone());
        }
        Ok(self
            .catalog
            .iter()
            .filter(|object| ids.contains(&object.id))
            .cloned()
            .collect())
    }

    fn batch_retrieve_inventory_counts(
        &self,
        ids: &[String],
        _location_id: &str,
        cursor: Option<&str>,
    ) -> Result<InventoryCountsPage, ApiErrors> {
        self.inventory_cursors
            .borrow_mut()
            .push(cursor.map(String::from));
        if let Some(errors) = &self.inventory_failure {
            return Err(errors.clone());
        }
        if let Some(page) = self.inventory_pages.borrow_mut().pop_front() {
            return page;
        }
        Ok(InventoryCountsPage {
            counts: self
                .counts
                .iter()
                .filter(|count| ids.contains(&count.catalog_object_id))
                .cloned()
                .collect(),
            cursor: None,
        })
    }
}

pub fn sample_filter() -> OrderFilter {
    OrderFilter::new("L1", DateRange::parse("2024-01-01", "2024-01-31").unwrap())
}

pub fn line(id: &str, quantity: i64, amount: i64) -> LineItem {
    LineItem {
        catalog_object_id: Some(id.into()),
        name: Some(format!("Item {id}")),
        variation_name: Some("Regular".into()),
        quantity: Some(quantity),
        base_price_money: Some(Money::usd(amount)),
    }
}

/// A line item with no catalog id, as for custom amounts.
pub fn ad_hoc_line(name: &str, quantity: i64, amount: i64) -> LineItem {
    LineItem {
        catalog_object_id: None,
        name: Some(name.into()),
        ..line("", quantity, amount)
    }
}

pub fn order(id: &str, line_items: Vec<LineItem>) -> Order {
    Order {
        id: id.into(),
        closed_at: Some("2024-01-02T12:00:00Z".into()),
        line_items,
    }
}

pub fn variation(id: &str, sku: Option<&str>, price: Option<i64>) -> CatalogObject {
    CatalogObject {
        id: id.into(),
        kind: "ITEM_VARIATION".into(),
        item_variation_data: Some(ItemVariationData {
            sku: sku.map(String::from),
            price_money: price.map(Money::usd),
        }),
    }
}

pub fn in_stock(id: &str, quantity: i64) -> InventoryCount {
    InventoryCount {
        catalog_object_id: id.into(),
        location_id: Some("L1".into()),
        state: Some("IN_STOCK".into()),
        quantity,
    }
}

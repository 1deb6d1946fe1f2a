use tracing::{debug, info, warn};

use std::collections::HashMap;

use crate::{
    api::{LineItem, Order},
    error::Result,
    money::Money,
};

/// Accumulated sales figures for one catalog item variation.
///
/// `sku`, `unit_price` and `quantity_remaining` stay `None` until the tally
/// is enriched, and remain `None` if the catalog or inventory has nothing
/// for this item.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ItemSales {
    pub quantity_sold: i64,
    pub total_sales: Money,
    pub name: String,
    pub variation_name: String,
    pub sku: Option<String>,
    pub unit_price: Option<Money>,
    pub quantity_remaining: Option<i64>,
}

impl ItemSales {
    /// Returns the item's display label, e.g. `Coffee - Small`.
    #[must_use]
    pub fn label(&self) -> String {
        if self.variation_name.is_empty() {
            self.name.clone()
        } else {
            format!("{} - {}", self.name, self.variation_name)
        }
    }

    fn add_sale(&mut self, id: &str, quantity: i64, price: Option<&Money>) {
        let Some(quantity_sold) = self.quantity_sold.checked_add(quantity) else {
            warn!(item = id, quantity, "quantity sold overflows; line item skipped");
            return;
        };
        self.quantity_sold = quantity_sold;
        let Some(price) = price else {
            warn!(item = id, "line item has no base price; counting quantity only");
            return;
        };
        if self.total_sales.currency.is_empty() {
            self.total_sales.currency.clone_from(&price.currency);
        }
        if self.total_sales.currency != price.currency {
            warn!(
                item = id,
                expected = %self.total_sales.currency,
                found = %price.currency,
                "line item currency differs from earlier sales; amount not added"
            );
            return;
        }
        match price
            .checked_mul(quantity)
            .and_then(|amount| self.total_sales.checked_add(&amount))
        {
            Some(total) => self.total_sales = total,
            None => warn!(item = id, quantity, "sales total overflows; amount not added"),
        }
    }
}

/// Per-item sales totals, keyed by catalog item id.
///
/// Items are kept in the order they were first seen, which is the order the
/// report lists them in unless asked to sort.
#[derive(Debug, Default)]
pub struct ItemTally {
    items: Vec<(String, ItemSales)>,
    index: HashMap<String, usize>,
}

impl ItemTally {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one line item into the tally.
    ///
    /// Line items without a catalog id can't be enriched, and line items
    /// without a whole-number quantity can't be counted, so both are logged
    /// and left out. Returns whether the line item was counted.
    pub fn add_line_item(&mut self, line: &LineItem) -> bool {
        let name = line.name.as_deref().unwrap_or_default();
        let variation = line.variation_name.as_deref().unwrap_or_default();
        debug!(name, variation, quantity = ?line.quantity, "line item");
        let Some(id) = line.catalog_object_id.as_deref() else {
            warn!(name, "line item has no catalog object id; skipping");
            return false;
        };
        let Some(quantity) = line.quantity else {
            warn!(
                item = id,
                name,
                "line item quantity is missing or not a whole number; skipping"
            );
            return false;
        };
        let item = self.entry(id);
        item.add_sale(id, quantity, line.base_price_money.as_ref());
        if line.name.is_some() {
            item.name = name.to_string();
        }
        if line.variation_name.is_some() {
            item.variation_name = variation.to_string();
        }
        true
    }

    pub fn add_order(&mut self, order: &Order) {
        info!(
            order_id = %order.id,
            closed_at = order.closed_at.as_deref().unwrap_or("-"),
            "order"
        );
        if order.line_items.is_empty() {
            warn!(order_id = %order.id, "order has no line items");
        }
        for line in &order.line_items {
            self.add_line_item(line);
        }
    }

    /// Folds every order from `orders` into the tally, stopping at the
    /// first error. Returns the number of orders processed.
    ///
    /// # Errors
    ///
    /// Returns the first error yielded by `orders`; nothing after it is
    /// consumed.
    pub fn accumulate<I>(&mut self, orders: I) -> Result<usize>
    where
        I: IntoIterator<Item = Result<Order>>,
    {
        let mut count = 0;
        for order in orders {
            self.add_order(&order?);
            count += 1;
        }
        Ok(count)
    }

    fn entry(&mut self, id: &str) -> &mut ItemSales {
        let pos = match self.index.get(id) {
            Some(&pos) => pos,
            None => {
                self.items.push((id.to_string(), ItemSales::default()));
                let pos = self.items.len() - 1;
                self.index.insert(id.to_string(), pos);
                pos
            }
        };
        &mut self.items[pos].1
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ItemSales> {
        self.index.get(id).map(|&pos| &self.items[pos].1)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut ItemSales> {
        self.index.get(id).map(|&pos| &mut self.items[pos].1)
    }

    /// Returns the distinct catalog ids seen so far, in first-seen order.
    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        self.items.iter().map(|(id, _)| id.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ItemSales)> {
        self.items.iter().map(|(id, item)| (id.as_str(), item))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn total_units(&self) -> i64 {
        self.items.iter().map(|(_, item)| item.quantity_sold).sum()
    }

    /// Returns total sales across all items, one entry per currency, in
    /// first-seen order. An item whose sales would overflow its currency's
    /// total is logged and left out of it.
    #[must_use]
    pub fn grand_totals(&self) -> Vec<Money> {
        let mut totals: Vec<Money> = Vec::new();
        for (_, item) in &self.items {
            let sales = &item.total_sales;
            if sales.currency.is_empty() {
                continue;
            }
            match totals.iter_mut().find(|t| t.currency == sales.currency) {
                Some(total) => match total.checked_add(sales) {
                    Some(sum) => *total = sum,
                    None => warn!(currency = %sales.currency, "grand total overflows"),
                },
                None => totals.push(sales.clone()),
            }
        }
        totals
    }
}

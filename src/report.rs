use serde::Serialize;

use std::{fmt::Display, fs::File, io::Write, path::Path};

use crate::{
    error::Result,
    tally::{ItemSales, ItemTally},
};

/// Shown in place of catalog or inventory details that aren't available.
pub const NOT_AVAILABLE: &str = "N/A";

/// How report rows are ordered.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, clap::ValueEnum)]
pub enum SortBy {
    /// The order items were first sold in.
    #[default]
    None,
    /// Units sold, descending.
    Units,
    /// Total sales, descending.
    Revenue,
}

/// A finished sales report, ready to print or export.
///
/// To get a printable table, use its [`Display`] implementation.
///
/// To export the rows as CSV, use [`Report::write_csv`] or
/// [`Report::write_csv_file`].
#[derive(Debug)]
pub struct Report {
    title: String,
    tally: ItemTally,
    pub sort_by: SortBy,
}

impl Report {
    /// Creates a report over `tally` titled with the given date labels.
    #[must_use]
    pub fn new(start: &str, end: &str, tally: ItemTally) -> Self {
        Self {
            title: format!("*** SALES REPORT: {start} - {end} ***"),
            tally,
            sort_by: SortBy::default(),
        }
    }

    /// Returns the report rows in the configured order.
    #[must_use]
    pub fn rows(&self) -> Vec<(&str, &ItemSales)> {
        match self.sort_by {
            SortBy::None => self.tally.iter().collect(),
            SortBy::Units => self.items_by_unit_sales(),
            SortBy::Revenue => self.items_by_revenue(),
        }
    }

    /// Returns items sorted by unit sales, descending.
    ///
    /// Items with identical sales are sorted alphabetically by label.
    #[must_use]
    pub fn items_by_unit_sales(&self) -> Vec<(&str, &ItemSales)> {
        let mut items: Vec<_> = self.tally.iter().collect();
        items.sort_by(|(_, a), (_, b)| {
            b.quantity_sold
                .cmp(&a.quantity_sold)
                .then_with(|| a.label().cmp(&b.label()))
        });
        items
    }

    /// Returns items sorted by total sales, descending.
    ///
    /// Items with identical sales are sorted alphabetically by label.
    #[must_use]
    pub fn items_by_revenue(&self) -> Vec<(&str, &ItemSales)> {
        let mut items: Vec<_> = self.tally.iter().collect();
        items.sort_by(|(_, a), (_, b)| {
            b.total_sales
                .amount
                .cmp(&a.total_sales.amount)
                .then_with(|| a.label().cmp(&b.label()))
        });
        items
    }

    /// Writes one CSV row per item, with a header row, to `wtr`.
    ///
    /// Missing SKU, price, or remaining quantity are written as empty
    /// fields.
    ///
    /// # Errors
    ///
    /// Returns any errors from writing to `wtr`.
    pub fn write_csv<W: Write>(&self, wtr: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(wtr);
        for (id, item) in self.rows() {
            wtr.serialize(CsvRow::new(id, item))?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Writes the CSV export to a new file at `path`.
    ///
    /// # Errors
    ///
    /// Returns any errors from creating or writing the file.
    pub fn write_csv_file(&self, path: impl AsRef<Path>) -> Result<()> {
        self.write_csv(File::create(path)?)
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.title)?;
        let rows = self.rows();
        let width = rows
            .iter()
            .map(|(_, item)| item.label().chars().count())
            .max()
            .unwrap_or_default()
            .max("Item".len());
        let sku_width = rows
            .iter()
            .filter_map(|(_, item)| item.sku.as_ref().map(|sku| sku.chars().count()))
            .max()
            .unwrap_or_default()
            .max(NOT_AVAILABLE.len())
            .max("SKU".len());
        writeln!(
            f,
            "{:width$} {:sku_width$} {:>12} {:>8} {:>12} {:>13}",
            "Item", "SKU", "Price", "Qty Sold", "Total Sales", "Qty Remaining"
        )?;
        let length = width + sku_width + 50;
        writeln!(f, "{:-<length$}", "")?;
        if rows.is_empty() {
            writeln!(f, "No sales found")?;
        }
        for (_, item) in rows {
            writeln!(
                f,
                "{:width$} {:sku_width$} {:>12} {:8} {:>12} {:>13}",
                item.label(),
                item.sku.as_deref().unwrap_or(NOT_AVAILABLE),
                Optional(item.unit_price.as_ref()),
                item.quantity_sold,
                item.total_sales,
                Optional(item.quantity_remaining),
            )?;
        }
        writeln!(f, "{:-<length$}", "")?;
        let totals: Vec<String> = self
            .tally
            .grand_totals()
            .iter()
            .map(ToString::to_string)
            .collect();
        writeln!(
            f,
            "{:width$} {:sku_width$} {:>12} {:8} {:>12}",
            "Total",
            "",
            "",
            self.tally.total_units(),
            totals.join(", ")
        )?;
        Ok(())
    }
}

/// Displays the inner value, or [`NOT_AVAILABLE`] when there isn't one.
struct Optional<T>(Option<T>);

impl<T: Display> Display for Optional<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            Some(value) => f.pad(&value.to_string()),
            None => f.pad(NOT_AVAILABLE),
        }
    }
}

/// Defines the CSV export format.
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    #[serde(rename = "Item ID")]
    id: &'a str,
    #[serde(rename = "Quantity Sold")]
    quantity_sold: i64,
    #[serde(rename = "Total Sales")]
    total_sales: String,
    #[serde(rename = "Currency")]
    currency: &'a str,
    #[serde(rename = "Item Name")]
    name: &'a str,
    #[serde(rename = "Variation Name")]
    variation_name: &'a str,
    #[serde(rename = "SKU")]
    sku: Option<&'a str>,
    #[serde(rename = "Unit Price")]
    unit_price: Option<String>,
    #[serde(rename = "Quantity Remaining")]
    quantity_remaining: Option<i64>,
}

impl<'a> CsvRow<'a> {
    fn new(id: &'a str, item: &'a ItemSales) -> Self {
        Self {
            id,
            quantity_sold: item.quantity_sold,
            total_sales: item.total_sales.major_units(),
            currency: &item.total_sales.currency,
            name: &item.name,
            variation_name: &item.variation_name,
            sku: item.sku.as_deref(),
            unit_price: item.unit_price.as_ref().map(crate::Money::major_units),
            quantity_remaining: item.quantity_remaining,
        }
    }
}

use serde::Deserialize;

use std::fmt::{Debug, Display};

/// Represents an amount of money in a given currency.
///
/// The amount is stored internally as an integer number of minor currency
/// units (cents, for USD), exactly as the Square API sends it, but the
/// [`Display`] implementation formats it in major units to 2 decimal places.
///
/// ```
/// # use square_sales::Money;
/// let price = Money::usd(500);
/// assert_eq!(price.checked_mul(5).unwrap().to_string(), "$25.00");
/// assert_eq!(Money::new(1999, "EUR").to_string(), "19.99 EUR");
/// ```
#[derive(Clone, Default, Deserialize, Eq, PartialEq, Ord, PartialOrd)]
pub struct Money {
    pub amount: i64,
    pub currency: String,
}

impl Money {
    #[must_use]
    pub fn new(amount: i64, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
        }
    }

    #[must_use]
    pub fn usd(amount: i64) -> Self {
        Self::new(amount, "USD")
    }

    /// Multiplies by a quantity, returning `None` on overflow.
    #[must_use]
    pub fn checked_mul(&self, quantity: i64) -> Option<Self> {
        let amount = self.amount.checked_mul(quantity)?;
        Some(Self::new(amount, self.currency.clone()))
    }

    /// Adds `other`'s amount, returning `None` on overflow. The caller is
    /// responsible for not mixing currencies.
    #[must_use]
    pub fn checked_add(&self, other: &Money) -> Option<Self> {
        let amount = self.amount.checked_add(other.amount)?;
        Some(Self::new(amount, self.currency.clone()))
    }

    /// Formats the amount in major units, without any currency marker.
    #[must_use]
    pub fn major_units(&self) -> String {
        let sign = if self.amount < 0 { "-" } else { "" };
        let abs = self.amount.unsigned_abs();
        format!("{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl Debug for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = if self.currency == "USD" {
            format!("${}", self.major_units())
        } else {
            format!("{} {}", self.major_units(), self.currency)
        };
        f.pad(&text)
    }
}

//! Cart ledger: quantity-tracked products with a derived total.
//!
//! Prices arrive as display strings (`"$1,299.00"`). They are parsed once,
//! when a product first enters the cart, into integer cents; a product whose
//! price cannot be parsed is refused rather than counted as free. Totals and
//! counts are never cached: every read walks the items again.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{LedgerError, PriceError};
use crate::ports::backend::Product;

/// An amount of money in cents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Money(u64);

impl Money {
    /// Zero.
    pub const ZERO: Self = Self(0);

    /// Wraps a number of cents.
    #[must_use]
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// The amount in cents.
    #[must_use]
    pub const fn cents(self) -> u64 {
        self.0
    }

    fn times(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(u64::from(quantity)))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// Parses a store price such as `"$3.50"`, `"US$ 1,299"` or `"4.5"`.
///
/// A leading currency symbol or code and `,` grouping separators are
/// ignored. At most two fraction digits may be significant.
///
/// # Errors
///
/// Returns a [`PriceError`] describing why the string is not a price.
pub fn parse_price(raw: &str) -> Result<Money, PriceError> {
    let trimmed = raw.trim();
    let Some(start) = trimmed.find(|c: char| c.is_ascii_digit() || c == '.') else {
        return Err(if trimmed.contains('-') {
            PriceError::Negative
        } else if trimmed.chars().any(char::is_alphanumeric) {
            PriceError::Malformed
        } else {
            PriceError::Empty
        });
    };

    let (symbol, amount) = trimmed.split_at(start);
    if symbol.contains('-') {
        return Err(PriceError::Negative);
    }

    let amount: String = amount.chars().filter(|c| *c != ',').collect();
    let (whole, fraction) = amount.split_once('.').unwrap_or((amount.as_str(), ""));
    if whole.is_empty() && fraction.is_empty() {
        return Err(PriceError::Malformed);
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(PriceError::Malformed);
    }

    let fraction = match fraction.get(2..) {
        Some(rest) if rest.bytes().any(|b| b != b'0') => return Err(PriceError::SubCent),
        Some(_) => &fraction[..2],
        None => fraction,
    };

    let whole: u64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| PriceError::Overflow)?
    };
    let cents: u64 = match fraction.len() {
        0 => 0,
        1 => u64::from(fraction.as_bytes()[0] - b'0') * 10,
        _ => fraction.parse().map_err(|_| PriceError::Malformed)?,
    };

    whole
        .checked_mul(100)
        .and_then(|value| value.checked_add(cents))
        .map(Money)
        .ok_or(PriceError::Overflow)
}

/// A product in the cart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartItem {
    /// The product as the store listed it.
    #[serde(flatten)]
    pub product: Product,
    /// How many; always at least 1.
    pub quantity: u32,
    /// When the product first entered the cart.
    #[serde(rename = "addedAt")]
    pub added_at: DateTime<Utc>,
    #[serde(skip)]
    unit_price: Money,
}

impl CartItem {
    /// Product identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.product.id
    }

    /// Parsed price of one unit.
    #[must_use]
    pub fn unit_price(&self) -> Money {
        self.unit_price
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.unit_price.times(self.quantity)
    }
}

/// One rendered cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLine {
    /// Product identifier.
    pub id: String,
    /// Product name.
    pub name: String,
    /// Price of one unit.
    pub unit_price: Money,
    /// Quantity in the cart.
    pub quantity: u32,
    /// Unit price times quantity.
    pub line_total: Money,
}

/// Display state derived from the ledger in one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CartSummary {
    /// Lines in cart order.
    pub lines: Vec<CartLine>,
    /// Sum of every line total.
    pub total: Money,
    /// Sum of quantities, shown on the cart badge.
    pub item_count: u32,
}

/// Quantity-tracked cart, unique by product id, in first-added order.
#[derive(Debug, Clone, Default)]
pub struct CartLedger {
    items: Vec<CartItem>,
}

impl CartLedger {
    /// Creates an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one unit of `product` and returns its new quantity.
    ///
    /// An item already in the cart keeps its position and timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidPrice`] when a new product's price
    /// cannot be parsed; the cart is left unchanged.
    pub fn add(&mut self, product: Product, now: DateTime<Utc>) -> Result<u32, LedgerError> {
        if let Some(item) = self.items.iter_mut().find(|item| item.product.id == product.id) {
            item.quantity = item.quantity.saturating_add(1);
            return Ok(item.quantity);
        }

        let unit_price = parse_price(&product.price).map_err(|source| LedgerError::InvalidPrice {
            id: product.id.clone(),
            price: product.price.clone(),
            source,
        })?;
        self.items.push(CartItem { product, quantity: 1, added_at: now, unit_price });
        Ok(1)
    }

    /// Adjusts the quantity of `id` by `delta`.
    ///
    /// Returns the new quantity, or `None` when the item is absent or was
    /// removed because its quantity would have dropped to zero or below.
    pub fn change_quantity(&mut self, id: &str, delta: i32) -> Option<u32> {
        let index = self.items.iter().position(|item| item.product.id == id)?;
        let next = i64::from(self.items[index].quantity) + i64::from(delta);
        if next <= 0 {
            self.items.remove(index);
            return None;
        }
        let quantity = u32::try_from(next).unwrap_or(u32::MAX);
        self.items[index].quantity = quantity;
        Some(quantity)
    }

    /// Removes `id`. Returns whether it was present.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.product.id != id);
        self.items.len() != before
    }

    /// Empties the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Looks up an item.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&CartItem> {
        self.items.iter().find(|item| item.product.id == id)
    }

    /// Items in cart order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Whether the cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of `price × quantity` over all items.
    #[must_use]
    pub fn total(&self) -> Money {
        let cents =
            self.items.iter().fold(0u64, |acc, item| acc.saturating_add(item.line_total().0));
        Money(cents)
    }

    /// Sum of quantities.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().fold(0u32, |acc, item| acc.saturating_add(item.quantity))
    }

    /// Recomputes the full display state.
    #[must_use]
    pub fn summary(&self) -> CartSummary {
        let lines = self
            .items
            .iter()
            .map(|item| CartLine {
                id: item.product.id.clone(),
                name: item.product.name.clone(),
                unit_price: item.unit_price,
                quantity: item.quantity,
                line_total: item.line_total(),
            })
            .collect();
        CartSummary { lines, total: self.total(), item_count: self.item_count() }
    }
}

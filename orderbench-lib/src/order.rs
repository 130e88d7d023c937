//! Synthetic order payloads.
//!
//! Every submission gets a freshly generated [`Order`]. The random source is
//! always passed in by the caller, so production code can hand out one
//! OS-seeded generator per simulated user while tests use seeded ones.

use std::fmt;

use rand::{Rng, RngExt as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// Customer ids are drawn uniformly from this (inclusive) range.
pub const CUSTOMER_ID_RANGE: std::ops::RangeInclusive<u32> = 1..=1000;

/// Quantity of a line item, inclusive on both ends.
pub const QUANTITY_RANGE: std::ops::RangeInclusive<u32> = 1..=5;

/// Upper bound of a random line item price, in cents.
const MAX_RANDOM_PRICE_CENTS: u32 = 10_000;

/// Random shaped orders contain between 1 and 3 items.
const RANDOM_ITEM_COUNT: std::ops::RangeInclusive<usize> = 1..=3;

const SAMPLE_PRODUCT_ID: &str = "sku-1";
const SAMPLE_PRICE: Price = Price::from_cents(999);

/// Payload submitted to the order API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: Uuid,
    pub customer_id: u32,
    pub items: Vec<LineItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: String,
    pub quantity: u32,
    pub price: Price,
}

/// Non-negative price with a precision of two decimals.
///
/// Stored as cents, exchanged as a JSON number (e.g. `9.99`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(u32);

impl Price {
    #[inline(always)]
    pub const fn from_cents(cents: u32) -> Self {
        Self(cents)
    }

    #[inline(always)]
    pub const fn cents(self) -> u32 {
        self.0
    }

    #[inline(always)]
    pub fn as_f64(self) -> f64 {
        self.0 as f64 / 100.
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        if !value.is_finite() || value < 0. {
            return Err(serde::de::Error::custom(format!(
                "price must be a non-negative number, got {value}"
            )));
        }
        let cents = (value * 100.).round();
        if cents > u32::MAX as f64 {
            return Err(serde::de::Error::custom(format!(
                "price out of range: {value}"
            )));
        }
        Ok(Self(cents as u32))
    }
}

/// How the line items of a generated order are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderShape {
    /// A single `sku-1` item, quantity 1, priced 9.99.
    #[default]
    Sample,
    /// One to three `prod-<n>` items with random quantity and price.
    Random,
}

/// Generate a fresh order using the provided random source.
pub fn generate_order_with<R: Rng + ?Sized>(rng: &mut R, shape: OrderShape) -> Order {
    let order_id = uuid::Builder::from_random_bytes(rng.random()).into_uuid();
    let customer_id = rng.random_range(CUSTOMER_ID_RANGE);

    let items = match shape {
        OrderShape::Sample => vec![LineItem {
            product_id: SAMPLE_PRODUCT_ID.to_owned(),
            quantity: 1,
            price: SAMPLE_PRICE,
        }],
        OrderShape::Random => {
            let count = rng.random_range(RANDOM_ITEM_COUNT);
            (1..=count)
                .map(|index| LineItem {
                    product_id: format!("prod-{index}"),
                    quantity: rng.random_range(QUANTITY_RANGE),
                    price: Price::from_cents(rng.random_range(0..=MAX_RANDOM_PRICE_CENTS)),
                })
                .collect()
        }
    };

    Order {
        order_id,
        customer_id,
        items,
    }
}

/// Generate a sample shaped order from the thread local random source.
pub fn generate_order() -> Order {
    generate_order_with(&mut rand::rng(), OrderShape::Sample)
}

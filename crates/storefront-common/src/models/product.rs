use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Cow;
use validator::{Validate, ValidationError};

use crate::validation::trimmed;

/// Largest price accepted: 8 integer digits
const MAX_PRICE_CENTS: i64 = 99_999_999_99;

/// Monetary amount in integer cents.
///
/// Serialized as a JSON number with at most two fraction digits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(i64);

impl Price {
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Convert a decimal amount; `None` if negative, non-finite or finer than a cent.
    pub fn from_decimal(value: f64) -> Option<Self> {
        if !value.is_finite() || value < 0.0 {
            return None;
        }
        let scaled = value * 100.0;
        let cents = scaled.round();
        if (scaled - cents).abs() > 1e-6 || cents > i64::MAX as f64 {
            return None;
        }
        Some(Self(cents as i64))
    }

    pub fn as_decimal(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub fn checked_mul(self, quantity: i64) -> Option<Self> {
        self.0.checked_mul(quantity).map(Self)
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_decimal())
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Price::from_decimal(value)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid price: {value}")))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: Price,
    pub category: Option<String>,
    /// Units in stock
    pub pnum: i32,
    pub imgurl: Option<String>,
    pub description: Option<String>,
}

/// Body of POST and PUT /products
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProductRequest {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 40, message = "name must be 1 to 40 characters"))]
    pub name: String,
    #[validate(
        required(message = "price must not be null"),
        custom(function = "valid_price")
    )]
    pub price: Option<f64>,
    #[validate(length(max = 40, message = "category must be at most 40 characters"))]
    pub category: Option<String>,
    #[validate(
        required(message = "pnum must not be null"),
        range(min = 0, max = 2147483647, message = "pnum must be between 0 and 2147483647")
    )]
    pub pnum: Option<i64>,
    #[validate(length(max = 255, message = "imgurl must be at most 255 characters"))]
    pub imgurl: Option<String>,
    #[validate(length(max = 1000, message = "description must be at most 1000 characters"))]
    pub description: Option<String>,
}

impl ProductRequest {
    pub fn price(&self) -> Option<Price> {
        self.price.and_then(Price::from_decimal)
    }

    /// Stock count, once validated.
    pub fn pnum(&self) -> i32 {
        self.pnum
            .and_then(|n| i32::try_from(n).ok())
            .unwrap_or_default()
    }
}

fn valid_price(value: f64) -> Result<(), ValidationError> {
    let message = if value.is_nan() || value < 0.01 {
        "price must be at least 0.01"
    } else {
        match Price::from_decimal(value) {
            None => "price must have at most 2 decimal places",
            Some(p) if p.cents() > MAX_PRICE_CENTS => "price must have at most 8 integer digits",
            Some(_) => return Ok(()),
        }
    };
    let mut error = ValidationError::new("price");
    error.message = Some(Cow::from(message));
    Err(error)
}

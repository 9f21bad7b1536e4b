use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::QuantityError;

/// Currency prefix used for per-row prices and subtotals.
pub const DEFAULT_CURRENCY_SYMBOL: &str = "₹";

/// Summary text shown when the cart holds nothing.
pub const EMPTY_TOTAL: &str = "0.00";

pub const MIN_QUANTITY: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub Uuid);

impl ItemId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for ItemId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s.trim())?))
    }
}

/// One product line. Carts written before identifiers existed are accepted
/// and receive a fresh id when parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(default)]
    pub id: ItemId,
    pub title: String,
    pub price: f64,
    #[serde(deserialize_with = "quantity_serde::deserialize")]
    pub quantity: u32,
    pub image: String,
}

impl CartItem {
    pub fn new(
        title: impl Into<String>,
        price: f64,
        quantity: u32,
        image: impl Into<String>,
    ) -> Self {
        Self {
            id: ItemId::new(),
            title: title.into(),
            price,
            quantity,
            image: image.into(),
        }
    }

    pub fn subtotal(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

/// Ordered cart contents; insertion order is display order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart(pub Vec<CartItem>);

impl Cart {
    pub fn new(items: Vec<CartItem>) -> Self {
        Self(items)
    }

    pub fn items(&self) -> &[CartItem] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn position(&self, id: ItemId) -> Option<usize> {
        self.0.iter().position(|item| item.id == id)
    }

    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut CartItem> {
        self.0.iter_mut().find(|item| item.id == id)
    }

    pub fn remove(&mut self, id: ItemId) -> Option<CartItem> {
        let index = self.position(id)?;
        Some(self.0.remove(index))
    }

    /// Sum of `price * quantity` over the numeric model, before any rounding.
    pub fn total(&self) -> f64 {
        self.0.iter().map(CartItem::subtotal).sum()
    }
}

/// Two-decimal rendering shared by subtotals and the summary total. Values
/// lying exactly halfway between two cents round away from zero, as browser
/// `toFixed(2)` does; `{:.2}` alone would round those to even.
pub fn format_amount(value: f64) -> String {
    match half_cent_tie(value.abs()) {
        Some(cents) => {
            let sign = if value < 0.0 { "-" } else { "" };
            format!("{sign}{}.{:02}", cents / 100, cents % 100)
        }
        None => format!("{value:.2}"),
    }
}

/// Cent count rounded up when `value` is exactly representable as a whole
/// number of cents plus one half.
fn half_cent_tie(value: f64) -> Option<u128> {
    if !value.is_finite() || value == 0.0 {
        return None;
    }
    let bits = value.to_bits();
    let biased_exponent = ((bits >> 52) & 0x7ff) as i32;
    let fraction = bits & ((1u64 << 52) - 1);
    // value == mantissa * 2^exponent
    let (mantissa, exponent) = if biased_exponent == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1u64 << 52), biased_exponent - 1075)
    };
    if exponent >= 0 {
        return None;
    }

    let shift = exponent.unsigned_abs();
    let scaled = u128::from(mantissa) * 1000;
    if shift >= 128 || scaled.trailing_zeros() < shift {
        return None;
    }
    let mills = scaled >> shift;
    (mills % 10 == 5).then(|| mills / 10 + 1)
}

/// Parses raw quantity input. The text must be a number; its integer part is
/// taken the way a browser's `parseInt` reads it, so `"3.5"` is 3 and
/// `"2.0"` is 2. Results below one are rejected.
pub fn parse_quantity(input: &str) -> Result<u32, QuantityError> {
    let trimmed = input.trim();
    let not_a_number = || QuantityError::NotANumber {
        input: trimmed.to_string(),
    };
    if !trimmed.parse::<f64>().is_ok_and(f64::is_finite) {
        return Err(not_a_number());
    }

    let unsigned = trimmed.strip_prefix(&['+', '-'][..]).unwrap_or(trimmed);
    let digits = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    if digits == 0 {
        return Err(not_a_number());
    }
    let magnitude = unsigned[..digits]
        .parse::<u64>()
        .map_or(i64::MAX, |m| i64::try_from(m).unwrap_or(i64::MAX));
    let value = if trimmed.starts_with('-') {
        -magnitude
    } else {
        magnitude
    };

    if value < i64::from(MIN_QUANTITY) {
        return Err(QuantityError::BelowMinimum { value });
    }
    u32::try_from(value).map_err(|_| QuantityError::OutOfRange { value })
}

/// Quantities arrive as JSON numbers written by other code; integer-valued
/// floats such as `1.0` are accepted alongside plain integers.
pub(crate) mod quantity_serde {
    use serde::{de::Error as _, Deserialize, Deserializer};
    use serde_json::Number;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u32, D::Error>
    where
        D: Deserializer<'de>,
    {
        let number = Number::deserialize(deserializer)?;
        if let Some(value) = number.as_u64() {
            return u32::try_from(value)
                .map_err(|_| D::Error::custom(format!("quantity {value} out of range")));
        }
        match number.as_f64() {
            Some(value) if value.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&value) => {
                Ok(value as u32)
            }
            _ => Err(D::Error::custom(format!(
                "quantity {number} is not a whole non-negative number"
            ))),
        }
    }
}

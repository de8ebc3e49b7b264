//! Money type for representing monetary values.
//!
//! Uses minor-unit integer representation (kopiyky, cents) to avoid
//! floating-point drift in totals.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    #[default]
    UAH,
    USD,
    EUR,
}

impl Currency {
    /// Get the currency code (e.g., "UAH").
    pub fn code(&self) -> &'static str {
        match self {
            Currency::UAH => "UAH",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
        }
    }

    /// Get the currency symbol.
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::UAH => "\u{20b4}",
            Currency::USD => "$",
            Currency::EUR => "\u{20ac}",
        }
    }

    /// Parse a currency code string.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_uppercase().as_str() {
            "UAH" => Some(Currency::UAH),
            "USD" => Some(Currency::USD),
            "EUR" => Some(Currency::EUR),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A monetary value with currency.
///
/// Amounts are stored in hundredths of the currency unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    /// Amount in hundredths.
    pub amount_cents: i64,
    /// The currency.
    pub currency: Currency,
}

impl Money {
    /// Create a new Money value from cents.
    pub fn new(amount_cents: i64, currency: Currency) -> Self {
        Self {
            amount_cents,
            currency,
        }
    }

    /// Create a Money value from a decimal amount.
    ///
    /// ```
    /// use inkwell_commerce::money::{Money, Currency};
    /// let price = Money::from_decimal(249.99, Currency::UAH);
    /// assert_eq!(price.amount_cents, 24999);
    /// ```
    pub fn from_decimal(amount: f64, currency: Currency) -> Self {
        Self::new((amount * 100.0).round() as i64, currency)
    }

    /// Create a zero amount in the given currency.
    pub fn zero(currency: Currency) -> Self {
        Self::new(0, currency)
    }

    /// Check if this is negative.
    pub fn is_negative(&self) -> bool {
        self.amount_cents < 0
    }

    /// Format with symbol (e.g., "249.99 ₴").
    pub fn display(&self) -> String {
        format!("{} {}", self.display_amount(), self.currency.symbol())
    }

    /// Format the amount with exactly two decimals (e.g., "249.99").
    ///
    /// Formats from the integer amount so no float rounding is involved.
    pub fn display_amount(&self) -> String {
        let sign = if self.amount_cents < 0 { "-" } else { "" };
        let abs = self.amount_cents.unsigned_abs();
        format!("{}{}.{:02}", sign, abs / 100, abs % 100)
    }

    /// Try to add another Money value, returning None on currency
    /// mismatch or overflow.
    pub fn try_add(&self, other: &Money) -> Option<Money> {
        if self.currency != other.currency {
            return None;
        }
        self.amount_cents
            .checked_add(other.amount_cents)
            .map(|amount| Money::new(amount, self.currency))
    }

    /// Multiply by a count, returning None on overflow.
    pub fn try_multiply(&self, factor: i64) -> Option<Money> {
        self.amount_cents
            .checked_mul(factor)
            .map(|amount| Money::new(amount, self.currency))
    }

    /// Multiply by a count, clamping at the bounds of the amount.
    pub fn saturating_multiply(&self, factor: i64) -> Money {
        Money::new(self.amount_cents.saturating_mul(factor), self.currency)
    }

    /// Calculate a percentage of this amount, rounded half away from zero.
    pub fn percentage(&self, percent: f64) -> Money {
        let amount = (self.amount_cents as f64 * percent / 100.0).round() as i64;
        Money::new(amount, self.currency)
    }

    /// This amount reduced by a discount percentage.
    ///
    /// `None` and `Some(0.0)` both leave the amount unchanged.
    pub fn discounted(&self, percent: Option<f64>) -> Money {
        match percent {
            Some(p) if p > 0.0 => {
                Money::new(self.amount_cents - self.percentage(p).amount_cents, self.currency)
            }
            _ => *self,
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// Render a decimal money value with exactly two digits after the point.
///
/// ```
/// use inkwell_commerce::money::render_price;
/// assert_eq!(render_price(12.0), "12.00");
/// assert_eq!(render_price(12.5), "12.50");
/// ```
pub fn render_price(value: f64) -> String {
    Money::from_decimal(value, Currency::default()).display_amount()
}

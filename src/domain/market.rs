//! Instrument metadata.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Market describes the trading rules of a single futures instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Market {
    /// Exchange symbol (e.g., "BTCUSDT").
    pub symbol: String,
    /// Minimum price increment from the exchange price filter.
    pub tick_size: Option<Decimal>,
    /// Number of decimals the exchange accepts for prices.
    pub price_precision: Option<u32>,
}

impl Market {
    /// Returns the most specific precision the exchange reported,
    /// or `fallback` decimals when it reported none.
    pub fn precision(&self, fallback: u32) -> PricePrecision {
        match (self.tick_size, self.price_precision) {
            (Some(tick), _) if tick > Decimal::ZERO => PricePrecision::Tick(tick),
            (_, Some(dp)) => PricePrecision::Decimals(dp),
            _ => PricePrecision::Decimals(fallback),
        }
    }
}

/// PricePrecision defines how a computed price is snapped to a valid level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PricePrecision {
    /// Round to a whole number of decimal places.
    Decimals(u32),
    /// Round to the nearest multiple of the tick.
    Tick(Decimal),
}

impl PricePrecision {
    /// Rounds a price half-to-even onto this precision.
    /// Returns None when the price cannot be represented on the tick grid.
    pub fn round(&self, price: Decimal) -> Option<Decimal> {
        match *self {
            PricePrecision::Decimals(dp) => {
                let mut rounded =
                    price.round_dp_with_strategy(dp, RoundingStrategy::MidpointNearestEven);
                rounded.rescale(dp);
                Some(rounded)
            }
            PricePrecision::Tick(tick) => {
                let steps = price
                    .checked_div(tick)?
                    .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven);
                let mut rounded = steps.checked_mul(tick)?;
                rounded.rescale(tick.normalize().scale());
                Some(rounded)
            }
        }
    }
}

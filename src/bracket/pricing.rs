//! Bracket price computation.

use rust_decimal::Decimal;

use super::PricingError;
use crate::domain::{PositionSide, PricePrecision};

const TAKE_PROFIT: &str = "take profit";
const STOP_LOSS: &str = "stop loss";

/// Exit trigger levels around an entry price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BracketPrices {
    pub take_profit_price: Decimal,
    pub stop_loss_price: Decimal,
}

/// Computes take-profit and stop-loss triggers from percentage offsets.
///
/// Long positions take profit above entry and stop out below it; short
/// positions mirror that. Both prices are rounded onto `precision` and must
/// stay positive.
pub fn compute(
    entry_price: Decimal,
    side: PositionSide,
    take_profit_percent: Decimal,
    stop_loss_percent: Decimal,
    precision: PricePrecision,
) -> Result<BracketPrices, PricingError> {
    if entry_price <= Decimal::ZERO {
        return Err(PricingError::NonPositiveEntry(entry_price));
    }

    let tp_frac = take_profit_percent / Decimal::ONE_HUNDRED;
    let sl_frac = stop_loss_percent / Decimal::ONE_HUNDRED;

    let (take_profit, stop_loss) = match side {
        PositionSide::Long => (
            Decimal::ONE.checked_add(tp_frac),
            Decimal::ONE.checked_sub(sl_frac),
        ),
        PositionSide::Short => (
            Decimal::ONE.checked_sub(tp_frac),
            Decimal::ONE.checked_add(sl_frac),
        ),
    };

    let prices = BracketPrices {
        take_profit_price: level(entry_price, take_profit, precision, TAKE_PROFIT)?,
        stop_loss_price: level(entry_price, stop_loss, precision, STOP_LOSS)?,
    };

    if prices.take_profit_price <= Decimal::ZERO {
        return Err(PricingError::NonPositivePrice {
            leg: TAKE_PROFIT,
            price: prices.take_profit_price,
        });
    }
    if prices.stop_loss_price <= Decimal::ZERO {
        return Err(PricingError::NonPositivePrice {
            leg: STOP_LOSS,
            price: prices.stop_loss_price,
        });
    }

    Ok(prices)
}

/// Applies a multiplier to the entry and rounds it, failing instead of overflowing.
fn level(
    entry_price: Decimal,
    factor: Option<Decimal>,
    precision: PricePrecision,
    leg: &'static str,
) -> Result<Decimal, PricingError> {
    factor
        .and_then(|f| entry_price.checked_mul(f))
        .and_then(|price| precision.round(price))
        .ok_or(PricingError::Overflow { leg })
}

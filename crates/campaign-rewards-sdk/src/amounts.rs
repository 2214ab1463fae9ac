/*!
# Token Amount Math

Exact decimal helpers for reward aggregation.

## Base-Unit Scaling

The trading reward contract takes amounts as 256-bit integers in the token's
smallest unit. Human amounts are first rounded to [`CLAIM_FRACTION_DIGITS`] and
then scaled by `10^TOKEN_DECIMALS`. Scaling appends zeros to the decimal
mantissa instead of multiplying, so it can neither overflow nor pick up float
artifacts:

```rust
use campaign_rewards_sdk::amounts::to_base_units;
use rust_decimal::Decimal;
use std::str::FromStr;

let fee = Decimal::from_str("1.23456789").unwrap();
assert_eq!(to_base_units(fee, 8, 18).unwrap(), "1234567890000000000");
```

Sums of base-unit amounts use [`U256`] so any pair of contract values adds
exactly.
*/

use alloy_primitives::U256;
use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

/// Fractional digits kept before scaling a fee into base units
pub const CLAIM_FRACTION_DIGITS: u32 = 8;

/// Decimals of the reward token
pub const TOKEN_DECIMALS: u32 = 18;

const MAX_DECIMAL_SCALE: u32 = 28;

#[derive(Debug, Error)]
pub enum AmountError {
    #[error("Negative amount: {0}")]
    Negative(Decimal),

    #[error("Cannot keep {fraction_digits} fractional digits for a {decimals}-decimal token")]
    UnsupportedPrecision { fraction_digits: u32, decimals: u32 },

    #[error("Invalid base-unit amount: {0:?}")]
    InvalidBaseUnits(String),

    #[error("Calculation overflow: {0}")]
    Overflow(String),
}

pub type AmountResult<T> = Result<T, AmountError>;

/// Exact sum of decimal amounts; zero for no input
pub fn sum_decimals<I>(values: I) -> AmountResult<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    values.into_iter().try_fold(Decimal::ZERO, |total, value| {
        total
            .checked_add(value)
            .ok_or_else(|| AmountError::Overflow(format!("{} + {}", total, value)))
    })
}

/// Round `amount` to `fraction_digits` and render it in base units of a
/// `decimals`-decimal token as a base-10 integer string
///
/// Rounding is half away from zero.
pub fn to_base_units(amount: Decimal, fraction_digits: u32, decimals: u32) -> AmountResult<String> {
    if fraction_digits > decimals || fraction_digits > MAX_DECIMAL_SCALE {
        return Err(AmountError::UnsupportedPrecision {
            fraction_digits,
            decimals,
        });
    }

    if amount < Decimal::ZERO {
        return Err(AmountError::Negative(amount));
    }

    let rounded =
        amount.round_dp_with_strategy(fraction_digits, RoundingStrategy::MidpointAwayFromZero);
    let mantissa = rounded.mantissa();
    if mantissa == 0 {
        return Ok("0".to_string());
    }

    // rounded.scale() <= fraction_digits <= decimals
    let padding = (decimals - rounded.scale()) as usize;
    Ok(format!("{}{}", mantissa, "0".repeat(padding)))
}

/// Exact sum of base-10 integer strings as 256-bit values; `"0"` for no input
pub fn sum_base_units<'a, I>(values: I) -> AmountResult<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let total = values
        .into_iter()
        .map(parse_base_units)
        .try_fold(U256::ZERO, |total, value| {
            let value = value?;
            total
                .checked_add(value)
                .ok_or_else(|| AmountError::Overflow(format!("{} + {}", total, value)))
        })?;

    Ok(total.to_string())
}

fn parse_base_units(value: &str) -> AmountResult<U256> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AmountError::InvalidBaseUnits(value.to_string()));
    }

    U256::from_str_radix(value, 10)
        .map_err(|e| AmountError::Overflow(format!("{} does not fit in 256 bits: {}", value, e)))
}

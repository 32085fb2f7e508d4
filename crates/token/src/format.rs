//! Fixed-point balance formatting.

use alloy_primitives::{
    utils::{format_units, UnitsError},
    U256,
};

/// Render a raw on-chain balance as a decimal number of whole tokens.
///
/// The decimal point is shifted left by `decimals` places. Trailing zeros of
/// the fraction are dropped, keeping at least one digit, so `10^18` with 18
/// decimals renders as `1.0`.
pub fn format_balance(raw: U256, decimals: u8) -> Result<String, UnitsError> {
    let formatted = format_units(raw, decimals)?;
    Ok(trim_fraction(&formatted))
}

fn trim_fraction(formatted: &str) -> String {
    match formatted.split_once('.') {
        Some((integer, fraction)) => {
            let fraction = fraction.trim_end_matches('0');
            if fraction.is_empty() {
                format!("{integer}.0")
            } else {
                format!("{integer}.{fraction}")
            }
        }
        None => format!("{formatted}.0"),
    }
}

// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2025 Omniperp Developers. All rights reserved.
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! Per-symbol precision rules and the formatting helpers built on them.
//!
//! Venues reject orders whose quantity or price carries more precision than
//! the contract allows, and some (Hyperliquid) bound price precision by
//! significant figures rather than decimal places. Formatting a strictly
//! positive quantity must never silently produce `"0"`; that case surfaces as
//! [`TradeError::QuantityRoundsToZero`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    error::{TradeError, TradeResult},
    symbol::Symbol,
};

/// How a venue bounds order prices for a contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceRule {
    /// Fixed number of decimal places.
    DecimalPlaces(u32),
    /// Fixed number of significant figures, regardless of decimal position.
    SignificantFigures(u32),
}

/// How a venue bounds order quantities for a contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuantityRule {
    /// Fixed number of decimal places.
    DecimalPlaces(u32),
    /// `LOT_SIZE`-style step the quantity must be a multiple of.
    StepSize(Decimal),
}

/// Immutable per-contract metadata cached for the session.
///
/// Refreshable on demand when an asset-id lookup returns the stale-metadata
/// sentinel (Hyperliquid sub-dex).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractMeta {
    pub symbol: Symbol,
    pub quantity_rule: QuantityRule,
    pub price_rule: PriceRule,
    /// Gate-style contract multiplier: one contract is this many base units.
    pub quantum_multiplier: Option<Decimal>,
    pub max_leverage: Option<u32>,
}

/// Rounds a quantity *down* to the rule and renders it for the wire.
///
/// # Errors
///
/// Returns [`TradeError::QuantityRoundsToZero`] when a strictly positive
/// input renders as zero; callers must surface this instead of submitting.
pub fn format_quantity(symbol: &Symbol, quantity: Decimal, rule: &QuantityRule) -> TradeResult<String> {
    let rounded = match rule {
        QuantityRule::DecimalPlaces(places) => quantity.trunc_with_scale(*places),
        QuantityRule::StepSize(step) => {
            if step.is_zero() {
                quantity
            } else {
                quantity - (quantity % step)
            }
        }
    };
    if rounded.is_zero() && quantity > Decimal::ZERO {
        let step = match rule {
            QuantityRule::DecimalPlaces(places) => format!("1e-{places}"),
            QuantityRule::StepSize(step) => step.to_string(),
        };
        return Err(TradeError::QuantityRoundsToZero {
            symbol: symbol.to_string(),
            quantity,
            step,
        });
    }
    Ok(rounded.normalize().to_string())
}

/// Rounds a price to `figs` significant figures.
///
/// Scales the value until the leading digit is in `[1, 10)`, rounds to
/// `figs - 1` fractional digits, then descales. Hyperliquid rejects prices
/// carrying more than five significant figures with a hard error.
#[must_use]
pub fn round_to_sig_figs(value: f64, figs: u32) -> f64 {
    if value == 0.0 || !value.is_finite() {
        return value;
    }
    let sign = if value < 0.0 { -1.0 } else { 1.0 };
    let mut mantissa = value.abs();
    let mut scale = 1.0_f64;
    while mantissa >= 10.0 {
        mantissa /= 10.0;
        scale *= 10.0;
    }
    while mantissa < 1.0 {
        mantissa *= 10.0;
        scale /= 10.0;
    }
    let precision = 10_f64.powi(figs as i32 - 1);
    let rounded = (mantissa * precision).round() / precision;
    sign * rounded * scale
}

/// Renders a value in Hyperliquid wire format: base-10 with up to 8 decimals,
/// trailing zeros and an orphan decimal point stripped, `-0` coerced to `0`.
#[must_use]
pub fn format_wire_decimal(value: f64) -> String {
    let mut out = format!("{value:.8}");
    while out.ends_with('0') {
        out.pop();
    }
    if out.ends_with('.') {
        out.pop();
    }
    if out == "-0" { "0".to_string() } else { out }
}

/// Counts the significant decimal digits of a rendered number (test support
/// for the sig-fig invariant).
#[must_use]
pub fn count_sig_figs(rendered: &str) -> u32 {
    let digits: String = rendered.chars().filter(char::is_ascii_digit).collect();
    let trimmed = digits.trim_start_matches('0');
    // Trailing zeros before the decimal point still count as significant here;
    // that over-counts e.g. "35000" but keeps the check conservative.
    trimmed.trim_end_matches('0').len().max(1) as u32
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use rust_decimal_macros::dec;

    use super::*;

    fn symbol() -> Symbol {
        Symbol::new("BTCUSDT").unwrap()
    }

    #[rstest]
    #[case(dec!(0.123456), QuantityRule::DecimalPlaces(3), "0.123")]
    #[case(dec!(1.0), QuantityRule::DecimalPlaces(3), "1")]
    #[case(dec!(0.1279), QuantityRule::StepSize(dec!(0.001)), "0.127")]
    #[case(dec!(25), QuantityRule::StepSize(dec!(10)), "20")]
    fn format_quantity_rounds_down(
        #[case] quantity: Decimal,
        #[case] rule: QuantityRule,
        #[case] expected: &str,
    ) {
        assert_eq!(format_quantity(&symbol(), quantity, &rule).unwrap(), expected);
    }

    #[rstest]
    fn format_quantity_never_silently_zero() {
        let err = format_quantity(
            &symbol(),
            dec!(0.0004),
            &QuantityRule::DecimalPlaces(3),
        )
        .unwrap_err();
        assert!(matches!(err, TradeError::QuantityRoundsToZero { .. }));

        let err = format_quantity(&symbol(), dec!(0.4), &QuantityRule::StepSize(dec!(1))).unwrap_err();
        assert!(matches!(err, TradeError::QuantityRoundsToZero { .. }));
    }

    #[rstest]
    fn format_quantity_zero_input_is_not_an_error() {
        assert_eq!(
            format_quantity(&symbol(), dec!(0), &QuantityRule::DecimalPlaces(3)).unwrap(),
            "0"
        );
    }

    #[rstest]
    #[case(123456.789, 123460.0)]
    #[case(3501.7, 3501.7)]
    #[case(0.000123456, 0.00012346)]
    #[case(9.999951, 10.0)]
    #[case(-123456.789, -123460.0)]
    fn sig_fig_rounding_cases(#[case] input: f64, #[case] expected: f64) {
        let rounded = round_to_sig_figs(input, 5);
        assert!(
            (rounded - expected).abs() <= expected.abs() * 1e-12,
            "{input} -> {rounded}, expected {expected}"
        );
    }

    #[rstest]
    fn sig_fig_output_has_at_most_five_digits() {
        for input in [0.000_123_456_7, 1.234_567, 98_765.432_1, 3_456_789.0] {
            let rendered = format_wire_decimal(round_to_sig_figs(input, 5));
            assert!(
                count_sig_figs(&rendered) <= 5,
                "{input} rendered as {rendered}"
            );
        }
    }

    #[rstest]
    #[case(100.0, "100")]
    #[case(100.1, "100.1")]
    #[case(0.000000012, "0.00000001")]
    #[case(-0.000000001, "0")]
    #[case(3550.25, "3550.25")]
    fn wire_decimal_cases(#[case] input: f64, #[case] expected: &str) {
        assert_eq!(format_wire_decimal(input), expected);
    }
}

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

//! Helpers for the string-typed numerics Bybit returns everywhere.

use omniperp_core::error::{TradeError, TradeResult};
use rust_decimal::{Decimal, RoundingStrategy};

/// Parses a decimal field, mapping failures into the JSON error kind.
pub fn parse_decimal(field: &str, value: &str) -> TradeResult<Decimal> {
    value.parse::<Decimal>().map_err(|e| TradeError::Json {
        message: format!("invalid decimal in '{field}': '{value}' ({e})"),
    })
}

/// Parses a decimal field that may be empty, treating empty as zero.
pub fn parse_decimal_or_zero(field: &str, value: &str) -> TradeResult<Decimal> {
    if value.is_empty() {
        return Ok(Decimal::ZERO);
    }
    parse_decimal(field, value)
}

/// Parses an optional decimal, treating empty strings as `None`.
pub fn parse_decimal_opt(field: &str, value: &str) -> TradeResult<Option<Decimal>> {
    if value.is_empty() || value == "0" {
        return Ok(None);
    }
    parse_decimal(field, value).map(Some)
}

/// Parses an integer field.
pub fn parse_i64(field: &str, value: &str) -> TradeResult<i64> {
    value.parse::<i64>().map_err(|e| TradeError::Json {
        message: format!("invalid integer in '{field}': '{value}' ({e})"),
    })
}

/// Parses a leverage field that venues render as a decimal string ("10").
pub fn parse_leverage(value: &str) -> u32 {
    value
        .parse::<Decimal>()
        .ok()
        .map(|d| d.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|d| u32::try_from(d.mantissa().unsigned_abs()).ok())
        .unwrap_or(1)
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use rust_decimal_macros::dec;

    use super::*;

    #[rstest]
    fn decimal_parsing() {
        assert_eq!(parse_decimal("px", "3500.25").unwrap(), dec!(3500.25));
        assert!(parse_decimal("px", "abc").is_err());
        assert_eq!(parse_decimal_or_zero("fee", "").unwrap(), dec!(0));
        assert_eq!(parse_decimal_opt("liq", "").unwrap(), None);
        assert_eq!(parse_decimal_opt("liq", "0").unwrap(), None);
        assert_eq!(parse_decimal_opt("liq", "123.4").unwrap(), Some(dec!(123.4)));
    }

    #[rstest]
    #[case("10", 10)]
    #[case("12.5", 13)]
    #[case("", 1)]
    fn leverage_parsing(#[case] input: &str, #[case] expected: u32) {
        assert_eq!(parse_leverage(input), expected);
    }
}

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

//! Hyperliquid coin mapping.
//!
//! Main-dex perps are keyed by bare coin (`BTC` for canonical `BTCUSDT`);
//! sub-dex assets are keyed `dex:symbol` (`xyz:TSLA` for canonical `TSLA`,
//! which carries no quote leg).

use omniperp_core::{
    error::{TradeError, TradeResult},
    symbol::Symbol,
};

/// Renders a canonical symbol as a venue coin key.
///
/// Returns the coin and whether it lives on the configured sub-dex.
///
/// # Errors
///
/// Returns [`TradeError::SymbolUnknown`] for quote-less symbols when no
/// sub-dex is configured.
pub fn to_coin(symbol: &Symbol, sub_dex: Option<&str>) -> TradeResult<(String, bool)> {
    if let Some((base, _quote)) = symbol.split_quote() {
        return Ok((base.to_string(), false));
    }
    match sub_dex {
        Some(dex) => Ok((format!("{dex}:{symbol}"), true)),
        None => Err(TradeError::SymbolUnknown {
            symbol: symbol.to_string(),
        }),
    }
}

/// Parses a venue coin key into a canonical symbol.
///
/// # Errors
///
/// Returns [`TradeError::SymbolUnknown`] when the coin cannot form a valid
/// canonical symbol.
pub fn from_coin(coin: &str) -> TradeResult<Symbol> {
    let canonical = match coin.split_once(':') {
        Some((_dex, name)) => name.to_string(),
        None => format!("{coin}USDT"),
    };
    Symbol::new(&canonical).map_err(|_| TradeError::SymbolUnknown {
        symbol: coin.to_string(),
    })
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn main_dex_round_trip() {
        let symbol = Symbol::new("BTCUSDT").unwrap();
        let (coin, is_sub) = to_coin(&symbol, Some("xyz")).unwrap();
        assert_eq!(coin, "BTC");
        assert!(!is_sub);
        assert_eq!(from_coin(&coin).unwrap(), symbol);
    }

    #[rstest]
    fn sub_dex_round_trip() {
        let symbol = Symbol::new("TSLA").unwrap();
        let (coin, is_sub) = to_coin(&symbol, Some("xyz")).unwrap();
        assert_eq!(coin, "xyz:TSLA");
        assert!(is_sub);
        assert_eq!(from_coin(&coin).unwrap(), symbol);
    }

    #[rstest]
    fn quote_less_symbol_requires_sub_dex() {
        let symbol = Symbol::new("TSLA").unwrap();
        assert!(matches!(
            to_coin(&symbol, None),
            Err(TradeError::SymbolUnknown { .. })
        ));
    }
}

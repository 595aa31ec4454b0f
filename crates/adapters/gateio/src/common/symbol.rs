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

//! Gate.io contract-name mapping (`BTC_USDT` ⇄ canonical `BTCUSDT`).

use omniperp_core::{
    error::{TradeError, TradeResult},
    symbol::Symbol,
};

/// Renders a canonical symbol as a Gate contract name.
///
/// # Errors
///
/// Returns [`TradeError::SymbolUnknown`] when the canonical symbol carries no
/// recognised quote suffix to split on.
pub fn to_contract(symbol: &Symbol) -> TradeResult<String> {
    let (base, quote) = symbol.split_quote().ok_or_else(|| TradeError::SymbolUnknown {
        symbol: symbol.to_string(),
    })?;
    Ok(format!("{base}_{quote}"))
}

/// Parses a Gate contract name into a canonical symbol.
///
/// # Errors
///
/// Returns [`TradeError::SymbolUnknown`] when the contract name does not
/// produce a valid canonical symbol.
pub fn from_contract(contract: &str) -> TradeResult<Symbol> {
    Symbol::new(contract.replace('_', "")).map_err(|_| TradeError::SymbolUnknown {
        symbol: contract.to_string(),
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
    #[case("BTCUSDT", "BTC_USDT")]
    #[case("ETHUSDC", "ETH_USDC")]
    #[case("1000PEPEUSDT", "1000PEPE_USDT")]
    fn contract_round_trip(#[case] canonical: &str, #[case] native: &str) {
        let symbol = Symbol::new(canonical).unwrap();
        assert_eq!(to_contract(&symbol).unwrap(), native);
        assert_eq!(from_contract(native).unwrap(), symbol);
    }

    #[rstest]
    fn unknown_quote_is_an_error() {
        let symbol = Symbol::new("TSLA").unwrap();
        assert!(matches!(
            to_contract(&symbol),
            Err(TradeError::SymbolUnknown { .. })
        ));
    }
}

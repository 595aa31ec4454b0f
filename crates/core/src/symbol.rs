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

//! The canonical symbol type shared by every venue adapter.
//!
//! Canonical form is upper-case concatenated base+quote (`BTCUSDT`). Each
//! adapter owns the bidirectional mapping to its native form (Gate `BTC_USDT`,
//! Hyperliquid `BTC`, sub-dex `xyz:TSLA`); the invariant every mapping must
//! uphold is `normalize(denormalize(s)) == s`.

use std::{
    borrow::Cow,
    fmt::{Display, Formatter},
};

use serde::{Deserialize, Serialize};
use ustr::Ustr;

/// Quote assets recognised when splitting a canonical symbol into legs.
pub const KNOWN_QUOTES: &[&str] = &["USDT", "USDC", "USD", "BUSD", "BTC", "ETH"];

/// A canonical, venue-neutral instrument symbol.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(Ustr);

impl Symbol {
    /// Creates a new [`Symbol`], upper-casing the input.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is empty or contains characters outside
    /// `[A-Za-z0-9]` (canonical symbols carry no separators).
    pub fn new<S: AsRef<str>>(value: S) -> anyhow::Result<Self> {
        let value_ref = value.as_ref();
        anyhow::ensure!(!value_ref.is_empty(), "symbol must not be empty");
        anyhow::ensure!(
            value_ref.bytes().all(|b| b.is_ascii_alphanumeric()),
            "invalid canonical symbol '{value_ref}': expected [A-Za-z0-9] only"
        );
        let needs_upper = value_ref.bytes().any(|b| b.is_ascii_lowercase());
        let normalized: Cow<'_, str> = if needs_upper {
            Cow::Owned(value_ref.to_ascii_uppercase())
        } else {
            Cow::Borrowed(value_ref)
        };
        Ok(Self(Ustr::from(normalized.as_ref())))
    }

    /// Returns the symbol as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the interned value.
    #[must_use]
    pub fn as_ustr(&self) -> Ustr {
        self.0
    }

    /// Splits the symbol into `(base, quote)` using the known quote suffixes.
    ///
    /// Returns `None` when no known quote suffix matches (sub-dex equity
    /// symbols such as `TSLA` have no quote leg).
    #[must_use]
    pub fn split_quote(&self) -> Option<(&str, &str)> {
        let s = self.as_str();
        KNOWN_QUOTES.iter().find_map(|quote| {
            s.strip_suffix(quote)
                .filter(|base| !base.is_empty())
                .map(|base| (base, *quote))
        })
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<&str> for Symbol {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> anyhow::Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<String> for Symbol {
    type Error = anyhow::Error;

    fn try_from(value: String) -> anyhow::Result<Self> {
        Self::new(value)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn new_uppercases() {
        let symbol = Symbol::new("btcusdt").unwrap();
        assert_eq!(symbol.as_str(), "BTCUSDT");
    }

    #[rstest]
    fn new_rejects_separators() {
        assert!(Symbol::new("BTC_USDT").is_err());
        assert!(Symbol::new("BTC-USDT").is_err());
        assert!(Symbol::new("").is_err());
    }

    #[rstest]
    #[case("BTCUSDT", Some(("BTC", "USDT")))]
    #[case("ETHUSDC", Some(("ETH", "USDC")))]
    #[case("TSLA", None)]
    fn split_quote_cases(#[case] input: &str, #[case] expected: Option<(&str, &str)>) {
        let symbol = Symbol::new(input).unwrap();
        assert_eq!(symbol.split_quote(), expected);
    }

    #[rstest]
    fn serde_is_transparent() {
        let symbol = Symbol::new("BTCUSDT").unwrap();
        let json = serde_json::to_string(&symbol).unwrap();
        assert_eq!(json, "\"BTCUSDT\"");
        let back: Symbol = serde_json::from_str(&json).unwrap();
        assert_eq!(back, symbol);
    }
}

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

//! Configuration for the Hyperliquid adapter.

/// Configuration for [`crate::trader::HyperliquidTrader`].
#[derive(Clone, Debug)]
pub struct HyperliquidConfig {
    /// Signing key; routinely an agent key approved for the main wallet.
    pub private_key: String,
    /// The fund-holding account whose state is queried and traded.
    pub main_wallet: String,
    /// HIP-3 sub-dex name for quote-less symbols (e.g. `"xyz"`).
    pub sub_dex: Option<String>,
    /// Base URL override; testnet is detected from the URL.
    pub base_url: Option<String>,
}

impl HyperliquidConfig {
    /// Creates a mainnet config without a sub-dex.
    #[must_use]
    pub fn new(private_key: impl Into<String>, main_wallet: impl Into<String>) -> Self {
        Self {
            private_key: private_key.into(),
            main_wallet: main_wallet.into(),
            sub_dex: None,
            base_url: None,
        }
    }

    /// Enables a HIP-3 sub-dex for quote-less (equity/commodity) symbols.
    #[must_use]
    pub fn with_sub_dex(mut self, dex: impl Into<String>) -> Self {
        self.sub_dex = Some(dex.into());
        self
    }
}

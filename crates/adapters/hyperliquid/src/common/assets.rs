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

//! Asset-index resolution for the main dex and HIP-3 sub-dexes.
//!
//! The base name-to-asset table only covers the main dex. Sub-dex assets
//! live in their own index space:
//! `100000 + perp_dex_index * 10000 + meta_index`, with `meta_index` taken
//! from the dex-scoped meta query. An order constructed with the base table
//! would sign asset 0 and the venue would reject it.
//!
//! The registry is refreshed lazily under a write lock with a double-checked
//! re-read, so concurrent misses fetch at most twice and the second write is
//! harmless.

use std::collections::HashMap;

use omniperp_core::error::{TradeError, TradeResult};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::{
    common::consts::{
        DEFAULT_SUB_DEX_SZ_DECIMALS, DEFAULT_SZ_DECIMALS, SUB_DEX_ASSET_BASE, SUB_DEX_ASSET_STRIDE,
    },
    http::client::HlHttpClient,
};

/// Resolved asset facts used to build and sign orders.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AssetInfo {
    pub index: u32,
    pub sz_decimals: u32,
    pub max_leverage: Option<u32>,
}

/// Computes a sub-dex asset index from its components.
#[must_use]
pub fn sub_dex_asset_index(perp_dex_index: u32, meta_index: u32) -> u32 {
    SUB_DEX_ASSET_BASE + perp_dex_index * SUB_DEX_ASSET_STRIDE + meta_index
}

/// Lazily populated coin → asset table covering base and sub-dex assets.
#[derive(Debug, Default)]
pub struct AssetRegistry {
    assets: RwLock<HashMap<String, AssetInfo>>,
}

impl AssetRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves a coin key (`BTC` or `xyz:TSLA`) to its asset facts,
    /// refreshing the relevant dex table on a miss or on the stale sentinel
    /// (index 0 for a sub-dex key).
    pub async fn resolve(
        &self,
        client: &HlHttpClient,
        coin: &str,
        dex: Option<&str>,
    ) -> TradeResult<AssetInfo> {
        if let Some(info) = self.assets.read().await.get(coin)
            && !(dex.is_some() && info.index == 0)
        {
            return Ok(*info);
        }

        let mut guard = self.assets.write().await;
        // Another task may have refreshed while we waited for the lock.
        if let Some(info) = guard.get(coin)
            && !(dex.is_some() && info.index == 0)
        {
            return Ok(*info);
        }

        match dex {
            None => {
                let meta = client.meta(None).await?;
                debug!(assets = meta.universe.len(), "refreshed base dex asset table");
                for (i, asset) in meta.universe.iter().enumerate() {
                    guard.insert(
                        asset.name.clone(),
                        AssetInfo {
                            index: i as u32,
                            sz_decimals: asset.sz_decimals,
                            max_leverage: asset.max_leverage,
                        },
                    );
                }
            }
            Some(dex) => {
                let dex_index = client.perp_dex_index(dex).await?;
                let meta = client.meta(Some(dex)).await?;
                debug!(dex, dex_index, assets = meta.universe.len(), "refreshed sub-dex asset table");
                for (i, asset) in meta.universe.iter().enumerate() {
                    let key = if asset.name.contains(':') {
                        asset.name.clone()
                    } else {
                        format!("{dex}:{}", asset.name)
                    };
                    guard.insert(
                        key,
                        AssetInfo {
                            index: sub_dex_asset_index(dex_index, i as u32),
                            sz_decimals: asset.sz_decimals,
                            max_leverage: asset.max_leverage,
                        },
                    );
                }
            }
        }

        guard.get(coin).copied().ok_or_else(|| {
            warn!(coin, "asset missing after metadata refresh");
            TradeError::SymbolUnknown {
                symbol: coin.to_string(),
            }
        })
    }

    /// Fallback size precision when metadata is unavailable.
    #[must_use]
    pub fn fallback_sz_decimals(is_sub_dex: bool) -> u32 {
        if is_sub_dex {
            DEFAULT_SUB_DEX_SZ_DECIMALS
        } else {
            DEFAULT_SZ_DECIMALS
        }
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
    #[case(1, 0, 110_000)]
    #[case(1, 7, 110_007)]
    #[case(3, 12, 130_012)]
    fn sub_dex_index_formula(#[case] dex: u32, #[case] meta: u32, #[case] expected: u32) {
        assert_eq!(sub_dex_asset_index(dex, meta), expected);
    }

    #[rstest]
    fn fallback_decimals_by_dex() {
        assert_eq!(AssetRegistry::fallback_sz_decimals(false), 4);
        assert_eq!(AssetRegistry::fallback_sz_decimals(true), 2);
    }
}

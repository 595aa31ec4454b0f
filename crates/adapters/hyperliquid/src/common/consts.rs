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

use std::time::Duration;

use rust_decimal::Decimal;

pub const HYPERLIQUID_MAINNET_URL: &str = "https://api.hyperliquid.xyz";
pub const HYPERLIQUID_TESTNET_URL: &str = "https://api.hyperliquid-testnet.xyz";

/// Direct calls to the venue carry this per-request timeout.
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Balance/position cache TTL for this venue.
pub const CACHE_TTL: Duration = Duration::from_secs(5);

/// Phantom-agent source for mainnet L1 actions.
pub const AGENT_SOURCE_MAINNET: &str = "a";
/// Phantom-agent source for testnet L1 actions.
pub const AGENT_SOURCE_TESTNET: &str = "b";

/// Prices carry at most this many significant figures.
pub const PRICE_SIG_FIGS: u32 = 5;

/// Fallback size precision (decimal places) when asset metadata is missing.
pub const DEFAULT_SZ_DECIMALS: u32 = 4;
/// Fallback size precision for sub-dex assets.
pub const DEFAULT_SUB_DEX_SZ_DECIMALS: u32 = 2;

/// Sub-dex asset indices live at
/// `100000 + perp_dex_index * 10000 + meta_index`.
pub const SUB_DEX_ASSET_BASE: u32 = 100_000;
pub const SUB_DEX_ASSET_STRIDE: u32 = 10_000;

/// Agent wallets holding more than this many USDC abort startup.
pub const AGENT_WALLET_LIMIT_USDC: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// Market orders are aggressive IOC limits offset by this fraction.
pub const MARKET_SLIPPAGE: f64 = 0.05;

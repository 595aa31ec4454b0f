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

pub const BINANCE_FUTURES_URL: &str = "https://fapi.binance.com";

pub const DEFAULT_RECV_WINDOW_MS: u64 = 5_000;
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Balance/position cache TTL for this venue.
pub const CACHE_TTL: Duration = Duration::from_secs(5);

/// Fallback quantity precision (decimal places) when exchange info is
/// unavailable.
pub const DEFAULT_QUANTITY_DECIMALS: u32 = 3;

/// The venue rate-limits leverage changes; a real change is followed by this
/// mandatory cooldown before further account mutations.
pub const LEVERAGE_CHANGE_COOLDOWN: Duration = Duration::from_secs(5);

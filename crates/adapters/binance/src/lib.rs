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

//! Binance USDT-M futures adapter for the Omniperp trading facade.
//!
//! Wraps the **Binance futures REST API** (`fapi`) behind the venue-neutral
//! [`omniperp_core::trader::Trader`] contract: HMAC-SHA256 query-string
//! signing, server-time offset handling, dual-side (hedge) mode enablement,
//! the leverage-change cooldown, and the algo-order migration for stop
//! orders (`-4120 STOP_ORDER_SWITCH_ALGO`).
//!
//! The official API reference can be found at
//! <https://developers.binance.com/docs/derivatives/usds-margined-futures/general-info>.

#![warn(rustc::all)]
#![deny(unsafe_code)]
#![deny(nonstandard_style)]
#![deny(missing_debug_implementations)]
#![deny(clippy::missing_panics_doc)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod common;
pub mod config;
pub mod http;
pub mod trader;

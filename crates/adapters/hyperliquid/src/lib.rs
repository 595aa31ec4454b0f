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

//! Hyperliquid adapter for the Omniperp trading facade.
//!
//! Speaks JSON-over-HTTPS directly to `/info` and `/exchange`: account state
//! queries, L1-action signing (MessagePack action hash, phantom-agent
//! EIP-712, secp256k1), and order/cancel/leverage actions. HIP-3 sub-dexes
//! ("xyz" tokenized equities and friends) are first-class: dex-scoped info
//! queries and the `100000 + perp_dex_index * 10000 + meta_index` asset-index
//! space the base SDK name table does not cover.
//!
//! Construction enforces the agent-wallet safety rule: an agent key whose
//! own account holds more than 100 USDC aborts startup.

#![warn(rustc::all)]
#![deny(unsafe_code)]
#![deny(nonstandard_style)]
#![deny(missing_debug_implementations)]
#![deny(clippy::missing_panics_doc)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod common;
pub mod config;
pub mod http;
pub mod signing;
pub mod trader;

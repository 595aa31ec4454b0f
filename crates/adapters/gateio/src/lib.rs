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

//! Gate.io USDT-margined futures adapter for the Omniperp trading facade.
//!
//! Wraps the **Gate.io v4 futures API** behind the venue-neutral
//! [`omniperp_core::trader::Trader`] contract. The venue-specific rules that
//! differ sharply from the others live here: HMAC-SHA512 signing with a
//! SHA-512 body hash, integer *contract counts* converted through each
//! contract's `quanto_multiplier` (shorts are negative sizes), and
//! price-triggered orders with explicit trigger rules.
//!
//! The official API reference can be found at
//! <https://www.gate.io/docs/developers/apiv4/>.

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

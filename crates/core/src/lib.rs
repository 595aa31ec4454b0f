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

//! Core kernel for the Omniperp multi-venue derivatives trading adapter.
//!
//! The `omniperp-core` crate defines everything the venue adapters and the
//! fill-sync engine share: the canonical data model (balances, positions,
//! orders, fills), the venue-neutral [`trader::Trader`] capability trait, the
//! unified error taxonomy, precision and wire-formatting rules, short-TTL
//! caches, client-order-id generation, and the persistence contract through
//! which fills reach the relational store.
//!
//! Venue adapters depend on this crate only; they never depend on each other.

#![warn(rustc::all)]
#![deny(unsafe_code)]
#![deny(nonstandard_style)]
#![deny(missing_debug_implementations)]
#![deny(clippy::missing_panics_doc)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod cache;
pub mod error;
pub mod ids;
pub mod models;
pub mod precision;
pub mod store;
pub mod symbol;
pub mod time;
pub mod trader;

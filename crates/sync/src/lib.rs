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

//! Incremental trade-sync engine for the Omniperp adapter.
//!
//! One engine instance serves one (trader, exchange) pair: it discovers which
//! symbols saw venue-side activity since the last checkpoint, fetches new
//! fills, writes idempotent order/fill rows through the store contract, and
//! replays the fills into the position builder in strict time order. The
//! checkpoint only advances when every symbol query in a cycle succeeded, so
//! transient failures are retried on the next cycle instead of losing data.

#![warn(rustc::all)]
#![deny(unsafe_code)]
#![deny(nonstandard_style)]
#![deny(missing_debug_implementations)]
#![deny(clippy::missing_panics_doc)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod checkpoint;
pub mod engine;
pub mod infer;
pub mod testing;

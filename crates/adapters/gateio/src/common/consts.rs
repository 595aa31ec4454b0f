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

pub const GATE_HTTP_URL: &str = "https://api.gateio.ws";

/// All signed paths are rooted here; the signature covers the full path.
pub const GATE_API_PREFIX: &str = "/api/v4";

/// USDT-settled futures path segment.
pub const GATE_FUTURES_PATH: &str = "/futures/usdt";

pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Balance/position cache TTL for this venue.
pub const CACHE_TTL: Duration = Duration::from_secs(15);

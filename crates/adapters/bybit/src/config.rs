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

//! Configuration for the Bybit adapter.

use crate::common::consts::{BYBIT_HTTP_URL, DEFAULT_RECV_WINDOW_MS};

/// Configuration for [`crate::trader::BybitTrader`].
#[derive(Clone, Debug)]
pub struct BybitConfig {
    pub api_key: String,
    pub api_secret: String,
    /// Base URL override, e.g. for the testnet or a mock server.
    pub base_url: Option<String>,
    pub recv_window_ms: u64,
    /// 8-character broker attribution tag embedded in client order ids.
    pub broker_tag: String,
}

impl BybitConfig {
    /// Creates a config with default URL and receive window.
    #[must_use]
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            base_url: None,
            recv_window_ms: DEFAULT_RECV_WINDOW_MS,
            broker_tag: "omniperp".to_string(),
        }
    }

    /// Returns the effective base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(BYBIT_HTTP_URL)
    }
}

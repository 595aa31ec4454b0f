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

//! HTTP client for `/info` queries and signed `/exchange` actions.

use alloy_signer_local::PrivateKeySigner;
use omniperp_core::error::{TradeError, TradeResult};
use reqwest::Client as ReqwestClient;
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::{
    common::consts::{
        AGENT_SOURCE_MAINNET, AGENT_SOURCE_TESTNET, HTTP_TIMEOUT, HYPERLIQUID_MAINNET_URL,
    },
    http::{
        models::{
            HlAllMids, HlClearinghouseState, HlExchangeResponse, HlFill, HlMeta, HlOpenOrder,
            HlOrderStatusResponse, HlPerpDex,
        },
        query::InfoRequest,
    },
    signing::{NonceSource, action_hash, sign_l1_action},
};

/// Hyperliquid HTTP client; signing is only required for `/exchange`.
pub struct HlHttpClient {
    base_url: String,
    http: ReqwestClient,
    signer: PrivateKeySigner,
    nonces: NonceSource,
    is_mainnet: bool,
}

impl std::fmt::Debug for HlHttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HlHttpClient")
            .field("base_url", &self.base_url)
            .field("is_mainnet", &self.is_mainnet)
            .finish()
    }
}

impl HlHttpClient {
    /// Creates a client for the given endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`TradeError::Config`] when the HTTP client cannot be built.
    pub fn new(signer: PrivateKeySigner, base_url: Option<String>) -> TradeResult<Self> {
        let base_url = base_url.unwrap_or_else(|| HYPERLIQUID_MAINNET_URL.to_string());
        let is_mainnet = !base_url.contains("testnet");
        let http = ReqwestClient::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| TradeError::config(e.to_string()))?;
        Ok(Self {
            base_url,
            http,
            signer,
            nonces: NonceSource::new(),
            is_mainnet,
        })
    }

    /// The signer's (agent) address.
    #[must_use]
    pub fn signer_address(&self) -> String {
        format!("{:#x}", self.signer.address())
    }

    // ---------------------------------------------------------------------------------------
    // Info queries
    // ---------------------------------------------------------------------------------------

    /// Returns the (optionally dex-scoped) precision table.
    pub async fn meta(&self, dex: Option<&str>) -> TradeResult<HlMeta> {
        self.post_info(&InfoRequest::meta(dex)).await
    }

    /// Returns the HIP-3 dex directory; position in the list is the
    /// `perp_dex_index`.
    pub async fn perp_dexs(&self) -> TradeResult<Vec<Option<HlPerpDex>>> {
        self.post_info(&InfoRequest::perp_dexs()).await
    }

    /// Looks up a named sub-dex's index in the directory.
    pub async fn perp_dex_index(&self, dex: &str) -> TradeResult<u32> {
        let dexs = self.perp_dexs().await?;
        dexs.iter()
            .position(|entry| entry.as_ref().is_some_and(|d| d.name == dex))
            .map(|i| i as u32)
            .ok_or_else(|| TradeError::config(format!("unknown perp dex '{dex}'")))
    }

    /// Returns account state for a user, optionally scoped to a sub-dex.
    pub async fn clearinghouse_state(
        &self,
        user: &str,
        dex: Option<&str>,
    ) -> TradeResult<HlClearinghouseState> {
        self.post_info(&InfoRequest::clearinghouse_state(user, dex)).await
    }

    /// Returns mid prices by coin.
    pub async fn all_mids(&self, dex: Option<&str>) -> TradeResult<HlAllMids> {
        self.post_info(&InfoRequest::all_mids(dex)).await
    }

    /// Returns fills since a timestamp.
    pub async fn user_fills_by_time(&self, user: &str, start_ms: i64) -> TradeResult<Vec<HlFill>> {
        self.post_info(&InfoRequest::user_fills_by_time(user, start_ms))
            .await
    }

    /// Returns open orders including trigger orders.
    pub async fn frontend_open_orders(
        &self,
        user: &str,
        dex: Option<&str>,
    ) -> TradeResult<Vec<HlOpenOrder>> {
        self.post_info(&InfoRequest::frontend_open_orders(user, dex))
            .await
    }

    /// Returns the status of one order.
    pub async fn order_status(&self, user: &str, oid: u64) -> TradeResult<HlOrderStatusResponse> {
        self.post_info(&InfoRequest::order_status(user, oid)).await
    }

    // ---------------------------------------------------------------------------------------
    // Exchange actions
    // ---------------------------------------------------------------------------------------

    /// Signs and submits an L1 action.
    ///
    /// The action is hashed with MessagePack plus the nonce and vault flag,
    /// the hash is signed as the phantom agent, and the request carries
    /// `{action, nonce, signature}`.
    pub async fn post_action<A: Serialize>(&self, action: &A) -> TradeResult<HlExchangeResponse> {
        let nonce = self.nonces.next();
        let connection_id = action_hash(action, nonce, None)?;
        let source = if self.is_mainnet {
            AGENT_SOURCE_MAINNET
        } else {
            AGENT_SOURCE_TESTNET
        };
        let signature = sign_l1_action(&self.signer, source, connection_id)?;
        let body = serde_json::json!({
            "action": serde_json::to_value(action)?,
            "nonce": nonce,
            "signature": signature,
        });
        let response: HlExchangeResponse = self.post_json("/exchange", &body).await?;
        if response.status != "ok" {
            return Err(TradeError::venue(
                0,
                format!(
                    "exchange action rejected: {}",
                    response
                        .response
                        .as_ref()
                        .map_or_else(String::new, ToString::to_string)
                ),
            ));
        }
        if let Some(error) = response.first_error() {
            return Err(TradeError::venue(0, error));
        }
        Ok(response)
    }

    // ---------------------------------------------------------------------------------------
    // Transport
    // ---------------------------------------------------------------------------------------

    async fn post_info<T: DeserializeOwned>(&self, request: &InfoRequest) -> TradeResult<T> {
        debug!(request_type = request.request_type, "posting /info query");
        self.post_json("/info", request).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> TradeResult<T> {
        let response = self
            .http
            .post(format!("{}{path}", self.base_url))
            .json(body)
            .send()
            .await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        if !status.is_success() {
            let excerpt = String::from_utf8_lossy(&bytes).into_owned();
            return Err(TradeError::from_http_status(status.as_u16(), Some(excerpt)));
        }
        serde_json::from_slice(&bytes).map_err(TradeError::from)
    }
}

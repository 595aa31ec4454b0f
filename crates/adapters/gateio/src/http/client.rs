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

//! Signed HTTP client for the Gate.io v4 futures REST API.
//!
//! Gate timestamps are whole seconds; the signature covers method, full
//! path, query, a SHA-512 body hash, and the timestamp.

use omniperp_core::{
    error::{TradeError, TradeResult},
    time::ServerClock,
};
use reqwest::{Client as ReqwestClient, Method};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::{
    common::{
        consts::{DEFAULT_HTTP_TIMEOUT, GATE_API_PREFIX, GATE_FUTURES_PATH, GATE_HTTP_URL},
        credential::Credential,
    },
    http::{
        error::{GateErrorBody, classify_label, is_idempotent_noop, is_order_gone},
        models::{
            GateAccount, GateContract, GateOrder, GateOrderId, GateOrderRequest, GatePosition,
            GatePositionClose, GatePriceOrder, GatePriceOrderRequest, GateTicker, GateTrade,
        },
    },
};

/// Signed Gate.io futures HTTP client.
#[derive(Debug)]
pub struct GateHttpClient {
    base_url: String,
    http: ReqwestClient,
    credential: Credential,
    clock: ServerClock,
}

impl GateHttpClient {
    /// Creates a client.
    ///
    /// # Errors
    ///
    /// Returns [`TradeError::Config`] when the HTTP client cannot be built.
    pub fn new(credential: Credential, base_url: Option<String>) -> TradeResult<Self> {
        let http = ReqwestClient::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| TradeError::config(e.to_string()))?;
        Ok(Self {
            base_url: base_url.unwrap_or_else(|| GATE_HTTP_URL.to_string()),
            http,
            credential,
            clock: ServerClock::new(),
        })
    }

    /// Samples the server-time endpoint and records the clock offset.
    pub async fn sync_server_time(&self) -> TradeResult<()> {
        #[derive(serde::Deserialize)]
        struct ServerTime {
            server_time: i64,
        }
        let time: ServerTime = self.send(Method::GET, "/spot/time", "", None).await?;
        // Spot time is milliseconds; the signature itself wants seconds.
        self.clock.sync(time.server_time);
        debug!(offset_ms = self.clock.offset_ms(), "gate server clock synced");
        Ok(())
    }

    // ---------------------------------------------------------------------------------------
    // Futures endpoints
    // ---------------------------------------------------------------------------------------

    /// Returns metadata for one contract.
    pub async fn contract(&self, contract: &str) -> TradeResult<GateContract> {
        let path = format!("{GATE_FUTURES_PATH}/contracts/{contract}");
        self.send(Method::GET, &path, "", None).await
    }

    /// Returns the USDT futures account.
    pub async fn account(&self) -> TradeResult<GateAccount> {
        self.send(Method::GET, &futures_path("/accounts"), "", None).await
    }

    /// Returns all open positions.
    pub async fn positions(&self) -> TradeResult<Vec<GatePosition>> {
        self.send(Method::GET, &futures_path("/positions"), "", None).await
    }

    /// Sets leverage on a position; `leverage` "0" plus a cross limit selects
    /// cross margin.
    pub async fn set_position_leverage(
        &self,
        contract: &str,
        leverage: &str,
        cross_leverage_limit: Option<&str>,
    ) -> TradeResult<GatePosition> {
        let path = format!("{GATE_FUTURES_PATH}/positions/{contract}/leverage");
        let query = match cross_leverage_limit {
            Some(limit) => format!("leverage={leverage}&cross_leverage_limit={limit}"),
            None => format!("leverage={leverage}"),
        };
        self.send(Method::POST, &path, &query, None).await
    }

    /// Places a futures order.
    pub async fn place_order(&self, request: &GateOrderRequest) -> TradeResult<GateOrder> {
        let body = serde_json::to_string(request)?;
        self.send(Method::POST, &futures_path("/orders"), "", Some(body)).await
    }

    /// Lists open orders for a contract.
    pub async fn open_orders(&self, contract: &str) -> TradeResult<Vec<GateOrder>> {
        let query = format!("contract={contract}&status=open");
        self.send(Method::GET, &futures_path("/orders"), &query, None).await
    }

    /// Queries one order.
    pub async fn order(&self, order_id: i64) -> TradeResult<GateOrder> {
        let path = format!("{GATE_FUTURES_PATH}/orders/{order_id}");
        self.send(Method::GET, &path, "", None).await
    }

    /// Cancels every open order for a contract, returning the cancelled set.
    pub async fn cancel_orders(&self, contract: &str) -> TradeResult<Vec<GateOrder>> {
        let query = format!("contract={contract}");
        self.send(Method::DELETE, &futures_path("/orders"), &query, None).await
    }

    /// Places a price-triggered order.
    pub async fn place_price_order(
        &self,
        request: &GatePriceOrderRequest,
    ) -> TradeResult<GateOrderId> {
        let body = serde_json::to_string(request)?;
        self.send(Method::POST, &futures_path("/price_orders"), "", Some(body))
            .await
    }

    /// Lists open price-triggered orders for a contract.
    pub async fn open_price_orders(&self, contract: &str) -> TradeResult<Vec<GatePriceOrder>> {
        let query = format!("status=open&contract={contract}");
        self.send(Method::GET, &futures_path("/price_orders"), &query, None)
            .await
    }

    /// Cancels one price-triggered order; "already gone" coerces to `false`.
    pub async fn cancel_price_order(&self, order_id: i64) -> TradeResult<bool> {
        let path = format!("{GATE_FUTURES_PATH}/price_orders/{order_id}");
        match self.send::<serde_json::Value>(Method::DELETE, &path, "", None).await {
            Ok(_) => Ok(true),
            Err(TradeError::Venue { message, .. })
                if message
                    .split(':')
                    .next()
                    .is_some_and(is_order_gone) =>
            {
                info!(order_id, "price order already gone, cancel coerced");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Returns account fills; `contract` of `None` spans all symbols.
    pub async fn my_trades(
        &self,
        contract: Option<&str>,
        since_s: Option<i64>,
        last_id: Option<i64>,
        limit: u32,
    ) -> TradeResult<Vec<GateTrade>> {
        let mut query = format!("limit={limit}");
        if let Some(contract) = contract {
            query.push_str(&format!("&contract={contract}"));
        }
        if let Some(since) = since_s {
            query.push_str(&format!("&from={since}"));
        }
        if let Some(last_id) = last_id {
            query.push_str(&format!("&last_id={last_id}"));
        }
        self.send(Method::GET, &futures_path("/my_trades"), &query, None).await
    }

    /// Returns position-close records since a timestamp (seconds).
    pub async fn position_closes(&self, since_s: i64) -> TradeResult<Vec<GatePositionClose>> {
        let query = format!("from={since_s}");
        self.send(Method::GET, &futures_path("/position_close"), &query, None)
            .await
    }

    /// Returns tickers, optionally for one contract.
    pub async fn tickers(&self, contract: Option<&str>) -> TradeResult<Vec<GateTicker>> {
        let query = contract.map_or(String::new(), |c| format!("contract={c}"));
        self.send(Method::GET, &futures_path("/tickers"), &query, None).await
    }

    /// Whether a venue error is a coercible idempotent no-op.
    #[must_use]
    pub fn is_noop(error: &TradeError) -> bool {
        matches!(error, TradeError::Venue { message, .. }
            if message.split(':').next().is_some_and(is_idempotent_noop))
    }

    // ---------------------------------------------------------------------------------------
    // Transport
    // ---------------------------------------------------------------------------------------

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &str,
        body: Option<String>,
    ) -> TradeResult<T> {
        let full_path = format!("{GATE_API_PREFIX}{path}");
        let timestamp = (self.clock.now_ms() / 1_000).to_string();
        let body_str = body.unwrap_or_default();
        let signature = self.credential.sign(
            method.as_str(),
            &full_path,
            query,
            &body_str,
            &timestamp,
        );
        let url = if query.is_empty() {
            format!("{}{full_path}", self.base_url)
        } else {
            format!("{}{full_path}?{query}", self.base_url)
        };
        let mut request = self
            .http
            .request(method, url)
            .header("KEY", self.credential.api_key())
            .header("Timestamp", &timestamp)
            .header("SIGN", signature)
            .header("Accept", "application/json");
        if !body_str.is_empty() {
            request = request
                .header("Content-Type", "application/json")
                .body(body_str);
        }
        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        if !status.is_success() {
            if let Ok(body) = serde_json::from_slice::<GateErrorBody>(&bytes) {
                return Err(classify_label(&body));
            }
            let excerpt = String::from_utf8_lossy(&bytes).into_owned();
            return Err(TradeError::from_http_status(status.as_u16(), Some(excerpt)));
        }
        serde_json::from_slice(&bytes).map_err(TradeError::from)
    }
}

fn futures_path(suffix: &str) -> String {
    format!("{GATE_FUTURES_PATH}{suffix}")
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn futures_paths_are_rooted() {
        assert_eq!(futures_path("/accounts"), "/futures/usdt/accounts");
    }

    #[rstest]
    fn noop_detection_reads_label_prefix() {
        let err = TradeError::venue(0, "NO_CHANGE: leverage unchanged".to_string());
        assert!(GateHttpClient::is_noop(&err));
        let err = TradeError::venue(0, "ORDER_NOT_FOUND: gone".to_string());
        assert!(!GateHttpClient::is_noop(&err));
    }
}

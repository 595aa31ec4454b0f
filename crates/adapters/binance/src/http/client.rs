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

//! Signed HTTP client for the Binance futures REST API.
//!
//! Every signed request carries `timestamp` (server-offset adjusted),
//! `recvWindow`, and an HMAC-SHA256 `signature` over the full query string;
//! POST endpoints receive their parameters through the query string as well.

use omniperp_core::{
    error::{TradeError, TradeResult},
    time::ServerClock,
};
use reqwest::{Client as ReqwestClient, Method};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, info};

use crate::{
    common::{
        consts::{BINANCE_FUTURES_URL, DEFAULT_HTTP_TIMEOUT, DEFAULT_RECV_WINDOW_MS},
        credential::Credential,
    },
    http::{
        error::{
            CODE_UNKNOWN_ORDER, classify_code, is_idempotent_noop,
            is_margin_change_blocked_by_position,
        },
        models::{
            BinanceAlgoOrder, BinanceAlgoOrders, BinanceBalance, BinanceErrorBody,
            BinanceExchangeInfo, BinanceIncome, BinanceOrder, BinancePositionRisk,
            BinanceServerTime, BinanceTickerPrice, BinanceUserTrade,
        },
        query::{
            BinanceAlgoOrderParams, BinanceIncomeParams, BinanceLeverageParams,
            BinanceMarginTypeParams, BinanceOrderParams, BinanceUserTradesParams,
        },
    },
};

/// Signed Binance futures HTTP client.
#[derive(Debug)]
pub struct BinanceHttpClient {
    base_url: String,
    http: ReqwestClient,
    credential: Credential,
    recv_window_ms: u64,
    clock: ServerClock,
}

impl BinanceHttpClient {
    /// Creates a client; call [`BinanceHttpClient::sync_server_time`] before
    /// issuing signed requests.
    ///
    /// # Errors
    ///
    /// Returns [`TradeError::Config`] when the HTTP client cannot be built.
    pub fn new(
        credential: Credential,
        base_url: Option<String>,
        recv_window_ms: Option<u64>,
    ) -> TradeResult<Self> {
        let http = ReqwestClient::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| TradeError::config(e.to_string()))?;
        Ok(Self {
            base_url: base_url.unwrap_or_else(|| BINANCE_FUTURES_URL.to_string()),
            http,
            credential,
            recv_window_ms: recv_window_ms.unwrap_or(DEFAULT_RECV_WINDOW_MS),
            clock: ServerClock::new(),
        })
    }

    /// Returns the base URL used for requests.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Samples `GET /fapi/v1/time` and records the clock offset. Without the
    /// offset the venue rejects signed requests as "timestamp ahead".
    pub async fn sync_server_time(&self) -> TradeResult<()> {
        let time: BinanceServerTime = self.get_public("/fapi/v1/time", "").await?;
        self.clock.sync(time.server_time);
        debug!(offset_ms = self.clock.offset_ms(), "binance server clock synced");
        Ok(())
    }

    // ---------------------------------------------------------------------------------------
    // Market (public)
    // ---------------------------------------------------------------------------------------

    /// Returns exchange info, optionally restricted to one symbol.
    pub async fn exchange_info(&self, symbol: Option<&str>) -> TradeResult<BinanceExchangeInfo> {
        let query = symbol.map_or(String::new(), |s| format!("symbol={s}"));
        self.get_public("/fapi/v1/exchangeInfo", &query).await
    }

    /// Returns the last price for a symbol.
    pub async fn ticker_price(&self, symbol: &str) -> TradeResult<BinanceTickerPrice> {
        self.get_public("/fapi/v1/ticker/price", &format!("symbol={symbol}"))
            .await
    }

    // ---------------------------------------------------------------------------------------
    // Account
    // ---------------------------------------------------------------------------------------

    /// Returns per-asset futures balances.
    pub async fn balances(&self) -> TradeResult<Vec<BinanceBalance>> {
        self.send_signed(Method::GET, "/fapi/v2/balance", "").await
    }

    /// Returns position risk entries, optionally for one symbol.
    pub async fn position_risk(&self, symbol: Option<&str>) -> TradeResult<Vec<BinancePositionRisk>> {
        let query = symbol.map_or(String::new(), |s| format!("symbol={s}"));
        self.send_signed(Method::GET, "/fapi/v2/positionRisk", &query)
            .await
    }

    /// Sets leverage for a symbol.
    pub async fn set_leverage(&self, params: &BinanceLeverageParams) -> TradeResult<()> {
        let query = encode(params)?;
        let _: serde_json::Value = self
            .send_signed(Method::POST, "/fapi/v1/leverage", &query)
            .await?;
        Ok(())
    }

    /// Sets the margin type. Returns `false` on a coerced no-op, including
    /// the position-exists case the venue forbids changing under.
    pub async fn set_margin_type(&self, params: &BinanceMarginTypeParams) -> TradeResult<bool> {
        let query = encode(params)?;
        match self
            .send_signed::<serde_json::Value>(Method::POST, "/fapi/v1/marginType", &query)
            .await
        {
            Ok(_) => Ok(true),
            Err(TradeError::Venue { code, message })
                if is_idempotent_noop(code)
                    || is_margin_change_blocked_by_position(code, &message) =>
            {
                info!(code, %message, "margin type change coerced to success");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Enables dual-side (hedge) position mode. Returns `false` on the
    /// "No need to change position side" no-op.
    pub async fn enable_dual_side(&self) -> TradeResult<bool> {
        match self
            .send_signed::<serde_json::Value>(
                Method::POST,
                "/fapi/v1/positionSide/dual",
                "dualSidePosition=true",
            )
            .await
        {
            Ok(_) => Ok(true),
            Err(TradeError::Venue { code, message }) if is_idempotent_noop(code) => {
                info!(code, %message, "dual-side mode already enabled");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    // ---------------------------------------------------------------------------------------
    // Orders
    // ---------------------------------------------------------------------------------------

    /// Places a regular order.
    pub async fn place_order(&self, params: &BinanceOrderParams) -> TradeResult<BinanceOrder> {
        let query = encode(params)?;
        self.send_signed(Method::POST, "/fapi/v1/order", &query).await
    }

    /// Places an algo (conditional) order.
    pub async fn place_algo_order(
        &self,
        params: &BinanceAlgoOrderParams,
    ) -> TradeResult<BinanceAlgoOrder> {
        let query = encode(params)?;
        self.send_signed(Method::POST, "/fapi/v1/algoOrder", &query)
            .await
    }

    /// Queries one order by id.
    pub async fn query_order(&self, symbol: &str, order_id: i64) -> TradeResult<BinanceOrder> {
        let query = format!("symbol={symbol}&orderId={order_id}");
        self.send_signed(Method::GET, "/fapi/v1/order", &query).await
    }

    /// Returns open regular orders for a symbol.
    pub async fn open_orders(&self, symbol: &str) -> TradeResult<Vec<BinanceOrder>> {
        self.send_signed(Method::GET, "/fapi/v1/openOrders", &format!("symbol={symbol}"))
            .await
    }

    /// Returns open algo orders for a symbol.
    pub async fn open_algo_orders(&self, symbol: &str) -> TradeResult<Vec<BinanceAlgoOrder>> {
        let payload: BinanceAlgoOrders = self
            .send_signed(
                Method::GET,
                "/fapi/v1/openAlgoOrders",
                &format!("symbol={symbol}"),
            )
            .await?;
        Ok(payload.orders)
    }

    /// Cancels every open regular order for a symbol.
    pub async fn cancel_all_orders(&self, symbol: &str) -> TradeResult<()> {
        let _: serde_json::Value = self
            .send_signed(
                Method::DELETE,
                "/fapi/v1/allOpenOrders",
                &format!("symbol={symbol}"),
            )
            .await?;
        Ok(())
    }

    /// Cancels one regular order; "Unknown order" is coerced to `false`.
    pub async fn cancel_order(&self, symbol: &str, order_id: i64) -> TradeResult<bool> {
        let query = format!("symbol={symbol}&orderId={order_id}");
        match self
            .send_signed::<serde_json::Value>(Method::DELETE, "/fapi/v1/order", &query)
            .await
        {
            Ok(_) => Ok(true),
            Err(TradeError::Venue { code, message }) if code == CODE_UNKNOWN_ORDER => {
                info!(%message, "cancel coerced to success, order already gone");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Cancels one algo order; "Unknown order" is coerced to `false`.
    pub async fn cancel_algo_order(&self, symbol: &str, algo_id: i64) -> TradeResult<bool> {
        let query = format!("symbol={symbol}&algoId={algo_id}");
        match self
            .send_signed::<serde_json::Value>(Method::DELETE, "/fapi/v1/algoOrder", &query)
            .await
        {
            Ok(_) => Ok(true),
            Err(TradeError::Venue { code, message }) if code == CODE_UNKNOWN_ORDER => {
                info!(%message, "algo cancel coerced to success, order already gone");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    // ---------------------------------------------------------------------------------------
    // History
    // ---------------------------------------------------------------------------------------

    /// Returns account trades for a symbol.
    pub async fn user_trades(
        &self,
        params: &BinanceUserTradesParams,
    ) -> TradeResult<Vec<BinanceUserTrade>> {
        let query = encode(params)?;
        self.send_signed(Method::GET, "/fapi/v1/userTrades", &query)
            .await
    }

    /// Returns income records (COMMISSION, REALIZED_PNL, ...).
    pub async fn income(&self, params: &BinanceIncomeParams) -> TradeResult<Vec<BinanceIncome>> {
        let query = encode(params)?;
        self.send_signed(Method::GET, "/fapi/v1/income", &query).await
    }

    // ---------------------------------------------------------------------------------------
    // Transport
    // ---------------------------------------------------------------------------------------

    async fn get_public<T: DeserializeOwned>(&self, path: &str, query: &str) -> TradeResult<T> {
        let url = if query.is_empty() {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}{path}?{query}", self.base_url)
        };
        let response = self.http.get(url).send().await?;
        Self::read_json(response).await
    }

    async fn send_signed<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &str,
    ) -> TradeResult<T> {
        let timestamp = self.clock.now_ms();
        let mut full = String::with_capacity(query.len() + 64);
        if !query.is_empty() {
            full.push_str(query);
            full.push('&');
        }
        full.push_str(&format!(
            "recvWindow={}&timestamp={timestamp}",
            self.recv_window_ms
        ));
        let signature = self.credential.sign(&full);
        let url = format!("{}{path}?{full}&signature={signature}", self.base_url);
        let response = self
            .http
            .request(method, url)
            .header("X-MBX-APIKEY", self.credential.api_key())
            .send()
            .await?;
        Self::read_json(response).await
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> TradeResult<T> {
        let status = response.status();
        let bytes = response.bytes().await?;
        if !status.is_success() {
            // Binance carries {code, msg} in error bodies; prefer that over
            // the bare status when it parses.
            if let Ok(body) = serde_json::from_slice::<BinanceErrorBody>(&bytes) {
                return Err(classify_code(body.code, body.msg));
            }
            let excerpt = String::from_utf8_lossy(&bytes).into_owned();
            return Err(TradeError::from_http_status(status.as_u16(), Some(excerpt)));
        }
        serde_json::from_slice(&bytes).map_err(TradeError::from)
    }
}

fn encode<P: Serialize>(params: &P) -> TradeResult<String> {
    serde_urlencoded::to_string(params)
        .map_err(|e| TradeError::config(format!("query encoding failed: {e}")))
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::http::query::BinanceUserTradesParamsBuilder;

    #[rstest]
    fn encode_skips_absent_options() {
        let params = BinanceUserTradesParamsBuilder::default()
            .symbol("BTCUSDT")
            .start_time(1_700_000_000_000_i64)
            .limit(500_u32)
            .build()
            .unwrap();
        assert_eq!(
            encode(&params).unwrap(),
            "symbol=BTCUSDT&startTime=1700000000000&limit=500"
        );
    }
}

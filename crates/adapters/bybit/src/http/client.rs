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

//! Signed HTTP client for the Bybit v5 REST API.
//!
//! Every signed request carries `X-BAPI-TIMESTAMP` adjusted by the server
//! time offset sampled at construction; without the offset Bybit rejects
//! requests whose timestamp runs ahead of its clock.

use omniperp_core::{
    error::{TradeError, TradeResult},
    time::ServerClock,
};
use reqwest::Client as ReqwestClient;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, info};

use crate::{
    common::{
        consts::{BYBIT_HTTP_URL, DEFAULT_HTTP_TIMEOUT, DEFAULT_RECV_WINDOW_MS},
        credential::Credential,
        parse::parse_i64,
    },
    http::{
        error::{RET_ORDER_NOT_EXISTS, classify_ret_code, is_idempotent_noop},
        models::{
            BybitCancelledOrder, BybitClosedPnl, BybitExecution, BybitInstrument, BybitList,
            BybitOrder, BybitOrderAck, BybitPosition, BybitResponse, BybitServerTime, BybitTicker,
            BybitWalletBalance,
        },
        query::{
            BybitCancelAllParams, BybitCancelOrderParams, BybitClosedPnlParams,
            BybitExecutionListParams, BybitOpenOrdersParams, BybitPlaceOrderParams,
            BybitPositionListParams, BybitSetLeverageParams, BybitSwitchIsolatedParams,
            BybitSwitchModeParams,
        },
    },
};

/// Signed Bybit v5 HTTP client.
#[derive(Debug)]
pub struct BybitHttpClient {
    base_url: String,
    http: ReqwestClient,
    credential: Credential,
    recv_window_ms: u64,
    clock: ServerClock,
}

impl BybitHttpClient {
    /// Creates a client; the server clock starts unsynced, call
    /// [`BybitHttpClient::sync_server_time`] before signing requests.
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
            base_url: base_url.unwrap_or_else(|| BYBIT_HTTP_URL.to_string()),
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

    /// Samples `GET /v5/market/time` and records the clock offset.
    pub async fn sync_server_time(&self) -> TradeResult<()> {
        let time = self.server_time_ms().await?;
        self.clock.sync(time);
        debug!(offset_ms = self.clock.offset_ms(), "bybit server clock synced");
        Ok(())
    }

    /// Returns the venue server time in milliseconds.
    pub async fn server_time_ms(&self) -> TradeResult<i64> {
        let no_query: &[(&str, String)] = &[];
        let resp: BybitResponse<BybitServerTime> =
            self.get_public("/v5/market/time", no_query).await?;
        let time = decode(resp)?;
        Ok(parse_i64("timeSecond", &time.time_second)? * 1_000)
    }

    // ---------------------------------------------------------------------------------------
    // Market (public)
    // ---------------------------------------------------------------------------------------

    /// Returns linear tickers, optionally filtered to one symbol.
    pub async fn tickers(&self, symbol: Option<&str>) -> TradeResult<Vec<BybitTicker>> {
        let mut query = vec![("category", "linear".to_string())];
        if let Some(symbol) = symbol {
            query.push(("symbol", symbol.to_string()));
        }
        let resp: BybitResponse<BybitList<BybitTicker>> =
            self.get_public("/v5/market/tickers", &query).await?;
        Ok(decode(resp)?.list)
    }

    /// Returns linear instrument metadata for one symbol.
    pub async fn instrument(&self, symbol: &str) -> TradeResult<Option<BybitInstrument>> {
        let query = vec![
            ("category", "linear".to_string()),
            ("symbol", symbol.to_string()),
        ];
        let resp: BybitResponse<BybitList<BybitInstrument>> = self
            .get_public("/v5/market/instruments-info", &query)
            .await?;
        Ok(decode(resp)?.list.into_iter().next())
    }

    // ---------------------------------------------------------------------------------------
    // Account / positions
    // ---------------------------------------------------------------------------------------

    /// Returns the unified-account wallet balance.
    pub async fn wallet_balance(&self) -> TradeResult<BybitWalletBalance> {
        let query = vec![("accountType", "UNIFIED".to_string())];
        let resp: BybitResponse<BybitList<BybitWalletBalance>> =
            self.get_signed("/v5/account/wallet-balance", &query).await?;
        decode(resp)?
            .list
            .into_iter()
            .next()
            .ok_or_else(|| TradeError::auth("no unified account balance returned"))
    }

    /// Returns positions for the linear category.
    pub async fn positions(
        &self,
        params: &BybitPositionListParams,
    ) -> TradeResult<Vec<BybitPosition>> {
        let resp: BybitResponse<BybitList<BybitPosition>> =
            self.get_signed("/v5/position/list", params).await?;
        Ok(decode(resp)?.list)
    }

    /// Sets symbol leverage. Returns `false` when the venue reported the
    /// leverage as already set (coerced no-op).
    pub async fn set_leverage(&self, params: &BybitSetLeverageParams) -> TradeResult<bool> {
        let resp: BybitResponse<serde_json::Value> =
            self.post_signed("/v5/position/set-leverage", params).await?;
        decode_coercing_noop(resp)
    }

    /// Switches cross/isolated margin. Returns `false` on a coerced no-op.
    pub async fn switch_isolated(&self, params: &BybitSwitchIsolatedParams) -> TradeResult<bool> {
        let resp: BybitResponse<serde_json::Value> = self
            .post_signed("/v5/position/switch-isolated", params)
            .await?;
        decode_coercing_noop(resp)
    }

    /// Switches one-way/hedge position mode. Returns `false` on a coerced no-op.
    pub async fn switch_mode(&self, params: &BybitSwitchModeParams) -> TradeResult<bool> {
        let resp: BybitResponse<serde_json::Value> =
            self.post_signed("/v5/position/switch-mode", params).await?;
        decode_coercing_noop(resp)
    }

    // ---------------------------------------------------------------------------------------
    // Orders
    // ---------------------------------------------------------------------------------------

    /// Places an order.
    pub async fn place_order(&self, params: &BybitPlaceOrderParams) -> TradeResult<BybitOrderAck> {
        let resp: BybitResponse<BybitOrderAck> =
            self.post_signed("/v5/order/create", params).await?;
        decode(resp)
    }

    /// Cancels one order; "order not exists" is coerced to `false`.
    pub async fn cancel_order(&self, params: &BybitCancelOrderParams) -> TradeResult<bool> {
        let resp: BybitResponse<BybitOrderAck> =
            self.post_signed("/v5/order/cancel", params).await?;
        if resp.ret_code == RET_ORDER_NOT_EXISTS {
            info!(ret_msg = %resp.ret_msg, "cancel coerced to success, order already gone");
            return Ok(false);
        }
        decode(resp).map(|_| true)
    }

    /// Cancels all orders matching the filter, returning the cancelled ids.
    pub async fn cancel_all(
        &self,
        params: &BybitCancelAllParams,
    ) -> TradeResult<Vec<BybitCancelledOrder>> {
        let resp: BybitResponse<BybitList<BybitCancelledOrder>> =
            self.post_signed("/v5/order/cancel-all", params).await?;
        Ok(decode(resp)?.list)
    }

    /// Returns open (and recent) orders.
    pub async fn open_orders(&self, params: &BybitOpenOrdersParams) -> TradeResult<Vec<BybitOrder>> {
        let resp: BybitResponse<BybitList<BybitOrder>> =
            self.get_signed("/v5/order/realtime", params).await?;
        Ok(decode(resp)?.list)
    }

    /// Returns executions (fills).
    pub async fn executions(
        &self,
        params: &BybitExecutionListParams,
    ) -> TradeResult<Vec<BybitExecution>> {
        let resp: BybitResponse<BybitList<BybitExecution>> =
            self.get_signed("/v5/execution/list", params).await?;
        Ok(decode(resp)?.list)
    }

    /// Returns closed-pnl records.
    pub async fn closed_pnl(&self, params: &BybitClosedPnlParams) -> TradeResult<Vec<BybitClosedPnl>> {
        let resp: BybitResponse<BybitList<BybitClosedPnl>> =
            self.get_signed("/v5/position/closed-pnl", params).await?;
        Ok(decode(resp)?.list)
    }

    // ---------------------------------------------------------------------------------------
    // Transport
    // ---------------------------------------------------------------------------------------

    async fn get_public<Q: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        query: &Q,
    ) -> TradeResult<T> {
        let query = serde_urlencoded::to_string(query)
            .map_err(|e| TradeError::config(format!("query encoding failed: {e}")))?;
        let url = if query.is_empty() {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}{path}?{query}", self.base_url)
        };
        let response = self.http.get(url).send().await?;
        Self::read_json(response).await
    }

    async fn get_signed<Q: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        query: &Q,
    ) -> TradeResult<T> {
        let query = serde_urlencoded::to_string(query)
            .map_err(|e| TradeError::config(format!("query encoding failed: {e}")))?;
        let timestamp = self.clock.now_ms().to_string();
        let signature = self
            .credential
            .sign(&timestamp, self.recv_window_ms, Some(&query));
        let url = if query.is_empty() {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}{path}?{query}", self.base_url)
        };
        let response = self
            .http
            .get(url)
            .header("X-BAPI-API-KEY", self.credential.api_key())
            .header("X-BAPI-TIMESTAMP", &timestamp)
            .header("X-BAPI-RECV-WINDOW", self.recv_window_ms.to_string())
            .header("X-BAPI-SIGN", signature)
            .send()
            .await?;
        Self::read_json(response).await
    }

    async fn post_signed<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> TradeResult<T> {
        let body = serde_json::to_string(body)?;
        let timestamp = self.clock.now_ms().to_string();
        let signature = self
            .credential
            .sign(&timestamp, self.recv_window_ms, Some(&body));
        let response = self
            .http
            .post(format!("{}{path}", self.base_url))
            .header("X-BAPI-API-KEY", self.credential.api_key())
            .header("X-BAPI-TIMESTAMP", &timestamp)
            .header("X-BAPI-RECV-WINDOW", self.recv_window_ms.to_string())
            .header("X-BAPI-SIGN", signature)
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await?;
        Self::read_json(response).await
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> TradeResult<T> {
        let status = response.status();
        let bytes = response.bytes().await?;
        if !status.is_success() {
            let excerpt = String::from_utf8_lossy(&bytes).into_owned();
            return Err(TradeError::from_http_status(status.as_u16(), Some(excerpt)));
        }
        serde_json::from_slice(&bytes).map_err(TradeError::from)
    }
}

/// Unwraps a v5 envelope, classifying non-zero `retCode`s.
fn decode<T>(resp: BybitResponse<T>) -> TradeResult<T> {
    if resp.ret_code != 0 {
        return Err(classify_ret_code(resp.ret_code, resp.ret_msg));
    }
    resp.result.ok_or_else(|| TradeError::Json {
        message: "missing result in successful response".to_string(),
    })
}

/// Unwraps a v5 envelope, coercing idempotent no-op codes to `Ok(false)`.
fn decode_coercing_noop<T>(resp: BybitResponse<T>) -> TradeResult<bool> {
    if resp.ret_code == 0 {
        return Ok(true);
    }
    if is_idempotent_noop(resp.ret_code) {
        info!(ret_code = resp.ret_code, ret_msg = %resp.ret_msg, "venue reported no-op, coerced to success");
        return Ok(false);
    }
    Err(classify_ret_code(resp.ret_code, resp.ret_msg))
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn envelope(ret_code: i64) -> BybitResponse<serde_json::Value> {
        BybitResponse {
            ret_code,
            ret_msg: "msg".to_string(),
            result: Some(serde_json::json!({})),
            time: None,
        }
    }

    #[rstest]
    fn decode_passes_success_through() {
        assert!(decode(envelope(0)).is_ok());
        assert!(decode(envelope(10001)).is_err());
    }

    #[rstest]
    fn noop_codes_coerce_to_false() {
        assert!(decode_coercing_noop(envelope(0)).unwrap());
        assert!(!decode_coercing_noop(envelope(110043)).unwrap());
        assert!(decode_coercing_noop(envelope(10001)).is_err());
    }
}

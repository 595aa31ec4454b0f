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

//! Response payloads for the Bybit v5 REST endpoints this adapter uses.
//!
//! Bybit renders most numerics as strings; conversion into canonical decimal
//! types happens in the trader facade via `common::parse`.

use serde::{Deserialize, Serialize};
use ustr::Ustr;

/// Envelope wrapping every v5 response.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BybitResponse<T> {
    pub ret_code: i64,
    pub ret_msg: String,
    #[serde(default = "Option::default")]
    pub result: Option<T>,
    pub time: Option<i64>,
}

/// Generic wrapper containing a list payload.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BybitList<T> {
    #[serde(default)]
    pub list: Vec<T>,
    #[serde(default)]
    pub next_page_cursor: Option<String>,
}

/// Payload of `GET /v5/market/time`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BybitServerTime {
    pub time_second: String,
    pub time_nano: String,
}

/// Per-account entry of `GET /v5/account/wallet-balance`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BybitWalletBalance {
    pub total_wallet_balance: String,
    #[serde(default)]
    pub total_available_balance: String,
    #[serde(default)]
    pub total_perp_u_p_l: String,
}

/// Position entry of `GET /v5/position/list`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BybitPosition {
    pub symbol: Ustr,
    /// "Buy", "Sell", or "" for a flat one-way slot.
    pub side: String,
    pub size: String,
    pub avg_price: String,
    #[serde(default)]
    pub mark_price: String,
    #[serde(default)]
    pub unrealised_pnl: String,
    #[serde(default)]
    pub leverage: String,
    #[serde(default)]
    pub liq_price: String,
    #[serde(default)]
    pub position_idx: Option<i32>,
}

/// Order entry of `GET /v5/order/realtime`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BybitOrder {
    pub order_id: String,
    #[serde(default)]
    pub order_link_id: String,
    pub symbol: Ustr,
    pub side: String,
    pub order_type: String,
    #[serde(default)]
    pub order_status: String,
    pub qty: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub trigger_price: String,
    #[serde(default)]
    pub stop_order_type: String,
    #[serde(default)]
    pub trigger_direction: Option<i32>,
    #[serde(default)]
    pub position_idx: Option<i32>,
    #[serde(default)]
    pub cum_exec_qty: String,
    #[serde(default)]
    pub avg_price: String,
    #[serde(default)]
    pub reduce_only: Option<bool>,
}

/// Execution (fill) entry of `GET /v5/execution/list`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BybitExecution {
    pub exec_id: String,
    pub order_id: String,
    pub symbol: Ustr,
    pub side: String,
    pub exec_price: String,
    pub exec_qty: String,
    #[serde(default)]
    pub exec_fee: String,
    #[serde(default)]
    pub closed_size: String,
    #[serde(default)]
    pub exec_pnl: String,
    pub exec_time: String,
}

/// Closed-pnl entry of `GET /v5/position/closed-pnl`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BybitClosedPnl {
    pub symbol: Ustr,
    pub side: String,
    pub qty: String,
    pub avg_entry_price: String,
    pub avg_exit_price: String,
    pub closed_pnl: String,
    pub updated_time: String,
}

/// Ticker entry of `GET /v5/market/tickers` (linear).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BybitTicker {
    pub symbol: Ustr,
    pub last_price: String,
    #[serde(default)]
    pub mark_price: String,
}

/// Instrument entry of `GET /v5/market/instruments-info` (linear).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BybitInstrument {
    pub symbol: Ustr,
    pub lot_size_filter: BybitLotSizeFilter,
    pub price_filter: BybitPriceFilter,
    #[serde(default)]
    pub leverage_filter: Option<BybitLeverageFilter>,
}

/// Lot size filter for linear contracts.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BybitLotSizeFilter {
    pub qty_step: String,
    #[serde(default)]
    pub min_order_qty: String,
    #[serde(default)]
    pub max_order_qty: String,
}

/// Price filter for linear contracts.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BybitPriceFilter {
    pub tick_size: String,
}

/// Leverage filter for linear contracts.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BybitLeverageFilter {
    pub max_leverage: String,
}

/// Result of `POST /v5/order/create` and `POST /v5/order/cancel`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BybitOrderAck {
    pub order_id: String,
    #[serde(default)]
    pub order_link_id: String,
}

/// Cancelled entry of `POST /v5/order/cancel-all`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BybitCancelledOrder {
    pub order_id: String,
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn envelope_deserializes_without_result() {
        let raw = r#"{"retCode":10001,"retMsg":"params error","result":{},"retExtInfo":{},"time":1704470400123}"#;
        let resp: BybitResponse<BybitList<BybitTicker>> = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.ret_code, 10001);
    }

    #[rstest]
    fn wallet_balance_deserializes() {
        let raw = r#"{
            "totalWalletBalance": "1000.5",
            "totalAvailableBalance": "800.25",
            "totalPerpUPL": "-12.5"
        }"#;
        let balance: BybitWalletBalance = serde_json::from_str(raw).unwrap();
        assert_eq!(balance.total_wallet_balance, "1000.5");
        assert_eq!(balance.total_perp_u_p_l, "-12.5");
    }

    #[rstest]
    fn execution_deserializes() {
        let raw = r#"{
            "execId": "abc-123",
            "orderId": "ord-1",
            "symbol": "ETHUSDT",
            "side": "Sell",
            "execPrice": "3600",
            "execQty": "0.1",
            "execFee": "0.216",
            "closedSize": "0.1",
            "execPnl": "10",
            "execTime": "1704470400123"
        }"#;
        let exec: BybitExecution = serde_json::from_str(raw).unwrap();
        assert_eq!(exec.symbol.as_str(), "ETHUSDT");
        assert_eq!(exec.exec_pnl, "10");
    }
}

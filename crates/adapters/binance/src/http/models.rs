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

//! Response payloads for the Binance futures REST endpoints this adapter uses.

use serde::{Deserialize, Serialize};
use ustr::Ustr;

/// Error body returned with non-2xx statuses.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BinanceErrorBody {
    pub code: i64,
    pub msg: String,
}

/// Payload of `GET /fapi/v1/time`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceServerTime {
    pub server_time: i64,
}

/// Entry of `GET /fapi/v2/balance`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceBalance {
    pub asset: Ustr,
    pub balance: String,
    #[serde(default)]
    pub available_balance: String,
    #[serde(default)]
    pub cross_un_pnl: String,
}

/// Entry of `GET /fapi/v2/positionRisk`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinancePositionRisk {
    pub symbol: Ustr,
    pub position_amt: String,
    pub entry_price: String,
    #[serde(default)]
    pub mark_price: String,
    #[serde(default)]
    pub un_realized_profit: String,
    #[serde(default)]
    pub leverage: String,
    #[serde(default)]
    pub liquidation_price: String,
    #[serde(default)]
    pub position_side: String,
}

/// Acknowledgement of `POST /fapi/v1/order` (and order queries).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceOrder {
    pub order_id: i64,
    pub symbol: Ustr,
    #[serde(default)]
    pub client_order_id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub side: String,
    #[serde(default)]
    pub position_side: String,
    #[serde(rename = "type", default)]
    pub order_type: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub stop_price: String,
    #[serde(default)]
    pub orig_qty: String,
    #[serde(default)]
    pub executed_qty: String,
    #[serde(default)]
    pub avg_price: String,
    #[serde(default)]
    pub close_position: Option<bool>,
}

/// Entry of `GET /fapi/v1/openAlgoOrders` and ack of `POST /fapi/v1/algoOrder`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceAlgoOrder {
    pub algo_id: i64,
    #[serde(default)]
    pub symbol: Ustr,
    #[serde(default)]
    pub side: String,
    #[serde(default)]
    pub position_side: String,
    #[serde(default)]
    pub algo_type: String,
    #[serde(default)]
    pub trigger_price: String,
    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub algo_status: String,
    #[serde(default)]
    pub client_algo_id: String,
}

/// List payload of `GET /fapi/v1/openAlgoOrders`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceAlgoOrders {
    #[serde(default)]
    pub orders: Vec<BinanceAlgoOrder>,
}

/// Entry of `GET /fapi/v1/userTrades`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceUserTrade {
    pub id: i64,
    pub order_id: i64,
    pub symbol: Ustr,
    pub side: String,
    #[serde(default)]
    pub position_side: String,
    pub price: String,
    pub qty: String,
    #[serde(default)]
    pub realized_pnl: String,
    #[serde(default)]
    pub commission: String,
    pub time: i64,
}

/// Entry of `GET /fapi/v1/income`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceIncome {
    #[serde(default)]
    pub symbol: Ustr,
    pub income_type: String,
    pub income: String,
    pub time: i64,
}

/// Payload of `GET /fapi/v1/ticker/price`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceTickerPrice {
    pub symbol: Ustr,
    pub price: String,
}

/// Payload of `GET /fapi/v1/exchangeInfo`, trimmed to the filter data the
/// precision registry needs.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceExchangeInfo {
    #[serde(default)]
    pub symbols: Vec<BinanceSymbolInfo>,
}

/// Per-symbol entry of the exchange info payload.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceSymbolInfo {
    pub symbol: Ustr,
    #[serde(default)]
    pub quantity_precision: Option<u32>,
    #[serde(default)]
    pub price_precision: Option<u32>,
    #[serde(default)]
    pub filters: Vec<BinanceSymbolFilter>,
}

/// `LOT_SIZE` / `PRICE_FILTER` style filter entry.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceSymbolFilter {
    pub filter_type: String,
    #[serde(default)]
    pub step_size: Option<String>,
    #[serde(default)]
    pub tick_size: Option<String>,
    #[serde(default)]
    pub notional: Option<String>,
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn user_trade_deserializes() {
        let raw = r#"{
            "id": 698759,
            "orderId": 25851813,
            "symbol": "ETHUSDT",
            "side": "SELL",
            "positionSide": "SHORT",
            "price": "3500",
            "qty": "0.05",
            "realizedPnl": "0",
            "commission": "0.07",
            "commissionAsset": "USDT",
            "time": 1569514978020,
            "buyer": false,
            "maker": false
        }"#;
        let trade: BinanceUserTrade = serde_json::from_str(raw).unwrap();
        assert_eq!(trade.id, 698759);
        assert_eq!(trade.position_side, "SHORT");
        assert_eq!(trade.realized_pnl, "0");
    }

    #[rstest]
    fn exchange_info_filters_deserialize() {
        let raw = r#"{
            "symbols": [{
                "symbol": "BTCUSDT",
                "quantityPrecision": 3,
                "pricePrecision": 2,
                "filters": [
                    {"filterType": "LOT_SIZE", "stepSize": "0.001", "minQty": "0.001"},
                    {"filterType": "PRICE_FILTER", "tickSize": "0.10"}
                ]
            }]
        }"#;
        let info: BinanceExchangeInfo = serde_json::from_str(raw).unwrap();
        let lot = &info.symbols[0].filters[0];
        assert_eq!(lot.filter_type, "LOT_SIZE");
        assert_eq!(lot.step_size.as_deref(), Some("0.001"));
    }
}

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

//! Request and response payloads for the Gate.io v4 futures endpoints.
//!
//! Gate sizes are integer contract counts, signed: positive longs, negative
//! shorts. Conversion through `quanto_multiplier` happens in the trader.

use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};
use ustr::Ustr;

/// Contract metadata from `GET /futures/usdt/contracts/{contract}`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GateContract {
    pub name: Ustr,
    /// One contract equals this many base units.
    pub quanto_multiplier: String,
    #[serde(default)]
    pub leverage_max: String,
    #[serde(default)]
    pub order_price_round: String,
    #[serde(default)]
    pub order_size_min: Option<i64>,
}

/// Futures account from `GET /futures/usdt/accounts`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GateAccount {
    pub total: String,
    #[serde(default)]
    pub available: String,
    #[serde(default)]
    pub unrealised_pnl: String,
}

/// Position entry from `GET /futures/usdt/positions`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GatePosition {
    pub contract: Ustr,
    /// Signed contract count; negative is short.
    pub size: i64,
    #[serde(default)]
    pub entry_price: String,
    #[serde(default)]
    pub mark_price: String,
    #[serde(default)]
    pub unrealised_pnl: String,
    #[serde(default)]
    pub leverage: String,
    /// "0" selects cross margin.
    #[serde(default)]
    pub cross_leverage_limit: String,
    #[serde(default)]
    pub liq_price: String,
    #[serde(default)]
    pub mode: String,
}

/// Body for `POST /futures/usdt/orders`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GateOrderRequest {
    pub contract: String,
    /// Signed contract count; zero with `close` set closes the position.
    pub size: i64,
    /// "0" submits a market order under `tif: "ioc"`.
    pub price: String,
    pub tif: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reduce_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close: Option<bool>,
}

/// Order entry from the orders endpoints.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GateOrder {
    pub id: i64,
    pub contract: Ustr,
    pub size: i64,
    #[serde(default)]
    pub left: i64,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub tif: String,
    #[serde(default)]
    pub is_reduce_only: bool,
    #[serde(default)]
    pub fill_price: String,
    /// Terminal disposition for finished orders ("filled", "cancelled", ...).
    #[serde(default)]
    pub finish_as: String,
}

/// Trigger rule for price-triggered orders.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum GateTriggerRule {
    /// Fires when the price crosses the trigger from below (price >= trigger).
    GreaterOrEqual = 1,
    /// Fires when the price crosses the trigger from above (price <= trigger).
    LessOrEqual = 2,
}

/// Trigger leg of a price-triggered order; `price_type` 1 is mark price and
/// `strategy_type` 0 is a plain price trigger.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GateTrigger {
    pub strategy_type: i32,
    pub price_type: i32,
    pub price: String,
    pub rule: GateTriggerRule,
}

/// Initial order placed when a trigger fires.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GateTriggerInitial {
    pub contract: String,
    pub size: i64,
    pub price: String,
    pub tif: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reduce_only: Option<bool>,
}

/// Body for `POST /futures/usdt/price_orders`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GatePriceOrderRequest {
    pub initial: GateTriggerInitial,
    pub trigger: GateTrigger,
}

/// Entry of `GET /futures/usdt/price_orders`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GatePriceOrder {
    pub id: i64,
    pub initial: GateTriggerInitial,
    pub trigger: GateTrigger,
    #[serde(default)]
    pub status: String,
}

/// Ack of order-creating endpoints (`{"id": ...}` shaped).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GateOrderId {
    pub id: i64,
}

/// Fill entry from `GET /futures/usdt/my_trades`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GateTrade {
    pub id: i64,
    pub order_id: String,
    pub contract: Ustr,
    /// Seconds since epoch, fractional.
    pub create_time: f64,
    /// Signed contract count; negative is short-side.
    pub size: i64,
    pub price: String,
    #[serde(default)]
    pub fee: String,
    /// Realized pnl attributed to this fill, when the venue provides it.
    #[serde(default)]
    pub pnl: String,
}

/// Entry of `GET /futures/usdt/position_close`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GatePositionClose {
    pub contract: Ustr,
    pub pnl: String,
    pub time: f64,
}

/// Ticker entry of `GET /futures/usdt/tickers`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GateTicker {
    pub contract: Ustr,
    pub last: String,
    #[serde(default)]
    pub mark_price: String,
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn trigger_rule_serializes_as_integer() {
        assert_eq!(
            serde_json::to_string(&GateTriggerRule::GreaterOrEqual).unwrap(),
            "1"
        );
        assert_eq!(
            serde_json::to_string(&GateTriggerRule::LessOrEqual).unwrap(),
            "2"
        );
    }

    #[rstest]
    fn price_order_request_shape() {
        let request = GatePriceOrderRequest {
            initial: GateTriggerInitial {
                contract: "BTC_USDT".to_string(),
                size: 0,
                price: "0".to_string(),
                tif: "ioc".to_string(),
                reduce_only: Some(true),
            },
            trigger: GateTrigger {
                strategy_type: 0,
                price_type: 1,
                price: "60000".to_string(),
                rule: GateTriggerRule::LessOrEqual,
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["trigger"]["strategy_type"], 0);
        assert_eq!(json["trigger"]["price_type"], 1);
        assert_eq!(json["trigger"]["rule"], 2);
        assert_eq!(json["initial"]["tif"], "ioc");
    }

    #[rstest]
    fn trade_deserializes_with_missing_pnl() {
        let raw = r#"{
            "id": 121234231,
            "order_id": "21893289839",
            "contract": "BTC_USDT",
            "create_time": 1514764800.123,
            "size": -100,
            "price": "100.123"
        }"#;
        let trade: GateTrade = serde_json::from_str(raw).unwrap();
        assert_eq!(trade.size, -100);
        assert_eq!(trade.pnl, "");
    }
}

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

//! Builder types for Bybit v5 REST query parameters and order payloads.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::common::enums::{
    BybitOrderFilter, BybitOrderSide, BybitOrderType, BybitPositionIdx, BybitPositionMode,
    BybitProductType, BybitTradeMode, BybitTriggerBy, BybitTriggerDirection,
};

/// Query parameters for `GET /v5/position/list`.
///
/// # References
/// - <https://bybit-exchange.github.io/docs/v5/position>
#[derive(Clone, Debug, Deserialize, Serialize, Default, Builder)]
#[serde(rename_all = "camelCase")]
#[builder(default, setter(into, strip_option))]
pub struct BybitPositionListParams {
    pub category: BybitProductType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settle_coin: Option<String>,
}

/// Query parameters for `GET /v5/execution/list`.
///
/// # References
/// - <https://bybit-exchange.github.io/docs/v5/order/execution>
#[derive(Clone, Debug, Deserialize, Serialize, Default, Builder)]
#[serde(rename_all = "camelCase")]
#[builder(default, setter(into, strip_option))]
pub struct BybitExecutionListParams {
    pub category: BybitProductType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

/// Query parameters for `GET /v5/position/closed-pnl`.
#[derive(Clone, Debug, Deserialize, Serialize, Default, Builder)]
#[serde(rename_all = "camelCase")]
#[builder(default, setter(into, strip_option))]
pub struct BybitClosedPnlParams {
    pub category: BybitProductType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// Query parameters for `GET /v5/order/realtime`.
#[derive(Clone, Debug, Deserialize, Serialize, Default, Builder)]
#[serde(rename_all = "camelCase")]
#[builder(default, setter(into, strip_option))]
pub struct BybitOpenOrdersParams {
    pub category: BybitProductType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_filter: Option<BybitOrderFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_only: Option<u32>,
}

/// Body for `POST /v5/order/create`.
///
/// # References
/// - <https://bybit-exchange.github.io/docs/v5/order/create-order>
#[derive(Clone, Debug, Deserialize, Serialize, Builder)]
#[serde(rename_all = "camelCase")]
#[builder(default, setter(into, strip_option))]
pub struct BybitPlaceOrderParams {
    pub category: BybitProductType,
    pub symbol: String,
    pub side: BybitOrderSide,
    pub order_type: BybitOrderType,
    pub qty: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_idx: Option<BybitPositionIdx>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_link_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reduce_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger_price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger_direction: Option<BybitTriggerDirection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger_by: Option<BybitTriggerBy>,
}

impl Default for BybitPlaceOrderParams {
    fn default() -> Self {
        Self {
            category: BybitProductType::Linear,
            symbol: String::new(),
            side: BybitOrderSide::Buy,
            order_type: BybitOrderType::Market,
            qty: String::new(),
            price: None,
            position_idx: None,
            order_link_id: None,
            reduce_only: None,
            trigger_price: None,
            trigger_direction: None,
            trigger_by: None,
        }
    }
}

/// Body for `POST /v5/order/cancel-all`.
#[derive(Clone, Debug, Deserialize, Serialize, Default, Builder)]
#[serde(rename_all = "camelCase")]
#[builder(default, setter(into, strip_option))]
pub struct BybitCancelAllParams {
    pub category: BybitProductType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_filter: Option<BybitOrderFilter>,
}

/// Body for `POST /v5/order/cancel`.
#[derive(Clone, Debug, Deserialize, Serialize, Default, Builder)]
#[serde(rename_all = "camelCase")]
#[builder(default, setter(into, strip_option))]
pub struct BybitCancelOrderParams {
    pub category: BybitProductType,
    pub symbol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_filter: Option<BybitOrderFilter>,
}

/// Body for `POST /v5/position/set-leverage`.
#[derive(Clone, Debug, Deserialize, Serialize, Default, Builder)]
#[serde(rename_all = "camelCase")]
#[builder(default, setter(into, strip_option))]
pub struct BybitSetLeverageParams {
    pub category: BybitProductType,
    pub symbol: String,
    pub buy_leverage: String,
    pub sell_leverage: String,
}

/// Body for `POST /v5/position/switch-isolated`.
#[derive(Clone, Debug, Deserialize, Serialize, Builder)]
#[serde(rename_all = "camelCase")]
#[builder(default, setter(into, strip_option))]
pub struct BybitSwitchIsolatedParams {
    pub category: BybitProductType,
    pub symbol: String,
    pub trade_mode: BybitTradeMode,
    pub buy_leverage: String,
    pub sell_leverage: String,
}

impl Default for BybitSwitchIsolatedParams {
    fn default() -> Self {
        Self {
            category: BybitProductType::Linear,
            symbol: String::new(),
            trade_mode: BybitTradeMode::Cross,
            buy_leverage: String::new(),
            sell_leverage: String::new(),
        }
    }
}

/// Body for `POST /v5/position/switch-mode`.
#[derive(Clone, Debug, Deserialize, Serialize, Builder)]
#[serde(rename_all = "camelCase")]
#[builder(default, setter(into, strip_option))]
pub struct BybitSwitchModeParams {
    pub category: BybitProductType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coin: Option<String>,
    pub mode: BybitPositionMode,
}

impl Default for BybitSwitchModeParams {
    fn default() -> Self {
        Self {
            category: BybitProductType::Linear,
            symbol: None,
            coin: None,
            mode: BybitPositionMode::BothSides,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn position_list_query_encoding() {
        let params = BybitPositionListParamsBuilder::default()
            .settle_coin("USDT")
            .build()
            .unwrap();
        let query = serde_urlencoded::to_string(&params).unwrap();
        assert_eq!(query, "category=linear&settleCoin=USDT");
    }

    #[rstest]
    fn place_order_body_skips_absent_fields() {
        let params = BybitPlaceOrderParamsBuilder::default()
            .symbol("BTCUSDT")
            .side(BybitOrderSide::Buy)
            .order_type(BybitOrderType::Market)
            .qty("0.05")
            .position_idx(BybitPositionIdx::BuyHedge)
            .build()
            .unwrap();
        let body = serde_json::to_value(&params).unwrap();
        assert_eq!(body["positionIdx"], 1);
        assert!(body.get("triggerPrice").is_none());
        assert!(body.get("reduceOnly").is_none());
    }
}

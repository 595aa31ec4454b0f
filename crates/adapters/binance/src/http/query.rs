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

//! Builder types for Binance futures query parameters.
//!
//! All parameters, including those of POST endpoints, travel in the signed
//! query string; `timestamp`, `recvWindow`, and `signature` are appended by
//! the client.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::common::enums::{
    BinanceIncomeType, BinanceMarginType, BinanceOrderSide, BinanceOrderType, BinancePositionSide,
    BinanceWorkingType,
};

/// Parameters for `POST /fapi/v1/order`.
///
/// # References
/// - <https://developers.binance.com/docs/derivatives/usds-margined-futures/trade/rest-api/New-Order>
#[derive(Clone, Debug, Deserialize, Serialize, Builder)]
#[serde(rename_all = "camelCase")]
#[builder(default, setter(into, strip_option))]
pub struct BinanceOrderParams {
    pub symbol: String,
    pub side: BinanceOrderSide,
    pub position_side: BinancePositionSide,
    #[serde(rename = "type")]
    pub order_type: BinanceOrderType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close_position: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_type: Option<BinanceWorkingType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_client_order_id: Option<String>,
}

impl Default for BinanceOrderParams {
    fn default() -> Self {
        Self {
            symbol: String::new(),
            side: BinanceOrderSide::Buy,
            position_side: BinancePositionSide::Both,
            order_type: BinanceOrderType::Market,
            quantity: None,
            stop_price: None,
            close_position: None,
            working_type: None,
            new_client_order_id: None,
        }
    }
}

/// Parameters for `POST /fapi/v1/algoOrder` (conditional orders).
#[derive(Clone, Debug, Deserialize, Serialize, Builder)]
#[serde(rename_all = "camelCase")]
#[builder(default, setter(into, strip_option))]
pub struct BinanceAlgoOrderParams {
    pub symbol: String,
    pub side: BinanceOrderSide,
    pub position_side: BinancePositionSide,
    pub algo_type: BinanceOrderType,
    pub trigger_price: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close_position: Option<bool>,
    pub working_type: BinanceWorkingType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_algo_id: Option<String>,
}

impl Default for BinanceAlgoOrderParams {
    fn default() -> Self {
        Self {
            symbol: String::new(),
            side: BinanceOrderSide::Buy,
            position_side: BinancePositionSide::Both,
            algo_type: BinanceOrderType::StopMarket,
            trigger_price: String::new(),
            quantity: None,
            close_position: None,
            working_type: BinanceWorkingType::MarkPrice,
            client_algo_id: None,
        }
    }
}

/// Parameters for `GET /fapi/v1/userTrades`.
#[derive(Clone, Debug, Default, Deserialize, Serialize, Builder)]
#[serde(rename_all = "camelCase")]
#[builder(default, setter(into, strip_option))]
pub struct BinanceUserTradesParams {
    pub symbol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// Parameters for `GET /fapi/v1/income`.
#[derive(Clone, Debug, Deserialize, Serialize, Builder)]
#[serde(rename_all = "camelCase")]
#[builder(default, setter(into, strip_option))]
pub struct BinanceIncomeParams {
    pub income_type: BinanceIncomeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl Default for BinanceIncomeParams {
    fn default() -> Self {
        Self {
            income_type: BinanceIncomeType::Commission,
            start_time: None,
            limit: None,
        }
    }
}

/// Parameters for `POST /fapi/v1/leverage`.
#[derive(Clone, Debug, Default, Deserialize, Serialize, Builder)]
#[serde(rename_all = "camelCase")]
#[builder(default, setter(into))]
pub struct BinanceLeverageParams {
    pub symbol: String,
    pub leverage: u32,
}

/// Parameters for `POST /fapi/v1/marginType`.
#[derive(Clone, Debug, Deserialize, Serialize, Builder)]
#[serde(rename_all = "camelCase")]
#[builder(default, setter(into))]
pub struct BinanceMarginTypeParams {
    pub symbol: String,
    pub margin_type: BinanceMarginType,
}

impl Default for BinanceMarginTypeParams {
    fn default() -> Self {
        Self {
            symbol: String::new(),
            margin_type: BinanceMarginType::Crossed,
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
    fn order_params_encode_in_declaration_order() {
        let params = BinanceOrderParamsBuilder::default()
            .symbol("BTCUSDT")
            .side(BinanceOrderSide::Buy)
            .position_side(BinancePositionSide::Long)
            .order_type(BinanceOrderType::Market)
            .quantity("0.05")
            .new_client_order_id("x-omnitag1-1")
            .build()
            .unwrap();
        let query = serde_urlencoded::to_string(&params).unwrap();
        assert_eq!(
            query,
            "symbol=BTCUSDT&side=BUY&positionSide=LONG&type=MARKET&quantity=0.05\
             &newClientOrderId=x-omnitag1-1"
        );
    }

    #[rstest]
    fn algo_order_params_carry_trigger() {
        let params = BinanceAlgoOrderParamsBuilder::default()
            .symbol("ETHUSDT")
            .side(BinanceOrderSide::Sell)
            .position_side(BinancePositionSide::Long)
            .algo_type(BinanceOrderType::StopMarket)
            .trigger_price("3400")
            .close_position(true)
            .build()
            .unwrap();
        let query = serde_urlencoded::to_string(&params).unwrap();
        assert!(query.contains("algoType=STOP_MARKET"));
        assert!(query.contains("triggerPrice=3400"));
        assert!(query.contains("closePosition=true"));
        assert!(query.contains("workingType=MARK_PRICE"));
    }
}

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

//! `/info` request bodies and `/exchange` action wire types.
//!
//! Action structs declare fields in the exact order the venue's MessagePack
//! hash expects, `type` first. Reordering a field silently changes the
//! action hash and the venue rejects the signature.

use serde::{Deserialize, Serialize};

/// Body of a `POST /info` request.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoRequest {
    #[serde(rename = "type")]
    pub request_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oid: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<i64>,
}

impl InfoRequest {
    fn bare(request_type: &'static str) -> Self {
        Self {
            request_type,
            user: None,
            dex: None,
            oid: None,
            start_time: None,
        }
    }

    /// `{type: "meta", dex?}`: the per-dex precision table.
    #[must_use]
    pub fn meta(dex: Option<&str>) -> Self {
        Self {
            dex: dex.map(str::to_string),
            ..Self::bare("meta")
        }
    }

    /// `{type: "perpDexs"}`: the HIP-3 dex directory.
    #[must_use]
    pub fn perp_dexs() -> Self {
        Self::bare("perpDexs")
    }

    /// `{type: "clearinghouseState", user, dex?}`: account state.
    #[must_use]
    pub fn clearinghouse_state(user: &str, dex: Option<&str>) -> Self {
        Self {
            user: Some(user.to_string()),
            dex: dex.map(str::to_string),
            ..Self::bare("clearinghouseState")
        }
    }

    /// `{type: "allMids", dex?}`: mid prices by coin.
    #[must_use]
    pub fn all_mids(dex: Option<&str>) -> Self {
        Self {
            dex: dex.map(str::to_string),
            ..Self::bare("allMids")
        }
    }

    /// `{type: "userFillsByTime", user, startTime}`: fills since a time.
    #[must_use]
    pub fn user_fills_by_time(user: &str, start_time_ms: i64) -> Self {
        Self {
            user: Some(user.to_string()),
            start_time: Some(start_time_ms),
            ..Self::bare("userFillsByTime")
        }
    }

    /// `{type: "frontendOpenOrders", user, dex?}`: open orders incl. triggers.
    #[must_use]
    pub fn frontend_open_orders(user: &str, dex: Option<&str>) -> Self {
        Self {
            user: Some(user.to_string()),
            dex: dex.map(str::to_string),
            ..Self::bare("frontendOpenOrders")
        }
    }

    /// `{type: "orderStatus", user, oid}`.
    #[must_use]
    pub fn order_status(user: &str, oid: u64) -> Self {
        Self {
            user: Some(user.to_string()),
            oid: Some(oid),
            ..Self::bare("orderStatus")
        }
    }
}

// -------------------------------------------------------------------------------------------------
// Exchange actions
// -------------------------------------------------------------------------------------------------

/// Limit leg of an order type.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LimitWire {
    pub tif: String,
}

/// Trigger leg of an order type.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerWire {
    pub trigger_px: String,
    pub is_market: bool,
    pub tpsl: String,
}

/// Order type wire form: `{"limit": {...}}` or `{"trigger": {...}}`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OrderTypeWire {
    Limit(LimitWire),
    Trigger(TriggerWire),
}

impl OrderTypeWire {
    /// Immediate-or-cancel limit, the venue's market-order idiom.
    #[must_use]
    pub fn ioc() -> Self {
        Self::Limit(LimitWire {
            tif: "Ioc".to_string(),
        })
    }

    /// Market trigger order; `tpsl` is `"sl"` or `"tp"`.
    #[must_use]
    pub fn trigger_market(trigger_px: impl Into<String>, tpsl: impl Into<String>) -> Self {
        Self::Trigger(TriggerWire {
            trigger_px: trigger_px.into(),
            is_market: true,
            tpsl: tpsl.into(),
        })
    }
}

/// One order in an order action; single-letter keys are the wire protocol.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OrderWire {
    #[serde(rename = "a")]
    pub asset: u32,
    #[serde(rename = "b")]
    pub is_buy: bool,
    #[serde(rename = "p")]
    pub limit_px: String,
    #[serde(rename = "s")]
    pub size: String,
    #[serde(rename = "r")]
    pub reduce_only: bool,
    #[serde(rename = "t")]
    pub order_type: OrderTypeWire,
}

/// `{"type": "order", "orders": [...], "grouping": "na"}`.
#[derive(Clone, Debug, Serialize)]
pub struct OrderAction {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub orders: Vec<OrderWire>,
    pub grouping: &'static str,
}

impl OrderAction {
    /// Builds an ungrouped order action.
    #[must_use]
    pub fn new(orders: Vec<OrderWire>) -> Self {
        Self {
            kind: "order",
            orders,
            grouping: "na",
        }
    }
}

/// One cancel in a cancel action.
#[derive(Clone, Debug, Serialize)]
pub struct CancelWire {
    #[serde(rename = "a")]
    pub asset: u32,
    #[serde(rename = "o")]
    pub oid: u64,
}

/// `{"type": "cancel", "cancels": [...]}`.
#[derive(Clone, Debug, Serialize)]
pub struct CancelAction {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub cancels: Vec<CancelWire>,
}

impl CancelAction {
    /// Builds a cancel action.
    #[must_use]
    pub fn new(cancels: Vec<CancelWire>) -> Self {
        Self {
            kind: "cancel",
            cancels,
        }
    }
}

/// `{"type": "updateLeverage", "asset", "isCross", "leverage"}`.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLeverageAction {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub asset: u32,
    pub is_cross: bool,
    pub leverage: u32,
}

impl UpdateLeverageAction {
    /// Builds a leverage update.
    #[must_use]
    pub fn new(asset: u32, is_cross: bool, leverage: u32) -> Self {
        Self {
            kind: "updateLeverage",
            asset,
            is_cross,
            leverage,
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
    fn info_request_shapes() {
        let meta = serde_json::to_value(InfoRequest::meta(Some("xyz"))).unwrap();
        assert_eq!(meta, serde_json::json!({"type": "meta", "dex": "xyz"}));

        let state =
            serde_json::to_value(InfoRequest::clearinghouse_state("0xabc", Some("xyz"))).unwrap();
        assert_eq!(
            state,
            serde_json::json!({"type": "clearinghouseState", "user": "0xabc", "dex": "xyz"})
        );
    }

    #[rstest]
    fn order_action_wire_shape() {
        let action = OrderAction::new(vec![OrderWire {
            asset: 100_001,
            is_buy: true,
            limit_px: "245.53".to_string(),
            size: "1.5".to_string(),
            reduce_only: false,
            order_type: OrderTypeWire::ioc(),
        }]);
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["type"], "order");
        assert_eq!(json["grouping"], "na");
        assert_eq!(json["orders"][0]["a"], 100_001);
        assert_eq!(json["orders"][0]["t"]["limit"]["tif"], "Ioc");
    }

    #[rstest]
    fn trigger_wire_shape() {
        let t = OrderTypeWire::trigger_market("3400", "sl");
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json["trigger"]["triggerPx"], "3400");
        assert_eq!(json["trigger"]["isMarket"], true);
        assert_eq!(json["trigger"]["tpsl"], "sl");
    }

    #[rstest]
    fn json_field_order_is_declaration_order() {
        let action = UpdateLeverageAction::new(3, true, 10);
        let rendered = serde_json::to_string(&action).unwrap();
        assert_eq!(
            rendered,
            r#"{"type":"updateLeverage","asset":3,"isCross":true,"leverage":10}"#
        );
    }
}

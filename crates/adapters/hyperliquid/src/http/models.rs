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

//! Response payloads for the `/info` and `/exchange` endpoints.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Per-dex precision table from `{type: "meta"}`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HlMeta {
    pub universe: Vec<HlAssetMeta>,
}

/// One asset in the meta universe; the position in the list is the asset's
/// `meta_index`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HlAssetMeta {
    pub name: String,
    pub sz_decimals: u32,
    #[serde(default)]
    pub max_leverage: Option<u32>,
}

/// One entry of `{type: "perpDexs"}`; the base dex is reported as `null` at
/// index zero, so the response is a list of options.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HlPerpDex {
    pub name: String,
}

/// Account state from `{type: "clearinghouseState"}`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HlClearinghouseState {
    pub margin_summary: HlMarginSummary,
    #[serde(default)]
    pub withdrawable: String,
    #[serde(default)]
    pub asset_positions: Vec<HlAssetPosition>,
}

/// Margin summary of the clearinghouse state.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HlMarginSummary {
    pub account_value: String,
    #[serde(default)]
    pub total_margin_used: String,
}

/// Wrapper around one position entry.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HlAssetPosition {
    pub position: HlPosition,
}

/// One open position; `szi` is signed (negative = short).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HlPosition {
    pub coin: String,
    pub szi: String,
    #[serde(default)]
    pub entry_px: Option<String>,
    #[serde(default)]
    pub unrealized_pnl: String,
    #[serde(default)]
    pub liquidation_px: Option<String>,
    #[serde(default)]
    pub leverage: Option<HlLeverage>,
}

/// Leverage descriptor on a position.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HlLeverage {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: u32,
}

/// Mid prices by coin from `{type: "allMids"}`.
pub type HlAllMids = HashMap<String, String>;

/// One fill from `{type: "userFillsByTime"}`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HlFill {
    pub coin: String,
    pub px: String,
    pub sz: String,
    /// "B" buys, "A" sells.
    pub side: String,
    pub time: i64,
    /// Explicit direction: "Open Long", "Close Short", "Long > Short", ...
    #[serde(default)]
    pub dir: String,
    #[serde(default)]
    pub closed_pnl: String,
    pub oid: u64,
    #[serde(default)]
    pub fee: String,
    pub tid: u64,
}

/// One open order from `{type: "frontendOpenOrders"}`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HlOpenOrder {
    pub coin: String,
    pub oid: u64,
    /// "B" buys, "A" sells.
    pub side: String,
    pub limit_px: String,
    pub sz: String,
    #[serde(default)]
    pub orig_sz: String,
    #[serde(default)]
    pub order_type: String,
    #[serde(default)]
    pub trigger_px: String,
    #[serde(default)]
    pub is_trigger: bool,
    #[serde(default)]
    pub reduce_only: bool,
}

/// Response of `{type: "orderStatus"}`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HlOrderStatusResponse {
    /// "order" when found, "unknownOid" otherwise.
    pub status: String,
    #[serde(default)]
    pub order: Option<HlOrderStatusEntry>,
}

/// Found-order wrapper with its lifecycle status.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HlOrderStatusEntry {
    pub order: HlBasicOrder,
    /// "open", "filled", "canceled", "rejected", ...
    pub status: String,
}

/// Core order fields inside an order-status response.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HlBasicOrder {
    pub coin: String,
    pub oid: u64,
    pub side: String,
    #[serde(default)]
    pub limit_px: String,
    #[serde(default)]
    pub sz: String,
    #[serde(default)]
    pub orig_sz: String,
}

/// Response envelope of `POST /exchange`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HlExchangeResponse {
    /// "ok" or "err".
    pub status: String,
    #[serde(default)]
    pub response: Option<serde_json::Value>,
}

impl HlExchangeResponse {
    /// First per-order status object, when present.
    #[must_use]
    pub fn first_status(&self) -> Option<&serde_json::Value> {
        self.response
            .as_ref()?
            .get("data")?
            .get("statuses")?
            .get(0)
    }

    /// Resting or filled order id from the first status, when present.
    #[must_use]
    pub fn first_oid(&self) -> Option<u64> {
        let status = self.first_status()?;
        status
            .get("resting")
            .or_else(|| status.get("filled"))?
            .get("oid")?
            .as_u64()
    }

    /// Per-order error message from the first status, when present.
    #[must_use]
    pub fn first_error(&self) -> Option<String> {
        self.first_status()?
            .get("error")?
            .as_str()
            .map(str::to_string)
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
    fn fill_deserializes() {
        let raw = r#"{
            "coin": "ETH",
            "px": "3600.0",
            "sz": "0.1",
            "side": "A",
            "time": 1704470400123,
            "startPosition": "0.1",
            "dir": "Close Long",
            "closedPnl": "10.0",
            "hash": "0xabc",
            "oid": 7,
            "crossed": true,
            "fee": "0.5",
            "tid": 1234567890
        }"#;
        let fill: HlFill = serde_json::from_str(raw).unwrap();
        assert_eq!(fill.dir, "Close Long");
        assert_eq!(fill.tid, 1_234_567_890);
    }

    #[rstest]
    fn exchange_response_extracts_oid_and_error() {
        let ok: HlExchangeResponse = serde_json::from_str(
            r#"{"status":"ok","response":{"type":"order","data":{"statuses":[{"resting":{"oid":77}}]}}}"#,
        )
        .unwrap();
        assert_eq!(ok.first_oid(), Some(77));
        assert_eq!(ok.first_error(), None);

        let filled: HlExchangeResponse = serde_json::from_str(
            r#"{"status":"ok","response":{"type":"order","data":{"statuses":[{"filled":{"oid":88,"totalSz":"0.1","avgPx":"3500"}}]}}}"#,
        )
        .unwrap();
        assert_eq!(filled.first_oid(), Some(88));

        let err: HlExchangeResponse = serde_json::from_str(
            r#"{"status":"ok","response":{"type":"order","data":{"statuses":[{"error":"Order must have minimum value of $10"}]}}}"#,
        )
        .unwrap();
        assert!(err.first_error().unwrap().contains("minimum value"));
    }

    #[rstest]
    fn perp_dexs_parse_with_null_base() {
        let raw = r#"[null, {"name": "xyz", "full_name": "XYZ markets"}]"#;
        let dexs: Vec<Option<HlPerpDex>> = serde_json::from_str(raw).unwrap();
        assert!(dexs[0].is_none());
        assert_eq!(dexs[1].as_ref().unwrap().name, "xyz");
    }
}

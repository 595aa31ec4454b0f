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

//! Enumerations modelling Bybit v5 string/int enums used on the REST path.

use omniperp_core::models::{OrderStatus, PositionSide, TradeSide};
use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};
use strum::{AsRefStr, Display, EnumString};

/// Product category; this adapter only trades USDT-margined linear contracts.
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    Display,
    PartialEq,
    Eq,
    Hash,
    AsRefStr,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BybitProductType {
    #[default]
    Linear,
}

/// Order side.
#[derive(
    Copy, Clone, Debug, Display, PartialEq, Eq, Hash, AsRefStr, EnumString, Serialize, Deserialize,
)]
pub enum BybitOrderSide {
    Buy,
    Sell,
}

impl From<TradeSide> for BybitOrderSide {
    fn from(side: TradeSide) -> Self {
        match side {
            TradeSide::Buy => Self::Buy,
            TradeSide::Sell => Self::Sell,
        }
    }
}

impl From<BybitOrderSide> for TradeSide {
    fn from(side: BybitOrderSide) -> Self {
        match side {
            BybitOrderSide::Buy => Self::Buy,
            BybitOrderSide::Sell => Self::Sell,
        }
    }
}

/// Order type.
#[derive(
    Copy, Clone, Debug, Display, PartialEq, Eq, Hash, AsRefStr, EnumString, Serialize, Deserialize,
)]
pub enum BybitOrderType {
    Market,
    Limit,
}

/// Position index for hedge-mode payloads.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum BybitPositionIdx {
    /// One-way mode position identifier.
    OneWay = 0,
    /// Buy side of a hedge-mode position.
    BuyHedge = 1,
    /// Sell side of a hedge-mode position.
    SellHedge = 2,
}

impl BybitPositionIdx {
    /// Maps a position side to the hedge-mode index.
    #[must_use]
    pub fn from_position_side(side: PositionSide) -> Self {
        match side {
            PositionSide::Long => Self::BuyHedge,
            PositionSide::Short => Self::SellHedge,
            PositionSide::Both => Self::OneWay,
        }
    }

    /// Maps back to the canonical position side.
    #[must_use]
    pub fn position_side(self) -> PositionSide {
        match self {
            Self::OneWay => PositionSide::Both,
            Self::BuyHedge => PositionSide::Long,
            Self::SellHedge => PositionSide::Short,
        }
    }
}

/// Trade mode used when switching margin modes.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum BybitTradeMode {
    Cross = 0,
    Isolated = 1,
}

/// Position mode as accepted by `position/switch-mode`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum BybitPositionMode {
    MergedSingle = 0,
    BothSides = 3,
}

/// Trigger direction for conditional orders.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum BybitTriggerDirection {
    /// Triggers when the price rises to the trigger price.
    RisesTo = 1,
    /// Triggers when the price falls to the trigger price.
    FallsTo = 2,
}

/// Price type a conditional order triggers against.
#[derive(
    Copy, Clone, Debug, Display, PartialEq, Eq, Hash, AsRefStr, EnumString, Serialize, Deserialize,
)]
pub enum BybitTriggerBy {
    LastPrice,
    MarkPrice,
    IndexPrice,
}

/// Order status strings returned by the v5 API.
#[derive(
    Copy, Clone, Debug, Display, PartialEq, Eq, Hash, AsRefStr, EnumString, Serialize, Deserialize,
)]
pub enum BybitOrderStatus {
    New,
    PartiallyFilled,
    Untriggered,
    Filled,
    Cancelled,
    Rejected,
    Triggered,
    Deactivated,
    PartiallyFilledCanceled,
}

impl From<BybitOrderStatus> for OrderStatus {
    fn from(status: BybitOrderStatus) -> Self {
        match status {
            BybitOrderStatus::New | BybitOrderStatus::Untriggered | BybitOrderStatus::Triggered => {
                Self::New
            }
            BybitOrderStatus::PartiallyFilled => Self::PartiallyFilled,
            BybitOrderStatus::Filled => Self::Filled,
            BybitOrderStatus::Cancelled
            | BybitOrderStatus::Deactivated
            | BybitOrderStatus::PartiallyFilledCanceled => Self::Canceled,
            BybitOrderStatus::Rejected => Self::Rejected,
        }
    }
}

/// Stop-order kind attached to conditional orders.
#[derive(
    Copy, Clone, Debug, Display, PartialEq, Eq, Hash, AsRefStr, EnumString, Serialize, Deserialize,
)]
pub enum BybitStopOrderType {
    Stop,
    TakeProfit,
    StopLoss,
    TrailingStop,
    PartialTakeProfit,
    PartialStopLoss,
    #[serde(rename = "tpslOrder")]
    #[strum(serialize = "tpslOrder")]
    TpslOrder,
}

/// Order filter distinguishing regular from conditional orders.
#[derive(
    Copy, Clone, Debug, Display, PartialEq, Eq, Hash, AsRefStr, EnumString, Serialize, Deserialize,
)]
pub enum BybitOrderFilter {
    Order,
    StopOrder,
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn position_idx_round_trips() {
        for side in [PositionSide::Long, PositionSide::Short, PositionSide::Both] {
            assert_eq!(
                BybitPositionIdx::from_position_side(side).position_side(),
                side
            );
        }
    }

    #[rstest]
    fn position_idx_serializes_as_integer() {
        let json = serde_json::to_string(&BybitPositionIdx::SellHedge).unwrap();
        assert_eq!(json, "2");
    }

    #[rstest]
    fn order_status_mapping() {
        assert_eq!(
            OrderStatus::from(BybitOrderStatus::PartiallyFilledCanceled),
            OrderStatus::Canceled
        );
        assert_eq!(OrderStatus::from(BybitOrderStatus::Untriggered), OrderStatus::New);
    }
}

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

//! Enumerations modelling Binance futures string enums on the REST path.

use omniperp_core::models::{OrderStatus, PositionSide, TradeSide};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Order side.
#[derive(
    Copy, Clone, Debug, Display, PartialEq, Eq, Hash, AsRefStr, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum BinanceOrderSide {
    Buy,
    Sell,
}

impl From<TradeSide> for BinanceOrderSide {
    fn from(side: TradeSide) -> Self {
        match side {
            TradeSide::Buy => Self::Buy,
            TradeSide::Sell => Self::Sell,
        }
    }
}

impl From<BinanceOrderSide> for TradeSide {
    fn from(side: BinanceOrderSide) -> Self {
        match side {
            BinanceOrderSide::Buy => Self::Buy,
            BinanceOrderSide::Sell => Self::Sell,
        }
    }
}

/// Position side in dual-side (hedge) mode.
#[derive(
    Copy, Clone, Debug, Display, PartialEq, Eq, Hash, AsRefStr, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum BinancePositionSide {
    Long,
    Short,
    Both,
}

impl From<PositionSide> for BinancePositionSide {
    fn from(side: PositionSide) -> Self {
        match side {
            PositionSide::Long => Self::Long,
            PositionSide::Short => Self::Short,
            PositionSide::Both => Self::Both,
        }
    }
}

impl From<BinancePositionSide> for PositionSide {
    fn from(side: BinancePositionSide) -> Self {
        match side {
            BinancePositionSide::Long => Self::Long,
            BinancePositionSide::Short => Self::Short,
            BinancePositionSide::Both => Self::Both,
        }
    }
}

/// Order types used by this adapter.
#[derive(
    Copy, Clone, Debug, Display, PartialEq, Eq, Hash, AsRefStr, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum BinanceOrderType {
    Market,
    Limit,
    StopMarket,
    TakeProfitMarket,
}

/// Margin type accepted by `POST /fapi/v1/marginType`.
#[derive(
    Copy, Clone, Debug, Display, PartialEq, Eq, Hash, AsRefStr, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum BinanceMarginType {
    Isolated,
    Crossed,
}

/// Income record kinds used by the sync-discovery probes.
#[derive(
    Copy, Clone, Debug, Display, PartialEq, Eq, Hash, AsRefStr, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum BinanceIncomeType {
    Commission,
    RealizedPnl,
    FundingFee,
}

/// Working price type for trigger orders.
#[derive(
    Copy, Clone, Debug, Display, PartialEq, Eq, Hash, AsRefStr, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum BinanceWorkingType {
    MarkPrice,
    ContractPrice,
}

/// Order status strings returned by the futures API.
#[derive(
    Copy, Clone, Debug, Display, PartialEq, Eq, Hash, AsRefStr, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum BinanceOrderStatus {
    New,
    PartiallyFilled,
    Filled,
    Canceled,
    Rejected,
    Expired,
    ExpiredInMatch,
}

impl From<BinanceOrderStatus> for OrderStatus {
    fn from(status: BinanceOrderStatus) -> Self {
        match status {
            BinanceOrderStatus::New => Self::New,
            BinanceOrderStatus::PartiallyFilled => Self::PartiallyFilled,
            BinanceOrderStatus::Filled => Self::Filled,
            BinanceOrderStatus::Canceled => Self::Canceled,
            BinanceOrderStatus::Rejected => Self::Rejected,
            BinanceOrderStatus::Expired | BinanceOrderStatus::ExpiredInMatch => Self::Expired,
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
    fn order_type_serializes_screaming_snake() {
        assert_eq!(BinanceOrderType::StopMarket.to_string(), "STOP_MARKET");
        assert_eq!(
            BinanceOrderType::TakeProfitMarket.to_string(),
            "TAKE_PROFIT_MARKET"
        );
    }

    #[rstest]
    fn position_side_round_trips() {
        for side in [PositionSide::Long, PositionSide::Short, PositionSide::Both] {
            assert_eq!(PositionSide::from(BinancePositionSide::from(side)), side);
        }
    }

    #[rstest]
    fn income_type_strings() {
        assert_eq!(BinanceIncomeType::Commission.to_string(), "COMMISSION");
        assert_eq!(BinanceIncomeType::RealizedPnl.to_string(), "REALIZED_PNL");
    }
}

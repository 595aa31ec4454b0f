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

//! Canonical result shapes returned by every venue adapter.
//!
//! Adapters convert venue payloads into these records at their boundary; the
//! heterogeneous string-keyed maps of the venue protocols never leak past it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::symbol::Symbol;

/// Identifies a supported venue.
#[derive(
    Copy,
    Clone,
    Debug,
    Display,
    PartialEq,
    Eq,
    Hash,
    AsRefStr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ExchangeId {
    Binance,
    Bybit,
    Gateio,
    Hyperliquid,
}

/// Taker/maker side of a fill or order.
#[derive(
    Copy,
    Clone,
    Debug,
    Display,
    PartialEq,
    Eq,
    Hash,
    AsRefStr,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    /// Returns the opposite side.
    #[must_use]
    pub fn inverse(self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }
}

/// Position side in hedge (dual-side) accounting; `Both` is one-way mode.
#[derive(
    Copy,
    Clone,
    Debug,
    Display,
    PartialEq,
    Eq,
    Hash,
    AsRefStr,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum PositionSide {
    Long,
    Short,
    Both,
}

/// The effect of a fill on position state.
#[derive(
    Copy,
    Clone,
    Debug,
    Display,
    PartialEq,
    Eq,
    Hash,
    AsRefStr,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OrderAction {
    OpenLong,
    OpenShort,
    CloseLong,
    CloseShort,
}

impl OrderAction {
    /// Whether this action reduces an existing position.
    #[must_use]
    pub fn is_close(self) -> bool {
        matches!(self, Self::CloseLong | Self::CloseShort)
    }

    /// The position side this action applies to.
    #[must_use]
    pub fn position_side(self) -> PositionSide {
        match self {
            Self::OpenLong | Self::CloseLong => PositionSide::Long,
            Self::OpenShort | Self::CloseShort => PositionSide::Short,
        }
    }

    /// Parses an explicit venue direction string such as Hyperliquid's
    /// `"Open Long"` / `"Close Short"` fill annotations.
    #[must_use]
    pub fn from_venue_dir(dir: &str) -> Option<Self> {
        match dir.trim() {
            "Open Long" => Some(Self::OpenLong),
            "Open Short" => Some(Self::OpenShort),
            "Close Long" => Some(Self::CloseLong),
            "Close Short" => Some(Self::CloseShort),
            // Flips are reported as e.g. "Long > Short"; treat as a close of
            // the leading side, the opening leg arrives as its own fill.
            "Long > Short" => Some(Self::CloseLong),
            "Short > Long" => Some(Self::CloseShort),
            _ => None,
        }
    }
}

/// Unified order status across regular and algo/trigger orders.
#[derive(
    Copy,
    Clone,
    Debug,
    Display,
    PartialEq,
    Eq,
    Hash,
    AsRefStr,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    New,
    PartiallyFilled,
    Filled,
    Canceled,
    Rejected,
    Expired,
    Unknown,
}

/// Unified order type across regular and algo/trigger orders.
#[derive(
    Copy,
    Clone,
    Debug,
    Display,
    PartialEq,
    Eq,
    Hash,
    AsRefStr,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderKind {
    Market,
    Limit,
    StopMarket,
    TakeProfitMarket,
}

/// Margin mode for a symbol.
#[derive(
    Copy,
    Clone,
    Debug,
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
pub enum MarginMode {
    Cross,
    Isolated,
}

/// Account balance snapshot, derived uniformly across venues.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSnapshot {
    pub wallet_balance: Decimal,
    pub available_balance: Decimal,
    pub unrealized_pnl: Decimal,
    /// Always `wallet_balance + unrealized_pnl`.
    pub total_equity: Decimal,
}

impl BalanceSnapshot {
    /// Builds a snapshot, deriving `total_equity`.
    #[must_use]
    pub fn new(wallet_balance: Decimal, available_balance: Decimal, unrealized_pnl: Decimal) -> Self {
        Self {
            wallet_balance,
            available_balance,
            unrealized_pnl,
            total_equity: wallet_balance + unrealized_pnl,
        }
    }
}

/// An open position; zero-quantity rows are filtered before this is built.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionSnapshot {
    pub symbol: Symbol,
    pub side: PositionSide,
    pub quantity: Decimal,
    pub entry_price: Decimal,
    pub mark_price: Decimal,
    pub unrealized_pnl: Decimal,
    pub leverage: u32,
    pub liquidation_price: Option<Decimal>,
}

/// A pending order, unifying regular and algo/trigger/conditional orders.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenOrder {
    pub order_id: String,
    pub symbol: Symbol,
    pub side: TradeSide,
    pub position_side: PositionSide,
    pub order_type: OrderKind,
    pub price: Option<Decimal>,
    pub stop_price: Option<Decimal>,
    pub quantity: Decimal,
    pub status: OrderStatus,
}

impl OpenOrder {
    /// Whether this is a trigger (stop-loss / take-profit) order.
    #[must_use]
    pub fn is_trigger(&self) -> bool {
        matches!(
            self.order_type,
            OrderKind::StopMarket | OrderKind::TakeProfitMarket
        )
    }
}

/// A single fill as reported by the venue.
///
/// `trade_id` is the venue's fill id; `(exchange_id, trade_id)` is the
/// idempotency key used by the sync engine and the store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeRecord {
    pub trade_id: String,
    pub order_id: String,
    pub symbol: Symbol,
    pub side: TradeSide,
    pub position_side: PositionSide,
    /// Explicit venue direction, when provided (Hyperliquid `dir`).
    pub order_action: Option<OrderAction>,
    pub price: Decimal,
    pub quantity: Decimal,
    pub realized_pnl: Decimal,
    pub fee: Decimal,
    pub time_ms: i64,
}

/// A closed-trade projection of [`TradeRecord`] where `realized_pnl != 0`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosedPnlRecord {
    pub symbol: Symbol,
    pub side: PositionSide,
    pub quantity: Decimal,
    pub entry_price: Decimal,
    pub exit_price: Decimal,
    pub realized_pnl: Decimal,
    pub time_ms: i64,
}

impl ClosedPnlRecord {
    /// Back-calculates the entry price from an exit fill, since venues do not
    /// return the opening leg: `entry = exit ∓ pnl/qty` depending on side.
    #[must_use]
    pub fn from_exit_fill(
        symbol: Symbol,
        side: PositionSide,
        quantity: Decimal,
        exit_price: Decimal,
        realized_pnl: Decimal,
        time_ms: i64,
    ) -> Self {
        let per_unit = if quantity.is_zero() {
            Decimal::ZERO
        } else {
            realized_pnl / quantity
        };
        let entry_price = match side {
            // Long profit means exit above entry.
            PositionSide::Long | PositionSide::Both => exit_price - per_unit,
            PositionSide::Short => exit_price + per_unit,
        };
        Self {
            symbol,
            side,
            quantity,
            entry_price,
            exit_price,
            realized_pnl,
            time_ms,
        }
    }
}

/// Acknowledgement returned by order placement and cancellation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderAck {
    pub order_id: String,
    pub client_order_id: Option<String>,
    pub symbol: Symbol,
    pub status: OrderStatus,
}

/// Order status report including fill progress.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusReport {
    pub order_id: String,
    pub symbol: Symbol,
    pub status: OrderStatus,
    pub filled_quantity: Decimal,
    pub average_price: Option<Decimal>,
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use rust_decimal_macros::dec;

    use super::*;

    #[rstest]
    fn balance_derives_total_equity() {
        let b = BalanceSnapshot::new(dec!(1000), dec!(800), dec!(-25.5));
        assert_eq!(b.total_equity, dec!(974.5));
    }

    #[rstest]
    #[case("Open Long", Some(OrderAction::OpenLong))]
    #[case("Close Short", Some(OrderAction::CloseShort))]
    #[case("Long > Short", Some(OrderAction::CloseLong))]
    #[case("Buy", None)]
    fn venue_dir_parsing(#[case] dir: &str, #[case] expected: Option<OrderAction>) {
        assert_eq!(OrderAction::from_venue_dir(dir), expected);
    }

    #[rstest]
    fn closed_pnl_back_calculates_long_entry() {
        let record = ClosedPnlRecord::from_exit_fill(
            Symbol::new("ETHUSDT").unwrap(),
            PositionSide::Long,
            dec!(0.1),
            dec!(3600),
            dec!(10),
            0,
        );
        // 10 pnl over 0.1 ETH means entry was 100 below exit.
        assert_eq!(record.entry_price, dec!(3500));
    }

    #[rstest]
    fn closed_pnl_back_calculates_short_entry() {
        let record = ClosedPnlRecord::from_exit_fill(
            Symbol::new("ETHUSDT").unwrap(),
            PositionSide::Short,
            dec!(0.05),
            dec!(3400),
            dec!(5),
            0,
        );
        assert_eq!(record.entry_price, dec!(3500));
    }

    #[rstest]
    fn exchange_id_round_trips_through_strings() {
        for id in [
            ExchangeId::Binance,
            ExchangeId::Bybit,
            ExchangeId::Gateio,
            ExchangeId::Hyperliquid,
        ] {
            let s = id.to_string();
            assert_eq!(s.parse::<ExchangeId>().unwrap(), id);
        }
    }
}

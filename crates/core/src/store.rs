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

//! Contracts for the relational store and the position builder.
//!
//! The store itself is an external collaborator; this module defines the
//! repository surface the sync engine drives. Idempotency on
//! `(exchange_id, trade_id)` is the caller's responsibility (the sync engine
//! checks [`TradeStore::order_by_exchange_id`] before inserting), though a
//! store may additionally enforce it.

use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    error::TradeResult,
    models::{ExchangeId, OrderAction, PositionSide, TradeSide},
    symbol::Symbol,
};

/// Order row persisted for each venue fill.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub exchange_id: ExchangeId,
    pub trade_id: String,
    pub order_id: String,
    pub symbol: Symbol,
    pub side: TradeSide,
    pub position_side: PositionSide,
    pub action: OrderAction,
    pub price: Decimal,
    pub quantity: Decimal,
    pub time_ms: i64,
}

/// Fill row persisted alongside its order row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillRecord {
    pub exchange_id: ExchangeId,
    pub trade_id: String,
    pub order_id: String,
    pub symbol: Symbol,
    pub side: TradeSide,
    pub position_side: PositionSide,
    pub action: OrderAction,
    pub price: Decimal,
    pub quantity: Decimal,
    pub fee: Decimal,
    pub realized_pnl: Decimal,
    pub time_ms: i64,
}

/// Repository surface of the relational store.
#[async_trait]
pub trait TradeStore: Send + Sync {
    /// Looks up an order row by its venue fill id.
    async fn order_by_exchange_id(
        &self,
        exchange_id: ExchangeId,
        trade_id: &str,
    ) -> TradeResult<Option<OrderRecord>>;

    /// Inserts an order row.
    async fn create_order(&self, order: OrderRecord) -> TradeResult<()>;

    /// Inserts a fill row.
    async fn create_fill(&self, fill: FillRecord) -> TradeResult<()>;

    /// Highest numeric trade id persisted per symbol, driving the from-id
    /// incremental fetch path.
    async fn max_trade_ids_by_exchange(
        &self,
        exchange_id: ExchangeId,
    ) -> TradeResult<HashMap<Symbol, i64>>;

    /// Timestamp of the newest persisted fill, if any.
    async fn last_fill_time_by_exchange(&self, exchange_id: ExchangeId)
    -> TradeResult<Option<i64>>;

    /// Symbols with fills persisted since `since_ms` (covers partial
    /// previous-cycle failures during discovery).
    async fn recent_fill_symbols_by_exchange(
        &self,
        exchange_id: ExchangeId,
        since_ms: i64,
    ) -> TradeResult<Vec<Symbol>>;
}

/// Replays fills into open/closed position rows.
///
/// The builder averages entries on same-side adds, closes or partially closes
/// on opposite-side fills, and creates a new row when no matching open
/// position exists. It is an external collaborator; the sync engine only
/// drives it in strict ascending fill-time order.
#[async_trait]
pub trait PositionBuilder: Send + Sync {
    /// Applies one fill to position state.
    async fn process_trade(&self, fill: &FillRecord) -> TradeResult<()>;
}

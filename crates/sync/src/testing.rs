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

//! In-memory collaborators for exercising the sync engine: a store, a
//! reference position builder, and a scripted trader.

#![allow(clippy::missing_panics_doc)]

use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
};

use async_trait::async_trait;
use omniperp_core::{
    error::{TradeError, TradeResult},
    models::{
        BalanceSnapshot, ExchangeId, MarginMode, OpenOrder, OrderAck, OrderAction, OrderStatus,
        OrderStatusReport, PositionSide, PositionSnapshot, TradeRecord,
    },
    store::{FillRecord, OrderRecord, PositionBuilder, TradeStore},
    symbol::Symbol,
    trader::Trader,
};
use rust_decimal::Decimal;

// -------------------------------------------------------------------------------------------------
// Store
// -------------------------------------------------------------------------------------------------

/// In-memory [`TradeStore`] mirroring the relational store's contract.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    orders: Mutex<HashMap<(ExchangeId, String), OrderRecord>>,
    fills: Mutex<Vec<FillRecord>>,
    /// Pre-seeded last fill time, for checkpoint-recovery scenarios.
    seeded_last_fill_ms: Mutex<Option<i64>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the persisted last-fill time without inserting rows.
    pub fn seed_last_fill_time(&self, time_ms: i64) {
        *self.seeded_last_fill_ms.lock().expect("store mutex poisoned") = Some(time_ms);
    }

    /// All persisted fills in insertion order.
    pub fn fills(&self) -> Vec<FillRecord> {
        self.fills.lock().expect("store mutex poisoned").clone()
    }

    /// Number of persisted fill rows.
    pub fn fill_count(&self) -> usize {
        self.fills.lock().expect("store mutex poisoned").len()
    }
}

#[async_trait]
impl TradeStore for InMemoryStore {
    async fn order_by_exchange_id(
        &self,
        exchange_id: ExchangeId,
        trade_id: &str,
    ) -> TradeResult<Option<OrderRecord>> {
        Ok(self
            .orders
            .lock()
            .expect("store mutex poisoned")
            .get(&(exchange_id, trade_id.to_string()))
            .cloned())
    }

    async fn create_order(&self, order: OrderRecord) -> TradeResult<()> {
        self.orders
            .lock()
            .expect("store mutex poisoned")
            .insert((order.exchange_id, order.trade_id.clone()), order);
        Ok(())
    }

    async fn create_fill(&self, fill: FillRecord) -> TradeResult<()> {
        self.fills.lock().expect("store mutex poisoned").push(fill);
        Ok(())
    }

    async fn max_trade_ids_by_exchange(
        &self,
        exchange_id: ExchangeId,
    ) -> TradeResult<HashMap<Symbol, i64>> {
        let mut max: HashMap<Symbol, i64> = HashMap::new();
        for fill in self.fills.lock().expect("store mutex poisoned").iter() {
            if fill.exchange_id != exchange_id {
                continue;
            }
            let Ok(id) = fill.trade_id.parse::<i64>() else {
                continue;
            };
            let entry = max.entry(fill.symbol).or_insert(id);
            *entry = (*entry).max(id);
        }
        Ok(max)
    }

    async fn last_fill_time_by_exchange(
        &self,
        exchange_id: ExchangeId,
    ) -> TradeResult<Option<i64>> {
        if let Some(seeded) = *self.seeded_last_fill_ms.lock().expect("store mutex poisoned") {
            return Ok(Some(seeded));
        }
        Ok(self
            .fills
            .lock()
            .expect("store mutex poisoned")
            .iter()
            .filter(|f| f.exchange_id == exchange_id)
            .map(|f| f.time_ms)
            .max())
    }

    async fn recent_fill_symbols_by_exchange(
        &self,
        exchange_id: ExchangeId,
        since_ms: i64,
    ) -> TradeResult<Vec<Symbol>> {
        let mut symbols = Vec::new();
        for fill in self.fills.lock().expect("store mutex poisoned").iter() {
            if fill.exchange_id == exchange_id
                && fill.time_ms >= since_ms
                && !symbols.contains(&fill.symbol)
            {
                symbols.push(fill.symbol);
            }
        }
        Ok(symbols)
    }
}

// -------------------------------------------------------------------------------------------------
// Position builder
// -------------------------------------------------------------------------------------------------

/// An open position row held by the reference builder.
#[derive(Clone, Debug, PartialEq)]
pub struct BuiltPosition {
    pub symbol: Symbol,
    pub side: PositionSide,
    pub quantity: Decimal,
    pub entry_price: Decimal,
}

/// A closed position row held by the reference builder.
#[derive(Clone, Debug, PartialEq)]
pub struct ClosedPosition {
    pub symbol: Symbol,
    pub side: PositionSide,
    pub quantity: Decimal,
    pub exit_price: Decimal,
    pub realized_pnl: Decimal,
}

/// Reference [`PositionBuilder`]: averages same-side adds, closes or
/// partially closes on opposite fills, and creates a row when no matching
/// open position exists.
#[derive(Debug, Default)]
pub struct InMemoryPositionBuilder {
    open: Mutex<Vec<BuiltPosition>>,
    closed: Mutex<Vec<ClosedPosition>>,
}

impl InMemoryPositionBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current open positions.
    pub fn open_positions(&self) -> Vec<BuiltPosition> {
        self.open.lock().expect("builder mutex poisoned").clone()
    }

    /// Closed position rows in close order.
    pub fn closed_positions(&self) -> Vec<ClosedPosition> {
        self.closed.lock().expect("builder mutex poisoned").clone()
    }
}

#[async_trait]
impl PositionBuilder for InMemoryPositionBuilder {
    async fn process_trade(&self, fill: &FillRecord) -> TradeResult<()> {
        let side = fill.action.position_side();
        let mut open = self.open.lock().expect("builder mutex poisoned");
        if fill.action.is_close() {
            let Some(index) = open
                .iter()
                .position(|p| p.symbol == fill.symbol && p.side == side)
            else {
                // No matching open position: record the close on its own.
                self.closed.lock().expect("builder mutex poisoned").push(ClosedPosition {
                    symbol: fill.symbol,
                    side,
                    quantity: fill.quantity,
                    exit_price: fill.price,
                    realized_pnl: fill.realized_pnl,
                });
                return Ok(());
            };
            let position = &mut open[index];
            position.quantity -= fill.quantity;
            self.closed.lock().expect("builder mutex poisoned").push(ClosedPosition {
                symbol: fill.symbol,
                side,
                quantity: fill.quantity,
                exit_price: fill.price,
                realized_pnl: fill.realized_pnl,
            });
            if position.quantity <= Decimal::ZERO {
                open.remove(index);
            }
        } else {
            match open
                .iter_mut()
                .find(|p| p.symbol == fill.symbol && p.side == side)
            {
                Some(position) => {
                    let total = position.quantity + fill.quantity;
                    position.entry_price = (position.entry_price * position.quantity
                        + fill.price * fill.quantity)
                        / total;
                    position.quantity = total;
                }
                None => open.push(BuiltPosition {
                    symbol: fill.symbol,
                    side,
                    quantity: fill.quantity,
                    entry_price: fill.price,
                }),
            }
        }
        Ok(())
    }
}

// -------------------------------------------------------------------------------------------------
// Scripted trader
// -------------------------------------------------------------------------------------------------

/// Scripted [`Trader`] serving canned fills, for engine tests.
///
/// Records the `since` argument of each fill fetch so tests can assert
/// checkpoint behavior, and can be told to fail specific symbols.
#[derive(Debug, Default)]
pub struct ScriptedTrader {
    fills: Mutex<Vec<TradeRecord>>,
    positions: Mutex<Vec<PositionSnapshot>>,
    failing_symbols: Mutex<HashSet<Symbol>>,
    observed_since: Mutex<Vec<(Symbol, i64)>>,
}

impl ScriptedTrader {
    /// Creates an empty scripted trader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues fills the venue will report.
    pub fn push_fills(&self, fills: impl IntoIterator<Item = TradeRecord>) {
        self.fills.lock().expect("trader mutex poisoned").extend(fills);
    }

    /// Marks a symbol's fill queries as failing with a transient error.
    pub fn fail_symbol(&self, symbol: Symbol) {
        self.failing_symbols
            .lock()
            .expect("trader mutex poisoned")
            .insert(symbol);
    }

    /// Clears a previously injected failure.
    pub fn heal_symbol(&self, symbol: &Symbol) {
        self.failing_symbols
            .lock()
            .expect("trader mutex poisoned")
            .remove(symbol);
    }

    /// The `(symbol, since)` arguments observed by fill fetches.
    pub fn observed_since(&self) -> Vec<(Symbol, i64)> {
        self.observed_since
            .lock()
            .expect("trader mutex poisoned")
            .clone()
    }

    fn check_failure(&self, symbol: &Symbol) -> TradeResult<()> {
        if self
            .failing_symbols
            .lock()
            .expect("trader mutex poisoned")
            .contains(symbol)
        {
            return Err(TradeError::transient(format!("scripted failure for {symbol}")));
        }
        Ok(())
    }
}

#[async_trait]
impl Trader for ScriptedTrader {
    fn exchange_id(&self) -> ExchangeId {
        ExchangeId::Hyperliquid
    }

    async fn get_balance(&self) -> TradeResult<BalanceSnapshot> {
        Ok(BalanceSnapshot::new(
            Decimal::ZERO,
            Decimal::ZERO,
            Decimal::ZERO,
        ))
    }

    async fn get_positions(&self) -> TradeResult<Vec<PositionSnapshot>> {
        Ok(self.positions.lock().expect("trader mutex poisoned").clone())
    }

    async fn set_leverage(&self, _symbol: &Symbol, _leverage: u32) -> TradeResult<()> {
        Ok(())
    }

    async fn set_margin_mode(&self, _symbol: &Symbol, _mode: MarginMode) -> TradeResult<()> {
        Ok(())
    }

    async fn open_long(
        &self,
        symbol: &Symbol,
        _quantity: Decimal,
        _leverage: u32,
    ) -> TradeResult<OrderAck> {
        Ok(ack(symbol))
    }

    async fn open_short(
        &self,
        symbol: &Symbol,
        _quantity: Decimal,
        _leverage: u32,
    ) -> TradeResult<OrderAck> {
        Ok(ack(symbol))
    }

    async fn close_long(&self, symbol: &Symbol, _quantity: Decimal) -> TradeResult<OrderAck> {
        Ok(ack(symbol))
    }

    async fn close_short(&self, symbol: &Symbol, _quantity: Decimal) -> TradeResult<OrderAck> {
        Ok(ack(symbol))
    }

    async fn set_stop_loss(
        &self,
        symbol: &Symbol,
        _position_side: PositionSide,
        _quantity: Decimal,
        _trigger_price: Decimal,
    ) -> TradeResult<OrderAck> {
        Ok(ack(symbol))
    }

    async fn set_take_profit(
        &self,
        symbol: &Symbol,
        _position_side: PositionSide,
        _quantity: Decimal,
        _trigger_price: Decimal,
    ) -> TradeResult<OrderAck> {
        Ok(ack(symbol))
    }

    async fn cancel_stop_loss_orders(&self, _symbol: &Symbol) -> TradeResult<u32> {
        Ok(0)
    }

    async fn cancel_take_profit_orders(&self, _symbol: &Symbol) -> TradeResult<u32> {
        Ok(0)
    }

    async fn cancel_all_orders(&self, _symbol: &Symbol) -> TradeResult<u32> {
        Ok(0)
    }

    async fn get_open_orders(&self, _symbol: &Symbol) -> TradeResult<Vec<OpenOrder>> {
        Ok(Vec::new())
    }

    async fn get_market_price(&self, _symbol: &Symbol) -> TradeResult<Decimal> {
        Ok(Decimal::ONE)
    }

    async fn get_order_status(
        &self,
        symbol: &Symbol,
        order_id: &str,
    ) -> TradeResult<OrderStatusReport> {
        Ok(OrderStatusReport {
            order_id: order_id.to_string(),
            symbol: *symbol,
            status: OrderStatus::Unknown,
            filled_quantity: Decimal::ZERO,
            average_price: None,
        })
    }

    async fn fee_event_symbols_since(&self, since_ms: i64) -> TradeResult<Vec<Symbol>> {
        let mut symbols = Vec::new();
        for fill in self.fills.lock().expect("trader mutex poisoned").iter() {
            if fill.time_ms >= since_ms && !fill.fee.is_zero() && !symbols.contains(&fill.symbol) {
                symbols.push(fill.symbol);
            }
        }
        Ok(symbols)
    }

    async fn pnl_event_symbols_since(&self, since_ms: i64) -> TradeResult<Vec<Symbol>> {
        let mut symbols = Vec::new();
        for fill in self.fills.lock().expect("trader mutex poisoned").iter() {
            if fill.time_ms >= since_ms
                && !fill.realized_pnl.is_zero()
                && !symbols.contains(&fill.symbol)
            {
                symbols.push(fill.symbol);
            }
        }
        Ok(symbols)
    }

    async fn trades_since(&self, symbol: &Symbol, since_ms: i64) -> TradeResult<Vec<TradeRecord>> {
        self.check_failure(symbol)?;
        self.observed_since
            .lock()
            .expect("trader mutex poisoned")
            .push((*symbol, since_ms));
        Ok(self
            .fills
            .lock()
            .expect("trader mutex poisoned")
            .iter()
            .filter(|f| f.symbol == *symbol && f.time_ms >= since_ms)
            .cloned()
            .collect())
    }

    async fn trades_from_id(&self, symbol: &Symbol, from_id: i64) -> TradeResult<Vec<TradeRecord>> {
        self.check_failure(symbol)?;
        Ok(self
            .fills
            .lock()
            .expect("trader mutex poisoned")
            .iter()
            .filter(|f| {
                f.symbol == *symbol && f.trade_id.parse::<i64>().is_ok_and(|id| id > from_id)
            })
            .cloned()
            .collect())
    }
}

fn ack(symbol: &Symbol) -> OrderAck {
    OrderAck {
        order_id: "0".to_string(),
        client_order_id: None,
        symbol: *symbol,
        status: OrderStatus::New,
    }
}

/// Builds a fill record for tests.
#[must_use]
#[allow(clippy::too_many_arguments)]
pub fn fill(
    trade_id: &str,
    symbol: Symbol,
    action: OrderAction,
    quantity: Decimal,
    price: Decimal,
    fee: Decimal,
    pnl: Decimal,
    time_ms: i64,
) -> TradeRecord {
    let side = match action {
        OrderAction::OpenLong | OrderAction::CloseShort => {
            omniperp_core::models::TradeSide::Buy
        }
        OrderAction::OpenShort | OrderAction::CloseLong => {
            omniperp_core::models::TradeSide::Sell
        }
    };
    TradeRecord {
        trade_id: trade_id.to_string(),
        order_id: format!("o-{trade_id}"),
        symbol,
        side,
        position_side: action.position_side(),
        order_action: Some(action),
        price,
        quantity,
        realized_pnl: pnl,
        fee,
        time_ms,
    }
}

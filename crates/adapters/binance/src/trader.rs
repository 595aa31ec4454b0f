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

//! The Binance futures implementation of the venue-neutral [`Trader`] facade.
//!
//! Stop orders are placed through the algo endpoint family; the legacy order
//! list is still consulted on reads because historical conditional orders may
//! predate the migration (`-4120 STOP_ORDER_SWITCH_ALGO`).

use async_trait::async_trait;
use dashmap::DashMap;
use omniperp_core::{
    cache::{ContractMetaCache, TtlCache},
    error::{TradeError, TradeResult},
    ids::BrokerIdGenerator,
    models::{
        BalanceSnapshot, ExchangeId, MarginMode, OpenOrder, OrderAck, OrderKind, OrderStatus,
        OrderStatusReport, PositionSide, PositionSnapshot, TradeRecord, TradeSide,
    },
    precision::{ContractMeta, PriceRule, QuantityRule, format_quantity},
    symbol::Symbol,
    trader::{MAX_FILLS_PER_FETCH, MIN_NOTIONAL_USDT, Trader},
};
use rust_decimal::Decimal;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::{
    common::{
        consts::{CACHE_TTL, DEFAULT_QUANTITY_DECIMALS},
        credential::Credential,
        enums::{
            BinanceIncomeType, BinanceMarginType, BinanceOrderSide, BinanceOrderStatus,
            BinanceOrderType, BinancePositionSide, BinanceWorkingType,
        },
    },
    config::BinanceConfig,
    http::{
        client::BinanceHttpClient,
        models::{BinanceOrder, BinanceUserTrade},
        query::{
            BinanceAlgoOrderParamsBuilder, BinanceIncomeParamsBuilder, BinanceLeverageParamsBuilder,
            BinanceMarginTypeParamsBuilder, BinanceOrderParamsBuilder,
            BinanceUserTradesParamsBuilder,
        },
    },
};

/// Binance USDT-M futures trader.
#[derive(Debug)]
pub struct BinanceTrader {
    client: BinanceHttpClient,
    broker_ids: BrokerIdGenerator,
    balance_cache: TtlCache<BalanceSnapshot>,
    position_cache: TtlCache<Vec<PositionSnapshot>>,
    meta_cache: ContractMetaCache,
    leverage_by_symbol: DashMap<Symbol, u32>,
    leverage_cooldown: std::time::Duration,
}

impl BinanceTrader {
    /// Connects the trader: syncs the server clock and enables dual-side
    /// (hedge) mode so `positionSide` LONG/SHORT payloads are accepted.
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be built, the clock sync
    /// fails, or hedge mode cannot be enabled.
    pub async fn connect(config: BinanceConfig) -> TradeResult<Self> {
        let credential = Credential::new(config.api_key.clone(), config.api_secret.clone());
        let client = BinanceHttpClient::new(
            credential,
            config.base_url.clone(),
            Some(config.recv_window_ms),
        )?;
        client.sync_server_time().await?;
        let changed = client.enable_dual_side().await?;
        debug!(changed, "binance dual-side mode ensured");

        Ok(Self {
            client,
            broker_ids: BrokerIdGenerator::new(config.broker_tag.clone())
                .map_err(|e| TradeError::config(e.to_string()))?,
            balance_cache: TtlCache::new(CACHE_TTL),
            position_cache: TtlCache::new(CACHE_TTL),
            meta_cache: ContractMetaCache::new(),
            leverage_by_symbol: DashMap::new(),
            leverage_cooldown: config.leverage_cooldown,
        })
    }

    /// Returns the underlying HTTP client (test and tooling hook).
    #[must_use]
    pub fn client(&self) -> &BinanceHttpClient {
        &self.client
    }

    async fn quantity_rule(&self, symbol: &Symbol) -> QuantityRule {
        if let Some(meta) = self.meta_cache.get(symbol) {
            return meta.quantity_rule;
        }
        match self.client.exchange_info(Some(symbol.as_str())).await {
            Ok(info) => {
                let Some(entry) = info
                    .symbols
                    .into_iter()
                    .find(|s| s.symbol.as_str() == symbol.as_str())
                else {
                    warn!(%symbol, "symbol missing from exchange info, using default precision");
                    return QuantityRule::DecimalPlaces(DEFAULT_QUANTITY_DECIMALS);
                };
                let step = entry
                    .filters
                    .iter()
                    .find(|f| f.filter_type == "LOT_SIZE")
                    .and_then(|f| f.step_size.as_deref())
                    .and_then(|s| s.parse::<Decimal>().ok());
                let quantity_rule = match (step, entry.quantity_precision) {
                    (Some(step), _) if !step.is_zero() => QuantityRule::StepSize(step.normalize()),
                    (_, Some(decimals)) => QuantityRule::DecimalPlaces(decimals),
                    _ => QuantityRule::DecimalPlaces(DEFAULT_QUANTITY_DECIMALS),
                };
                let price_rule = PriceRule::DecimalPlaces(entry.price_precision.unwrap_or(2));
                self.meta_cache.insert(ContractMeta {
                    symbol: *symbol,
                    quantity_rule,
                    price_rule,
                    quantum_multiplier: None,
                    max_leverage: None,
                });
                quantity_rule
            }
            Err(e) => {
                warn!(%symbol, error = %e, "exchange info unavailable, using default precision");
                QuantityRule::DecimalPlaces(DEFAULT_QUANTITY_DECIMALS)
            }
        }
    }

    async fn fetch_positions(&self) -> TradeResult<Vec<PositionSnapshot>> {
        let raw = self.client.position_risk(None).await?;
        let mut snapshots = Vec::with_capacity(raw.len());
        for position in raw {
            let amount: Decimal = position.position_amt.parse().unwrap_or(Decimal::ZERO);
            if amount.is_zero() {
                continue;
            }
            let side = match position.position_side.as_str() {
                "LONG" => PositionSide::Long,
                "SHORT" => PositionSide::Short,
                _ if amount > Decimal::ZERO => PositionSide::Long,
                _ => PositionSide::Short,
            };
            snapshots.push(PositionSnapshot {
                symbol: Symbol::new(position.symbol.as_str()).map_err(|e| TradeError::Json {
                    message: e.to_string(),
                })?,
                side,
                quantity: amount.abs(),
                entry_price: position.entry_price.parse().unwrap_or(Decimal::ZERO),
                mark_price: position.mark_price.parse().unwrap_or(Decimal::ZERO),
                unrealized_pnl: position.un_realized_profit.parse().unwrap_or(Decimal::ZERO),
                leverage: position.leverage.parse().unwrap_or(1),
                liquidation_price: position
                    .liquidation_price
                    .parse::<Decimal>()
                    .ok()
                    .filter(|p| !p.is_zero()),
            });
        }
        Ok(snapshots)
    }

    async fn check_min_notional(&self, symbol: &Symbol, quantity: Decimal) -> TradeResult<()> {
        let price = self.get_market_price(symbol).await?;
        let notional = quantity * price;
        if notional < MIN_NOTIONAL_USDT {
            return Err(TradeError::OrderTooSmall {
                symbol: symbol.to_string(),
                quantity,
                price,
                notional,
                min_notional: MIN_NOTIONAL_USDT,
            });
        }
        Ok(())
    }

    async fn submit_market(
        &self,
        symbol: &Symbol,
        side: TradeSide,
        position_side: PositionSide,
        quantity: &str,
    ) -> TradeResult<OrderAck> {
        let client_order_id = self.broker_ids.generate();
        let params = BinanceOrderParamsBuilder::default()
            .symbol(symbol.as_str())
            .side(BinanceOrderSide::from(side))
            .position_side(BinancePositionSide::from(position_side))
            .order_type(BinanceOrderType::Market)
            .quantity(quantity)
            .new_client_order_id(client_order_id.clone())
            .build()
            .map_err(|e| TradeError::config(e.to_string()))?;
        let ack = self.client.place_order(&params).await?;
        self.position_cache.invalidate().await;
        Ok(OrderAck {
            order_id: ack.order_id.to_string(),
            client_order_id: Some(client_order_id),
            symbol: *symbol,
            status: ack
                .status
                .parse::<BinanceOrderStatus>()
                .map(OrderStatus::from)
                .unwrap_or(OrderStatus::New),
        })
    }

    async fn open_position(
        &self,
        symbol: &Symbol,
        quantity: Decimal,
        leverage: u32,
        position_side: PositionSide,
    ) -> TradeResult<OrderAck> {
        self.cancel_all_orders(symbol).await?;
        self.set_leverage(symbol, leverage).await?;
        let rule = self.quantity_rule(symbol).await;
        let formatted = format_quantity(symbol, quantity, &rule)?;
        self.check_min_notional(symbol, formatted.parse::<Decimal>().unwrap_or(quantity))
            .await?;
        let side = match position_side {
            PositionSide::Short => TradeSide::Sell,
            _ => TradeSide::Buy,
        };
        self.submit_market(symbol, side, position_side, &formatted).await
    }

    async fn close_position(
        &self,
        symbol: &Symbol,
        quantity: Decimal,
        position_side: PositionSide,
    ) -> TradeResult<OrderAck> {
        let quantity = if quantity.is_zero() {
            self.fetch_positions()
                .await?
                .iter()
                .find(|p| p.symbol == *symbol && p.side == position_side)
                .map(|p| p.quantity)
                .unwrap_or(Decimal::ZERO)
        } else {
            quantity
        };
        if quantity.is_zero() {
            return Err(TradeError::venue(
                0,
                format!("no open {position_side} position for {symbol}"),
            ));
        }
        let rule = self.quantity_rule(symbol).await;
        let formatted = format_quantity(symbol, quantity, &rule)?;
        // In dual-side mode the reducing side is implied by positionSide.
        let side = match position_side {
            PositionSide::Short => TradeSide::Buy,
            _ => TradeSide::Sell,
        };
        let ack = self.submit_market(symbol, side, position_side, &formatted).await?;
        self.cancel_all_orders(symbol).await?;
        Ok(ack)
    }

    async fn place_trigger(
        &self,
        symbol: &Symbol,
        position_side: PositionSide,
        trigger_price: Decimal,
        algo_type: BinanceOrderType,
    ) -> TradeResult<OrderAck> {
        let side = match position_side {
            PositionSide::Short => TradeSide::Buy,
            _ => TradeSide::Sell,
        };
        let client_algo_id = self.broker_ids.generate();
        let params = BinanceAlgoOrderParamsBuilder::default()
            .symbol(symbol.as_str())
            .side(BinanceOrderSide::from(side))
            .position_side(BinancePositionSide::from(position_side))
            .algo_type(algo_type)
            .trigger_price(trigger_price.normalize().to_string())
            .close_position(true)
            .working_type(BinanceWorkingType::MarkPrice)
            .client_algo_id(client_algo_id.clone())
            .build()
            .map_err(|e| TradeError::config(e.to_string()))?;
        let ack = self.client.place_algo_order(&params).await?;
        Ok(OrderAck {
            order_id: ack.algo_id.to_string(),
            client_order_id: Some(client_algo_id),
            symbol: *symbol,
            status: OrderStatus::New,
        })
    }

    async fn cancel_trigger_family(&self, symbol: &Symbol, kind: OrderKind) -> TradeResult<u32> {
        let legacy_type = match kind {
            OrderKind::TakeProfitMarket => "TAKE_PROFIT_MARKET",
            _ => "STOP_MARKET",
        };
        let mut cancelled = 0;

        for order in self.client.open_algo_orders(symbol.as_str()).await? {
            if order.algo_type == legacy_type
                && self
                    .client
                    .cancel_algo_order(symbol.as_str(), order.algo_id)
                    .await?
            {
                cancelled += 1;
            }
        }

        // Legacy conditional orders may still exist from before the algo
        // migration; cancel them through the classic endpoint.
        for order in self.client.open_orders(symbol.as_str()).await? {
            if order.order_type == legacy_type
                && self.client.cancel_order(symbol.as_str(), order.order_id).await?
            {
                cancelled += 1;
            }
        }
        Ok(cancelled)
    }

    fn order_to_open_order(&self, symbol: &Symbol, order: BinanceOrder) -> TradeResult<OpenOrder> {
        let status = order
            .status
            .parse::<BinanceOrderStatus>()
            .map(OrderStatus::from)
            .unwrap_or(OrderStatus::Unknown);
        let order_type = match order.order_type.as_str() {
            "STOP_MARKET" => OrderKind::StopMarket,
            "TAKE_PROFIT_MARKET" => OrderKind::TakeProfitMarket,
            "LIMIT" => OrderKind::Limit,
            _ => OrderKind::Market,
        };
        Ok(OpenOrder {
            order_id: order.order_id.to_string(),
            symbol: *symbol,
            side: if order.side == "BUY" { TradeSide::Buy } else { TradeSide::Sell },
            position_side: match order.position_side.as_str() {
                "LONG" => PositionSide::Long,
                "SHORT" => PositionSide::Short,
                _ => PositionSide::Both,
            },
            order_type,
            price: order.price.parse::<Decimal>().ok().filter(|p| !p.is_zero()),
            stop_price: order.stop_price.parse::<Decimal>().ok().filter(|p| !p.is_zero()),
            quantity: order.orig_qty.parse().unwrap_or(Decimal::ZERO),
            status,
        })
    }

    fn trade_to_record(&self, trade: BinanceUserTrade) -> TradeResult<TradeRecord> {
        let side = if trade.side == "BUY" { TradeSide::Buy } else { TradeSide::Sell };
        let position_side = match trade.position_side.as_str() {
            "LONG" => PositionSide::Long,
            "SHORT" => PositionSide::Short,
            _ => PositionSide::Both,
        };
        Ok(TradeRecord {
            trade_id: trade.id.to_string(),
            order_id: trade.order_id.to_string(),
            symbol: Symbol::new(trade.symbol.as_str()).map_err(|e| TradeError::Json {
                message: e.to_string(),
            })?,
            side,
            position_side,
            // The venue has no explicit direction field; the sync engine
            // infers the action from (side, positionSide, realizedPnl).
            order_action: None,
            price: trade.price.parse().unwrap_or(Decimal::ZERO),
            quantity: trade.qty.parse().unwrap_or(Decimal::ZERO),
            realized_pnl: trade.realized_pnl.parse().unwrap_or(Decimal::ZERO),
            fee: trade.commission.parse().unwrap_or(Decimal::ZERO),
            time_ms: trade.time,
        })
    }

    async fn income_symbols(
        &self,
        income_type: BinanceIncomeType,
        since_ms: i64,
    ) -> TradeResult<Vec<Symbol>> {
        let params = BinanceIncomeParamsBuilder::default()
            .income_type(income_type)
            .start_time(since_ms)
            .limit(1000_u32)
            .build()
            .map_err(|e| TradeError::config(e.to_string()))?;
        let records = self.client.income(&params).await?;
        let mut symbols: Vec<Symbol> = Vec::new();
        for record in records {
            if record.symbol.is_empty() {
                continue;
            }
            if let Ok(symbol) = Symbol::new(record.symbol.as_str())
                && !symbols.contains(&symbol)
            {
                symbols.push(symbol);
            }
        }
        Ok(symbols)
    }
}

#[async_trait]
impl Trader for BinanceTrader {
    fn exchange_id(&self) -> ExchangeId {
        ExchangeId::Binance
    }

    async fn get_balance(&self) -> TradeResult<BalanceSnapshot> {
        self.balance_cache
            .get_or_refresh(|| async {
                let balances = self.client.balances().await?;
                let usdt = balances
                    .into_iter()
                    .find(|b| b.asset.as_str() == "USDT")
                    .ok_or_else(|| TradeError::auth("no USDT futures balance returned"))?;
                Ok(BalanceSnapshot::new(
                    usdt.balance.parse().unwrap_or(Decimal::ZERO),
                    usdt.available_balance.parse().unwrap_or(Decimal::ZERO),
                    usdt.cross_un_pnl.parse().unwrap_or(Decimal::ZERO),
                ))
            })
            .await
    }

    async fn get_positions(&self) -> TradeResult<Vec<PositionSnapshot>> {
        self.position_cache
            .get_or_refresh(|| async { self.fetch_positions().await })
            .await
    }

    async fn set_leverage(&self, symbol: &Symbol, leverage: u32) -> TradeResult<()> {
        let previous = self.leverage_by_symbol.get(symbol).map(|e| *e.value());
        if previous == Some(leverage) {
            return Ok(());
        }
        let params = BinanceLeverageParamsBuilder::default()
            .symbol(symbol.as_str())
            .leverage(leverage)
            .build()
            .map_err(|e| TradeError::config(e.to_string()))?;
        self.client.set_leverage(&params).await?;
        self.leverage_by_symbol.insert(*symbol, leverage);
        // The venue rate-limits successive leverage changes.
        info!(%symbol, leverage, cooldown = ?self.leverage_cooldown, "leverage changed, cooling down");
        sleep(self.leverage_cooldown).await;
        Ok(())
    }

    async fn set_margin_mode(&self, symbol: &Symbol, mode: MarginMode) -> TradeResult<()> {
        let margin_type = match mode {
            MarginMode::Cross => BinanceMarginType::Crossed,
            MarginMode::Isolated => BinanceMarginType::Isolated,
        };
        let params = BinanceMarginTypeParamsBuilder::default()
            .symbol(symbol.as_str())
            .margin_type(margin_type)
            .build()
            .map_err(|e| TradeError::config(e.to_string()))?;
        self.client.set_margin_type(&params).await?;
        Ok(())
    }

    async fn open_long(
        &self,
        symbol: &Symbol,
        quantity: Decimal,
        leverage: u32,
    ) -> TradeResult<OrderAck> {
        self.open_position(symbol, quantity, leverage, PositionSide::Long).await
    }

    async fn open_short(
        &self,
        symbol: &Symbol,
        quantity: Decimal,
        leverage: u32,
    ) -> TradeResult<OrderAck> {
        self.open_position(symbol, quantity, leverage, PositionSide::Short).await
    }

    async fn close_long(&self, symbol: &Symbol, quantity: Decimal) -> TradeResult<OrderAck> {
        self.close_position(symbol, quantity, PositionSide::Long).await
    }

    async fn close_short(&self, symbol: &Symbol, quantity: Decimal) -> TradeResult<OrderAck> {
        self.close_position(symbol, quantity, PositionSide::Short).await
    }

    async fn set_stop_loss(
        &self,
        symbol: &Symbol,
        position_side: PositionSide,
        _quantity: Decimal,
        trigger_price: Decimal,
    ) -> TradeResult<OrderAck> {
        // closePosition=true covers the full position; quantity is implied.
        self.place_trigger(symbol, position_side, trigger_price, BinanceOrderType::StopMarket)
            .await
    }

    async fn set_take_profit(
        &self,
        symbol: &Symbol,
        position_side: PositionSide,
        _quantity: Decimal,
        trigger_price: Decimal,
    ) -> TradeResult<OrderAck> {
        self.place_trigger(
            symbol,
            position_side,
            trigger_price,
            BinanceOrderType::TakeProfitMarket,
        )
        .await
    }

    async fn cancel_stop_loss_orders(&self, symbol: &Symbol) -> TradeResult<u32> {
        self.cancel_trigger_family(symbol, OrderKind::StopMarket).await
    }

    async fn cancel_take_profit_orders(&self, symbol: &Symbol) -> TradeResult<u32> {
        self.cancel_trigger_family(symbol, OrderKind::TakeProfitMarket).await
    }

    async fn cancel_all_orders(&self, symbol: &Symbol) -> TradeResult<u32> {
        let mut cancelled = 0;
        for order in self.client.open_algo_orders(symbol.as_str()).await? {
            if self
                .client
                .cancel_algo_order(symbol.as_str(), order.algo_id)
                .await?
            {
                cancelled += 1;
            }
        }
        self.client.cancel_all_orders(symbol.as_str()).await?;
        Ok(cancelled)
    }

    async fn get_open_orders(&self, symbol: &Symbol) -> TradeResult<Vec<OpenOrder>> {
        let mut all = Vec::new();
        for order in self.client.open_orders(symbol.as_str()).await? {
            all.push(self.order_to_open_order(symbol, order)?);
        }
        for algo in self.client.open_algo_orders(symbol.as_str()).await? {
            let order_type = if algo.algo_type == "TAKE_PROFIT_MARKET" {
                OrderKind::TakeProfitMarket
            } else {
                OrderKind::StopMarket
            };
            all.push(OpenOrder {
                order_id: algo.algo_id.to_string(),
                symbol: *symbol,
                side: if algo.side == "BUY" { TradeSide::Buy } else { TradeSide::Sell },
                position_side: match algo.position_side.as_str() {
                    "LONG" => PositionSide::Long,
                    "SHORT" => PositionSide::Short,
                    _ => PositionSide::Both,
                },
                order_type,
                price: None,
                stop_price: algo.trigger_price.parse::<Decimal>().ok(),
                quantity: algo.quantity.parse().unwrap_or(Decimal::ZERO),
                status: OrderStatus::New,
            });
        }
        Ok(all)
    }

    async fn get_market_price(&self, symbol: &Symbol) -> TradeResult<Decimal> {
        let ticker = self.client.ticker_price(symbol.as_str()).await?;
        ticker
            .price
            .parse()
            .map_err(|_| TradeError::SymbolUnknown {
                symbol: symbol.to_string(),
            })
    }

    async fn get_order_status(
        &self,
        symbol: &Symbol,
        order_id: &str,
    ) -> TradeResult<OrderStatusReport> {
        let order_id: i64 = order_id.parse().map_err(|_| TradeError::Json {
            message: format!("binance order id must be numeric, got '{order_id}'"),
        })?;
        let order = self.client.query_order(symbol.as_str(), order_id).await?;
        Ok(OrderStatusReport {
            order_id: order.order_id.to_string(),
            symbol: *symbol,
            status: order
                .status
                .parse::<BinanceOrderStatus>()
                .map(OrderStatus::from)
                .unwrap_or(OrderStatus::Unknown),
            filled_quantity: order.executed_qty.parse().unwrap_or(Decimal::ZERO),
            average_price: order.avg_price.parse::<Decimal>().ok().filter(|p| !p.is_zero()),
        })
    }

    async fn fee_event_symbols_since(&self, since_ms: i64) -> TradeResult<Vec<Symbol>> {
        self.income_symbols(BinanceIncomeType::Commission, since_ms).await
    }

    async fn pnl_event_symbols_since(&self, since_ms: i64) -> TradeResult<Vec<Symbol>> {
        self.income_symbols(BinanceIncomeType::RealizedPnl, since_ms).await
    }

    async fn trades_since(&self, symbol: &Symbol, since_ms: i64) -> TradeResult<Vec<TradeRecord>> {
        let params = BinanceUserTradesParamsBuilder::default()
            .symbol(symbol.as_str())
            .start_time(since_ms)
            .limit(MAX_FILLS_PER_FETCH)
            .build()
            .map_err(|e| TradeError::config(e.to_string()))?;
        let trades = self.client.user_trades(&params).await?;
        trades.into_iter().map(|t| self.trade_to_record(t)).collect()
    }

    async fn trades_from_id(&self, symbol: &Symbol, from_id: i64) -> TradeResult<Vec<TradeRecord>> {
        let params = BinanceUserTradesParamsBuilder::default()
            .symbol(symbol.as_str())
            .from_id(from_id + 1)
            .limit(MAX_FILLS_PER_FETCH)
            .build()
            .map_err(|e| TradeError::config(e.to_string()))?;
        let trades = self.client.user_trades(&params).await?;
        trades.into_iter().map(|t| self.trade_to_record(t)).collect()
    }
}

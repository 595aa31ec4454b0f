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

//! The Gate.io implementation of the venue-neutral [`Trader`] facade.
//!
//! Quantities cross this boundary twice: base-asset quantities from callers
//! become signed integer contract counts (`round(qty / quanto_multiplier)`,
//! shorts negative), and venue sizes become base quantities on the way out.

use async_trait::async_trait;
use omniperp_core::{
    cache::{ContractMetaCache, TtlCache},
    error::{TradeError, TradeResult},
    models::{
        BalanceSnapshot, ExchangeId, MarginMode, OpenOrder, OrderAck, OrderKind, OrderStatus,
        OrderStatusReport, PositionSide, PositionSnapshot, TradeRecord, TradeSide,
    },
    precision::{ContractMeta, PriceRule, QuantityRule},
    symbol::Symbol,
    trader::{MAX_FILLS_PER_FETCH, MIN_NOTIONAL_USDT, Trader},
};
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{debug, info};

use crate::{
    common::{
        consts::CACHE_TTL,
        credential::Credential,
        symbol::{from_contract, to_contract},
    },
    config::GateioConfig,
    http::{
        client::GateHttpClient,
        models::{
            GateOrder, GateOrderRequest, GatePriceOrderRequest, GateTrade, GateTrigger,
            GateTriggerInitial, GateTriggerRule,
        },
    },
};

/// Gate.io USDT-margined futures trader.
#[derive(Debug)]
pub struct GateioTrader {
    client: GateHttpClient,
    balance_cache: TtlCache<BalanceSnapshot>,
    position_cache: TtlCache<Vec<PositionSnapshot>>,
    meta_cache: ContractMetaCache,
}

impl GateioTrader {
    /// Connects the trader and syncs the server clock.
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be built or the clock
    /// sync fails.
    pub async fn connect(config: GateioConfig) -> TradeResult<Self> {
        let credential = Credential::new(config.api_key.clone(), config.api_secret.clone());
        let client = GateHttpClient::new(credential, config.base_url.clone())?;
        client.sync_server_time().await?;
        Ok(Self {
            client,
            balance_cache: TtlCache::new(CACHE_TTL),
            position_cache: TtlCache::new(CACHE_TTL),
            meta_cache: ContractMetaCache::new(),
        })
    }

    /// Returns the underlying HTTP client (test and tooling hook).
    #[must_use]
    pub fn client(&self) -> &GateHttpClient {
        &self.client
    }

    async fn contract_meta(&self, symbol: &Symbol) -> TradeResult<ContractMeta> {
        if let Some(meta) = self.meta_cache.get(symbol) {
            return Ok(meta);
        }
        let contract = to_contract(symbol)?;
        let raw = self.client.contract(&contract).await?;
        let multiplier: Decimal =
            raw.quanto_multiplier
                .parse()
                .map_err(|_| TradeError::PrecisionUnavailable {
                    symbol: symbol.to_string(),
                    message: format!("bad quanto_multiplier '{}'", raw.quanto_multiplier),
                })?;
        let price_decimals = raw
            .order_price_round
            .parse::<Decimal>()
            .map(|p| p.normalize().scale())
            .unwrap_or(2);
        let meta = ContractMeta {
            symbol: *symbol,
            quantity_rule: QuantityRule::StepSize(multiplier),
            price_rule: PriceRule::DecimalPlaces(price_decimals),
            quantum_multiplier: Some(multiplier),
            max_leverage: raw.leverage_max.parse::<u32>().ok(),
        };
        self.meta_cache.insert(meta.clone());
        Ok(meta)
    }

    /// Converts a base-asset quantity into a contract count.
    async fn to_contracts(&self, symbol: &Symbol, quantity: Decimal) -> TradeResult<i64> {
        let meta = self.contract_meta(symbol).await?;
        let multiplier = meta.quantum_multiplier.unwrap_or(Decimal::ONE);
        if multiplier.is_zero() {
            return Err(TradeError::PrecisionUnavailable {
                symbol: symbol.to_string(),
                message: "zero quanto_multiplier".to_string(),
            });
        }
        let contracts = (quantity / multiplier)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        let contracts = i64::try_from(contracts.mantissa()).unwrap_or(0);
        if contracts == 0 && quantity > Decimal::ZERO {
            return Err(TradeError::QuantityRoundsToZero {
                symbol: symbol.to_string(),
                quantity,
                step: multiplier.to_string(),
            });
        }
        Ok(contracts)
    }

    /// Converts a signed contract count into a base-asset quantity.
    async fn to_quantity(&self, symbol: &Symbol, contracts: i64) -> TradeResult<Decimal> {
        let meta = self.contract_meta(symbol).await?;
        let multiplier = meta.quantum_multiplier.unwrap_or(Decimal::ONE);
        Ok(Decimal::from(contracts.unsigned_abs()) * multiplier)
    }

    async fn fetch_positions(&self) -> TradeResult<Vec<PositionSnapshot>> {
        let raw = self.client.positions().await?;
        let mut snapshots = Vec::with_capacity(raw.len());
        for position in raw {
            if position.size == 0 {
                continue;
            }
            let symbol = from_contract(position.contract.as_str())?;
            let quantity = self.to_quantity(&symbol, position.size).await?;
            let side = match position.mode.as_str() {
                "dual_long" => PositionSide::Long,
                "dual_short" => PositionSide::Short,
                _ if position.size > 0 => PositionSide::Long,
                _ => PositionSide::Short,
            };
            snapshots.push(PositionSnapshot {
                symbol,
                side,
                quantity,
                entry_price: position.entry_price.parse().unwrap_or(Decimal::ZERO),
                mark_price: position.mark_price.parse().unwrap_or(Decimal::ZERO),
                unrealized_pnl: position.unrealised_pnl.parse().unwrap_or(Decimal::ZERO),
                leverage: leverage_of(&position.leverage, &position.cross_leverage_limit),
                liquidation_price: position
                    .liq_price
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

    async fn open_position(
        &self,
        symbol: &Symbol,
        quantity: Decimal,
        leverage: u32,
        position_side: PositionSide,
    ) -> TradeResult<OrderAck> {
        self.cancel_all_orders(symbol).await?;
        self.set_leverage(symbol, leverage).await?;
        let contracts = self.to_contracts(symbol, quantity).await?;
        let effective = self.to_quantity(symbol, contracts).await?;
        self.check_min_notional(symbol, effective).await?;
        let size = match position_side {
            PositionSide::Short => -contracts,
            _ => contracts,
        };
        let request = GateOrderRequest {
            contract: to_contract(symbol)?,
            size,
            price: "0".to_string(),
            tif: "ioc".to_string(),
            reduce_only: None,
            close: None,
        };
        let order = self.client.place_order(&request).await?;
        self.position_cache.invalidate().await;
        Ok(OrderAck {
            order_id: order.id.to_string(),
            client_order_id: None,
            symbol: *symbol,
            status: OrderStatus::New,
        })
    }

    async fn close_position(
        &self,
        symbol: &Symbol,
        quantity: Decimal,
        position_side: PositionSide,
    ) -> TradeResult<OrderAck> {
        let contract = to_contract(symbol)?;
        let request = if quantity.is_zero() {
            // size 0 + close flag liquidates the whole position.
            GateOrderRequest {
                contract,
                size: 0,
                price: "0".to_string(),
                tif: "ioc".to_string(),
                reduce_only: None,
                close: Some(true),
            }
        } else {
            let contracts = self.to_contracts(symbol, quantity).await?;
            let size = match position_side {
                // Closing a long sells, closing a short buys back.
                PositionSide::Short => contracts,
                _ => -contracts,
            };
            GateOrderRequest {
                contract,
                size,
                price: "0".to_string(),
                tif: "ioc".to_string(),
                reduce_only: Some(true),
                close: None,
            }
        };
        let order = self.client.place_order(&request).await?;
        self.position_cache.invalidate().await;
        let ack = OrderAck {
            order_id: order.id.to_string(),
            client_order_id: None,
            symbol: *symbol,
            status: OrderStatus::New,
        };
        self.cancel_all_orders(symbol).await?;
        Ok(ack)
    }

    async fn place_trigger(
        &self,
        symbol: &Symbol,
        position_side: PositionSide,
        quantity: Decimal,
        trigger_price: Decimal,
    ) -> TradeResult<OrderAck> {
        let contract = to_contract(symbol)?;
        let current = self.get_market_price(symbol).await?;
        let rule = if trigger_price > current {
            GateTriggerRule::GreaterOrEqual
        } else {
            GateTriggerRule::LessOrEqual
        };
        let size = if quantity.is_zero() {
            0
        } else {
            let contracts = self.to_contracts(symbol, quantity).await?;
            match position_side {
                PositionSide::Short => contracts,
                _ => -contracts,
            }
        };
        let request = GatePriceOrderRequest {
            initial: GateTriggerInitial {
                contract,
                size,
                price: "0".to_string(),
                tif: "ioc".to_string(),
                reduce_only: Some(true),
            },
            trigger: GateTrigger {
                strategy_type: 0,
                price_type: 1,
                price: trigger_price.normalize().to_string(),
                rule,
            },
        };
        let ack = self.client.place_price_order(&request).await?;
        Ok(OrderAck {
            order_id: ack.id.to_string(),
            client_order_id: None,
            symbol: *symbol,
            status: OrderStatus::New,
        })
    }

    /// Splits open trigger orders into stop-loss / take-profit shaped sets
    /// relative to the live position side.
    async fn trigger_kind(&self, symbol: &Symbol, rule: GateTriggerRule) -> OrderKind {
        let side = self
            .get_positions()
            .await
            .ok()
            .and_then(|positions| {
                positions
                    .iter()
                    .find(|p| p.symbol == *symbol)
                    .map(|p| p.side)
            })
            .unwrap_or(PositionSide::Long);
        match (side, rule) {
            (PositionSide::Short, GateTriggerRule::GreaterOrEqual)
            | (PositionSide::Long | PositionSide::Both, GateTriggerRule::LessOrEqual) => {
                OrderKind::StopMarket
            }
            _ => OrderKind::TakeProfitMarket,
        }
    }

    async fn cancel_triggers(&self, symbol: &Symbol, kind: OrderKind) -> TradeResult<u32> {
        let contract = to_contract(symbol)?;
        let mut cancelled = 0;
        for order in self.client.open_price_orders(&contract).await? {
            if self.trigger_kind(symbol, order.trigger.rule).await == kind
                && self.client.cancel_price_order(order.id).await?
            {
                cancelled += 1;
            }
        }
        Ok(cancelled)
    }

    async fn trade_to_record(&self, trade: GateTrade) -> TradeResult<TradeRecord> {
        let symbol = from_contract(trade.contract.as_str())?;
        let quantity = self.to_quantity(&symbol, trade.size).await?;
        let side = if trade.size >= 0 { TradeSide::Buy } else { TradeSide::Sell };
        Ok(TradeRecord {
            trade_id: trade.id.to_string(),
            order_id: trade.order_id,
            symbol,
            side,
            // One-way netting: the engine infers open/close from pnl.
            position_side: PositionSide::Both,
            order_action: None,
            price: trade.price.parse().unwrap_or(Decimal::ZERO),
            quantity,
            realized_pnl: trade.pnl.parse().unwrap_or(Decimal::ZERO),
            fee: trade.fee.parse().unwrap_or(Decimal::ZERO),
            time_ms: (trade.create_time * 1_000.0) as i64,
        })
    }

    fn order_status_of(order: &GateOrder) -> OrderStatus {
        match order.status.as_str() {
            "open" if order.left < order.size.abs() && order.left > 0 => OrderStatus::PartiallyFilled,
            "open" => OrderStatus::New,
            "finished" => match order.finish_as.as_str() {
                "filled" | "" => OrderStatus::Filled,
                "cancelled" | "liquidated" | "ioc" => OrderStatus::Canceled,
                _ => OrderStatus::Expired,
            },
            _ => OrderStatus::Unknown,
        }
    }
}

fn leverage_of(leverage: &str, cross_limit: &str) -> u32 {
    match leverage.parse::<Decimal>() {
        // Leverage "0" means cross margin; the effective leverage is the
        // cross limit.
        Ok(v) if v.is_zero() => cross_limit.parse::<u32>().unwrap_or(1),
        Ok(v) => u32::try_from(v.round().mantissa()).unwrap_or(1),
        Err(_) => 1,
    }
}

#[async_trait]
impl Trader for GateioTrader {
    fn exchange_id(&self) -> ExchangeId {
        ExchangeId::Gateio
    }

    async fn get_balance(&self) -> TradeResult<BalanceSnapshot> {
        self.balance_cache
            .get_or_refresh(|| async {
                let account = self.client.account().await?;
                Ok(BalanceSnapshot::new(
                    account.total.parse().unwrap_or(Decimal::ZERO),
                    account.available.parse().unwrap_or(Decimal::ZERO),
                    account.unrealised_pnl.parse().unwrap_or(Decimal::ZERO),
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
        let contract = to_contract(symbol)?;
        match self
            .client
            .set_position_leverage(&contract, &leverage.to_string(), None)
            .await
        {
            Ok(_) => Ok(()),
            Err(e) if GateHttpClient::is_noop(&e) => {
                info!(%symbol, leverage, "leverage already set");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn set_margin_mode(&self, symbol: &Symbol, mode: MarginMode) -> TradeResult<()> {
        let contract = to_contract(symbol)?;
        let result = match mode {
            // Leverage 0 selects cross margin, bounded by the cross limit.
            MarginMode::Cross => {
                self.client
                    .set_position_leverage(&contract, "0", Some("10"))
                    .await
            }
            MarginMode::Isolated => {
                let current = self
                    .get_positions()
                    .await?
                    .iter()
                    .find(|p| p.symbol == *symbol)
                    .map_or(10, |p| p.leverage);
                self.client
                    .set_position_leverage(&contract, &current.to_string(), None)
                    .await
            }
        };
        match result {
            Ok(_) => Ok(()),
            Err(e) if GateHttpClient::is_noop(&e) => {
                info!(%symbol, ?mode, "margin mode already set");
                Ok(())
            }
            Err(e) => Err(e),
        }
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
        quantity: Decimal,
        trigger_price: Decimal,
    ) -> TradeResult<OrderAck> {
        self.place_trigger(symbol, position_side, quantity, trigger_price).await
    }

    async fn set_take_profit(
        &self,
        symbol: &Symbol,
        position_side: PositionSide,
        quantity: Decimal,
        trigger_price: Decimal,
    ) -> TradeResult<OrderAck> {
        self.place_trigger(symbol, position_side, quantity, trigger_price).await
    }

    async fn cancel_stop_loss_orders(&self, symbol: &Symbol) -> TradeResult<u32> {
        self.cancel_triggers(symbol, OrderKind::StopMarket).await
    }

    async fn cancel_take_profit_orders(&self, symbol: &Symbol) -> TradeResult<u32> {
        self.cancel_triggers(symbol, OrderKind::TakeProfitMarket).await
    }

    async fn cancel_all_orders(&self, symbol: &Symbol) -> TradeResult<u32> {
        let contract = to_contract(symbol)?;
        let mut cancelled = self.client.cancel_orders(&contract).await?.len() as u32;
        for order in self.client.open_price_orders(&contract).await? {
            if self.client.cancel_price_order(order.id).await? {
                cancelled += 1;
            }
        }
        Ok(cancelled)
    }

    async fn get_open_orders(&self, symbol: &Symbol) -> TradeResult<Vec<OpenOrder>> {
        let contract = to_contract(symbol)?;
        let mut all = Vec::new();
        for order in self.client.open_orders(&contract).await? {
            let quantity = self.to_quantity(symbol, order.size).await?;
            all.push(OpenOrder {
                order_id: order.id.to_string(),
                symbol: *symbol,
                side: if order.size >= 0 { TradeSide::Buy } else { TradeSide::Sell },
                position_side: PositionSide::Both,
                order_type: if order.price == "0" { OrderKind::Market } else { OrderKind::Limit },
                price: order.price.parse::<Decimal>().ok().filter(|p| !p.is_zero()),
                stop_price: None,
                quantity,
                status: Self::order_status_of(&order),
            });
        }
        for trigger in self.client.open_price_orders(&contract).await? {
            let quantity = self.to_quantity(symbol, trigger.initial.size).await?;
            let kind = self.trigger_kind(symbol, trigger.trigger.rule).await;
            all.push(OpenOrder {
                order_id: trigger.id.to_string(),
                symbol: *symbol,
                side: if trigger.initial.size >= 0 { TradeSide::Buy } else { TradeSide::Sell },
                position_side: PositionSide::Both,
                order_type: kind,
                price: None,
                stop_price: trigger.trigger.price.parse::<Decimal>().ok(),
                quantity,
                status: OrderStatus::New,
            });
        }
        Ok(all)
    }

    async fn get_market_price(&self, symbol: &Symbol) -> TradeResult<Decimal> {
        let contract = to_contract(symbol)?;
        let tickers = self.client.tickers(Some(&contract)).await?;
        let ticker = tickers
            .into_iter()
            .next()
            .ok_or_else(|| TradeError::SymbolUnknown {
                symbol: symbol.to_string(),
            })?;
        ticker.last.parse().map_err(|_| TradeError::Json {
            message: format!("bad ticker price '{}'", ticker.last),
        })
    }

    async fn get_order_status(
        &self,
        symbol: &Symbol,
        order_id: &str,
    ) -> TradeResult<OrderStatusReport> {
        let order_id: i64 = order_id.parse().map_err(|_| TradeError::Json {
            message: format!("gate order id must be numeric, got '{order_id}'"),
        })?;
        let order = self.client.order(order_id).await?;
        let filled_contracts = order.size.abs() - order.left.abs();
        let filled_quantity = self.to_quantity(symbol, filled_contracts).await?;
        Ok(OrderStatusReport {
            order_id: order.id.to_string(),
            symbol: *symbol,
            status: Self::order_status_of(&order),
            filled_quantity,
            average_price: order.fill_price.parse::<Decimal>().ok().filter(|p| !p.is_zero()),
        })
    }

    async fn fee_event_symbols_since(&self, since_ms: i64) -> TradeResult<Vec<Symbol>> {
        let trades = self
            .client
            .my_trades(None, Some(since_ms / 1_000), None, MAX_FILLS_PER_FETCH)
            .await?;
        let mut symbols: Vec<Symbol> = Vec::new();
        for trade in trades {
            match from_contract(trade.contract.as_str()) {
                Ok(symbol) if !symbols.contains(&symbol) => symbols.push(symbol),
                Ok(_) => {}
                Err(e) => debug!(contract = %trade.contract, error = %e, "skipping unmappable contract"),
            }
        }
        Ok(symbols)
    }

    async fn pnl_event_symbols_since(&self, since_ms: i64) -> TradeResult<Vec<Symbol>> {
        let closes = self.client.position_closes(since_ms / 1_000).await?;
        let mut symbols: Vec<Symbol> = Vec::new();
        for close in closes {
            if let Ok(symbol) = from_contract(close.contract.as_str())
                && !symbols.contains(&symbol)
            {
                symbols.push(symbol);
            }
        }
        Ok(symbols)
    }

    async fn trades_since(&self, symbol: &Symbol, since_ms: i64) -> TradeResult<Vec<TradeRecord>> {
        let contract = to_contract(symbol)?;
        let trades = self
            .client
            .my_trades(Some(&contract), Some(since_ms / 1_000), None, MAX_FILLS_PER_FETCH)
            .await?;
        let mut records = Vec::with_capacity(trades.len());
        for trade in trades {
            records.push(self.trade_to_record(trade).await?);
        }
        Ok(records)
    }

    async fn trades_from_id(&self, symbol: &Symbol, from_id: i64) -> TradeResult<Vec<TradeRecord>> {
        let contract = to_contract(symbol)?;
        let trades = self
            .client
            .my_trades(Some(&contract), None, Some(from_id), MAX_FILLS_PER_FETCH)
            .await?;
        let mut records = Vec::with_capacity(trades.len());
        for trade in trades {
            if trade.id <= from_id {
                continue;
            }
            records.push(self.trade_to_record(trade).await?);
        }
        Ok(records)
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
    #[case("10", "0", 10)]
    #[case("0", "25", 25)]
    #[case("", "", 1)]
    fn leverage_resolution(#[case] leverage: &str, #[case] cross: &str, #[case] expected: u32) {
        assert_eq!(leverage_of(leverage, cross), expected);
    }

    #[rstest]
    fn order_status_mapping() {
        let mut order = GateOrder {
            id: 1,
            contract: ustr::Ustr::from("BTC_USDT"),
            size: 10,
            left: 10,
            price: "0".to_string(),
            status: "open".to_string(),
            tif: "ioc".to_string(),
            is_reduce_only: false,
            fill_price: String::new(),
            finish_as: String::new(),
        };
        assert_eq!(GateioTrader::order_status_of(&order), OrderStatus::New);
        order.left = 4;
        assert_eq!(
            GateioTrader::order_status_of(&order),
            OrderStatus::PartiallyFilled
        );
        order.status = "finished".to_string();
        order.finish_as = "filled".to_string();
        assert_eq!(GateioTrader::order_status_of(&order), OrderStatus::Filled);
        order.finish_as = "cancelled".to_string();
        assert_eq!(GateioTrader::order_status_of(&order), OrderStatus::Canceled);
    }
}

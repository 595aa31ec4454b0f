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

//! The Hyperliquid implementation of the venue-neutral [`Trader`] facade.
//!
//! Market orders are aggressive IOC limits. Prices are rounded to five
//! significant figures before wire formatting; the venue hard-rejects extra
//! precision. Fills carry an explicit `dir` annotation which maps verbatim
//! onto [`OrderAction`], so no inference is needed downstream.

use async_trait::async_trait;
use omniperp_core::{
    cache::TtlCache,
    error::{TradeError, TradeResult},
    models::{
        BalanceSnapshot, ExchangeId, MarginMode, OpenOrder, OrderAck, OrderAction, OrderKind,
        OrderStatus, OrderStatusReport, PositionSide, PositionSnapshot, TradeRecord, TradeSide,
    },
    precision::{QuantityRule, format_quantity, format_wire_decimal, round_to_sig_figs},
    symbol::Symbol,
    time::unix_ms,
    trader::{MAX_FILLS_PER_FETCH, MIN_NOTIONAL_USDT, Trader},
};
use rust_decimal::{Decimal, prelude::ToPrimitive};
use tracing::warn;

use crate::{
    common::{
        assets::{AssetInfo, AssetRegistry},
        consts::{AGENT_WALLET_LIMIT_USDC, CACHE_TTL, MARKET_SLIPPAGE, PRICE_SIG_FIGS},
        credential::{EvmPrivateKey, to_checksum_address},
        symbol::{from_coin, to_coin},
    },
    config::HyperliquidConfig,
    http::{
        client::HlHttpClient,
        models::{HlClearinghouseState, HlFill, HlOpenOrder},
        query::{CancelAction, CancelWire, OrderAction as OrderActionWire, OrderTypeWire, OrderWire,
            UpdateLeverageAction},
    },
};

/// Hyperliquid trader covering the main dex and one optional HIP-3 sub-dex.
#[derive(Debug)]
pub struct HyperliquidTrader {
    client: HlHttpClient,
    /// EIP-55 checksummed fund-holding wallet.
    main_wallet: String,
    sub_dex: Option<String>,
    assets: AssetRegistry,
    balance_cache: TtlCache<BalanceSnapshot>,
    position_cache: TtlCache<Vec<PositionSnapshot>>,
}

impl HyperliquidTrader {
    /// Connects the trader, enforcing the agent-wallet safety rule.
    ///
    /// # Errors
    ///
    /// Returns [`TradeError::SecurityViolation`] when the signing key's own
    /// account holds more than 100 USDC: agent keys are routinely exposed to
    /// servers and must not custody funds.
    pub async fn connect(config: HyperliquidConfig) -> TradeResult<Self> {
        let key = EvmPrivateKey::new(config.private_key.clone())?;
        let signer = key.signer()?;
        let main_wallet = to_checksum_address(&config.main_wallet)?;
        let client = HlHttpClient::new(signer, config.base_url.clone())?;

        let agent = to_checksum_address(&client.signer_address())?;
        if agent.eq_ignore_ascii_case(&main_wallet) {
            warn!(
                wallet = %main_wallet,
                "signing key IS the main wallet; prefer a dedicated agent key"
            );
        } else {
            let state = client.clearinghouse_state(&agent, None).await?;
            let account_value: Decimal = state
                .margin_summary
                .account_value
                .parse()
                .unwrap_or(Decimal::ZERO);
            if account_value > AGENT_WALLET_LIMIT_USDC {
                return Err(TradeError::SecurityViolation {
                    message: format!(
                        "agent wallet {agent} holds {account_value} USDC (limit \
                         {AGENT_WALLET_LIMIT_USDC}); move funds to the main wallet"
                    ),
                });
            }
        }

        Ok(Self {
            client,
            main_wallet,
            sub_dex: config.sub_dex.clone(),
            assets: AssetRegistry::new(),
            balance_cache: TtlCache::new(CACHE_TTL),
            position_cache: TtlCache::new(CACHE_TTL),
        })
    }

    /// Returns the underlying HTTP client (test and tooling hook).
    #[must_use]
    pub fn client(&self) -> &HlHttpClient {
        &self.client
    }

    fn dex_for(&self, is_sub: bool) -> Option<&str> {
        if is_sub { self.sub_dex.as_deref() } else { None }
    }

    async fn asset_for(&self, symbol: &Symbol) -> TradeResult<(String, AssetInfo, bool)> {
        let (coin, is_sub) = to_coin(symbol, self.sub_dex.as_deref())?;
        let info = self
            .assets
            .resolve(&self.client, &coin, self.dex_for(is_sub))
            .await?;
        Ok((coin, info, is_sub))
    }

    async fn mid_price(&self, coin: &str, is_sub: bool) -> TradeResult<Decimal> {
        let mids = self.client.all_mids(self.dex_for(is_sub)).await?;
        let raw = mids
            .get(coin)
            .or_else(|| coin.split_once(':').and_then(|(_, bare)| mids.get(bare)))
            .ok_or_else(|| TradeError::SymbolUnknown {
                symbol: coin.to_string(),
            })?;
        raw.parse().map_err(|_| TradeError::Json {
            message: format!("bad mid price '{raw}' for {coin}"),
        })
    }

    /// Renders a price for the wire: five significant figures, trailing
    /// zeros stripped.
    fn wire_price(price: f64) -> String {
        format_wire_decimal(round_to_sig_figs(price, PRICE_SIG_FIGS))
    }

    fn wire_size(symbol: &Symbol, quantity: Decimal, sz_decimals: u32) -> TradeResult<String> {
        format_quantity(symbol, quantity, &QuantityRule::DecimalPlaces(sz_decimals))
    }

    async fn states(&self) -> TradeResult<Vec<(Option<String>, HlClearinghouseState)>> {
        let mut out = vec![(
            None,
            self.client
                .clearinghouse_state(&self.main_wallet, None)
                .await?,
        )];
        if let Some(dex) = self.sub_dex.as_deref() {
            out.push((
                Some(dex.to_string()),
                self.client
                    .clearinghouse_state(&self.main_wallet, Some(dex))
                    .await?,
            ));
        }
        Ok(out)
    }

    async fn fetch_positions(&self) -> TradeResult<Vec<PositionSnapshot>> {
        let mut snapshots = Vec::new();
        for (_dex, state) in self.states().await? {
            for entry in state.asset_positions {
                let position = entry.position;
                let szi: Decimal = position.szi.parse().unwrap_or(Decimal::ZERO);
                if szi.is_zero() {
                    continue;
                }
                let symbol = from_coin(&position.coin)?;
                let side = if szi > Decimal::ZERO {
                    PositionSide::Long
                } else {
                    PositionSide::Short
                };
                let entry_price = position
                    .entry_px
                    .as_deref()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(Decimal::ZERO);
                let (coin, is_sub) = to_coin(&symbol, self.sub_dex.as_deref())?;
                let mark_price = self.mid_price(&coin, is_sub).await.unwrap_or(Decimal::ZERO);
                snapshots.push(PositionSnapshot {
                    symbol,
                    side,
                    quantity: szi.abs(),
                    entry_price,
                    mark_price,
                    unrealized_pnl: position.unrealized_pnl.parse().unwrap_or(Decimal::ZERO),
                    leverage: position.leverage.as_ref().map_or(1, |l| l.value),
                    liquidation_price: position
                        .liquidation_px
                        .as_deref()
                        .and_then(|p| p.parse().ok()),
                });
            }
        }
        Ok(snapshots)
    }

    async fn position_quantity(
        &self,
        symbol: &Symbol,
        side: PositionSide,
    ) -> TradeResult<Decimal> {
        Ok(self
            .fetch_positions()
            .await?
            .iter()
            .find(|p| p.symbol == *symbol && p.side == side)
            .map(|p| p.quantity)
            .unwrap_or(Decimal::ZERO))
    }

    async fn submit_order(
        &self,
        symbol: &Symbol,
        is_buy: bool,
        size: String,
        limit_px: String,
        reduce_only: bool,
        order_type: OrderTypeWire,
    ) -> TradeResult<OrderAck> {
        let (_, info, _) = self.asset_for(symbol).await?;
        let action = OrderActionWire::new(vec![OrderWire {
            asset: info.index,
            is_buy,
            limit_px,
            size,
            reduce_only,
            order_type,
        }]);
        let response = self.client.post_action(&action).await?;
        self.position_cache.invalidate().await;
        Ok(OrderAck {
            order_id: response.first_oid().map_or_else(String::new, |o| o.to_string()),
            client_order_id: None,
            symbol: *symbol,
            status: OrderStatus::New,
        })
    }

    async fn market_order(
        &self,
        symbol: &Symbol,
        is_buy: bool,
        quantity: Decimal,
        reduce_only: bool,
    ) -> TradeResult<OrderAck> {
        let (coin, info, is_sub) = self.asset_for(symbol).await?;
        let mid = self.mid_price(&coin, is_sub).await?;
        let notional = quantity * mid;
        if !reduce_only && notional < MIN_NOTIONAL_USDT {
            return Err(TradeError::OrderTooSmall {
                symbol: symbol.to_string(),
                quantity,
                price: mid,
                notional,
                min_notional: MIN_NOTIONAL_USDT,
            });
        }
        let size = Self::wire_size(symbol, quantity, info.sz_decimals)?;
        // An IOC limit offset past the mid is the venue's market idiom.
        let mid_f = mid.to_f64().unwrap_or(0.0);
        let aggressive = if is_buy {
            mid_f * (1.0 + MARKET_SLIPPAGE)
        } else {
            mid_f * (1.0 - MARKET_SLIPPAGE)
        };
        self.submit_order(
            symbol,
            is_buy,
            size,
            Self::wire_price(aggressive),
            reduce_only,
            OrderTypeWire::ioc(),
        )
        .await
    }

    async fn open_position(
        &self,
        symbol: &Symbol,
        quantity: Decimal,
        leverage: u32,
        is_buy: bool,
    ) -> TradeResult<OrderAck> {
        self.cancel_all_orders(symbol).await?;
        self.set_leverage(symbol, leverage).await?;
        self.market_order(symbol, is_buy, quantity, false).await
    }

    async fn close_position(
        &self,
        symbol: &Symbol,
        quantity: Decimal,
        position_side: PositionSide,
    ) -> TradeResult<OrderAck> {
        let quantity = if quantity.is_zero() {
            self.position_quantity(symbol, position_side).await?
        } else {
            quantity
        };
        if quantity.is_zero() {
            return Err(TradeError::venue(
                0,
                format!("no open {position_side} position for {symbol}"),
            ));
        }
        let is_buy = position_side == PositionSide::Short;
        let ack = self.market_order(symbol, is_buy, quantity, true).await?;
        self.cancel_all_orders(symbol).await?;
        Ok(ack)
    }

    async fn place_trigger(
        &self,
        symbol: &Symbol,
        position_side: PositionSide,
        quantity: Decimal,
        trigger_price: Decimal,
        tpsl: &str,
    ) -> TradeResult<OrderAck> {
        let (_, info, _) = self.asset_for(symbol).await?;
        let quantity = if quantity.is_zero() {
            self.position_quantity(symbol, position_side).await?
        } else {
            quantity
        };
        let size = Self::wire_size(symbol, quantity, info.sz_decimals)?;
        let is_buy = position_side == PositionSide::Short;
        let px = Self::wire_price(trigger_price.to_f64().unwrap_or(0.0));
        self.submit_order(
            symbol,
            is_buy,
            size,
            px.clone(),
            true,
            OrderTypeWire::trigger_market(px, tpsl),
        )
        .await
    }

    async fn open_orders_for(&self, symbol: &Symbol) -> TradeResult<Vec<HlOpenOrder>> {
        let (coin, is_sub) = to_coin(symbol, self.sub_dex.as_deref())?;
        let orders = self
            .client
            .frontend_open_orders(&self.main_wallet, self.dex_for(is_sub))
            .await?;
        Ok(orders
            .into_iter()
            .filter(|o| o.coin == coin || o.coin == coin.split_once(':').map_or("", |(_, c)| c))
            .collect())
    }

    async fn cancel_orders(&self, symbol: &Symbol, oids: Vec<u64>) -> TradeResult<u32> {
        if oids.is_empty() {
            return Ok(0);
        }
        let (_, info, _) = self.asset_for(symbol).await?;
        let count = oids.len() as u32;
        let action = CancelAction::new(
            oids.into_iter()
                .map(|oid| CancelWire {
                    asset: info.index,
                    oid,
                })
                .collect(),
        );
        self.client.post_action(&action).await?;
        Ok(count)
    }

    fn fill_to_record(fill: HlFill) -> TradeResult<TradeRecord> {
        let symbol = from_coin(&fill.coin)?;
        let side = if fill.side == "B" { TradeSide::Buy } else { TradeSide::Sell };
        let action = OrderAction::from_venue_dir(&fill.dir);
        let position_side = action.map_or(PositionSide::Both, OrderAction::position_side);
        Ok(TradeRecord {
            trade_id: fill.tid.to_string(),
            order_id: fill.oid.to_string(),
            symbol,
            side,
            position_side,
            order_action: action,
            price: fill.px.parse().unwrap_or(Decimal::ZERO),
            quantity: fill.sz.parse().unwrap_or(Decimal::ZERO),
            realized_pnl: fill.closed_pnl.parse().unwrap_or(Decimal::ZERO),
            fee: fill.fee.parse().unwrap_or(Decimal::ZERO),
            time_ms: fill.time,
        })
    }

    async fn fills_since(&self, since_ms: i64) -> TradeResult<Vec<HlFill>> {
        self.client
            .user_fills_by_time(&self.main_wallet, since_ms)
            .await
    }
}

fn trigger_kind_of(order: &HlOpenOrder) -> OrderKind {
    if order.order_type.starts_with("Take Profit") {
        OrderKind::TakeProfitMarket
    } else if order.order_type.starts_with("Stop") {
        OrderKind::StopMarket
    } else if order.is_trigger {
        OrderKind::StopMarket
    } else if order.order_type == "Limit" {
        OrderKind::Limit
    } else {
        OrderKind::Market
    }
}

#[async_trait]
impl Trader for HyperliquidTrader {
    fn exchange_id(&self) -> ExchangeId {
        ExchangeId::Hyperliquid
    }

    async fn get_balance(&self) -> TradeResult<BalanceSnapshot> {
        self.balance_cache
            .get_or_refresh(|| async {
                let mut equity = Decimal::ZERO;
                let mut available = Decimal::ZERO;
                let mut unrealized = Decimal::ZERO;
                for (_dex, state) in self.states().await? {
                    equity += state
                        .margin_summary
                        .account_value
                        .parse()
                        .unwrap_or(Decimal::ZERO);
                    available += state.withdrawable.parse().unwrap_or(Decimal::ZERO);
                    for entry in &state.asset_positions {
                        unrealized += entry
                            .position
                            .unrealized_pnl
                            .parse()
                            .unwrap_or(Decimal::ZERO);
                    }
                }
                // accountValue is equity; back out the wallet component.
                Ok(BalanceSnapshot::new(equity - unrealized, available, unrealized))
            })
            .await
    }

    async fn get_positions(&self) -> TradeResult<Vec<PositionSnapshot>> {
        self.position_cache
            .get_or_refresh(|| async { self.fetch_positions().await })
            .await
    }

    async fn set_leverage(&self, symbol: &Symbol, leverage: u32) -> TradeResult<()> {
        let (_, info, _) = self.asset_for(symbol).await?;
        let action = UpdateLeverageAction::new(info.index, true, leverage);
        self.client.post_action(&action).await?;
        Ok(())
    }

    async fn set_margin_mode(&self, symbol: &Symbol, mode: MarginMode) -> TradeResult<()> {
        let (_, info, _) = self.asset_for(symbol).await?;
        let leverage = self
            .fetch_positions()
            .await
            .unwrap_or_default()
            .iter()
            .find(|p| p.symbol == *symbol)
            .map_or(10, |p| p.leverage);
        let action =
            UpdateLeverageAction::new(info.index, mode == MarginMode::Cross, leverage);
        self.client.post_action(&action).await?;
        Ok(())
    }

    async fn open_long(
        &self,
        symbol: &Symbol,
        quantity: Decimal,
        leverage: u32,
    ) -> TradeResult<OrderAck> {
        self.open_position(symbol, quantity, leverage, true).await
    }

    async fn open_short(
        &self,
        symbol: &Symbol,
        quantity: Decimal,
        leverage: u32,
    ) -> TradeResult<OrderAck> {
        self.open_position(symbol, quantity, leverage, false).await
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
        self.place_trigger(symbol, position_side, quantity, trigger_price, "sl")
            .await
    }

    async fn set_take_profit(
        &self,
        symbol: &Symbol,
        position_side: PositionSide,
        quantity: Decimal,
        trigger_price: Decimal,
    ) -> TradeResult<OrderAck> {
        self.place_trigger(symbol, position_side, quantity, trigger_price, "tp")
            .await
    }

    async fn cancel_stop_loss_orders(&self, symbol: &Symbol) -> TradeResult<u32> {
        let oids = self
            .open_orders_for(symbol)
            .await?
            .iter()
            .filter(|o| trigger_kind_of(o) == OrderKind::StopMarket && o.is_trigger)
            .map(|o| o.oid)
            .collect();
        self.cancel_orders(symbol, oids).await
    }

    async fn cancel_take_profit_orders(&self, symbol: &Symbol) -> TradeResult<u32> {
        let oids = self
            .open_orders_for(symbol)
            .await?
            .iter()
            .filter(|o| trigger_kind_of(o) == OrderKind::TakeProfitMarket)
            .map(|o| o.oid)
            .collect();
        self.cancel_orders(symbol, oids).await
    }

    async fn cancel_all_orders(&self, symbol: &Symbol) -> TradeResult<u32> {
        let oids = self
            .open_orders_for(symbol)
            .await?
            .iter()
            .map(|o| o.oid)
            .collect();
        self.cancel_orders(symbol, oids).await
    }

    async fn get_open_orders(&self, symbol: &Symbol) -> TradeResult<Vec<OpenOrder>> {
        let orders = self.open_orders_for(symbol).await?;
        Ok(orders
            .into_iter()
            .map(|order| {
                let side = if order.side == "B" { TradeSide::Buy } else { TradeSide::Sell };
                let kind = trigger_kind_of(&order);
                OpenOrder {
                    order_id: order.oid.to_string(),
                    symbol: *symbol,
                    side,
                    position_side: PositionSide::Both,
                    order_type: kind,
                    price: order.limit_px.parse::<Decimal>().ok().filter(|p| !p.is_zero()),
                    stop_price: order.trigger_px.parse::<Decimal>().ok().filter(|p| !p.is_zero()),
                    quantity: order.sz.parse().unwrap_or(Decimal::ZERO),
                    status: OrderStatus::New,
                }
            })
            .collect())
    }

    async fn get_market_price(&self, symbol: &Symbol) -> TradeResult<Decimal> {
        let (coin, is_sub) = to_coin(symbol, self.sub_dex.as_deref())?;
        self.mid_price(&coin, is_sub).await
    }

    async fn get_order_status(
        &self,
        symbol: &Symbol,
        order_id: &str,
    ) -> TradeResult<OrderStatusReport> {
        let oid: u64 = order_id.parse().map_err(|_| TradeError::Json {
            message: format!("hyperliquid order id must be numeric, got '{order_id}'"),
        })?;
        let response = self.client.order_status(&self.main_wallet, oid).await?;
        if response.status == "order"
            && let Some(entry) = response.order
        {
            let status = match entry.status.as_str() {
                "open" => OrderStatus::New,
                "filled" => OrderStatus::Filled,
                "canceled" | "marginCanceled" => OrderStatus::Canceled,
                "rejected" => OrderStatus::Rejected,
                _ => OrderStatus::Unknown,
            };
            let orig: Decimal = entry.order.orig_sz.parse().unwrap_or(Decimal::ZERO);
            let remaining: Decimal = entry.order.sz.parse().unwrap_or(Decimal::ZERO);
            return Ok(OrderStatusReport {
                order_id: order_id.to_string(),
                symbol: *symbol,
                status,
                filled_quantity: (orig - remaining).max(Decimal::ZERO),
                average_price: entry.order.limit_px.parse::<Decimal>().ok(),
            });
        }
        // Unknown oid: IOC orders leave the open list immediately, so check
        // recent fills before declaring the order unknown; a cancelled IOC
        // must not be reported as filled.
        let fills = self.fills_since(unix_ms() - 24 * 60 * 60 * 1_000).await?;
        let matched: Vec<&HlFill> = fills.iter().filter(|f| f.oid == oid).collect();
        if matched.is_empty() {
            return Ok(OrderStatusReport {
                order_id: order_id.to_string(),
                symbol: *symbol,
                status: OrderStatus::Unknown,
                filled_quantity: Decimal::ZERO,
                average_price: None,
            });
        }
        let filled_quantity = matched
            .iter()
            .map(|f| f.sz.parse().unwrap_or(Decimal::ZERO))
            .sum();
        let last_px = matched
            .last()
            .and_then(|f| f.px.parse::<Decimal>().ok());
        Ok(OrderStatusReport {
            order_id: order_id.to_string(),
            symbol: *symbol,
            status: OrderStatus::Filled,
            filled_quantity,
            average_price: last_px,
        })
    }

    async fn fee_event_symbols_since(&self, since_ms: i64) -> TradeResult<Vec<Symbol>> {
        let fills = self.fills_since(since_ms).await?;
        let mut symbols: Vec<Symbol> = Vec::new();
        for fill in fills {
            let fee: Decimal = fill.fee.parse().unwrap_or(Decimal::ZERO);
            if fee.is_zero() {
                continue;
            }
            if let Ok(symbol) = from_coin(&fill.coin)
                && !symbols.contains(&symbol)
            {
                symbols.push(symbol);
            }
        }
        Ok(symbols)
    }

    async fn pnl_event_symbols_since(&self, since_ms: i64) -> TradeResult<Vec<Symbol>> {
        let fills = self.fills_since(since_ms).await?;
        let mut symbols: Vec<Symbol> = Vec::new();
        for fill in fills {
            let pnl: Decimal = fill.closed_pnl.parse().unwrap_or(Decimal::ZERO);
            if pnl.is_zero() {
                continue;
            }
            if let Ok(symbol) = from_coin(&fill.coin)
                && !symbols.contains(&symbol)
            {
                symbols.push(symbol);
            }
        }
        Ok(symbols)
    }

    async fn trades_since(&self, symbol: &Symbol, since_ms: i64) -> TradeResult<Vec<TradeRecord>> {
        let fills = self.fills_since(since_ms).await?;
        let mut records = Vec::new();
        for fill in fills {
            if from_coin(&fill.coin).map(|s| s == *symbol).unwrap_or(false) {
                records.push(Self::fill_to_record(fill)?);
            }
            if records.len() as u32 >= MAX_FILLS_PER_FETCH {
                break;
            }
        }
        Ok(records)
    }

    async fn trades_from_id(&self, symbol: &Symbol, from_id: i64) -> TradeResult<Vec<TradeRecord>> {
        // The venue paginates by time only; fetch a day and watermark on tid.
        let fills = self.fills_since(unix_ms() - 24 * 60 * 60 * 1_000).await?;
        let mut records = Vec::new();
        for fill in fills {
            if i64::try_from(fill.tid).map_or(true, |tid| tid <= from_id) {
                continue;
            }
            if from_coin(&fill.coin).map(|s| s == *symbol).unwrap_or(false) {
                records.push(Self::fill_to_record(fill)?);
            }
            if records.len() as u32 >= MAX_FILLS_PER_FETCH {
                break;
            }
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
    use rust_decimal_macros::dec;

    use super::*;

    fn fill(dir: &str, side: &str, pnl: &str) -> HlFill {
        HlFill {
            coin: "ETH".to_string(),
            px: "3500.0".to_string(),
            sz: "0.1".to_string(),
            side: side.to_string(),
            time: 1_704_470_400_123,
            dir: dir.to_string(),
            closed_pnl: pnl.to_string(),
            oid: 7,
            fee: "0.5".to_string(),
            tid: 42,
        }
    }

    #[rstest]
    fn fill_maps_explicit_direction_verbatim() {
        let record = HyperliquidTrader::fill_to_record(fill("Open Long", "B", "0.0")).unwrap();
        assert_eq!(record.order_action, Some(OrderAction::OpenLong));
        assert_eq!(record.position_side, PositionSide::Long);
        assert_eq!(record.symbol.as_str(), "ETHUSDT");
        assert_eq!(record.quantity, dec!(0.1));

        let record = HyperliquidTrader::fill_to_record(fill("Close Short", "B", "5.0")).unwrap();
        assert_eq!(record.order_action, Some(OrderAction::CloseShort));
        assert_eq!(record.realized_pnl, dec!(5.0));
    }

    #[rstest]
    fn wire_price_is_five_sig_figs() {
        assert_eq!(HyperliquidTrader::wire_price(123_456.789), "123460");
        assert_eq!(HyperliquidTrader::wire_price(0.000_123_456_7), "0.00012346");
        assert_eq!(HyperliquidTrader::wire_price(3501.7), "3501.7");
    }

    #[rstest]
    fn trigger_kind_classification() {
        let mut order = HlOpenOrder {
            coin: "ETH".to_string(),
            oid: 1,
            side: "A".to_string(),
            limit_px: "0".to_string(),
            sz: "0.1".to_string(),
            orig_sz: "0.1".to_string(),
            order_type: "Stop Market".to_string(),
            trigger_px: "3400".to_string(),
            is_trigger: true,
            reduce_only: true,
        };
        assert_eq!(trigger_kind_of(&order), OrderKind::StopMarket);
        order.order_type = "Take Profit Market".to_string();
        assert_eq!(trigger_kind_of(&order), OrderKind::TakeProfitMarket);
        order.order_type = "Limit".to_string();
        order.is_trigger = false;
        assert_eq!(trigger_kind_of(&order), OrderKind::Limit);
    }
}

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

//! The venue-neutral trading capability contract.
//!
//! Every venue adapter implements [`Trader`] with identical inputs and result
//! shapes; callers never branch on the venue. All operations are synchronous
//! with respect to the caller: network failures surface as recoverable
//! errors, and there are no silent retries inside the facade beyond the
//! idempotency coercions each adapter documents.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::{
    error::TradeResult,
    models::{
        BalanceSnapshot, ExchangeId, MarginMode, OpenOrder, OrderAck, OrderStatusReport,
        PositionSide, PositionSnapshot, TradeRecord,
    },
    symbol::Symbol,
};

/// Minimum order notional in USDT accepted across supported venues.
pub const MIN_NOTIONAL_USDT: Decimal = Decimal::from_parts(10, 0, 0, false, 0);

/// Maximum fills fetched per symbol in one sync pass; overflow is picked up
/// by the from-id watermark on the next cycle.
pub const MAX_FILLS_PER_FETCH: u32 = 500;

/// Venue-neutral trading capability set.
#[async_trait]
pub trait Trader: Send + Sync {
    /// The venue this trader speaks to.
    fn exchange_id(&self) -> ExchangeId;

    /// Returns the account balance snapshot, served from cache within its TTL.
    async fn get_balance(&self) -> TradeResult<BalanceSnapshot>;

    /// Returns all non-zero positions, served from cache within its TTL.
    async fn get_positions(&self) -> TradeResult<Vec<PositionSnapshot>>;

    /// Sets leverage for a symbol. Idempotent on "already set"; venues that
    /// rate-limit leverage changes get a cooldown after a real change.
    async fn set_leverage(&self, symbol: &Symbol, leverage: u32) -> TradeResult<()>;

    /// Sets the margin mode for a symbol. Idempotent on "no need to change".
    async fn set_margin_mode(&self, symbol: &Symbol, mode: MarginMode) -> TradeResult<()>;

    /// Opens a long with a market order after the standard pre-steps
    /// (cancel pending orders, set leverage, format quantity, min-notional).
    async fn open_long(&self, symbol: &Symbol, quantity: Decimal, leverage: u32)
    -> TradeResult<OrderAck>;

    /// Opens a short; see [`Trader::open_long`].
    async fn open_short(
        &self,
        symbol: &Symbol,
        quantity: Decimal,
        leverage: u32,
    ) -> TradeResult<OrderAck>;

    /// Closes a long with a reducing market order; `quantity` of zero closes
    /// the full position. Remaining pending orders are cancelled afterwards.
    async fn close_long(&self, symbol: &Symbol, quantity: Decimal) -> TradeResult<OrderAck>;

    /// Closes a short; see [`Trader::close_long`].
    async fn close_short(&self, symbol: &Symbol, quantity: Decimal) -> TradeResult<OrderAck>;

    /// Places a stop-loss trigger order on the reducing side of the position.
    async fn set_stop_loss(
        &self,
        symbol: &Symbol,
        position_side: PositionSide,
        quantity: Decimal,
        trigger_price: Decimal,
    ) -> TradeResult<OrderAck>;

    /// Places a take-profit trigger order on the reducing side of the position.
    async fn set_take_profit(
        &self,
        symbol: &Symbol,
        position_side: PositionSide,
        quantity: Decimal,
        trigger_price: Decimal,
    ) -> TradeResult<OrderAck>;

    /// Cancels stop-loss orders for the symbol, returning the cancel count.
    /// "No such order" responses are coerced to success.
    async fn cancel_stop_loss_orders(&self, symbol: &Symbol) -> TradeResult<u32>;

    /// Cancels take-profit orders for the symbol, returning the cancel count.
    async fn cancel_take_profit_orders(&self, symbol: &Symbol) -> TradeResult<u32>;

    /// Cancels every pending order for the symbol, legacy and algo/trigger.
    async fn cancel_all_orders(&self, symbol: &Symbol) -> TradeResult<u32>;

    /// Returns the union of regular and algo/trigger pending orders.
    async fn get_open_orders(&self, symbol: &Symbol) -> TradeResult<Vec<OpenOrder>>;

    /// Returns the venue's last (or mid) price for the symbol.
    async fn get_market_price(&self, symbol: &Symbol) -> TradeResult<Decimal>;

    /// Returns order status including filled quantity and average price.
    async fn get_order_status(&self, symbol: &Symbol, order_id: &str)
    -> TradeResult<OrderStatusReport>;

    // -------------------------------------------------------------------------------------------
    // Sync-engine query surface
    // -------------------------------------------------------------------------------------------

    /// Symbols with at least one fee-generating fill since `since_ms`
    /// (discovery probe; venues without a fee stream answer from their
    /// account-wide fill history).
    async fn fee_event_symbols_since(&self, since_ms: i64) -> TradeResult<Vec<Symbol>>;

    /// Symbols with realized-pnl events since `since_ms` (fallback probe for
    /// fills that produced pnl but no fee record).
    async fn pnl_event_symbols_since(&self, since_ms: i64) -> TradeResult<Vec<Symbol>>;

    /// Fills for the symbol since `since_ms`, ≤ [`MAX_FILLS_PER_FETCH`].
    async fn trades_since(&self, symbol: &Symbol, since_ms: i64) -> TradeResult<Vec<TradeRecord>>;

    /// Fills for the symbol with id greater than `from_id`, ≤
    /// [`MAX_FILLS_PER_FETCH`].
    async fn trades_from_id(&self, symbol: &Symbol, from_id: i64) -> TradeResult<Vec<TradeRecord>>;
}

/// Position size for a balance fraction at the given leverage.
///
/// Pure: `(balance * risk_pct / 100 * leverage) / price`.
#[must_use]
pub fn calculate_position_size(
    balance: Decimal,
    risk_pct: Decimal,
    price: Decimal,
    leverage: u32,
) -> Decimal {
    if price.is_zero() {
        return Decimal::ZERO;
    }
    balance * risk_pct / Decimal::ONE_HUNDRED * Decimal::from(leverage) / price
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
    fn position_size_formula() {
        // 1000 USDT, 2% risk, 10x leverage at 4000 => 0.05 base units.
        let size = calculate_position_size(dec!(1000), dec!(2), dec!(4000), 10);
        assert_eq!(size, dec!(0.05));
    }

    #[rstest]
    fn position_size_zero_price_is_zero() {
        assert_eq!(
            calculate_position_size(dec!(1000), dec!(2), dec!(0), 10),
            dec!(0)
        );
    }

    #[rstest]
    fn min_notional_is_ten_usdt() {
        assert_eq!(MIN_NOTIONAL_USDT, dec!(10));
    }
}

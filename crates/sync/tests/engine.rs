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

//! End-to-end sync-engine scenarios against in-memory collaborators.

use std::sync::Arc;

use omniperp_core::{
    models::{OrderAction, PositionSide},
    store::{PositionBuilder, TradeStore},
    symbol::Symbol,
    time::unix_ms,
    trader::Trader,
};
use omniperp_sync::{
    checkpoint::RECOVERY_WINDOW_MS,
    engine::SyncEngine,
    testing::{InMemoryPositionBuilder, InMemoryStore, ScriptedTrader, fill},
};
use rstest::rstest;
use rust_decimal_macros::dec;

struct Harness {
    trader: Arc<ScriptedTrader>,
    store: Arc<InMemoryStore>,
    builder: Arc<InMemoryPositionBuilder>,
    engine: SyncEngine,
}

fn harness() -> Harness {
    let trader = Arc::new(ScriptedTrader::new());
    let store = Arc::new(InMemoryStore::new());
    let builder = Arc::new(InMemoryPositionBuilder::new());
    let engine = SyncEngine::new(
        Arc::clone(&trader) as Arc<dyn Trader>,
        Arc::clone(&store) as Arc<dyn TradeStore>,
        Arc::clone(&builder) as Arc<dyn PositionBuilder>,
    );
    Harness {
        trader,
        store,
        builder,
        engine,
    }
}

fn eth() -> Symbol {
    Symbol::new("ETHUSDT").unwrap()
}

#[rstest]
#[tokio::test]
async fn open_then_close_long_leaves_no_position() {
    let h = harness();
    let now = unix_ms();
    h.trader.push_fills([
        fill("1", eth(), OrderAction::OpenLong, dec!(0.1), dec!(3500), dec!(0.5), dec!(0), now - 5_000),
        fill("2", eth(), OrderAction::CloseLong, dec!(0.1), dec!(3600), dec!(0.5), dec!(10.0), now - 4_000),
    ]);

    let report = h.engine.run_cycle().await.unwrap();
    assert_eq!(report.fills_inserted, 2);
    assert!(report.checkpoint_advanced);

    assert!(h.builder.open_positions().is_empty());
    let closed = h.builder.closed_positions();
    assert_eq!(closed.len(), 1);
    assert_eq!(closed[0].realized_pnl, dec!(10.0));
}

#[rstest]
#[tokio::test]
async fn short_closed_with_buy_creates_no_phantom_long() {
    let h = harness();
    let now = unix_ms();
    h.trader.push_fills([
        fill("1", eth(), OrderAction::OpenShort, dec!(0.05), dec!(3500), dec!(0.2), dec!(0), now - 5_000),
        fill("2", eth(), OrderAction::CloseShort, dec!(0.05), dec!(3400), dec!(0.2), dec!(5.0), now - 4_000),
    ]);

    h.engine.run_cycle().await.unwrap();

    assert!(h.builder.open_positions().is_empty());
    assert!(
        h.builder
            .open_positions()
            .iter()
            .all(|p| p.side != PositionSide::Long),
        "no phantom LONG may appear"
    );
    let closed = h.builder.closed_positions();
    assert_eq!(closed.len(), 1);
    assert_eq!(closed[0].side, PositionSide::Short);
}

#[rstest]
#[tokio::test]
async fn same_side_adds_average_entry_price() {
    let h = harness();
    let now = unix_ms();
    h.trader.push_fills([
        fill("1", eth(), OrderAction::OpenLong, dec!(0.1), dec!(3500), dec!(0.1), dec!(0), now - 5_000),
        fill("2", eth(), OrderAction::OpenLong, dec!(0.1), dec!(3600), dec!(0.1), dec!(0), now - 4_000),
    ]);

    h.engine.run_cycle().await.unwrap();

    let open = h.builder.open_positions();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].quantity, dec!(0.2));
    assert_eq!(open[0].entry_price, dec!(3550));
}

#[rstest]
#[tokio::test]
async fn partial_close_keeps_position_open() {
    let h = harness();
    let now = unix_ms();
    h.trader.push_fills([
        fill("1", eth(), OrderAction::OpenLong, dec!(1.0), dec!(3500), dec!(1), dec!(0), now - 5_000),
        fill("2", eth(), OrderAction::CloseLong, dec!(0.3), dec!(3600), dec!(0.3), dec!(30), now - 4_000),
    ]);

    h.engine.run_cycle().await.unwrap();

    let open = h.builder.open_positions();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].quantity, dec!(0.7));
    let closed = h.builder.closed_positions();
    assert_eq!(closed.len(), 1);
    assert_eq!(closed[0].quantity, dec!(0.3));
}

#[rstest]
#[tokio::test]
async fn replaying_a_cycle_inserts_nothing_new() {
    let h = harness();
    let now = unix_ms();
    h.trader.push_fills([
        fill("1", eth(), OrderAction::OpenLong, dec!(0.1), dec!(3500), dec!(0.5), dec!(0), now - 5_000),
        fill("2", eth(), OrderAction::CloseLong, dec!(0.1), dec!(3600), dec!(0.5), dec!(10), now - 4_000),
    ]);

    let first = h.engine.run_cycle().await.unwrap();
    assert_eq!(first.fills_inserted, 2);
    let count_after_first = h.store.fill_count();

    let second = h.engine.run_cycle().await.unwrap();
    assert_eq!(second.fills_inserted, 0);
    assert_eq!(h.store.fill_count(), count_after_first);
}

#[rstest]
#[tokio::test]
async fn refetched_fills_are_skipped_by_trade_id() {
    let h = harness();
    let now = unix_ms();
    // Opaque (non-numeric) ids disable the watermark path, forcing the
    // time-window fetch to re-deliver.
    h.trader.push_fills([fill(
        "exec-a1",
        eth(),
        OrderAction::OpenLong,
        dec!(0.1),
        dec!(3500),
        dec!(0.5),
        dec!(0),
        now - 5_000,
    )]);
    let first = h.engine.run_cycle().await.unwrap();
    assert_eq!(first.fills_inserted, 1);

    // The venue reports the same fill again inside the new window.
    let later = unix_ms() + 1;
    h.trader.push_fills([fill(
        "exec-a1",
        eth(),
        OrderAction::OpenLong,
        dec!(0.1),
        dec!(3500),
        dec!(0.5),
        dec!(0),
        later,
    )]);
    let second = h.engine.run_cycle().await.unwrap();
    assert!(second.fills_fetched >= 1);
    assert_eq!(second.fills_inserted, 0);
    assert_eq!(h.store.fill_count(), 1);
}

#[rstest]
#[tokio::test]
async fn failed_symbol_holds_checkpoint_until_retry() {
    let h = harness();
    let btc = Symbol::new("BTCUSDT").unwrap();

    // A clean empty cycle establishes the in-memory checkpoint.
    let warmup = h.engine.run_cycle().await.unwrap();
    assert!(warmup.checkpoint_advanced);

    let later = unix_ms() + 1;
    h.trader.push_fills([
        fill("1", eth(), OrderAction::OpenLong, dec!(0.1), dec!(3500), dec!(0.5), dec!(0), later),
        fill("9", btc, OrderAction::OpenLong, dec!(0.01), dec!(60000), dec!(0.5), dec!(0), later),
    ]);
    h.trader.fail_symbol(btc);

    let report = h.engine.run_cycle().await.unwrap();
    assert_eq!(report.symbols_failed, 1);
    assert!(!report.checkpoint_advanced);
    // The healthy symbol's fill still landed.
    assert_eq!(h.store.fill_count(), 1);

    h.trader.heal_symbol(&btc);
    let report = h.engine.run_cycle().await.unwrap();
    assert_eq!(report.symbols_failed, 0);
    assert!(report.checkpoint_advanced);
    assert_eq!(h.store.fill_count(), 2);
}

#[rstest]
#[tokio::test]
async fn future_checkpoint_resets_to_recovery_window() {
    let h = harness();
    let now = unix_ms();
    // Corrupt: persisted fill time eight hours in the future.
    h.store.seed_last_fill_time(now + 8 * 60 * 60 * 1_000);
    h.trader.push_fills([fill(
        "1",
        eth(),
        OrderAction::OpenLong,
        dec!(0.1),
        dec!(3500),
        dec!(0.5),
        dec!(0),
        now - 60_000,
    )]);

    let report = h.engine.run_cycle().await.unwrap();
    assert_eq!(report.fills_inserted, 1, "real fills must still be fetched");

    // The fill fetch must have used the recovery window, not the future time.
    let observed = h.trader.observed_since();
    assert_eq!(observed.len(), 1);
    let since = observed[0].1;
    assert!(since <= now - RECOVERY_WINDOW_MS + 5_000, "since was {since}");
    assert!(since > now - RECOVERY_WINDOW_MS - 60_000);
}

#[rstest]
#[tokio::test]
async fn fills_apply_in_ascending_time_order() {
    let h = harness();
    let now = unix_ms();
    // Queue out of order; replay must sort by time.
    h.trader.push_fills([
        fill("2", eth(), OrderAction::CloseLong, dec!(0.1), dec!(3600), dec!(0.5), dec!(10), now - 4_000),
        fill("1", eth(), OrderAction::OpenLong, dec!(0.1), dec!(3500), dec!(0.5), dec!(0), now - 5_000),
    ]);

    h.engine.run_cycle().await.unwrap();

    assert!(h.builder.open_positions().is_empty());
    let fills = h.store.fills();
    assert_eq!(fills[0].trade_id, "1");
    assert_eq!(fills[1].trade_id, "2");
}

#[rstest]
#[tokio::test]
async fn watermark_path_skips_known_trade_ids() {
    let h = harness();
    let now = unix_ms();
    h.trader.push_fills([fill(
        "10",
        eth(),
        OrderAction::OpenLong,
        dec!(0.1),
        dec!(3500),
        dec!(0.5),
        dec!(0),
        now - 10_000,
    )]);
    h.engine.run_cycle().await.unwrap();
    assert_eq!(h.store.fill_count(), 1);

    // New venue activity with higher ids, landing after the first cycle; the
    // engine must use the from-id path (store watermark = 10) and pick up
    // only the new fill.
    let later = unix_ms() + 1;
    h.trader.push_fills([fill(
        "11",
        eth(),
        OrderAction::CloseLong,
        dec!(0.1),
        dec!(3600),
        dec!(0.5),
        dec!(10),
        later,
    )]);
    let report = h.engine.run_cycle().await.unwrap();
    assert_eq!(report.fills_inserted, 1);
    assert_eq!(h.store.fill_count(), 2);
    assert!(h.builder.open_positions().is_empty());
}

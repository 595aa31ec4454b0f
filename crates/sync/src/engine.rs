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

//! The incremental sync cycle and its background task.

use std::{sync::Arc, time::Duration};

use omniperp_core::{
    error::TradeResult,
    models::TradeRecord,
    store::{FillRecord, OrderRecord, PositionBuilder, TradeStore},
    symbol::Symbol,
    time::unix_ms,
    trader::Trader,
};
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};
use tracing::{debug, error, info, warn};

use crate::{
    checkpoint::{CheckpointMap, effective_start},
    infer::resolve_action,
};

/// Outcome of one sync cycle, mainly for logs and tests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub symbols_scanned: usize,
    pub symbols_failed: usize,
    pub fills_fetched: usize,
    pub fills_inserted: usize,
    pub checkpoint_advanced: bool,
}

/// Incremental sync engine for one (trader, exchange) pair.
pub struct SyncEngine {
    trader: Arc<dyn Trader>,
    store: Arc<dyn TradeStore>,
    builder: Arc<dyn PositionBuilder>,
    checkpoints: CheckpointMap,
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("exchange_id", &self.trader.exchange_id())
            .finish()
    }
}

impl SyncEngine {
    /// Creates an engine borrowing the trader for query capability.
    #[must_use]
    pub fn new(
        trader: Arc<dyn Trader>,
        store: Arc<dyn TradeStore>,
        builder: Arc<dyn PositionBuilder>,
    ) -> Self {
        Self {
            trader,
            store,
            builder,
            checkpoints: CheckpointMap::new(),
        }
    }

    /// Runs one sync cycle.
    ///
    /// The checkpoint advances to the cycle's start time only when every
    /// per-symbol query succeeded; otherwise it stays put and the next cycle
    /// retries the same window.
    pub async fn run_cycle(&self) -> TradeResult<CycleReport> {
        let exchange_id = self.trader.exchange_id();

        // 1. Load (or recover) the checkpoint.
        let checkpoint = match self.checkpoints.get(exchange_id).await {
            Some(value) => value,
            None => {
                let persisted = self.store.last_fill_time_by_exchange(exchange_id).await?;
                let (start, corrupt) = effective_start(persisted, unix_ms());
                if corrupt {
                    error!(
                        %exchange_id,
                        start_ms = start,
                        "corrupt persisted checkpoint, recovered to 24h window"
                    );
                }
                start
            }
        };

        // 2. Snapshot the advance target before any network I/O; advancing to
        //    now-after-queries would miss fills landing during the cycle.
        let sync_start_ms = unix_ms();

        // 3. Discover changed symbols.
        let symbols = self.discover_symbols(checkpoint).await?;
        if symbols.is_empty() {
            self.checkpoints.set(exchange_id, sync_start_ms).await;
            return Ok(CycleReport {
                checkpoint_advanced: true,
                ..CycleReport::default()
            });
        }

        // 4. Fetch fills per symbol, recording per-symbol success.
        let watermarks = self.store.max_trade_ids_by_exchange(exchange_id).await?;
        let mut fills: Vec<TradeRecord> = Vec::new();
        let mut failed = 0_usize;
        for symbol in &symbols {
            let result = match watermarks.get(symbol) {
                Some(max_id) => self.trader.trades_from_id(symbol, *max_id).await,
                None => self.trader.trades_since(symbol, checkpoint).await,
            };
            match result {
                Ok(batch) => fills.extend(batch),
                Err(e) => {
                    failed += 1;
                    warn!(%exchange_id, %symbol, error = %e, "fill fetch failed, will retry next cycle");
                }
            }
        }

        // 5. Advance only on a fully clean pass.
        let advanced = failed == 0;
        if advanced {
            self.checkpoints.set(exchange_id, sync_start_ms).await;
        }

        // 6. Position replay is not commutative; apply in fill-time order.
        fills.sort_by(|a, b| {
            a.time_ms
                .cmp(&b.time_ms)
                .then_with(|| a.trade_id.cmp(&b.trade_id))
        });

        // 7. Idempotent insertion and position replay.
        let fetched = fills.len();
        let mut inserted = 0_usize;
        for fill in fills {
            if self
                .store
                .order_by_exchange_id(exchange_id, &fill.trade_id)
                .await?
                .is_some()
            {
                continue;
            }
            let action = resolve_action(&fill);
            let order = OrderRecord {
                exchange_id,
                trade_id: fill.trade_id.clone(),
                order_id: fill.order_id.clone(),
                symbol: fill.symbol,
                side: fill.side,
                position_side: action.position_side(),
                action,
                price: fill.price,
                quantity: fill.quantity,
                time_ms: fill.time_ms,
            };
            let record = FillRecord {
                exchange_id,
                trade_id: fill.trade_id.clone(),
                order_id: fill.order_id.clone(),
                symbol: fill.symbol,
                side: fill.side,
                position_side: action.position_side(),
                action,
                price: fill.price,
                quantity: fill.quantity,
                fee: fill.fee,
                realized_pnl: fill.realized_pnl,
                time_ms: fill.time_ms,
            };
            self.store.create_order(order).await?;
            self.store.create_fill(record.clone()).await?;
            self.builder.process_trade(&record).await?;
            inserted += 1;
        }

        let report = CycleReport {
            symbols_scanned: symbols.len(),
            symbols_failed: failed,
            fills_fetched: fetched,
            fills_inserted: inserted,
            checkpoint_advanced: advanced,
        };
        debug!(%exchange_id, ?report, "sync cycle complete");
        Ok(report)
    }

    /// Union of the discovery probes.
    ///
    /// No single probe suffices: fee rebates and VIP tiers can silence the
    /// fee stream, opening fills produce no pnl, and a partially failed
    /// previous cycle leaves symbols only the store remembers.
    async fn discover_symbols(&self, since_ms: i64) -> TradeResult<Vec<Symbol>> {
        let exchange_id = self.trader.exchange_id();
        let mut symbols: Vec<Symbol> = Vec::new();
        fn push(symbols: &mut Vec<Symbol>, symbol: Symbol) {
            if !symbols.contains(&symbol) {
                symbols.push(symbol);
            }
        }

        for symbol in self.trader.fee_event_symbols_since(since_ms).await? {
            push(&mut symbols, symbol);
        }
        for position in self.trader.get_positions().await? {
            push(&mut symbols, position.symbol);
        }
        for symbol in self
            .store
            .recent_fill_symbols_by_exchange(exchange_id, since_ms)
            .await?
        {
            push(&mut symbols, symbol);
        }
        if symbols.is_empty() {
            for symbol in self.trader.pnl_event_symbols_since(since_ms).await? {
                push(&mut symbols, symbol);
            }
        }
        Ok(symbols)
    }

    /// Spawns the periodic background task.
    ///
    /// Cycles never overlap: the ticker delays missed ticks and each
    /// iteration completes before the next starts. Cycle errors are logged
    /// and never crash the host. Shutdown lets an in-flight venue request
    /// complete and exits without advancing the checkpoint.
    #[must_use]
    pub fn spawn(self: Arc<Self>, period: Duration) -> SyncEngineHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let engine = Arc::clone(&self);
        let task = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        match engine.run_cycle().await {
                            Ok(report) if report.symbols_failed > 0 => {
                                warn!(exchange_id = %engine.trader.exchange_id(), ?report, "sync cycle partially failed");
                            }
                            Ok(_) => {}
                            Err(e) => {
                                error!(exchange_id = %engine.trader.exchange_id(), error = %e, "sync cycle failed");
                            }
                        }
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            info!(exchange_id = %engine.trader.exchange_id(), "sync task shutting down");
                            break;
                        }
                    }
                }
            }
        });
        SyncEngineHandle { shutdown_tx, task }
    }
}

/// Handle owning a spawned sync task.
#[derive(Debug)]
pub struct SyncEngineHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SyncEngineHandle {
    /// Signals shutdown and waits for the task to exit cleanly.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        let _ = self.task.await;
    }

    /// Aborts the task without waiting (tests and process teardown).
    pub fn abort(self) {
        self.task.abort();
    }
}

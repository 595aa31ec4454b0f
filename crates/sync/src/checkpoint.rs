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

//! Per-exchange sync checkpoints.
//!
//! The in-memory map survives across cycles within a process; across
//! restarts the checkpoint is recovered from the newest persisted fill time.
//! A persisted time in the future is corrupt and resets the effective start
//! to `now − 24h` rather than silently skipping a day of fills.

use std::collections::HashMap;

use omniperp_core::models::ExchangeId;
use tokio::sync::RwLock;
use tracing::warn;

/// Recovery window applied on first sync and on corrupt checkpoints.
pub const RECOVERY_WINDOW_MS: i64 = 24 * 60 * 60 * 1_000;

/// Buffer added to a recovered fill time to avoid boundary duplicates.
pub const RECOVERY_BUFFER_MS: i64 = 1_000;

/// In-memory checkpoint map, guarded by a reader-writer lock with short
/// critical sections.
#[derive(Debug, Default)]
pub struct CheckpointMap {
    inner: RwLock<HashMap<ExchangeId, i64>>,
}

impl CheckpointMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the checkpoint for an exchange, if one is held in memory.
    pub async fn get(&self, exchange_id: ExchangeId) -> Option<i64> {
        self.inner.read().await.get(&exchange_id).copied()
    }

    /// Advances the checkpoint.
    pub async fn set(&self, exchange_id: ExchangeId, checkpoint_ms: i64) {
        self.inner.write().await.insert(exchange_id, checkpoint_ms);
    }
}

/// Computes the effective sync start from a persisted last-fill time.
///
/// Returns the start and whether the persisted value was corrupt
/// (future-dated relative to `now_ms`).
#[must_use]
pub fn effective_start(persisted_last_fill_ms: Option<i64>, now_ms: i64) -> (i64, bool) {
    match persisted_last_fill_ms {
        None => (now_ms - RECOVERY_WINDOW_MS, false),
        Some(t) if t > now_ms => {
            warn!(
                persisted_ms = t,
                now_ms, "persisted fill time is in the future, resetting recovery window"
            );
            (now_ms - RECOVERY_WINDOW_MS, true)
        }
        Some(t) => (t + RECOVERY_BUFFER_MS, false),
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    const NOW: i64 = 1_700_000_000_000;

    #[rstest]
    fn nothing_persisted_uses_recovery_window() {
        let (start, corrupt) = effective_start(None, NOW);
        assert_eq!(start, NOW - RECOVERY_WINDOW_MS);
        assert!(!corrupt);
    }

    #[rstest]
    fn persisted_time_gets_buffer() {
        let (start, corrupt) = effective_start(Some(NOW - 60_000), NOW);
        assert_eq!(start, NOW - 60_000 + RECOVERY_BUFFER_MS);
        assert!(!corrupt);
    }

    #[rstest]
    fn future_time_is_corrupt() {
        let (start, corrupt) = effective_start(Some(NOW + 8 * 60 * 60 * 1_000), NOW);
        assert_eq!(start, NOW - RECOVERY_WINDOW_MS);
        assert!(corrupt);
    }

    #[rstest]
    #[tokio::test]
    async fn map_round_trip() {
        let map = CheckpointMap::new();
        assert_eq!(map.get(ExchangeId::Binance).await, None);
        map.set(ExchangeId::Binance, NOW).await;
        assert_eq!(map.get(ExchangeId::Binance).await, Some(NOW));
        assert_eq!(map.get(ExchangeId::Bybit).await, None);
    }
}

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

//! Short-TTL caches for balance, position, and contract-metadata queries.
//!
//! One generic implementation covers all three: a value slot plus its write
//! instant behind a reader-writer lock. Readers never block each other;
//! refreshes take the write lock only long enough to swap the slot.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::sync::RwLock;

use crate::{error::TradeResult, precision::ContractMeta, symbol::Symbol};

/// A single-value cache with a time-to-live predicate.
#[derive(Debug)]
pub struct TtlCache<T> {
    ttl: Duration,
    slot: RwLock<Option<(T, Instant)>>,
}

impl<T: Clone> TtlCache<T> {
    /// Creates an empty cache with the given TTL.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: RwLock::new(None),
        }
    }

    /// Returns the cached value if it is younger than the TTL.
    pub async fn get(&self) -> Option<T> {
        let guard = self.slot.read().await;
        match guard.as_ref() {
            Some((value, written_at)) if written_at.elapsed() < self.ttl => Some(value.clone()),
            _ => None,
        }
    }

    /// Stores a fresh value.
    pub async fn put(&self, value: T) {
        let mut guard = self.slot.write().await;
        *guard = Some((value, Instant::now()));
    }

    /// Drops any cached value.
    pub async fn invalidate(&self) {
        let mut guard = self.slot.write().await;
        *guard = None;
    }

    /// Returns the cached value or refreshes it through `refresh`.
    ///
    /// Concurrent misses may both run `refresh`; the second write wins and is
    /// harmless for the idempotent venue queries cached here.
    pub async fn get_or_refresh<F, Fut>(&self, refresh: F) -> TradeResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = TradeResult<T>>,
    {
        if let Some(value) = self.get().await {
            return Ok(value);
        }
        let fresh = refresh().await?;
        self.put(fresh.clone()).await;
        Ok(fresh)
    }
}

/// Session-long contract-metadata cache, write-once per symbol.
#[derive(Debug, Default)]
pub struct ContractMetaCache {
    inner: DashMap<Symbol, ContractMeta>,
}

impl ContractMetaCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached metadata for `symbol`, if any.
    #[must_use]
    pub fn get(&self, symbol: &Symbol) -> Option<ContractMeta> {
        self.inner.get(symbol).map(|entry| entry.clone())
    }

    /// Inserts metadata for `symbol`; a concurrent duplicate write is harmless.
    pub fn insert(&self, meta: ContractMeta) {
        self.inner.insert(meta.symbol, meta);
    }

    /// Number of cached contracts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
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
    #[tokio::test]
    async fn ttl_cache_expires() {
        let cache = TtlCache::new(Duration::from_millis(20));
        cache.put(42_u64).await;
        assert_eq!(cache.get().await, Some(42));
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(cache.get().await, None);
    }

    #[rstest]
    #[tokio::test]
    async fn get_or_refresh_fetches_once_within_ttl() {
        let cache = TtlCache::new(Duration::from_secs(60));
        let first = cache.get_or_refresh(|| async { Ok(1_u64) }).await.unwrap();
        // A second call must be served from cache, not from the closure.
        let second = cache
            .get_or_refresh(|| async { panic!("refresh must not run") })
            .await
            .unwrap();
        assert_eq!(first, 1);
        assert_eq!(second, 1);
    }

    #[rstest]
    #[tokio::test]
    async fn invalidate_forces_refresh() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.put(1_u64).await;
        cache.invalidate().await;
        let value = cache.get_or_refresh(|| async { Ok(2_u64) }).await.unwrap();
        assert_eq!(value, 2);
    }
}

//! Cached base load with an explicit refresh timestamp and staleness
//! threshold. One cache can back many sessions; the dataset it hands out is
//! immutable.

use crate::loader::DataLoader;
use crate::source::TableSource;
use chrono::{DateTime, Duration, Utc};
use helios_core::error::HeliosResult;
use helios_core::types::Dataset;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub dataset: Arc<Dataset>,
    pub refreshed_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn age_at(&self, now: DateTime<Utc>) -> Duration {
        now - self.refreshed_at
    }

    pub fn is_stale_at(&self, now: DateTime<Utc>, staleness: Duration) -> bool {
        self.age_at(now) >= staleness
    }
}

pub struct DatasetCache<S> {
    loader: DataLoader<S>,
    staleness: Duration,
    entry: RwLock<Option<CacheEntry>>,
}

impl<S: TableSource> DatasetCache<S> {
    pub fn new(source: S, staleness: Duration) -> Self {
        Self {
            loader: DataLoader::new(source),
            staleness,
            entry: RwLock::new(None),
        }
    }

    /// Cached dataset, re-read first if missing or stale.
    pub fn load(&self) -> HeliosResult<Arc<Dataset>> {
        self.load_at(Utc::now())
    }

    pub fn load_at(&self, now: DateTime<Utc>) -> HeliosResult<Arc<Dataset>> {
        if let Some(entry) = self.fresh_entry(now) {
            debug!(refreshed_at = %entry.refreshed_at, "Dataset cache hit");
            return Ok(entry.dataset);
        }

        let mut slot = self.entry.write();
        // Another session may have refreshed while we waited for the lock.
        if let Some(entry) = slot.as_ref().filter(|e| !e.is_stale_at(now, self.staleness)) {
            return Ok(entry.dataset.clone());
        }
        let entry = self.read_through(now)?;
        let dataset = entry.dataset.clone();
        *slot = Some(entry);
        Ok(dataset)
    }

    /// Unconditionally re-read the sources. On failure the previous entry is
    /// dropped too, so no caller keeps computing on data that could not be
    /// re-validated.
    pub fn refresh(&self) -> HeliosResult<Arc<Dataset>> {
        self.refresh_at(Utc::now())
    }

    pub fn refresh_at(&self, now: DateTime<Utc>) -> HeliosResult<Arc<Dataset>> {
        let mut slot = self.entry.write();
        match self.read_through(now) {
            Ok(entry) => {
                let dataset = entry.dataset.clone();
                *slot = Some(entry);
                Ok(dataset)
            }
            Err(e) => {
                *slot = None;
                Err(e)
            }
        }
    }

    pub fn last_refreshed(&self) -> Option<DateTime<Utc>> {
        self.entry.read().as_ref().map(|e| e.refreshed_at)
    }

    fn fresh_entry(&self, now: DateTime<Utc>) -> Option<CacheEntry> {
        self.entry
            .read()
            .as_ref()
            .filter(|e| !e.is_stale_at(now, self.staleness))
            .cloned()
    }

    fn read_through(&self, now: DateTime<Utc>) -> HeliosResult<CacheEntry> {
        metrics::counter!("helios.dataset.refresh").increment(1);
        match self.loader.load() {
            Ok(dataset) => {
                info!(source = %self.loader.source().describe(), "Dataset cache refreshed");
                Ok(CacheEntry {
                    dataset: Arc::new(dataset),
                    refreshed_at: now,
                })
            }
            Err(e) => {
                warn!(error = %e, "Dataset refresh failed");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{RawTable, TableKind, WarehouseSnapshot};
    use helios_core::error::HeliosError;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct CountingSource {
        inner: WarehouseSnapshot,
        reads: AtomicUsize,
        broken: AtomicBool,
    }

    impl TableSource for CountingSource {
        fn read_table(&self, kind: TableKind) -> HeliosResult<RawTable> {
            if self.broken.load(Ordering::SeqCst) {
                return Err(HeliosError::data_unavailable(kind.name(), "connection reset"));
            }
            if kind == TableKind::Influencers {
                self.reads.fetch_add(1, Ordering::SeqCst);
            }
            self.inner.read_table(kind)
        }

        fn describe(&self) -> String {
            "counting".into()
        }
    }

    fn source() -> CountingSource {
        let empty = |headers: &[&str]| RawTable::new(headers.iter(), Vec::<Vec<String>>::new());
        CountingSource {
            inner: WarehouseSnapshot::new("test")
                .with_table(
                    TableKind::Influencers,
                    empty(&["influencer_id", "name", "platform", "persona"]),
                )
                .with_table(TableKind::Posts, empty(&["post_id", "influencer_id", "date"]))
                .with_table(
                    TableKind::Tracking,
                    empty(&["date", "influencer_id", "source", "revenue"]),
                )
                .with_table(TableKind::Payouts, empty(&["influencer_id", "total_payout"])),
            reads: AtomicUsize::new(0),
            broken: AtomicBool::new(false),
        }
    }

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-06-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_load_reuses_fresh_entry() {
        let cache = DatasetCache::new(source(), Duration::minutes(10));
        let first = cache.load_at(t0()).unwrap();
        let second = cache.load_at(t0() + Duration::minutes(5)).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.loader.source().reads.load(Ordering::SeqCst), 1);
        assert_eq!(cache.last_refreshed(), Some(t0()));
    }

    #[test]
    fn test_stale_entry_is_reread() {
        let cache = DatasetCache::new(source(), Duration::minutes(10));
        cache.load_at(t0()).unwrap();
        cache.load_at(t0() + Duration::minutes(10)).unwrap();
        assert_eq!(cache.loader.source().reads.load(Ordering::SeqCst), 2);
        assert_eq!(cache.last_refreshed(), Some(t0() + Duration::minutes(10)));
    }

    #[test]
    fn test_refresh_always_rereads() {
        let cache = DatasetCache::new(source(), Duration::hours(1));
        cache.load_at(t0()).unwrap();
        cache.refresh_at(t0() + Duration::seconds(1)).unwrap();
        assert_eq!(cache.loader.source().reads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_failed_refresh_leaves_no_partial_data() {
        let cache = DatasetCache::new(source(), Duration::hours(1));
        cache.load_at(t0()).unwrap();
        cache.loader.source().broken.store(true, Ordering::SeqCst);

        let err = cache.refresh_at(t0() + Duration::minutes(1)).unwrap_err();
        assert!(matches!(err, HeliosError::DataUnavailable { .. }));
        assert!(cache.last_refreshed().is_none());
        assert!(cache.load_at(t0() + Duration::minutes(2)).is_err());
    }
}

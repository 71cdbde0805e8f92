//! Daily JSON cache keyed by symbol and calendar day.
//!
//! One file per symbol: `{cache_dir}/{SYMBOL}_{YYYY-MM-DD}.json`, holding the
//! full history fetched on that day plus a BLAKE3 hash of the bars. Opening a
//! symbol deletes its files from earlier days. Writes are atomic: write to
//! .tmp then rename. Files that fail to parse or hash are moved aside to
//! `.corrupt` and treated as a miss.

use super::provider::{bars_in_range, DataError, DataProvider, DataSource, FetchResult};
use crate::domain::DailyBar;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, warn};

/// On-disk payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedSeries {
    pub symbol: String,
    pub cached_on: NaiveDate,
    pub data_hash: String,
    pub bars: Vec<DailyBar>,
}

fn hash_bars(bars: &[DailyBar]) -> Result<String, DataError> {
    let bytes = serde_json::to_vec(bars)
        .map_err(|e| DataError::CacheError(format!("hash serialization: {e}")))?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}

/// Split `{YYYY-MM-DD}.json[.tmp|.corrupt]` into the day and whether it is
/// a live cache file.
fn split_cache_name(rest: &str) -> Option<(NaiveDate, bool)> {
    let (day, live) = if let Some(day) = rest.strip_suffix(".json") {
        (day, true)
    } else if let Some(day) = rest
        .strip_suffix(".json.tmp")
        .or_else(|| rest.strip_suffix(".json.corrupt"))
    {
        (day, false)
    } else {
        return None;
    };
    day.parse::<NaiveDate>().ok().map(|day| (day, live))
}

#[derive(Debug, Clone)]
pub struct DailyCache {
    cache_dir: PathBuf,
    cache_day: NaiveDate,
}

impl DailyCache {
    pub fn new(cache_dir: impl Into<PathBuf>, cache_day: NaiveDate) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            cache_day,
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn cache_day(&self) -> NaiveDate {
        self.cache_day
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.cache_dir
            .join(format!("{}_{}.json", symbol.to_uppercase(), self.cache_day))
    }

    /// Cached bars for today, or `None` on a miss.
    pub fn load(&self, symbol: &str) -> Result<Option<Vec<DailyBar>>, DataError> {
        self.prune(symbol)?;
        let path = self.path_for(symbol);
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)
            .map_err(|e| DataError::CacheError(format!("read {}: {e}", path.display())))?;
        let cached: CachedSeries = match serde_json::from_str(&content) {
            Ok(cached) => cached,
            Err(e) => {
                warn!(symbol, error = %e, "cache file unreadable, quarantining");
                self.quarantine(&path)?;
                return Ok(None);
            }
        };

        if hash_bars(&cached.bars)? != cached.data_hash {
            warn!(symbol, "cache hash mismatch, quarantining");
            self.quarantine(&path)?;
            return Ok(None);
        }

        debug!(symbol, bars = cached.bars.len(), "cache hit");
        Ok(Some(cached.bars))
    }

    /// Write today's file for `symbol`.
    pub fn store(&self, symbol: &str, bars: &[DailyBar]) -> Result<(), DataError> {
        fs::create_dir_all(&self.cache_dir)
            .map_err(|e| DataError::CacheError(format!("failed to create dir: {e}")))?;

        let payload = CachedSeries {
            symbol: symbol.to_uppercase(),
            cached_on: self.cache_day,
            data_hash: hash_bars(bars)?,
            bars: bars.to_vec(),
        };
        let json = serde_json::to_string(&payload)
            .map_err(|e| DataError::CacheError(format!("serialization: {e}")))?;

        let path = self.path_for(symbol);
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, json)
            .map_err(|e| DataError::CacheError(format!("write {}: {e}", tmp_path.display())))?;
        fs::rename(&tmp_path, &path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            DataError::CacheError(format!("atomic rename failed: {e}"))
        })?;
        Ok(())
    }

    /// Delete files for `symbol` from days other than the cache day, along
    /// with any quarantined or leftover temporary files. Returns how many
    /// were removed.
    pub fn prune(&self, symbol: &str) -> Result<usize, DataError> {
        let entries = match fs::read_dir(&self.cache_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(DataError::CacheError(format!("list cache dir: {e}"))),
        };

        let prefix = format!("{}_", symbol.to_uppercase());
        let mut removed = 0;
        for entry in entries.flatten() {
            let name = entry.file_name();
            let Some((day, live)) = name
                .to_str()
                .and_then(|n| n.strip_prefix(&prefix))
                .and_then(split_cache_name)
            else {
                continue;
            };
            if !live || day != self.cache_day {
                fs::remove_file(entry.path())
                    .map_err(|e| DataError::CacheError(format!("prune: {e}")))?;
                removed += 1;
            }
        }
        if removed > 0 {
            debug!(symbol, removed, "pruned stale cache files");
        }
        Ok(removed)
    }

    fn quarantine(&self, path: &Path) -> Result<(), DataError> {
        fs::rename(path, path.with_extension("json.corrupt"))
            .map_err(|e| DataError::CacheError(format!("quarantine: {e}")))
    }
}

/// Provider wrapper that serves full histories from a [`DailyCache`],
/// fetching from `inner` at most once per symbol per day.
pub struct CachedProvider<P> {
    inner: P,
    cache: DailyCache,
    loaded: Mutex<HashMap<String, Vec<DailyBar>>>,
}

impl<P: DataProvider> CachedProvider<P> {
    pub fn new(inner: P, cache: DailyCache) -> Self {
        Self {
            inner,
            cache,
            loaded: Mutex::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    fn full_history(&self, symbol: &str) -> Result<Vec<DailyBar>, DataError> {
        let key = symbol.to_uppercase();
        let mut loaded = self.loaded.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(bars) = loaded.get(&key) {
            return Ok(bars.clone());
        }

        let bars = match self.cache.load(&key)? {
            Some(bars) => bars,
            None => {
                let fetched = self.inner.fetch(&key, NaiveDate::MIN, self.cache.cache_day())?;
                self.cache.store(&key, &fetched.bars)?;
                fetched.bars
            }
        };
        loaded.insert(key, bars.clone());
        Ok(bars)
    }
}

impl<P: DataProvider> DataProvider for CachedProvider<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        let bars = self.full_history(symbol)?;
        Ok(FetchResult {
            symbol: symbol.to_uppercase(),
            bars: bars_in_range(&bars, start, end),
            source: DataSource::Cache,
        })
    }

    fn is_available(&self) -> bool {
        self.inner.is_available()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::memory::InMemoryProvider;
    use crate::domain::daily_bars;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn sample_bars() -> Vec<DailyBar> {
        daily_bars(day(1), &[10.0, 11.0, 12.5, 12.0])
    }

    #[test]
    fn write_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DailyCache::new(dir.path(), day(10));
        cache.store("spy", &sample_bars()).unwrap();
        assert!(dir.path().join("SPY_2024-03-10.json").exists());
        assert_eq!(cache.load("SPY").unwrap(), Some(sample_bars()));
    }

    #[test]
    fn miss_when_nothing_cached() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DailyCache::new(dir.path().join("absent"), day(10));
        assert_eq!(cache.load("SPY").unwrap(), None);
    }

    #[test]
    fn stale_days_are_pruned() {
        let dir = tempfile::tempdir().unwrap();
        DailyCache::new(dir.path(), day(8)).store("SPY", &sample_bars()).unwrap();
        DailyCache::new(dir.path(), day(9)).store("SPY", &sample_bars()).unwrap();
        DailyCache::new(dir.path(), day(9)).store("QQQ", &sample_bars()).unwrap();

        let today = DailyCache::new(dir.path(), day(10));
        assert_eq!(today.load("SPY").unwrap(), None);
        assert!(!dir.path().join("SPY_2024-03-08.json").exists());
        assert!(!dir.path().join("SPY_2024-03-09.json").exists());
        // other symbols untouched
        assert!(dir.path().join("QQQ_2024-03-09.json").exists());
    }

    #[test]
    fn tampered_file_is_quarantined() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DailyCache::new(dir.path(), day(10));
        cache.store("SPY", &sample_bars()).unwrap();

        let path = cache.path_for("SPY");
        let content = fs::read_to_string(&path).unwrap().replace("12.5", "99.5");
        fs::write(&path, content).unwrap();

        assert_eq!(cache.load("SPY").unwrap(), None);
        assert!(!path.exists());
        assert!(path.with_extension("json.corrupt").exists());
    }

    #[test]
    fn computed_closes_survive_reload() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DailyCache::new(dir.path(), day(10));
        let closes: Vec<f64> = (0..600)
            .map(|i| 50.0 + i as f64 * 0.1 + (i as f64 / 7.0).sin())
            .collect();
        let bars = daily_bars(day(1), &closes);
        cache.store("SPY", &bars).unwrap();

        assert_eq!(cache.load("SPY").unwrap(), Some(bars));
        assert!(!cache.path_for("SPY").with_extension("json.corrupt").exists());
    }

    #[test]
    fn quarantined_and_temp_files_are_pruned() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DailyCache::new(dir.path(), day(10));
        cache.store("SPY", &sample_bars()).unwrap();
        fs::write(dir.path().join("SPY_2024-03-09.json.corrupt"), "{").unwrap();
        fs::write(dir.path().join("SPY_2024-03-10.json.corrupt"), "{").unwrap();
        fs::write(dir.path().join("SPY_2024-03-10.json.tmp"), "{").unwrap();
        fs::write(dir.path().join("QQQ_2024-03-09.json.corrupt"), "{").unwrap();

        assert_eq!(cache.prune("SPY").unwrap(), 3);
        assert!(cache.path_for("SPY").exists());
        assert_eq!(cache.load("SPY").unwrap(), Some(sample_bars()));
        assert!(dir.path().join("QQQ_2024-03-09.json.corrupt").exists());
    }

    #[test]
    fn cached_provider_serves_ranges_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let inner = InMemoryProvider::new().with_symbol("SPY", sample_bars());
        let provider = CachedProvider::new(inner, DailyCache::new(dir.path(), day(10)));

        let result = provider.fetch("SPY", day(2), day(3)).unwrap();
        assert_eq!(result.source, DataSource::Cache);
        assert_eq!(result.bars.len(), 2);
        assert!(dir.path().join("SPY_2024-03-10.json").exists());

        // a fresh wrapper over an empty inner provider still hits the file
        let offline = CachedProvider::new(
            InMemoryProvider::new(),
            DailyCache::new(dir.path(), day(10)),
        );
        assert_eq!(offline.fetch("SPY", day(1), day(31)).unwrap().bars.len(), 4);
    }
}

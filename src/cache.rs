use std::path::PathBuf;

use anyhow::{anyhow, Context};
use chrono::{DateTime, Duration, Local};
use tracing::info;

use crate::models::RawTable;
use crate::source;

/// Default lifetime of a cached export snapshot.
pub const DEFAULT_TTL_SECS: i64 = 600;

/// Converts a configured TTL in seconds, treating negative values as zero.
pub fn ttl_from_secs(secs: i64) -> anyhow::Result<Duration> {
    Duration::try_seconds(secs.max(0))
        .ok_or_else(|| anyhow!("cache TTL of {secs} seconds is out of range"))
}

pub trait Loader {
    fn load(&self) -> anyhow::Result<RawTable>;
}

#[derive(Debug, Clone)]
pub struct CsvLoader {
    pub path: PathBuf,
    pub skip_rows: usize,
}

impl Loader for CsvLoader {
    fn load(&self) -> anyhow::Result<RawTable> {
        source::read_export(&self.path, self.skip_rows)
    }
}

struct Snapshot {
    table: RawTable,
    as_of: DateTime<Local>,
}

/// Host-side cache in front of the export source. The pipeline itself never caches.
pub struct SnapshotCache<L> {
    loader: L,
    ttl: Duration,
    clock: Box<dyn Fn() -> DateTime<Local>>,
    snapshot: Option<Snapshot>,
}

impl<L: Loader> SnapshotCache<L> {
    pub fn new(loader: L, ttl: Duration) -> Self {
        Self::with_clock(loader, ttl, Local::now)
    }

    pub fn with_clock(
        loader: L,
        ttl: Duration,
        clock: impl Fn() -> DateTime<Local> + 'static,
    ) -> Self {
        Self {
            loader,
            ttl,
            clock: Box::new(clock),
            snapshot: None,
        }
    }

    /// Returns the cached export and when it was loaded, reloading once it is older than the TTL.
    pub fn get(&mut self) -> anyhow::Result<(&RawTable, DateTime<Local>)> {
        let now = (self.clock)();
        let fresh = self
            .snapshot
            .as_ref()
            .is_some_and(|snapshot| now - snapshot.as_of < self.ttl);

        if !fresh {
            let table = self.loader.load().context("failed to refresh export snapshot")?;
            info!(rows = table.rows.len(), "loaded export snapshot");
            self.snapshot = Some(Snapshot { table, as_of: now });
        }

        let snapshot = self
            .snapshot
            .as_ref()
            .context("export snapshot unavailable")?;
        Ok((&snapshot.table, snapshot.as_of))
    }

    pub fn invalidate(&mut self) {
        self.snapshot = None;
    }
}

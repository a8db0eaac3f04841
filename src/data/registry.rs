//! Per-region snapshot registry shared by the server and CLI.
//! Readers clone an `Arc` and keep a consistent snapshot for the whole request;
//! a reload swaps in a freshly built snapshot without blocking them.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::data::loader::{load_region, LoadError};
use crate::data::snapshot::MasterSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Region {
    #[serde(rename = "JP")]
    Jp,
    #[serde(rename = "NA")]
    Na,
}

impl Region {
    pub const ALL: [Region; 2] = [Region::Jp, Region::Na];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Jp => "JP",
            Self::Na => "NA",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "JP" => Ok(Self::Jp),
            "NA" => Ok(Self::Na),
            other => Err(format!("unknown region '{other}'")),
        }
    }
}

#[derive(Debug)]
pub struct DataRegistry {
    data_dir: PathBuf,
    snapshots: BTreeMap<Region, RwLock<Arc<MasterSnapshot>>>,
    /// Serialises reloads so generations stay strictly increasing.
    reloading: Mutex<()>,
}

impl DataRegistry {
    /// Load every configured region. Any region failing to load fails the whole registry.
    pub fn load(data_dir: impl Into<PathBuf>, regions: &[Region]) -> Result<Arc<Self>, LoadError> {
        let data_dir = data_dir.into();
        let mut snapshots = BTreeMap::new();
        for &region in regions {
            let tables = load_region(&data_dir, region)?;
            let snapshot = MasterSnapshot::from_tables(region, tables);
            snapshots.insert(region, RwLock::new(Arc::new(snapshot)));
        }
        Ok(Arc::new(Self {
            data_dir,
            snapshots,
            reloading: Mutex::new(()),
        }))
    }

    /// Registry over already-built snapshots. Reloads read from `data_dir`.
    pub fn from_snapshots(
        data_dir: impl Into<PathBuf>,
        snapshots: impl IntoIterator<Item = MasterSnapshot>,
    ) -> Arc<Self> {
        let snapshots = snapshots
            .into_iter()
            .map(|snapshot| (snapshot.region(), RwLock::new(Arc::new(snapshot))))
            .collect();
        Arc::new(Self {
            data_dir: data_dir.into(),
            snapshots,
            reloading: Mutex::new(()),
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn regions(&self) -> impl Iterator<Item = Region> + '_ {
        self.snapshots.keys().copied()
    }

    /// Current snapshot for `region`, or None when the region is not served.
    pub fn snapshot(&self, region: Region) -> Option<Arc<MasterSnapshot>> {
        let slot = self.snapshots.get(&region)?;
        let guard = slot.read().unwrap_or_else(PoisonError::into_inner);
        Some(Arc::clone(&guard))
    }

    /// Re-read `region` from disk and publish it with the next generation number.
    /// On failure the previous snapshot stays in place.
    pub fn reload(&self, region: Region) -> Result<Arc<MasterSnapshot>, LoadError> {
        let slot = self
            .snapshots
            .get(&region)
            .ok_or(LoadError::RegionNotServed(region))?;
        let _reloading = self.reloading.lock().unwrap_or_else(PoisonError::into_inner);
        let generation = {
            let current = slot.read().unwrap_or_else(PoisonError::into_inner);
            current.version().generation + 1
        };

        // Readers keep the current snapshot while the next one is built.
        let tables = load_region(&self.data_dir, region)?;
        let snapshot = Arc::new(MasterSnapshot::with_generation(region, tables, generation));
        *slot.write().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&snapshot);
        info!(region = %region, generation, "master data reloaded");
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::records::MasterTables;

    #[test]
    fn region_parses_case_insensitively() {
        assert_eq!("jp".parse::<Region>(), Ok(Region::Jp));
        assert_eq!(" NA ".parse::<Region>(), Ok(Region::Na));
        assert!("KR".parse::<Region>().is_err());
    }

    #[test]
    fn unserved_region_has_no_snapshot() {
        let registry = DataRegistry::from_snapshots(
            "unused",
            [MasterSnapshot::from_tables(Region::Jp, MasterTables::default())],
        );
        assert!(registry.snapshot(Region::Jp).is_some());
        assert!(registry.snapshot(Region::Na).is_none());
        assert!(matches!(
            registry.reload(Region::Na),
            Err(LoadError::RegionNotServed(Region::Na))
        ));
    }

    #[test]
    fn failed_reload_keeps_previous_snapshot() {
        let registry = DataRegistry::from_snapshots(
            std::env::temp_dir().join("atlas-registry-missing"),
            [MasterSnapshot::from_tables(Region::Jp, MasterTables::default())],
        );
        assert!(registry.reload(Region::Jp).is_err());
        let snapshot = registry.snapshot(Region::Jp).unwrap();
        assert_eq!(snapshot.version().generation, 1);
    }

    #[test]
    fn concurrent_reloads_get_distinct_generations() {
        let dir = std::env::temp_dir().join(format!("atlas-registry-reload-{}", std::process::id()));
        std::fs::create_dir_all(dir.join("JP")).unwrap();
        let registry = DataRegistry::from_snapshots(
            &dir,
            [MasterSnapshot::from_tables(Region::Jp, MasterTables::default())],
        );

        let mut generations: Vec<u64> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| registry.reload(Region::Jp).unwrap().version().generation))
                .collect();
            handles.into_iter().map(|handle| handle.join().unwrap()).collect()
        });
        generations.sort_unstable();

        assert_eq!(generations, vec![2, 3, 4, 5]);
        assert_eq!(registry.snapshot(Region::Jp).unwrap().version().generation, 5);
        let _ = std::fs::remove_dir_all(&dir);
    }
}

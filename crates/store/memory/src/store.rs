use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::trace;

use leasegate_core::{LockName, LockRecord, Version};
use leasegate_store::error::StoreError;
use leasegate_store::store::{LockRecordStore, PutResult, VersionedRecord};

/// A single slot in the in-memory store.
#[derive(Debug, Clone)]
struct Slot {
    record: LockRecord,
    version: Version,
}

/// In-memory [`LockRecordStore`] backed by a [`DashMap`].
///
/// The per-key entry lock makes each `put` an atomic check-and-set. Records
/// are never removed, so a name's version chain is never reset and versions
/// are never reused.
#[derive(Debug, Default)]
pub struct MemoryLockStore {
    records: DashMap<LockName, Slot>,
}

impl MemoryLockStore {
    /// Create a new, empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of names ever written.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl LockRecordStore for MemoryLockStore {
    async fn get(&self, name: &LockName) -> Result<Option<VersionedRecord>, StoreError> {
        Ok(self.records.get(name).map(|slot| VersionedRecord {
            record: slot.record.clone(),
            version: slot.version,
        }))
    }

    async fn put(
        &self,
        name: &LockName,
        record: LockRecord,
        expected: Option<Version>,
    ) -> Result<PutResult, StoreError> {
        let result = match self.records.entry(name.clone()) {
            Entry::Vacant(vacant) => {
                if expected.is_some() {
                    PutResult::Conflict { current: None }
                } else {
                    vacant.insert(Slot { record, version: 1 });
                    PutResult::Stored { version: 1 }
                }
            }
            Entry::Occupied(mut occupied) => {
                let current = occupied.get().version;
                if expected == Some(current) {
                    let version = current + 1;
                    occupied.insert(Slot { record, version });
                    PutResult::Stored { version }
                } else {
                    PutResult::Conflict {
                        current: Some(current),
                    }
                }
            }
        };

        trace!(lock = %name, ?expected, ?result, "put");
        Ok(result)
    }

    async fn scan(&self) -> Result<Vec<VersionedRecord>, StoreError> {
        let mut all: Vec<VersionedRecord> = self
            .records
            .iter()
            .map(|slot| VersionedRecord {
                record: slot.record.clone(),
                version: slot.version,
            })
            .collect();
        all.sort_by(|a, b| a.record.name.cmp(&b.record.name));
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{DateTime, TimeDelta, Utc};
    use leasegate_store::testing::run_store_conformance_tests;

    use super::*;

    fn record(name: &str, lease: &str) -> LockRecord {
        LockRecord::held(
            name.into(),
            lease.into(),
            "test".into(),
            DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap() + TimeDelta::seconds(10),
        )
    }

    #[tokio::test]
    async fn conformance() {
        let store = MemoryLockStore::new();
        run_store_conformance_tests(&store)
            .await
            .expect("conformance tests should pass");
    }

    #[tokio::test]
    async fn cleared_record_keeps_its_version_chain() {
        let store = MemoryLockStore::new();
        let name = LockName::from("deploy");

        let PutResult::Stored { version: v1 } =
            store.put(&name, record("deploy", "l1"), None).await.unwrap()
        else {
            panic!("create should succeed");
        };
        let cleared = LockRecord::cleared(name.clone(), Utc::now());
        let PutResult::Stored { version: v2 } =
            store.put(&name, cleared, Some(v1)).await.unwrap()
        else {
            panic!("clear should succeed");
        };
        assert_eq!(v2, v1 + 1);

        // A cleared record still exists, so a create-if-absent conflicts.
        let result = store.put(&name, record("deploy", "l2"), None).await.unwrap();
        assert_eq!(result, PutResult::Conflict { current: Some(v2) });
        assert_eq!(store.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_cas_single_winner_per_version() {
        let store = Arc::new(MemoryLockStore::new());
        let name = LockName::from("contended");
        store.put(&name, record("contended", "l0"), None).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..32 {
            let store = Arc::clone(&store);
            let name = name.clone();
            handles.push(tokio::spawn(async move {
                store
                    .put(&name, record("contended", &format!("l{i}")), Some(1))
                    .await
                    .unwrap()
            }));
        }

        let mut winners = 0;
        for h in handles {
            if matches!(h.await.unwrap(), PutResult::Stored { .. }) {
                winners += 1;
            }
        }
        assert_eq!(winners, 1, "exactly one writer should win version 1");
        assert_eq!(store.get(&name).await.unwrap().unwrap().version, 2);
    }

    #[tokio::test]
    async fn scan_is_sorted_by_name() {
        let store = MemoryLockStore::new();
        for name in ["c", "a", "b"] {
            store
                .put(&LockName::from(name), record(name, "l1"), None)
                .await
                .unwrap();
        }
        let names: Vec<String> = store
            .scan()
            .await
            .unwrap()
            .into_iter()
            .map(|v| v.record.name.to_string())
            .collect();
        assert_eq!(names, ["a", "b", "c"]);
    }
}

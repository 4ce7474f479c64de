use chrono::{DateTime, TimeDelta, Utc};
use futures::future::join_all;

use leasegate_core::{LockName, LockRecord};

use crate::error::StoreError;
use crate::store::{LockRecordStore, PutResult};

fn base_time() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap_or_default()
}

fn held(name: &str, lease: &str, secs: i64) -> LockRecord {
    LockRecord::held(
        name.into(),
        lease.into(),
        "conformance".into(),
        base_time() + TimeDelta::seconds(secs),
    )
}

/// Run the full lock record store conformance test suite.
///
/// Call this from your store's test module with a fresh store instance.
///
/// # Errors
///
/// Returns an error if the store itself fails. Contract violations panic.
pub async fn run_store_conformance_tests(store: &dyn LockRecordStore) -> Result<(), StoreError> {
    test_get_missing(store).await?;
    test_create_if_absent(store).await?;
    test_create_conflicts_when_present(store).await?;
    test_update_requires_current_version(store).await?;
    test_update_missing_conflicts(store).await?;
    test_versions_strictly_increase(store).await?;
    test_racing_creates_single_winner(store).await?;
    test_scan_lists_records(store).await?;
    Ok(())
}

async fn test_get_missing(store: &dyn LockRecordStore) -> Result<(), StoreError> {
    let found = store.get(&LockName::from("conf-missing")).await?;
    assert!(found.is_none(), "get on a never-written name should be None");
    Ok(())
}

async fn test_create_if_absent(store: &dyn LockRecordStore) -> Result<(), StoreError> {
    let name = LockName::from("conf-create");
    let record = held("conf-create", "l1", 10);

    let result = store.put(&name, record.clone(), None).await?;
    let PutResult::Stored { version } = result else {
        panic!("create on absent name should succeed, got {result:?}");
    };
    assert!(version > 0, "first version should be positive");

    let found = store.get(&name).await?.expect("record should exist");
    assert_eq!(found.record, record);
    assert_eq!(found.version, version);
    Ok(())
}

async fn test_create_conflicts_when_present(store: &dyn LockRecordStore) -> Result<(), StoreError> {
    let name = LockName::from("conf-create-twice");
    let first = held("conf-create-twice", "l1", 10);
    let PutResult::Stored { version } = store.put(&name, first.clone(), None).await? else {
        panic!("first create should succeed");
    };

    let second = store
        .put(&name, held("conf-create-twice", "l2", 10), None)
        .await?;
    assert_eq!(
        second,
        PutResult::Conflict {
            current: Some(version)
        },
        "create on an existing name should conflict"
    );

    let found = store.get(&name).await?.expect("record should exist");
    assert_eq!(found.record, first, "original record should remain");
    Ok(())
}

async fn test_update_requires_current_version(
    store: &dyn LockRecordStore,
) -> Result<(), StoreError> {
    let name = LockName::from("conf-update");
    let PutResult::Stored { version: v1 } =
        store.put(&name, held("conf-update", "l1", 10), None).await?
    else {
        panic!("create should succeed");
    };

    let PutResult::Stored { version: v2 } = store
        .put(&name, held("conf-update", "l1", 20), Some(v1))
        .await?
    else {
        panic!("put with the current version should succeed");
    };
    assert!(v2 > v1, "successful put should bump the version");

    // The superseded version is stale now.
    let stale = store
        .put(&name, held("conf-update", "l2", 30), Some(v1))
        .await?;
    assert_eq!(stale, PutResult::Conflict { current: Some(v2) });

    let found = store.get(&name).await?.expect("record should exist");
    assert_eq!(found.version, v2);
    assert!(found.record.is_owned_by(&"l1".into()));
    Ok(())
}

async fn test_update_missing_conflicts(store: &dyn LockRecordStore) -> Result<(), StoreError> {
    let name = LockName::from("conf-update-missing");
    let result = store
        .put(&name, held("conf-update-missing", "l1", 10), Some(1))
        .await?;
    assert_eq!(
        result,
        PutResult::Conflict { current: None },
        "versioned put on an absent name should conflict"
    );
    assert!(store.get(&name).await?.is_none());
    Ok(())
}

async fn test_versions_strictly_increase(store: &dyn LockRecordStore) -> Result<(), StoreError> {
    let name = LockName::from("conf-monotonic");
    let mut expected = None;
    let mut last = 0;
    for i in 0..10 {
        let record = if i % 3 == 2 {
            LockRecord::cleared(name.clone(), base_time())
        } else {
            held("conf-monotonic", "l1", i)
        };
        let PutResult::Stored { version } = store.put(&name, record, expected).await? else {
            panic!("sequential put {i} should succeed");
        };
        assert!(version > last, "version {version} should exceed {last}");
        last = version;
        expected = Some(version);
    }
    Ok(())
}

async fn test_racing_creates_single_winner(store: &dyn LockRecordStore) -> Result<(), StoreError> {
    let name = LockName::from("conf-race");
    let attempts = (0..16).map(|i| {
        let name = name.clone();
        async move {
            store
                .put(&name, held("conf-race", &format!("l{i}"), 10), None)
                .await
        }
    });

    let mut winners = 0;
    for result in join_all(attempts).await {
        if matches!(result?, PutResult::Stored { .. }) {
            winners += 1;
        }
    }
    assert_eq!(winners, 1, "exactly one racing create should win");
    Ok(())
}

async fn test_scan_lists_records(store: &dyn LockRecordStore) -> Result<(), StoreError> {
    let name = LockName::from("conf-scan");
    store.put(&name, held("conf-scan", "l1", 10), None).await?;

    let all = store.scan().await?;
    assert!(
        all.iter().any(|v| v.record.name == name),
        "scan should include written records"
    );
    Ok(())
}

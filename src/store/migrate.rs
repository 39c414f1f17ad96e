use crate::store::{keys, operations::reviews::ReviewRecord};
use crate::store::{Store, StoreError};

const VERSION_KEY: &str = "_meta:version";

type MigrationFn = fn(&Store) -> Result<(), StoreError>;

fn migrations() -> Vec<(&'static str, MigrationFn)> {
    vec![
        ("001_initial", m001_initial),
        ("002_review_due_index", m002_review_due_index),
    ]
}

/// 执行所有未应用的数据库迁移。
///
/// - 每个迁移函数必须幂等：进程可能在迁移完成后、版本号写入前崩溃，重启后会重跑。
/// - 版本号在每个迁移成功后立即持久化。
/// - 仅向前：set_version 拒绝降级。
pub fn run(store: &Store) -> Result<(), StoreError> {
    let current = get_current_version(store)?;

    for (index, (name, func)) in migrations().iter().enumerate() {
        let version = (index + 1) as u32;
        if version > current {
            tracing::info!(version, name, "Running migration");
            func(store)?;
            set_version(store, version)?;
            tracing::info!(version, name, "Migration complete");
        } else {
            tracing::debug!(version, name, "Migration already applied, skipping");
        }
    }

    Ok(())
}

pub fn get_current_version(store: &Store) -> Result<u32, StoreError> {
    match store.config_versions.get(VERSION_KEY.as_bytes())? {
        Some(raw) => {
            let bytes: [u8; 4] = raw.as_ref().try_into().map_err(|_| StoreError::Migration {
                version: 0,
                message: format!("corrupt schema version ({} bytes)", raw.len()),
            })?;
            Ok(u32::from_be_bytes(bytes))
        }
        None => Ok(0),
    }
}

pub fn set_version(store: &Store, version: u32) -> Result<(), StoreError> {
    let current = get_current_version(store)?;
    if version < current {
        return Err(StoreError::Migration {
            version,
            message: format!("Refuse to downgrade from {} to {}", current, version),
        });
    }

    store
        .config_versions
        .insert(VERSION_KEY.as_bytes(), &version.to_be_bytes())?;
    Ok(())
}

fn m001_initial(_store: &Store) -> Result<(), StoreError> {
    Ok(())
}

/// Rebuilds the due index from the review records, for databases whose records were
/// written without it (bulk imports).
fn m002_review_due_index(store: &Store) -> Result<(), StoreError> {
    let mut indexed = 0usize;
    for item in store.reviews.iter() {
        let (_, value) = item?;
        let record: ReviewRecord = Store::deserialize(&value)?;
        let due_index_key = keys::review_due_index_key(
            &record.user_id,
            record.next_review_at.timestamp_millis(),
            &record.item_id,
        )?;
        store
            .review_due_index
            .insert(due_index_key.as_bytes(), Vec::<u8>::new())?;
        indexed += 1;
    }
    tracing::info!(indexed, "Review due index rebuilt");

    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn migration_is_idempotent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db");
        let store = Store::open(path.to_str().unwrap()).unwrap();

        run(&store).unwrap();
        let first = get_current_version(&store).unwrap();
        run(&store).unwrap();
        let second = get_current_version(&store).unwrap();

        assert_eq!(first, 2);
        assert_eq!(second, 2);
    }

    #[test]
    fn downgrade_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db2");
        let store = Store::open(path.to_str().unwrap()).unwrap();

        set_version(&store, 3).unwrap();
        let err = set_version(&store, 2).unwrap_err();
        assert!(matches!(err, StoreError::Migration { .. }));
    }

    #[test]
    fn due_index_is_rebuilt_for_unindexed_records() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("db3").to_str().unwrap()).unwrap();

        let record = ReviewRecord::initial("u1", 1, "w1", Utc::now() - Duration::hours(1));
        let key = keys::review_key("u1", "w1").unwrap();
        store
            .reviews
            .insert(key.as_bytes(), Store::serialize(&record).unwrap())
            .unwrap();
        assert!(store.list_due_reviews("u1", Utc::now()).unwrap().is_empty());

        run(&store).unwrap();

        let due = store.list_due_reviews("u1", Utc::now()).unwrap();
        assert_eq!(due, vec![record]);
    }
}

//! Activity storage and retrieval operations

use crate::error::StoreError;
use crate::local_db::schema::{self, ACTIVITIES_TABLE};
use crate::local_db::{EntryStore, StoreResult};
use crate::shared::activity::{Activity, ActivityId, ActivityType, NewActivity};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

impl EntryStore {
    /// Persist a new activity and return its assigned id
    pub async fn create(&self, activity: &NewActivity) -> StoreResult<ActivityId> {
        activity.validate()?;
        let pool = self.writable_pool().await?;

        let result = sqlx::query("INSERT INTO activities (description, type, date) VALUES (?, ?, ?)")
            .bind(&activity.description)
            .bind(activity.kind.as_str())
            .bind(&activity.date)
            .execute(&pool)
            .await
            .map_err(|err| {
                tracing::error!("[Store] failed to save activity: {}", err);
                StoreError::WriteFailure {
                    message: err.to_string(),
                }
            })?;

        let id = result.last_insert_rowid();
        tracing::info!("[Store] saved activity {}", id);
        Ok(id)
    }

    /// All entries in creation order; never fails
    pub async fn list_all(&self) -> Vec<Activity> {
        match self.try_list("SELECT id, description, type, date FROM activities ORDER BY id ASC").await {
            Ok(activities) => activities,
            Err(err) => {
                tracing::warn!("[Store] listing activities failed, returning none: {}", err);
                Vec::new()
            }
        }
    }

    /// All entries, newest first (uses the `date` index); never fails
    pub async fn list_by_date(&self) -> Vec<Activity> {
        match self
            .try_list("SELECT id, description, type, date FROM activities ORDER BY date DESC, id DESC")
            .await
        {
            Ok(activities) => activities,
            Err(err) => {
                tracing::warn!("[Store] listing activities by date failed, returning none: {}", err);
                Vec::new()
            }
        }
    }

    /// Number of entries `list_all` would return; 0 when the store is not readable
    pub async fn count(&self) -> usize {
        self.list_all().await.len()
    }

    /// Delete one entry; returns whether it existed
    pub async fn delete_by_id(&self, id: ActivityId) -> StoreResult<bool> {
        let pool = self.writable_pool().await?;
        let result = sqlx::query("DELETE FROM activities WHERE id = ?")
            .bind(id)
            .execute(&pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every entry; a missing collection is left alone
    pub async fn clear_all(&self) -> StoreResult<u64> {
        let pool = self.pool().await?;
        if !schema::table_exists(&pool).await? {
            return Ok(0);
        }
        let result = sqlx::query("DELETE FROM activities").execute(&pool).await?;
        tracing::info!("[Store] cleared {} activities", result.rows_affected());
        Ok(result.rows_affected())
    }

    /// `true` when the store opens and its collection exists
    pub async fn store_exists(&self) -> bool {
        matches!(self.readable_pool().await, Ok(Some(_)))
    }

    async fn try_list(&self, sql: &str) -> StoreResult<Vec<Activity>> {
        let Some(pool) = self.readable_pool().await? else {
            tracing::warn!("[Store] collection '{}' does not exist, returning no activities", ACTIVITIES_TABLE);
            return Ok(Vec::new());
        };

        let rows = sqlx::query(sql).fetch_all(&pool).await?;
        let mut activities = Vec::with_capacity(rows.len());
        let mut malformed = Vec::new();
        for row in rows {
            match activity_from_row(&row) {
                Ok(activity) => activities.push(activity),
                Err(err) => {
                    tracing::warn!("[Store] discarding malformed activity row: {}", err);
                    malformed.extend(row.try_get::<ActivityId, _>("id").ok());
                }
            }
        }
        if !malformed.is_empty() {
            self.discard(&pool, &malformed).await;
        }
        tracing::debug!("[Store] loaded {} activities", activities.len());
        Ok(activities)
    }

    /// Drop rows that can never be listed or pushed
    async fn discard(&self, pool: &SqlitePool, ids: &[ActivityId]) {
        for id in ids {
            if let Err(err) = sqlx::query("DELETE FROM activities WHERE id = ?").bind(id).execute(pool).await {
                tracing::warn!("[Store] failed to discard malformed activity {}: {}", id, err);
            }
        }
    }

    async fn readable_pool(&self) -> StoreResult<Option<SqlitePool>> {
        let pool = self.pool().await?;
        if schema::table_exists(&pool).await? {
            Ok(Some(pool))
        } else {
            Ok(None)
        }
    }

    async fn writable_pool(&self) -> StoreResult<SqlitePool> {
        match self.readable_pool().await? {
            Some(pool) => Ok(pool),
            None => {
                tracing::error!("[Store] collection '{}' does not exist", ACTIVITIES_TABLE);
                Err(StoreError::Unavailable {
                    collection: ACTIVITIES_TABLE,
                })
            }
        }
    }
}

fn activity_from_row(row: &SqliteRow) -> StoreResult<Activity> {
    let kind: String = row.try_get("type")?;
    Ok(Activity {
        id: row.try_get("id")?,
        description: row.try_get("description")?,
        kind: kind.parse::<ActivityType>()?,
        date: row.try_get("date")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::activity::ActivityType;
    use chrono::{TimeZone, Utc};

    fn activity(description: &str, day: u32) -> NewActivity {
        let at = Utc.with_ymd_and_hms(2025, 4, day, 8, 0, 0).unwrap();
        NewActivity::at(description, ActivityType::Hiking, at).unwrap()
    }

    #[tokio::test]
    async fn test_ids_are_assigned_in_order() {
        let store = EntryStore::in_memory();
        let first = store.create(&activity("Ridge trail", 1)).await.unwrap();
        let second = store.create(&activity("Canyon loop", 2)).await.unwrap();
        assert!(second > first);

        let listed = store.list_all().await;
        assert_eq!(listed.iter().map(|a| a.id).collect::<Vec<_>>(), vec![first, second]);
        assert_eq!(listed[0].description, "Ridge trail");
    }

    #[tokio::test]
    async fn test_list_by_date_is_newest_first() {
        let store = EntryStore::in_memory();
        store.create(&activity("older", 1)).await.unwrap();
        store.create(&activity("newer", 9)).await.unwrap();
        let listed = store.list_by_date().await;
        assert_eq!(listed[0].description, "newer");
    }

    #[tokio::test]
    async fn test_delete_and_clear() {
        let store = EntryStore::in_memory();
        let id = store.create(&activity("one", 1)).await.unwrap();
        store.create(&activity("two", 2)).await.unwrap();

        assert!(store.delete_by_id(id).await.unwrap());
        assert!(!store.delete_by_id(id).await.unwrap());
        assert_eq!(store.count().await, 1);
        assert_eq!(store.clear_all().await.unwrap(), 1);
        assert_eq!(store.count().await, 0);
    }

    #[tokio::test]
    async fn test_invalid_activity_is_not_written() {
        let store = EntryStore::in_memory();
        let blank = NewActivity {
            description: " ".to_string(),
            kind: ActivityType::Other,
            date: "2025-04-01T08:00:00.000Z".to_string(),
        };
        assert!(matches!(store.create(&blank).await, Err(StoreError::Invalid(_))));
        assert_eq!(store.count().await, 0);
    }

    #[tokio::test]
    async fn test_malformed_rows_are_discarded_and_not_counted() {
        let store = EntryStore::in_memory();
        let kept = store.create(&activity("Dune walk", 3)).await.unwrap();
        let pool = store.pool().await.unwrap();
        sqlx::query("INSERT INTO activities (description, type, date) VALUES ('mystery', 'diving', '2025-04-02T08:00:00.000Z')")
            .execute(&pool)
            .await
            .unwrap();

        assert_eq!(store.count().await, 1);
        let listed = store.list_all().await;
        assert_eq!(listed.iter().map(|a| a.id).collect::<Vec<_>>(), vec![kept]);

        let (remaining,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM activities")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(remaining, 1);
    }
}

//! Learned preferences: one live value per key, overwritten on update.

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::conversation::from_millis;
use crate::error::StoreResult;
use crate::memory::MemoryStore;

/// Confidence assigned by [`MemoryStore::learn_preference`].
pub const LEARNED_CONFIDENCE: f64 = 0.8;

/// A stored preference record.
#[derive(Debug, Clone, PartialEq, Serialize, serde::Deserialize)]
pub struct Preference {
    pub key: String,
    pub value: serde_json::Value,
    /// Always within `0.0..=1.0`.
    pub confidence: f64,
    pub learned_at: DateTime<Utc>,
}

impl MemoryStore {
    /// Store `value` under `key` with the default learned confidence.
    pub async fn learn_preference<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
    ) -> StoreResult<()> {
        self.set_preference_with_confidence(key, value, LEARNED_CONFIDENCE)
            .await
    }

    /// Alias of [`MemoryStore::learn_preference`].
    pub async fn set_preference<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
    ) -> StoreResult<()> {
        self.learn_preference(key, value).await
    }

    /// Store `value` with an explicit confidence, clamped into `0..=1`.
    #[instrument(skip(self, value))]
    pub async fn set_preference_with_confidence<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        confidence: f64,
    ) -> StoreResult<()> {
        let key = key.to_string();
        let value = serde_json::to_string(value)?;
        let confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let now = Utc::now().timestamp_millis();

        self.db
            .execute(move |conn| {
                conn.execute(
                    "INSERT INTO preferences (key, value, confidence, updated_at) \
                     VALUES (?1, ?2, ?3, ?4) \
                     ON CONFLICT(key) DO UPDATE SET \
                        value = excluded.value, \
                        confidence = excluded.confidence, \
                        updated_at = excluded.updated_at",
                    rusqlite::params![key, value, confidence, now],
                )?;
                Ok(())
            })
            .await?;
        debug!("preference stored");
        Ok(())
    }

    /// The value stored under `key`, or `default` when absent.
    ///
    /// A stored value that does not deserialize into `T` is an error.
    pub async fn get_preference<T: DeserializeOwned>(&self, key: &str, default: T) -> StoreResult<T> {
        match self.preference(key).await? {
            Some(pref) => Ok(serde_json::from_value(pref.value)?),
            None => Ok(default),
        }
    }

    /// The full record under `key`.
    #[instrument(skip(self))]
    pub async fn preference(&self, key: &str) -> StoreResult<Option<Preference>> {
        let key = key.to_string();
        self.db
            .execute(move |conn| {
                let raw = conn
                    .query_row(
                        "SELECT key, value, confidence, updated_at FROM preferences WHERE key = ?1",
                        [&key],
                        read_row,
                    )
                    .optional()?;
                raw.map(decode).transpose()
            })
            .await
    }

    /// Every preference, ordered by key.
    #[instrument(skip(self))]
    pub async fn preferences(&self) -> StoreResult<Vec<Preference>> {
        self.db
            .execute(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT key, value, confidence, updated_at FROM preferences ORDER BY key",
                )?;
                let rows = stmt
                    .query_map([], read_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows.into_iter().map(decode).collect()
            })
            .await
    }

    /// Remove a preference. Returns whether it existed.
    #[instrument(skip(self))]
    pub async fn forget_preference(&self, key: &str) -> StoreResult<bool> {
        let key = key.to_string();
        self.db
            .execute(move |conn| {
                Ok(conn.execute("DELETE FROM preferences WHERE key = ?1", [&key])? > 0)
            })
            .await
    }
}

type RawPreference = (String, String, f64, i64);

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawPreference> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn decode((key, value, confidence, updated_at): RawPreference) -> StoreResult<Preference> {
    Ok(Preference {
        key,
        value: serde_json::from_str(&value)?,
        confidence,
        learned_at: from_millis("preference", updated_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[tokio::test]
    async fn missing_key_yields_default() {
        let store = MemoryStore::in_memory().await.unwrap();
        let tone: String = store
            .get_preference("voice_tone", "neutral".to_string())
            .await
            .unwrap();
        assert_eq!(tone, "neutral");
    }

    #[tokio::test]
    async fn updates_overwrite() {
        let store = MemoryStore::in_memory().await.unwrap();
        store.learn_preference("voice_tone", "formal").await.unwrap();
        store.learn_preference("voice_tone", "friendly").await.unwrap();

        let all = store.preferences().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].value, serde_json::json!("friendly"));
        assert_eq!(all[0].confidence, LEARNED_CONFIDENCE);
    }

    #[tokio::test]
    async fn structured_values_round_trip() {
        let store = MemoryStore::in_memory().await.unwrap();
        let mut xp = BTreeMap::new();
        xp.insert("rust".to_string(), 40u32);
        store.set_preference("skill_xp", &xp).await.unwrap();

        let back: BTreeMap<String, u32> = store
            .get_preference("skill_xp", BTreeMap::new())
            .await
            .unwrap();
        assert_eq!(back, xp);
    }

    #[tokio::test]
    async fn confidence_is_clamped() {
        let store = MemoryStore::in_memory().await.unwrap();
        store
            .set_preference_with_confidence("k", &1, 3.5)
            .await
            .unwrap();
        let pref = store.preference("k").await.unwrap().unwrap();
        assert_eq!(pref.confidence, 1.0);
    }

    #[tokio::test]
    async fn forget_removes_the_key() {
        let store = MemoryStore::in_memory().await.unwrap();
        store.set_preference("k", &true).await.unwrap();
        assert!(store.forget_preference("k").await.unwrap());
        assert!(!store.forget_preference("k").await.unwrap());
        assert!(store.preference("k").await.unwrap().is_none());
    }
}

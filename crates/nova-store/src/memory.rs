//! The memory store: Nova's durable conversation log.
//!
//! [`MemoryStore`] is the single writer of [`ConversationTurn`]s. Skills get
//! a clone for preferences and aggregated views ([`MemoryStore::summarize`],
//! [`MemoryStore::analyze_patterns`]); the router records the turns.

use chrono::{Duration, Utc};
use tracing::{debug, info, instrument};

use crate::analytics::{self, DerivedStats};
use crate::conversation::{
    ConversationTurn, MemoryStats, SessionInfo, TurnMetadata, TurnRole, from_millis,
};
use crate::db::Database;
use crate::error::{StoreError, StoreResult};

/// Cheap-to-clone handle over the conversation and preference tables.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    pub(crate) db: Database,
}

impl MemoryStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Open (creating if needed) and migrate the database at `path`.
    pub async fn open(path: impl AsRef<std::path::Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        Ok(Self::new(Database::open_and_migrate(path).await?))
    }

    /// A store that forgets everything when dropped.
    pub async fn in_memory() -> StoreResult<Self> {
        Ok(Self::new(Database::in_memory_migrated().await?))
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    // ═══════════════════════════════════════════════════════════════════
    //  Conversation log
    // ═══════════════════════════════════════════════════════════════════

    /// Append a turn, enriching `metadata` with `word_count` and `char_count`.
    ///
    /// Returns the row id.
    #[instrument(skip_all, fields(session_id = %session_id, role = %role))]
    pub async fn record_turn(
        &self,
        session_id: &str,
        role: TurnRole,
        content: &str,
        metadata: TurnMetadata,
    ) -> StoreResult<i64> {
        let row = PendingTurn::new(session_id, role, content, metadata)?;
        let id = self
            .db
            .execute(move |conn| row.insert(conn, Utc::now().timestamp_millis()))
            .await?;
        debug!(id, "turn recorded");
        Ok(id)
    }

    /// Append a user turn and the assistant's reply in one transaction, so
    /// concurrent exchanges in a session never interleave.
    ///
    /// Returns the two row ids.
    #[instrument(skip_all, fields(session_id = %session_id))]
    pub async fn record_exchange(
        &self,
        session_id: &str,
        user: &str,
        user_metadata: TurnMetadata,
        reply: &str,
        reply_metadata: TurnMetadata,
    ) -> StoreResult<(i64, i64)> {
        let user = PendingTurn::new(session_id, TurnRole::User, user, user_metadata)?;
        let reply = PendingTurn::new(session_id, TurnRole::Assistant, reply, reply_metadata)?;

        let ids = self
            .db
            .execute_mut(move |conn| {
                let now = Utc::now().timestamp_millis();
                let tx = conn.transaction()?;
                let ids = (user.insert(&tx, now)?, reply.insert(&tx, now)?);
                tx.commit()?;
                Ok(ids)
            })
            .await?;

        debug!(user_id = ids.0, reply_id = ids.1, "exchange recorded");
        Ok(ids)
    }

    /// Up to `limit` turns for a session, most recent first.
    ///
    /// Ordered by insertion id, not timestamp, so a wall clock stepping
    /// backwards cannot reorder a session.
    #[instrument(skip(self))]
    pub async fn recent_turns(
        &self,
        session_id: &str,
        limit: usize,
    ) -> StoreResult<Vec<ConversationTurn>> {
        let session_id = session_id.to_string();
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        self.db
            .execute(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, session_id, role, content, timestamp, metadata \
                     FROM conversations WHERE session_id = ?1 \
                     ORDER BY id DESC LIMIT ?2",
                )?;
                let rows = stmt
                    .query_map(rusqlite::params![session_id, limit], |row| {
                        Ok((
                            row.get::<_, i64>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, String>(2)?,
                            row.get::<_, String>(3)?,
                            row.get::<_, i64>(4)?,
                            row.get::<_, String>(5)?,
                        ))
                    })?
                    .collect::<Result<Vec<_>, _>>()?;

                let mut turns = Vec::with_capacity(rows.len());
                for (id, session_id, role, content, ts, metadata) in rows {
                    turns.push(ConversationTurn {
                        id,
                        session_id,
                        role: TurnRole::parse(&role)?,
                        content,
                        timestamp: from_millis("conversation", ts)?,
                        metadata: serde_json::from_str(&metadata)?,
                    });
                }
                Ok(turns)
            })
            .await
    }

    /// Number of turns in a session.
    #[instrument(skip(self))]
    pub async fn count_turns(&self, session_id: &str) -> StoreResult<u64> {
        let session_id = session_id.to_string();
        self.db
            .execute(move |conn| {
                let n: i64 = conn.query_row(
                    "SELECT count(*) FROM conversations WHERE session_id = ?1",
                    [&session_id],
                    |row| row.get(0),
                )?;
                Ok(n.max(0) as u64)
            })
            .await
    }

    /// Textual summary of the session's activity within the last `window_hours`.
    #[instrument(skip(self))]
    pub async fn summarize(&self, session_id: &str, window_hours: u32) -> StoreResult<String> {
        let cutoff = Utc::now() - Duration::hours(i64::from(window_hours));
        let recent: Vec<ConversationTurn> = self
            .recent_turns(session_id, analytics::SUMMARY_WINDOW)
            .await?
            .into_iter()
            .filter(|t| t.timestamp >= cutoff)
            .collect();
        Ok(analytics::summarize(&recent, window_hours))
    }

    /// Usage patterns over the session's most recent turns.
    #[instrument(skip(self))]
    pub async fn analyze_patterns(&self, session_id: &str) -> StoreResult<DerivedStats> {
        let recent = self
            .recent_turns(session_id, analytics::PATTERN_WINDOW)
            .await?;
        Ok(analytics::analyze(&recent))
    }

    /// Delete every turn in a session. Preferences are not touched.
    #[instrument(skip(self))]
    pub async fn clear(&self, session_id: &str) -> StoreResult<usize> {
        let session_id = session_id.to_string();
        let deleted = self
            .db
            .execute(move |conn| {
                Ok(conn.execute(
                    "DELETE FROM conversations WHERE session_id = ?1",
                    [&session_id],
                )?)
            })
            .await?;
        info!(deleted, "session memory cleared");
        Ok(deleted)
    }

    /// Delete turns older than `days` across all sessions.
    #[instrument(skip(self))]
    pub async fn prune_older_than(&self, days: u32) -> StoreResult<usize> {
        if days == 0 {
            return Err(StoreError::InvalidArgument(
                "retention must be at least one day".into(),
            ));
        }
        let cutoff = (Utc::now() - Duration::days(i64::from(days))).timestamp_millis();
        let deleted = self
            .db
            .execute(move |conn| {
                Ok(conn.execute(
                    "DELETE FROM conversations WHERE timestamp < ?1",
                    [cutoff],
                )?)
            })
            .await?;
        if deleted > 0 {
            info!(deleted, days, "pruned old turns");
        }
        Ok(deleted)
    }

    /// Every session with its turn count, most recently active first.
    #[instrument(skip(self))]
    pub async fn sessions(&self) -> StoreResult<Vec<SessionInfo>> {
        self.db
            .execute(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT session_id, count(*), MAX(timestamp) FROM conversations \
                     GROUP BY session_id ORDER BY MAX(id) DESC",
                )?;
                let rows = stmt
                    .query_map([], |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, i64>(1)?,
                            row.get::<_, i64>(2)?,
                        ))
                    })?
                    .collect::<Result<Vec<_>, _>>()?;

                rows.into_iter()
                    .map(|(session_id, turns, last)| {
                        Ok(SessionInfo {
                            session_id,
                            turns: turns.max(0) as u64,
                            last_activity: from_millis("conversation", last)?,
                        })
                    })
                    .collect()
            })
            .await
    }

    /// Counts and on-disk size for the status report.
    #[instrument(skip(self))]
    pub async fn stats(&self, session_id: &str) -> StoreResult<MemoryStats> {
        let session_id = session_id.to_string();
        let (session_turns, total_turns, last) = self
            .db
            .execute(move |conn| {
                let session: i64 = conn.query_row(
                    "SELECT count(*) FROM conversations WHERE session_id = ?1",
                    [&session_id],
                    |row| row.get(0),
                )?;
                let (total, last): (i64, Option<i64>) = conn.query_row(
                    "SELECT count(*), MAX(timestamp) FROM conversations",
                    [],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )?;
                Ok((session, total, last))
            })
            .await?;

        Ok(MemoryStats {
            session_turns: session_turns.max(0) as u64,
            total_turns: total_turns.max(0) as u64,
            size_bytes: self.db.size_bytes().await?,
            last_interaction: last
                .map(|ms| from_millis("conversation", ms))
                .transpose()?,
        })
    }
}

/// A turn serialised and ready to insert.
struct PendingTurn {
    session_id: String,
    role: TurnRole,
    content: String,
    metadata: String,
}

impl PendingTurn {
    fn new(
        session_id: &str,
        role: TurnRole,
        content: &str,
        mut metadata: TurnMetadata,
    ) -> StoreResult<Self> {
        metadata.insert(
            "word_count".into(),
            content.split_whitespace().count().into(),
        );
        metadata.insert("char_count".into(), content.chars().count().into());
        Ok(Self {
            session_id: session_id.to_string(),
            role,
            content: content.to_string(),
            metadata: serde_json::to_string(&metadata)?,
        })
    }

    fn insert(&self, conn: &rusqlite::Connection, timestamp: i64) -> StoreResult<i64> {
        conn.execute(
            "INSERT INTO conversations (session_id, role, content, timestamp, metadata) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                self.session_id,
                self.role.as_str(),
                self.content,
                timestamp,
                self.metadata
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> MemoryStore {
        MemoryStore::in_memory().await.unwrap()
    }

    #[tokio::test]
    async fn record_adds_counts_to_metadata() {
        let store = store().await;
        store
            .record_turn("s1", TurnRole::User, "hello there nova", TurnMetadata::new())
            .await
            .unwrap();

        let turns = store.recent_turns("s1", 10).await.unwrap();
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].metadata["word_count"], 3);
        assert_eq!(turns[0].metadata["char_count"], 16);
    }

    #[tokio::test]
    async fn recent_turns_follow_arrival_when_clock_steps_back() {
        let store = store().await;
        let late = Utc::now().timestamp_millis();
        let early = late - 60_000;
        store
            .db
            .execute(move |conn| {
                PendingTurn::new("s1", TurnRole::User, "first", TurnMetadata::new())?
                    .insert(conn, late)?;
                PendingTurn::new("s1", TurnRole::Assistant, "second", TurnMetadata::new())?
                    .insert(conn, early)
            })
            .await
            .unwrap();

        let turns = store.recent_turns("s1", 10).await.unwrap();
        let contents: Vec<&str> = turns.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["second", "first"]);

        let stats = store.analyze_patterns("s1").await.unwrap();
        assert_eq!(stats.top_request_words[0].word, "first");
    }

    #[tokio::test]
    async fn exchange_records_user_then_assistant() {
        let store = store().await;
        let (user_id, reply_id) = store
            .record_exchange("s1", "hi", TurnMetadata::new(), "hello!", TurnMetadata::new())
            .await
            .unwrap();
        assert!(reply_id > user_id);

        let turns = store.recent_turns("s1", 10).await.unwrap();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, TurnRole::Assistant);
        assert_eq!(turns[1].role, TurnRole::User);
        assert_eq!(turns[0].metadata["word_count"], 1);
    }

    #[tokio::test]
    async fn recent_turns_are_newest_first_and_limited() {
        let store = store().await;
        for i in 0..5 {
            store
                .record_turn("s1", TurnRole::User, &format!("msg {i}"), TurnMetadata::new())
                .await
                .unwrap();
        }
        let turns = store.recent_turns("s1", 3).await.unwrap();
        assert_eq!(turns.len(), 3);
        assert_eq!(turns[0].content, "msg 4");
        assert_eq!(turns[2].content, "msg 2");
    }

    #[tokio::test]
    async fn sessions_are_isolated() {
        let store = store().await;
        store
            .record_turn("a", TurnRole::User, "one", TurnMetadata::new())
            .await
            .unwrap();
        store
            .record_turn("b", TurnRole::User, "two", TurnMetadata::new())
            .await
            .unwrap();

        assert_eq!(store.count_turns("a").await.unwrap(), 1);
        store.clear("a").await.unwrap();
        assert_eq!(store.count_turns("a").await.unwrap(), 0);
        assert_eq!(store.count_turns("b").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn prune_rejects_zero_days() {
        let store = store().await;
        assert!(matches!(
            store.prune_older_than(0).await,
            Err(StoreError::InvalidArgument(_))
        ));
        assert_eq!(store.prune_older_than(30).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn stats_report_totals() {
        let store = store().await;
        store
            .record_turn("a", TurnRole::User, "one", TurnMetadata::new())
            .await
            .unwrap();
        store
            .record_turn("b", TurnRole::Assistant, "two", TurnMetadata::new())
            .await
            .unwrap();

        let stats = store.stats("a").await.unwrap();
        assert_eq!(stats.session_turns, 1);
        assert_eq!(stats.total_turns, 2);
        assert!(stats.last_interaction.is_some());
        assert!(stats.size_bytes > 0);
    }
}

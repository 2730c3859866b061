//! SQLite-based identity store.

use super::traits::{CacheConfig, IdentityStore, StoreStats, SweepStats};
use crate::clock::{Clock, SystemClock};
use crate::error::{OrphanageError, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, info};

const SCHEMA: &str = r#"
    -- username -> first email address
    CREATE TABLE IF NOT EXISTS fas_user (
        user_name TEXT PRIMARY KEY,
        email TEXT NOT NULL,
        cache_time REAL NOT NULL
    );

    -- Freshness marker for a group's membership list
    CREATE TABLE IF NOT EXISTS fas_group (
        group_name TEXT PRIMARY KEY,
        cache_time REAL NOT NULL
    );

    -- Membership edges, valid only while the marker is fresh
    CREATE TABLE IF NOT EXISTS group_member (
        group_name TEXT NOT NULL
            REFERENCES fas_group(group_name) ON DELETE CASCADE,
        user_name TEXT NOT NULL,
        PRIMARY KEY (group_name, user_name)
    );

    CREATE INDEX IF NOT EXISTS idx_fas_user_time ON fas_user(cache_time);
    CREATE INDEX IF NOT EXISTS idx_fas_group_time ON fas_group(cache_time);
"#;

/// SQLite-based identity store.
///
/// Thread-safe via internal mutex on the connection, though the cache assumes
/// a single logical owner per database file.
pub struct SqliteIdentityStore {
    /// Database connection (wrapped for thread safety).
    conn: Arc<Mutex<Connection>>,
    /// Cache configuration.
    config: CacheConfig,
    /// Source of `cache_time` stamps and freshness checks.
    clock: Arc<dyn Clock>,
}

impl SqliteIdentityStore {
    /// Open (or create) a store at the specified database path.
    pub fn new(db_path: impl AsRef<Path>, ttl: Duration) -> Result<Self> {
        Self::with_clock(db_path, CacheConfig::with_ttl(ttl), Arc::new(SystemClock))
    }

    /// Open a store with a custom configuration and clock.
    pub fn with_clock(
        db_path: impl AsRef<Path>,
        config: CacheConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let db_path = db_path.as_ref();

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| OrphanageError::io_with_path(e, parent))?;
            }
        }

        let conn = Connection::open(db_path).map_err(|e| OrphanageError::Database {
            message: format!("Failed to open cache database {}: {}", db_path.display(), e),
            source: Some(e),
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")
            .map_err(|e| OrphanageError::Database {
                message: format!("Failed to set pragmas: {}", e),
                source: Some(e),
            })?;

        Self::from_connection(conn, config, clock)
    }

    /// Create a store backed by a private in-memory database.
    pub fn in_memory(config: CacheConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn, config, clock)
    }

    fn from_connection(
        conn: Connection,
        config: CacheConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        // Cascading deletes from fas_group to group_member depend on this.
        conn.execute_batch("PRAGMA foreign_keys=ON;")
            .map_err(|e| OrphanageError::Database {
                message: format!("Failed to enable foreign keys: {}", e),
                source: Some(e),
            })?;

        conn.execute_batch(SCHEMA)
            .map_err(|e| OrphanageError::Database {
                message: format!("Failed to initialize cache schema: {}", e),
                source: Some(e),
            })?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            config,
            clock,
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| OrphanageError::Database {
            message: format!("Failed to lock database: {}", e),
            source: None,
        })
    }

    fn ttl_secs(ttl: Duration) -> f64 {
        ttl.as_secs_f64()
    }
}

impl IdentityStore for SqliteIdentityStore {
    fn ttl(&self) -> Duration {
        self.config.ttl
    }

    fn query_user(&self, username: &str) -> Result<Option<String>> {
        let conn = self.lock()?;
        let now = self.clock.now_secs();

        conn.query_row(
            r#"
            SELECT email FROM fas_user
            WHERE user_name = ?1 AND (cache_time + ?2) > ?3
            "#,
            params![username, Self::ttl_secs(self.config.ttl), now],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| OrphanageError::Database {
            message: format!("Failed to query cached user {}: {}", username, e),
            source: Some(e),
        })
    }

    fn upsert_user(&self, username: &str, email: &str) -> Result<()> {
        let conn = self.lock()?;
        let now = self.clock.now_secs();

        conn.execute(
            r#"
            INSERT INTO fas_user (user_name, email, cache_time)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(user_name) DO UPDATE SET
                email = excluded.email,
                cache_time = excluded.cache_time
            "#,
            params![username, email, now],
        )
        .map_err(|e| OrphanageError::Database {
            message: format!("Failed to cache user {}: {}", username, e),
            source: Some(e),
        })?;

        Ok(())
    }

    fn query_group_members(&self, group: &str) -> Result<Option<Vec<String>>> {
        let mut conn = self.lock()?;
        let now = self.clock.now_secs();

        // Marker check and edge read see the same snapshot.
        let tx = conn.transaction()?;

        let fresh: bool = tx
            .query_row(
                r#"
                SELECT 1 FROM fas_group
                WHERE group_name = ?1 AND (cache_time + ?2) > ?3
                "#,
                params![group, Self::ttl_secs(self.config.ttl), now],
                |_| Ok(true),
            )
            .optional()
            .map_err(|e| OrphanageError::Database {
                message: format!("Failed to query group marker {}: {}", group, e),
                source: Some(e),
            })?
            .unwrap_or(false);

        if !fresh {
            return Ok(None);
        }

        let members = {
            let mut stmt = tx.prepare(
                "SELECT user_name FROM group_member WHERE group_name = ?1 ORDER BY user_name",
            )?;
            let rows = stmt.query_map(params![group], |row| row.get::<_, String>(0))?;
            rows.collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| OrphanageError::Database {
                    message: format!("Failed to read members of {}: {}", group, e),
                    source: Some(e),
                })?
        };

        tx.commit()?;
        Ok(Some(members))
    }

    fn replace_group_members(&self, group: &str, members: &[String]) -> Result<()> {
        let mut conn = self.lock()?;
        let now = self.clock.now_secs();

        // Dropping the transaction on any early return rolls it back.
        let tx = conn.transaction()?;

        tx.execute(
            "DELETE FROM group_member WHERE group_name = ?1",
            params![group],
        )?;

        tx.execute(
            r#"
            INSERT INTO fas_group (group_name, cache_time)
            VALUES (?1, ?2)
            ON CONFLICT(group_name) DO UPDATE SET cache_time = excluded.cache_time
            "#,
            params![group, now],
        )?;

        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO group_member (group_name, user_name) VALUES (?1, ?2)",
            )?;
            for member in members {
                stmt.execute(params![group, member])
                    .map_err(|e| OrphanageError::Database {
                        message: format!("Failed to add {} to group {}: {}", member, group, e),
                        source: Some(e),
                    })?;
            }
        }

        tx.commit().map_err(|e| OrphanageError::Database {
            message: format!("Failed to commit membership of {}: {}", group, e),
            source: Some(e),
        })?;

        debug!("Cached {} members for group {}", members.len(), group);
        Ok(())
    }

    fn sweep(&self, ttl: Duration) -> Result<SweepStats> {
        let mut conn = self.lock()?;
        let now = self.clock.now_secs();
        let ttl = Self::ttl_secs(ttl);

        let tx = conn.transaction()?;
        let users = tx.execute(
            "DELETE FROM fas_user WHERE (cache_time + ?1) <= ?2",
            params![ttl, now],
        )?;
        let groups = tx.execute(
            "DELETE FROM fas_group WHERE (cache_time + ?1) <= ?2",
            params![ttl, now],
        )?;
        tx.commit()?;

        let stats = SweepStats { users, groups };
        if users > 0 || groups > 0 {
            info!("Swept {} users and {} groups from cache", users, groups);
        }
        Ok(stats)
    }

    fn stats(&self) -> Result<StoreStats> {
        let conn = self.lock()?;
        let count = |table: &str| -> Result<usize> {
            let n: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                row.get(0)
            })?;
            Ok(n as usize)
        };

        Ok(StoreStats {
            users: count("fas_user")?,
            groups: count("fas_group")?,
            memberships: count("group_member")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use tempfile::TempDir;

    const TTL: Duration = Duration::from_secs(3600);

    fn create_test_store() -> (TempDir, Arc<ManualClock>, SqliteIdentityStore) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("fasjson.db");
        let clock = Arc::new(ManualClock::at_secs(1_700_000_000));
        let store =
            SqliteIdentityStore::with_clock(&db_path, CacheConfig::with_ttl(TTL), clock.clone())
                .unwrap();
        (temp_dir, clock, store)
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_user_miss_is_none() {
        let (_temp, _clock, store) = create_test_store();
        assert_eq!(store.query_user("alice").unwrap(), None);
    }

    #[test]
    fn test_upsert_and_query_user() {
        let (_temp, _clock, store) = create_test_store();
        store.upsert_user("alice", "alice@example.org").unwrap();
        assert_eq!(
            store.query_user("alice").unwrap().as_deref(),
            Some("alice@example.org")
        );
    }

    #[test]
    fn test_upsert_is_idempotent() {
        let (_temp, _clock, store) = create_test_store();
        store.upsert_user("alice", "alice@example.org").unwrap();
        store.upsert_user("alice", "alice@example.org").unwrap();

        assert_eq!(store.stats().unwrap().users, 1);
        assert_eq!(
            store.query_user("alice").unwrap().as_deref(),
            Some("alice@example.org")
        );
    }

    #[test]
    fn test_upsert_overwrites_email() {
        let (_temp, _clock, store) = create_test_store();
        store.upsert_user("alice", "old@example.org").unwrap();
        store.upsert_user("alice", "new@example.org").unwrap();
        assert_eq!(
            store.query_user("alice").unwrap().as_deref(),
            Some("new@example.org")
        );
    }

    #[test]
    fn test_user_expires_at_ttl_boundary() {
        let (_temp, clock, store) = create_test_store();
        store.upsert_user("alice", "alice@example.org").unwrap();

        clock.advance(TTL - Duration::from_secs(1));
        assert!(store.query_user("alice").unwrap().is_some());

        clock.advance(Duration::from_secs(1));
        assert_eq!(store.query_user("alice").unwrap(), None);
    }

    #[test]
    fn test_group_members_roundtrip_sorted() {
        let (_temp, _clock, store) = create_test_store();
        store
            .replace_group_members("packagers", &names(&["bob", "alice"]))
            .unwrap();

        assert_eq!(
            store.query_group_members("packagers").unwrap(),
            Some(names(&["alice", "bob"]))
        );
    }

    #[test]
    fn test_empty_group_is_a_fresh_hit() {
        let (_temp, _clock, store) = create_test_store();
        store.replace_group_members("empty", &[]).unwrap();
        assert_eq!(store.query_group_members("empty").unwrap(), Some(vec![]));
    }

    #[test]
    fn test_replace_drops_old_members() {
        let (_temp, _clock, store) = create_test_store();
        store
            .replace_group_members("packagers", &names(&["alice", "bob"]))
            .unwrap();
        store
            .replace_group_members("packagers", &names(&["carol"]))
            .unwrap();

        assert_eq!(
            store.query_group_members("packagers").unwrap(),
            Some(names(&["carol"]))
        );
        assert_eq!(store.stats().unwrap().memberships, 1);
    }

    #[test]
    fn test_stale_marker_hides_leftover_edges() {
        let (_temp, clock, store) = create_test_store();
        store
            .replace_group_members("packagers", &names(&["alice"]))
            .unwrap();

        clock.advance(TTL);
        assert_eq!(store.query_group_members("packagers").unwrap(), None);
        // Edges are still on disk, just untrusted.
        assert_eq!(store.stats().unwrap().memberships, 1);
    }

    #[test]
    fn test_edges_without_marker_are_a_miss() {
        let (_temp, _clock, store) = create_test_store();
        {
            let conn = store.lock().unwrap();
            conn.execute_batch(
                "PRAGMA foreign_keys=OFF;
                 INSERT INTO group_member (group_name, user_name) VALUES ('ghosts', 'alice');
                 PRAGMA foreign_keys=ON;",
            )
            .unwrap();
        }
        assert_eq!(store.query_group_members("ghosts").unwrap(), None);
    }

    #[test]
    fn test_failed_replace_keeps_previous_membership() {
        let (_temp, clock, store) = create_test_store();
        store
            .replace_group_members("packagers", &names(&["alice", "bob"]))
            .unwrap();

        // Fail the transaction after the old edges are deleted and the marker
        // has been refreshed.
        store
            .lock()
            .unwrap()
            .execute_batch(
                "CREATE TRIGGER fail_insert BEFORE INSERT ON group_member
                 WHEN NEW.user_name = 'mallory'
                 BEGIN SELECT RAISE(ABORT, 'injected failure'); END;",
            )
            .unwrap();

        clock.advance(Duration::from_secs(60));
        let err = store
            .replace_group_members("packagers", &names(&["carol", "mallory"]))
            .unwrap_err();
        assert!(matches!(err, OrphanageError::Database { .. }));

        assert_eq!(
            store.query_group_members("packagers").unwrap(),
            Some(names(&["alice", "bob"]))
        );

        // The marker kept its original stamp as well.
        clock.advance(TTL - Duration::from_secs(60));
        assert_eq!(store.query_group_members("packagers").unwrap(), None);
    }

    #[test]
    fn test_sweep_removes_only_expired_rows() {
        let (_temp, clock, store) = create_test_store();
        store.upsert_user("old", "old@example.org").unwrap();
        store
            .replace_group_members("old-group", &names(&["old", "alice"]))
            .unwrap();

        clock.advance(Duration::from_secs(1800));
        store.upsert_user("new", "new@example.org").unwrap();
        store
            .replace_group_members("new-group", &names(&["new"]))
            .unwrap();

        clock.advance(Duration::from_secs(1800));
        let swept = store.sweep(TTL).unwrap();
        assert_eq!(swept, SweepStats { users: 1, groups: 1 });

        let stats = store.stats().unwrap();
        assert_eq!(
            stats,
            StoreStats {
                users: 1,
                groups: 1,
                memberships: 1
            }
        );
        assert!(store.query_user("new").unwrap().is_some());
        assert_eq!(
            store.query_group_members("new-group").unwrap(),
            Some(names(&["new"]))
        );
    }

    #[test]
    fn test_sweep_with_shorter_ttl() {
        let (_temp, clock, store) = create_test_store();
        store.upsert_user("alice", "alice@example.org").unwrap();
        clock.advance(Duration::from_secs(10));

        assert_eq!(store.sweep(Duration::from_secs(60)).unwrap().users, 0);
        assert_eq!(store.sweep(Duration::from_secs(10)).unwrap().users, 1);
    }

    #[test]
    fn test_reopen_keeps_data() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("nested").join("fasjson.db");
        let clock: Arc<dyn Clock> = Arc::new(ManualClock::at_secs(100));

        {
            let store = SqliteIdentityStore::with_clock(
                &db_path,
                CacheConfig::with_ttl(TTL),
                clock.clone(),
            )
            .unwrap();
            store.upsert_user("alice", "alice@example.org").unwrap();
        }

        let store =
            SqliteIdentityStore::with_clock(&db_path, CacheConfig::with_ttl(TTL), clock).unwrap();
        assert!(store.query_user("alice").unwrap().is_some());
    }
}

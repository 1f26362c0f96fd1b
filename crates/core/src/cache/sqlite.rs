//! SQLite-backed anime cache implementation.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use super::{
    CacheEntry, CacheError, CacheSearchQuery, CacheStats, CacheStore, EntrySource, UpsertOutcome,
};
use crate::remote::CatalogItem;

/// SQLite-backed anime cache.
///
/// The full item snapshot lives in a JSON payload column; the columns
/// used for searching and ordering are duplicated out of it.
pub struct SqliteCache {
    conn: Mutex<Connection>,
}

impl SqliteCache {
    /// Create a new SQLite cache, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, CacheError> {
        let conn = Connection::open(path).map_err(|e| CacheError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite cache (useful for testing).
    pub fn in_memory() -> Result<Self, CacheError> {
        let conn =
            Connection::open_in_memory().map_err(|e| CacheError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), CacheError> {
        conn.execute_batch(
            r#"
            -- Cached anime snapshots (one row per remote id)
            CREATE TABLE IF NOT EXISTS anime_cache (
                id INTEGER PRIMARY KEY,
                title TEXT NOT NULL,
                title_english TEXT,
                synopsis TEXT,
                score REAL,
                payload TEXT NOT NULL,
                fetched_at TEXT NOT NULL,
                source TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_anime_cache_title ON anime_cache(title);
            CREATE INDEX IF NOT EXISTS idx_anime_cache_score ON anime_cache(score);

            -- Genre names for each cached anime
            CREATE TABLE IF NOT EXISTS anime_genres (
                anime_id INTEGER NOT NULL REFERENCES anime_cache(id) ON DELETE CASCADE,
                genre TEXT NOT NULL,
                UNIQUE(anime_id, genre)
            );

            CREATE INDEX IF NOT EXISTS idx_anime_genres_genre ON anime_genres(genre);
            "#,
        )
        .map_err(|e| CacheError::Database(e.to_string()))?;

        Ok(())
    }

    /// Convert a payload row to a CacheEntry.
    fn row_to_entry(row: &rusqlite::Row) -> rusqlite::Result<(String, String, String)> {
        let payload: String = row.get(0)?;
        let fetched_at: String = row.get(1)?;
        let source: String = row.get(2)?;
        Ok((payload, fetched_at, source))
    }

    fn decode_entry(
        (payload, fetched_at, source): (String, String, String),
    ) -> Result<CacheEntry, CacheError> {
        let item: CatalogItem = serde_json::from_str(&payload)
            .map_err(|e| CacheError::Serialization(e.to_string()))?;
        let fetched_at = DateTime::parse_from_rfc3339(&fetched_at)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());
        let source = EntrySource::parse(&source).ok_or_else(|| {
            CacheError::Serialization(format!("unknown entry source '{}'", source))
        })?;
        Ok(CacheEntry {
            item,
            fetched_at,
            source,
        })
    }

    fn collect_entries(
        rows: impl Iterator<Item = rusqlite::Result<(String, String, String)>>,
    ) -> Result<Vec<CacheEntry>, CacheError> {
        let mut entries = Vec::new();
        for row in rows {
            let raw = row.map_err(|e| CacheError::Database(e.to_string()))?;
            entries.push(Self::decode_entry(raw)?);
        }
        Ok(entries)
    }
}

impl CacheStore for SqliteCache {
    fn get(&self, id: u32) -> Result<Option<CacheEntry>, CacheError> {
        let conn = self.conn.lock().unwrap();

        let raw = conn
            .query_row(
                "SELECT payload, fetched_at, source FROM anime_cache WHERE id = ?",
                params![id],
                Self::row_to_entry,
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                _ => Err(CacheError::Database(e.to_string())),
            })?;

        match raw {
            Some(raw) => Ok(Some(Self::decode_entry(raw)?)),
            None => Ok(None),
        }
    }

    fn upsert(
        &self,
        item: &CatalogItem,
        source: EntrySource,
    ) -> Result<UpsertOutcome, CacheError> {
        let conn = self.conn.lock().unwrap();
        let now_str = Utc::now().to_rfc3339();

        let payload =
            serde_json::to_string(item).map_err(|e| CacheError::Serialization(e.to_string()))?;

        let exists: bool = conn
            .query_row(
                "SELECT 1 FROM anime_cache WHERE id = ?",
                params![item.id],
                |_| Ok(true),
            )
            .unwrap_or(false);

        conn.execute(
            "INSERT INTO anime_cache (id, title, title_english, synopsis, score, payload, fetched_at, source)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                title_english = excluded.title_english,
                synopsis = excluded.synopsis,
                score = excluded.score,
                payload = excluded.payload,
                fetched_at = excluded.fetched_at,
                source = excluded.source",
            params![
                item.id,
                &item.title,
                &item.title_english,
                &item.synopsis,
                item.score,
                &payload,
                &now_str,
                source.as_str(),
            ],
        )
        .map_err(|e| CacheError::Database(e.to_string()))?;

        // Replace genres wholesale, same as the payload
        conn.execute(
            "DELETE FROM anime_genres WHERE anime_id = ?",
            params![item.id],
        )
        .map_err(|e| CacheError::Database(e.to_string()))?;

        for genre in &item.genres {
            conn.execute(
                "INSERT OR IGNORE INTO anime_genres (anime_id, genre) VALUES (?, ?)",
                params![item.id, genre],
            )
            .map_err(|e| CacheError::Database(e.to_string()))?;
        }

        if exists {
            Ok(UpsertOutcome::Updated)
        } else {
            Ok(UpsertOutcome::Created)
        }
    }

    fn search(&self, query: &CacheSearchQuery) -> Result<Vec<CacheEntry>, CacheError> {
        let conn = self.conn.lock().unwrap();
        let pattern = format!("%{}%", query.query);

        let mut stmt = conn
            .prepare(
                "SELECT payload, fetched_at, source
                 FROM anime_cache
                 WHERE title LIKE ?1 OR title_english LIKE ?1 OR synopsis LIKE ?1
                 ORDER BY score IS NULL, score DESC
                 LIMIT ?2 OFFSET ?3",
            )
            .map_err(|e| CacheError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(
                params![&pattern, query.limit, query.offset()],
                Self::row_to_entry,
            )
            .map_err(|e| CacheError::Database(e.to_string()))?;

        Self::collect_entries(rows)
    }

    fn top(&self, limit: u32) -> Result<Vec<CacheEntry>, CacheError> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn
            .prepare(
                "SELECT payload, fetched_at, source
                 FROM anime_cache
                 WHERE score IS NOT NULL
                 ORDER BY score DESC
                 LIMIT ?",
            )
            .map_err(|e| CacheError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![limit], Self::row_to_entry)
            .map_err(|e| CacheError::Database(e.to_string()))?;

        Self::collect_entries(rows)
    }

    fn genres(&self) -> Result<Vec<String>, CacheError> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn
            .prepare("SELECT DISTINCT genre FROM anime_genres ORDER BY genre")
            .map_err(|e| CacheError::Database(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| CacheError::Database(e.to_string()))?;

        let mut genres = Vec::new();
        for row in rows {
            genres.push(row.map_err(|e| CacheError::Database(e.to_string()))?);
        }
        Ok(genres)
    }

    fn count(&self) -> Result<u64, CacheError> {
        let conn = self.conn.lock().unwrap();

        conn.query_row("SELECT COUNT(*) FROM anime_cache", [], |row| row.get(0))
            .map_err(|e| CacheError::Database(e.to_string()))
    }

    fn stats(&self) -> Result<CacheStats, CacheError> {
        let conn = self.conn.lock().unwrap();

        let total_items: u64 = conn
            .query_row("SELECT COUNT(*) FROM anime_cache", [], |row| row.get(0))
            .map_err(|e| CacheError::Database(e.to_string()))?;

        let distinct_genres: u64 = conn
            .query_row(
                "SELECT COUNT(DISTINCT genre) FROM anime_genres",
                [],
                |row| row.get(0),
            )
            .map_err(|e| CacheError::Database(e.to_string()))?;

        let oldest_entry: Option<DateTime<Utc>> = conn
            .query_row("SELECT MIN(fetched_at) FROM anime_cache", [], |row| {
                let s: Option<String> = row.get(0)?;
                Ok(s)
            })
            .map_err(|e| CacheError::Database(e.to_string()))?
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc));

        let newest_entry: Option<DateTime<Utc>> = conn
            .query_row("SELECT MAX(fetched_at) FROM anime_cache", [], |row| {
                let s: Option<String> = row.get(0)?;
                Ok(s)
            })
            .map_err(|e| CacheError::Database(e.to_string()))?
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc));

        Ok(CacheStats {
            total_items,
            distinct_genres,
            oldest_entry,
            newest_entry,
        })
    }

    fn clear(&self) -> Result<u64, CacheError> {
        let conn = self.conn.lock().unwrap();

        let removed: u64 = conn
            .query_row("SELECT COUNT(*) FROM anime_cache", [], |row| row.get(0))
            .map_err(|e| CacheError::Database(e.to_string()))?;

        conn.execute_batch(
            "DELETE FROM anime_genres;
             DELETE FROM anime_cache;",
        )
        .map_err(|e| CacheError::Database(e.to_string()))?;

        Ok(removed)
    }
}

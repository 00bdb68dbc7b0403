//! SQLite-backed [`BlobStore`]: one `files` table, one row per test file.

use std::io::{self, Read, Write};
use std::path::Path;

use bench_core::constants::BLOB_TABLE;
use rusqlite::{params, DatabaseName, OptionalExtension};

use super::pool::ConnectionPool;
use super::{BlobStore, StoreError};

pub struct SqliteBlobStore {
    pool: ConnectionPool,
}

impl SqliteBlobStore {
    /// Open a store on the database file at `path` with `pool_size`
    /// connections. The file is created if missing.
    pub fn open(path: &Path, pool_size: usize) -> Result<Self, StoreError> {
        Ok(Self {
            pool: ConnectionPool::open(path, pool_size)?,
        })
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }
}

impl BlobStore for SqliteBlobStore {
    fn create_schema(&self) -> Result<(), StoreError> {
        let conn = self.pool.get();
        conn.execute_batch(&format!(
            "CREATE TABLE {BLOB_TABLE} (name TEXT NOT NULL PRIMARY KEY, data BLOB);"
        ))?;
        Ok(())
    }

    fn insert(&self, name: &str, payload: &[u8]) -> Result<usize, StoreError> {
        let conn = self.pool.get();
        let mut stmt =
            conn.prepare_cached(&format!("INSERT INTO {BLOB_TABLE} (name, data) VALUES (?1, ?2)"))?;
        Ok(stmt.execute(params![name, payload])?)
    }

    fn insert_streamed(
        &self,
        name: &str,
        len: u64,
        source: &mut dyn Read,
    ) -> Result<u64, StoreError> {
        let reserved = i64::try_from(len).map_err(|_| StoreError::TooLarge { len })?;

        let conn = self.pool.get();
        conn.prepare_cached(&format!(
            "INSERT INTO {BLOB_TABLE} (name, data) VALUES (?1, zeroblob(?2))"
        ))?
        .execute(params![name, reserved])?;

        let row_id = conn.last_insert_rowid();
        let mut blob = conn.blob_open(DatabaseName::Main, BLOB_TABLE, "data", row_id, false)?;
        let written = io::copy(source, &mut blob)?;
        blob.close()?;
        Ok(written)
    }

    fn get(&self, name: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let conn = self.pool.get();
        let mut stmt =
            conn.prepare_cached(&format!("SELECT data FROM {BLOB_TABLE} WHERE name = ?1"))?;
        let data = stmt
            .query_row([name], |row| row.get::<_, Option<Vec<u8>>>(0))
            .optional()?;
        Ok(data.map(Option::unwrap_or_default))
    }

    fn copy_to(&self, name: &str, sink: &mut dyn Write) -> Result<u64, StoreError> {
        let conn = self.pool.get();
        let mut stmt =
            conn.prepare_cached(&format!("SELECT data FROM {BLOB_TABLE} WHERE name = ?1"))?;
        let mut rows = stmt.query([name])?;

        let row = rows.next()?.ok_or_else(|| StoreError::NotFound {
            name: name.to_string(),
        })?;
        let copied = match row.get_ref(0)?.as_blob_or_null()? {
            Some(mut data) => io::copy(&mut data, sink)?,
            None => 0,
        };

        if rows.next()?.is_some() {
            return Err(StoreError::ExtraRow {
                name: name.to_string(),
            });
        }
        Ok(copied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, SqliteBlobStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteBlobStore::open(&dir.path().join("store.db"), 2).unwrap();
        store.create_schema().unwrap();
        (dir, store)
    }

    #[test]
    fn schema_creation_twice_fails() {
        let (_dir, store) = temp_store();
        assert!(matches!(
            store.create_schema(),
            Err(StoreError::Sqlite(_))
        ));
    }

    #[test]
    fn insert_then_get_returns_payload() {
        let (_dir, store) = temp_store();
        assert_eq!(store.insert("0.bin", b"hello blob").unwrap(), 1);
        assert_eq!(store.get("0.bin").unwrap().as_deref(), Some(&b"hello blob"[..]));
        assert_eq!(store.get("1.bin").unwrap(), None);
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let (_dir, store) = temp_store();
        store.insert("0.bin", b"a").unwrap();
        assert!(store.insert("0.bin", b"b").is_err());
    }

    #[test]
    fn streamed_insert_matches_buffered_insert() {
        let (_dir, store) = temp_store();
        let payload: Vec<u8> = (0..70_000u32).map(|i| (i % 251) as u8).collect();

        store.insert("buffered", &payload).unwrap();
        let written = store
            .insert_streamed("streamed", payload.len() as u64, &mut payload.as_slice())
            .unwrap();

        assert_eq!(written, payload.len() as u64);
        assert_eq!(store.get("buffered").unwrap(), store.get("streamed").unwrap());
    }

    #[test]
    fn streamed_insert_stops_at_reserved_length() {
        let (_dir, store) = temp_store();
        let payload = vec![7u8; 32];
        assert!(store
            .insert_streamed("short", 16, &mut payload.as_slice())
            .is_err());
    }

    #[test]
    fn copy_to_drains_whole_payload() {
        let (_dir, store) = temp_store();
        store.insert("0.bin", &[1, 2, 3, 4, 5]).unwrap();

        let mut out = Vec::new();
        assert_eq!(store.copy_to("0.bin", &mut out).unwrap(), 5);
        assert_eq!(out, vec![1, 2, 3, 4, 5]);
        assert_eq!(store.pool().idle_count(), 2);
    }

    #[test]
    fn copy_to_missing_name_is_not_found() {
        let (_dir, store) = temp_store();
        let err = store.copy_to("nope.bin", &mut io::sink()).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { name } if name == "nope.bin"));
        assert_eq!(store.pool().idle_count(), 2);
    }

    #[test]
    fn copy_to_null_payload_counts_zero() {
        let (_dir, store) = temp_store();
        store
            .pool()
            .get()
            .execute("INSERT INTO files (name, data) VALUES ('null.bin', NULL)", [])
            .unwrap();
        assert_eq!(store.copy_to("null.bin", &mut io::sink()).unwrap(), 0);
    }
}

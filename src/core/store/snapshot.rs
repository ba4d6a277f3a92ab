//! Whole-database snapshots as base64 text
//!
//! SQLite's online backup API copies the in-memory database to a scratch
//! file (and back); the file bytes are what gets encoded.

use std::io::Write;

use base64::prelude::{Engine, BASE64_STANDARD};
use rusqlite::backup::Progress;
use rusqlite::{Connection, DatabaseName};
use tempfile::NamedTempFile;

use super::StoreError;

/// Serialize the main database to a base64 string
pub(super) fn export(conn: &Connection) -> Result<String, StoreError> {
    let scratch = NamedTempFile::new()?;
    conn.backup(DatabaseName::Main, scratch.path(), None)?;
    let bytes = std::fs::read(scratch.path())?;
    Ok(BASE64_STANDARD.encode(bytes))
}

/// Replace the main database with the contents of a base64 snapshot
pub(super) fn restore(conn: &mut Connection, encoded: &str) -> Result<(), StoreError> {
    let bytes = BASE64_STANDARD.decode(encoded.trim())?;

    let mut scratch = NamedTempFile::new()?;
    scratch.write_all(&bytes)?;
    scratch.flush()?;

    conn.restore(DatabaseName::Main, scratch.path(), None::<fn(Progress)>)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_carries_rows() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (v TEXT); INSERT INTO t VALUES ('بلدية');")
            .unwrap();

        let encoded = export(&conn).unwrap();
        assert!(!encoded.is_empty());

        let mut other = Connection::open_in_memory().unwrap();
        restore(&mut other, &encoded).unwrap();
        let value: String = other
            .query_row("SELECT v FROM t", [], |row| row.get(0))
            .unwrap();
        assert_eq!(value, "بلدية");
    }

    #[test]
    fn test_restore_rejects_bad_base64() {
        let mut conn = Connection::open_in_memory().unwrap();
        let err = restore(&mut conn, "not base64 !!").unwrap_err();
        assert!(matches!(err, StoreError::SnapshotEncoding(_)));
    }

    #[test]
    fn test_restore_rejects_non_database_bytes() {
        let mut conn = Connection::open_in_memory().unwrap();
        let encoded = BASE64_STANDARD.encode(b"definitely not an sqlite file, just some text padding it out");
        assert!(restore(&mut conn, &encoded).is_err());
    }
}

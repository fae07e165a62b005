//! SQLite storage for flattened rule records.
//!
//! A [`Database`] owns the single connection of a run. Storage settings are
//! applied once when it opens; every [`Database::load`] then runs as
//! create table → begin → insert loop → commit, with one prepared statement
//! reused for the whole batch.

mod schema;

pub use schema::{create_table_sql, insert_sql, Column, TableRow};

use rusqlite::{params_from_iter, Connection, OpenFlags};
use std::path::Path;

use crate::config::StorageConfig;
use crate::error::Error;
use crate::ruleset::{DomainEntry, Records};
use crate::table::{is_valid_identifier, quote_identifier};
use crate::Result;

/// Output database for rule tables.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) a database file and apply the storage settings.
    pub fn open(path: impl AsRef<Path>, storage: &StorageConfig) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        Self::from_connection(conn, storage)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory(storage: &StorageConfig) -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?, storage)
    }

    /// Open an existing database file read-only, leaving its settings untouched.
    pub fn open_read_only(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path.as_ref(),
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self { conn })
    }

    /// Take ownership of an existing connection and apply the storage settings.
    pub fn from_connection(conn: Connection, storage: &StorageConfig) -> Result<Self> {
        let db = Self { conn };
        db.configure(storage)?;
        Ok(db)
    }

    fn configure(&self, storage: &StorageConfig) -> Result<()> {
        // SQLite answers with the mode actually in effect; in-memory
        // databases stay on "memory" whatever was asked for.
        let mode: String = self.conn.pragma_update_and_check(
            None,
            "journal_mode",
            storage.journal_mode.as_str(),
            |row| row.get(0),
        )?;
        self.conn
            .pragma_update(None, "synchronous", storage.synchronous.as_str())?;
        self.conn
            .pragma_update(None, "temp_store", storage.temp_store.as_str())?;
        log::debug!(
            "storage configured: journal_mode={} synchronous={} temp_store={}",
            mode,
            storage.synchronous.as_str(),
            storage.temp_store.as_str()
        );
        Ok(())
    }

    /// Underlying connection, for ad-hoc queries.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Insert every row into `table`, creating it if absent.
    ///
    /// Rows are appended to an existing table. The batch is committed as a
    /// whole or not at all. Returns the number of rows inserted.
    pub fn load<R: TableRow>(&mut self, table: &str, rows: &[R]) -> Result<usize> {
        if !is_valid_identifier(table) {
            return Err(Error::InvalidTableName(table.to_string()));
        }
        if rows.is_empty() {
            return Err(Error::EmptyRecords {
                table: table.to_string(),
            });
        }

        self.conn.execute_batch(&create_table_sql::<R>(table))?;

        // Dropping `tx` before commit rolls back.
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(&insert_sql::<R>(table))?;
            for row in rows {
                stmt.execute(params_from_iter(row.values()))?;
            }
        }
        tx.commit()?;

        log::info!("Loaded {} rows into {}", rows.len(), table);
        Ok(rows.len())
    }

    /// Load CIDR strings into an IP-CIDR table.
    pub fn load_cidrs(&mut self, table: &str, cidrs: &[String]) -> Result<usize> {
        self.load(table, cidrs)
    }

    /// Load domain entries into a domain table.
    pub fn load_domains(&mut self, table: &str, entries: &[DomainEntry]) -> Result<usize> {
        self.load(table, entries)
    }

    /// Load flattened records of either kind.
    pub fn load_records(&mut self, table: &str, records: &Records) -> Result<usize> {
        match records {
            Records::Cidrs(cidrs) => self.load_cidrs(table, cidrs),
            Records::Domains(entries) => self.load_domains(table, entries),
        }
    }

    /// Number of rows in a table. Any existing table name is accepted.
    pub fn count_rows(&self, table: &str) -> Result<u64> {
        let sql = format!("SELECT COUNT(*) FROM {}", quote_identifier(table));
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Names of all user tables, sorted.
    pub fn table_names(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master \
             WHERE type = 'table' AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\' ORDER BY name",
        )?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DomainKind;
    use tempfile::tempdir;

    fn memory_db() -> Database {
        Database::open_in_memory(&StorageConfig::default()).unwrap()
    }

    fn cidr_rows(db: &Database, table: &str) -> Vec<(i64, String)> {
        let mut stmt = db
            .connection()
            .prepare(&format!("SELECT id, ip_cidr FROM {} ORDER BY id", table))
            .unwrap();
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
            .unwrap()
            .collect::<rusqlite::Result<Vec<_>>>()
            .unwrap();
        rows
    }

    #[test]
    fn test_load_cidrs() {
        let mut db = memory_db();
        let cidrs = vec!["5.62.60.5/32".to_string(), "34.99.208.0/23".to_string()];
        assert_eq!(db.load_cidrs("geoip_test", &cidrs).unwrap(), 2);

        assert_eq!(
            cidr_rows(&db, "geoip_test"),
            vec![
                (1, "5.62.60.5/32".to_string()),
                (2, "34.99.208.0/23".to_string())
            ]
        );
    }

    #[test]
    fn test_load_domains_fills_matching_column() {
        let mut db = memory_db();
        let entries = vec![
            DomainEntry::new(DomainKind::Domain, "1password.com"),
            DomainEntry::new(DomainKind::DomainSuffix, "4everproxy.com"),
        ];
        db.load_domains("domain_test", &entries).unwrap();

        let mut stmt = db
            .connection()
            .prepare(
                "SELECT id, domain, domain_suffix, domain_keyword, domain_regex \
                 FROM domain_test ORDER BY id",
            )
            .unwrap();
        let rows: Vec<(i64, Option<String>, Option<String>, Option<String>, Option<String>)> = stmt
            .query_map([], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?)))
            .unwrap()
            .collect::<rusqlite::Result<_>>()
            .unwrap();

        assert_eq!(
            rows,
            vec![
                (1, Some("1password.com".to_string()), None, None, None),
                (2, None, Some("4everproxy.com".to_string()), None, None),
            ]
        );
    }

    #[test]
    fn test_empty_records_rejected_without_table() {
        let mut db = memory_db();
        let err = db.load_cidrs("geoip_empty", &[]).unwrap_err();
        assert!(matches!(err, Error::EmptyRecords { .. }));
        assert!(db.table_names().unwrap().is_empty());
    }

    #[test]
    fn test_invalid_table_name_rejected() {
        let mut db = memory_db();
        let cidrs = vec!["10.0.0.0/8".to_string()];
        let err = db.load_cidrs("geoip-cn; DROP", &cidrs).unwrap_err();
        assert!(matches!(err, Error::InvalidTableName(_)));
    }

    #[test]
    fn test_existing_table_appends() {
        let mut db = memory_db();
        let first = vec!["10.0.0.0/8".to_string()];
        let second = vec!["10.0.0.0/8".to_string(), "172.16.0.0/12".to_string()];
        db.load_cidrs("geoip_private", &first).unwrap();
        db.load_cidrs("geoip_private", &second).unwrap();

        assert_eq!(db.count_rows("geoip_private").unwrap(), 3);
        let rows = cidr_rows(&db, "geoip_private");
        assert_eq!(rows[1], (2, "10.0.0.0/8".to_string()));
        assert_eq!(rows[2], (3, "172.16.0.0/12".to_string()));
    }

    #[test]
    fn test_mid_batch_failure_rolls_back() {
        let mut db = memory_db();
        db.load_cidrs("geoip_fail", &["1.1.1.1/32".to_string()])
            .unwrap();
        db.connection()
            .execute_batch(
                "CREATE TRIGGER reject_boom BEFORE INSERT ON geoip_fail
                 WHEN NEW.ip_cidr = 'boom'
                 BEGIN SELECT RAISE(ABORT, 'injected failure'); END;",
            )
            .unwrap();

        let batch = vec![
            "2.2.2.2/32".to_string(),
            "3.3.3.3/32".to_string(),
            "boom".to_string(),
            "4.4.4.4/32".to_string(),
        ];
        let err = db.load_cidrs("geoip_fail", &batch).unwrap_err();
        assert!(matches!(err, Error::Sqlite(_)));
        assert_eq!(db.count_rows("geoip_fail").unwrap(), 1);

        // The connection is usable again after the rollback.
        db.load_cidrs("geoip_fail", &batch[..2]).unwrap();
        assert_eq!(db.count_rows("geoip_fail").unwrap(), 3);
    }

    #[test]
    fn test_count_rows_on_foreign_table_names() {
        let db = memory_db();
        db.connection()
            .execute_batch(
                "CREATE TABLE \"geoip-cn x\" (v TEXT);
                 INSERT INTO \"geoip-cn x\" VALUES ('a'), ('b');
                 CREATE TABLE sqliteish (v TEXT);",
            )
            .unwrap();
        assert_eq!(db.count_rows("geoip-cn x").unwrap(), 2);
        assert_eq!(db.count_rows("sqliteish").unwrap(), 0);
        assert_eq!(db.table_names().unwrap(), vec!["geoip-cn x", "sqliteish"]);
        assert!(matches!(db.count_rows("missing"), Err(Error::Sqlite(_))));
    }

    #[test]
    fn test_read_only_open_keeps_settings() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rules.db");
        assert!(Database::open_read_only(&path).is_err());
        assert!(!path.exists());

        {
            let storage = StorageConfig {
                journal_mode: crate::JournalMode::Delete,
                ..StorageConfig::default()
            };
            let mut db = Database::open(&path, &storage).unwrap();
            db.load_cidrs("geoip_cn", &["1.0.1.0/24".to_string()])
                .unwrap();
        }

        let db = Database::open_read_only(&path).unwrap();
        assert_eq!(db.table_names().unwrap(), vec!["geoip_cn"]);
        assert_eq!(db.count_rows("geoip_cn").unwrap(), 1);
        let mode: String = db
            .connection()
            .query_row("PRAGMA journal_mode", [], |r| r.get(0))
            .unwrap();
        assert_eq!(mode, "delete");
        assert!(db
            .connection()
            .execute_batch("CREATE TABLE t (v TEXT)")
            .is_err());
    }

    #[test]
    fn test_table_names() {
        let mut db = memory_db();
        db.load_cidrs("geoip_cn", &["1.0.1.0/24".to_string()])
            .unwrap();
        db.load_domains("domain_cn", &[DomainEntry::new(DomainKind::DomainSuffix, "cn")])
            .unwrap();
        assert_eq!(db.table_names().unwrap(), vec!["domain_cn", "geoip_cn"]);
    }

    #[test]
    fn test_storage_settings_applied_on_open() {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("rules.db"), &StorageConfig::default()).unwrap();
        let conn = db.connection();

        let mode: String = conn.query_row("PRAGMA journal_mode", [], |r| r.get(0)).unwrap();
        assert_eq!(mode, "wal");
        let sync: i64 = conn.query_row("PRAGMA synchronous", [], |r| r.get(0)).unwrap();
        assert_eq!(sync, 0);
        let temp: i64 = conn.query_row("PRAGMA temp_store", [], |r| r.get(0)).unwrap();
        assert_eq!(temp, 2);
    }

    #[test]
    fn test_data_persists_across_open() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rules.db");
        {
            let mut db = Database::open(&path, &StorageConfig::default()).unwrap();
            db.load_records("geoip_cn", &Records::Cidrs(vec!["1.0.1.0/24".to_string()]))
                .unwrap();
        }
        let db = Database::open(&path, &StorageConfig::default()).unwrap();
        assert_eq!(db.count_rows("geoip_cn").unwrap(), 1);
    }
}

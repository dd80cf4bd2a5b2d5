use super::{DatabaseGateway, StoreError};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, OptionalExtension, params};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const ATTACHED_SCHEMA: &str = "crossref";
const REGISTRY_TABLE: &str = "Bookmarks";

/// A result database opened as the reference for a cross-reference session.
pub struct SqliteGateway {
    conn: Connection,
    path: PathBuf,
}

impl SqliteGateway {
    /// Opens an existing database. The file is never created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(StoreError::MissingDatabase(path.to_path_buf()));
        }
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        debug!("Opened reference database {}", path.display());
        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    /// Closes the connection, reporting any error SQLite raises on close.
    pub fn close(self) -> Result<(), StoreError> {
        let path = self.path;
        self.conn.close().map_err(|(_, e)| StoreError::from(e))?;
        debug!("Closed reference database {}", path.display());
        Ok(())
    }

    fn attach(&self, other_db: &Path) -> Result<AttachGuard<'_>, StoreError> {
        if !other_db.is_file() {
            return Err(StoreError::MissingDatabase(other_db.to_path_buf()));
        }
        self.conn.execute(
            &format!("ATTACH DATABASE ?1 AS {}", ATTACHED_SCHEMA),
            params![read_only_uri(other_db)],
        )?;
        Ok(AttachGuard { conn: &self.conn })
    }

    fn cross_reference(
        &mut self,
        current: &str,
        other_db: &Path,
        other_bookmark: &str,
        result: &str,
        keep_matches: bool,
    ) -> Result<(), StoreError> {
        let _guard = self.attach(other_db)?;

        let present: bool = self.conn.query_row(
            &format!(
                "SELECT EXISTS(SELECT 1 FROM {}.sqlite_master WHERE name = ?1 AND type IN ('table', 'view'))",
                ATTACHED_SCHEMA
            ),
            params![other_bookmark],
            |row| row.get(0),
        )?;
        if !present {
            return Err(StoreError::MissingBookmark {
                database: other_db.to_path_buf(),
                bookmark: other_bookmark.to_string(),
            });
        }

        // A NULL LigName on either side matches nothing.
        let operator = if keep_matches { "EXISTS" } else { "NOT EXISTS" };
        self.conn.execute_batch(&format!(
            "DROP TABLE IF EXISTS temp.{result};
             CREATE TEMP TABLE {result} AS
                 SELECT cur.* FROM {current} AS cur
                 WHERE {operator} (
                     SELECT 1 FROM {schema}.{other} AS sec WHERE sec.LigName = cur.LigName
                 );",
            result = quote_ident(result),
            current = quote_ident(current),
            operator = operator,
            schema = ATTACHED_SCHEMA,
            other = quote_ident(other_bookmark),
        ))?;
        Ok(())
    }
}

impl DatabaseGateway for SqliteGateway {
    fn bookmark_exists(&self, bookmark: &str) -> Result<bool, StoreError> {
        let exists = self.conn.query_row(
            "SELECT EXISTS(
                 SELECT 1 FROM sqlite_master WHERE name = ?1 AND type IN ('table', 'view')
                 UNION ALL
                 SELECT 1 FROM sqlite_temp_master WHERE name = ?1 AND type IN ('table', 'view')
             )",
            params![bookmark],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    fn intersect(
        &mut self,
        current: &str,
        other_db: &Path,
        other_bookmark: &str,
        result: &str,
    ) -> Result<(), StoreError> {
        self.cross_reference(current, other_db, other_bookmark, result, true)
    }

    fn difference(
        &mut self,
        current: &str,
        other_db: &Path,
        other_bookmark: &str,
        result: &str,
    ) -> Result<(), StoreError> {
        self.cross_reference(current, other_db, other_bookmark, result, false)
    }

    fn count(&self, bookmark: &str) -> Result<u64, StoreError> {
        let count: i64 = self.conn.query_row(
            &format!(
                "SELECT COUNT(DISTINCT LigName) FROM {}",
                quote_ident(bookmark)
            ),
            [],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as u64)
    }

    fn ligand_names(&self, bookmark: &str) -> Result<Vec<String>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT DISTINCT LigName FROM {} WHERE LigName IS NOT NULL ORDER BY LigName",
            quote_ident(bookmark)
        ))?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    fn export_csv(&self, bookmark: &str, path: &Path) -> Result<u64, StoreError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT * FROM {}", quote_ident(bookmark)))?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();

        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(&columns)?;

        let mut rows = stmt.query([])?;
        let mut written = 0u64;
        while let Some(row) = rows.next()? {
            let mut record = Vec::with_capacity(columns.len());
            for idx in 0..columns.len() {
                record.push(render_value(row.get_ref(idx)?));
            }
            writer.write_record(&record)?;
            written += 1;
        }
        writer.flush()?;
        debug!(
            "Exported {} row(s) of '{}' to {}",
            written,
            bookmark,
            path.display()
        );
        Ok(written)
    }

    fn save_bookmark(
        &mut self,
        source: &str,
        name: &str,
        description: &str,
    ) -> Result<(), StoreError> {
        if name.trim().is_empty() {
            return Err(StoreError::InvalidBookmarkName(name.to_string()));
        }
        if name.eq_ignore_ascii_case(REGISTRY_TABLE) {
            return Err(StoreError::InvalidBookmarkName(name.to_string()));
        }
        let target = quote_ident(name);

        let tx = self.conn.transaction()?;
        let existing: Option<String> = tx
            .query_row(
                "SELECT type FROM main.sqlite_master
                 WHERE name = ?1 COLLATE NOCASE AND type IN ('table', 'view')",
                params![name],
                |row| row.get(0),
            )
            .optional()?;
        // Only a registered bookmark may be replaced.
        if existing.is_some() && !is_registered(&tx, name)? {
            return Err(StoreError::InvalidBookmarkName(name.to_string()));
        }
        match existing.as_deref() {
            Some("view") => {
                tx.execute_batch(&format!("DROP VIEW main.{}", target))?;
            }
            Some(_) => {
                tx.execute_batch(&format!("DROP TABLE main.{}", target))?;
            }
            None => {}
        }
        tx.execute_batch(&format!(
            "CREATE TABLE main.{} AS SELECT * FROM {};
             CREATE TABLE IF NOT EXISTS main.{} (Bookmark_name TEXT PRIMARY KEY, Query TEXT);",
            target,
            quote_ident(source),
            REGISTRY_TABLE
        ))?;
        tx.execute(
            &format!(
                "INSERT OR REPLACE INTO main.{} (Bookmark_name, Query) VALUES (?1, ?2)",
                REGISTRY_TABLE
            ),
            params![name, description],
        )?;
        tx.commit()?;
        debug!(
            "Saved bookmark '{}' in {} (type was {:?})",
            name,
            self.path.display(),
            existing
        );
        Ok(())
    }
}

fn is_registered(conn: &Connection, name: &str) -> Result<bool, StoreError> {
    let has_registry: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM main.sqlite_master WHERE name = ?1 AND type = 'table')",
        params![REGISTRY_TABLE],
        |row| row.get(0),
    )?;
    if !has_registry {
        return Ok(false);
    }
    let registered = conn.query_row(
        &format!(
            "SELECT EXISTS(SELECT 1 FROM main.{} WHERE Bookmark_name = ?1 COLLATE NOCASE)",
            REGISTRY_TABLE
        ),
        params![name],
        |row| row.get(0),
    )?;
    Ok(registered)
}

struct AttachGuard<'a> {
    conn: &'a Connection,
}

impl Drop for AttachGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = self
            .conn
            .execute_batch(&format!("DETACH DATABASE {}", ATTACHED_SCHEMA))
        {
            warn!("Failed to detach cross-reference database: {}", e);
        }
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn read_only_uri(path: &Path) -> String {
    let mut uri = String::from("file:");
    for ch in path.to_string_lossy().chars() {
        match ch {
            '%' => uri.push_str("%25"),
            '?' => uri.push_str("%3f"),
            '#' => uri.push_str("%23"),
            other => uri.push(other),
        }
    }
    uri.push_str("?mode=ro");
    uri
}

fn render_value(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) => String::from_utf8_lossy(t).into_owned(),
        ValueRef::Blob(b) => b.iter().map(|byte| format!("{:02x}", byte)).collect(),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use rusqlite::Connection;
    use std::path::{Path, PathBuf};

    /// Creates a result database whose `bookmark` view lists `ligands`.
    pub fn create_results_db(dir: &Path, file: &str, bookmark: &str, ligands: &[&str]) -> PathBuf {
        let path = dir.join(file);
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE Results (Pose_ID INTEGER PRIMARY KEY, LigName TEXT, docking_score REAL);",
        )
        .unwrap();
        for (idx, name) in ligands.iter().enumerate() {
            conn.execute(
                "INSERT INTO Results (LigName, docking_score) VALUES (?1, ?2)",
                rusqlite::params![name, -5.0 - idx as f64],
            )
            .unwrap();
        }
        conn.execute_batch(&format!(
            "CREATE VIEW \"{}\" AS SELECT * FROM Results;",
            bookmark
        ))
        .unwrap();
        path
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::create_results_db;
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn open_refuses_to_create_missing_database() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("absent.db");
        assert!(matches!(
            SqliteGateway::open(&missing),
            Err(StoreError::MissingDatabase(p)) if p == missing
        ));
        assert!(!missing.exists());
    }

    #[test]
    fn intersect_and_difference_materialize_scratch_bookmarks() {
        let dir = tempdir().unwrap();
        let a = create_results_db(dir.path(), "a.db", "passing_results", &["L1", "L2", "L3"]);
        let b = create_results_db(dir.path(), "b.db", "passing_results", &["L2", "L3", "L4"]);
        let c = create_results_db(dir.path(), "c.db", "passing_results", &["L3"]);

        let mut gateway = SqliteGateway::open(&a).unwrap();
        assert!(gateway.bookmark_exists("passing_results").unwrap());
        assert!(!gateway.bookmark_exists("crossref_1").unwrap());

        gateway
            .intersect("passing_results", &b, "passing_results", "crossref_1")
            .unwrap();
        assert!(gateway.bookmark_exists("crossref_1").unwrap());
        assert_eq!(gateway.count("crossref_1").unwrap(), 2);
        assert_eq!(gateway.ligand_names("crossref_1").unwrap(), vec!["L2", "L3"]);

        gateway
            .difference("crossref_1", &c, "passing_results", "crossref_2")
            .unwrap();
        assert_eq!(gateway.ligand_names("crossref_2").unwrap(), vec!["L2"]);
        gateway.close().unwrap();
    }

    #[test]
    fn missing_secondary_bookmark_detaches_and_reports() {
        let dir = tempdir().unwrap();
        let a = create_results_db(dir.path(), "a.db", "passing_results", &["L1"]);
        let b = create_results_db(dir.path(), "b.db", "other_bookmark", &["L1"]);

        let mut gateway = SqliteGateway::open(&a).unwrap();
        let err = gateway
            .intersect("passing_results", &b, "passing_results", "crossref_1")
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::MissingBookmark { ref bookmark, .. } if bookmark == "passing_results"
        ));

        // A second attach only succeeds if the first one was released.
        gateway
            .intersect("passing_results", &b, "other_bookmark", "crossref_1")
            .unwrap();
        assert_eq!(gateway.count("crossref_1").unwrap(), 1);
    }

    #[test]
    fn missing_secondary_file_is_reported() {
        let dir = tempdir().unwrap();
        let a = create_results_db(dir.path(), "a.db", "passing_results", &["L1"]);
        let mut gateway = SqliteGateway::open(&a).unwrap();
        let err = gateway
            .difference(
                "passing_results",
                &dir.path().join("gone.db"),
                "passing_results",
                "crossref_1",
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingDatabase(_)));
    }

    #[test]
    fn secondary_database_is_not_modified() {
        let dir = tempdir().unwrap();
        let a = create_results_db(dir.path(), "a.db", "passing_results", &["L1", "L2"]);
        let b = create_results_db(dir.path(), "b#1.db", "passing_results", &["L2"]);
        let before = std::fs::read(&b).unwrap();

        let mut gateway = SqliteGateway::open(&a).unwrap();
        gateway
            .intersect("passing_results", &b, "passing_results", "crossref_1")
            .unwrap();
        gateway.close().unwrap();

        assert_eq!(std::fs::read(&b).unwrap(), before);
    }

    #[test]
    fn export_csv_writes_header_and_rows() {
        let dir = tempdir().unwrap();
        let a = create_results_db(dir.path(), "a.db", "passing_results", &["L1", "L2"]);
        let gateway = SqliteGateway::open(&a).unwrap();
        let out = dir.path().join("crossref.csv");

        let rows = gateway.export_csv("passing_results", &out).unwrap();
        assert_eq!(rows, 2);

        let mut reader = csv::Reader::from_path(&out).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(
            headers.iter().collect::<Vec<_>>(),
            vec!["Pose_ID", "LigName", "docking_score"]
        );
        let names: Vec<String> = reader
            .records()
            .map(|r| r.unwrap()[1].to_string())
            .collect();
        assert_eq!(names, vec!["L1", "L2"]);
    }

    #[test]
    fn save_bookmark_persists_table_and_registry_entry() {
        let dir = tempdir().unwrap();
        let a = create_results_db(dir.path(), "a.db", "passing_results", &["L1", "L2"]);
        let b = create_results_db(dir.path(), "b.db", "passing_results", &["L1"]);

        let mut gateway = SqliteGateway::open(&a).unwrap();
        gateway
            .intersect("passing_results", &b, "passing_results", "crossref_1")
            .unwrap();
        gateway
            .save_bookmark("crossref_1", "selective", "+b.db")
            .unwrap();
        gateway
            .save_bookmark("crossref_1", "selective", "+b.db again")
            .unwrap();
        gateway.close().unwrap();

        let conn = Connection::open(&a).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM selective", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
        let query: String = conn
            .query_row(
                "SELECT Query FROM Bookmarks WHERE Bookmark_name = 'selective'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(query, "+b.db again");
    }

    #[test]
    fn save_bookmark_never_replaces_unregistered_tables() {
        let dir = tempdir().unwrap();
        let a = create_results_db(dir.path(), "a.db", "passing_results", &["L1", "L2", "L3"]);
        let b = create_results_db(dir.path(), "b.db", "passing_results", &["L1"]);

        let mut gateway = SqliteGateway::open(&a).unwrap();
        gateway
            .intersect("passing_results", &b, "passing_results", "crossref_1")
            .unwrap();
        for name in ["Results", "results", "passing_results", "Bookmarks"] {
            assert!(
                matches!(
                    gateway.save_bookmark("crossref_1", name, "+b.db"),
                    Err(StoreError::InvalidBookmarkName(ref n)) if n == name
                ),
                "{name} should be refused"
            );
        }
        gateway.close().unwrap();

        let conn = Connection::open(&a).unwrap();
        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM Results", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 3);
        let view_rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM passing_results", [], |row| row.get(0))
            .unwrap();
        assert_eq!(view_rows, 3);
    }

    #[test]
    fn difference_ignores_null_ligand_names_in_the_other_set() {
        let dir = tempdir().unwrap();
        let a = create_results_db(dir.path(), "a.db", "passing_results", &["L2", "L3"]);
        let c = create_results_db(dir.path(), "c.db", "passing_results", &["L3"]);
        Connection::open(&c)
            .unwrap()
            .execute_batch("INSERT INTO Results (LigName, docking_score) VALUES (NULL, -1.0);")
            .unwrap();

        let mut gateway = SqliteGateway::open(&a).unwrap();
        gateway
            .difference("passing_results", &c, "passing_results", "crossref_1")
            .unwrap();
        assert_eq!(gateway.ligand_names("crossref_1").unwrap(), vec!["L2"]);
        assert_eq!(gateway.count("crossref_1").unwrap(), 1);

        gateway
            .intersect("passing_results", &c, "passing_results", "crossref_2")
            .unwrap();
        assert_eq!(gateway.ligand_names("crossref_2").unwrap(), vec!["L3"]);
    }

    #[test]
    fn save_bookmark_rejects_empty_name() {
        let dir = tempdir().unwrap();
        let a = create_results_db(dir.path(), "a.db", "passing_results", &["L1"]);
        let mut gateway = SqliteGateway::open(&a).unwrap();
        assert!(matches!(
            gateway.save_bookmark("passing_results", "  ", ""),
            Err(StoreError::InvalidBookmarkName(_))
        ));
    }

    #[test]
    fn identifiers_and_uris_are_escaped() {
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
        assert_eq!(
            read_only_uri(Path::new("/tmp/run#2?x%.db")),
            "file:/tmp/run%232%3fx%25.db?mode=ro"
        );
    }
}

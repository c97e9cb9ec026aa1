// src/store.rs
//! Per-box SQLite store of captured cases.
//!
//! Layout: `<base_dir>/<box dir>/<box dir>.db`, one table `processos`. The
//! column names are the ones the dashboard already reads.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::config::consts::CASES_TABLE;
use crate::core::sanitize::box_dir_name;
use crate::error::StoreError;

pub const DATE_FMT: &str = "%Y-%m-%d";
pub const TIME_FMT: &str = "%H:%M:%S";
pub const STAMP_FMT: &str = "%Y-%m-%d %H:%M:%S";

/// One row of `processos`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaseRecord {
    pub case_number: String,
    pub assignee_email: String,
    pub technician: String,
    pub box_name: String,
    pub captured_date: NaiveDate,
    pub captured_time: NaiveTime,
    pub concluded: bool,
    pub concluded_at: Option<NaiveDateTime>,
}

impl CaseRecord {
    /// A fresh, open record from one listing sighting.
    pub fn sighted(case_number: &str, assignee: &str, box_name: &str, at: NaiveDateTime) -> Self {
        Self {
            case_number: s!(case_number),
            assignee_email: s!(assignee),
            technician: s!(assignee),
            box_name: s!(box_name),
            captured_date: at.date(),
            // Sub-second precision is not stored
            captured_time: at.time().with_nanosecond(0).unwrap_or(at.time()),
            concluded: false,
            concluded_at: None,
        }
    }
}

/// Write side of the reconciliation store, as the capture sees it.
pub trait CaseLedger {
    /// Insert unseen case numbers, refresh the rest. One transaction per call.
    /// Returns the number of records written.
    fn upsert(&mut self, records: &[CaseRecord]) -> Result<usize, StoreError>;

    /// Conclude every open record whose number is not in `current`. Returns how
    /// many were concluded.
    fn mark_concluded(&mut self, current: &HashSet<String>) -> Result<usize, StoreError>;
}

/// Path of a box's store under `base_dir`.
pub fn store_path(base_dir: &Path, box_name: &str) -> PathBuf {
    let dir = box_dir_name(box_name);
    base_dir.join(&dir).join(format!("{dir}.db"))
}

pub struct CaseStore {
    conn: Connection,
    path: PathBuf,
}

impl CaseStore {
    /// Open (creating when needed) the store of `box_name` under `base_dir`.
    pub fn open(base_dir: &Path, box_name: &str) -> Result<Self, StoreError> {
        let path = store_path(base_dir, box_name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| StoreError::Dir { path: parent.to_path_buf(), source: e })?;
        }
        Self::open_at(&path)
    }

    /// Open an existing store; never creates one.
    pub fn open_existing(base_dir: &Path, box_name: &str) -> Result<Self, StoreError> {
        let path = store_path(base_dir, box_name);
        if !path.is_file() {
            return Err(StoreError::Missing(s!(box_name)));
        }
        Self::open_at(&path)
    }

    pub fn open_at(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let store = Self { conn, path: path.to_path_buf() };
        store.migrate()?;
        logd!(path = %path.display(), "store opened");
        Ok(store)
    }

    /// Throwaway store, mostly for tests.
    pub fn in_memory() -> Result<Self, StoreError> {
        let store = Self { conn: Connection::open_in_memory()?, path: PathBuf::from(":memory:") };
        store.migrate()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn migrate(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {CASES_TABLE} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                processo_numero TEXT UNIQUE,
                email TEXT,
                data TEXT,
                hora TEXT,
                caixa TEXT,
                tecnico TEXT,
                concluido INTEGER DEFAULT 0,
                data_conclusao TEXT
            );"
        ))?;

        // Stores created before conclusion stamps existed lack the column.
        let mut stmt = self.conn.prepare(&format!("PRAGMA table_info({CASES_TABLE})"))?;
        let columns = stmt
            .query_map([], |r| r.get::<_, String>(1))?
            .collect::<Result<Vec<_>, _>>()?;
        if !columns.iter().any(|c| c == "data_conclusao") {
            logf!(path = %self.path.display(), "adding data_conclusao column");
            self.conn
                .execute_batch(&format!("ALTER TABLE {CASES_TABLE} ADD COLUMN data_conclusao TEXT;"))?;
        }

        // Rows concluded before the stamp existed get one now.
        let stamp = Local::now().naive_local().format(STAMP_FMT).to_string();
        let stamped = self.conn.execute(
            &format!("UPDATE {CASES_TABLE} SET data_conclusao = ?1 WHERE concluido = 1 AND data_conclusao IS NULL"),
            [&stamp],
        )?;
        if stamped > 0 {
            logw!(path = %self.path.display(), stamped, "concluded rows had no conclusion stamp");
        }
        Ok(())
    }

    /// `mark_concluded` with an explicit stamp.
    pub fn mark_concluded_at(&mut self, current: &HashSet<String>, at: NaiveDateTime) -> Result<usize, StoreError> {
        let stamp = at.format(STAMP_FMT).to_string();
        let tx = self.conn.transaction()?;
        let open: Vec<String> = {
            let mut stmt = tx.prepare(&format!("SELECT processo_numero FROM {CASES_TABLE} WHERE concluido = 0"))?;
            let rows = stmt.query_map([], |r| r.get::<_, String>(0))?;
            rows.collect::<Result<_, _>>()?
        };

        let mut marked = 0;
        {
            let mut update = tx.prepare_cached(&format!(
                "UPDATE {CASES_TABLE} SET concluido = 1, data_conclusao = ?2
                 WHERE processo_numero = ?1 AND concluido = 0"
            ))?;
            for number in open.iter().filter(|n| !current.contains(*n)) {
                marked += update.execute(params![number, stamp])?;
                logd!(case = %number, "concluded");
            }
        }
        tx.commit()?;
        Ok(marked)
    }

    pub fn get(&self, case_number: &str) -> Result<Option<CaseRecord>, StoreError> {
        let sql = format!("{SELECT_RECORD} WHERE processo_numero = ?1");
        Ok(self.conn.query_row(&sql, [case_number], record_from_row).optional()?)
    }

    /// Every record, in insertion order.
    pub fn all(&self) -> Result<Vec<CaseRecord>, StoreError> {
        let mut stmt = self.conn.prepare(&format!("{SELECT_RECORD} ORDER BY id"))?;
        let rows = stmt.query_map([], record_from_row)?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    pub fn count(&self) -> Result<usize, StoreError> {
        let n: i64 = self.conn.query_row(&format!("SELECT COUNT(*) FROM {CASES_TABLE}"), [], |r| r.get(0))?;
        Ok(n as usize)
    }
}

impl CaseLedger for CaseStore {
    fn upsert(&mut self, records: &[CaseRecord]) -> Result<usize, StoreError> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(&format!(
                "INSERT INTO {CASES_TABLE} (processo_numero, email, data, hora, caixa, tecnico)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(processo_numero) DO UPDATE SET
                    email = excluded.email,
                    data = excluded.data,
                    hora = excluded.hora,
                    caixa = excluded.caixa,
                    tecnico = excluded.tecnico"
            ))?;
            for r in records {
                stmt.execute(params![
                    r.case_number,
                    r.assignee_email,
                    r.captured_date.format(DATE_FMT).to_string(),
                    r.captured_time.format(TIME_FMT).to_string(),
                    r.box_name,
                    r.technician,
                ])?;
            }
        }
        tx.commit()?;
        Ok(records.len())
    }

    fn mark_concluded(&mut self, current: &HashSet<String>) -> Result<usize, StoreError> {
        self.mark_concluded_at(current, Local::now().naive_local())
    }
}

const SELECT_RECORD: &str = "SELECT processo_numero, email, tecnico, caixa, data, hora, concluido, data_conclusao FROM processos";

fn parse_col<T, E>(idx: usize, raw: &str, parse: impl FnOnce(&str) -> Result<T, E>) -> rusqlite::Result<T>
where
    E: std::error::Error + Send + Sync + 'static,
{
    parse(raw).map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn record_from_row(r: &Row<'_>) -> rusqlite::Result<CaseRecord> {
    let date: String = r.get(4)?;
    let time: String = r.get(5)?;
    let concluded_at: Option<String> = r.get(7)?;
    Ok(CaseRecord {
        case_number: r.get(0)?,
        assignee_email: r.get::<_, Option<String>>(1)?.unwrap_or_default(),
        technician: r.get::<_, Option<String>>(2)?.unwrap_or_default(),
        box_name: r.get::<_, Option<String>>(3)?.unwrap_or_default(),
        captured_date: parse_col(4, &date, |s| NaiveDate::parse_from_str(s, DATE_FMT))?,
        captured_time: parse_col(5, &time, |s| NaiveTime::parse_from_str(s, TIME_FMT))?,
        concluded: r.get::<_, i64>(6)? != 0,
        concluded_at: concluded_at
            .map(|s| parse_col(7, &s, |s| NaiveDateTime::parse_from_str(s, STAMP_FMT)))
            .transpose()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, STAMP_FMT).unwrap()
    }

    #[test]
    fn sighting_drops_subseconds() {
        let t = at("2024-05-02 09:30:15") + chrono::Duration::milliseconds(640);
        let r = CaseRecord::sighted("1", "a@x.org", "BOX", t);
        assert_eq!(r.captured_time.to_string(), "09:30:15");
        assert_eq!(r.technician, "a@x.org");
    }

    #[test]
    fn legacy_table_gains_conclusion_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legacy.db");
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch(
                "CREATE TABLE processos (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    processo_numero TEXT UNIQUE, email TEXT, data TEXT, hora TEXT,
                    caixa TEXT, tecnico TEXT, concluido INTEGER DEFAULT 0);
                 INSERT INTO processos (processo_numero, email, data, hora, caixa, tecnico)
                 VALUES ('9', 'z@x.org', '2024-01-02', '08:00:00', 'BOX', 'z@x.org');
                 INSERT INTO processos (processo_numero, email, data, hora, caixa, tecnico, concluido)
                 VALUES ('8', 'z@x.org', '2024-01-01', '08:00:00', 'BOX', 'z@x.org', 1);",
            )
            .unwrap();
        }
        let mut store = CaseStore::open_at(&path).unwrap();
        let r = store.get("9").unwrap().unwrap();
        assert!(!r.concluded);
        assert_eq!(r.concluded_at, None);

        let old = store.get("8").unwrap().unwrap();
        assert!(old.concluded);
        let stamped = old.concluded_at.expect("legacy concluded row is stamped on open");

        // A later pass neither re-stamps it nor touches the open row it saw.
        let seen: HashSet<String> = [s!("9")].into_iter().collect();
        assert_eq!(store.mark_concluded(&seen).unwrap(), 0);
        assert_eq!(store.get("8").unwrap().unwrap().concluded_at, Some(stamped));
    }

    #[test]
    fn box_names_map_to_nested_db_files() {
        let p = store_path(Path::new("Bases"), "MGI-SGP-DECIPEX-CGPAG-ANIST");
        assert_eq!(p, Path::new("Bases/MGI-SGP-DECIPEX-CGPAG-ANIST/MGI-SGP-DECIPEX-CGPAG-ANIST.db"));
    }
}

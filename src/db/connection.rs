use std::fs;

use rusqlite::Connection;
use tracing::{debug, info};

use crate::config::{Config, DeletePolicy};
use crate::error::{RecordError, RecordResult};

/// Tables and indexes. Every statement is `IF NOT EXISTS` so running the batch
/// on every startup (or twice in a row) leaves the schema unchanged.
///
/// Loan references are checked by the store rather than by SQLite, so the
/// delete policy decides what happens to loans whose customer or staff member
/// goes away.
const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS customers (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        income_proof TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS staff (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        role TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS loans (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        amount REAL NOT NULL,
        interest_rate REAL NOT NULL,
        loan_type TEXT NOT NULL,
        customer_id INTEGER NOT NULL REFERENCES customers(id),
        staff_id INTEGER REFERENCES staff(id)
    );

    CREATE INDEX IF NOT EXISTS idx_loans_customer ON loans(customer_id);
    CREATE INDEX IF NOT EXISTS idx_loans_staff ON loans(staff_id);
";

/// Create the tables if they are missing. Safe to call any number of times.
///
/// Also turns `foreign_keys` off: the bundled SQLite enforces them by default,
/// which would block orphaning deletes.
pub fn init_schema(conn: &Connection) -> RecordResult<()> {
    conn.pragma_update(None, "foreign_keys", false)?;
    conn.execute_batch(SCHEMA)?;
    debug!("schema initialized");
    Ok(())
}

/// Live connection plus the policy the delete helpers consult.
pub struct Store {
    conn: Connection,
    delete_policy: DeletePolicy,
}

impl Store {
    /// Ensure the database file exists, apply the busy timeout, and run the
    /// schema batch. Any failure here is reported as `Unavailable`.
    pub fn open(config: &Config) -> RecordResult<Self> {
        let path = &config.database_path;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| {
                RecordError::unavailable(format!(
                    "failed to create data directory {}: {err}",
                    parent.display()
                ))
            })?;
        }

        let conn = Connection::open(path).map_err(|err| {
            RecordError::unavailable(format!("failed to open {}: {err}", path.display()))
        })?;
        conn.busy_timeout(config.busy_timeout)?;
        init_schema(&conn)?;

        info!(path = %path.display(), policy = ?config.delete_policy, "store opened");
        Ok(Self {
            conn,
            delete_policy: config.delete_policy,
        })
    }

    /// Private in-memory database, used by tests.
    pub fn open_in_memory() -> RecordResult<Self> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(Self {
            conn,
            delete_policy: DeletePolicy::default(),
        })
    }

    pub fn with_delete_policy(mut self, policy: DeletePolicy) -> Self {
        self.delete_policy = policy;
        self
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn delete_policy(&self) -> DeletePolicy {
        self.delete_policy
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::db::create_customer;
    use crate::models::CustomerDraft;

    fn table_names(conn: &Connection) -> Vec<String> {
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name")
            .unwrap();
        let names = stmt
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<String>, _>>()
            .unwrap();
        names
    }

    #[test]
    fn schema_init_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        let once = table_names(&conn);
        init_schema(&conn).unwrap();
        assert_eq!(table_names(&conn), once);
        assert_eq!(once, vec!["customers", "loans", "staff"]);

        let enforced: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(enforced, 0);
    }

    #[test]
    fn open_creates_missing_directories_and_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::with_data_dir(dir.path());
        config.database_path = dir.path().join("nested").join("loans.sqlite");
        config.busy_timeout = Duration::from_millis(100);

        {
            let store = Store::open(&config).unwrap();
            store
                .conn()
                .execute(
                    "INSERT INTO customers (name, income_proof) VALUES ('Ada', 'payslip')",
                    [],
                )
                .unwrap();
        }

        let store = Store::open(&config).unwrap();
        let count: i64 = store
            .conn()
            .query_row("SELECT COUNT(*) FROM customers", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn unopenable_path_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "plain file").unwrap();
        let mut config = Config::with_data_dir(dir.path());
        config.database_path = blocker.join("loans.sqlite");
        assert!(matches!(
            Store::open(&config),
            Err(RecordError::Unavailable { .. })
        ));
    }

    #[test]
    fn write_blocked_by_another_connection_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::with_data_dir(dir.path());
        config.database_path = dir.path().join("loans.sqlite");
        config.busy_timeout = Duration::from_millis(50);
        let store = Store::open(&config).unwrap();

        let other = Connection::open(&config.database_path).unwrap();
        other.execute_batch("BEGIN IMMEDIATE;").unwrap();

        let draft = CustomerDraft {
            name: "Ada".to_string(),
            income_proof: "payslip".to_string(),
        };
        assert!(matches!(
            create_customer(store.conn(), &draft),
            Err(RecordError::Unavailable { .. })
        ));

        other.execute_batch("ROLLBACK;").unwrap();
        assert!(create_customer(store.conn(), &draft).is_ok());
    }
}


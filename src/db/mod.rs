//! Persistence module split across logical submodules, one per table.

mod connection;
mod customers;
mod loans;
mod staff;

use rusqlite::{params, Connection};

use crate::error::RecordResult;

pub use connection::{init_schema, Store};
pub use customers::{
    create_customer, delete_customer, fetch_customer, fetch_customers, update_customer,
};
pub use loans::{create_loan, delete_loan, fetch_loan, fetch_loans, update_loan};
pub use staff::{create_staff, delete_staff, fetch_staff, fetch_staff_member, update_staff};

/// True when `table` has a row with the given id.
fn row_exists(conn: &Connection, table: &str, id: i64) -> RecordResult<bool> {
    let exists = conn.query_row(
        &format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = ?1)"),
        params![id],
        |row| row.get(0),
    )?;
    Ok(exists)
}

/// Number of loans whose `column` (`customer_id` or `staff_id`) equals `id`.
fn loans_referencing(conn: &Connection, column: &str, id: i64) -> RecordResult<i64> {
    let count = conn.query_row(
        &format!("SELECT COUNT(*) FROM loans WHERE {column} = ?1"),
        params![id],
        |row| row.get(0),
    )?;
    Ok(count)
}

use rusqlite::{params, Connection, OptionalExtension, Params, Row};
use tracing::{info, warn};

use crate::error::{RecordError, RecordResult};
use crate::models::{Loan, LoanDraft, RecordKind};
use crate::search::Filter;

use super::row_exists;

const LOAN_COLUMNS: &str = "id, amount, interest_rate, loan_type, customer_id, staff_id";

fn loan_from_row(row: &Row<'_>) -> rusqlite::Result<Loan> {
    Ok(Loan {
        id: row.get(0)?,
        amount: row.get(1)?,
        interest_rate: row.get(2)?,
        loan_type: row.get(3)?,
        customer_id: row.get(4)?,
        staff_id: row.get(5)?,
    })
}

fn query_loans<P: Params>(conn: &Connection, clause: &str, params: P) -> RecordResult<Vec<Loan>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {LOAN_COLUMNS} FROM loans {clause} ORDER BY id"
    ))?;
    let loans = stmt
        .query_map(params, loan_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(loans)
}

/// Loans matching `filter`, in insertion order. A numeric term matches either
/// the loan id or the owning customer id.
pub fn fetch_loans(conn: &Connection, filter: &Filter) -> RecordResult<Vec<Loan>> {
    match filter {
        Filter::Id(id) => query_loans(conn, "WHERE id = ?1 OR customer_id = ?1", params![*id]),
        _ => Ok(filter.apply(query_loans(conn, "", [])?)),
    }
}

pub fn fetch_loan(conn: &Connection, id: i64) -> RecordResult<Option<Loan>> {
    let loan = conn
        .query_row(
            &format!("SELECT {LOAN_COLUMNS} FROM loans WHERE id = ?1"),
            params![id],
            loan_from_row,
        )
        .optional()?;
    Ok(loan)
}

/// Refuse drafts that point at a customer or staff member that does not exist.
fn check_references(conn: &Connection, draft: &LoanDraft) -> RecordResult<()> {
    if !row_exists(conn, "customers", draft.customer_id)? {
        warn!(customer_id = draft.customer_id, "loan references missing customer");
        return Err(RecordError::integrity(format!(
            "Customer {} does not exist.",
            draft.customer_id
        )));
    }
    if let Some(staff_id) = draft.staff_id {
        if !row_exists(conn, "staff", staff_id)? {
            warn!(staff_id, "loan references missing staff member");
            return Err(RecordError::integrity(format!(
                "Staff {staff_id} does not exist."
            )));
        }
    }
    Ok(())
}

/// Check references and insert in one transaction.
pub fn create_loan(conn: &Connection, draft: &LoanDraft) -> RecordResult<Loan> {
    let tx = conn.unchecked_transaction()?;
    check_references(&tx, draft)?;

    tx.execute(
        "INSERT INTO loans (amount, interest_rate, loan_type, customer_id, staff_id)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            draft.amount,
            draft.interest_rate,
            draft.loan_type,
            draft.customer_id,
            draft.staff_id
        ],
    )?;
    let id = tx.last_insert_rowid();
    tx.commit()?;

    info!(id, customer_id = draft.customer_id, "loan created");
    Ok(Loan::from_draft(id, draft.clone()))
}

/// Replace every mutable field of a loan. A missing loan wins over a bad
/// reference: the caller learns the row is gone before anything else.
pub fn update_loan(conn: &Connection, id: i64, draft: &LoanDraft) -> RecordResult<()> {
    let tx = conn.unchecked_transaction()?;

    if !row_exists(&tx, "loans", id)? {
        return Err(RecordError::not_found(RecordKind::Loan, id));
    }
    check_references(&tx, draft)?;

    tx.execute(
        "UPDATE loans
         SET amount = ?1, interest_rate = ?2, loan_type = ?3, customer_id = ?4, staff_id = ?5
         WHERE id = ?6",
        params![
            draft.amount,
            draft.interest_rate,
            draft.loan_type,
            draft.customer_id,
            draft.staff_id,
            id
        ],
    )?;
    tx.commit()?;

    info!(id, "loan updated");
    Ok(())
}

pub fn delete_loan(conn: &Connection, id: i64) -> RecordResult<()> {
    let deleted = conn.execute("DELETE FROM loans WHERE id = ?1", params![id])?;

    if deleted == 0 {
        return Err(RecordError::not_found(RecordKind::Loan, id));
    }
    info!(id, "loan deleted");
    Ok(())
}

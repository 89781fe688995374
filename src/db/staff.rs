use rusqlite::{params, Connection, OptionalExtension, Params, Row};
use tracing::info;

use crate::config::DeletePolicy;
use crate::error::{RecordError, RecordResult};
use crate::models::{RecordKind, Staff, StaffDraft};
use crate::search::Filter;

use super::{loans_referencing, row_exists};

fn staff_from_row(row: &Row<'_>) -> rusqlite::Result<Staff> {
    Ok(Staff {
        id: row.get(0)?,
        name: row.get(1)?,
        role: row.get(2)?,
    })
}

fn query_staff<P: Params>(conn: &Connection, clause: &str, params: P) -> RecordResult<Vec<Staff>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT id, name, role FROM staff {clause} ORDER BY id"
    ))?;
    let staff = stmt
        .query_map(params, staff_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(staff)
}

/// Staff members matching `filter`, in insertion order.
pub fn fetch_staff(conn: &Connection, filter: &Filter) -> RecordResult<Vec<Staff>> {
    match filter {
        Filter::Id(id) => query_staff(conn, "WHERE id = ?1", params![*id]),
        _ => Ok(filter.apply(query_staff(conn, "", [])?)),
    }
}

pub fn fetch_staff_member(conn: &Connection, id: i64) -> RecordResult<Option<Staff>> {
    let member = conn
        .query_row(
            "SELECT id, name, role FROM staff WHERE id = ?1",
            params![id],
            staff_from_row,
        )
        .optional()?;
    Ok(member)
}

pub fn create_staff(conn: &Connection, draft: &StaffDraft) -> RecordResult<Staff> {
    conn.execute(
        "INSERT INTO staff (name, role) VALUES (?1, ?2)",
        params![draft.name, draft.role],
    )?;

    let id = conn.last_insert_rowid();
    info!(id, "staff member created");
    Ok(Staff::from_draft(id, draft.clone()))
}

pub fn update_staff(conn: &Connection, id: i64, draft: &StaffDraft) -> RecordResult<()> {
    let updated = conn.execute(
        "UPDATE staff SET name = ?1, role = ?2 WHERE id = ?3",
        params![draft.name, draft.role, id],
    )?;

    if updated == 0 {
        return Err(RecordError::not_found(RecordKind::Staff, id));
    }
    info!(id, "staff member updated");
    Ok(())
}

/// Remove a staff member. Loans they handled keep the stale `staff_id` unless
/// the restrict policy is active.
pub fn delete_staff(conn: &Connection, id: i64, policy: DeletePolicy) -> RecordResult<()> {
    let tx = conn.unchecked_transaction()?;

    if !row_exists(&tx, "staff", id)? {
        return Err(RecordError::not_found(RecordKind::Staff, id));
    }

    let dependents = loans_referencing(&tx, "staff_id", id)?;
    if dependents > 0 && policy == DeletePolicy::Restrict {
        return Err(RecordError::integrity(format!(
            "Staff {id} is still assigned to {dependents} loan(s)."
        )));
    }

    tx.execute("DELETE FROM staff WHERE id = ?1", params![id])?;
    tx.commit()?;
    info!(id, dependents, "staff member deleted");
    Ok(())
}

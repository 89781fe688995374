use rusqlite::{params, Connection, OptionalExtension, Params, Row};
use tracing::info;

use crate::config::DeletePolicy;
use crate::error::{RecordError, RecordResult};
use crate::models::{Customer, CustomerDraft, RecordKind};
use crate::search::Filter;

use super::{loans_referencing, row_exists};

fn customer_from_row(row: &Row<'_>) -> rusqlite::Result<Customer> {
    Ok(Customer {
        id: row.get(0)?,
        name: row.get(1)?,
        income_proof: row.get(2)?,
    })
}

fn query_customers<P: Params>(conn: &Connection, clause: &str, params: P) -> RecordResult<Vec<Customer>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT id, name, income_proof FROM customers {clause} ORDER BY id"
    ))?;
    let customers = stmt
        .query_map(params, customer_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(customers)
}

/// Customers matching `filter`, in insertion order. Id lookups run in SQL;
/// text filters are applied in memory so case folding follows Rust's Unicode
/// rules rather than SQLite's ASCII-only `LOWER`.
pub fn fetch_customers(conn: &Connection, filter: &Filter) -> RecordResult<Vec<Customer>> {
    match filter {
        Filter::Id(id) => query_customers(conn, "WHERE id = ?1", params![*id]),
        _ => Ok(filter.apply(query_customers(conn, "", [])?)),
    }
}

pub fn fetch_customer(conn: &Connection, id: i64) -> RecordResult<Option<Customer>> {
    let customer = conn
        .query_row(
            "SELECT id, name, income_proof FROM customers WHERE id = ?1",
            params![id],
            customer_from_row,
        )
        .optional()?;
    Ok(customer)
}

/// Insert a new customer, returning the hydrated struct so the caller can
/// push it straight into the in-memory list.
pub fn create_customer(conn: &Connection, draft: &CustomerDraft) -> RecordResult<Customer> {
    conn.execute(
        "INSERT INTO customers (name, income_proof) VALUES (?1, ?2)",
        params![draft.name, draft.income_proof],
    )?;

    let id = conn.last_insert_rowid();
    info!(id, "customer created");
    Ok(Customer::from_draft(id, draft.clone()))
}

/// Replace every mutable field of an existing customer.
pub fn update_customer(conn: &Connection, id: i64, draft: &CustomerDraft) -> RecordResult<()> {
    let updated = conn.execute(
        "UPDATE customers SET name = ?1, income_proof = ?2 WHERE id = ?3",
        params![draft.name, draft.income_proof, id],
    )?;

    if updated == 0 {
        return Err(RecordError::not_found(RecordKind::Customer, id));
    }
    info!(id, "customer updated");
    Ok(())
}

/// Remove a customer. Loans owned by the customer are left in place; under
/// `DeletePolicy::Restrict` the delete is refused while any exist.
pub fn delete_customer(conn: &Connection, id: i64, policy: DeletePolicy) -> RecordResult<()> {
    let tx = conn.unchecked_transaction()?;

    if !row_exists(&tx, "customers", id)? {
        return Err(RecordError::not_found(RecordKind::Customer, id));
    }

    let dependents = loans_referencing(&tx, "customer_id", id)?;
    if dependents > 0 && policy == DeletePolicy::Restrict {
        return Err(RecordError::integrity(format!(
            "Customer {id} still has {dependents} loan(s)."
        )));
    }

    tx.execute("DELETE FROM customers WHERE id = ?1", params![id])?;
    tx.commit()?;

    if dependents > 0 {
        info!(id, dependents, "customer deleted, loans left dangling");
    } else {
        info!(id, "customer deleted");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    fn draft(name: &str) -> CustomerDraft {
        CustomerDraft {
            name: name.to_string(),
            income_proof: "payslip".to_string(),
        }
    }

    fn seed_with_ids(conn: &Connection, rows: &[(i64, &str)]) {
        for (id, name) in rows {
            conn.execute(
                "INSERT INTO customers (id, name, income_proof) VALUES (?1, ?2, 'payslip')",
                params![id, name],
            )
            .unwrap();
        }
    }

    #[test]
    fn create_then_read_returns_the_same_record() {
        let conn = setup();
        let created = create_customer(&conn, &draft("Ada")).unwrap();

        let found = fetch_customers(&conn, &Filter::Id(created.id)).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0], Customer::from_draft(created.id, draft("Ada")));
    }

    #[test]
    fn ids_increase_and_are_not_reused() {
        let conn = setup();
        let first = create_customer(&conn, &draft("Ada")).unwrap();
        let second = create_customer(&conn, &draft("Ben")).unwrap();
        assert!(second.id > first.id);

        delete_customer(&conn, second.id, DeletePolicy::Orphan).unwrap();
        let third = create_customer(&conn, &draft("Cy")).unwrap();
        assert!(third.id > second.id);
    }

    #[test]
    fn search_terms_follow_id_and_text_rules() {
        let conn = setup();
        seed_with_ids(&conn, &[(1, "Alice"), (2, "Bob"), (42, "Carol")]);

        let by_id = fetch_customers(&conn, &Filter::parse("42")).unwrap();
        assert_eq!(by_id.iter().map(|c| c.id).collect::<Vec<_>>(), vec![42]);

        let by_text = fetch_customers(&conn, &Filter::parse("ali")).unwrap();
        assert_eq!(by_text.iter().map(|c| c.id).collect::<Vec<_>>(), vec![1]);

        let all = fetch_customers(&conn, &Filter::parse("")).unwrap();
        assert_eq!(all.iter().map(|c| c.id).collect::<Vec<_>>(), vec![1, 2, 42]);
    }

    #[test]
    fn update_replaces_fields() {
        let conn = setup();
        let created = create_customer(&conn, &draft("Ada")).unwrap();
        let replacement = CustomerDraft {
            name: "Ada Lovelace".to_string(),
            income_proof: "bank statement".to_string(),
        };
        update_customer(&conn, created.id, &replacement).unwrap();

        let stored = fetch_customer(&conn, created.id).unwrap().unwrap();
        assert_eq!(stored, Customer::from_draft(created.id, replacement));
    }

    #[test]
    fn deleted_customer_is_gone_and_further_writes_fail() {
        let conn = setup();
        let created = create_customer(&conn, &draft("Ada")).unwrap();
        delete_customer(&conn, created.id, DeletePolicy::Orphan).unwrap();

        assert!(fetch_customers(&conn, &Filter::Id(created.id)).unwrap().is_empty());
        assert!(matches!(
            update_customer(&conn, created.id, &draft("Ghost")),
            Err(RecordError::NotFound { kind: RecordKind::Customer, .. })
        ));
        assert!(matches!(
            delete_customer(&conn, created.id, DeletePolicy::Orphan),
            Err(RecordError::NotFound { .. })
        ));
    }

    #[test]
    fn restrict_policy_blocks_delete_with_loans() {
        let conn = setup();
        let created = create_customer(&conn, &draft("Ada")).unwrap();
        conn.execute(
            "INSERT INTO loans (amount, interest_rate, loan_type, customer_id) VALUES (100.0, 5.0, 'Home', ?1)",
            params![created.id],
        )
        .unwrap();

        assert!(matches!(
            delete_customer(&conn, created.id, DeletePolicy::Restrict),
            Err(RecordError::Integrity { .. })
        ));
        assert!(fetch_customer(&conn, created.id).unwrap().is_some());

        delete_customer(&conn, created.id, DeletePolicy::Orphan).unwrap();
        assert!(fetch_customer(&conn, created.id).unwrap().is_none());
    }
}

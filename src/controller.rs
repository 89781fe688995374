//! Form controller: validates raw field text, then hands typed drafts to the
//! store. Validation always finishes before the first store call, so a
//! rejected form never leaves a partial write behind.

use tracing::{debug, warn};

use crate::db::{
    create_customer, create_loan, create_staff, delete_customer, delete_loan, delete_staff,
    fetch_customers, fetch_loans, fetch_staff, update_customer, update_loan, update_staff, Store,
};
use crate::error::{RecordError, RecordResult};
use crate::models::{
    Customer, CustomerDraft, Loan, LoanDraft, RecordKind, Staff, StaffDraft,
};
use crate::search::Filter;

/// Raw text from the customer form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomerInput {
    pub name: String,
    pub income_proof: String,
}

/// Raw text from the loan form. A blank `staff_id` means "unassigned".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoanInput {
    pub amount: String,
    pub interest_rate: String,
    pub loan_type: String,
    pub customer_id: String,
    pub staff_id: String,
}

/// Raw text from the staff form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaffInput {
    pub name: String,
    pub role: String,
}

/// What the view looks like when the action fires: the highlighted record
/// (required by update and delete) and the active search term used to
/// refresh the list afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub selected: Option<i64>,
    pub search: String,
}

impl ViewState {
    pub fn new(selected: Option<i64>, search: impl Into<String>) -> Self {
        Self {
            selected,
            search: search.into(),
        }
    }

    fn require_selection(&self, kind: RecordKind) -> RecordResult<i64> {
        self.selected.ok_or_else(|| {
            RecordError::validation(format!("Select a {} first.", kind.to_string().to_lowercase()))
        })
    }
}

/// Successful action: a message for the status line, the record it touched,
/// and the kind's list re-read through the view's search term.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<T> {
    pub message: String,
    pub affected: Option<i64>,
    pub records: Vec<T>,
}

fn required(value: &str, label: &str) -> RecordResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RecordError::validation(format!("{label} is required.")));
    }
    Ok(trimmed.to_string())
}

fn parse_number(value: &str, label: &str) -> RecordResult<f64> {
    let number = value
        .trim()
        .parse::<f64>()
        .map_err(|_| RecordError::validation(format!("{label} must be a number.")))?;
    if !number.is_finite() {
        return Err(RecordError::validation(format!("{label} must be a finite number.")));
    }
    Ok(number)
}

fn parse_id(value: &str, label: &str) -> RecordResult<i64> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| RecordError::validation(format!("{label} must be a whole number.")))
}

pub fn validate_customer(name: &str, income_proof: &str) -> RecordResult<CustomerDraft> {
    Ok(CustomerDraft {
        name: required(name, "Customer name")?,
        income_proof: required(income_proof, "Income proof")?,
    })
}

/// Parse the loan form. Amount must be positive and the rate must not be
/// negative; both must be finite.
pub fn validate_loan(
    amount: &str,
    interest_rate: &str,
    loan_type: &str,
    customer_id: &str,
    staff_id: &str,
) -> RecordResult<LoanDraft> {
    let amount = parse_number(amount, "Amount")?;
    if amount <= 0.0 {
        return Err(RecordError::validation("Amount must be greater than zero."));
    }
    let interest_rate = parse_number(interest_rate, "Interest rate")?;
    if interest_rate < 0.0 {
        return Err(RecordError::validation("Interest rate cannot be negative."));
    }
    let loan_type = required(loan_type, "Loan type")?;
    let customer_id = parse_id(customer_id, "Customer ID")?;
    let staff_id = if staff_id.trim().is_empty() {
        None
    } else {
        Some(parse_id(staff_id, "Staff ID")?)
    };

    Ok(LoanDraft {
        amount,
        interest_rate,
        loan_type,
        customer_id,
        staff_id,
    })
}

pub fn validate_staff(name: &str, role: &str) -> RecordResult<StaffDraft> {
    Ok(StaffDraft {
        name: required(name, "Staff name")?,
        role: required(role, "Role")?,
    })
}

/// The controller object the UI talks to. Owns the store for the lifetime of
/// the session.
pub struct Desk {
    store: Store,
}

impl Desk {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    fn outcome<T>(
        message: String,
        affected: Option<i64>,
        records: Vec<T>,
    ) -> RecordResult<Outcome<T>> {
        debug!(%message, count = records.len(), "action completed");
        Ok(Outcome {
            message,
            affected,
            records,
        })
    }

    // Customers

    pub fn search_customers(&self, term: &str) -> RecordResult<Vec<Customer>> {
        fetch_customers(self.store.conn(), &Filter::parse(term))
    }

    pub fn add_customer(
        &self,
        input: &CustomerInput,
        view: &ViewState,
    ) -> RecordResult<Outcome<Customer>> {
        let draft = validate_customer(&input.name, &input.income_proof)?;
        let customer = create_customer(self.store.conn(), &draft)?;
        Self::outcome(
            format!("Added customer #{} {}.", customer.id, customer.name),
            Some(customer.id),
            self.search_customers(&view.search)?,
        )
    }

    pub fn update_customer(
        &self,
        input: &CustomerInput,
        view: &ViewState,
    ) -> RecordResult<Outcome<Customer>> {
        let id = view.require_selection(RecordKind::Customer)?;
        let draft = validate_customer(&input.name, &input.income_proof)?;
        update_customer(self.store.conn(), id, &draft)?;
        Self::outcome(
            format!("Updated customer #{id}."),
            Some(id),
            self.search_customers(&view.search)?,
        )
    }

    pub fn delete_customer(&self, view: &ViewState) -> RecordResult<Outcome<Customer>> {
        let id = view.require_selection(RecordKind::Customer)?;
        delete_customer(self.store.conn(), id, self.store.delete_policy())?;
        Self::outcome(
            format!("Deleted customer #{id}."),
            None,
            self.search_customers(&view.search)?,
        )
    }

    // Loans

    pub fn search_loans(&self, term: &str) -> RecordResult<Vec<Loan>> {
        fetch_loans(self.store.conn(), &Filter::parse(term))
    }

    fn loan_draft(input: &LoanInput) -> RecordResult<LoanDraft> {
        validate_loan(
            &input.amount,
            &input.interest_rate,
            &input.loan_type,
            &input.customer_id,
            &input.staff_id,
        )
    }

    pub fn add_loan(&self, input: &LoanInput, view: &ViewState) -> RecordResult<Outcome<Loan>> {
        let draft = Self::loan_draft(input)?;
        let loan = create_loan(self.store.conn(), &draft).inspect_err(|err| {
            warn!(error = %err, "loan create rejected");
        })?;
        Self::outcome(
            format!("Added loan #{} for customer #{}.", loan.id, loan.customer_id),
            Some(loan.id),
            self.search_loans(&view.search)?,
        )
    }

    pub fn update_loan(&self, input: &LoanInput, view: &ViewState) -> RecordResult<Outcome<Loan>> {
        let id = view.require_selection(RecordKind::Loan)?;
        let draft = Self::loan_draft(input)?;
        update_loan(self.store.conn(), id, &draft)?;
        Self::outcome(
            format!("Updated loan #{id}."),
            Some(id),
            self.search_loans(&view.search)?,
        )
    }

    pub fn delete_loan(&self, view: &ViewState) -> RecordResult<Outcome<Loan>> {
        let id = view.require_selection(RecordKind::Loan)?;
        delete_loan(self.store.conn(), id)?;
        Self::outcome(
            format!("Deleted loan #{id}."),
            None,
            self.search_loans(&view.search)?,
        )
    }

    // Staff

    pub fn search_staff(&self, term: &str) -> RecordResult<Vec<Staff>> {
        fetch_staff(self.store.conn(), &Filter::parse(term))
    }

    pub fn add_staff(&self, input: &StaffInput, view: &ViewState) -> RecordResult<Outcome<Staff>> {
        let draft = validate_staff(&input.name, &input.role)?;
        let member = create_staff(self.store.conn(), &draft)?;
        Self::outcome(
            format!("Added staff #{} {}.", member.id, member.name),
            Some(member.id),
            self.search_staff(&view.search)?,
        )
    }

    pub fn update_staff(
        &self,
        input: &StaffInput,
        view: &ViewState,
    ) -> RecordResult<Outcome<Staff>> {
        let id = view.require_selection(RecordKind::Staff)?;
        let draft = validate_staff(&input.name, &input.role)?;
        update_staff(self.store.conn(), id, &draft)?;
        Self::outcome(
            format!("Updated staff #{id}."),
            Some(id),
            self.search_staff(&view.search)?,
        )
    }

    pub fn delete_staff(&self, view: &ViewState) -> RecordResult<Outcome<Staff>> {
        let id = view.require_selection(RecordKind::Staff)?;
        delete_staff(self.store.conn(), id, self.store.delete_policy())?;
        Self::outcome(
            format!("Deleted staff #{id}."),
            None,
            self.search_staff(&view.search)?,
        )
    }
}

//! Domain models that mirror the SQLite schema and get passed throughout the
//! TUI. Records carry their store-assigned id; drafts are the validated,
//! id-less shape handed to the store on create and update.

use std::fmt;

/// The three kinds of record the desk manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Customer,
    Loan,
    Staff,
}

impl RecordKind {
    pub const ALL: [RecordKind; 3] = [RecordKind::Customer, RecordKind::Loan, RecordKind::Staff];

    /// Plural label used for tab titles.
    pub fn plural(self) -> &'static str {
        match self {
            RecordKind::Customer => "Customers",
            RecordKind::Loan => "Loans",
            RecordKind::Staff => "Staff",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordKind::Customer => "Customer",
            RecordKind::Loan => "Loan",
            RecordKind::Staff => "Staff",
        };
        f.write_str(name)
    }
}

/// A borrower. `income_proof` holds whatever document reference or contact
/// detail the clerk records; it is free text.
#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    /// Primary key, immutable after creation.
    pub id: i64,
    pub name: String,
    pub income_proof: String,
}

/// A loan issued to a customer and optionally handled by a staff member.
#[derive(Debug, Clone, PartialEq)]
pub struct Loan {
    pub id: i64,
    /// Principal, always strictly positive.
    pub amount: f64,
    /// Annual interest as a percentage (`7.5` means 7.5%).
    pub interest_rate: f64,
    pub loan_type: String,
    /// Owning customer. Checked on write, but may dangle after the customer
    /// is deleted under the default delete policy.
    pub customer_id: i64,
    pub staff_id: Option<i64>,
}

/// An employee who can be assigned to loans.
#[derive(Debug, Clone, PartialEq)]
pub struct Staff {
    pub id: i64,
    pub name: String,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomerDraft {
    pub name: String,
    pub income_proof: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoanDraft {
    pub amount: f64,
    pub interest_rate: f64,
    pub loan_type: String,
    pub customer_id: i64,
    pub staff_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StaffDraft {
    pub name: String,
    pub role: String,
}

impl Customer {
    pub fn from_draft(id: i64, draft: CustomerDraft) -> Self {
        Self {
            id,
            name: draft.name,
            income_proof: draft.income_proof,
        }
    }
}

impl Loan {
    pub fn from_draft(id: i64, draft: LoanDraft) -> Self {
        Self {
            id,
            amount: draft.amount,
            interest_rate: draft.interest_rate,
            loan_type: draft.loan_type,
            customer_id: draft.customer_id,
            staff_id: draft.staff_id,
        }
    }
}

impl Staff {
    pub fn from_draft(id: i64, draft: StaffDraft) -> Self {
        Self {
            id,
            name: draft.name,
            role: draft.role,
        }
    }
}

impl fmt::Display for Customer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}", self.id, self.name)
    }
}

impl fmt::Display for Loan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {} {:.2}", self.id, self.loan_type, self.amount)
    }
}

impl fmt::Display for Staff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {} ({})", self.id, self.name, self.role)
    }
}

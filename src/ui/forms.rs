use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::controller::{CustomerInput, LoanInput, StaffInput};
use crate::models::{Customer, Loan, RecordKind, Staff};

/// Which characters a field accepts while typing. Validation still runs on
/// save; this only keeps obviously wrong keys out.
#[derive(Copy, Clone, PartialEq, Eq)]
pub(crate) enum FieldKind {
    Text,
    Decimal,
    Integer,
}

#[derive(Clone)]
pub(crate) struct FormField {
    pub(crate) label: &'static str,
    pub(crate) value: String,
    pub(crate) kind: FieldKind,
    pub(crate) optional: bool,
}

impl FormField {
    fn new(label: &'static str, kind: FieldKind) -> Self {
        Self {
            label,
            value: String::new(),
            kind,
            optional: false,
        }
    }

    fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    fn accepts(&self, ch: char) -> bool {
        match self.kind {
            FieldKind::Text => !ch.is_control(),
            FieldKind::Decimal => ch.is_ascii_digit() || ch == '.' || ch == '-',
            FieldKind::Integer => ch.is_ascii_digit(),
        }
    }
}

/// Add/edit form for any record kind. `editing` holds the id of the record
/// being edited; `None` means the form creates a new one.
#[derive(Clone)]
pub(crate) struct RecordForm {
    pub(crate) kind: RecordKind,
    pub(crate) editing: Option<i64>,
    pub(crate) fields: Vec<FormField>,
    pub(crate) active: usize,
    pub(crate) error: Option<String>,
}

impl RecordForm {
    fn with_fields(kind: RecordKind, editing: Option<i64>, fields: Vec<FormField>) -> Self {
        Self {
            kind,
            editing,
            fields,
            active: 0,
            error: None,
        }
    }

    /// Blank form for a new record of `kind`.
    pub(crate) fn blank(kind: RecordKind) -> Self {
        match kind {
            RecordKind::Customer => Self::with_fields(kind, None, customer_fields()),
            RecordKind::Loan => Self::with_fields(kind, None, loan_fields()),
            RecordKind::Staff => Self::with_fields(kind, None, staff_fields()),
        }
    }

    /// New loan pre-filled with the customer highlighted on the customer tab.
    pub(crate) fn loan_for_customer(customer_id: i64) -> Self {
        let mut form = Self::blank(RecordKind::Loan);
        form.fields[3].value = customer_id.to_string();
        form
    }

    pub(crate) fn from_customer(customer: &Customer) -> Self {
        let mut fields = customer_fields();
        fields[0].value = customer.name.clone();
        fields[1].value = customer.income_proof.clone();
        Self::with_fields(RecordKind::Customer, Some(customer.id), fields)
    }

    pub(crate) fn from_loan(loan: &Loan) -> Self {
        let staff = loan.staff_id.map(|id| id.to_string()).unwrap_or_default();
        let values = [
            loan.amount.to_string(),
            loan.interest_rate.to_string(),
            loan.loan_type.clone(),
            loan.customer_id.to_string(),
            staff,
        ];
        let fields = loan_fields()
            .into_iter()
            .zip(values)
            .map(|(field, value)| field.with_value(value))
            .collect();
        Self::with_fields(RecordKind::Loan, Some(loan.id), fields)
    }

    pub(crate) fn from_staff(member: &Staff) -> Self {
        let mut fields = staff_fields();
        fields[0].value = member.name.clone();
        fields[1].value = member.role.clone();
        Self::with_fields(RecordKind::Staff, Some(member.id), fields)
    }

    pub(crate) fn title(&self) -> String {
        match self.editing {
            Some(id) => format!("Edit {} #{id}", self.kind),
            None => format!("Add {}", self.kind),
        }
    }

    /// Move focus to the next field, wrapping around.
    pub(crate) fn next_field(&mut self) {
        self.active = (self.active + 1) % self.fields.len();
    }

    pub(crate) fn previous_field(&mut self) {
        self.active = (self.active + self.fields.len() - 1) % self.fields.len();
    }

    /// Append a character to the active field, returning whether it was kept.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        let field = &mut self.fields[self.active];
        if field.accepts(ch) {
            field.value.push(ch);
            true
        } else {
            false
        }
    }

    pub(crate) fn backspace(&mut self) {
        self.fields[self.active].value.pop();
    }

    fn value(&self, index: usize) -> String {
        self.fields[index].value.clone()
    }

    pub(crate) fn customer_input(&self) -> CustomerInput {
        CustomerInput {
            name: self.value(0),
            income_proof: self.value(1),
        }
    }

    pub(crate) fn loan_input(&self) -> LoanInput {
        LoanInput {
            amount: self.value(0),
            interest_rate: self.value(1),
            loan_type: self.value(2),
            customer_id: self.value(3),
            staff_id: self.value(4),
        }
    }

    pub(crate) fn staff_input(&self) -> StaffInput {
        StaffInput {
            name: self.value(0),
            role: self.value(1),
        }
    }

    /// Render a single line for the form widget.
    pub(crate) fn build_line(&self, index: usize) -> Line<'static> {
        let field = &self.fields[index];
        let is_active = index == self.active;

        let display = if field.value.is_empty() {
            if field.optional {
                "<optional>".to_string()
            } else {
                "<required>".to_string()
            }
        } else {
            field.value.clone()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if field.value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{}: ", field.label)),
            Span::styled(display, style),
        ])
    }

    /// Cursor column offset for the active field: label, separator, value.
    pub(crate) fn cursor_offset(&self) -> usize {
        let field = &self.fields[self.active];
        field.label.chars().count() + 2 + field.value.chars().count()
    }
}

fn customer_fields() -> Vec<FormField> {
    vec![
        FormField::new("Name", FieldKind::Text),
        FormField::new("Income proof", FieldKind::Text),
    ]
}

fn loan_fields() -> Vec<FormField> {
    vec![
        FormField::new("Amount", FieldKind::Decimal),
        FormField::new("Interest rate (%)", FieldKind::Decimal),
        FormField::new("Loan type", FieldKind::Text),
        FormField::new("Customer ID", FieldKind::Integer),
        FormField::new("Staff ID", FieldKind::Integer).optional(),
    ]
}

fn staff_fields() -> Vec<FormField> {
    vec![
        FormField::new("Name", FieldKind::Text),
        FormField::new("Role", FieldKind::Text),
    ]
}

/// Pending delete awaiting a y/n answer.
#[derive(Clone)]
pub(crate) struct ConfirmDelete {
    pub(crate) kind: RecordKind,
    pub(crate) id: i64,
    pub(crate) label: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_fields_filter_keystrokes() {
        let mut form = RecordForm::blank(RecordKind::Loan);
        assert!(form.push_char('1'));
        assert!(form.push_char('.'));
        assert!(!form.push_char('x'));
        form.active = 3;
        assert!(!form.push_char('.'));
        assert!(form.push_char('7'));

        let input = form.loan_input();
        assert_eq!(input.amount, "1.");
        assert_eq!(input.customer_id, "7");
        assert_eq!(input.staff_id, "");
    }

    #[test]
    fn edit_form_is_prefilled() {
        let loan = Loan {
            id: 4,
            amount: 1200.5,
            interest_rate: 3.0,
            loan_type: "Auto".to_string(),
            customer_id: 2,
            staff_id: Some(9),
        };
        let form = RecordForm::from_loan(&loan);
        assert_eq!(form.editing, Some(4));
        assert_eq!(
            form.loan_input(),
            LoanInput {
                amount: "1200.5".to_string(),
                interest_rate: "3".to_string(),
                loan_type: "Auto".to_string(),
                customer_id: "2".to_string(),
                staff_id: "9".to_string(),
            }
        );
        assert_eq!(form.title(), "Edit Loan #4");
    }

    #[test]
    fn focus_wraps_both_ways() {
        let mut form = RecordForm::blank(RecordKind::Customer);
        form.previous_field();
        assert_eq!(form.active, 1);
        form.next_field();
        assert_eq!(form.active, 0);
    }
}

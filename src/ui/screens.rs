use ratatui::layout::Constraint;

use crate::models::{Customer, Loan, Staff};
use crate::search::Searchable;

/// How a record kind renders as a table row.
pub(crate) trait TableRecord: Searchable + Clone {
    const HEADER: &'static [&'static str];

    fn widths() -> Vec<Constraint>;

    fn cells(&self) -> Vec<String>;

    /// Short label used in delete confirmations.
    fn label(&self) -> String;
}

impl TableRecord for Customer {
    const HEADER: &'static [&'static str] = &["ID", "Name", "Income proof"];

    fn widths() -> Vec<Constraint> {
        vec![
            Constraint::Length(6),
            Constraint::Percentage(40),
            Constraint::Percentage(60),
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![self.id.to_string(), self.name.clone(), self.income_proof.clone()]
    }

    fn label(&self) -> String {
        self.name.clone()
    }
}

impl TableRecord for Loan {
    const HEADER: &'static [&'static str] =
        &["ID", "Amount", "Rate %", "Type", "Customer", "Staff"];

    fn widths() -> Vec<Constraint> {
        vec![
            Constraint::Length(6),
            Constraint::Length(14),
            Constraint::Length(8),
            Constraint::Min(12),
            Constraint::Length(10),
            Constraint::Length(8),
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            format!("{:.2}", self.amount),
            format!("{:.2}", self.interest_rate),
            self.loan_type.clone(),
            self.customer_id.to_string(),
            self.staff_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "-".to_string()),
        ]
    }

    fn label(&self) -> String {
        format!("{} loan of {:.2}", self.loan_type, self.amount)
    }
}

impl TableRecord for Staff {
    const HEADER: &'static [&'static str] = &["ID", "Name", "Role"];

    fn widths() -> Vec<Constraint> {
        vec![
            Constraint::Length(6),
            Constraint::Percentage(50),
            Constraint::Percentage(50),
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![self.id.to_string(), self.name.clone(), self.role.clone()]
    }

    fn label(&self) -> String {
        format!("{} ({})", self.name, self.role)
    }
}

/// One tab's worth of records plus the selection and the search term that
/// produced them. Filtering happens in the store; this only holds the result.
pub(crate) struct RecordList<T> {
    pub(crate) records: Vec<T>,
    pub(crate) selected: usize,
    pub(crate) search: String,
}

impl<T: TableRecord> RecordList<T> {
    pub(crate) fn new(records: Vec<T>) -> Self {
        Self {
            records,
            selected: 0,
            search: String::new(),
        }
    }

    /// Swap in a fresh result set, keeping focus on `focus_id` when present.
    pub(crate) fn set_records(&mut self, records: Vec<T>, focus_id: Option<i64>) {
        self.records = records;
        if let Some(id) = focus_id {
            if let Some(idx) = self.records.iter().position(|r| r.id() == id) {
                self.selected = idx;
                return;
            }
        }
        self.ensure_in_bounds();
    }

    pub(crate) fn current(&self) -> Option<&T> {
        self.records.get(self.selected)
    }

    pub(crate) fn selected_id(&self) -> Option<i64> {
        self.current().map(|r| r.id())
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        if self.records.is_empty() {
            return;
        }
        let len = self.records.len() as isize;
        let new = (self.selected as isize + offset).clamp(0, len - 1);
        self.selected = new as usize;
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.records.len().saturating_sub(1);
    }

    fn ensure_in_bounds(&mut self) {
        if self.records.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.records.len() {
            self.selected = self.records.len() - 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn staff(id: i64) -> Staff {
        Staff {
            id,
            name: format!("Member {id}"),
            role: "Clerk".to_string(),
        }
    }

    #[test]
    fn selection_is_clamped() {
        let mut list = RecordList::new(vec![staff(1), staff(2), staff(3)]);
        list.move_selection(-4);
        assert_eq!(list.selected, 0);
        list.move_selection(10);
        assert_eq!(list.selected, 2);

        list.set_records(vec![staff(1)], None);
        assert_eq!(list.selected, 0);
        assert_eq!(list.selected_id(), Some(1));
    }

    #[test]
    fn refresh_follows_focused_record() {
        let mut list = RecordList::new(vec![staff(1), staff(2)]);
        list.set_records(vec![staff(1), staff(2), staff(5)], Some(5));
        assert_eq!(list.selected, 2);

        list.set_records(Vec::new(), Some(5));
        assert!(list.current().is_none());
    }

    #[test]
    fn loan_cells_show_unassigned_staff() {
        let loan = Loan {
            id: 1,
            amount: 99.5,
            interest_rate: 5.0,
            loan_type: "Home".to_string(),
            customer_id: 3,
            staff_id: None,
        };
        assert_eq!(loan.cells(), vec!["1", "99.50", "5.00", "Home", "3", "-"]);
    }
}

//! Free-text search terms resolved into record filters.
//!
//! A term is either empty (everything), a whole integer (identifier match) or
//! text (case-insensitive substring on the kind's primary text field). A
//! numeric term is never also tried as text.

use crate::models::{Customer, Loan, RecordKind, Staff};

/// Predicate over one record kind, consumed by the store's `fetch_*` reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    All,
    /// Identifier equality. Loans also match on their owning customer id.
    Id(i64),
    /// Lowercased needle for substring containment.
    Text(String),
    /// An all-digit term too large for an identifier. Matches nothing.
    Nothing,
}

impl Filter {
    pub fn parse(term: &str) -> Self {
        let trimmed = term.trim();
        if trimmed.is_empty() {
            return Filter::All;
        }
        match trimmed.parse::<i64>() {
            Ok(id) => Filter::Id(id),
            Err(_) if is_integer_literal(trimmed) => Filter::Nothing,
            Err(_) => Filter::Text(trimmed.to_lowercase()),
        }
    }

    /// Evaluate the filter against an in-memory record.
    pub fn matches<T: Searchable>(&self, record: &T) -> bool {
        match self {
            Filter::All => true,
            Filter::Id(id) => record.id() == *id || record.linked_id() == Some(*id),
            Filter::Text(needle) => record.search_text().to_lowercase().contains(needle.as_str()),
            Filter::Nothing => false,
        }
    }

    /// Keep only the records the filter accepts, preserving order.
    pub fn apply<T: Searchable>(&self, records: Vec<T>) -> Vec<T> {
        match self {
            Filter::All => records,
            Filter::Nothing => Vec::new(),
            _ => records.into_iter().filter(|r| self.matches(r)).collect(),
        }
    }
}

/// Optional sign followed by one or more ASCII digits.
fn is_integer_literal(term: &str) -> bool {
    let digits = term.strip_prefix(['+', '-']).unwrap_or(term);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Fields a record exposes to the search engine.
pub trait Searchable {
    const KIND: RecordKind;

    fn id(&self) -> i64;

    /// Primary text field for substring search.
    fn search_text(&self) -> &str;

    /// Secondary identifier also accepted by numeric terms.
    fn linked_id(&self) -> Option<i64> {
        None
    }
}

impl Searchable for Customer {
    const KIND: RecordKind = RecordKind::Customer;

    fn id(&self) -> i64 {
        self.id
    }

    fn search_text(&self) -> &str {
        &self.name
    }
}

impl Searchable for Loan {
    const KIND: RecordKind = RecordKind::Loan;

    fn id(&self) -> i64 {
        self.id
    }

    fn search_text(&self) -> &str {
        &self.loan_type
    }

    fn linked_id(&self) -> Option<i64> {
        Some(self.customer_id)
    }
}

impl Searchable for Staff {
    const KIND: RecordKind = RecordKind::Staff;

    fn id(&self) -> i64 {
        self.id
    }

    fn search_text(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer(id: i64, name: &str) -> Customer {
        Customer {
            id,
            name: name.to_string(),
            income_proof: "payslip".to_string(),
        }
    }

    fn loan(id: i64, loan_type: &str, customer_id: i64) -> Loan {
        Loan {
            id,
            amount: 1000.0,
            interest_rate: 5.0,
            loan_type: loan_type.to_string(),
            customer_id,
            staff_id: None,
        }
    }

    #[test]
    fn blank_terms_match_everything() {
        assert_eq!(Filter::parse(""), Filter::All);
        assert_eq!(Filter::parse("   \t"), Filter::All);
    }

    #[test]
    fn whole_integers_become_id_filters() {
        assert_eq!(Filter::parse("42"), Filter::Id(42));
        assert_eq!(Filter::parse(" 7 "), Filter::Id(7));
        assert_eq!(Filter::parse("42a"), Filter::Text("42a".to_string()));
    }

    #[test]
    fn oversized_numbers_stay_numeric_and_match_nothing() {
        assert_eq!(Filter::parse("99999999999999999999"), Filter::Nothing);
        assert_eq!(Filter::parse("-99999999999999999999"), Filter::Nothing);
        assert_eq!(Filter::parse("9999999999a"), Filter::Text("9999999999a".to_string()));

        let people = vec![customer(1, "99999999999999999999 Ltd")];
        assert!(Filter::parse("99999999999999999999").apply(people).is_empty());
    }

    #[test]
    fn text_filters_are_lowercased() {
        assert_eq!(Filter::parse("AlI"), Filter::Text("ali".to_string()));
    }

    #[test]
    fn numeric_term_never_matches_names() {
        let people = vec![
            customer(1, "Alice"),
            customer(2, "Agent 42"),
            customer(42, "Carol"),
        ];
        let hits = Filter::parse("42").apply(people);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 42);
    }

    #[test]
    fn text_match_is_case_insensitive_substring() {
        let people = vec![customer(1, "Alice"), customer(2, "Bob"), customer(42, "Carol")];
        let hits = Filter::parse("ali").apply(people);
        assert_eq!(hits, vec![customer(1, "Alice")]);
    }

    #[test]
    fn loan_id_filter_also_matches_owning_customer() {
        let loans = vec![loan(1, "Home", 3), loan(3, "Auto", 9), loan(5, "Auto", 4)];
        let hits: Vec<i64> = Filter::parse("3")
            .apply(loans)
            .into_iter()
            .map(|l| l.id)
            .collect();
        assert_eq!(hits, vec![1, 3]);
    }

    #[test]
    fn loan_text_filter_uses_loan_type() {
        let loans = vec![loan(1, "Home", 3), loan(2, "Auto", 9)];
        assert!(Filter::parse("HOM").matches(&loans[0]));
        assert!(!Filter::parse("hom").matches(&loans[1]));
    }
}

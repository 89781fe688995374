use std::mem;

use anyhow::Result;
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Tabs, Wrap};
use ratatui::Frame;
use tracing::warn;

use crate::controller::{Desk, Outcome, ViewState};
use crate::error::{RecordError, RecordResult};
use crate::models::{Customer, Loan, RecordKind, Staff};

use super::forms::{ConfirmDelete, RecordForm};
use super::helpers::{centered_rect, key_hints};
use super::screens::{RecordList, TableRecord};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
const TAB_BAR_HEIGHT: u16 = 3;
/// Rows skipped by PageUp/PageDown.
const PAGE_STEP: isize = 10;

/// Fine-grained modes scoped to the active tab.
enum Mode {
    Normal,
    Editing(RecordForm),
    ConfirmDelete(ConfirmDelete),
    /// Live search; the term lives on the active tab's list.
    Searching,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Replace a list's contents with an action's refreshed records and return
/// the status message.
fn apply_outcome<T: TableRecord>(list: &mut RecordList<T>, outcome: Outcome<T>) -> String {
    list.set_records(outcome.records, outcome.affected);
    outcome.message
}

/// Central application state shared across the TUI. Every user action reads
/// the selection and search term from here and passes them to the desk
/// explicitly.
pub struct App {
    desk: Desk,
    tab: RecordKind,
    customers: RecordList<Customer>,
    loans: RecordList<Loan>,
    staff: RecordList<Staff>,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(desk: Desk) -> RecordResult<Self> {
        let customers = RecordList::new(desk.search_customers("")?);
        let loans = RecordList::new(desk.search_loans("")?);
        let staff = RecordList::new(desk.search_staff("")?);
        Ok(Self {
            desk,
            tab: RecordKind::Customer,
            customers,
            loans,
            staff,
            mode: Mode::Normal,
            status: None,
        })
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit),
            Mode::Editing(form) => self.handle_form(code, form),
            Mode::ConfirmDelete(confirm) => self.handle_confirm_delete(code, confirm),
            Mode::Searching => self.handle_search(code),
        };

        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        match code {
            KeyCode::Char('q') => *exit = true,
            KeyCode::Esc => {
                if self.search_term(self.tab).is_empty() {
                    *exit = true;
                } else {
                    self.set_search(self.tab, String::new());
                    self.refresh(self.tab);
                    self.clear_status();
                }
            }
            KeyCode::Tab => self.switch_tab(1),
            KeyCode::BackTab => self.switch_tab(-1),
            KeyCode::Char('1') => self.tab = RecordKind::Customer,
            KeyCode::Char('2') => self.tab = RecordKind::Loan,
            KeyCode::Char('3') => self.tab = RecordKind::Staff,
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::PageUp => self.move_selection(-PAGE_STEP),
            KeyCode::PageDown => self.move_selection(PAGE_STEP),
            KeyCode::Home => self.select_edge(true),
            KeyCode::End => self.select_edge(false),
            KeyCode::Char('r') | KeyCode::Char('R') => {
                for kind in RecordKind::ALL {
                    self.refresh(kind);
                }
                self.set_status("Reloaded from storage.", StatusKind::Info);
            }
            KeyCode::Char('f') | KeyCode::Char('/') => {
                self.clear_status();
                return Mode::Searching;
            }
            KeyCode::Char('+') => {
                self.clear_status();
                return Mode::Editing(RecordForm::blank(self.tab));
            }
            KeyCode::Char('l') | KeyCode::Char('L') if self.tab == RecordKind::Customer => {
                match self.customers.selected_id() {
                    Some(id) => {
                        self.clear_status();
                        return Mode::Editing(RecordForm::loan_for_customer(id));
                    }
                    None => self.set_status("No customer selected.", StatusKind::Error),
                }
            }
            KeyCode::Char('e') | KeyCode::Char('E') => match self.edit_form() {
                Some(form) => {
                    self.clear_status();
                    return Mode::Editing(form);
                }
                None => self.report_no_selection("edit"),
            },
            KeyCode::Char('-') => match self.delete_prompt() {
                Some(confirm) => {
                    self.clear_status();
                    return Mode::ConfirmDelete(confirm);
                }
                None => self.report_no_selection("delete"),
            },
            _ => {}
        }
        Mode::Normal
    }

    fn handle_form(&mut self, code: KeyCode, mut form: RecordForm) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status(format!("{} cancelled.", form.title()), StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_form(&form) {
                Ok(()) => return Mode::Normal,
                Err(err) => {
                    let message = self.report_error(form.kind, &err);
                    form.error = Some(message);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Mode::Editing(form)
    }

    fn handle_confirm_delete(&mut self, code: KeyCode, confirm: ConfirmDelete) -> Mode {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Mode::Normal
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                match self.perform_delete(&confirm) {
                    Ok(()) => Mode::Normal,
                    Err(err) => {
                        self.report_error(confirm.kind, &err);
                        if err.is_not_found() {
                            Mode::Normal
                        } else {
                            Mode::ConfirmDelete(confirm)
                        }
                    }
                }
            }
            _ => Mode::ConfirmDelete(confirm),
        }
    }

    fn handle_search(&mut self, code: KeyCode) -> Mode {
        let mut term = self.search_term(self.tab).to_string();
        match code {
            KeyCode::Esc => {
                self.set_search(self.tab, String::new());
                self.refresh(self.tab);
                return Mode::Normal;
            }
            KeyCode::Enter => return Mode::Normal,
            KeyCode::Up => {
                self.move_selection(-1);
                return Mode::Searching;
            }
            KeyCode::Down => {
                self.move_selection(1);
                return Mode::Searching;
            }
            KeyCode::Backspace => {
                term.pop();
            }
            KeyCode::Char(ch) if !ch.is_control() => term.push(ch),
            _ => return Mode::Searching,
        }

        self.set_search(self.tab, term);
        self.refresh(self.tab);
        Mode::Searching
    }

    /// Validate and persist the form through the desk. On failure the form is
    /// returned to the caller untouched.
    fn save_form(&mut self, form: &RecordForm) -> RecordResult<()> {
        let view = ViewState::new(form.editing, self.search_term(form.kind));
        let message = match form.kind {
            RecordKind::Customer => {
                let input = form.customer_input();
                let outcome = match form.editing {
                    Some(_) => self.desk.update_customer(&input, &view)?,
                    None => self.desk.add_customer(&input, &view)?,
                };
                apply_outcome(&mut self.customers, outcome)
            }
            RecordKind::Loan => {
                let input = form.loan_input();
                let outcome = match form.editing {
                    Some(_) => self.desk.update_loan(&input, &view)?,
                    None => self.desk.add_loan(&input, &view)?,
                };
                apply_outcome(&mut self.loans, outcome)
            }
            RecordKind::Staff => {
                let input = form.staff_input();
                let outcome = match form.editing {
                    Some(_) => self.desk.update_staff(&input, &view)?,
                    None => self.desk.add_staff(&input, &view)?,
                };
                apply_outcome(&mut self.staff, outcome)
            }
        };
        self.tab = form.kind;
        self.set_status(message, StatusKind::Info);
        Ok(())
    }

    fn perform_delete(&mut self, confirm: &ConfirmDelete) -> RecordResult<()> {
        let view = ViewState::new(Some(confirm.id), self.search_term(confirm.kind));
        let message = match confirm.kind {
            RecordKind::Customer => {
                let outcome = self.desk.delete_customer(&view)?;
                apply_outcome(&mut self.customers, outcome)
            }
            RecordKind::Loan => {
                let outcome = self.desk.delete_loan(&view)?;
                apply_outcome(&mut self.loans, outcome)
            }
            RecordKind::Staff => {
                let outcome = self.desk.delete_staff(&view)?;
                apply_outcome(&mut self.staff, outcome)
            }
        };
        self.set_status(message, StatusKind::Info);
        Ok(())
    }

    /// Show an action error in the footer. A missing record means the list is
    /// stale, so it gets re-read before the message is shown.
    fn report_error(&mut self, kind: RecordKind, err: &RecordError) -> String {
        let message = err.to_string();
        if err.is_not_found() {
            self.refresh(kind);
        }
        if matches!(err, RecordError::Unavailable { .. }) {
            warn!(error = %err, "storage unavailable");
        }
        self.set_status(message.clone(), StatusKind::Error);
        message
    }

    /// Re-run the kind's current search against the store, keeping the
    /// selection on the same record where possible.
    fn refresh(&mut self, kind: RecordKind) {
        let result = match kind {
            RecordKind::Customer => self
                .desk
                .search_customers(&self.customers.search)
                .map(|records| {
                    let focus = self.customers.selected_id();
                    self.customers.set_records(records, focus);
                }),
            RecordKind::Loan => self.desk.search_loans(&self.loans.search).map(|records| {
                let focus = self.loans.selected_id();
                self.loans.set_records(records, focus);
            }),
            RecordKind::Staff => self.desk.search_staff(&self.staff.search).map(|records| {
                let focus = self.staff.selected_id();
                self.staff.set_records(records, focus);
            }),
        };
        if let Err(err) = result {
            warn!(error = %err, kind = %kind, "refresh failed");
            self.set_status(err.to_string(), StatusKind::Error);
        }
    }

    fn search_term(&self, kind: RecordKind) -> &str {
        match kind {
            RecordKind::Customer => &self.customers.search,
            RecordKind::Loan => &self.loans.search,
            RecordKind::Staff => &self.staff.search,
        }
    }

    fn set_search(&mut self, kind: RecordKind, term: String) {
        match kind {
            RecordKind::Customer => self.customers.search = term,
            RecordKind::Loan => self.loans.search = term,
            RecordKind::Staff => self.staff.search = term,
        }
    }

    fn switch_tab(&mut self, offset: isize) {
        let len = RecordKind::ALL.len() as isize;
        let current = RecordKind::ALL
            .iter()
            .position(|kind| *kind == self.tab)
            .unwrap_or(0) as isize;
        let next = (current + offset).rem_euclid(len) as usize;
        self.tab = RecordKind::ALL[next];
        self.clear_status();
    }

    fn move_selection(&mut self, offset: isize) {
        match self.tab {
            RecordKind::Customer => self.customers.move_selection(offset),
            RecordKind::Loan => self.loans.move_selection(offset),
            RecordKind::Staff => self.staff.move_selection(offset),
        }
    }

    fn select_edge(&mut self, first: bool) {
        match (self.tab, first) {
            (RecordKind::Customer, true) => self.customers.select_first(),
            (RecordKind::Customer, false) => self.customers.select_last(),
            (RecordKind::Loan, true) => self.loans.select_first(),
            (RecordKind::Loan, false) => self.loans.select_last(),
            (RecordKind::Staff, true) => self.staff.select_first(),
            (RecordKind::Staff, false) => self.staff.select_last(),
        }
    }

    fn edit_form(&self) -> Option<RecordForm> {
        match self.tab {
            RecordKind::Customer => self.customers.current().map(RecordForm::from_customer),
            RecordKind::Loan => self.loans.current().map(RecordForm::from_loan),
            RecordKind::Staff => self.staff.current().map(RecordForm::from_staff),
        }
    }

    fn delete_prompt(&self) -> Option<ConfirmDelete> {
        fn prompt<T: TableRecord>(list: &RecordList<T>) -> Option<ConfirmDelete> {
            list.current().map(|record| ConfirmDelete {
                kind: T::KIND,
                id: record.id(),
                label: record.label(),
            })
        }
        match self.tab {
            RecordKind::Customer => prompt(&self.customers),
            RecordKind::Loan => prompt(&self.loans),
            RecordKind::Staff => prompt(&self.staff),
        }
    }

    fn report_no_selection(&mut self, action: &str) {
        let kind = self.tab.to_string().to_lowercase();
        self.set_status(format!("No {kind} selected to {action}."), StatusKind::Error);
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(TAB_BAR_HEIGHT),
                Constraint::Min(0),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(area);

        self.draw_tab_bar(frame, chunks[0]);
        match self.tab {
            RecordKind::Customer => self.draw_table(frame, chunks[1], &self.customers),
            RecordKind::Loan => self.draw_table(frame, chunks[1], &self.loans),
            RecordKind::Staff => self.draw_table(frame, chunks[1], &self.staff),
        }
        self.draw_footer(frame, chunks[2]);

        match &self.mode {
            Mode::Editing(form) => self.draw_form(frame, area, form),
            Mode::ConfirmDelete(confirm) => self.draw_confirm_delete(frame, area, confirm),
            Mode::Searching => self.draw_search_bar(frame, chunks[1]),
            Mode::Normal => {}
        }
    }

    fn draw_tab_bar(&self, frame: &mut Frame, area: Rect) {
        let titles = RecordKind::ALL
            .iter()
            .enumerate()
            .map(|(idx, kind)| format!("{} {}", idx + 1, kind.plural()));
        let selected = RecordKind::ALL
            .iter()
            .position(|kind| *kind == self.tab)
            .unwrap_or(0);

        let tabs = Tabs::new(titles)
            .block(Block::default().borders(Borders::ALL).title("Loan Desk"))
            .select(selected)
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_widget(tabs, area);
    }

    fn draw_table<T: TableRecord>(&self, frame: &mut Frame, area: Rect, list: &RecordList<T>) {
        let kind = T::KIND;
        let title = if list.search.trim().is_empty() {
            format!("{} ({})", kind.plural(), list.records.len())
        } else {
            format!(
                "{} matching \"{}\" ({})",
                kind.plural(),
                list.search.trim(),
                list.records.len()
            )
        };
        let block = Block::default().borders(Borders::ALL).title(title);

        if list.records.is_empty() {
            let text = if list.search.trim().is_empty() {
                format!(
                    "No {} yet. Press '+' to add one.",
                    kind.plural().to_lowercase()
                )
            } else {
                "Nothing matches this search.".to_string()
            };
            let message = Paragraph::new(text)
                .block(block)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true });
            frame.render_widget(message, area);
            return;
        }

        let header = Row::new(T::HEADER.iter().copied().map(Cell::from))
            .style(Style::default().add_modifier(Modifier::BOLD));
        let rows = list.records.iter().map(|record| Row::new(record.cells()));

        let table = Table::new(rows, T::widths())
            .header(header)
            .block(block)
            .row_highlight_style(Style::default().fg(Color::Yellow))
            .highlight_symbol("▶ ");

        let mut state = TableState::default();
        state.select(Some(list.selected));
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let paragraph =
            Paragraph::new(vec![status_line, self.footer_instructions()]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        match &self.mode {
            Mode::Editing(_) => key_hints(&[
                ("Tab/↑↓", "Field"),
                ("Enter", "Save"),
                ("Esc", "Cancel"),
            ]),
            Mode::ConfirmDelete(_) => key_hints(&[("y", "Delete"), ("n", "Keep")]),
            Mode::Searching => key_hints(&[
                ("type", "Filter"),
                ("↑↓", "Select"),
                ("Enter", "Keep filter"),
                ("Esc", "Clear"),
            ]),
            Mode::Normal if self.tab == RecordKind::Customer => key_hints(&[
                ("1-3/Tab", "Switch"),
                ("↑↓", "Select"),
                ("f", "Search"),
                ("+", "Add"),
                ("e", "Edit"),
                ("-", "Delete"),
                ("l", "New Loan"),
                ("r", "Reload"),
                ("q", "Quit"),
            ]),
            Mode::Normal => key_hints(&[
                ("1-3/Tab", "Switch"),
                ("↑↓", "Select"),
                ("f", "Search"),
                ("+", "Add"),
                ("e", "Edit"),
                ("-", "Delete"),
                ("r", "Reload"),
                ("q", "Quit"),
            ]),
        }
    }

    fn draw_search_bar(&self, frame: &mut Frame, area: Rect) {
        let height = 3u16.min(area.height);
        let popup_area = Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height,
        };
        frame.render_widget(Clear, popup_area);

        let term = self.search_term(self.tab);
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("Search {} (number = ID)", self.tab.plural()));
        let paragraph = Paragraph::new(Span::raw(format!("Search: {term}")))
            .block(block.clone())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);

        let inner = block.inner(popup_area);
        let cursor_x = inner.x + "Search: ".len() as u16 + term.chars().count() as u16;
        frame.set_cursor_position((cursor_x, inner.y));
    }

    fn draw_form(&self, frame: &mut Frame, area: Rect, form: &RecordForm) {
        let popup_area = centered_rect(60, 50, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(form.title()).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines: Vec<Line> = (0..form.fields.len())
            .map(|idx| form.build_line(idx))
            .collect();
        lines.push(Line::from(""));

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save • Tab to switch • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let cursor_x = inner.x + form.cursor_offset() as u16;
        let cursor_y = inner.y + form.active as u16;
        frame.set_cursor_position((cursor_x, cursor_y));
    }

    fn draw_confirm_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmDelete) {
        let popup_area = centered_rect(50, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(format!("Delete {}", confirm.kind))
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![
            Line::from(format!("Delete {} #{}?", confirm.kind, confirm.id)),
            Line::from(Span::styled(
                confirm.label.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];
        if confirm.kind != RecordKind::Loan {
            lines.push(Line::from(Span::styled(
                "Loans referencing this record are not deleted.",
                Style::default().fg(Color::Gray),
            )));
        }
        lines.push(Line::from("y = delete, n = keep"));

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Store;

    fn app() -> App {
        App::new(Desk::new(Store::open_in_memory().unwrap())).unwrap()
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            app.handle_key(KeyCode::Char(ch)).unwrap();
        }
    }

    fn add_customer(app: &mut App, name: &str, proof: &str) {
        app.handle_key(KeyCode::Char('+')).unwrap();
        type_text(app, name);
        app.handle_key(KeyCode::Tab).unwrap();
        type_text(app, proof);
        app.handle_key(KeyCode::Enter).unwrap();
    }

    #[test]
    fn adding_a_customer_through_keys() {
        let mut app = app();
        add_customer(&mut app, "Ada", "payslip");

        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(app.customers.records.len(), 1);
        assert_eq!(app.customers.current().unwrap().name, "Ada");
    }

    #[test]
    fn invalid_form_stays_open_with_values() {
        let mut app = app();
        app.handle_key(KeyCode::Char('+')).unwrap();
        type_text(&mut app, "Ada");
        app.handle_key(KeyCode::Enter).unwrap();

        match &app.mode {
            Mode::Editing(form) => {
                assert_eq!(form.fields[0].value, "Ada");
                assert!(form.error.is_some());
            }
            _ => panic!("form should still be open"),
        }
        assert!(app.customers.records.is_empty());
    }

    #[test]
    fn search_filters_the_active_tab() {
        let mut app = app();
        add_customer(&mut app, "Alice", "payslip");
        add_customer(&mut app, "Bob", "id card");

        app.handle_key(KeyCode::Char('f')).unwrap();
        type_text(&mut app, "ali");
        assert_eq!(app.customers.records.len(), 1);

        app.handle_key(KeyCode::Esc).unwrap();
        assert_eq!(app.customers.records.len(), 2);
        assert!(app.customers.search.is_empty());
    }

    #[test]
    fn delete_needs_confirmation() {
        let mut app = app();
        add_customer(&mut app, "Ada", "payslip");

        app.handle_key(KeyCode::Char('-')).unwrap();
        app.handle_key(KeyCode::Char('n')).unwrap();
        assert_eq!(app.customers.records.len(), 1);

        app.handle_key(KeyCode::Char('-')).unwrap();
        app.handle_key(KeyCode::Char('y')).unwrap();
        assert!(app.customers.records.is_empty());
    }

    #[test]
    fn new_loan_from_customer_tab_lands_on_loans() {
        let mut app = app();
        add_customer(&mut app, "Ada", "payslip");

        app.handle_key(KeyCode::Char('l')).unwrap();
        type_text(&mut app, "5000");
        app.handle_key(KeyCode::Tab).unwrap();
        type_text(&mut app, "4.5");
        app.handle_key(KeyCode::Tab).unwrap();
        type_text(&mut app, "Home");
        app.handle_key(KeyCode::Enter).unwrap();

        assert_eq!(app.tab, RecordKind::Loan);
        assert_eq!(app.loans.records.len(), 1);
        assert_eq!(app.loans.records[0].customer_id, app.customers.records[0].id);
    }

    #[test]
    fn reload_picks_up_rows_written_elsewhere() {
        let mut app = app();
        app.desk
            .store()
            .conn()
            .execute(
                "INSERT INTO staff (name, role) VALUES ('Grace', 'Loan Officer')",
                [],
            )
            .unwrap();
        assert!(app.staff.records.is_empty());

        app.handle_key(KeyCode::Char('r')).unwrap();
        assert_eq!(app.staff.records.len(), 1);
        assert_eq!(app.staff.records[0].name, "Grace");
    }

    #[test]
    fn tab_keys_cycle_through_kinds() {
        let mut app = app();
        app.handle_key(KeyCode::BackTab).unwrap();
        assert_eq!(app.tab, RecordKind::Staff);
        app.handle_key(KeyCode::Tab).unwrap();
        assert_eq!(app.tab, RecordKind::Customer);
        app.handle_key(KeyCode::Char('2')).unwrap();
        assert_eq!(app.tab, RecordKind::Loan);
    }

    #[test]
    fn quit_keys_exit() {
        let mut app = app();
        assert!(app.handle_key(KeyCode::Char('q')).unwrap());
        assert!(app.handle_key(KeyCode::Esc).unwrap());
    }
}

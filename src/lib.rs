//! Core library surface for the Loan Desk TUI application.
//!
//! The record-management contract lives here: validation in [`controller`],
//! search semantics in [`search`] and CRUD rules in [`db`]. The `bin` target
//! only wires configuration, logging and the terminal UI around it.
pub mod config;
pub mod controller;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod search;
pub mod ui;

pub use config::{Config, DeletePolicy};
pub use controller::{
    validate_customer, validate_loan, validate_staff, CustomerInput, Desk, LoanInput, Outcome,
    StaffInput, ViewState,
};
pub use db::{init_schema, Store};
pub use error::{RecordError, RecordResult};

/// The domain types other layers manipulate.
pub use models::{Customer, Loan, RecordKind, Staff};
pub use search::Filter;

/// The interactive application entry point and state container.
pub use ui::{run_app, App};

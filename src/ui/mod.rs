//! Ratatui front-end for the loan desk: one tab per record kind, a table of
//! records, modal add/edit forms, delete confirmations and a live search bar.
//! All persistence goes through [`crate::controller::Desk`].

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;

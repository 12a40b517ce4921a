pub mod controller;
pub mod view;

pub use controller::{EditSession, ExpenseListController, ListStatus};

pub mod ledger;
pub mod migrations;
pub mod models;

pub use ledger::{split_by_day, start_of_day, UsageLedger};
pub use models::{DayUsage, PresenceInterval};

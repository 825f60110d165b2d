pub mod auth;
pub mod followup;
pub mod health;
pub mod investigator;
pub mod reports;
pub mod whistleblower;

pub use auth::{login, logout};
pub use followup::{followup_login, followup_reply, followup_thread};
pub use health::health_check;
pub use investigator::{case_details, list_cases, reply, update_classification, update_status};
pub use reports::{create_report, list_reports};
pub use whistleblower::{public_key, submit_report};

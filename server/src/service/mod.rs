//! Business logic between the HTTP handlers and the stores.

pub mod auth;
pub mod cases;
pub mod reports;
pub mod whistleblower;

pub use auth::{AuthContext, AuthService};
pub use cases::CaseService;
pub use reports::ReportService;
pub use whistleblower::WhistleblowerService;

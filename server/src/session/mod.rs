pub mod manager;

pub use manager::{Principal, SessionData, SessionManager};

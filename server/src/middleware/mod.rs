pub mod auth;
pub mod rate_limit;

pub use auth::{any_auth, investigator_auth, whistleblower_auth};
pub use rate_limit::{rate_limit_middleware, RateLimiter};

//! Session gate for the Resource API and the live channel

pub mod rate_limit;
pub mod session;

pub use session::{SESSION_COOKIE, SessionIdentity, session_middleware};

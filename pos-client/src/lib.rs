//! POS client - HTTP, live channel and query cache for the POS server
//!
//! ```text
//! UI action ──► actions ──► HttpClient (REST write, authoritative)
//!                  │  └────► LiveClient (realtime hint)
//!                  ▼
//!             QueryClient ◄── LiveClient receive loop (apply_live)
//!                  │
//!             QueryCache (key → Fresh | Stale | Optimistic)
//! ```

pub mod actions;
pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod live;

#[cfg(test)]
pub(crate) mod testing;

pub use actions::{MutationApi, PosActions};
pub use auth::{AuthApi, AuthState, SessionManager};
pub use cache::{EntryState, KeyFilter, QueryCache, QueryClient, QueryFetcher, QueryKey, UnauthorizedBehavior};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use crate::http::HttpClient;
pub use live::LiveClient;

//! Order and floor-plan mutations
//!
//! Every state change that other devices must see goes through
//! [`OrderService`], whether it arrived over REST or the live channel.

pub mod rules;
mod service;

pub use service::OrderService;

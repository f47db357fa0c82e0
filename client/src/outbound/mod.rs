//! Outbound adapters implementing the domain ports.

pub mod http;
pub mod notifications;
pub mod runtime;

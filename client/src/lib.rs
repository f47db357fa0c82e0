//! User directory client.
//!
//! Lists, creates, edits, and deletes user records held by a remote REST
//! API. The crate is laid out as a small hexagon:
//!
//! - [`domain`] holds the records, validation rules, and the screen
//!   controllers, talking to the outside only through [`domain::ports`].
//! - [`outbound`] implements those ports over HTTP, Tokio timers, and an
//!   in-memory notification centre.
//! - [`inbound`] drives the controllers from a terminal.
//! - [`config`] loads settings through OrthoConfig.

pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

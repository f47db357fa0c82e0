//! Inbound adapters driving the domain controllers.

pub mod cli;

//! HTTP adapter for the remote user directory.

mod dto;
mod user_api;

pub use user_api::{HttpUserApi, HttpUserApiBuildError};

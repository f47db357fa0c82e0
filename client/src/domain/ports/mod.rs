//! Domain ports defining the edges of the hexagon.
//!
//! Ports describe how the controllers expect to interact with driven
//! adapters (the remote API, the notification surface, timers). Each trait
//! exposes strongly typed errors so adapters map their failures into
//! predictable variants instead of returning `anyhow::Result`.

mod macros;
mod notifier;
mod sleeper;
mod user_api;

pub(crate) use macros::define_port_error;

#[cfg(test)]
pub use notifier::MockNotifier;
pub use notifier::Notifier;
pub use sleeper::Sleeper;
#[cfg(test)]
pub use user_api::MockUserApi;
pub use user_api::{UserApi, UserApiError};

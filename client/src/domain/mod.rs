//! Domain primitives, validation rules, and screen controllers.
//!
//! Purpose: define the user record, the editable draft, and the state
//! machines behind the list, create, and edit screens. Controllers talk to
//! the outside world only through the traits in [`ports`].
//!
//! Public surface:
//! - User (alias to `user::User`): persisted record with server id.
//! - UserDraft (alias to `user::UserDraft`): unsaved editable fields.
//! - Route (alias to `route::Route`): navigation signal returned by
//!   controllers.
//! - Notification (alias to `notification::Notification`): transient
//!   banner content.

pub mod controllers;
pub mod notification;
pub mod ports;
pub mod route;
pub mod user;
pub mod validation;

pub use self::notification::{Notification, NotificationKind};
pub use self::route::{Route, RouteParseError};
pub use self::user::{Field, User, UserDraft, UserId, UserValidationError};
pub use self::validation::{FieldErrors, validate};

//! Client-side routes for the three user screens.
//!
//! Controllers never navigate themselves; they return a [`Route`] and the
//! view layer decides how to get there.

use std::fmt;

use thiserror::Error;

use super::user::{UserId, UserValidationError};

const EDIT_PREFIX: &str = "/update/user/";

/// Screen the view layer should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// User list at `/`.
    List,
    /// Create form at `/add`.
    Add,
    /// Edit form at `/update/user/{id}`.
    Edit(UserId),
}

/// Errors returned by [`Route::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteParseError {
    /// No screen is mounted at the path.
    #[error("no screen is mounted at {path}")]
    Unknown {
        /// Path that failed to resolve.
        path: String,
    },
    /// The edit path carries an unusable identifier.
    #[error("invalid user id in route: {0}")]
    InvalidId(#[from] UserValidationError),
}

impl Route {
    /// Path of the screen.
    ///
    /// # Examples
    /// ```
    /// use client::domain::{Route, UserId};
    ///
    /// let route = Route::Edit(UserId::new("42").expect("valid id"));
    /// assert_eq!(route.path(), "/update/user/42");
    /// ```
    pub fn path(&self) -> String {
        match self {
            Self::List => "/".to_owned(),
            Self::Add => "/add".to_owned(),
            Self::Edit(id) => format!("{EDIT_PREFIX}{id}"),
        }
    }

    /// Resolve a path into a route. A single trailing slash is ignored.
    pub fn parse(path: &str) -> Result<Self, RouteParseError> {
        let trimmed = path.trim();
        let unknown = || RouteParseError::Unknown {
            path: path.to_owned(),
        };

        if let Some(rest) = trimmed.strip_prefix(EDIT_PREFIX) {
            let id = rest.strip_suffix('/').unwrap_or(rest);
            if id.contains('/') {
                return Err(unknown());
            }
            return Ok(Self::Edit(UserId::new(id)?));
        }

        match trimmed.strip_suffix('/').unwrap_or(trimmed) {
            "" => Ok(Self::List),
            "/add" => Ok(Self::Add),
            _ => Err(unknown()),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[cfg(test)]
mod tests {
    //! Path round-trip coverage for client routes.

    use super::*;
    use rstest::rstest;

    fn edit(id: &str) -> Route {
        Route::Edit(UserId::new(id).expect("valid id"))
    }

    #[rstest]
    #[case("/", Route::List)]
    #[case("", Route::List)]
    #[case("/add", Route::Add)]
    #[case("/add/", Route::Add)]
    #[case("/update/user/42", edit("42"))]
    #[case("/update/user/65f1c0ffee/", edit("65f1c0ffee"))]
    fn parses_known_paths(#[case] path: &str, #[case] expected: Route) {
        assert_eq!(Route::parse(path), Ok(expected));
    }

    #[rstest]
    #[case("/users")]
    #[case("/update/user/42/extra")]
    #[case("/delete/user/42")]
    fn rejects_unknown_paths(#[case] path: &str) {
        assert!(matches!(
            Route::parse(path),
            Err(RouteParseError::Unknown { .. })
        ));
    }

    #[test]
    fn rejects_edit_path_without_identifier() {
        assert_eq!(
            Route::parse("/update/user/"),
            Err(RouteParseError::InvalidId(UserValidationError::EmptyId))
        );
    }

    #[test]
    fn path_and_parse_agree() {
        for route in [Route::List, Route::Add, edit("abc123")] {
            assert_eq!(Route::parse(&route.path()), Ok(route));
        }
    }
}

//! Request identity
//!
//! Authentication happens upstream; the proxy in front of the gateway passes
//! the signed-in user's id in `X-User-Id`. Handlers that record `created_by`
//! or check journal editorship read it through [`ActingUser`].

use crate::errors::{AppError, Result};
use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

/// Header carrying the authenticated user's id
pub const USER_ID_HEADER: &str = "x-user-id";

/// The user on whose behalf a request is made, if any
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActingUser {
    pub user_id: Option<Uuid>,
}

impl ActingUser {
    /// Require an identified user
    pub fn require(&self) -> Result<Uuid> {
        self.user_id.ok_or_else(|| AppError::Unauthorized {
            message: "Missing X-User-Id header".to_string(),
        })
    }
}

/// Parse the header value; blank means anonymous
pub fn parse_user_id(value: Option<&str>) -> Result<Option<Uuid>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => Uuid::parse_str(raw)
            .map(Some)
            .map_err(|_| AppError::Unauthorized {
                message: "Invalid X-User-Id header".to_string(),
            }),
    }
}

/// Axum extractor for ActingUser
impl<S> FromRequestParts<S> for ActingUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        let header = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok());

        Ok(ActingUser {
            user_id: parse_user_id(header)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_user_id(Some(&id.to_string())).unwrap(), Some(id));
        assert_eq!(parse_user_id(None).unwrap(), None);
        assert_eq!(parse_user_id(Some("  ")).unwrap(), None);
        assert!(parse_user_id(Some("admin")).is_err());
    }

    #[test]
    fn test_require() {
        assert!(ActingUser::default().require().is_err());
        let id = Uuid::new_v4();
        assert_eq!(ActingUser { user_id: Some(id) }.require().unwrap(), id);
    }
}

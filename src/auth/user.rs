//! The "current user" context consulted by ownership checks.
//!
//! A [`CurrentUser`] is built once, typically from the body the server
//! returns when the session logs in, and handed to the
//! [`RestClient`](crate::RestClient) that needs it.
//!
//! # Example
//!
//! ```rust
//! use rest_resource::CurrentUser;
//!
//! let user: CurrentUser = serde_json::from_str(
//!     r#"{"ID": "u-1", "userName": "csproot", "enterpriseID": "e-1"}"#,
//! )
//! .unwrap();
//!
//! assert_eq!(user.id, "u-1");
//! assert_eq!(user.user_name, "csproot");
//! ```

use serde::{Deserialize, Serialize};

/// The user the SDK acts on behalf of.
///
/// Field names on the wire follow the server's login payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// The remote identifier of the user.
    #[serde(rename = "ID")]
    pub id: String,

    /// The login name of the user.
    #[serde(rename = "userName")]
    pub user_name: String,

    /// The enterprise the user belongs to, when the server reports one.
    #[serde(rename = "enterpriseID", default, skip_serializing_if = "Option::is_none")]
    pub enterprise_id: Option<String>,
}

impl CurrentUser {
    /// Creates a new current user.
    #[must_use]
    pub fn new(id: impl Into<String>, user_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            user_name: user_name.into(),
            enterprise_id: None,
        }
    }

    /// Sets the enterprise the user belongs to.
    #[must_use]
    pub fn with_enterprise_id(mut self, enterprise_id: impl Into<String>) -> Self {
        self.enterprise_id = Some(enterprise_id.into());
        self
    }
}

// Verify CurrentUser is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<CurrentUser>();
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_user_deserializes_login_payload() {
        let user: CurrentUser = serde_json::from_str(
            r#"{"ID": "7", "userName": "admin", "APIKey": "ignored"}"#,
        )
        .unwrap();

        assert_eq!(user, CurrentUser::new("7", "admin"));
        assert!(user.enterprise_id.is_none());
    }

    #[test]
    fn test_current_user_serialization_uses_wire_names() {
        let user = CurrentUser::new("7", "admin").with_enterprise_id("e-9");
        let json = serde_json::to_string(&user).unwrap();

        assert!(json.contains("\"ID\":\"7\""));
        assert!(json.contains("\"userName\":\"admin\""));
        assert!(json.contains("\"enterpriseID\":\"e-9\""));
    }
}

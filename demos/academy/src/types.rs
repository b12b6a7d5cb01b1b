//! Payloads exchanged with the platform API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure payload attached to `Fail` events.
///
/// The API reports every failure as a message; the client never classifies it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{message}")]
pub struct ApiError {
    /// Human readable reason, shown as-is in error toasts
    pub message: String,
}

impl ApiError {
    /// Create an error with the given message
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular learner
    User,
    /// Platform administrator (no subscription)
    Admin,
}

/// State of a paid subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    /// Billing is running
    Active,
    /// Cancelled by the user
    Cancelled,
    /// Anything the client does not know about
    #[serde(other)]
    Unknown,
}

/// Subscription attached to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// Provider-side identifier
    pub id: String,
    /// Current status
    pub status: SubscriptionStatus,
}

/// Profile picture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Avatar {
    /// Storage identifier
    pub public_id: String,
    /// Where the image is served from
    pub url: String,
}

/// A course saved to the user's playlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistItem {
    /// Course identifier
    pub course: String,
    /// Poster image URL
    pub poster: String,
}

/// The signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Display name
    pub name: String,
    /// Contact address
    pub email: String,
    /// Account role
    pub role: Role,
    /// Profile picture
    pub avatar: Avatar,
    /// Account creation time
    pub created_at: DateTime<Utc>,
    /// Paid subscription, if any
    pub subscription: Option<Subscription>,
    /// Saved courses
    #[serde(default)]
    pub playlist: Vec<PlaylistItem>,
}

/// Contact form payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMessage {
    /// Sender name
    pub name: String,
    /// Reply address
    pub email: String,
    /// Free text
    pub message: String,
}

/// "Request a course" form payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseRequest {
    /// Requester name
    pub name: String,
    /// Reply address
    pub email: String,
    /// Course being asked for
    pub course: String,
}

/// A password that never shows up in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    /// Wrap a plain-text password
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The plain-text value, for the API call only
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_is_redacted() {
        let password = Password::new("hunter2");
        assert_eq!(format!("{password:?}"), "Password(***)");
        assert_eq!(password.expose(), "hunter2");
    }

    #[test]
    fn unknown_subscription_status() -> Result<(), serde_json::Error> {
        let subscription: Subscription =
            serde_json::from_str(r#"{"id":"sub_1","status":"past_due"}"#)?;
        assert_eq!(subscription.status, SubscriptionStatus::Unknown);
        Ok(())
    }

    #[test]
    fn api_error_displays_message() {
        assert_eq!(ApiError::new("Network error").to_string(), "Network error");
    }
}

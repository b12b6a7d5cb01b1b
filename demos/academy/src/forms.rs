//! Form input checked before dispatch, and profile-page views.

use crate::app::AppAction;
use crate::types::{Password, PlaylistItem, Role, SubscriptionStatus, UserProfile};
use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

/// Input rejected before any request is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    /// A required field is blank
    #[error("Please enter {field}")]
    MissingField {
        /// Field label
        field: &'static str,
    },
    /// No file was chosen
    #[error("Please upload a file")]
    EmptyFile,
}

fn required(field: &'static str, value: &str) -> Result<(), FormError> {
    if value.trim().is_empty() {
        return Err(FormError::MissingField { field });
    }
    Ok(())
}

/// Change-password form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangePasswordForm {
    /// Current password
    pub old_password: String,
    /// Replacement
    pub new_password: String,
}

impl ChangePasswordForm {
    /// Validate and turn into a command.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::MissingField`] if either field is blank.
    pub fn submit(self) -> Result<AppAction, FormError> {
        required("old password", &self.old_password)?;
        required("new password", &self.new_password)?;
        Ok(AppAction::ChangePassword {
            old_password: Password::new(self.old_password),
            new_password: Password::new(self.new_password),
        })
    }
}

/// Profile picture chosen for upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfilePictureUpload {
    /// Raw file bytes
    pub file: Vec<u8>,
}

impl ProfilePictureUpload {
    /// Validate and turn into a command.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::EmptyFile`] if no bytes were chosen.
    pub fn submit(self) -> Result<AppAction, FormError> {
        if self.file.is_empty() {
            return Err(FormError::EmptyFile);
        }
        Ok(AppAction::UpdateProfilePicture { file: self.file })
    }
}

/// What the subscription button offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionControl {
    /// Administrators do not subscribe
    Hidden,
    /// Active subscription
    Cancel,
    /// No active subscription
    Subscribe,
}

/// Profile page header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileSummary {
    /// Display name
    pub name: String,
    /// Contact address
    pub email: String,
    /// Day the account was created
    pub joined: NaiveDate,
    /// Subscription button
    pub subscription: SubscriptionControl,
    /// Saved courses, each shown with a remove button
    pub playlist: Vec<PlaylistItem>,
}

impl ProfileSummary {
    /// Command behind the remove button of a playlist entry.
    #[must_use]
    pub fn remove_action(item: &PlaylistItem) -> AppAction {
        AppAction::RemoveFromPlaylist {
            course_id: item.course.clone(),
        }
    }
}

impl From<&UserProfile> for ProfileSummary {
    fn from(user: &UserProfile) -> Self {
        let subscription = match (user.role, &user.subscription) {
            (Role::Admin, _) => SubscriptionControl::Hidden,
            (Role::User, Some(sub)) if sub.status == SubscriptionStatus::Active => {
                SubscriptionControl::Cancel
            },
            (Role::User, _) => SubscriptionControl::Subscribe,
        };

        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            joined: user.created_at.date_naive(),
            subscription,
            playlist: user.playlist.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{admin, learner};
    use crate::types::Subscription;

    #[test]
    fn blank_password_is_rejected() {
        let form = ChangePasswordForm {
            old_password: "secret".to_string(),
            new_password: "   ".to_string(),
        };
        assert_eq!(
            form.submit().map(|_| ()),
            Err(FormError::MissingField {
                field: "new password"
            })
        );
    }

    #[test]
    fn valid_password_form_becomes_command() {
        let form = ChangePasswordForm {
            old_password: "secret".to_string(),
            new_password: "next".to_string(),
        };
        assert!(matches!(
            form.submit(),
            Ok(AppAction::ChangePassword { .. })
        ));
    }

    #[test]
    fn empty_upload_is_rejected() {
        assert_eq!(
            ProfilePictureUpload::default().submit().map(|_| ()),
            Err(FormError::EmptyFile)
        );
        assert_eq!(FormError::EmptyFile.to_string(), "Please upload a file");
    }

    #[test]
    fn summary_controls() {
        let summary = ProfileSummary::from(&learner());
        assert_eq!(summary.subscription, SubscriptionControl::Cancel);
        assert_eq!(summary.joined.to_string(), "2024-03-15");
        assert_eq!(summary.playlist.len(), 1);
        assert_eq!(summary.playlist[0].course, "rust-101");
        assert_eq!(summary.playlist[0].poster, "memory://posters/rust-101");
        assert!(matches!(
            ProfileSummary::remove_action(&summary.playlist[0]),
            AppAction::RemoveFromPlaylist { ref course_id } if course_id == "rust-101"
        ));

        assert_eq!(
            ProfileSummary::from(&admin()).subscription,
            SubscriptionControl::Hidden
        );

        let mut lapsed = learner();
        lapsed.subscription = Some(Subscription {
            id: "sub_1".to_string(),
            status: SubscriptionStatus::Cancelled,
        });
        assert_eq!(
            ProfileSummary::from(&lapsed).subscription,
            SubscriptionControl::Subscribe
        );
    }
}

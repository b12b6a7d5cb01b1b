//! The HTTP action layer, as seen by the reducers.
//!
//! The platform API is an external collaborator: each call eventually
//! resolves to exactly one success message or one [`ApiError`]. Reducers only
//! ever reach it through an [`AcademyApi`] trait object in the environment.

use crate::types::{ContactMessage, CourseRequest, Password, SubscriptionStatus, UserProfile};
use crate::types::{ApiError, Avatar};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::sync::Mutex;

/// Boxed future returned by API calls.
pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ApiError>> + Send + 'a>>;

/// Operations the client performs against the platform API.
///
/// This trait uses explicit `Pin<Box<dyn Future>>` returns instead of
/// `async fn` so it can be used as `Arc<dyn AcademyApi>`.
pub trait AcademyApi: Send + Sync {
    /// Fetch the signed-in user.
    fn load_user(&self) -> ApiFuture<'_, UserProfile>;

    /// Replace the password.
    fn change_password(&self, old_password: Password, new_password: Password)
    -> ApiFuture<'_, String>;

    /// Upload a new profile picture (raw file bytes).
    fn update_profile_picture(&self, file: Vec<u8>) -> ApiFuture<'_, String>;

    /// Remove a course from the playlist.
    fn remove_from_playlist(&self, course_id: String) -> ApiFuture<'_, String>;

    /// Cancel the active subscription.
    fn cancel_subscription(&self) -> ApiFuture<'_, String>;

    /// Send the contact form.
    fn submit_contact(&self, contact: ContactMessage) -> ApiFuture<'_, String>;

    /// Ask for a course that does not exist yet.
    fn request_course(&self, request: CourseRequest) -> ApiFuture<'_, String>;
}

struct Account {
    user: UserProfile,
    password: String,
}

/// In-process stand-in for the platform API.
///
/// Keeps one account in memory and answers after a fixed latency. An
/// offline instance fails every call with "Network error".
pub struct InMemoryApi {
    account: Mutex<Account>,
    latency: Duration,
    offline: bool,
}

impl InMemoryApi {
    /// Serve `user`, whose current password is `password`.
    #[must_use]
    pub fn new(user: UserProfile, password: impl Into<String>) -> Self {
        Self {
            account: Mutex::new(Account {
                user,
                password: password.into(),
            }),
            latency: Duration::ZERO,
            offline: false,
        }
    }

    /// Delay every answer by `latency`.
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Fail every call as if the network were down.
    #[must_use]
    pub const fn offline(mut self) -> Self {
        self.offline = true;
        self
    }

    async fn respond<T>(
        &self,
        call: &'static str,
        f: impl FnOnce(&mut Account) -> Result<T, ApiError> + Send,
    ) -> Result<T, ApiError> {
        tokio::time::sleep(self.latency).await;
        if self.offline {
            tracing::debug!(call, "API offline");
            return Err(ApiError::new("Network error"));
        }

        let mut account = self.account.lock().await;
        let result = f(&mut account);
        match &result {
            Ok(_) => tracing::debug!(call, "API call succeeded"),
            Err(error) => tracing::debug!(call, %error, "API call failed"),
        }
        result
    }
}

fn require(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::new(format!("Please enter {field}")));
    }
    Ok(())
}

impl AcademyApi for InMemoryApi {
    fn load_user(&self) -> ApiFuture<'_, UserProfile> {
        Box::pin(self.respond("load_user", |account| Ok(account.user.clone())))
    }

    fn change_password(
        &self,
        old_password: Password,
        new_password: Password,
    ) -> ApiFuture<'_, String> {
        Box::pin(self.respond("change_password", move |account| {
            require("all fields", old_password.expose())?;
            require("all fields", new_password.expose())?;
            if old_password.expose() != account.password {
                return Err(ApiError::new("Incorrect Old Password"));
            }
            account.password = new_password.expose().to_string();
            Ok("Password Changed Successfully".to_string())
        }))
    }

    fn update_profile_picture(&self, file: Vec<u8>) -> ApiFuture<'_, String> {
        Box::pin(self.respond("update_profile_picture", move |account| {
            if file.is_empty() {
                return Err(ApiError::new("Please upload a file"));
            }
            let public_id = format!("avatar-{}", file.len());
            account.user.avatar = Avatar {
                url: format!("memory://avatars/{public_id}"),
                public_id,
            };
            Ok("Profile Picture Updated Successfully".to_string())
        }))
    }

    fn remove_from_playlist(&self, course_id: String) -> ApiFuture<'_, String> {
        Box::pin(self.respond("remove_from_playlist", move |account| {
            let before = account.user.playlist.len();
            account.user.playlist.retain(|item| item.course != course_id);
            if account.user.playlist.len() == before {
                return Err(ApiError::new("Invalid Course Id"));
            }
            Ok("Removed From Playlist".to_string())
        }))
    }

    fn cancel_subscription(&self) -> ApiFuture<'_, String> {
        Box::pin(self.respond("cancel_subscription", |account| {
            match account.user.subscription.as_mut() {
                Some(subscription) if subscription.status == SubscriptionStatus::Active => {
                    subscription.status = SubscriptionStatus::Cancelled;
                    Ok("Subscription Cancelled".to_string())
                },
                _ => Err(ApiError::new("No active subscription")),
            }
        }))
    }

    fn submit_contact(&self, contact: ContactMessage) -> ApiFuture<'_, String> {
        Box::pin(self.respond("submit_contact", move |_| {
            require("name", &contact.name)?;
            require("email", &contact.email)?;
            require("message", &contact.message)?;
            Ok("Your Message Has Been Sent.".to_string())
        }))
    }

    fn request_course(&self, request: CourseRequest) -> ApiFuture<'_, String> {
        Box::pin(self.respond("request_course", move |_| {
            require("name", &request.name)?;
            require("email", &request.email)?;
            require("course", &request.course)?;
            Ok("The request has been sent.".to_string())
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::learner;

    #[tokio::test]
    async fn change_password_checks_old_password() {
        let api = InMemoryApi::new(learner(), "secret");

        let wrong = api
            .change_password(Password::new("nope"), Password::new("next"))
            .await;
        assert_eq!(wrong, Err(ApiError::new("Incorrect Old Password")));

        let changed = api
            .change_password(Password::new("secret"), Password::new("next"))
            .await;
        assert_eq!(changed.as_deref(), Ok("Password Changed Successfully"));

        let again = api
            .change_password(Password::new("next"), Password::new("third"))
            .await;
        assert!(again.is_ok());
    }

    #[tokio::test]
    async fn playlist_removal_requires_known_course() {
        let api = InMemoryApi::new(learner(), "secret");

        assert!(api.remove_from_playlist("rust-101".to_string()).await.is_ok());
        assert_eq!(
            api.remove_from_playlist("rust-101".to_string()).await,
            Err(ApiError::new("Invalid Course Id"))
        );
    }

    #[tokio::test]
    async fn cancel_subscription_once() {
        let api = InMemoryApi::new(learner(), "secret");

        assert!(api.cancel_subscription().await.is_ok());
        assert!(api.cancel_subscription().await.is_err());

        let user = api.load_user().await;
        let status = user.ok().and_then(|u| u.subscription).map(|s| s.status);
        assert_eq!(status, Some(SubscriptionStatus::Cancelled));
    }

    #[tokio::test]
    async fn offline_fails_everything() {
        let api = InMemoryApi::new(learner(), "secret").offline();

        assert_eq!(api.load_user().await, Err(ApiError::new("Network error")));
        assert_eq!(
            api.update_profile_picture(vec![1, 2, 3]).await,
            Err(ApiError::new("Network error"))
        );
    }

    #[tokio::test]
    async fn picture_upload_updates_avatar() {
        let api = InMemoryApi::new(learner(), "secret");

        assert!(api.update_profile_picture(Vec::new()).await.is_err());
        assert!(api.update_profile_picture(vec![0; 4]).await.is_ok());

        let avatar = api.load_user().await.map(|u| u.avatar.url);
        assert_eq!(avatar.as_deref(), Ok("memory://avatars/avatar-4"));
    }
}

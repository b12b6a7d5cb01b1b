//! Seed accounts for the in-memory API.

use crate::types::{Avatar, PlaylistItem, Role, Subscription, SubscriptionStatus, UserProfile};
use chrono::{DateTime, Utc};

fn joined() -> DateTime<Utc> {
    // 2024-03-15
    DateTime::<Utc>::UNIX_EPOCH + chrono::Duration::days(19_797)
}

/// A learner with an active subscription and one saved course.
#[must_use]
pub fn learner() -> UserProfile {
    UserProfile {
        name: "Ada Lovelace".to_string(),
        email: "ada@example.com".to_string(),
        role: Role::User,
        avatar: Avatar {
            public_id: "default".to_string(),
            url: "memory://avatars/default".to_string(),
        },
        created_at: joined(),
        subscription: Some(Subscription {
            id: "sub_1".to_string(),
            status: SubscriptionStatus::Active,
        }),
        playlist: vec![PlaylistItem {
            course: "rust-101".to_string(),
            poster: "memory://posters/rust-101".to_string(),
        }],
    }
}

/// An administrator: no subscription, empty playlist.
#[must_use]
pub fn admin() -> UserProfile {
    UserProfile {
        name: "Grace Hopper".to_string(),
        email: "grace@example.com".to_string(),
        role: Role::Admin,
        subscription: None,
        playlist: Vec::new(),
        ..learner()
    }
}

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::UserId;

/// A user document.
///
/// Users are created by registration, which lives outside the social core.
/// Within the core the only mutation is adding an id to `friend_ids`.
///
/// Friendship is symmetric: if A's friend set contains B, B's friend set
/// must contain A. A single document cannot enforce that on its own; the
/// friendship service writes both directions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub profile_pic: String,
    #[serde(default)]
    pub native_lng: String,
    #[serde(default)]
    pub learning_lng: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub is_onboarded: bool,
    /// Ids of this user's friends. Stored as an array, treated as a set.
    #[serde(default)]
    pub friend_ids: BTreeSet<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create an onboarded user with an empty profile and no friends.
    pub fn new(full_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::new(),
            full_name: full_name.into(),
            email: String::new(),
            bio: String::new(),
            profile_pic: String::new(),
            native_lng: String::new(),
            learning_lng: String::new(),
            location: String::new(),
            is_onboarded: true,
            friend_ids: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_languages(mut self, native: impl Into<String>, learning: impl Into<String>) -> Self {
        self.native_lng = native.into();
        self.learning_lng = learning.into();
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    pub fn onboarded(mut self, onboarded: bool) -> Self {
        self.is_onboarded = onboarded;
        self
    }

    /// Returns `true` if `other` is in this user's friend set.
    pub fn is_friend_with(&self, other: &UserId) -> bool {
        self.friend_ids.contains(other)
    }

    /// Insert `friend` into the friend set.
    ///
    /// Returns `false` if it was already present; the document is left
    /// untouched in that case, `updated_at` included.
    pub fn add_friend(&mut self, friend: UserId) -> bool {
        if self.friend_ids.insert(friend) {
            self.updated_at = Utc::now();
            true
        } else {
            false
        }
    }

    /// Case-insensitive substring match against the searchable profile
    /// fields. An empty or blank query matches everyone.
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.trim();
        if query.is_empty() {
            return true;
        }
        let needle = query.to_lowercase();
        [
            &self.full_name,
            &self.native_lng,
            &self.learning_lng,
            &self.location,
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
    }

    /// The public projection of this user.
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            full_name: self.full_name.clone(),
            bio: self.bio.clone(),
            profile_pic: self.profile_pic.clone(),
            native_lng: self.native_lng.clone(),
            learning_lng: self.learning_lng.clone(),
            location: self.location.clone(),
        }
    }
}

/// Public profile fields, embedded in friend-request listings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub full_name: String,
    pub bio: String,
    pub profile_pic: String,
    pub native_lng: String,
    pub learning_lng: String,
    pub location: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_friend_is_idempotent() {
        let mut user = User::new("Ana");
        let friend = UserId::new();

        assert!(user.add_friend(friend));
        let after_first = user.clone();

        assert!(!user.add_friend(friend));
        assert_eq!(user, after_first);
        assert_eq!(user.friend_ids.len(), 1);
    }

    #[test]
    fn matches_query_is_case_insensitive() {
        let user = User::new("Ana Lima")
            .with_languages("portuguese", "english")
            .with_location("Lisbon");

        assert!(user.matches_query("ana"));
        assert!(user.matches_query("ENGLISH"));
        assert!(user.matches_query("lisb"));
        assert!(!user.matches_query("tokyo"));
    }

    #[test]
    fn blank_query_matches_everyone() {
        let user = User::new("Ana");
        assert!(user.matches_query(""));
        assert!(user.matches_query("   "));
    }

    #[test]
    fn friend_ids_serialize_as_array() {
        let mut user = User::new("Ana");
        let friend = UserId::new();
        user.add_friend(friend);

        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["friend_ids"], serde_json::json!([friend.to_string()]));
    }

    #[test]
    fn summary_hides_private_fields() {
        let user = User::new("Ana").with_email("ana@example.com");
        let value = serde_json::to_value(user.summary()).unwrap();
        assert!(value.get("email").is_none());
        assert!(value.get("friend_ids").is_none());
        assert_eq!(value["full_name"], "Ana");
    }
}

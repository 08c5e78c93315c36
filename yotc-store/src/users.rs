//! User profiles.

use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Value};
use yotc_core::validate::validate_profile;
use yotc_core::{User, UserId, UserProfile};

use crate::backend::DocumentStore;
use crate::codec::{self, decode_all, into_document};
use crate::error::StoreError;
use crate::paths;
use crate::query::Query;

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn DocumentStore>,
}

impl UserService {
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Loads a user. Partially written profiles decode with defaults.
    ///
    /// # Errors
    /// Store failures.
    pub async fn get_user(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        codec::load(self.store.as_ref(), &paths::user(id)).await
    }

    /// Writes the user's own profile fields, creating the record on first
    /// save. The admin flag is only ever set on creation, to `false`.
    ///
    /// # Errors
    /// [`yotc_core::CoreError::Validation`] for an invalid profile.
    pub async fn save_user(&self, id: &UserId, profile: UserProfile) -> Result<User, StoreError> {
        validate_profile(&profile)?;
        let path = paths::user(id);
        let now = Utc::now();
        let mut patch = into_document(json!({
            "name": profile.name.trim(),
            "callsign": profile.callsign.trim().to_uppercase(),
            "updatedAt": now,
        }))?;
        if let Some(email) = profile.email {
            patch.insert("email".to_owned(), Value::String(email));
        }

        if self.store.get(&path).await?.is_some() {
            self.store.update(&path, patch).await?;
        } else {
            patch.insert("isAdmin".to_owned(), Value::Bool(false));
            patch.insert("createdAt".to_owned(), json!(now));
            patch.entry("email").or_insert_with(|| Value::String(String::new()));
            self.store.set(&path, patch).await?;
            tracing::info!(user_id = %id, "user registered");
        }
        codec::require(self.store.as_ref(), &path).await
    }

    /// Users flagged as administrators, by name. Admins without a stored
    /// name sort first.
    ///
    /// # Errors
    /// Store failures.
    pub async fn admins(&self) -> Result<Vec<User>, StoreError> {
        let q = Query::collection(paths::USERS).where_eq("isAdmin", true);
        let mut admins: Vec<User> = decode_all(self.store.query(&q).await?);
        admins.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(admins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    fn profile(name: &str) -> UserProfile {
        UserProfile { name: name.to_owned(), callsign: "w0jd".to_owned(), email: None }
    }

    #[tokio::test]
    async fn first_save_creates_non_admin() {
        let svc = UserService::new(Arc::new(MemoryStore::new()));
        let user = match svc.save_user(&UserId::new("u1"), profile("Jane Doe")).await {
            Ok(u) => u,
            Err(e) => panic!("save failed: {e}"),
        };
        assert!(!user.is_admin);
        assert_eq!(user.callsign, "W0JD");
        assert!(user.is_profile_complete());
    }

    #[tokio::test]
    async fn profile_saves_never_touch_admin_flag() {
        let store = Arc::new(MemoryStore::new());
        let seeded = into_document(json!({"name": "Root", "isAdmin": true, "createdAt": "2024-01-01T00:00:00Z"}));
        match seeded {
            Ok(doc) => assert!(store.set("users/root", doc).await.is_ok()),
            Err(e) => panic!("seed failed: {e}"),
        }
        let svc = UserService::new(store);
        let user = match svc.save_user(&UserId::new("root"), profile("Root User")).await {
            Ok(u) => u,
            Err(e) => panic!("save failed: {e}"),
        };
        assert!(user.is_admin);
        assert_eq!(user.name, "Root User");
        assert_eq!(svc.admins().await.map(|a| a.len()).ok(), Some(1));
    }

    #[tokio::test]
    async fn invalid_profile_is_not_written() {
        let svc = UserService::new(Arc::new(MemoryStore::new()));
        let result = svc.save_user(&UserId::new("u1"), profile("")).await;
        assert!(matches!(result, Err(StoreError::Core(yotc_core::CoreError::Validation(_)))));
        assert!(matches!(svc.get_user(&UserId::new("u1")).await, Ok(None)));
    }
}

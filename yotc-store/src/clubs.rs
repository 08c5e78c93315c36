//! Club directory: suggestions, approval, edits and logos.

use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Value};
use yotc_core::slug::generate_slug_from_name;
use yotc_core::validate::{validate_club_suggestion, validate_club_update, validate_logo, validate_slug};
use yotc_core::{Club, ClubId, ClubSuggestion, ClubUpdate, Principal, UserId};

use crate::backend::DocumentStore;
use crate::blob::{club_logo_path, sanitize_filename, BlobStorage};
use crate::codec::{self, decode_all, encode, into_document};
use crate::error::StoreError;
use crate::paths;
use crate::query::{Direction, Query};

/// Reads, creates and edits clubs.
#[derive(Clone)]
pub struct ClubService {
    store: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobStorage>,
}

impl ClubService {
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, blobs: Arc<dyn BlobStorage>) -> Self {
        Self { store, blobs }
    }

    /// Active clubs, ordered by name.
    ///
    /// # Errors
    /// Store failures.
    pub async fn active_clubs(&self) -> Result<Vec<Club>, StoreError> {
        let q = Query::collection(paths::CLUBS)
            .where_eq("isActive", true)
            .order_by("name", Direction::Ascending);
        Ok(decode_all(self.store.query(&q).await?))
    }

    /// Every club including unapproved suggestions, ordered by name.
    ///
    /// # Errors
    /// [`yotc_core::CoreError::Forbidden`] for non-admins; store failures.
    pub async fn all_clubs(&self, principal: &Principal) -> Result<Vec<Club>, StoreError> {
        principal.ensure(principal.can_review_suggestions(), "list all clubs")?;
        let q = Query::collection(paths::CLUBS).order_by("name", Direction::Ascending);
        Ok(decode_all(self.store.query(&q).await?))
    }

    /// Suggestions awaiting review, newest first.
    ///
    /// # Errors
    /// [`yotc_core::CoreError::Forbidden`] for non-admins; store failures.
    pub async fn pending_clubs(&self, principal: &Principal) -> Result<Vec<Club>, StoreError> {
        principal.ensure(principal.can_review_suggestions(), "review club suggestions")?;
        let q = Query::collection(paths::CLUBS)
            .where_eq("isActive", false)
            .order_by("createdAt", Direction::Descending);
        Ok(decode_all(self.store.query(&q).await?))
    }

    /// # Errors
    /// Store failures.
    pub async fn club_by_id(&self, id: &ClubId) -> Result<Option<Club>, StoreError> {
        codec::load(self.store.as_ref(), &paths::club(id)).await
    }

    /// The first club carrying `slug`. Blank slugs never match.
    ///
    /// # Errors
    /// Store failures.
    pub async fn club_by_slug(&self, slug: &str) -> Result<Option<Club>, StoreError> {
        if slug.is_empty() {
            return Ok(None);
        }
        let q = Query::collection(paths::CLUBS).where_eq("slug", slug);
        Ok(decode_all(self.store.query(&q).await?).into_iter().next())
    }

    /// Resolves a route key that may be a slug or a document ID, slug first.
    ///
    /// # Errors
    /// Store failures.
    pub async fn club_by_slug_or_id(&self, key: &str) -> Result<Option<Club>, StoreError> {
        if let Some(club) = self.club_by_slug(key).await? {
            return Ok(Some(club));
        }
        if key.is_empty() || key.contains('/') {
            return Ok(None);
        }
        self.club_by_id(&ClubId::new(key)).await
    }

    /// Records a user's suggestion as an inactive club for admin review.
    ///
    /// # Errors
    /// [`yotc_core::CoreError::Validation`] for bad input; store failures.
    pub async fn suggest_club(
        &self,
        suggestion: ClubSuggestion,
        principal: &Principal,
    ) -> Result<Club, StoreError> {
        validate_club_suggestion(&suggestion)?;
        let club = Club::suggested(ClubId::generate(), suggestion, principal.user_id.clone(), Utc::now());
        self.store.set(&paths::club(&club.id), encode(&club)?).await?;
        tracing::info!(club_id = %club.id, user_id = %principal.user_id, "club suggested");
        Ok(club)
    }

    /// Activates a suggested club, assigning it a slug.
    ///
    /// With no `slug` the club keeps the one it has, or gets one generated
    /// from its name with a numeric suffix if needed to stay unique.
    ///
    /// # Errors
    /// [`yotc_core::CoreError::Forbidden`] for non-admins,
    /// [`StoreError::NotFound`], [`StoreError::Conflict`] if the club is
    /// already active or the slug is taken.
    pub async fn approve_club(
        &self,
        principal: &Principal,
        id: &ClubId,
        slug: Option<String>,
    ) -> Result<Club, StoreError> {
        principal.ensure(principal.can_review_suggestions(), "approve clubs")?;
        let path = paths::club(id);
        let club: Club = codec::require(self.store.as_ref(), &path).await?;
        if club.is_active {
            return Err(StoreError::Conflict(format!("club {id} is already active")));
        }

        let slug = match slug {
            Some(slug) => {
                validate_slug(&slug)?;
                if self.slug_taken(&slug, id).await? {
                    return Err(StoreError::Conflict(format!("slug '{slug}' is already in use")));
                }
                slug
            }
            None => match club.slug() {
                Some(existing) => existing.to_owned(),
                None => self.unique_generated_slug(&club).await?,
            },
        };

        let patch = into_document(json!({
            "isActive": true,
            "slug": slug,
            "updatedAt": Utc::now(),
        }))?;
        self.store.update(&path, patch).await?;
        tracing::info!(club_id = %id, slug = %slug, "club approved");
        codec::require(self.store.as_ref(), &path).await
    }

    /// Permanently removes a suggestion. Active clubs cannot be rejected.
    ///
    /// # Errors
    /// [`yotc_core::CoreError::Forbidden`] for non-admins,
    /// [`StoreError::NotFound`], [`StoreError::Conflict`] for active clubs.
    pub async fn reject_club(&self, principal: &Principal, id: &ClubId) -> Result<(), StoreError> {
        principal.ensure(principal.can_review_suggestions(), "reject clubs")?;
        let path = paths::club(id);
        let club: Club = codec::require(self.store.as_ref(), &path).await?;
        if club.is_active {
            return Err(StoreError::Conflict(format!("club {id} is active and cannot be rejected")));
        }
        self.store.delete(&path).await?;
        tracing::info!(club_id = %id, "club suggestion rejected");
        Ok(())
    }

    /// Applies a partial edit to a club's details.
    ///
    /// # Errors
    /// [`yotc_core::CoreError::Forbidden`] unless admin or leader,
    /// [`yotc_core::CoreError::Validation`], [`StoreError::NotFound`],
    /// [`StoreError::Conflict`] when changing an active club's slug or
    /// choosing a slug already in use.
    pub async fn update_club(
        &self,
        principal: &Principal,
        id: &ClubId,
        update: ClubUpdate,
    ) -> Result<Club, StoreError> {
        let path = paths::club(id);
        let club: Club = codec::require(self.store.as_ref(), &path).await?;
        principal.ensure(principal.can_manage_club(&club), "edit this club")?;
        validate_club_update(&update)?;
        if update.is_empty() {
            return Ok(club);
        }

        if let Some(slug) = &update.slug {
            if club.slug() != Some(slug.as_str()) {
                if club.is_active && club.slug().is_some() {
                    return Err(StoreError::Conflict(
                        "the slug of an active club cannot be changed".to_owned(),
                    ));
                }
                if self.slug_taken(slug, id).await? {
                    return Err(StoreError::Conflict(format!("slug '{slug}' is already in use")));
                }
            }
        }

        let mut patch = encode(&update)?;
        if let Some(Value::String(website)) = patch.get("website") {
            if website.trim().is_empty() {
                patch.insert("website".to_owned(), Value::Null);
            }
        }
        patch.insert("updatedAt".to_owned(), json!(Utc::now()));
        self.store.update(&path, patch).await?;
        tracing::info!(club_id = %id, user_id = %principal.user_id, "club updated");
        codec::require(self.store.as_ref(), &path).await
    }

    /// Replaces the club's leader list. Used by role transitions.
    ///
    /// # Errors
    /// [`StoreError::NotFound`] if the club does not exist.
    pub async fn set_leader_ids(&self, id: &ClubId, leader_ids: &[UserId]) -> Result<(), StoreError> {
        write_leader_ids(self.store.as_ref(), id, leader_ids).await
    }

    /// Stores a new logo and points the club at it. Any previous logo blob
    /// is removed afterwards on a best-effort basis.
    ///
    /// # Errors
    /// [`yotc_core::CoreError::Forbidden`] unless admin or leader,
    /// [`yotc_core::CoreError::Validation`] for non-image or oversized
    /// files, [`StoreError::NotFound`], blob storage failures.
    pub async fn upload_logo(
        &self,
        principal: &Principal,
        id: &ClubId,
        filename: &str,
        bytes: &[u8],
    ) -> Result<Club, StoreError> {
        let path = paths::club(id);
        let club: Club = codec::require(self.store.as_ref(), &path).await?;
        principal.ensure(principal.can_manage_club(&club), "change this club's logo")?;
        let filename = sanitize_filename(filename)?;
        validate_logo(&filename, bytes.len())?;

        let now = Utc::now();
        let blob = self
            .blobs
            .put(&club_logo_path(id, now.timestamp_millis(), &filename), bytes)
            .await?;
        let patch = into_document(json!({
            "logoUrl": blob.download_url,
            "logoPath": blob.path,
            "updatedAt": now,
        }))?;
        self.store.update(&path, patch).await?;
        tracing::info!(club_id = %id, path = %blob.path, "club logo uploaded");

        if let Some(old) = club.logo_path.filter(|old| *old != blob.path) {
            self.discard_blob(&old).await;
        }
        codec::require(self.store.as_ref(), &path).await
    }

    /// Clears the club's logo.
    ///
    /// # Errors
    /// [`yotc_core::CoreError::Forbidden`] unless admin or leader,
    /// [`StoreError::NotFound`].
    pub async fn remove_logo(&self, principal: &Principal, id: &ClubId) -> Result<Club, StoreError> {
        let path = paths::club(id);
        let club: Club = codec::require(self.store.as_ref(), &path).await?;
        principal.ensure(principal.can_manage_club(&club), "change this club's logo")?;
        let patch = into_document(json!({
            "logoUrl": Value::Null,
            "logoPath": Value::Null,
            "updatedAt": Utc::now(),
        }))?;
        self.store.update(&path, patch).await?;
        if let Some(old) = &club.logo_path {
            self.discard_blob(old).await;
        }
        codec::require(self.store.as_ref(), &path).await
    }

    async fn discard_blob(&self, path: &str) {
        if let Err(e) = self.blobs.delete(path).await {
            tracing::warn!(path, error = %e, "failed to delete old logo");
        }
    }

    async fn slug_taken(&self, slug: &str, except: &ClubId) -> Result<bool, StoreError> {
        let q = Query::collection(paths::CLUBS).where_eq("slug", slug);
        Ok(self.store.query(&q).await?.iter().any(|snap| snap.id != except.as_str()))
    }

    async fn unique_generated_slug(&self, club: &Club) -> Result<String, StoreError> {
        let base: String = generate_slug_from_name(&club.name)
            .chars()
            .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
            .collect();
        validate_slug(&base)?;
        let mut candidate = base.clone();
        let mut n = 2u32;
        while self.slug_taken(&candidate, &club.id).await? {
            candidate = format!("{base}-{n}");
            n += 1;
        }
        Ok(candidate)
    }
}

/// Overwrites `leaderIds` on a club document.
pub(crate) async fn write_leader_ids(
    store: &dyn DocumentStore,
    id: &ClubId,
    leader_ids: &[UserId],
) -> Result<(), StoreError> {
    let patch = into_document(json!({
        "leaderIds": leader_ids,
        "updatedAt": Utc::now(),
    }))?;
    store.update(&paths::club(id), patch).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::LocalBlobStorage;
    use crate::memory::MemoryStore;

    fn service() -> ClubService {
        ClubService::new(
            Arc::new(MemoryStore::new()),
            Arc::new(LocalBlobStorage::new("/tmp/yotc-unused", "http://localhost/blobs")),
        )
    }

    fn suggestion(name: &str) -> ClubSuggestion {
        ClubSuggestion {
            name: name.to_owned(),
            callsign: "W0TX".to_owned(),
            description: "Serving the Denver metro since 1917.".to_owned(),
            location: "Denver, CO".to_owned(),
            website: None,
        }
    }

    async fn suggest(svc: &ClubService, name: &str) -> Club {
        match svc.suggest_club(suggestion(name), &Principal::user("u1")).await {
            Ok(c) => c,
            Err(e) => panic!("suggest failed: {e}"),
        }
    }

    #[tokio::test]
    async fn suggested_clubs_stay_hidden_until_approved() {
        let svc = service();
        let club = suggest(&svc, "Denver Radio Club").await;
        assert!(matches!(svc.active_clubs().await.as_deref(), Ok([])));

        let approved = match svc.approve_club(&Principal::admin("root"), &club.id, None).await {
            Ok(c) => c,
            Err(e) => panic!("approve failed: {e}"),
        };
        assert!(approved.is_active);
        assert_eq!(approved.slug(), Some("drc"));
        assert_eq!(svc.active_clubs().await.map(|c| c.len()).ok(), Some(1));
    }

    #[tokio::test]
    async fn generated_slugs_get_numeric_suffix_on_collision() {
        let svc = service();
        let admin = Principal::admin("root");
        let a = suggest(&svc, "Denver Radio Club").await;
        let b = suggest(&svc, "Durango Repeater Crew").await;
        assert!(svc.approve_club(&admin, &a.id, None).await.is_ok());
        let b = match svc.approve_club(&admin, &b.id, None).await {
            Ok(c) => c,
            Err(e) => panic!("approve failed: {e}"),
        };
        assert_eq!(b.slug(), Some("drc-2"));
    }

    #[tokio::test]
    async fn explicit_duplicate_slug_is_conflict() {
        let svc = service();
        let admin = Principal::admin("root");
        let a = suggest(&svc, "Denver Radio Club").await;
        let b = suggest(&svc, "Boulder Amateur Radio Club").await;
        assert!(svc.approve_club(&admin, &a.id, Some("denver".to_owned())).await.is_ok());
        let result = svc.approve_club(&admin, &b.id, Some("denver".to_owned())).await;
        assert!(matches!(result, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn only_admins_review_suggestions() {
        let svc = service();
        let club = suggest(&svc, "Denver Radio Club").await;
        let user = Principal::user("u1");
        assert!(matches!(
            svc.approve_club(&user, &club.id, None).await,
            Err(StoreError::Core(yotc_core::CoreError::Forbidden { .. }))
        ));
        assert!(svc.pending_clubs(&user).await.is_err());
        assert_eq!(svc.pending_clubs(&Principal::admin("root")).await.map(|c| c.len()).ok(), Some(1));
    }

    #[tokio::test]
    async fn active_clubs_cannot_be_rejected() {
        let svc = service();
        let admin = Principal::admin("root");
        let club = suggest(&svc, "Denver Radio Club").await;
        assert!(svc.approve_club(&admin, &club.id, None).await.is_ok());
        assert!(matches!(svc.reject_club(&admin, &club.id).await, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn rejected_suggestion_is_gone() {
        let svc = service();
        let admin = Principal::admin("root");
        let club = suggest(&svc, "Denver Radio Club").await;
        assert!(svc.reject_club(&admin, &club.id).await.is_ok());
        assert!(matches!(svc.club_by_id(&club.id).await, Ok(None)));
    }

    #[tokio::test]
    async fn active_slug_is_immutable_and_website_can_be_cleared() {
        let svc = service();
        let admin = Principal::admin("root");
        let mut s = suggestion("Denver Radio Club");
        s.website = Some("https://w0tx.org".to_owned());
        let club = match svc.suggest_club(s, &Principal::user("u1")).await {
            Ok(c) => c,
            Err(e) => panic!("suggest failed: {e}"),
        };
        assert!(svc.approve_club(&admin, &club.id, None).await.is_ok());

        let rename = ClubUpdate { slug: Some("denver".to_owned()), ..ClubUpdate::default() };
        assert!(matches!(
            svc.update_club(&admin, &club.id, rename).await,
            Err(StoreError::Conflict(_))
        ));

        let clear = ClubUpdate { website: Some(String::new()), ..ClubUpdate::default() };
        let updated = match svc.update_club(&admin, &club.id, clear).await {
            Ok(c) => c,
            Err(e) => panic!("update failed: {e}"),
        };
        assert!(updated.website.is_none());
    }

    #[tokio::test]
    async fn lookup_by_slug_falls_back_to_id() {
        let svc = service();
        let club = suggest(&svc, "Denver Radio Club").await;
        assert!(svc.approve_club(&Principal::admin("root"), &club.id, None).await.is_ok());
        let by_slug = svc.club_by_slug_or_id("drc").await.ok().flatten().map(|c| c.id);
        let by_id = svc.club_by_slug_or_id(club.id.as_str()).await.ok().flatten().map(|c| c.id);
        assert_eq!(by_slug, Some(club.id.clone()));
        assert_eq!(by_id, Some(club.id));
        assert!(matches!(svc.club_by_slug_or_id("nope").await, Ok(None)));
    }
}

//! Axum route handlers for the Year Of The Club API.

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, patch, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use yotc_core::{
    ClubId, ClubSuggestion, ClubUpdate, EventDraft, EventId, EventUpdate, LogId, User, UserId,
    UserProfile,
};
use yotc_store::Clubhouse;

use crate::{
    auth::Caller,
    config::GatewayConfig,
    error::{GatewayError, ResultExt},
    extract::{JsonBody, PathParams, QueryParams, RawBody},
};

// ── Shared state ─────────────────────────────────────────────────────────────

type Hub = Arc<Clubhouse>;

// ── Request / response types ──────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ApproveClubBody {
    #[serde(default)]
    pub slug: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UploadParams {
    pub filename: String,
}

#[derive(Debug, Deserialize)]
pub struct MembershipFilter {
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub user: Option<User>,
    pub profile_complete: bool,
}

#[derive(Debug, Serialize)]
pub struct RsvpState {
    pub attending: bool,
}

// ── Router ────────────────────────────────────────────────────────────────────

/// Build the application router. Uploaded files are served from
/// `config.blob_dir` under `/blobs`.
pub fn create_router(hub: Hub, config: &GatewayConfig) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/me", get(get_me).put(save_me))
        .route("/v1/me/memberships", get(my_memberships))
        .route("/v1/me/rsvps", get(my_rsvps))
        .route("/v1/admins", get(admins))
        .route("/v1/users/{user}", get(get_user))
        .route("/v1/clubs", get(active_clubs).post(suggest_club))
        .route("/v1/clubs/all", get(all_clubs))
        .route("/v1/clubs/pending", get(pending_clubs))
        .route("/v1/clubs/{club}", get(get_club).patch(update_club).delete(reject_club))
        .route("/v1/clubs/{club}/approve", post(approve_club))
        .route("/v1/clubs/{club}/logo", put(upload_logo).delete(remove_logo))
        .route("/v1/clubs/{club}/roster", get(roster))
        .route("/v1/clubs/{club}/memberships", get(club_memberships).post(apply))
        .route("/v1/clubs/{club}/memberships/me", get(my_membership).delete(leave_club))
        .route("/v1/clubs/{club}/memberships/{user}/{action}", post(membership_action))
        .route("/v1/events", get(all_events))
        .route("/v1/clubs/{club}/events", get(club_events).post(create_event))
        .route("/v1/clubs/{club}/events/{event}", patch(update_event).delete(delete_event))
        .route("/v1/clubs/{club}/events/{event}/rsvps", get(attendees))
        .route("/v1/clubs/{club}/events/{event}/rsvps/me", put(rsvp).delete(withdraw_rsvp))
        .route("/v1/clubs/{club}/events/{event}/rsvps/me/toggle", post(toggle_rsvp))
        .route("/v1/clubs/{club}/events/{event}/logs", get(event_logs).post(upload_log))
        .route("/v1/clubs/{club}/events/{event}/logs/{log}", delete(delete_log))
        .with_state(hub)
        .nest_service("/blobs", ServeDir::new(config.blob_dir.clone()))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Path segments become document IDs, so they must not contain `/`.
fn id<T: From<String>>(raw: String) -> Result<T, GatewayError> {
    if raw.is_empty() || raw.contains('/') {
        return Err(GatewayError::InvalidRequest(format!("invalid id '{raw}'")));
    }
    Ok(T::from(raw))
}

// ── Handlers: profile ─────────────────────────────────────────────────────────

/// `GET /health` — liveness probe.
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({"status": "ok"})))
}

/// `GET /v1/me` — the caller's profile and whether it is complete.
pub async fn get_me(State(hub): State<Hub>, Caller(me): Caller) -> Result<Json<MeResponse>, GatewayError> {
    let user = hub.users().get_user(&me.user_id).await.during("load profile")?;
    let profile_complete = user.as_ref().is_some_and(User::is_profile_complete);
    Ok(Json(MeResponse { user, profile_complete }))
}

/// `PUT /v1/me` — save the caller's profile.
pub async fn save_me(
    State(hub): State<Hub>,
    Caller(me): Caller,
    JsonBody(profile): JsonBody<UserProfile>,
) -> Result<Json<User>, GatewayError> {
    let user = hub.users().save_user(&me.user_id, profile).await.during("save profile")?;
    Ok(Json(user))
}

/// `GET /v1/me/memberships`
pub async fn my_memberships(State(hub): State<Hub>, Caller(me): Caller) -> Result<impl IntoResponse, GatewayError> {
    let memberships = hub.memberships().user_memberships(&me.user_id).await.during("load memberships")?;
    Ok(Json(memberships))
}

/// `GET /v1/me/rsvps` — events the caller RSVP'd to, with their clubs.
pub async fn my_rsvps(State(hub): State<Hub>, Caller(me): Caller) -> Result<impl IntoResponse, GatewayError> {
    let events = hub.rsvps().rsvped_events(&me.user_id).await.during("load events")?;
    Ok(Json(events))
}

/// `GET /v1/users/{user}`
pub async fn get_user(
    State(hub): State<Hub>,
    Caller(_): Caller,
    PathParams(user): PathParams<String>,
) -> Result<Json<User>, GatewayError> {
    let user: UserId = id(user)?;
    hub.users()
        .get_user(&user)
        .await
        .during("load user")?
        .map(Json)
        .ok_or(GatewayError::NotFound("user"))
}

/// `GET /v1/admins` — section administrators, for contact lists.
pub async fn admins(State(hub): State<Hub>, Caller(_): Caller) -> Result<impl IntoResponse, GatewayError> {
    Ok(Json(hub.users().admins().await.during("load admins")?))
}

// ── Handlers: clubs ───────────────────────────────────────────────────────────

/// `GET /v1/clubs` — active clubs.
pub async fn active_clubs(State(hub): State<Hub>) -> Result<impl IntoResponse, GatewayError> {
    Ok(Json(hub.clubs().active_clubs().await.during("load clubs")?))
}

/// `GET /v1/clubs/all` — every club, admin only.
pub async fn all_clubs(State(hub): State<Hub>, Caller(me): Caller) -> Result<impl IntoResponse, GatewayError> {
    Ok(Json(hub.clubs().all_clubs(&me).await.during("load clubs")?))
}

/// `GET /v1/clubs/pending` — suggestions awaiting review, admin only.
pub async fn pending_clubs(State(hub): State<Hub>, Caller(me): Caller) -> Result<impl IntoResponse, GatewayError> {
    Ok(Json(hub.clubs().pending_clubs(&me).await.during("load club suggestions")?))
}

/// `POST /v1/clubs` — suggest a new club.
pub async fn suggest_club(
    State(hub): State<Hub>,
    Caller(me): Caller,
    JsonBody(suggestion): JsonBody<ClubSuggestion>,
) -> Result<impl IntoResponse, GatewayError> {
    let club = hub.clubs().suggest_club(suggestion, &me).await.during("suggest club")?;
    Ok((StatusCode::CREATED, Json(club)))
}

/// `GET /v1/clubs/{slug_or_id}`
pub async fn get_club(State(hub): State<Hub>, PathParams(key): PathParams<String>) -> Result<impl IntoResponse, GatewayError> {
    hub.clubs()
        .club_by_slug_or_id(&key)
        .await
        .during("load club")?
        .map(Json)
        .ok_or(GatewayError::NotFound("club"))
}

/// `PATCH /v1/clubs/{club}`
pub async fn update_club(
    State(hub): State<Hub>,
    Caller(me): Caller,
    PathParams(club): PathParams<String>,
    JsonBody(update): JsonBody<ClubUpdate>,
) -> Result<impl IntoResponse, GatewayError> {
    let club: ClubId = id(club)?;
    Ok(Json(hub.clubs().update_club(&me, &club, update).await.during("update club")?))
}

/// `DELETE /v1/clubs/{club}` — reject a suggestion.
pub async fn reject_club(
    State(hub): State<Hub>,
    Caller(me): Caller,
    PathParams(club): PathParams<String>,
) -> Result<impl IntoResponse, GatewayError> {
    let club: ClubId = id(club)?;
    hub.clubs().reject_club(&me, &club).await.during("reject club")?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /v1/clubs/{club}/approve` — optional body `{"slug": "..."}`.
pub async fn approve_club(
    State(hub): State<Hub>,
    Caller(me): Caller,
    PathParams(club): PathParams<String>,
    RawBody(body): RawBody,
) -> Result<impl IntoResponse, GatewayError> {
    let club: ClubId = id(club)?;
    let body: ApproveClubBody = if body.is_empty() {
        ApproveClubBody::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| GatewayError::InvalidRequest(e.to_string()))?
    };
    Ok(Json(hub.clubs().approve_club(&me, &club, body.slug).await.during("approve club")?))
}

/// `PUT /v1/clubs/{club}/logo?filename=` — raw image body.
pub async fn upload_logo(
    State(hub): State<Hub>,
    Caller(me): Caller,
    PathParams(club): PathParams<String>,
    QueryParams(params): QueryParams<UploadParams>,
    RawBody(body): RawBody,
) -> Result<impl IntoResponse, GatewayError> {
    let club: ClubId = id(club)?;
    let updated = hub
        .clubs()
        .upload_logo(&me, &club, &params.filename, &body)
        .await
        .during("upload logo")?;
    Ok(Json(updated))
}

/// `DELETE /v1/clubs/{club}/logo`
pub async fn remove_logo(
    State(hub): State<Hub>,
    Caller(me): Caller,
    PathParams(club): PathParams<String>,
) -> Result<impl IntoResponse, GatewayError> {
    let club: ClubId = id(club)?;
    Ok(Json(hub.clubs().remove_logo(&me, &club).await.during("remove logo")?))
}

// ── Handlers: memberships ─────────────────────────────────────────────────────

/// `GET /v1/clubs/{club}/memberships?status=pending|active`
pub async fn club_memberships(
    State(hub): State<Hub>,
    Caller(me): Caller,
    PathParams(club): PathParams<String>,
    QueryParams(filter): QueryParams<MembershipFilter>,
) -> Result<impl IntoResponse, GatewayError> {
    let club: ClubId = id(club)?;
    let memberships = match filter.status.as_deref() {
        Some("pending") => hub
            .memberships()
            .pending_memberships(&me, &club)
            .await
            .during("load pending membership requests")?,
        None | Some("active") => hub.memberships().active_members(&club).await.during("load members")?,
        Some(other) => {
            return Err(GatewayError::InvalidRequest(format!(
                "unsupported status '{other}'; expected 'pending' or 'active'"
            )))
        }
    };
    Ok(Json(memberships))
}

/// `GET /v1/clubs/{club}/roster`
pub async fn roster(
    State(hub): State<Hub>,
    Caller(me): Caller,
    PathParams(club): PathParams<String>,
) -> Result<impl IntoResponse, GatewayError> {
    let club: ClubId = id(club)?;
    Ok(Json(hub.memberships().roster(&me, &club).await.during("load roster")?))
}

/// `POST /v1/clubs/{club}/memberships` — apply to join.
pub async fn apply(
    State(hub): State<Hub>,
    Caller(me): Caller,
    PathParams(club): PathParams<String>,
) -> Result<impl IntoResponse, GatewayError> {
    let club: ClubId = id(club)?;
    let membership = hub.memberships().apply(&me, &club).await.during("apply for membership")?;
    Ok((StatusCode::CREATED, Json(membership)))
}

/// `GET /v1/clubs/{club}/memberships/me`
pub async fn my_membership(
    State(hub): State<Hub>,
    Caller(me): Caller,
    PathParams(club): PathParams<String>,
) -> Result<impl IntoResponse, GatewayError> {
    let club: ClubId = id(club)?;
    hub.memberships()
        .existing_membership(&me.user_id, &club)
        .await
        .map(Json)
        .ok_or(GatewayError::NotFound("membership"))
}

/// `DELETE /v1/clubs/{club}/memberships/me` — leave the club.
pub async fn leave_club(
    State(hub): State<Hub>,
    Caller(me): Caller,
    PathParams(club): PathParams<String>,
) -> Result<impl IntoResponse, GatewayError> {
    let club: ClubId = id(club)?;
    let membership = hub
        .memberships()
        .deactivate(&me, &club, &me.user_id)
        .await
        .during("leave club")?;
    Ok(Json(membership))
}

/// `POST /v1/clubs/{club}/memberships/{user}/{approve|deny|promote|demote|revoke}`
pub async fn membership_action(
    State(hub): State<Hub>,
    Caller(me): Caller,
    PathParams((club, user, action)): PathParams<(String, String, String)>,
) -> Result<impl IntoResponse, GatewayError> {
    let club: ClubId = id(club)?;
    let user: UserId = id(user)?;
    let memberships = hub.memberships();
    let membership = match action.as_str() {
        "approve" => memberships.approve(&me, &club, &user).await.during("approve membership")?,
        "deny" => memberships.deny(&me, &club, &user).await.during("deny membership")?,
        "promote" => memberships.promote_to_leader(&me, &club, &user).await.during("promote member")?,
        "demote" => memberships.demote_to_member(&me, &club, &user).await.during("demote member")?,
        "revoke" => memberships.deactivate(&me, &club, &user).await.during("revoke membership")?,
        other => {
            return Err(GatewayError::InvalidRequest(format!("unknown membership action '{other}'")))
        }
    };
    Ok(Json(membership))
}

// ── Handlers: events ──────────────────────────────────────────────────────────

/// `GET /v1/events` — events across all clubs.
pub async fn all_events(State(hub): State<Hub>) -> Result<impl IntoResponse, GatewayError> {
    Ok(Json(hub.events().all_events().await.during("load events")?))
}

/// `GET /v1/clubs/{club}/events`
pub async fn club_events(State(hub): State<Hub>, PathParams(club): PathParams<String>) -> Result<impl IntoResponse, GatewayError> {
    let club: ClubId = id(club)?;
    Ok(Json(hub.events().club_events(&club).await.during("load events")?))
}

/// `POST /v1/clubs/{club}/events`
pub async fn create_event(
    State(hub): State<Hub>,
    Caller(me): Caller,
    PathParams(club): PathParams<String>,
    JsonBody(draft): JsonBody<EventDraft>,
) -> Result<impl IntoResponse, GatewayError> {
    let club: ClubId = id(club)?;
    let event = hub.events().create_event(&me, &club, draft).await.during("add event")?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// `PATCH /v1/clubs/{club}/events/{event}`
pub async fn update_event(
    State(hub): State<Hub>,
    Caller(me): Caller,
    PathParams((club, event)): PathParams<(String, String)>,
    JsonBody(update): JsonBody<EventUpdate>,
) -> Result<impl IntoResponse, GatewayError> {
    let (club, event): (ClubId, EventId) = (id(club)?, id(event)?);
    Ok(Json(hub.events().update_event(&me, &club, &event, update).await.during("update event")?))
}

/// `DELETE /v1/clubs/{club}/events/{event}`
pub async fn delete_event(
    State(hub): State<Hub>,
    Caller(me): Caller,
    PathParams((club, event)): PathParams<(String, String)>,
) -> Result<impl IntoResponse, GatewayError> {
    let (club, event): (ClubId, EventId) = (id(club)?, id(event)?);
    hub.events().delete_event(&me, &club, &event).await.during("delete event")?;
    Ok(StatusCode::NO_CONTENT)
}

// ── Handlers: RSVPs ───────────────────────────────────────────────────────────

/// `GET /v1/clubs/{club}/events/{event}/rsvps` — attendees with display names.
pub async fn attendees(
    State(hub): State<Hub>,
    Caller(_): Caller,
    PathParams((club, event)): PathParams<(String, String)>,
) -> Result<impl IntoResponse, GatewayError> {
    let (club, event): (ClubId, EventId) = (id(club)?, id(event)?);
    Ok(Json(hub.rsvps().attendees(&club, &event).await.during("load attendees")?))
}

/// `PUT /v1/clubs/{club}/events/{event}/rsvps/me`
pub async fn rsvp(
    State(hub): State<Hub>,
    Caller(me): Caller,
    PathParams((club, event)): PathParams<(String, String)>,
) -> Result<impl IntoResponse, GatewayError> {
    let (club, event): (ClubId, EventId) = (id(club)?, id(event)?);
    Ok(Json(hub.rsvps().create_rsvp(&me, &club, &event).await.during("update RSVP")?))
}

/// `DELETE /v1/clubs/{club}/events/{event}/rsvps/me`
pub async fn withdraw_rsvp(
    State(hub): State<Hub>,
    Caller(me): Caller,
    PathParams((club, event)): PathParams<(String, String)>,
) -> Result<impl IntoResponse, GatewayError> {
    let (club, event): (ClubId, EventId) = (id(club)?, id(event)?);
    hub.rsvps().delete_rsvp(&me, &club, &event).await.during("update RSVP")?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /v1/clubs/{club}/events/{event}/rsvps/me/toggle`
pub async fn toggle_rsvp(
    State(hub): State<Hub>,
    Caller(me): Caller,
    PathParams((club, event)): PathParams<(String, String)>,
) -> Result<impl IntoResponse, GatewayError> {
    let (club, event): (ClubId, EventId) = (id(club)?, id(event)?);
    let attending = hub.rsvps().toggle_rsvp(&me, &club, &event).await.during("update RSVP")?;
    Ok(Json(RsvpState { attending }))
}

// ── Handlers: event logs ──────────────────────────────────────────────────────

/// `GET /v1/clubs/{club}/events/{event}/logs`
pub async fn event_logs(
    State(hub): State<Hub>,
    Caller(_): Caller,
    PathParams((club, event)): PathParams<(String, String)>,
) -> Result<impl IntoResponse, GatewayError> {
    let (club, event): (ClubId, EventId) = (id(club)?, id(event)?);
    Ok(Json(hub.logs().event_logs(&club, &event).await.during("load logs")?))
}

/// `POST /v1/clubs/{club}/events/{event}/logs?filename=` — raw file body.
pub async fn upload_log(
    State(hub): State<Hub>,
    Caller(me): Caller,
    PathParams((club, event)): PathParams<(String, String)>,
    QueryParams(params): QueryParams<UploadParams>,
    RawBody(body): RawBody,
) -> Result<impl IntoResponse, GatewayError> {
    let (club, event): (ClubId, EventId) = (id(club)?, id(event)?);
    let log = hub
        .logs()
        .upload_log(&me, &club, &event, &params.filename, &body)
        .await
        .during("upload files")?;
    Ok((StatusCode::CREATED, Json(log)))
}

/// `DELETE /v1/clubs/{club}/events/{event}/logs/{log}`
pub async fn delete_log(
    State(hub): State<Hub>,
    Caller(me): Caller,
    PathParams((club, event, log)): PathParams<(String, String, String)>,
) -> Result<impl IntoResponse, GatewayError> {
    let (club, event, log): (ClubId, EventId, LogId) = (id(club)?, id(event)?, id(log)?);
    hub.logs().delete_log(&me, &club, &event, &log).await.during("delete file")?;
    Ok(StatusCode::NO_CONTENT)
}

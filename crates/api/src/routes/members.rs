//! Member management routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, post, put},
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::AppState;
use crate::error::internal_error;
use splitpot_db::MemberRepository;
use splitpot_db::repositories::{MemberError, UpdateMemberInput};

/// Creates the members router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/groups/{group_id}/members", post(add_member))
        .route("/groups/{group_id}/members/{member_id}", put(update_member))
        .route(
            "/groups/{group_id}/members/{member_id}",
            delete(remove_member),
        )
}

/// Request body for adding or updating a member.
#[derive(Debug, Deserialize)]
pub struct MemberRequest {
    /// Member display name.
    pub name: String,
    /// Bank code, display-only.
    #[serde(default)]
    pub bank_code: Option<String>,
    /// Bank account, display-only.
    #[serde(default)]
    pub bank_account: Option<String>,
}

/// POST `/groups/{group_id}/members` - Add a member to a group.
async fn add_member(
    State(state): State<AppState>,
    Path(group_id): Path<uuid::Uuid>,
    Json(payload): Json<MemberRequest>,
) -> impl IntoResponse {
    let member_repo = MemberRepository::new((*state.db).clone());

    let member = match member_repo
        .add(
            group_id,
            &payload.name,
            payload.bank_code,
            payload.bank_account,
        )
        .await
    {
        Ok(m) => m,
        Err(MemberError::GroupNotFound) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": "not_found",
                    "message": "Group not found"
                })),
            )
                .into_response();
        }
        Err(MemberError::InvalidName) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "invalid_name",
                    "message": "Member name is required"
                })),
            )
                .into_response();
        }
        Err(e) => return internal_error(&e, "Failed to add member"),
    };

    info!(group_id = %group_id, member_id = %member.id, "Member added");

    (StatusCode::CREATED, Json(json!(member))).into_response()
}

/// PUT `/groups/{group_id}/members/{member_id}` - Update a member.
async fn update_member(
    State(state): State<AppState>,
    Path((group_id, member_id)): Path<(uuid::Uuid, i64)>,
    Json(payload): Json<MemberRequest>,
) -> impl IntoResponse {
    let member_repo = MemberRepository::new((*state.db).clone());

    let member = match member_repo
        .update(
            group_id,
            member_id,
            UpdateMemberInput {
                name: payload.name,
                bank_code: payload.bank_code,
                bank_account: payload.bank_account,
            },
        )
        .await
    {
        Ok(m) => m,
        Err(MemberError::NotFound) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": "not_found",
                    "message": "Member not found"
                })),
            )
                .into_response();
        }
        Err(MemberError::InvalidName) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "invalid_name",
                    "message": "Member name is required"
                })),
            )
                .into_response();
        }
        Err(e) => return internal_error(&e, "Failed to update member"),
    };

    info!(group_id = %group_id, member_id = %member_id, "Member updated");

    (StatusCode::OK, Json(json!(member))).into_response()
}

/// DELETE `/groups/{group_id}/members/{member_id}` - Remove a member.
async fn remove_member(
    State(state): State<AppState>,
    Path((group_id, member_id)): Path<(uuid::Uuid, i64)>,
) -> impl IntoResponse {
    let member_repo = MemberRepository::new((*state.db).clone());

    match member_repo.remove(group_id, member_id).await {
        Ok(()) => {}
        Err(MemberError::HasExpenses) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "member_has_expenses",
                    "message": "Cannot delete member with existing expenses"
                })),
            )
                .into_response();
        }
        Err(MemberError::NotFound) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": "not_found",
                    "message": "Member not found"
                })),
            )
                .into_response();
        }
        Err(e) => return internal_error(&e, "Failed to remove member"),
    }

    info!(group_id = %group_id, member_id = %member_id, "Member removed");

    StatusCode::NO_CONTENT.into_response()
}

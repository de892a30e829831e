//! Group management routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::AppState;
use crate::error::internal_error;
use splitpot_db::GroupRepository;
use splitpot_db::repositories::GroupError;

/// Creates the groups router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/groups", post(create_group).get(list_groups))
        .route("/groups/{group_id}", get(get_group))
}

/// Request body for creating a group.
#[derive(Debug, Deserialize)]
pub struct CreateGroupRequest {
    /// Group display name.
    pub name: String,
}

/// POST /groups - Create a new group.
async fn create_group(
    State(state): State<AppState>,
    Json(payload): Json<CreateGroupRequest>,
) -> impl IntoResponse {
    let group_repo = GroupRepository::new((*state.db).clone());

    let group = match group_repo.create(&payload.name).await {
        Ok(g) => g,
        Err(GroupError::InvalidName) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "invalid_name",
                    "message": "Group name is required"
                })),
            )
                .into_response();
        }
        Err(e) => return internal_error(&e, "Failed to create group"),
    };

    info!(group_id = %group.id, "Group created");

    (
        StatusCode::CREATED,
        Json(json!({
            "id": group.id,
            "name": group.name,
            "created_at": group.created_at,
            "updated_at": group.updated_at
        })),
    )
        .into_response()
}

/// GET /groups - List all groups, newest first.
async fn list_groups(State(state): State<AppState>) -> impl IntoResponse {
    let group_repo = GroupRepository::new((*state.db).clone());

    match group_repo.list().await {
        Ok(groups) => (StatusCode::OK, Json(json!(groups))).into_response(),
        Err(e) => internal_error(&e, "Failed to list groups"),
    }
}

/// GET `/groups/{group_id}` - Group details with members and expenses.
async fn get_group(
    State(state): State<AppState>,
    Path(group_id): Path<uuid::Uuid>,
) -> impl IntoResponse {
    let group_repo = GroupRepository::new((*state.db).clone());

    let detail = match group_repo.find_detail(group_id).await {
        Ok(Some(d)) => d,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": "not_found",
                    "message": "Group not found"
                })),
            )
                .into_response();
        }
        Err(e) => return internal_error(&e, "Failed to fetch group"),
    };

    let expenses: Vec<_> = detail
        .expenses
        .iter()
        .map(|e| {
            json!({
                "id": e.expense.id,
                "group_id": e.expense.group_id,
                "payer_member_id": e.expense.payer_member_id,
                "amount": e.expense.amount,
                "description": e.expense.description,
                "created_by_name": e.expense.created_by_name,
                "created_at": e.expense.created_at,
                "splits": e.splits.iter().map(|s| json!({
                    "expense_id": s.expense_id,
                    "member_id": s.member_id,
                    "owed_amount": s.owed_amount
                })).collect::<Vec<_>>()
            })
        })
        .collect();

    (
        StatusCode::OK,
        Json(json!({
            "id": detail.group.id,
            "name": detail.group.name,
            "created_at": detail.group.created_at,
            "updated_at": detail.group.updated_at,
            "members": detail.members,
            "expenses": expenses
        })),
    )
        .into_response()
}

//! Expense management routes.

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
use splitpot_db::ExpenseRepository;
use splitpot_db::repositories::{CreateExpenseInput, ExpenseError, SplitInput};

/// Creates the expenses router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/groups/{group_id}/expenses", post(create_expense))
        .route(
            "/groups/{group_id}/expenses/{expense_id}",
            put(update_expense),
        )
        .route(
            "/groups/{group_id}/expenses/{expense_id}",
            delete(delete_expense),
        )
}

/// One member's share in an expense payload.
#[derive(Debug, Deserialize)]
pub struct SplitRequest {
    /// The owing member.
    pub member_id: i64,
    /// Owed amount in minor units.
    pub owed_amount: i64,
}

/// Request body for creating or replacing an expense.
#[derive(Debug, Deserialize)]
pub struct ExpenseRequest {
    /// The member who paid.
    pub payer_member_id: i64,
    /// Total amount in minor units.
    pub amount: i64,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Display name of whoever recorded the expense.
    #[serde(default)]
    pub created_by_name: Option<String>,
    /// Per-member shares; must sum to `amount`.
    pub splits: Vec<SplitRequest>,
}

impl From<ExpenseRequest> for CreateExpenseInput {
    fn from(payload: ExpenseRequest) -> Self {
        Self {
            payer_member_id: payload.payer_member_id,
            amount: payload.amount,
            description: payload.description,
            created_by_name: payload.created_by_name,
            splits: payload
                .splits
                .into_iter()
                .map(|s| SplitInput {
                    member_id: s.member_id,
                    owed_amount: s.owed_amount,
                })
                .collect(),
        }
    }
}

/// Maps a validation failure to its HTTP error response, or delegates the
/// rest to a 500 with the given log context.
fn expense_error_response(err: &ExpenseError, context: &str) -> axum::response::Response {
    let (status, code) = match err {
        ExpenseError::GroupNotFound | ExpenseError::NotFound => {
            (StatusCode::NOT_FOUND, "not_found")
        }
        ExpenseError::NegativeAmount => (StatusCode::BAD_REQUEST, "negative_amount"),
        ExpenseError::EmptySplits => (StatusCode::BAD_REQUEST, "empty_splits"),
        ExpenseError::DuplicateSplitMember(_) => {
            (StatusCode::BAD_REQUEST, "duplicate_split_member")
        }
        ExpenseError::SplitSumMismatch { .. } => (StatusCode::BAD_REQUEST, "split_sum_mismatch"),
        ExpenseError::UnknownMember(_) => (StatusCode::BAD_REQUEST, "unknown_member"),
        ExpenseError::Database(_) => return internal_error(err, context),
    };

    (
        status,
        Json(json!({
            "error": code,
            "message": err.to_string()
        })),
    )
        .into_response()
}

/// POST `/groups/{group_id}/expenses` - Record an expense with splits.
async fn create_expense(
    State(state): State<AppState>,
    Path(group_id): Path<uuid::Uuid>,
    Json(payload): Json<ExpenseRequest>,
) -> impl IntoResponse {
    let expense_repo = ExpenseRepository::new((*state.db).clone());

    let expense = match expense_repo.create(group_id, payload.into()).await {
        Ok(e) => e,
        Err(e) => return expense_error_response(&e, "Failed to create expense"),
    };

    info!(group_id = %group_id, expense_id = %expense.id, amount = expense.amount, "Expense recorded");

    (StatusCode::CREATED, Json(json!(expense))).into_response()
}

/// PUT `/groups/{group_id}/expenses/{expense_id}` - Replace an expense and
/// its splits.
async fn update_expense(
    State(state): State<AppState>,
    Path((group_id, expense_id)): Path<(uuid::Uuid, i64)>,
    Json(payload): Json<ExpenseRequest>,
) -> impl IntoResponse {
    let expense_repo = ExpenseRepository::new((*state.db).clone());

    let expense = match expense_repo
        .update(group_id, expense_id, payload.into())
        .await
    {
        Ok(e) => e,
        Err(e) => return expense_error_response(&e, "Failed to update expense"),
    };

    info!(group_id = %group_id, expense_id = %expense_id, "Expense updated");

    (StatusCode::OK, Json(json!(expense))).into_response()
}

/// DELETE `/groups/{group_id}/expenses/{expense_id}` - Delete an expense.
async fn delete_expense(
    State(state): State<AppState>,
    Path((group_id, expense_id)): Path<(uuid::Uuid, i64)>,
) -> impl IntoResponse {
    let expense_repo = ExpenseRepository::new((*state.db).clone());

    match expense_repo.delete(group_id, expense_id).await {
        Ok(()) => {}
        Err(e) => return expense_error_response(&e, "Failed to delete expense"),
    }

    info!(group_id = %group_id, expense_id = %expense_id, "Expense deleted");

    StatusCode::NO_CONTENT.into_response()
}

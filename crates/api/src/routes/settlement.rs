//! Settlement plan routes.

use std::collections::HashMap;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::AppState;
use crate::error::internal_error;
use splitpot_core::settlement::Transfer;
use splitpot_db::entities::{members, settlement_status};
use splitpot_db::repositories::{GroupError, SettlementStatusError};
use splitpot_db::{GroupRepository, SettlementStatusRepository};

/// Creates the settlement router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/groups/{group_id}/settlement", get(get_settlement))
        .route(
            "/groups/{group_id}/settlement/toggle",
            post(toggle_settlement),
        )
}

/// One row of the human-readable settlement plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanEntry {
    /// Payer display name, "Unknown" for ids absent from the member list.
    pub from: String,
    /// Receiver display name, "Unknown" for ids absent from the member list.
    pub to: String,
    /// Payer member id.
    pub from_id: i64,
    /// Receiver member id.
    pub to_id: i64,
    /// Transfer amount in minor units.
    pub amount: i64,
    /// Receiver's bank code, when on file.
    pub bank_code: Option<String>,
    /// Receiver's bank account, when on file.
    pub bank_account: Option<String>,
    /// Whether this transfer has been marked as paid.
    pub is_settled: bool,
}

/// Joins calculator output with member names, the receiver's bank fields,
/// and the settled flags.
fn readable_plan(
    member_rows: &[members::Model],
    plan: &[Transfer],
    statuses: &[settlement_status::Model],
) -> Vec<PlanEntry> {
    let members_by_id: HashMap<i64, &members::Model> =
        member_rows.iter().map(|m| (m.id, m)).collect();
    let settled: HashMap<(i64, i64), bool> = statuses
        .iter()
        .map(|s| ((s.from_member_id, s.to_member_id), s.is_settled))
        .collect();

    let name_of = |id: i64| {
        members_by_id
            .get(&id)
            .map_or_else(|| "Unknown".to_string(), |m| m.name.clone())
    };

    plan.iter()
        .map(|t| {
            let from_id = t.from.into_inner();
            let to_id = t.to.into_inner();
            let receiver = members_by_id.get(&to_id);

            PlanEntry {
                from: name_of(from_id),
                to: name_of(to_id),
                from_id,
                to_id,
                amount: t.amount,
                bank_code: receiver.and_then(|m| m.bank_code.clone()),
                bank_account: receiver.and_then(|m| m.bank_account.clone()),
                is_settled: settled.get(&(from_id, to_id)).copied().unwrap_or(false),
            }
        })
        .collect()
}

/// GET `/groups/{group_id}/settlement` - Compute the settlement plan.
async fn get_settlement(
    State(state): State<AppState>,
    Path(group_id): Path<uuid::Uuid>,
) -> impl IntoResponse {
    let group_repo = GroupRepository::new((*state.db).clone());
    let status_repo = SettlementStatusRepository::new((*state.db).clone());

    let snapshot = match group_repo.settlement_snapshot(group_id).await {
        Ok(s) => s,
        Err(GroupError::NotFound) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": "not_found",
                    "message": "Group not found"
                })),
            )
                .into_response();
        }
        Err(e) => return internal_error(&e, "Failed to read settlement snapshot"),
    };

    let statuses = match status_repo.list_by_group(group_id).await {
        Ok(s) => s,
        Err(e) => return internal_error(&e, "Failed to read settlement statuses"),
    };

    let plan = snapshot.settlement_plan();
    let entries = readable_plan(&snapshot.members, &plan, &statuses);

    (
        StatusCode::OK,
        Json(json!({
            "total_expense": snapshot.total_expense(),
            "settlement_plan": entries
        })),
    )
        .into_response()
}

/// Request body for toggling a transfer's settled flag.
#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    /// Payer member id of the transfer.
    pub from_member_id: i64,
    /// Receiver member id of the transfer.
    pub to_member_id: i64,
}

/// POST `/groups/{group_id}/settlement/toggle` - Flip a settled flag.
async fn toggle_settlement(
    State(state): State<AppState>,
    Path(group_id): Path<uuid::Uuid>,
    Json(payload): Json<ToggleRequest>,
) -> impl IntoResponse {
    let status_repo = SettlementStatusRepository::new((*state.db).clone());

    let is_settled = match status_repo
        .toggle(group_id, payload.from_member_id, payload.to_member_id)
        .await
    {
        Ok(v) => v,
        Err(SettlementStatusError::GroupNotFound) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": "not_found",
                    "message": "Group not found"
                })),
            )
                .into_response();
        }
        Err(e) => return internal_error(&e, "Failed to toggle settlement status"),
    };

    info!(
        group_id = %group_id,
        from = payload.from_member_id,
        to = payload.to_member_id,
        is_settled,
        "Settlement status toggled"
    );

    (StatusCode::OK, Json(json!({ "is_settled": is_settled }))).into_response()
}

#[cfg(test)]
mod tests {
    use splitpot_shared::types::MemberId;

    use super::*;

    fn member(id: i64, name: &str, bank_code: Option<&str>) -> members::Model {
        members::Model {
            id,
            group_id: uuid::Uuid::nil(),
            name: name.to_string(),
            bank_code: bank_code.map(ToString::to_string),
            bank_account: bank_code.map(|_| "1234567".to_string()),
            created_at: chrono::Utc::now().into(),
        }
    }

    fn transfer(from: i64, to: i64, amount: i64) -> Transfer {
        Transfer {
            from: MemberId::from_raw(from),
            to: MemberId::from_raw(to),
            amount,
        }
    }

    fn status(from: i64, to: i64, is_settled: bool) -> settlement_status::Model {
        settlement_status::Model {
            group_id: uuid::Uuid::nil(),
            from_member_id: from,
            to_member_id: to,
            is_settled,
            updated_at: chrono::Utc::now().into(),
        }
    }

    #[test]
    fn resolves_names_and_receiver_bank_fields() {
        let members = vec![member(1, "Alice", Some("0001")), member(2, "Bob", None)];
        let plan = vec![transfer(2, 1, 1000)];

        let entries = readable_plan(&members, &plan, &[]);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].from, "Bob");
        assert_eq!(entries[0].to, "Alice");
        assert_eq!(entries[0].amount, 1000);
        assert_eq!(entries[0].bank_code.as_deref(), Some("0001"));
        assert_eq!(entries[0].bank_account.as_deref(), Some("1234567"));
        assert!(!entries[0].is_settled);
    }

    #[test]
    fn falls_back_to_unknown_for_missing_members() {
        let members = vec![member(1, "Alice", None)];
        let plan = vec![transfer(99, 1, 500)];

        let entries = readable_plan(&members, &plan, &[]);

        assert_eq!(entries[0].from, "Unknown");
        assert_eq!(entries[0].from_id, 99);
        assert_eq!(entries[0].to, "Alice");
    }

    #[test]
    fn applies_settled_flags_per_pair() {
        let members = vec![
            member(1, "Alice", None),
            member(2, "Bob", None),
            member(3, "Charlie", None),
        ];
        let plan = vec![transfer(2, 1, 1000), transfer(3, 1, 1000)];
        let statuses = vec![status(2, 1, true), status(1, 2, true)];

        let entries = readable_plan(&members, &plan, &statuses);

        // Only the (2, 1) direction matches the first transfer.
        assert!(entries[0].is_settled);
        assert!(!entries[1].is_settled);
    }
}

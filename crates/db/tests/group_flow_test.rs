//! Integration tests for the group → expense → settlement flow.
//!
//! These run against a migrated Postgres database and skip silently when
//! `DATABASE_URL` is not set, so unit-test runs stay self-contained.

use sea_orm::DatabaseConnection;
use splitpot_db::repositories::{CreateExpenseInput, MemberError, SplitInput};
use splitpot_db::{
    ExpenseRepository, GroupRepository, MemberRepository, SettlementStatusRepository,
};
use splitpot_shared::types::MemberId;

/// Connects to the test database, or returns `None` to skip.
async fn test_db() -> Option<DatabaseConnection> {
    let url = std::env::var("DATABASE_URL").ok()?;
    Some(
        splitpot_db::connect(&url)
            .await
            .expect("Failed to connect to database"),
    )
}

/// Cleanup test group; members, expenses, and splits cascade.
async fn cleanup_group(db: &DatabaseConnection, group_id: uuid::Uuid) {
    use sea_orm::EntityTrait;
    splitpot_db::entities::groups::Entity::delete_by_id(group_id)
        .exec(db)
        .await
        .ok();
}

#[tokio::test]
async fn test_settlement_flow_three_way_split() {
    let Some(db) = test_db().await else {
        eprintln!("DATABASE_URL not set, skipping integration test");
        return;
    };

    let group_repo = GroupRepository::new(db.clone());
    let member_repo = MemberRepository::new(db.clone());
    let expense_repo = ExpenseRepository::new(db.clone());
    let status_repo = SettlementStatusRepository::new(db.clone());

    let group = group_repo
        .create("Trip to Hakone")
        .await
        .expect("Failed to create group");

    let alice = member_repo
        .add(group.id, "Alice", None, None)
        .await
        .expect("Failed to add Alice");
    let bob = member_repo
        .add(group.id, "Bob", None, None)
        .await
        .expect("Failed to add Bob");
    let charlie = member_repo
        .add(group.id, "Charlie", None, None)
        .await
        .expect("Failed to add Charlie");

    expense_repo
        .create(
            group.id,
            CreateExpenseInput {
                payer_member_id: alice.id,
                amount: 3000,
                description: Some("Dinner".to_string()),
                created_by_name: Some("Alice".to_string()),
                splits: vec![
                    SplitInput {
                        member_id: alice.id,
                        owed_amount: 1000,
                    },
                    SplitInput {
                        member_id: bob.id,
                        owed_amount: 1000,
                    },
                    SplitInput {
                        member_id: charlie.id,
                        owed_amount: 1000,
                    },
                ],
            },
        )
        .await
        .expect("Failed to create expense");

    let snapshot = group_repo
        .settlement_snapshot(group.id)
        .await
        .expect("Failed to read snapshot");

    assert_eq!(snapshot.total_expense(), 3000);

    let plan = snapshot.settlement_plan();
    assert_eq!(plan.len(), 2);
    for transfer in &plan {
        assert_eq!(transfer.to, MemberId::from_raw(alice.id));
        assert_eq!(transfer.amount, 1000);
    }

    // Mark the first transfer as paid, then flip it back.
    let first = plan[0];
    let settled = status_repo
        .toggle(group.id, first.from.into_inner(), first.to.into_inner())
        .await
        .expect("Failed to toggle status");
    assert!(settled);

    let settled = status_repo
        .toggle(group.id, first.from.into_inner(), first.to.into_inner())
        .await
        .expect("Failed to toggle status");
    assert!(!settled);

    cleanup_group(&db, group.id).await;
}

#[tokio::test]
async fn test_member_with_expenses_cannot_be_removed() {
    let Some(db) = test_db().await else {
        eprintln!("DATABASE_URL not set, skipping integration test");
        return;
    };

    let group_repo = GroupRepository::new(db.clone());
    let member_repo = MemberRepository::new(db.clone());
    let expense_repo = ExpenseRepository::new(db.clone());

    let group = group_repo
        .create("Flat share")
        .await
        .expect("Failed to create group");

    let payer = member_repo
        .add(group.id, "Payer", None, None)
        .await
        .expect("Failed to add payer");
    let ower = member_repo
        .add(group.id, "Ower", None, None)
        .await
        .expect("Failed to add ower");

    expense_repo
        .create(
            group.id,
            CreateExpenseInput {
                payer_member_id: payer.id,
                amount: 100,
                description: None,
                created_by_name: None,
                splits: vec![SplitInput {
                    member_id: ower.id,
                    owed_amount: 100,
                }],
            },
        )
        .await
        .expect("Failed to create expense");

    let result = member_repo.remove(group.id, payer.id).await;
    assert!(matches!(result, Err(MemberError::HasExpenses)));

    let result = member_repo.remove(group.id, ower.id).await;
    assert!(matches!(result, Err(MemberError::HasExpenses)));

    cleanup_group(&db, group.id).await;
}

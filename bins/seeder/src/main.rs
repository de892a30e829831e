//! Database seeder for Splitpot development and testing.
//!
//! Seeds a demo group with three members and one evenly split expense so
//! the settlement endpoint has something to chew on out of the box.
//!
//! Usage: cargo run --bin seeder

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use splitpot_db::entities::{expense_splits, expenses, groups, members};

/// Demo group ID (consistent for all seeds)
const DEMO_GROUP_ID: &str = "00000000-0000-0000-0000-000000000001";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = splitpot_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding demo group...");
    seed_demo_group(&db).await;

    println!("Seeding complete!");
}

fn demo_group_id() -> Uuid {
    Uuid::parse_str(DEMO_GROUP_ID).unwrap()
}

/// Seeds a demo group with members and one split expense.
async fn seed_demo_group(db: &DatabaseConnection) {
    // Check if the demo group already exists
    if groups::Entity::find_by_id(demo_group_id())
        .one(db)
        .await
        .ok()
        .flatten()
        .is_some()
    {
        println!("  Demo group already exists, skipping...");
        return;
    }

    let now = Utc::now().into();

    let group = groups::ActiveModel {
        id: Set(demo_group_id()),
        name: Set("Weekend Trip".to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    };

    if let Err(e) = group.insert(db).await {
        eprintln!("Failed to insert demo group: {e}");
        return;
    }
    println!("  Created demo group: Weekend Trip");

    let mut member_ids = Vec::new();
    for name in ["Alice", "Bob", "Charlie"] {
        let member = members::ActiveModel {
            group_id: Set(demo_group_id()),
            name: Set(name.to_string()),
            bank_code: Set(None),
            bank_account: Set(None),
            created_at: Set(now),
            ..Default::default()
        };

        match member.insert(db).await {
            Ok(m) => {
                println!("  Created member: {name}");
                member_ids.push(m.id);
            }
            Err(e) => {
                eprintln!("Failed to insert member {name}: {e}");
                return;
            }
        }
    }

    let expense = expenses::ActiveModel {
        group_id: Set(demo_group_id()),
        payer_member_id: Set(member_ids[0]),
        amount: Set(3000),
        description: Set(Some("Dinner".to_string())),
        created_by_name: Set(Some("Alice".to_string())),
        created_at: Set(now),
        ..Default::default()
    };

    let expense = match expense.insert(db).await {
        Ok(e) => e,
        Err(e) => {
            eprintln!("Failed to insert demo expense: {e}");
            return;
        }
    };
    println!("  Created expense: Dinner (3000)");

    let splits: Vec<expense_splits::ActiveModel> = member_ids
        .iter()
        .map(|member_id| expense_splits::ActiveModel {
            expense_id: Set(expense.id),
            member_id: Set(*member_id),
            owed_amount: Set(1000),
        })
        .collect();

    if let Err(e) = expense_splits::Entity::insert_many(splits).exec(db).await {
        eprintln!("Failed to insert demo splits: {e}");
    } else {
        println!("  Created 3 splits of 1000 each");
    }
}

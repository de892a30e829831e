//! Initial database migration.
//!
//! Creates the group, member, expense, expense split, and settlement
//! status tables together with their constraints, indexes, and the
//! `updated_at` trigger.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: CORE TABLES
        // ============================================================
        db.execute_unprepared(GROUPS_SQL).await?;
        db.execute_unprepared(MEMBERS_SQL).await?;
        db.execute_unprepared(EXPENSES_SQL).await?;
        db.execute_unprepared(EXPENSE_SPLITS_SQL).await?;

        // ============================================================
        // PART 2: SETTLEMENT STATUS
        // ============================================================
        db.execute_unprepared(SETTLEMENT_STATUS_SQL).await?;

        // ============================================================
        // PART 3: TRIGGERS & FUNCTIONS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const GROUPS_SQL: &str = r"
CREATE TABLE groups (
    id UUID PRIMARY KEY,
    name VARCHAR(255) NOT NULL CHECK (name <> ''),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_groups_created_at ON groups(created_at DESC);
";

const MEMBERS_SQL: &str = r"
CREATE TABLE members (
    id BIGSERIAL PRIMARY KEY,
    group_id UUID NOT NULL REFERENCES groups(id) ON DELETE CASCADE,
    name VARCHAR(255) NOT NULL CHECK (name <> ''),
    bank_code VARCHAR(32),
    bank_account VARCHAR(64),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_members_group_id ON members(group_id);
";

const EXPENSES_SQL: &str = r"
CREATE TABLE expenses (
    id BIGSERIAL PRIMARY KEY,
    group_id UUID NOT NULL REFERENCES groups(id) ON DELETE CASCADE,
    payer_member_id BIGINT NOT NULL REFERENCES members(id),
    amount BIGINT NOT NULL CHECK (amount >= 0),
    description TEXT,
    created_by_name VARCHAR(255),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_expenses_group_id ON expenses(group_id);
CREATE INDEX idx_expenses_payer_member_id ON expenses(payer_member_id);
";

const EXPENSE_SPLITS_SQL: &str = r"
CREATE TABLE expense_splits (
    expense_id BIGINT NOT NULL REFERENCES expenses(id) ON DELETE CASCADE,
    member_id BIGINT NOT NULL REFERENCES members(id),
    owed_amount BIGINT NOT NULL CHECK (owed_amount >= 0),
    PRIMARY KEY (expense_id, member_id)
);

CREATE INDEX idx_expense_splits_member_id ON expense_splits(member_id);
";

const SETTLEMENT_STATUS_SQL: &str = r"
CREATE TABLE settlement_status (
    group_id UUID NOT NULL REFERENCES groups(id) ON DELETE CASCADE,
    from_member_id BIGINT NOT NULL,
    to_member_id BIGINT NOT NULL,
    is_settled BOOLEAN NOT NULL DEFAULT FALSE,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    PRIMARY KEY (group_id, from_member_id, to_member_id)
);
";

const TRIGGERS_SQL: &str = r"
CREATE OR REPLACE FUNCTION set_updated_at()
RETURNS TRIGGER AS $$
BEGIN
    NEW.updated_at = NOW();
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_groups_updated_at
    BEFORE UPDATE ON groups
    FOR EACH ROW
    EXECUTE FUNCTION set_updated_at();

CREATE TRIGGER trg_settlement_status_updated_at
    BEFORE UPDATE ON settlement_status
    FOR EACH ROW
    EXECUTE FUNCTION set_updated_at();
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS settlement_status CASCADE;
DROP TABLE IF EXISTS expense_splits CASCADE;
DROP TABLE IF EXISTS expenses CASCADE;
DROP TABLE IF EXISTS members CASCADE;
DROP TABLE IF EXISTS groups CASCADE;
DROP FUNCTION IF EXISTS set_updated_at() CASCADE;
";

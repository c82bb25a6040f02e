//! Initial database migration.
//!
//! Creates the ledger core schema: enums, companies, chart of accounts,
//! fiscal periods, vouchers with entries, ledger balances and voucher
//! number sequences.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: TENANCY
        // ============================================================
        db.execute_unprepared(COMPANIES_SQL).await?;

        // ============================================================
        // PART 3: CHART OF ACCOUNTS
        // ============================================================
        db.execute_unprepared(ACCOUNTS_SQL).await?;

        // ============================================================
        // PART 4: FISCAL PERIODS
        // ============================================================
        db.execute_unprepared(FISCAL_PERIODS_SQL).await?;

        // ============================================================
        // PART 5: VOUCHERS & ENTRIES
        // ============================================================
        db.execute_unprepared(VOUCHERS_SQL).await?;
        db.execute_unprepared(VOUCHER_ENTRIES_SQL).await?;

        // ============================================================
        // PART 6: LEDGER BALANCES
        // ============================================================
        db.execute_unprepared(LEDGER_BALANCES_SQL).await?;

        // ============================================================
        // PART 7: VOUCHER NUMBER SEQUENCES
        // ============================================================
        db.execute_unprepared(VOUCHER_SEQUENCES_SQL).await?;

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

const ENUMS_SQL: &str = r"
-- Account types
CREATE TYPE account_type AS ENUM (
    'asset',
    'liability',
    'equity',
    'revenue',
    'expense'
);

-- Which side increases the balance
CREATE TYPE account_nature AS ENUM ('debit', 'credit');

-- Voucher lifecycle status
CREATE TYPE voucher_status AS ENUM (
    'draft',
    'pending',
    'approved',
    'rejected',
    'posted',
    'cancelled'
);

-- Voucher type
CREATE TYPE voucher_type AS ENUM (
    'general',
    'sales',
    'purchase',
    'payment',
    'receipt',
    'adjustment',
    'closing'
);

-- Fiscal period status
CREATE TYPE fiscal_period_status AS ENUM ('open', 'closed');
";

const COMPANIES_SQL: &str = r"
CREATE TABLE companies (
    id UUID PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    currency CHAR(3) NOT NULL DEFAULT 'USD',
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id UUID PRIMARY KEY,
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    code VARCHAR(20) NOT NULL,
    name VARCHAR(255) NOT NULL,
    parent_id UUID REFERENCES accounts(id),
    level SMALLINT NOT NULL DEFAULT 1 CHECK (level >= 1),
    path VARCHAR(255) NOT NULL,
    account_type account_type NOT NULL,
    nature account_nature NOT NULL,
    is_control BOOLEAN NOT NULL DEFAULT FALSE,
    allow_direct_posting BOOLEAN NOT NULL DEFAULT TRUE,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    sort_order INTEGER NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT uq_accounts_company_code UNIQUE (company_id, code)
);

CREATE INDEX idx_accounts_company ON accounts(company_id);
CREATE INDEX idx_accounts_parent ON accounts(parent_id);
CREATE INDEX idx_accounts_path ON accounts(company_id, path);
";

const FISCAL_PERIODS_SQL: &str = r"
CREATE TABLE fiscal_periods (
    id UUID PRIMARY KEY,
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    fiscal_year INTEGER NOT NULL,
    fiscal_month INTEGER NOT NULL CHECK (fiscal_month BETWEEN 1 AND 12),
    name VARCHAR(50) NOT NULL,
    start_date DATE NOT NULL,
    end_date DATE NOT NULL,
    status fiscal_period_status NOT NULL DEFAULT 'open',
    closed_by UUID,
    closed_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT uq_fiscal_periods_company_period
        UNIQUE (company_id, fiscal_year, fiscal_month),
    CONSTRAINT chk_fiscal_periods_dates CHECK (start_date <= end_date)
);

CREATE INDEX idx_fiscal_periods_dates ON fiscal_periods(company_id, start_date, end_date);
";

const VOUCHERS_SQL: &str = r"
CREATE TABLE vouchers (
    id UUID PRIMARY KEY,
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    fiscal_period_id UUID NOT NULL REFERENCES fiscal_periods(id),
    voucher_no BIGINT,
    voucher_type voucher_type NOT NULL,
    voucher_date DATE NOT NULL,
    description TEXT NOT NULL,
    reference VARCHAR(100),
    status voucher_status NOT NULL DEFAULT 'draft',
    total_debit NUMERIC(20, 4) NOT NULL DEFAULT 0,
    total_credit NUMERIC(20, 4) NOT NULL DEFAULT 0,
    reversal_of UUID REFERENCES vouchers(id),
    created_by UUID NOT NULL,
    submitted_by UUID,
    submitted_at TIMESTAMPTZ,
    approved_by UUID,
    approved_at TIMESTAMPTZ,
    posted_by UUID,
    posted_at TIMESTAMPTZ,
    rejection_reason TEXT,
    cancelled_by UUID,
    cancelled_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_vouchers_company_date ON vouchers(company_id, voucher_date);
CREATE INDEX idx_vouchers_company_status ON vouchers(company_id, status);
CREATE INDEX idx_vouchers_period ON vouchers(fiscal_period_id);

-- Posted vouchers carry a unique number within their series.
CREATE UNIQUE INDEX uq_vouchers_series_no
    ON vouchers(fiscal_period_id, voucher_type, voucher_no)
    WHERE voucher_no IS NOT NULL;

-- At most one reversal per original.
CREATE UNIQUE INDEX uq_vouchers_reversal_of
    ON vouchers(reversal_of)
    WHERE reversal_of IS NOT NULL;
";

const VOUCHER_ENTRIES_SQL: &str = r"
CREATE TABLE voucher_entries (
    id UUID PRIMARY KEY,
    voucher_id UUID NOT NULL REFERENCES vouchers(id) ON DELETE CASCADE,
    line_no INTEGER NOT NULL CHECK (line_no >= 1),
    account_id UUID NOT NULL REFERENCES accounts(id),
    debit NUMERIC(20, 4) NOT NULL DEFAULT 0 CHECK (debit >= 0),
    credit NUMERIC(20, 4) NOT NULL DEFAULT 0 CHECK (credit >= 0),
    description TEXT,
    partner VARCHAR(100),
    department VARCHAR(100),
    project VARCHAR(100),
    cost_center VARCHAR(100),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT uq_voucher_entries_line UNIQUE (voucher_id, line_no),
    -- Exactly one side of the entry is set.
    CONSTRAINT chk_voucher_entries_one_sided CHECK (
        (debit > 0 AND credit = 0) OR (credit > 0 AND debit = 0)
    )
);

CREATE INDEX idx_voucher_entries_account ON voucher_entries(account_id);
";

const LEDGER_BALANCES_SQL: &str = r"
CREATE TABLE ledger_balances (
    id UUID PRIMARY KEY,
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    account_id UUID NOT NULL REFERENCES accounts(id),
    fiscal_year INTEGER NOT NULL,
    fiscal_month INTEGER NOT NULL CHECK (fiscal_month BETWEEN 1 AND 12),
    opening_debit NUMERIC(20, 4) NOT NULL DEFAULT 0,
    opening_credit NUMERIC(20, 4) NOT NULL DEFAULT 0,
    period_debit NUMERIC(20, 4) NOT NULL DEFAULT 0,
    period_credit NUMERIC(20, 4) NOT NULL DEFAULT 0,
    closing_debit NUMERIC(20, 4) NOT NULL DEFAULT 0,
    closing_credit NUMERIC(20, 4) NOT NULL DEFAULT 0,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT uq_ledger_balances_account_period
        UNIQUE (account_id, fiscal_year, fiscal_month)
);

CREATE INDEX idx_ledger_balances_company_period
    ON ledger_balances(company_id, fiscal_year, fiscal_month);
";

const VOUCHER_SEQUENCES_SQL: &str = r"
CREATE TABLE voucher_sequences (
    id UUID PRIMARY KEY,
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    voucher_type voucher_type NOT NULL,
    fiscal_year INTEGER NOT NULL,
    fiscal_month INTEGER NOT NULL CHECK (fiscal_month BETWEEN 1 AND 12),
    next_no BIGINT NOT NULL DEFAULT 1 CHECK (next_no >= 1),

    CONSTRAINT uq_voucher_sequences_series
        UNIQUE (company_id, voucher_type, fiscal_year, fiscal_month)
);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS voucher_sequences;
DROP TABLE IF EXISTS ledger_balances;
DROP TABLE IF EXISTS voucher_entries;
DROP TABLE IF EXISTS vouchers;
DROP TABLE IF EXISTS fiscal_periods;
DROP TABLE IF EXISTS accounts;
DROP TABLE IF EXISTS companies;

DROP TYPE IF EXISTS fiscal_period_status;
DROP TYPE IF EXISTS voucher_type;
DROP TYPE IF EXISTS voucher_status;
DROP TYPE IF EXISTS account_nature;
DROP TYPE IF EXISTS account_type;
";

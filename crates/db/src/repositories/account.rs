//! Account repository for chart of accounts database operations.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use kassa_core::account::{
    self as core_account, Account, AccountError, AccountNature, AccountTreeNode, AccountType,
};
use kassa_shared::ErrorKind;
use kassa_shared::types::{AccountId, CompanyId};

use crate::entities::{accounts, sea_orm_active_enums, voucher_entries, vouchers};

/// Error types for account operations.
#[derive(Debug, thiserror::Error)]
pub enum AccountRepoError {
    /// Account code already exists in the company.
    #[error("Account code '{0}' already exists")]
    DuplicateCode(String),

    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    /// Parent account not found.
    #[error("Parent account not found: {0}")]
    ParentNotFound(Uuid),

    /// Parent account belongs to a different company.
    #[error("Parent account {0} belongs to a different company")]
    ParentWrongCompany(Uuid),

    /// Deletion blocked: the account has child accounts.
    #[error("Cannot delete account {account_id}: it has {} child accounts", children.len())]
    HasChildren {
        /// The account being deleted.
        account_id: Uuid,
        /// Ids of the blocking children.
        children: Vec<Uuid>,
    },

    /// Deletion blocked: the account has posted voucher entries.
    #[error("Cannot delete account {account_id}: it has {entry_count} posted entries")]
    HasPostedEntries {
        /// The account being deleted.
        account_id: Uuid,
        /// Number of posted entries referencing it.
        entry_count: u64,
    },

    /// Deletion blocked: draft or pending vouchers still reference the account.
    #[error("Cannot delete account {account_id}: {entry_count} voucher entries reference it")]
    ReferencedByEntries {
        /// The account being deleted.
        account_id: Uuid,
        /// Number of entries referencing it.
        entry_count: u64,
    },

    /// Type change blocked: the account already has voucher entries.
    #[error("Cannot change account type for {account_id}: it has {entry_count} entries")]
    TypeChangeWithEntries {
        /// The account.
        account_id: Uuid,
        /// Number of entries referencing it.
        entry_count: u64,
    },

    /// Reorder input does not match the parent's children.
    #[error("Reorder list does not match the {expected} children of the parent (got {got})")]
    ReorderMismatch {
        /// Number of children the parent has.
        expected: usize,
        /// Number of ids supplied.
        got: usize,
    },

    /// Reorder input names an account that is not a child of the parent.
    #[error("Account {0} is not a child of the reorder parent")]
    NotSibling(Uuid),

    /// A core validation rule failed.
    #[error(transparent)]
    Core(#[from] AccountError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl AccountRepoError {
    /// Returns the broad error classification.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DuplicateCode(_)
            | Self::HasChildren { .. }
            | Self::HasPostedEntries { .. }
            | Self::ReferencedByEntries { .. } => ErrorKind::Integrity,
            Self::AccountNotFound(_) | Self::ParentNotFound(_) => ErrorKind::NotFound,
            Self::ParentWrongCompany(_) | Self::TypeChangeWithEntries { .. } => {
                ErrorKind::StateConflict
            }
            Self::ReorderMismatch { .. } | Self::NotSibling(_) => ErrorKind::Validation,
            Self::Core(e) => e.kind(),
            Self::Database(_) => ErrorKind::Storage,
        }
    }
}

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    /// Company ID.
    pub company_id: Uuid,
    /// Account code (must be unique within the company).
    pub code: String,
    /// Account name.
    pub name: String,
    /// Parent account ID for hierarchical structure.
    pub parent_id: Option<Uuid>,
    /// Account type.
    pub account_type: AccountType,
    /// Balance side; defaults to the type's normal side when omitted.
    pub nature: Option<AccountNature>,
    /// Accept a nature that differs from the type's default (contra accounts).
    pub override_nature: bool,
    /// Aggregation-only account.
    pub is_control: bool,
    /// Whether direct posting is allowed.
    pub allow_direct_posting: bool,
    /// Whether the account is active.
    pub is_active: bool,
    /// Ordering among siblings.
    pub sort_order: i32,
}

/// Input for updating an account. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateAccountInput {
    /// Account code; renaming rewrites the paths of the whole subtree.
    pub code: Option<String>,
    /// Account name.
    pub name: Option<String>,
    /// Account type (only while the account has no entries).
    pub account_type: Option<AccountType>,
    /// Balance side.
    pub nature: Option<AccountNature>,
    /// Accept a nature that differs from the type's default.
    pub override_nature: bool,
    /// Aggregation-only flag.
    pub is_control: Option<bool>,
    /// Whether direct posting is allowed.
    pub allow_direct_posting: Option<bool>,
    /// Whether the account is active.
    pub is_active: Option<bool>,
}

/// Filter options for listing accounts.
#[derive(Debug, Clone, Default)]
pub struct AccountFilter {
    /// Filter by account type.
    pub account_type: Option<AccountType>,
    /// Filter by active status.
    pub is_active: Option<bool>,
}

/// Account repository for chart of accounts operations.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new account with validation.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is malformed or taken, the nature is
    /// inconsistent with the type, or the parent is missing or foreign.
    pub async fn create_account(
        &self,
        input: CreateAccountInput,
    ) -> Result<accounts::Model, AccountRepoError> {
        core_account::validate_code(&input.code)?;
        let nature = input
            .nature
            .unwrap_or_else(|| input.account_type.default_nature());
        core_account::validate_nature(input.account_type, nature, input.override_nature)?;

        let existing = accounts::Entity::find()
            .filter(accounts::Column::CompanyId.eq(input.company_id))
            .filter(accounts::Column::Code.eq(&input.code))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(AccountRepoError::DuplicateCode(input.code));
        }

        let parent = match input.parent_id {
            Some(parent_id) => {
                let parent = accounts::Entity::find_by_id(parent_id)
                    .one(&self.db)
                    .await?
                    .ok_or(AccountRepoError::ParentNotFound(parent_id))?;
                if parent.company_id != input.company_id {
                    return Err(AccountRepoError::ParentWrongCompany(parent_id));
                }
                Some(parent)
            }
            None => None,
        };

        let level = core_account::child_level(parent.as_ref().map(|p| p.level));
        let path = core_account::child_path(parent.as_ref().map(|p| p.path.as_str()), &input.code);

        let now = chrono::Utc::now().into();
        let account = accounts::ActiveModel {
            id: Set(Uuid::new_v4()),
            company_id: Set(input.company_id),
            code: Set(input.code),
            name: Set(input.name),
            parent_id: Set(input.parent_id),
            level: Set(level),
            path: Set(path),
            account_type: Set(input.account_type.into()),
            nature: Set(nature.into()),
            is_control: Set(input.is_control),
            allow_direct_posting: Set(input.allow_direct_posting),
            is_active: Set(input.is_active),
            sort_order: Set(input.sort_order),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let account = account.insert(&self.db).await?;
        Ok(account)
    }

    /// Updates an account with validation.
    ///
    /// Renaming the code rewrites the materialized paths of the account and
    /// its whole subtree in one transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the account is missing, the new code is invalid
    /// or taken, or a type change is attempted on an account with entries.
    pub async fn update_account(
        &self,
        id: Uuid,
        input: UpdateAccountInput,
    ) -> Result<accounts::Model, AccountRepoError> {
        let account = accounts::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AccountRepoError::AccountNotFound(id))?;

        let current_type: AccountType = account.account_type.into();
        let current_nature: AccountNature = account.nature.into();

        if let Some(new_type) = input.account_type
            && new_type != current_type
        {
            let entry_count = self.count_entries(id).await?;
            if entry_count > 0 {
                return Err(AccountRepoError::TypeChangeWithEntries {
                    account_id: id,
                    entry_count,
                });
            }
        }

        let final_type = input.account_type.unwrap_or(current_type);
        let final_nature = input.nature.unwrap_or(if final_type == current_type {
            current_nature
        } else {
            final_type.default_nature()
        });
        core_account::validate_nature(final_type, final_nature, input.override_nature)?;

        let code_change = match &input.code {
            Some(new_code) if *new_code != account.code => {
                core_account::validate_code(new_code)?;
                let taken = accounts::Entity::find()
                    .filter(accounts::Column::CompanyId.eq(account.company_id))
                    .filter(accounts::Column::Code.eq(new_code))
                    .filter(accounts::Column::Id.ne(id))
                    .one(&self.db)
                    .await?;
                if taken.is_some() {
                    return Err(AccountRepoError::DuplicateCode(new_code.clone()));
                }
                Some(new_code.clone())
            }
            _ => None,
        };

        let txn = self.db.begin().await?;
        let now = chrono::Utc::now().into();

        let old_path = account.path.clone();
        let company_id = account.company_id;
        let mut active: accounts::ActiveModel = account.into();

        if let Some(new_code) = code_change {
            // The code is the last path segment; splice it and rebase the
            // subtree below.
            let new_path = match old_path.rfind('/') {
                Some(pos) => format!("{}/{new_code}", &old_path[..pos]),
                None => new_code.clone(),
            };
            rebase_subtree(&txn, company_id, &old_path, &new_path, 0).await?;
            active.code = Set(new_code);
            active.path = Set(new_path);
        }

        if let Some(name) = input.name {
            active.name = Set(name);
        }
        active.account_type = Set(final_type.into());
        active.nature = Set(final_nature.into());
        if let Some(is_control) = input.is_control {
            active.is_control = Set(is_control);
        }
        if let Some(allow_direct_posting) = input.allow_direct_posting {
            active.allow_direct_posting = Set(allow_direct_posting);
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(now);

        let updated = active.update(&txn).await?;
        txn.commit().await?;
        Ok(updated)
    }

    /// Moves an account under a new parent (or to the root), recomputing
    /// `level` and `path` for the account and its entire subtree in one
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the target parent is the account itself or one
    /// of its descendants, or belongs to another company.
    pub async fn move_account(
        &self,
        id: Uuid,
        new_parent_id: Option<Uuid>,
    ) -> Result<accounts::Model, AccountRepoError> {
        let account = accounts::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AccountRepoError::AccountNotFound(id))?;

        let parent = match new_parent_id {
            Some(parent_id) => {
                let parent = accounts::Entity::find_by_id(parent_id)
                    .one(&self.db)
                    .await?
                    .ok_or(AccountRepoError::ParentNotFound(parent_id))?;
                if parent.company_id != account.company_id {
                    return Err(AccountRepoError::ParentWrongCompany(parent_id));
                }
                core_account::validate_move(id, &account.path, &parent.path)?;
                Some(parent)
            }
            None => None,
        };

        let old_path = account.path.clone();
        let old_level = account.level;
        let new_level = core_account::child_level(parent.as_ref().map(|p| p.level));
        let new_path =
            core_account::child_path(parent.as_ref().map(|p| p.path.as_str()), &account.code);
        let level_delta = new_level - old_level;
        let company_id = account.company_id;

        let txn = self.db.begin().await?;
        let now = chrono::Utc::now().into();

        rebase_subtree(&txn, company_id, &old_path, &new_path, level_delta).await?;

        let mut active: accounts::ActiveModel = account.into();
        active.parent_id = Set(new_parent_id);
        active.level = Set(new_level);
        active.path = Set(new_path);
        active.updated_at = Set(now);
        let updated = active.update(&txn).await?;

        txn.commit().await?;

        tracing::info!(
            account_id = %id,
            new_parent = ?new_parent_id,
            "moved account subtree"
        );
        Ok(updated)
    }

    /// Rewrites the sibling order under a parent.
    ///
    /// `ordered_ids` must contain exactly the children of `parent_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the id list does not match the children.
    pub async fn reorder_accounts(
        &self,
        company_id: Uuid,
        parent_id: Option<Uuid>,
        ordered_ids: Vec<Uuid>,
    ) -> Result<(), AccountRepoError> {
        let mut query = accounts::Entity::find()
            .filter(accounts::Column::CompanyId.eq(company_id));
        query = match parent_id {
            Some(pid) => query.filter(accounts::Column::ParentId.eq(pid)),
            None => query.filter(accounts::Column::ParentId.is_null()),
        };
        let children = query.all(&self.db).await?;

        if children.len() != ordered_ids.len() {
            return Err(AccountRepoError::ReorderMismatch {
                expected: children.len(),
                got: ordered_ids.len(),
            });
        }
        let child_ids: std::collections::HashSet<Uuid> =
            children.iter().map(|c| c.id).collect();
        if let Some(stranger) = ordered_ids.iter().find(|id| !child_ids.contains(id)) {
            return Err(AccountRepoError::NotSibling(*stranger));
        }

        let txn = self.db.begin().await?;
        let now: sea_orm::prelude::DateTimeWithTimeZone = chrono::Utc::now().into();
        for (position, account_id) in ordered_ids.iter().enumerate() {
            let sort_order = i32::try_from(position).unwrap_or(i32::MAX) + 1;
            accounts::Entity::update_many()
                .col_expr(accounts::Column::SortOrder, Expr::value(sort_order))
                .col_expr(accounts::Column::UpdatedAt, Expr::value(now))
                .filter(accounts::Column::Id.eq(*account_id))
                .exec(&txn)
                .await?;
        }
        txn.commit().await?;
        Ok(())
    }

    /// Deletes an account.
    ///
    /// # Errors
    ///
    /// Returns an integrity error naming the blocking children, or the
    /// posted-entry count, if either exists.
    pub async fn delete_account(&self, id: Uuid) -> Result<(), AccountRepoError> {
        accounts::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AccountRepoError::AccountNotFound(id))?;

        let children: Vec<Uuid> = accounts::Entity::find()
            .filter(accounts::Column::ParentId.eq(id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|c| c.id)
            .collect();
        if !children.is_empty() {
            return Err(AccountRepoError::HasChildren {
                account_id: id,
                children,
            });
        }

        let posted_count = voucher_entries::Entity::find()
            .filter(voucher_entries::Column::AccountId.eq(id))
            .inner_join(vouchers::Entity)
            .filter(vouchers::Column::Status.eq(sea_orm_active_enums::VoucherStatus::Posted))
            .count(&self.db)
            .await?;
        if posted_count > 0 {
            return Err(AccountRepoError::HasPostedEntries {
                account_id: id,
                entry_count: posted_count,
            });
        }

        let entry_count = self.count_entries(id).await?;
        if entry_count > 0 {
            return Err(AccountRepoError::ReferencedByEntries {
                account_id: id,
                entry_count,
            });
        }

        accounts::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }

    /// Lists a company's accounts assembled into a tree.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_account_tree(
        &self,
        company_id: Uuid,
        filter: AccountFilter,
    ) -> Result<Vec<AccountTreeNode>, AccountRepoError> {
        let mut query = accounts::Entity::find()
            .filter(accounts::Column::CompanyId.eq(company_id))
            .order_by_asc(accounts::Column::Code);

        if let Some(account_type) = filter.account_type {
            let db_type: sea_orm_active_enums::AccountType = account_type.into();
            query = query.filter(accounts::Column::AccountType.eq(db_type));
        }
        if let Some(is_active) = filter.is_active {
            query = query.filter(accounts::Column::IsActive.eq(is_active));
        }

        let models = query.all(&self.db).await?;
        let accounts = models.into_iter().map(to_core_account).collect();
        Ok(core_account::build_account_tree(accounts))
    }

    /// Finds an account by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_account_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<accounts::Model>, AccountRepoError> {
        let account = accounts::Entity::find_by_id(id).one(&self.db).await?;
        Ok(account)
    }

    /// Counts voucher entries referencing an account, any status.
    async fn count_entries(&self, account_id: Uuid) -> Result<u64, AccountRepoError> {
        let count = voucher_entries::Entity::find()
            .filter(voucher_entries::Column::AccountId.eq(account_id))
            .count(&self.db)
            .await?;
        Ok(count)
    }
}

/// Rewrites `path` and shifts `level` for every strict descendant of the
/// node at `old_path`. The node itself is updated by the caller.
async fn rebase_subtree(
    txn: &DatabaseTransaction,
    company_id: Uuid,
    old_path: &str,
    new_path: &str,
    level_delta: i16,
) -> Result<(), AccountRepoError> {
    let descendants = accounts::Entity::find()
        .filter(accounts::Column::CompanyId.eq(company_id))
        .filter(accounts::Column::Path.starts_with(format!("{old_path}/")))
        .all(txn)
        .await?;

    let now: sea_orm::prelude::DateTimeWithTimeZone = chrono::Utc::now().into();
    for descendant in descendants {
        let rebased = core_account::rebase_path(old_path, new_path, &descendant.path);
        let level = descendant.level + level_delta;
        let mut active: accounts::ActiveModel = descendant.into();
        active.path = Set(rebased);
        active.level = Set(level);
        active.updated_at = Set(now);
        active.update(txn).await?;
    }
    Ok(())
}

/// Converts a database row into the core account type.
#[must_use]
pub fn to_core_account(model: accounts::Model) -> Account {
    Account {
        id: AccountId::from_uuid(model.id),
        company_id: CompanyId::from_uuid(model.company_id),
        code: model.code,
        name: model.name,
        parent_id: model.parent_id.map(AccountId::from_uuid),
        level: model.level,
        path: model.path,
        account_type: model.account_type.into(),
        nature: model.nature.into(),
        is_control: model.is_control,
        allow_direct_posting: model.allow_direct_posting,
        is_active: model.is_active,
        sort_order: model.sort_order,
    }
}

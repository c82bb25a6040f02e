//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations, hiding
//! the `SeaORM` implementation details from the rest of the application.
//! Pure business rules stay in `kassa-core`; repositories load state, call
//! into the core, and apply the results inside transactions.

pub mod account;
pub mod balance;
pub mod fiscal;
pub mod posting;
pub mod report;
pub mod voucher;

pub use account::{
    AccountFilter, AccountRepoError, AccountRepository, CreateAccountInput, UpdateAccountInput,
};
pub use balance::{BalanceRepoError, BalanceRepository};
pub use fiscal::{FiscalRepoError, FiscalRepository};
pub use posting::{PostingError, PostingRepository};
pub use report::{ReportRepoError, ReportRepository};
pub use voucher::{
    UpdateVoucherInput, VoucherFilter, VoucherRepoError, VoucherRepository, VoucherWithEntries,
};

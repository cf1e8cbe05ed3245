pub use accounts::{Account, AccountKind};
pub use categories::Category;
pub use error::LedgerError;
pub use transactions::{FlowKind, Transaction, TransactionStatus};

pub use ops::{
    AccountBalance, AccountChanges, AccountFilter, AccountPage, CategoryChanges, CategoryFilter,
    CategoryPage, Ledger, LedgerBuilder, NewAccount, NewCategory, NewTransaction, SummaryFilter,
    TransactionChanges, TransactionDetail, TransactionFilter, TransactionPage, TransactionSummary,
};

pub mod balance;

mod accounts;
mod categories;
mod error;
mod ops;
mod transactions;

pub type ResultLedger<T> = Result<T, LedgerError>;

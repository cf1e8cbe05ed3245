use sea_orm::DatabaseConnection;

use crate::{LedgerError, ResultLedger};

mod accounts;
mod categories;
mod transactions;

pub use accounts::{AccountBalance, AccountChanges, AccountFilter, AccountPage, NewAccount};
pub use categories::{CategoryChanges, CategoryFilter, CategoryPage, NewCategory};
pub use transactions::{
    NewTransaction, SummaryFilter, TransactionChanges, TransactionDetail, TransactionFilter,
    TransactionPage, TransactionSummary,
};

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

const DEFAULT_PAGE_SIZE: u64 = 50;
const MAX_PAGE_SIZE: u64 = 100;

#[derive(Debug)]
pub struct Ledger {
    database: DatabaseConnection,
}

impl Ledger {
    /// Return a builder for `Ledger`. Help to build the struct.
    pub fn builder() -> LedgerBuilder {
        LedgerBuilder::default()
    }
}

fn normalize_required_name(value: &str, label: &str) -> ResultLedger<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::InvalidName(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Validate a `#RRGGBB` color and return it uppercased.
fn normalize_color(value: &str) -> ResultLedger<String> {
    let trimmed = value.trim();
    let hex = trimmed.strip_prefix('#');
    let valid = matches!(hex, Some(digits) if digits.len() == 6
        && digits.chars().all(|c| c.is_ascii_hexdigit()));
    if !valid {
        return Err(LedgerError::InvalidColor(trimmed.to_string()));
    }
    Ok(trimmed.to_uppercase())
}

fn normalize_icon(value: &str) -> ResultLedger<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::InvalidName("icon must not be empty".to_string()));
    }
    Ok(trimmed.to_string())
}

/// Clamp pagination input to a 1-based page and a bounded page size.
fn page_bounds(page: Option<u64>, per_page: Option<u64>) -> (u64, u64) {
    let page = page.unwrap_or(1).max(1);
    let per_page = per_page.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    (page, per_page)
}

/// The builder for `Ledger`
#[derive(Default)]
pub struct LedgerBuilder {
    database: DatabaseConnection,
}

impl LedgerBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> LedgerBuilder {
        self.database = db;
        self
    }

    /// Construct `Ledger`
    pub async fn build(self) -> ResultLedger<Ledger> {
        Ok(Ledger {
            database: self.database,
        })
    }
}

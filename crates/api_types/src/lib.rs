use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    Checking,
    Savings,
    Investment,
    CreditCard,
    Cash,
    Other,
}

/// Direction of a money movement. Categories and transactions share it, and
/// a transaction must carry the same kind as its category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowKind {
    Income,
    Expense,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    #[default]
    Pending,
    Completed,
}

/// Generic acknowledgement body, also used as the error envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
    pub success: bool,
}

/// Query for DELETE endpoints: archive by default, drop the row when
/// `permanent` is set.
#[derive(Debug, Serialize, Deserialize)]
pub struct RemoveQuery {
    pub permanent: Option<bool>,
}

pub mod system {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ServiceInfo {
        pub name: String,
        pub version: String,
        pub status: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Health {
        pub status: String,
    }
}

pub mod account {
    use chrono::{DateTime, Utc};
    use rust_decimal::Decimal;

    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountNew {
        pub name: String,
        #[serde(rename = "type")]
        pub kind: AccountKind,
        pub description: Option<String>,
        /// Decimal amounts are serialized as strings in JSON (`"1200.00"`).
        /// Defaults to zero.
        #[serde(default)]
        pub initial_balance: Decimal,
        /// `#RRGGBB`; the server stores it uppercased.
        pub color: Option<String>,
        pub icon: Option<String>,
    }

    /// Absent fields are left unchanged. Balances cannot be set here.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct AccountUpdate {
        pub name: Option<String>,
        #[serde(rename = "type")]
        pub kind: Option<AccountKind>,
        pub description: Option<String>,
        pub color: Option<String>,
        pub icon: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct AccountList {
        #[serde(rename = "type")]
        pub kind: Option<AccountKind>,
        pub search: Option<String>,
        pub is_active: Option<bool>,
        pub only_active: Option<bool>,
        pub page: Option<u64>,
        pub per_page: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountView {
        pub id: i32,
        pub name: String,
        #[serde(rename = "type")]
        pub kind: AccountKind,
        pub description: Option<String>,
        pub initial_balance: Decimal,
        pub current_balance: Decimal,
        pub color: String,
        pub icon: String,
        pub is_active: bool,
        pub archived_at: Option<DateTime<Utc>>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountsResponse {
        pub accounts: Vec<AccountView>,
        pub total: u64,
        /// Sum of `current_balance` over all active accounts.
        pub total_balance: Decimal,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountBalanceView {
        pub account_id: i32,
        pub account_name: String,
        pub current_balance: Decimal,
    }
}

pub mod category {
    use chrono::{DateTime, Utc};

    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryNew {
        pub name: String,
        #[serde(rename = "type")]
        pub kind: FlowKind,
        pub description: Option<String>,
        pub color: Option<String>,
        pub icon: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CategoryUpdate {
        pub name: Option<String>,
        #[serde(rename = "type")]
        pub kind: Option<FlowKind>,
        pub description: Option<String>,
        pub color: Option<String>,
        pub icon: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CategoryList {
        #[serde(rename = "type")]
        pub kind: Option<FlowKind>,
        pub search: Option<String>,
        pub is_active: Option<bool>,
        pub only_active: Option<bool>,
        pub page: Option<u64>,
        pub per_page: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryView {
        pub id: i32,
        pub name: String,
        #[serde(rename = "type")]
        pub kind: FlowKind,
        pub description: Option<String>,
        pub color: String,
        pub icon: String,
        pub is_active: bool,
        pub archived_at: Option<DateTime<Utc>>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoriesResponse {
        pub categories: Vec<CategoryView>,
        pub total: u64,
    }
}

pub mod transaction {
    use chrono::{DateTime, NaiveDate, Utc};
    use rust_decimal::Decimal;

    use super::account::AccountView;
    use super::category::CategoryView;
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionNew {
        pub description: String,
        /// Magnitude only, must be > 0; the direction comes from `type`.
        pub amount: Decimal,
        #[serde(rename = "type")]
        pub kind: FlowKind,
        /// Defaults to `pending`.
        #[serde(default)]
        pub status: TransactionStatus,
        pub transaction_date: NaiveDate,
        pub notes: Option<String>,
        pub account_id: i32,
        pub category_id: i32,
    }

    /// Absent fields are left unchanged.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionUpdate {
        pub description: Option<String>,
        pub amount: Option<Decimal>,
        #[serde(rename = "type")]
        pub kind: Option<FlowKind>,
        pub status: Option<TransactionStatus>,
        pub transaction_date: Option<NaiveDate>,
        pub notes: Option<String>,
        pub account_id: Option<i32>,
        pub category_id: Option<i32>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionStatusUpdate {
        pub status: TransactionStatus,
    }

    /// `date_from` and `date_to` are both inclusive.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionList {
        pub account_id: Option<i32>,
        pub category_id: Option<i32>,
        #[serde(rename = "type")]
        pub kind: Option<FlowKind>,
        pub status: Option<TransactionStatus>,
        pub date_from: Option<NaiveDate>,
        pub date_to: Option<NaiveDate>,
        /// Case-insensitive substring match over description or notes.
        pub search: Option<String>,
        pub min_amount: Option<Decimal>,
        pub max_amount: Option<Decimal>,
        pub page: Option<u64>,
        pub per_page: Option<u64>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct SummaryGet {
        pub start_date: Option<NaiveDate>,
        pub end_date: Option<NaiveDate>,
        /// Defaults to true: pending transactions are left out.
        pub only_completed: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: i32,
        pub description: String,
        pub amount: Decimal,
        #[serde(rename = "type")]
        pub kind: FlowKind,
        pub status: TransactionStatus,
        pub transaction_date: NaiveDate,
        pub notes: Option<String>,
        pub account_id: i32,
        pub category_id: i32,
        pub account: AccountView,
        pub category: CategoryView,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionsResponse {
        pub transactions: Vec<TransactionView>,
        pub total: u64,
        /// Totals cover the completed transactions matching the filters,
        /// whatever `status` was asked for.
        pub total_income: Decimal,
        pub total_expense: Decimal,
        pub balance: Decimal,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SummaryView {
        pub total_income: Decimal,
        pub total_expense: Decimal,
        pub balance: Decimal,
        pub total_transactions: u64,
        pub period_start: Option<NaiveDate>,
        pub period_end: Option<NaiveDate>,
    }
}

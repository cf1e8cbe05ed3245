use axum::{Json, http::StatusCode, response::IntoResponse};
use ledger::LedgerError;

use api_types::MessageResponse;
pub use extract::Body;
pub use server::{ServerState, router, run, run_with_listener, spawn_with_listener};

mod accounts;
mod categories;
mod extract;
mod server;
mod system;
mod transactions;

pub mod types {
    pub mod account {
        pub use api_types::account::{
            AccountBalanceView, AccountList, AccountNew, AccountUpdate, AccountView,
            AccountsResponse,
        };
        pub use ledger::{Account, AccountKind};
    }

    pub mod category {
        pub use api_types::category::{
            CategoriesResponse, CategoryList, CategoryNew, CategoryUpdate, CategoryView,
        };
        pub use ledger::Category;
    }

    pub mod transaction {
        pub use api_types::transaction::{
            SummaryGet, SummaryView, TransactionList, TransactionNew, TransactionStatusUpdate,
            TransactionUpdate, TransactionView, TransactionsResponse,
        };
        pub use ledger::{FlowKind, Transaction, TransactionStatus};
    }

    pub mod system {
        pub use api_types::system::{Health, ServiceInfo};
    }
}

pub struct ServerError(LedgerError);

fn status_for_ledger_error(err: &LedgerError) -> StatusCode {
    match err {
        LedgerError::NotFound(_) => StatusCode::NOT_FOUND,
        LedgerError::AlreadyExists(_) | LedgerError::InUse(_) => StatusCode::CONFLICT,
        LedgerError::InvalidName(_)
        | LedgerError::InvalidColor(_)
        | LedgerError::InvalidAmount(_)
        | LedgerError::InvalidKind(_)
        | LedgerError::InvalidStatus(_)
        | LedgerError::KindMismatch(_) => StatusCode::BAD_REQUEST,
        LedgerError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for_ledger_error(err: LedgerError) -> String {
    match err {
        LedgerError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let status = status_for_ledger_error(&self.0);
        let message = message_for_ledger_error(self.0);

        (
            status,
            Json(MessageResponse {
                message,
                success: false,
            }),
        )
            .into_response()
    }
}

impl From<LedgerError> for ServerError {
    fn from(value: LedgerError) -> Self {
        Self(value)
    }
}

/// Translates the `is_active`/`only_active` query pair into the archived
/// filter the ledger understands.
pub(crate) fn archived_filter(is_active: Option<bool>, only_active: Option<bool>) -> Option<bool> {
    if only_active.unwrap_or(false) {
        return Some(false);
    }
    is_active.map(|active| !active)
}

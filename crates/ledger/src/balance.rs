//! Balance arithmetic shared by the transaction lifecycle operations.
//!
//! Only `completed` transactions touch an account's stored balance; callers
//! check the status before reaching for these functions.
use sea_orm::prelude::Decimal;

use crate::FlowKind;

/// A transaction's signed effect on a balance: positive for income, negative
/// for expense.
pub fn signed_amount(amount: Decimal, kind: FlowKind) -> Decimal {
    match kind {
        FlowKind::Income => amount,
        FlowKind::Expense => -amount,
    }
}

/// Apply a transaction's effect to a balance.
pub fn apply(balance: Decimal, amount: Decimal, kind: FlowKind) -> Decimal {
    balance + signed_amount(amount, kind)
}

/// Undo a previously applied effect. Exact inverse of [`apply`].
pub fn revert(balance: Decimal, amount: Decimal, kind: FlowKind) -> Decimal {
    balance - signed_amount(amount, kind)
}

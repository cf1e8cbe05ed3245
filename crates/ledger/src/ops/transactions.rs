use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};

use sea_orm::{
    ActiveValue, Condition, DatabaseTransaction, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait, prelude::*, sea_query::Expr,
};

use crate::{
    Account, Category, FlowKind, LedgerError, ResultLedger, Transaction, TransactionStatus,
    accounts, balance, categories, transactions,
};

use super::{Ledger, normalize_optional_text, page_bounds, with_tx};

/// Input for [`Ledger::new_transaction`].
#[derive(Clone, Debug)]
pub struct NewTransaction {
    pub description: String,
    /// Magnitude only; the direction comes from `kind`.
    pub amount: Decimal,
    pub kind: FlowKind,
    pub status: TransactionStatus,
    pub transaction_date: NaiveDate,
    pub notes: Option<String>,
    pub account_id: i32,
    pub category_id: i32,
}

/// Partial update for [`Ledger::update_transaction`]. `None` leaves a field
/// untouched.
#[derive(Clone, Debug, Default)]
pub struct TransactionChanges {
    pub description: Option<String>,
    pub amount: Option<Decimal>,
    pub kind: Option<FlowKind>,
    pub status: Option<TransactionStatus>,
    pub transaction_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub account_id: Option<i32>,
    pub category_id: Option<i32>,
}

/// Filters for listing transactions.
///
/// `date_from` and `date_to` are both inclusive. `search` is a
/// case-insensitive substring match over description or notes.
#[derive(Clone, Debug, Default)]
pub struct TransactionFilter {
    pub account_id: Option<i32>,
    pub category_id: Option<i32>,
    pub kind: Option<FlowKind>,
    pub status: Option<TransactionStatus>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub search: Option<String>,
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

/// Filters for [`Ledger::transaction_summary`].
///
/// `date_from` and `date_to` are both inclusive. Pending transactions are
/// left out unless `include_pending` is set.
#[derive(Clone, Debug, Default)]
pub struct SummaryFilter {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub include_pending: bool,
}

/// A transaction together with the account and category it references.
#[derive(Clone, Debug, PartialEq)]
pub struct TransactionDetail {
    pub transaction: Transaction,
    pub account: Account,
    pub category: Category,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TransactionPage {
    pub transactions: Vec<TransactionDetail>,
    pub total: u64,
    /// Income total over the completed subset of the filter, status filter
    /// aside.
    pub total_income: Decimal,
    /// Expense total over the same completed subset.
    pub total_expense: Decimal,
    /// `total_income - total_expense`.
    pub balance: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionSummary {
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub balance: Decimal,
    /// Count over the same set the sums were taken from.
    pub total_transactions: u64,
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
}

trait ApplyTxFilters: QueryFilter + Sized {
    fn apply_tx_filters(self, filter: &TransactionFilter) -> Self;
}

impl<T> ApplyTxFilters for T
where
    T: QueryFilter + Sized,
{
    /// Applies every filter except `status`, which the list and totals
    /// queries handle differently.
    fn apply_tx_filters(mut self, filter: &TransactionFilter) -> Self {
        if let Some(account_id) = filter.account_id {
            self = self.filter(transactions::Column::AccountId.eq(account_id));
        }
        if let Some(category_id) = filter.category_id {
            self = self.filter(transactions::Column::CategoryId.eq(category_id));
        }
        if let Some(kind) = filter.kind {
            self = self.filter(transactions::Column::Kind.eq(kind.as_str()));
        }
        if let Some(date_from) = filter.date_from {
            self = self.filter(transactions::Column::TransactionDate.gte(date_from));
        }
        if let Some(date_to) = filter.date_to {
            self = self.filter(transactions::Column::TransactionDate.lte(date_to));
        }
        if let Some(search) = normalize_optional_text(filter.search.as_deref()) {
            let pattern = format!("%{}%", search.to_lowercase());
            self = self.filter(
                Condition::any()
                    .add(Expr::cust("LOWER(description)").like(pattern.clone()))
                    .add(Expr::cust("LOWER(notes)").like(pattern)),
            );
        }
        if let Some(min_amount) = filter.min_amount {
            self = self.filter(transactions::Column::Amount.gte(min_amount));
        }
        if let Some(max_amount) = filter.max_amount {
            self = self.filter(transactions::Column::Amount.lte(max_amount));
        }
        self
    }
}

fn normalize_description(value: &str) -> ResultLedger<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::InvalidName(
            "transaction description must not be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

fn ensure_positive_amount(amount: Decimal) -> ResultLedger<()> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::InvalidAmount(
            "amount must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

fn ensure_kind_matches(kind: FlowKind, category: &categories::Model) -> ResultLedger<()> {
    let category_kind = FlowKind::try_from(category.kind.as_str())?;
    if kind != category_kind {
        return Err(LedgerError::KindMismatch(format!(
            "{} transaction cannot use {} category \"{}\"",
            kind.as_str(),
            category_kind.as_str(),
            category.name
        )));
    }
    Ok(())
}

/// Posts a completed amount onto the stored account balance.
async fn apply_to_account(
    db_tx: &DatabaseTransaction,
    account: accounts::Model,
    amount: Decimal,
    kind: FlowKind,
    now: DateTime<Utc>,
) -> ResultLedger<accounts::Model> {
    let next = balance::apply(account.current_balance, amount, kind);
    let mut active: accounts::ActiveModel = account.into();
    active.current_balance = ActiveValue::Set(next);
    active.updated_at = ActiveValue::Set(now);
    Ok(active.update(db_tx).await?)
}

/// Undoes a previously posted completed amount.
async fn revert_from_account(
    db_tx: &DatabaseTransaction,
    account: accounts::Model,
    amount: Decimal,
    kind: FlowKind,
    now: DateTime<Utc>,
) -> ResultLedger<accounts::Model> {
    let next = balance::revert(account.current_balance, amount, kind);
    let mut active: accounts::ActiveModel = account.into();
    active.current_balance = ActiveValue::Set(next);
    active.updated_at = ActiveValue::Set(now);
    Ok(active.update(db_tx).await?)
}

/// Loads the referenced accounts and categories for a page of rows in two
/// batched queries.
async fn load_details(
    db_tx: &DatabaseTransaction,
    models: Vec<transactions::Model>,
) -> ResultLedger<Vec<TransactionDetail>> {
    let account_ids: Vec<i32> = models.iter().map(|m| m.account_id).collect();
    let category_ids: Vec<i32> = models.iter().map(|m| m.category_id).collect();
    let mut accounts_by_id = HashMap::new();
    for model in accounts::Entity::find()
        .filter(accounts::Column::Id.is_in(account_ids))
        .all(db_tx)
        .await?
    {
        accounts_by_id.insert(model.id, Account::try_from(model)?);
    }
    let mut categories_by_id = HashMap::new();
    for model in categories::Entity::find()
        .filter(categories::Column::Id.is_in(category_ids))
        .all(db_tx)
        .await?
    {
        categories_by_id.insert(model.id, Category::try_from(model)?);
    }
    let mut details = Vec::with_capacity(models.len());
    for model in models {
        let account = accounts_by_id
            .get(&model.account_id)
            .cloned()
            .ok_or_else(|| LedgerError::NotFound(format!("account {}", model.account_id)))?;
        let category = categories_by_id
            .get(&model.category_id)
            .cloned()
            .ok_or_else(|| LedgerError::NotFound(format!("category {}", model.category_id)))?;
        details.push(TransactionDetail {
            transaction: Transaction::try_from(model)?,
            account,
            category,
        });
    }
    Ok(details)
}

async fn completed_totals(
    db_tx: &DatabaseTransaction,
    filter: &TransactionFilter,
) -> ResultLedger<(Decimal, Decimal)> {
    let rows: Vec<(Decimal, String)> = transactions::Entity::find()
        .apply_tx_filters(filter)
        .filter(transactions::Column::Status.eq(TransactionStatus::Completed.as_str()))
        .select_only()
        .column(transactions::Column::Amount)
        .column(transactions::Column::Kind)
        .into_tuple()
        .all(db_tx)
        .await?;
    let mut income = Decimal::ZERO;
    let mut expense = Decimal::ZERO;
    for (amount, kind) in rows {
        match FlowKind::try_from(kind.as_str())? {
            FlowKind::Income => income += amount,
            FlowKind::Expense => expense += amount,
        }
    }
    Ok((income, expense))
}

impl Ledger {
    /// Record a transaction. A `completed` one is posted onto the account
    /// balance right away; a `pending` one never touches it.
    pub async fn new_transaction(&self, input: NewTransaction) -> ResultLedger<TransactionDetail> {
        let now = Utc::now();
        let description = normalize_description(&input.description)?;
        ensure_positive_amount(input.amount)?;
        let notes = normalize_optional_text(input.notes.as_deref());
        with_tx!(self, |db_tx| {
            let account = self.require_account(&db_tx, input.account_id).await?;
            let category = self.require_category(&db_tx, input.category_id).await?;
            ensure_kind_matches(input.kind, &category)?;
            let active = transactions::ActiveModel {
                id: ActiveValue::NotSet,
                description: ActiveValue::Set(description),
                amount: ActiveValue::Set(input.amount),
                kind: ActiveValue::Set(input.kind.as_str().to_string()),
                status: ActiveValue::Set(input.status.as_str().to_string()),
                transaction_date: ActiveValue::Set(input.transaction_date),
                notes: ActiveValue::Set(notes),
                account_id: ActiveValue::Set(input.account_id),
                category_id: ActiveValue::Set(input.category_id),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            };
            let model = active.insert(&db_tx).await?;
            let account = if input.status == TransactionStatus::Completed {
                apply_to_account(&db_tx, account, input.amount, input.kind, now).await?
            } else {
                account
            };
            Ok(TransactionDetail {
                transaction: Transaction::try_from(model)?,
                account: Account::try_from(account)?,
                category: Category::try_from(category)?,
            })
        })
    }

    /// Return a transaction with its account and category.
    pub async fn transaction(&self, transaction_id: i32) -> ResultLedger<TransactionDetail> {
        with_tx!(self, |db_tx| {
            let model = self.require_transaction(&db_tx, transaction_id).await?;
            self.detail(&db_tx, model).await
        })
    }

    /// List transactions matching `filter`, newest first by
    /// `(transaction_date DESC, id DESC)`.
    ///
    /// The returned totals are computed over the completed subset of the same
    /// filter with the `status` field ignored, so a `pending` listing still
    /// reports the completed money movement of the period.
    pub async fn transactions(&self, filter: TransactionFilter) -> ResultLedger<TransactionPage> {
        let (page, per_page) = page_bounds(filter.page, filter.per_page);
        with_tx!(self, |db_tx| {
            let mut query = transactions::Entity::find().apply_tx_filters(&filter);
            if let Some(status) = filter.status {
                query = query.filter(transactions::Column::Status.eq(status.as_str()));
            }
            let total = query.clone().count(&db_tx).await?;
            let models = query
                .order_by_desc(transactions::Column::TransactionDate)
                .order_by_desc(transactions::Column::Id)
                .offset((page - 1) * per_page)
                .limit(per_page)
                .all(&db_tx)
                .await?;
            let details = load_details(&db_tx, models).await?;
            let (total_income, total_expense) = completed_totals(&db_tx, &filter).await?;
            Ok(TransactionPage {
                transactions: details,
                total,
                total_income,
                total_expense,
                balance: total_income - total_expense,
            })
        })
    }

    /// Update a transaction.
    ///
    /// The balance is recomputed as revert-then-apply: if the old snapshot
    /// was completed its effect is undone from the old account, and if the
    /// new snapshot is completed its effect is posted onto the new account.
    /// The kind check runs against the effective post-update pair, so a kind
    /// change with an unchanged category is validated too.
    pub async fn update_transaction(
        &self,
        transaction_id: i32,
        changes: TransactionChanges,
    ) -> ResultLedger<TransactionDetail> {
        let now = Utc::now();
        let description = changes
            .description
            .as_deref()
            .map(normalize_description)
            .transpose()?;
        if let Some(amount) = changes.amount {
            ensure_positive_amount(amount)?;
        }
        with_tx!(self, |db_tx| {
            let model = self.require_transaction(&db_tx, transaction_id).await?;
            let old_status = TransactionStatus::try_from(model.status.as_str())?;
            let old_kind = FlowKind::try_from(model.kind.as_str())?;
            let old_amount = model.amount;
            let old_account_id = model.account_id;

            let new_account_id = changes.account_id.unwrap_or(model.account_id);
            let new_category_id = changes.category_id.unwrap_or(model.category_id);
            let new_kind = changes.kind.unwrap_or(old_kind);
            let new_status = changes.status.unwrap_or(old_status);
            let new_amount = changes.amount.unwrap_or(old_amount);

            self.require_account(&db_tx, new_account_id).await?;
            let category = self.require_category(&db_tx, new_category_id).await?;
            ensure_kind_matches(new_kind, &category)?;

            if old_status == TransactionStatus::Completed {
                let account = self.require_account(&db_tx, old_account_id).await?;
                revert_from_account(&db_tx, account, old_amount, old_kind, now).await?;
            }

            let mut active: transactions::ActiveModel = model.into();
            if let Some(description) = description {
                active.description = ActiveValue::Set(description);
            }
            if let Some(amount) = changes.amount {
                active.amount = ActiveValue::Set(amount);
            }
            if let Some(kind) = changes.kind {
                active.kind = ActiveValue::Set(kind.as_str().to_string());
            }
            if let Some(status) = changes.status {
                active.status = ActiveValue::Set(status.as_str().to_string());
            }
            if let Some(transaction_date) = changes.transaction_date {
                active.transaction_date = ActiveValue::Set(transaction_date);
            }
            if let Some(notes) = changes.notes.as_deref() {
                active.notes = ActiveValue::Set(normalize_optional_text(Some(notes)));
            }
            if let Some(account_id) = changes.account_id {
                active.account_id = ActiveValue::Set(account_id);
            }
            if let Some(category_id) = changes.category_id {
                active.category_id = ActiveValue::Set(category_id);
            }
            active.updated_at = ActiveValue::Set(now);
            let model = active.update(&db_tx).await?;

            if new_status == TransactionStatus::Completed {
                let account = self.require_account(&db_tx, new_account_id).await?;
                apply_to_account(&db_tx, account, new_amount, new_kind, now).await?;
            }

            let account = self.require_account(&db_tx, new_account_id).await?;
            Ok(TransactionDetail {
                transaction: Transaction::try_from(model)?,
                account: Account::try_from(account)?,
                category: Category::try_from(category)?,
            })
        })
    }

    /// Flip a transaction between `pending` and `completed`.
    ///
    /// `pending → completed` posts the amount onto the account balance,
    /// `completed → pending` takes it back off, and setting the status it
    /// already has changes nothing.
    pub async fn set_transaction_status(
        &self,
        transaction_id: i32,
        status: TransactionStatus,
    ) -> ResultLedger<TransactionDetail> {
        let now = Utc::now();
        with_tx!(self, |db_tx| {
            let model = self.require_transaction(&db_tx, transaction_id).await?;
            let current = TransactionStatus::try_from(model.status.as_str())?;
            let model = if current == status {
                model
            } else {
                let kind = FlowKind::try_from(model.kind.as_str())?;
                let account = self.require_account(&db_tx, model.account_id).await?;
                match status {
                    TransactionStatus::Completed => {
                        apply_to_account(&db_tx, account, model.amount, kind, now).await?;
                    }
                    TransactionStatus::Pending => {
                        revert_from_account(&db_tx, account, model.amount, kind, now).await?;
                    }
                }
                let mut active: transactions::ActiveModel = model.into();
                active.status = ActiveValue::Set(status.as_str().to_string());
                active.updated_at = ActiveValue::Set(now);
                active.update(&db_tx).await?
            };
            self.detail(&db_tx, model).await
        })
    }

    /// Delete a transaction, undoing its balance effect if it was completed.
    pub async fn remove_transaction(&self, transaction_id: i32) -> ResultLedger<()> {
        let now = Utc::now();
        with_tx!(self, |db_tx| {
            let model = self.require_transaction(&db_tx, transaction_id).await?;
            if TransactionStatus::try_from(model.status.as_str())? == TransactionStatus::Completed {
                let kind = FlowKind::try_from(model.kind.as_str())?;
                let account = self.require_account(&db_tx, model.account_id).await?;
                revert_from_account(&db_tx, account, model.amount, kind, now).await?;
            }
            model.delete(&db_tx).await?;
            Ok(())
        })
    }

    /// Income, expense, and net totals over a date range.
    ///
    /// The count covers the same transaction set as the sums.
    pub async fn transaction_summary(
        &self,
        filter: SummaryFilter,
    ) -> ResultLedger<TransactionSummary> {
        with_tx!(self, |db_tx| {
            let mut query = transactions::Entity::find();
            if let Some(date_from) = filter.date_from {
                query = query.filter(transactions::Column::TransactionDate.gte(date_from));
            }
            if let Some(date_to) = filter.date_to {
                query = query.filter(transactions::Column::TransactionDate.lte(date_to));
            }
            if !filter.include_pending {
                query = query
                    .filter(transactions::Column::Status.eq(TransactionStatus::Completed.as_str()));
            }
            let total_transactions = query.clone().count(&db_tx).await?;
            let rows: Vec<(Decimal, String)> = query
                .select_only()
                .column(transactions::Column::Amount)
                .column(transactions::Column::Kind)
                .into_tuple()
                .all(&db_tx)
                .await?;
            let mut total_income = Decimal::ZERO;
            let mut total_expense = Decimal::ZERO;
            for (amount, kind) in rows {
                match FlowKind::try_from(kind.as_str())? {
                    FlowKind::Income => total_income += amount,
                    FlowKind::Expense => total_expense += amount,
                }
            }
            Ok(TransactionSummary {
                total_income,
                total_expense,
                balance: total_income - total_expense,
                total_transactions,
                period_start: filter.date_from,
                period_end: filter.date_to,
            })
        })
    }

    async fn require_transaction(
        &self,
        db_tx: &DatabaseTransaction,
        transaction_id: i32,
    ) -> ResultLedger<transactions::Model> {
        transactions::Entity::find_by_id(transaction_id)
            .one(db_tx)
            .await?
            .ok_or_else(|| LedgerError::NotFound(format!("transaction {transaction_id}")))
    }

    async fn detail(
        &self,
        db_tx: &DatabaseTransaction,
        model: transactions::Model,
    ) -> ResultLedger<TransactionDetail> {
        let account = Account::try_from(self.require_account(db_tx, model.account_id).await?)?;
        let category = Category::try_from(self.require_category(db_tx, model.category_id).await?)?;
        Ok(TransactionDetail {
            transaction: Transaction::try_from(model)?,
            account,
            category,
        })
    }
}

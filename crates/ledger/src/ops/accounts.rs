use chrono::Utc;

use sea_orm::{
    ActiveValue, Condition, DatabaseTransaction, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait, prelude::*, sea_query::Expr,
};

use crate::{
    Account, AccountKind, FlowKind, LedgerError, ResultLedger, TransactionStatus, accounts,
    balance, transactions,
};

use super::{
    Ledger, normalize_color, normalize_icon, normalize_optional_text, normalize_required_name,
    page_bounds, with_tx,
};

const DEFAULT_COLOR: &str = "#3B82F6";
const DEFAULT_ICON: &str = "wallet";

/// Input for [`Ledger::new_account`].
#[derive(Clone, Debug)]
pub struct NewAccount {
    pub name: String,
    pub kind: AccountKind,
    pub description: Option<String>,
    pub initial_balance: Decimal,
    pub color: Option<String>,
    pub icon: Option<String>,
}

/// Partial update for [`Ledger::update_account`]. `None` leaves a field
/// untouched; balances are never updatable through this path.
#[derive(Clone, Debug, Default)]
pub struct AccountChanges {
    pub name: Option<String>,
    pub kind: Option<AccountKind>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct AccountFilter {
    pub kind: Option<AccountKind>,
    pub search: Option<String>,
    /// `None` lists every account, `Some(b)` only those with `archived == b`.
    pub archived: Option<bool>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AccountPage {
    pub accounts: Vec<Account>,
    pub total: u64,
    /// Sum of `current_balance` over all non-archived accounts, independent
    /// of the filter.
    pub total_balance: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountBalance {
    pub account_id: i32,
    pub account_name: String,
    pub current_balance: Decimal,
}

impl Ledger {
    /// Create an account. The cached balance starts at `initial_balance`.
    pub async fn new_account(&self, input: NewAccount) -> ResultLedger<Account> {
        let now = Utc::now();
        let name = normalize_required_name(&input.name, "account")?;
        let color = match input.color.as_deref() {
            Some(color) => normalize_color(color)?,
            None => DEFAULT_COLOR.to_string(),
        };
        let icon = match input.icon.as_deref() {
            Some(icon) => normalize_icon(icon)?,
            None => DEFAULT_ICON.to_string(),
        };
        let description = normalize_optional_text(input.description.as_deref());
        with_tx!(self, |db_tx| {
            self.ensure_account_name_free(&db_tx, &name, None).await?;
            let active = accounts::ActiveModel {
                id: ActiveValue::NotSet,
                name: ActiveValue::Set(name.clone()),
                kind: ActiveValue::Set(input.kind.as_str().to_string()),
                description: ActiveValue::Set(description),
                initial_balance: ActiveValue::Set(input.initial_balance),
                current_balance: ActiveValue::Set(input.initial_balance),
                color: ActiveValue::Set(color),
                icon: ActiveValue::Set(icon),
                archived: ActiveValue::Set(false),
                archived_at: ActiveValue::Set(None),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            };
            let model = active.insert(&db_tx).await?;
            Account::try_from(model)
        })
    }

    /// Return an account snapshot, archived ones included.
    pub async fn account(&self, account_id: i32) -> ResultLedger<Account> {
        with_tx!(self, |db_tx| {
            let model = self.require_account(&db_tx, account_id).await?;
            Account::try_from(model)
        })
    }

    /// List accounts matching `filter`, ordered by name.
    pub async fn accounts(&self, filter: AccountFilter) -> ResultLedger<AccountPage> {
        let (page, per_page) = page_bounds(filter.page, filter.per_page);
        with_tx!(self, |db_tx| {
            let mut query = accounts::Entity::find();
            if let Some(kind) = filter.kind {
                query = query.filter(accounts::Column::Kind.eq(kind.as_str()));
            }
            if let Some(search) = normalize_optional_text(filter.search.as_deref()) {
                let pattern = format!("%{}%", search.to_lowercase());
                query = query.filter(
                    Condition::any()
                        .add(Expr::cust("LOWER(name)").like(pattern.clone()))
                        .add(Expr::cust("LOWER(description)").like(pattern)),
                );
            }
            if let Some(archived) = filter.archived {
                query = query.filter(accounts::Column::Archived.eq(archived));
            }
            let total = query.clone().count(&db_tx).await?;
            let models = query
                .order_by_asc(accounts::Column::Name)
                .offset((page - 1) * per_page)
                .limit(per_page)
                .all(&db_tx)
                .await?;
            let accounts = models
                .into_iter()
                .map(Account::try_from)
                .collect::<ResultLedger<Vec<_>>>()?;
            let total_balance = active_balance_total(&db_tx).await?;
            Ok(AccountPage {
                accounts,
                total,
                total_balance,
            })
        })
    }

    /// Update an account's descriptive fields.
    pub async fn update_account(
        &self,
        account_id: i32,
        changes: AccountChanges,
    ) -> ResultLedger<Account> {
        let now = Utc::now();
        let name = changes
            .name
            .as_deref()
            .map(|name| normalize_required_name(name, "account"))
            .transpose()?;
        let color = changes.color.as_deref().map(normalize_color).transpose()?;
        let icon = changes.icon.as_deref().map(normalize_icon).transpose()?;
        with_tx!(self, |db_tx| {
            let model = self.require_account(&db_tx, account_id).await?;
            if let Some(name) = &name {
                self.ensure_account_name_free(&db_tx, name, Some(account_id))
                    .await?;
            }
            let mut active: accounts::ActiveModel = model.into();
            if let Some(name) = name {
                active.name = ActiveValue::Set(name);
            }
            if let Some(kind) = changes.kind {
                active.kind = ActiveValue::Set(kind.as_str().to_string());
            }
            if let Some(description) = changes.description.as_deref() {
                active.description = ActiveValue::Set(normalize_optional_text(Some(description)));
            }
            if let Some(color) = color {
                active.color = ActiveValue::Set(color);
            }
            if let Some(icon) = icon {
                active.icon = ActiveValue::Set(icon);
            }
            active.updated_at = ActiveValue::Set(now);
            let model = active.update(&db_tx).await?;
            Account::try_from(model)
        })
    }

    /// Archive an account, or delete its row when `permanent`. Both modes are
    /// refused while transactions still reference the account.
    pub async fn remove_account(&self, account_id: i32, permanent: bool) -> ResultLedger<()> {
        let now = Utc::now();
        with_tx!(self, |db_tx| {
            let model = self.require_account(&db_tx, account_id).await?;
            let in_use = transactions::Entity::find()
                .filter(transactions::Column::AccountId.eq(account_id))
                .one(&db_tx)
                .await?
                .is_some();
            if in_use {
                return Err(LedgerError::InUse(format!("account {account_id}")));
            }
            if permanent {
                model.delete(&db_tx).await?;
            } else {
                let mut active: accounts::ActiveModel = model.into();
                active.archived = ActiveValue::Set(true);
                active.archived_at = ActiveValue::Set(Some(now));
                active.updated_at = ActiveValue::Set(now);
                active.update(&db_tx).await?;
            }
            Ok(())
        })
    }

    /// Bring an archived account back.
    pub async fn restore_account(&self, account_id: i32) -> ResultLedger<Account> {
        let now = Utc::now();
        with_tx!(self, |db_tx| {
            let model = self.require_account(&db_tx, account_id).await?;
            let mut active: accounts::ActiveModel = model.into();
            active.archived = ActiveValue::Set(false);
            active.archived_at = ActiveValue::Set(None);
            active.updated_at = ActiveValue::Set(now);
            let model = active.update(&db_tx).await?;
            Account::try_from(model)
        })
    }

    /// Return the stored balance of an account.
    pub async fn account_balance(&self, account_id: i32) -> ResultLedger<AccountBalance> {
        with_tx!(self, |db_tx| {
            let model = self.require_account(&db_tx, account_id).await?;
            Ok(AccountBalance {
                account_id: model.id,
                account_name: model.name,
                current_balance: model.current_balance,
            })
        })
    }

    /// Re-derive the cached balance from the completed transactions and store
    /// it. Returns the recomputed value.
    pub async fn recompute_account_balance(&self, account_id: i32) -> ResultLedger<Decimal> {
        let now = Utc::now();
        with_tx!(self, |db_tx| {
            let model = self.require_account(&db_tx, account_id).await?;
            let rows: Vec<(Decimal, String)> = transactions::Entity::find()
                .filter(transactions::Column::AccountId.eq(account_id))
                .filter(transactions::Column::Status.eq(TransactionStatus::Completed.as_str()))
                .select_only()
                .column(transactions::Column::Amount)
                .column(transactions::Column::Kind)
                .into_tuple()
                .all(&db_tx)
                .await?;
            let mut total = model.initial_balance;
            for (amount, kind) in rows {
                total = balance::apply(total, amount, FlowKind::try_from(kind.as_str())?);
            }
            let mut active: accounts::ActiveModel = model.into();
            active.current_balance = ActiveValue::Set(total);
            active.updated_at = ActiveValue::Set(now);
            active.update(&db_tx).await?;
            Ok(total)
        })
    }

    pub(super) async fn require_account(
        &self,
        db_tx: &DatabaseTransaction,
        account_id: i32,
    ) -> ResultLedger<accounts::Model> {
        accounts::Entity::find_by_id(account_id)
            .one(db_tx)
            .await?
            .ok_or_else(|| LedgerError::NotFound(format!("account {account_id}")))
    }

    async fn ensure_account_name_free(
        &self,
        db_tx: &DatabaseTransaction,
        name: &str,
        exclude_id: Option<i32>,
    ) -> ResultLedger<()> {
        let mut query =
            accounts::Entity::find().filter(Expr::cust("LOWER(name)").eq(name.to_lowercase()));
        if let Some(id) = exclude_id {
            query = query.filter(accounts::Column::Id.ne(id));
        }
        if query.one(db_tx).await?.is_some() {
            return Err(LedgerError::AlreadyExists(name.to_string()));
        }
        Ok(())
    }
}

async fn active_balance_total(db_tx: &DatabaseTransaction) -> ResultLedger<Decimal> {
    let balances: Vec<Decimal> = accounts::Entity::find()
        .filter(accounts::Column::Archived.eq(false))
        .select_only()
        .column(accounts::Column::CurrentBalance)
        .into_tuple()
        .all(db_tx)
        .await?;
    Ok(balances.into_iter().sum())
}

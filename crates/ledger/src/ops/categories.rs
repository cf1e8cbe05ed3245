use chrono::Utc;

use sea_orm::{
    ActiveValue, Condition, DatabaseTransaction, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait, prelude::*, sea_query::Expr,
};

use crate::{Category, FlowKind, LedgerError, ResultLedger, categories, transactions};

use super::{
    Ledger, normalize_color, normalize_icon, normalize_optional_text, normalize_required_name,
    page_bounds, with_tx,
};

const DEFAULT_COLOR: &str = "#6B7280";
const DEFAULT_ICON: &str = "tag";

/// Input for [`Ledger::new_category`].
#[derive(Clone, Debug)]
pub struct NewCategory {
    pub name: String,
    pub kind: FlowKind,
    pub description: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
}

/// Partial update for [`Ledger::update_category`].
#[derive(Clone, Debug, Default)]
pub struct CategoryChanges {
    pub name: Option<String>,
    pub kind: Option<FlowKind>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct CategoryFilter {
    pub kind: Option<FlowKind>,
    pub search: Option<String>,
    pub archived: Option<bool>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CategoryPage {
    pub categories: Vec<Category>,
    pub total: u64,
}

impl Ledger {
    /// Create a category.
    pub async fn new_category(&self, input: NewCategory) -> ResultLedger<Category> {
        let now = Utc::now();
        let name = normalize_required_name(&input.name, "category")?;
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
            self.ensure_category_name_free(&db_tx, &name, None).await?;
            let active = categories::ActiveModel {
                id: ActiveValue::NotSet,
                name: ActiveValue::Set(name.clone()),
                kind: ActiveValue::Set(input.kind.as_str().to_string()),
                description: ActiveValue::Set(description),
                color: ActiveValue::Set(color),
                icon: ActiveValue::Set(icon),
                archived: ActiveValue::Set(false),
                archived_at: ActiveValue::Set(None),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            };
            let model = active.insert(&db_tx).await?;
            Category::try_from(model)
        })
    }

    /// Return a category snapshot, archived ones included.
    pub async fn category(&self, category_id: i32) -> ResultLedger<Category> {
        with_tx!(self, |db_tx| {
            let model = self.require_category(&db_tx, category_id).await?;
            Category::try_from(model)
        })
    }

    /// List categories matching `filter`, ordered by name.
    pub async fn categories(&self, filter: CategoryFilter) -> ResultLedger<CategoryPage> {
        let (page, per_page) = page_bounds(filter.page, filter.per_page);
        with_tx!(self, |db_tx| {
            let mut query = categories::Entity::find();
            if let Some(kind) = filter.kind {
                query = query.filter(categories::Column::Kind.eq(kind.as_str()));
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
                query = query.filter(categories::Column::Archived.eq(archived));
            }
            let total = query.clone().count(&db_tx).await?;
            let models = query
                .order_by_asc(categories::Column::Name)
                .offset((page - 1) * per_page)
                .limit(per_page)
                .all(&db_tx)
                .await?;
            let categories = models
                .into_iter()
                .map(Category::try_from)
                .collect::<ResultLedger<Vec<_>>>()?;
            Ok(CategoryPage { categories, total })
        })
    }

    /// Non-archived categories of one flow direction, ordered by name.
    pub async fn categories_by_kind(
        &self,
        kind: FlowKind,
        page: Option<u64>,
        per_page: Option<u64>,
    ) -> ResultLedger<CategoryPage> {
        self.categories(CategoryFilter {
            kind: Some(kind),
            archived: Some(false),
            page,
            per_page,
            ..Default::default()
        })
        .await
    }

    /// Update a category's descriptive fields.
    pub async fn update_category(
        &self,
        category_id: i32,
        changes: CategoryChanges,
    ) -> ResultLedger<Category> {
        let now = Utc::now();
        let name = changes
            .name
            .as_deref()
            .map(|name| normalize_required_name(name, "category"))
            .transpose()?;
        let color = changes.color.as_deref().map(normalize_color).transpose()?;
        let icon = changes.icon.as_deref().map(normalize_icon).transpose()?;
        with_tx!(self, |db_tx| {
            let model = self.require_category(&db_tx, category_id).await?;
            if let Some(name) = &name {
                self.ensure_category_name_free(&db_tx, name, Some(category_id))
                    .await?;
            }
            let mut active: categories::ActiveModel = model.into();
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
            Category::try_from(model)
        })
    }

    /// Archive a category, or delete its row when `permanent`. Both modes are
    /// refused while transactions still reference the category.
    pub async fn remove_category(&self, category_id: i32, permanent: bool) -> ResultLedger<()> {
        let now = Utc::now();
        with_tx!(self, |db_tx| {
            let model = self.require_category(&db_tx, category_id).await?;
            let in_use = transactions::Entity::find()
                .filter(transactions::Column::CategoryId.eq(category_id))
                .one(&db_tx)
                .await?
                .is_some();
            if in_use {
                return Err(LedgerError::InUse(format!("category {category_id}")));
            }
            if permanent {
                model.delete(&db_tx).await?;
            } else {
                let mut active: categories::ActiveModel = model.into();
                active.archived = ActiveValue::Set(true);
                active.archived_at = ActiveValue::Set(Some(now));
                active.updated_at = ActiveValue::Set(now);
                active.update(&db_tx).await?;
            }
            Ok(())
        })
    }

    /// Bring an archived category back.
    pub async fn restore_category(&self, category_id: i32) -> ResultLedger<Category> {
        let now = Utc::now();
        with_tx!(self, |db_tx| {
            let model = self.require_category(&db_tx, category_id).await?;
            let mut active: categories::ActiveModel = model.into();
            active.archived = ActiveValue::Set(false);
            active.archived_at = ActiveValue::Set(None);
            active.updated_at = ActiveValue::Set(now);
            let model = active.update(&db_tx).await?;
            Category::try_from(model)
        })
    }

    pub(super) async fn require_category(
        &self,
        db_tx: &DatabaseTransaction,
        category_id: i32,
    ) -> ResultLedger<categories::Model> {
        categories::Entity::find_by_id(category_id)
            .one(db_tx)
            .await?
            .ok_or_else(|| LedgerError::NotFound(format!("category {category_id}")))
    }

    async fn ensure_category_name_free(
        &self,
        db_tx: &DatabaseTransaction,
        name: &str,
        exclude_id: Option<i32>,
    ) -> ResultLedger<()> {
        let mut query =
            categories::Entity::find().filter(Expr::cust("LOWER(name)").eq(name.to_lowercase()));
        if let Some(id) = exclude_id {
            query = query.filter(categories::Column::Id.ne(id));
        }
        if query.one(db_tx).await?.is_some() {
            return Err(LedgerError::AlreadyExists(name.to_string()));
        }
        Ok(())
    }
}

//! Account records and their storage model.
//!
//! An `Account` caches its running balance: `current_balance` always equals
//! `initial_balance` plus the signed sum of its completed transactions. The
//! transaction lifecycle operations keep the cache in step.
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::LedgerError;

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

impl AccountKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Checking => "checking",
            Self::Savings => "savings",
            Self::Investment => "investment",
            Self::CreditCard => "credit_card",
            Self::Cash => "cash",
            Self::Other => "other",
        }
    }
}

impl TryFrom<&str> for AccountKind {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "checking" => Ok(Self::Checking),
            "savings" => Ok(Self::Savings),
            "investment" => Ok(Self::Investment),
            "credit_card" => Ok(Self::CreditCard),
            "cash" => Ok(Self::Cash),
            "other" => Ok(Self::Other),
            other => Err(LedgerError::InvalidKind(format!(
                "unknown account kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: i32,
    pub name: String,
    pub kind: AccountKind,
    pub description: Option<String>,
    pub initial_balance: Decimal,
    pub current_balance: Decimal,
    pub color: String,
    pub icon: String,
    pub archived: bool,
    pub archived_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn is_active(&self) -> bool {
        !self.archived
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub kind: String,
    pub description: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub initial_balance: Decimal,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub current_balance: Decimal,
    pub color: String,
    pub icon: String,
    pub archived: bool,
    pub archived_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Account {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            name: model.name,
            kind: AccountKind::try_from(model.kind.as_str())?,
            description: model.description,
            initial_balance: model.initial_balance,
            current_balance: model.current_balance,
            color: model.color,
            icon: model.icon,
            archived: model.archived,
            archived_at: model.archived_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

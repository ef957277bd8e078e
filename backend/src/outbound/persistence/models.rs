//! Internal Diesel row structs and their conversions into domain types.
//!
//! Rows never leave the persistence layer. Conversions that can fail (unknown
//! enum text, out-of-range ids) report a message the adapters wrap in their
//! own query error.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::domain::{
    Document, DocumentId, DocumentStatus, DocumentSummary, Plan, PlanId, PlanType, UserAccount,
    UserId,
};

use super::schema::{documents, plans, transactions, users};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = plans)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PlanRow {
    pub id: i64,
    pub name: String,
    pub plan_type: String,
    pub price_minor: i64,
    pub currency: String,
    pub document_cost_minor: i64,
    pub is_watermarked_export: bool,
    pub max_documents_per_day: Option<i32>,
    pub initial_credits: i32,
    pub features: serde_json::Value,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i64,
    pub name: String,
    pub document_credits: i32,
    pub current_plan_id: i64,
    pub subscription_end: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = documents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct DocumentRow {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub content: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = documents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct DocumentSummaryRow {
    pub id: i64,
    pub title: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = documents)]
pub(crate) struct NewDocumentRow<'a> {
    pub user_id: i64,
    pub title: &'a str,
    pub content: &'a str,
    pub status: &'a str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = documents)]
pub(crate) struct DraftUpdate<'a> {
    pub title: &'a str,
    pub content: &'a str,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = documents)]
pub(crate) struct StatusUpdate<'a> {
    pub status: &'a str,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = transactions)]
pub(crate) struct NewTransactionRow<'a> {
    pub user_id: i64,
    pub plan_id: i64,
    pub amount_minor: i64,
    pub currency: &'a str,
    pub status: &'a str,
}

fn id<T, E: std::fmt::Display>(raw: i64, parse: impl FnOnce(i64) -> Result<T, E>) -> Result<T, String> {
    parse(raw).map_err(|error| error.to_string())
}

impl TryFrom<PlanRow> for Plan {
    type Error = String;

    fn try_from(row: PlanRow) -> Result<Self, Self::Error> {
        let plan_type: PlanType = row.plan_type.parse().map_err(|error| format!("{error}"))?;
        let max_documents_per_day = row
            .max_documents_per_day
            .map(u32::try_from)
            .transpose()
            .map_err(|error| format!("invalid daily cap: {error}"))?;
        let features = serde_json::from_value(row.features)
            .map_err(|error| format!("invalid plan features: {error}"))?;
        Ok(Self {
            id: id(row.id, PlanId::new)?,
            name: row.name,
            plan_type,
            price_minor: row.price_minor,
            currency: row.currency,
            document_cost_minor: row.document_cost_minor,
            is_watermarked_export: row.is_watermarked_export,
            max_documents_per_day,
            initial_credits: row.initial_credits,
            features,
        })
    }
}

impl TryFrom<UserRow> for UserAccount {
    type Error = String;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: id(row.id, UserId::new)?,
            name: row.name,
            document_credits: row.document_credits,
            current_plan_id: id(row.current_plan_id, PlanId::new)?,
            subscription_end: row.subscription_end,
        })
    }
}

fn status(raw: &str) -> Result<DocumentStatus, String> {
    raw.parse().map_err(|error| format!("{error}"))
}

impl TryFrom<DocumentRow> for Document {
    type Error = String;

    fn try_from(row: DocumentRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: id(row.id, DocumentId::new)?,
            user_id: id(row.user_id, UserId::new)?,
            title: row.title,
            content: row.content,
            status: status(&row.status)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl TryFrom<DocumentSummaryRow> for DocumentSummary {
    type Error = String;

    fn try_from(row: DocumentSummaryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: id(row.id, DocumentId::new)?,
            title: row.title,
            status: status(&row.status)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Subscription and credit plans. Seeded by the initial migration.
    plans (id) {
        id -> Int8,
        name -> Varchar,
        plan_type -> Varchar,
        price_minor -> Int8,
        currency -> Varchar,
        document_cost_minor -> Int8,
        is_watermarked_export -> Bool,
        /// Null when the plan has no daily cap.
        max_documents_per_day -> Nullable<Int4>,
        initial_credits -> Int4,
        /// JSON array of marketing bullet points.
        features -> Jsonb,
    }
}

diesel::table! {
    /// Accounts. Credentials live with the external login service.
    users (id) {
        id -> Int8,
        name -> Varchar,
        /// Never negative; guarded by a check constraint.
        document_credits -> Int4,
        current_plan_id -> Int8,
        subscription_end -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    documents (id) {
        id -> Int8,
        user_id -> Int8,
        title -> Varchar,
        content -> Text,
        /// `draft`, `submitted` or `exported`.
        status -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Simulated payments.
    transactions (id) {
        id -> Int8,
        user_id -> Int8,
        plan_id -> Int8,
        amount_minor -> Int8,
        currency -> Varchar,
        /// `pending` or `completed`.
        status -> Varchar,
        payment_reference -> Nullable<Varchar>,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(documents -> users (user_id));
diesel::joinable!(transactions -> users (user_id));
diesel::joinable!(transactions -> plans (plan_id));
diesel::joinable!(users -> plans (current_plan_id));

diesel::allow_tables_to_appear_in_same_query!(documents, plans, transactions, users);

//! In-process store implementing the persistence ports.
//!
//! Every mutation works on a copy of the state and swaps it in only once all
//! of its steps succeeded, so a failure part-way through leaves nothing
//! behind. This mirrors the transaction boundaries of the Diesel adapters.

mod seed;

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
#[cfg(any(test, feature = "test-support"))]
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

pub use seed::{
    DEMO_USER_ID, FREE_PLAN_ID, MONTHLY_PLAN_ID, PAY_PER_DOCUMENT_PLAN_ID, default_plans,
    demo_state,
};

use crate::domain::ports::{
    BillingRepository, BillingRepositoryError, DocumentRepository, DocumentRepositoryError,
    DraftContent, ExportCommit, ExportReceipt, ExportStore, ExportStoreError, PurchaseCommit,
    PurchaseEffect, PurchaseReceipt,
};
use crate::domain::{
    Document, DocumentId, DocumentStatus, DocumentSummary, Plan, PlanId, TransactionId,
    UserAccount, UserId, payment_reference,
};

/// Status of a recorded payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    Pending,
    Completed,
}

/// A simulated payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord {
    pub id: TransactionId,
    pub user_id: UserId,
    pub plan_id: PlanId,
    pub amount_minor: i64,
    pub currency: String,
    pub status: TransactionStatus,
    pub payment_reference: Option<String>,
}

/// Complete contents of an [`InMemoryStore`].
#[derive(Debug, Clone, Default)]
pub struct StoreState {
    users: BTreeMap<UserId, UserAccount>,
    plans: BTreeMap<PlanId, Plan>,
    documents: BTreeMap<DocumentId, Document>,
    transactions: Vec<TransactionRecord>,
    last_document_id: i64,
    last_transaction_id: i64,
}

impl StoreState {
    pub fn with_plans(plans: impl IntoIterator<Item = Plan>) -> Self {
        Self {
            plans: plans.into_iter().map(|plan| (plan.id, plan)).collect(),
            ..Self::default()
        }
    }

    pub fn insert_user(&mut self, user: UserAccount) {
        self.users.insert(user.id, user);
    }

    pub fn insert_plan(&mut self, plan: Plan) {
        self.plans.insert(plan.id, plan);
    }

    /// Insert a document under its own id; later drafts are numbered after it.
    pub fn insert_document(&mut self, document: Document) {
        self.last_document_id = self.last_document_id.max(document.id.get());
        self.documents.insert(document.id, document);
    }

    fn owned_document_mut(
        &mut self,
        document_id: DocumentId,
        user_id: UserId,
    ) -> Option<&mut Document> {
        self.documents
            .get_mut(&document_id)
            .filter(|document| document.user_id == user_id)
    }

    fn exported_since(&self, user_id: UserId, day_start: DateTime<Utc>) -> u32 {
        let count = self
            .documents
            .values()
            .filter(|document| {
                document.user_id == user_id
                    && document.status == DocumentStatus::Exported
                    && document.updated_at >= day_start
            })
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }
}

/// Mutex-guarded store shared by the export, document and billing ports.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<StoreState>,
    #[cfg(any(test, feature = "test-support"))]
    fail_next_commit: AtomicBool,
}

impl InMemoryStore {
    pub fn new(state: StoreState) -> Self {
        Self {
            state: Mutex::new(state),
            #[cfg(any(test, feature = "test-support"))]
            fail_next_commit: AtomicBool::new(false),
        }
    }

    /// Store seeded with the default plans and the demo account.
    pub fn with_demo_data(now: DateTime<Utc>) -> Self {
        Self::new(demo_state(now))
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, String> {
        self.state
            .lock()
            .map_err(|_| "in-memory store lock poisoned".to_owned())
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> Option<StoreState> {
        self.lock().ok().map(|state| state.clone())
    }

    /// Run `mutate` against a copy of the state and keep the copy only when
    /// it succeeds.
    fn commit<T, E>(
        &self,
        poisoned: impl FnOnce(String) -> E,
        mutate: impl FnOnce(&mut StoreState, &dyn Fn() -> bool) -> Result<T, E>,
    ) -> Result<T, E> {
        let mut guard = self.lock().map_err(poisoned)?;
        let mut draft = guard.clone();
        let value = mutate(&mut draft, &|| self.take_injected_failure())?;
        *guard = draft;
        Ok(value)
    }

    #[cfg(any(test, feature = "test-support"))]
    fn take_injected_failure(&self) -> bool {
        self.fail_next_commit.swap(false, Ordering::SeqCst)
    }

    #[cfg(not(any(test, feature = "test-support")))]
    fn take_injected_failure(&self) -> bool {
        false
    }

    /// Make the next multi-step commit fail between its first and second
    /// write.
    #[cfg(any(test, feature = "test-support"))]
    pub fn fail_next_commit(&self) {
        self.fail_next_commit.store(true, Ordering::SeqCst);
    }

    pub fn user(&self, user_id: UserId) -> Option<UserAccount> {
        self.lock().ok()?.users.get(&user_id).cloned()
    }

    pub fn document(&self, document_id: DocumentId) -> Option<Document> {
        self.lock().ok()?.documents.get(&document_id).cloned()
    }

    pub fn transactions(&self) -> Vec<TransactionRecord> {
        self.lock()
            .map(|state| state.transactions.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ExportStore for InMemoryStore {
    async fn get_user(&self, user_id: UserId) -> Result<Option<UserAccount>, ExportStoreError> {
        let state = self.lock().map_err(ExportStoreError::query)?;
        Ok(state.users.get(&user_id).cloned())
    }

    async fn get_plan(&self, plan_id: PlanId) -> Result<Option<Plan>, ExportStoreError> {
        let state = self.lock().map_err(ExportStoreError::query)?;
        Ok(state.plans.get(&plan_id).cloned())
    }

    async fn get_document(
        &self,
        document_id: DocumentId,
        user_id: UserId,
    ) -> Result<Option<Document>, ExportStoreError> {
        let state = self.lock().map_err(ExportStoreError::query)?;
        Ok(state
            .documents
            .get(&document_id)
            .filter(|document| document.user_id == user_id)
            .cloned())
    }

    async fn count_exported_today(
        &self,
        user_id: UserId,
        day_start: DateTime<Utc>,
    ) -> Result<u32, ExportStoreError> {
        let state = self.lock().map_err(ExportStoreError::query)?;
        Ok(state.exported_since(user_id, day_start))
    }

    async fn apply_export(&self, commit: &ExportCommit) -> Result<ExportReceipt, ExportStoreError> {
        self.commit(ExportStoreError::query, |state, injected_failure| {
            if state
                .owned_document_mut(commit.document_id, commit.user_id)
                .is_none()
            {
                return Err(ExportStoreError::document_missing());
            }
            if let Some(cap) = commit.daily_cap {
                if state.exported_since(commit.user_id, cap.day_start) >= cap.limit {
                    return Err(ExportStoreError::daily_limit_reached(cap.limit));
                }
            }

            let user = state
                .users
                .get_mut(&commit.user_id)
                .ok_or_else(ExportStoreError::document_missing)?;
            if commit.credit_delta < 0 && user.document_credits + commit.credit_delta < 0 {
                return Err(ExportStoreError::credits_exhausted());
            }
            user.document_credits += commit.credit_delta;
            let remaining_credits = user.document_credits;

            if injected_failure() {
                return Err(ExportStoreError::query("injected failure after credit update"));
            }

            let document = state
                .owned_document_mut(commit.document_id, commit.user_id)
                .ok_or_else(ExportStoreError::document_missing)?;
            document.status = DocumentStatus::Exported;
            document.updated_at = commit.exported_at;
            debug!(document_id = %commit.document_id, remaining_credits, "export committed");
            Ok(ExportReceipt { remaining_credits })
        })
    }
}

#[async_trait]
impl DocumentRepository for InMemoryStore {
    async fn create_draft(
        &self,
        user_id: UserId,
        draft: &DraftContent,
        at: DateTime<Utc>,
    ) -> Result<Document, DocumentRepositoryError> {
        self.commit(DocumentRepositoryError::query, |state, _| {
            let id = DocumentId::new(state.last_document_id + 1)
                .map_err(|error| DocumentRepositoryError::query(error.to_string()))?;
            let document = Document {
                id,
                user_id,
                title: draft.title.clone(),
                content: draft.content.clone(),
                status: DocumentStatus::Draft,
                created_at: at,
                updated_at: at,
            };
            state.insert_document(document.clone());
            Ok(document)
        })
    }

    async fn update_draft(
        &self,
        document_id: DocumentId,
        user_id: UserId,
        draft: &DraftContent,
        at: DateTime<Utc>,
    ) -> Result<Option<Document>, DocumentRepositoryError> {
        self.commit(DocumentRepositoryError::query, |state, _| {
            Ok(state
                .owned_document_mut(document_id, user_id)
                .map(|document| {
                    document.title.clone_from(&draft.title);
                    document.content.clone_from(&draft.content);
                    document.updated_at = at;
                    document.clone()
                }))
        })
    }

    async fn mark_submitted(
        &self,
        document_id: DocumentId,
        user_id: UserId,
        at: DateTime<Utc>,
    ) -> Result<Option<Document>, DocumentRepositoryError> {
        self.commit(DocumentRepositoryError::query, |state, _| {
            Ok(state
                .owned_document_mut(document_id, user_id)
                .map(|document| {
                    document.status = DocumentStatus::Submitted;
                    document.updated_at = at;
                    document.clone()
                }))
        })
    }

    async fn find(
        &self,
        document_id: DocumentId,
        user_id: UserId,
    ) -> Result<Option<Document>, DocumentRepositoryError> {
        let state = self.lock().map_err(DocumentRepositoryError::query)?;
        Ok(state
            .documents
            .get(&document_id)
            .filter(|document| document.user_id == user_id)
            .cloned())
    }

    async fn list_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<DocumentSummary>, DocumentRepositoryError> {
        let state = self.lock().map_err(DocumentRepositoryError::query)?;
        let mut summaries: Vec<DocumentSummary> = state
            .documents
            .values()
            .filter(|document| document.user_id == user_id)
            .map(DocumentSummary::from)
            .collect();
        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));
        Ok(summaries)
    }
}

#[async_trait]
impl BillingRepository for InMemoryStore {
    async fn list_plans(&self) -> Result<Vec<Plan>, BillingRepositoryError> {
        let state = self.lock().map_err(BillingRepositoryError::query)?;
        Ok(state.plans.values().cloned().collect())
    }

    async fn find_plan(&self, plan_id: PlanId) -> Result<Option<Plan>, BillingRepositoryError> {
        let state = self.lock().map_err(BillingRepositoryError::query)?;
        Ok(state.plans.get(&plan_id).cloned())
    }

    async fn find_account(
        &self,
        user_id: UserId,
    ) -> Result<Option<UserAccount>, BillingRepositoryError> {
        let state = self.lock().map_err(BillingRepositoryError::query)?;
        Ok(state.users.get(&user_id).cloned())
    }

    async fn apply_purchase(
        &self,
        commit: &PurchaseCommit,
    ) -> Result<PurchaseReceipt, BillingRepositoryError> {
        self.commit(BillingRepositoryError::query, |state, injected_failure| {
            if !state.users.contains_key(&commit.user_id) {
                return Err(BillingRepositoryError::account_missing());
            }
            let id = TransactionId::new(state.last_transaction_id + 1)
                .map_err(|error| BillingRepositoryError::query(error.to_string()))?;
            state.last_transaction_id = id.get();
            state.transactions.push(TransactionRecord {
                id,
                user_id: commit.user_id,
                plan_id: commit.plan_id,
                amount_minor: commit.amount_minor,
                currency: commit.currency.clone(),
                status: TransactionStatus::Pending,
                payment_reference: None,
            });

            let user = state
                .users
                .get_mut(&commit.user_id)
                .ok_or_else(BillingRepositoryError::account_missing)?;
            match commit.effect {
                PurchaseEffect::AddCredits(quantity) => {
                    user.document_credits = i32::try_from(quantity)
                        .ok()
                        .and_then(|quantity| user.document_credits.checked_add(quantity))
                        .ok_or_else(|| BillingRepositoryError::query("credit balance overflow"))?;
                }
                PurchaseEffect::Subscribe { plan_id, until } => {
                    user.current_plan_id = plan_id;
                    user.subscription_end = Some(until);
                }
            }

            if injected_failure() {
                return Err(BillingRepositoryError::query(
                    "injected failure before payment completion",
                ));
            }

            let reference = payment_reference(id);
            if let Some(record) = state.transactions.last_mut() {
                record.status = TransactionStatus::Completed;
                record.payment_reference = Some(reference.clone());
            }
            Ok(PurchaseReceipt {
                transaction_id: id,
                reference,
            })
        })
    }
}

// src/stores/mod.rs
//
// The tenant lookup and the statutory-rate repository sit behind traits so
// the core rules can be exercised against an in-memory store in tests while
// production talks to Postgres.

pub mod pg;

#[cfg(test)]
pub mod memory;

use crate::errors::AppResult;
use crate::models::{Company, RateCategory, StatutoryRateRule};
use crate::services::rates::RateWindow;
use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

#[async_trait]
pub trait TenantStore: Send + Sync {
    /// Resolve a company for the authenticated user. Returns `None` whether
    /// the company is missing, soft-deleted, or owned by someone else — the
    /// caller cannot distinguish those cases.
    async fn find_for_owner(&self, company_id: Uuid, owner: Uuid) -> AppResult<Option<Company>>;
}

#[derive(Debug, Clone)]
pub struct NewRateRule {
    pub rate_type: RateCategory,
    pub window: RateWindow,
    pub employee_percent: Decimal,
    pub employer_percent: Decimal,
    pub wage_ceiling: Option<Decimal>,
    pub admin_percent: Option<Decimal>,
}

/// Partial update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct RateRulePatch {
    pub effective_from: Option<chrono::NaiveDate>,
    pub effective_to: Option<chrono::NaiveDate>,
    pub employee_percent: Option<Decimal>,
    pub employer_percent: Option<Decimal>,
    pub wage_ceiling: Option<Decimal>,
    pub admin_percent: Option<Decimal>,
}

#[async_trait]
pub trait RateRuleStore: Send + Sync {
    /// Active rules for a tenant, optionally filtered by category, newest
    /// effective_from first.
    async fn list(
        &self,
        company_id: Uuid,
        category: Option<RateCategory>,
    ) -> AppResult<Vec<StatutoryRateRule>>;

    async fn create(
        &self,
        company_id: Uuid,
        actor: Uuid,
        rule: NewRateRule,
    ) -> AppResult<StatutoryRateRule>;

    async fn update(
        &self,
        company_id: Uuid,
        id: Uuid,
        actor: Uuid,
        patch: RateRulePatch,
    ) -> AppResult<StatutoryRateRule>;

    async fn soft_delete(&self, company_id: Uuid, id: Uuid, actor: Uuid) -> AppResult<()>;
}

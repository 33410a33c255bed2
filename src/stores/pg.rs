// src/stores/pg.rs

use super::{NewRateRule, RateRulePatch, RateRuleStore, TenantStore};
use crate::errors::{AppError, AppResult};
use crate::models::{Company, RateCategory, StatutoryRateRule};
use crate::services::rates::{RateWindow, ensure_no_overlap};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct PgTenantStore {
    pool: PgPool,
}

impl PgTenantStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TenantStore for PgTenantStore {
    async fn find_for_owner(&self, company_id: Uuid, owner: Uuid) -> AppResult<Option<Company>> {
        let company = sqlx::query_as::<_, Company>(
            "SELECT * FROM companies
             WHERE id = $1 AND owner_user_id = $2 AND deleted_at IS NULL",
        )
        .bind(company_id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;

        Ok(company)
    }
}

#[derive(Clone)]
pub struct PgRateRuleStore {
    pool: PgPool,
}

impl PgRateRuleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// The exclusion constraint is the backstop for the check-then-write race:
/// two concurrent creations can both pass the application-side check, but
/// only one commit survives; the loser surfaces as the same overlap error.
fn map_exclusion_violation(err: sqlx::Error, category: RateCategory) -> AppError {
    if let sqlx::Error::Database(ref db) = err {
        if db.code().as_deref() == Some("23P01") {
            return AppError::Overlap {
                category: category.as_str().to_string(),
            };
        }
    }
    AppError::Database(err)
}

#[async_trait]
impl RateRuleStore for PgRateRuleStore {
    async fn list(
        &self,
        company_id: Uuid,
        category: Option<RateCategory>,
    ) -> AppResult<Vec<StatutoryRateRule>> {
        let rules = sqlx::query_as::<_, StatutoryRateRule>(
            "SELECT * FROM statutory_rate_rules
             WHERE company_id = $1
               AND is_active
               AND ($2::rate_type IS NULL OR rate_type = $2)
             ORDER BY effective_from DESC",
        )
        .bind(company_id)
        .bind(category)
        .fetch_all(&self.pool)
        .await?;

        Ok(rules)
    }

    async fn create(
        &self,
        company_id: Uuid,
        actor: Uuid,
        rule: NewRateRule,
    ) -> AppResult<StatutoryRateRule> {
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_as::<_, StatutoryRateRule>(
            "SELECT * FROM statutory_rate_rules
             WHERE company_id = $1 AND rate_type = $2 AND is_active
             FOR UPDATE",
        )
        .bind(company_id)
        .bind(rule.rate_type)
        .fetch_all(&mut *tx)
        .await?;

        ensure_no_overlap(&existing, rule.rate_type, rule.window, None)?;

        let created = sqlx::query_as::<_, StatutoryRateRule>(
            "INSERT INTO statutory_rate_rules (
                id, company_id, rate_type, effective_from, effective_to,
                employee_percent, employer_percent, wage_ceiling, admin_percent,
                is_active, created_by, updated_by, created_at, updated_at
             ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, TRUE, $10, $10, NOW(), NOW())
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(company_id)
        .bind(rule.rate_type)
        .bind(rule.window.from)
        .bind(rule.window.to)
        .bind(rule.employee_percent)
        .bind(rule.employer_percent)
        .bind(rule.wage_ceiling)
        .bind(rule.admin_percent)
        .bind(actor)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_exclusion_violation(e, rule.rate_type))?;

        tx.commit().await?;
        Ok(created)
    }

    async fn update(
        &self,
        company_id: Uuid,
        id: Uuid,
        actor: Uuid,
        patch: RateRulePatch,
    ) -> AppResult<StatutoryRateRule> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, StatutoryRateRule>(
            "SELECT * FROM statutory_rate_rules
             WHERE id = $1 AND company_id = $2 AND is_active
             FOR UPDATE",
        )
        .bind(id)
        .bind(company_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Statutory rate rule {id} not found")))?;

        let window = RateWindow::new(
            patch.effective_from.unwrap_or(current.effective_from),
            patch.effective_to.or(current.effective_to),
        );

        let others = sqlx::query_as::<_, StatutoryRateRule>(
            "SELECT * FROM statutory_rate_rules
             WHERE company_id = $1 AND rate_type = $2 AND is_active AND id <> $3
             FOR UPDATE",
        )
        .bind(company_id)
        .bind(current.rate_type)
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        ensure_no_overlap(&others, current.rate_type, window, Some(id))?;

        let updated = sqlx::query_as::<_, StatutoryRateRule>(
            "UPDATE statutory_rate_rules SET
                effective_from = $1,
                effective_to = $2,
                employee_percent = $3,
                employer_percent = $4,
                wage_ceiling = $5,
                admin_percent = $6,
                updated_by = $7,
                updated_at = NOW()
             WHERE id = $8 AND company_id = $9
             RETURNING *",
        )
        .bind(window.from)
        .bind(window.to)
        .bind(patch.employee_percent.unwrap_or(current.employee_percent))
        .bind(patch.employer_percent.unwrap_or(current.employer_percent))
        .bind(patch.wage_ceiling.or(current.wage_ceiling))
        .bind(patch.admin_percent.or(current.admin_percent))
        .bind(actor)
        .bind(id)
        .bind(company_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_exclusion_violation(e, current.rate_type))?;

        tx.commit().await?;
        Ok(updated)
    }

    async fn soft_delete(&self, company_id: Uuid, id: Uuid, actor: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE statutory_rate_rules
             SET is_active = FALSE, updated_by = $1, updated_at = $2
             WHERE id = $3 AND company_id = $4 AND is_active",
        )
        .bind(actor)
        .bind(Utc::now())
        .bind(id)
        .bind(company_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Statutory rate rule {id} not found"
            )));
        }
        Ok(())
    }
}

// src/stores/memory.rs
//
// In-memory store used by tests. Mirrors the Postgres behavior, including
// soft-delete visibility and the overlap rules.

use super::{NewRateRule, RateRulePatch, RateRuleStore, TenantStore};
use crate::errors::{AppError, AppResult};
use crate::models::{Company, CompanyStatus, RateCategory, StatutoryRateRule};
use crate::services::rates::{RateWindow, ensure_no_overlap};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryTenantStore {
    companies: Mutex<Vec<Company>>,
}

impl MemoryTenantStore {
    pub async fn add(&self, owner: Uuid, name: &str, deleted: bool) -> Uuid {
        let now = Utc::now();
        let company = Company {
            id: Uuid::new_v4(),
            owner_user_id: owner,
            name: name.to_string(),
            status: CompanyStatus::Active,
            deleted_at: deleted.then_some(now),
            created_at: now,
            updated_at: now,
        };
        let id = company.id;
        self.companies.lock().await.push(company);
        id
    }
}

#[async_trait]
impl TenantStore for MemoryTenantStore {
    async fn find_for_owner(&self, company_id: Uuid, owner: Uuid) -> AppResult<Option<Company>> {
        let companies = self.companies.lock().await;
        Ok(companies
            .iter()
            .find(|c| c.id == company_id && c.owner_user_id == owner && c.deleted_at.is_none())
            .cloned())
    }
}

#[derive(Default)]
pub struct MemoryRateRuleStore {
    rules: Mutex<Vec<StatutoryRateRule>>,
}

#[async_trait]
impl RateRuleStore for MemoryRateRuleStore {
    async fn list(
        &self,
        company_id: Uuid,
        category: Option<RateCategory>,
    ) -> AppResult<Vec<StatutoryRateRule>> {
        let rules = self.rules.lock().await;
        let mut out: Vec<StatutoryRateRule> = rules
            .iter()
            .filter(|r| {
                r.company_id == company_id
                    && r.is_active
                    && category.is_none_or(|c| r.rate_type == c)
            })
            .cloned()
            .collect();
        out.sort_by(|a, b| b.effective_from.cmp(&a.effective_from));
        Ok(out)
    }

    async fn create(
        &self,
        company_id: Uuid,
        actor: Uuid,
        rule: NewRateRule,
    ) -> AppResult<StatutoryRateRule> {
        let mut rules = self.rules.lock().await;
        let scoped: Vec<StatutoryRateRule> = rules
            .iter()
            .filter(|r| r.company_id == company_id)
            .cloned()
            .collect();
        ensure_no_overlap(&scoped, rule.rate_type, rule.window, None)?;

        let now = Utc::now();
        let created = StatutoryRateRule {
            id: Uuid::new_v4(),
            company_id,
            rate_type: rule.rate_type,
            effective_from: rule.window.from,
            effective_to: rule.window.to,
            employee_percent: rule.employee_percent,
            employer_percent: rule.employer_percent,
            wage_ceiling: rule.wage_ceiling,
            admin_percent: rule.admin_percent,
            is_active: true,
            created_by: actor,
            updated_by: actor,
            created_at: now,
            updated_at: now,
        };
        rules.push(created.clone());
        Ok(created)
    }

    async fn update(
        &self,
        company_id: Uuid,
        id: Uuid,
        actor: Uuid,
        patch: RateRulePatch,
    ) -> AppResult<StatutoryRateRule> {
        let mut rules = self.rules.lock().await;

        let current = rules
            .iter()
            .find(|r| r.id == id && r.company_id == company_id && r.is_active)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Statutory rate rule {id} not found")))?;

        let window = RateWindow::new(
            patch.effective_from.unwrap_or(current.effective_from),
            patch.effective_to.or(current.effective_to),
        );
        let others: Vec<StatutoryRateRule> = rules
            .iter()
            .filter(|r| r.company_id == company_id && r.id != id)
            .cloned()
            .collect();
        ensure_no_overlap(&others, current.rate_type, window, Some(id))?;

        let rule = rules
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Statutory rate rule {id} not found")))?;
        rule.effective_from = window.from;
        rule.effective_to = window.to;
        if let Some(v) = patch.employee_percent {
            rule.employee_percent = v;
        }
        if let Some(v) = patch.employer_percent {
            rule.employer_percent = v;
        }
        if let Some(v) = patch.wage_ceiling {
            rule.wage_ceiling = Some(v);
        }
        if let Some(v) = patch.admin_percent {
            rule.admin_percent = Some(v);
        }
        rule.updated_by = actor;
        rule.updated_at = Utc::now();
        Ok(rule.clone())
    }

    async fn soft_delete(&self, company_id: Uuid, id: Uuid, actor: Uuid) -> AppResult<()> {
        let mut rules = self.rules.lock().await;
        let rule = rules
            .iter_mut()
            .find(|r| r.id == id && r.company_id == company_id && r.is_active)
            .ok_or_else(|| AppError::NotFound(format!("Statutory rate rule {id} not found")))?;
        rule.is_active = false;
        rule.updated_by = actor;
        rule.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn window(from: &str, to: Option<&str>) -> RateWindow {
        let parse = |s: &str| chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap();
        RateWindow::new(parse(from), to.map(parse))
    }

    fn pf_rule(window: RateWindow) -> NewRateRule {
        NewRateRule {
            rate_type: RateCategory::Pf,
            window,
            employee_percent: dec!(12),
            employer_percent: dec!(12),
            wage_ceiling: Some(dec!(15000)),
            admin_percent: Some(dec!(0.5)),
        }
    }

    #[tokio::test]
    async fn overlapping_pf_rule_is_rejected() {
        let store = MemoryRateRuleStore::default();
        let company = Uuid::new_v4();
        let actor = Uuid::new_v4();

        store
            .create(company, actor, pf_rule(window("2024-01-01", Some("2024-12-31"))))
            .await
            .unwrap();

        let err = store
            .create(company, actor, pf_rule(window("2024-06-01", None)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Overlap { ref category } if category == "PF"));
    }

    #[tokio::test]
    async fn gratuity_rules_are_exempt_from_overlap() {
        let store = MemoryRateRuleStore::default();
        let company = Uuid::new_v4();
        let actor = Uuid::new_v4();

        for _ in 0..2 {
            let rule = NewRateRule {
                rate_type: RateCategory::Gratuity,
                window: window("2024-01-01", None),
                employee_percent: dec!(0),
                employer_percent: dec!(4.81),
                wage_ceiling: None,
                admin_percent: None,
            };
            store.create(company, actor, rule).await.unwrap();
        }

        let rules = store
            .list(company, Some(RateCategory::Gratuity))
            .await
            .unwrap();
        assert_eq!(rules.len(), 2);
    }

    #[tokio::test]
    async fn same_window_in_another_tenant_is_fine() {
        let store = MemoryRateRuleStore::default();
        let actor = Uuid::new_v4();
        let w = window("2024-01-01", Some("2024-12-31"));

        store.create(Uuid::new_v4(), actor, pf_rule(w)).await.unwrap();
        store.create(Uuid::new_v4(), actor, pf_rule(w)).await.unwrap();
    }

    #[tokio::test]
    async fn soft_deleted_rule_frees_its_window_and_leaves_the_row() {
        let store = MemoryRateRuleStore::default();
        let company = Uuid::new_v4();
        let actor = Uuid::new_v4();
        let w = window("2024-01-01", Some("2024-12-31"));

        let rule = store.create(company, actor, pf_rule(w)).await.unwrap();
        store.soft_delete(company, rule.id, actor).await.unwrap();

        assert!(store.list(company, None).await.unwrap().is_empty());
        // the window is free again
        store.create(company, actor, pf_rule(w)).await.unwrap();
        // deleting twice reports not-found (already inactive)
        let err = store.soft_delete(company, rule.id, actor).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_revalidates_overlap_excluding_itself() {
        let store = MemoryRateRuleStore::default();
        let company = Uuid::new_v4();
        let actor = Uuid::new_v4();

        let first = store
            .create(company, actor, pf_rule(window("2024-01-01", Some("2024-06-30"))))
            .await
            .unwrap();
        store
            .create(company, actor, pf_rule(window("2024-07-01", Some("2024-12-31"))))
            .await
            .unwrap();

        // shrinking its own window is fine even though it overlaps itself
        let patch = RateRulePatch {
            effective_to: Some(chrono::NaiveDate::from_ymd_opt(2024, 5, 31).unwrap()),
            ..RateRulePatch::default()
        };
        store.update(company, first.id, actor, patch).await.unwrap();

        // stretching into the second rule is not
        let patch = RateRulePatch {
            effective_to: Some(chrono::NaiveDate::from_ymd_opt(2024, 8, 1).unwrap()),
            ..RateRulePatch::default()
        };
        let err = store.update(company, first.id, actor, patch).await.unwrap_err();
        assert!(matches!(err, AppError::Overlap { .. }));
    }

    #[tokio::test]
    async fn rules_from_another_tenant_are_invisible_to_update() {
        let store = MemoryRateRuleStore::default();
        let actor = Uuid::new_v4();
        let rule = store
            .create(Uuid::new_v4(), actor, pf_rule(window("2024-01-01", None)))
            .await
            .unwrap();

        let err = store
            .update(Uuid::new_v4(), rule.id, actor, RateRulePatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn list_is_newest_first_and_filterable() {
        let store = MemoryRateRuleStore::default();
        let company = Uuid::new_v4();
        let actor = Uuid::new_v4();

        store
            .create(company, actor, pf_rule(window("2023-01-01", Some("2023-12-31"))))
            .await
            .unwrap();
        store
            .create(company, actor, pf_rule(window("2024-01-01", Some("2024-12-31"))))
            .await
            .unwrap();
        let esi = NewRateRule {
            rate_type: RateCategory::Esi,
            window: window("2024-01-01", None),
            employee_percent: dec!(0.75),
            employer_percent: dec!(3.25),
            wage_ceiling: Some(dec!(21000)),
            admin_percent: None,
        };
        store.create(company, actor, esi).await.unwrap();

        let pf = store.list(company, Some(RateCategory::Pf)).await.unwrap();
        assert_eq!(pf.len(), 2);
        assert!(pf[0].effective_from > pf[1].effective_from);

        let all = store.list(company, None).await.unwrap();
        assert_eq!(all.len(), 3);
    }
}

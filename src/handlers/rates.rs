// src/handlers/rates.rs

use crate::{
    errors::AppResult,
    models::{CreateRateRuleRequest, RateCategory, StatutoryRateRule, UpdateRateRuleRequest},
    services::rates::{parse_date, parse_window, validate_percent},
    state::AppState,
    stores::{NewRateRule, RateRulePatch},
    tenant::TenantContext,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

#[derive(Debug, Deserialize, IntoParams)]
pub struct RateListQuery {
    /// Optional category filter: PF, ESI or GRATUITY
    pub category: Option<RateCategory>,
}

/// List active statutory rate rules, newest effective-from first
#[utoipa::path(
    get,
    path = "/api/v1/statutory-rates",
    params(
        RateListQuery,
        ("x-company-id" = String, Header, description = "Tenant company ID"),
    ),
    responses((status = 200, description = "Active rules", body = Vec<StatutoryRateRule>)),
    security(("bearer_auth" = [])),
    tag = "Statutory Rates"
)]
pub async fn list_rate_rules(
    tenant: TenantContext,
    State(state): State<AppState>,
    Query(query): Query<RateListQuery>,
) -> AppResult<Json<Vec<StatutoryRateRule>>> {
    let rules = state.rates.list(tenant.company_id, query.category).await?;
    Ok(Json(rules))
}

/// Create a statutory rate rule
#[utoipa::path(
    post,
    path = "/api/v1/statutory-rates",
    request_body = CreateRateRuleRequest,
    params(("x-company-id" = String, Header, description = "Tenant company ID")),
    responses(
        (status = 201, description = "Rule created", body = StatutoryRateRule),
        (status = 400, description = "Missing or unparseable dates"),
        (status = 409, description = "Date range overlaps an existing active rule"),
    ),
    security(("bearer_auth" = [])),
    tag = "Statutory Rates"
)]
pub async fn create_rate_rule(
    tenant: TenantContext,
    State(state): State<AppState>,
    Json(body): Json<CreateRateRuleRequest>,
) -> AppResult<(StatusCode, Json<StatutoryRateRule>)> {
    let window = parse_window(
        &body.effective_from,
        body.effective_to.as_deref(),
        state.config.strict_rate_dates,
    )?;
    validate_percent("employee_percent", body.employee_percent)?;
    validate_percent("employer_percent", body.employer_percent)?;
    if let Some(admin) = body.admin_percent {
        validate_percent("admin_percent", admin)?;
    }

    let rule = NewRateRule {
        rate_type: body.rate_type,
        window,
        employee_percent: body.employee_percent,
        employer_percent: body.employer_percent,
        wage_ceiling: body.wage_ceiling,
        admin_percent: body.admin_percent,
    };

    let created = state
        .rates
        .create(tenant.company_id, tenant.user_id, rule)
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// Update a statutory rate rule; a changed date range is re-validated
#[utoipa::path(
    put,
    path = "/api/v1/statutory-rates/{rule_id}",
    request_body = UpdateRateRuleRequest,
    params(
        ("rule_id" = Uuid, Path, description = "Rule ID"),
        ("x-company-id" = String, Header, description = "Tenant company ID"),
    ),
    responses(
        (status = 200, description = "Rule updated", body = StatutoryRateRule),
        (status = 404, description = "Rule not found"),
        (status = 409, description = "Date range overlaps an existing active rule"),
    ),
    security(("bearer_auth" = [])),
    tag = "Statutory Rates"
)]
pub async fn update_rate_rule(
    tenant: TenantContext,
    State(state): State<AppState>,
    Path(rule_id): Path<Uuid>,
    Json(body): Json<UpdateRateRuleRequest>,
) -> AppResult<Json<StatutoryRateRule>> {
    let effective_from = body
        .effective_from
        .as_deref()
        .map(|v| parse_date("effective_from", v))
        .transpose()?;
    let effective_to = body
        .effective_to
        .as_deref()
        .map(|v| parse_date("effective_to", v))
        .transpose()?;
    if let Some(v) = body.employee_percent {
        validate_percent("employee_percent", v)?;
    }
    if let Some(v) = body.employer_percent {
        validate_percent("employer_percent", v)?;
    }
    if let Some(v) = body.admin_percent {
        validate_percent("admin_percent", v)?;
    }

    let patch = RateRulePatch {
        effective_from,
        effective_to,
        employee_percent: body.employee_percent,
        employer_percent: body.employer_percent,
        wage_ceiling: body.wage_ceiling,
        admin_percent: body.admin_percent,
    };

    let updated = state
        .rates
        .update(tenant.company_id, rule_id, tenant.user_id, patch)
        .await?;

    Ok(Json(updated))
}

/// Soft-delete a statutory rate rule (sets is_active = false)
#[utoipa::path(
    delete,
    path = "/api/v1/statutory-rates/{rule_id}",
    params(
        ("rule_id" = Uuid, Path, description = "Rule ID"),
        ("x-company-id" = String, Header, description = "Tenant company ID"),
    ),
    responses(
        (status = 200, description = "Rule deactivated"),
        (status = 404, description = "Rule not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Statutory Rates"
)]
pub async fn delete_rate_rule(
    tenant: TenantContext,
    State(state): State<AppState>,
    Path(rule_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    state
        .rates
        .soft_delete(tenant.company_id, rule_id, tenant.user_id)
        .await?;

    Ok(Json(serde_json::json!({ "success": true })))
}

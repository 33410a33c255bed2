// src/handlers/salary_head.rs

use crate::{
    errors::{AppError, AppResult},
    models::{CreateSalaryHeadRequest, SalaryHead, UpdateSalaryHeadRequest},
    state::AppState,
    tenant::TenantContext,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

fn validate_percentage_fields(
    is_percentage: bool,
    percentage: Option<rust_decimal::Decimal>,
    percentage_of: Option<&str>,
    own_short_name: &str,
) -> AppResult<()> {
    if is_percentage {
        if percentage.is_none() || percentage_of.is_none() {
            return Err(AppError::Validation(
                "percentage and percentage_of are required for percentage heads".to_string(),
            ));
        }
        // rejected before any persistence call
        if percentage_of == Some(own_short_name) {
            return Err(AppError::Validation(
                "A salary head cannot be a percentage of itself".to_string(),
            ));
        }
    }
    Ok(())
}

/// Create a salary head
#[utoipa::path(
    post,
    path = "/api/v1/salary-heads",
    request_body = CreateSalaryHeadRequest,
    params(("x-company-id" = String, Header, description = "Tenant company ID")),
    responses(
        (status = 201, description = "Salary head created", body = SalaryHead),
        (status = 400, description = "Self-referential percentage or missing fields"),
        (status = 409, description = "Short name already exists"),
    ),
    security(("bearer_auth" = [])),
    tag = "Salary Heads"
)]
pub async fn create_salary_head(
    tenant: TenantContext,
    State(state): State<AppState>,
    Json(body): Json<CreateSalaryHeadRequest>,
) -> AppResult<(StatusCode, Json<SalaryHead>)> {
    if body.name.trim().is_empty() || body.short_name.trim().is_empty() {
        return Err(AppError::Validation(
            "name and short_name are required".to_string(),
        ));
    }
    validate_percentage_fields(
        body.is_percentage,
        body.percentage,
        body.percentage_of.as_deref(),
        &body.short_name,
    )?;

    let existing = sqlx::query_scalar::<_, Uuid>(
        "SELECT id FROM salary_heads WHERE company_id = $1 AND short_name = $2",
    )
    .bind(tenant.company_id)
    .bind(&body.short_name)
    .fetch_optional(&state.db)
    .await?;

    if existing.is_some() {
        return Err(AppError::Conflict(format!(
            "Salary head '{}' already exists",
            body.short_name
        )));
    }

    let head = sqlx::query_as::<_, SalaryHead>(
        "INSERT INTO salary_heads (
            id, company_id, name, short_name, head_type, is_percentage,
            percentage, percentage_of, is_system, created_at, updated_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,FALSE,NOW(),NOW())
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(tenant.company_id)
    .bind(&body.name)
    .bind(&body.short_name)
    .bind(body.head_type)
    .bind(body.is_percentage)
    .bind(body.percentage)
    .bind(&body.percentage_of)
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(head)))
}

/// List the company's salary heads
#[utoipa::path(
    get,
    path = "/api/v1/salary-heads",
    params(("x-company-id" = String, Header, description = "Tenant company ID")),
    responses((status = 200, description = "List of salary heads", body = Vec<SalaryHead>)),
    security(("bearer_auth" = [])),
    tag = "Salary Heads"
)]
pub async fn list_salary_heads(
    tenant: TenantContext,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<SalaryHead>>> {
    let heads = sqlx::query_as::<_, SalaryHead>(
        "SELECT * FROM salary_heads WHERE company_id = $1 ORDER BY is_system DESC, short_name",
    )
    .bind(tenant.company_id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(heads))
}

/// Update a salary head. System heads accept a name change only.
#[utoipa::path(
    put,
    path = "/api/v1/salary-heads/{head_id}",
    request_body = UpdateSalaryHeadRequest,
    params(
        ("head_id" = Uuid, Path, description = "Salary head ID"),
        ("x-company-id" = String, Header, description = "Tenant company ID"),
    ),
    responses(
        (status = 200, description = "Salary head updated", body = SalaryHead),
        (status = 400, description = "Attempt to restructure a system head"),
        (status = 404, description = "Salary head not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Salary Heads"
)]
pub async fn update_salary_head(
    tenant: TenantContext,
    State(state): State<AppState>,
    Path(head_id): Path<Uuid>,
    Json(body): Json<UpdateSalaryHeadRequest>,
) -> AppResult<Json<SalaryHead>> {
    let current = sqlx::query_as::<_, SalaryHead>(
        "SELECT * FROM salary_heads WHERE id = $1 AND company_id = $2",
    )
    .bind(head_id)
    .bind(tenant.company_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Salary head {head_id} not found")))?;

    if current.is_system
        && (body.head_type.is_some()
            || body.is_percentage.is_some()
            || body.percentage.is_some()
            || body.percentage_of.is_some())
    {
        return Err(AppError::Validation(
            "System salary heads allow name changes only".to_string(),
        ));
    }

    let is_percentage = body.is_percentage.unwrap_or(current.is_percentage);
    let percentage = body.percentage.or(current.percentage);
    let percentage_of = body.percentage_of.clone().or(current.percentage_of.clone());
    validate_percentage_fields(
        is_percentage,
        percentage,
        percentage_of.as_deref(),
        &current.short_name,
    )?;

    let head = sqlx::query_as::<_, SalaryHead>(
        "UPDATE salary_heads SET
            name = COALESCE($1, name),
            head_type = COALESCE($2, head_type),
            is_percentage = $3,
            percentage = $4,
            percentage_of = $5,
            updated_at = NOW()
         WHERE id = $6 AND company_id = $7
         RETURNING *",
    )
    .bind(&body.name)
    .bind(body.head_type)
    .bind(is_percentage)
    .bind(percentage)
    .bind(&percentage_of)
    .bind(head_id)
    .bind(tenant.company_id)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(head))
}

/// Delete a user-defined salary head. System heads cannot be deleted.
#[utoipa::path(
    delete,
    path = "/api/v1/salary-heads/{head_id}",
    params(
        ("head_id" = Uuid, Path, description = "Salary head ID"),
        ("x-company-id" = String, Header, description = "Tenant company ID"),
    ),
    responses(
        (status = 200, description = "Salary head deleted"),
        (status = 400, description = "System head"),
        (status = 404, description = "Salary head not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Salary Heads"
)]
pub async fn delete_salary_head(
    tenant: TenantContext,
    State(state): State<AppState>,
    Path(head_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let current = sqlx::query_as::<_, SalaryHead>(
        "SELECT * FROM salary_heads WHERE id = $1 AND company_id = $2",
    )
    .bind(head_id)
    .bind(tenant.company_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Salary head {head_id} not found")))?;

    if current.is_system {
        return Err(AppError::Validation(
            "System salary heads cannot be deleted".to_string(),
        ));
    }

    sqlx::query("DELETE FROM salary_heads WHERE id = $1 AND company_id = $2")
        .bind(head_id)
        .bind(tenant.company_id)
        .execute(&state.db)
        .await?;

    Ok(Json(serde_json::json!({ "message": "Salary head deleted" })))
}

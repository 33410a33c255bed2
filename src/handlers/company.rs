// src/handlers/company.rs

use crate::{
    auth::AuthUser,
    errors::{AppError, AppResult},
    models::{Company, CompanyStatus, CreateCompanyRequest, HeadType, SetCompanyStatusRequest},
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

/// Salary heads every company starts with. System heads stay editable in
/// name only and cannot be deleted.
const SYSTEM_HEADS: &[(&str, &str, HeadType)] = &[
    ("Basic Salary", "BASIC", HeadType::Earning),
    ("House Rent Allowance", "HRA", HeadType::Earning),
    ("Conveyance Allowance", "CONV", HeadType::Earning),
    ("Medical Allowance", "MED", HeadType::Earning),
    ("Special Allowance", "SPL", HeadType::Earning),
];

/// Onboard a new company for the authenticated user
#[utoipa::path(
    post,
    path = "/api/v1/companies",
    request_body = CreateCompanyRequest,
    responses(
        (status = 201, description = "Company onboarded", body = Company),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Companies"
)]
pub async fn create_company(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<CreateCompanyRequest>,
) -> AppResult<(StatusCode, Json<Company>)> {
    if body.name.trim().is_empty() {
        return Err(AppError::Validation("Company name is required".to_string()));
    }

    let mut tx = state.db.begin().await?;

    let company = sqlx::query_as::<_, Company>(
        "INSERT INTO companies (id, owner_user_id, name, status, created_at, updated_at)
         VALUES ($1, $2, $3, 'active', NOW(), NOW())
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(auth.id)
    .bind(body.name.trim())
    .fetch_one(&mut *tx)
    .await?;

    for (name, short_name, head_type) in SYSTEM_HEADS {
        sqlx::query(
            "INSERT INTO salary_heads (
                id, company_id, name, short_name, head_type, is_percentage,
                is_system, created_at, updated_at
             ) VALUES ($1, $2, $3, $4, $5, FALSE, TRUE, NOW(), NOW())",
        )
        .bind(Uuid::new_v4())
        .bind(company.id)
        .bind(name)
        .bind(short_name)
        .bind(head_type)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    tracing::info!("company {} onboarded by user {}", company.id, auth.id);
    Ok((StatusCode::CREATED, Json(company)))
}

/// List companies owned by the authenticated user
#[utoipa::path(
    get,
    path = "/api/v1/companies",
    responses(
        (status = 200, description = "Companies owned by the caller", body = Vec<Company>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Companies"
)]
pub async fn list_companies(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Company>>> {
    let companies = sqlx::query_as::<_, Company>(
        "SELECT * FROM companies
         WHERE owner_user_id = $1 AND deleted_at IS NULL
         ORDER BY created_at DESC",
    )
    .bind(auth.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(companies))
}

/// Toggle a company between active and inactive
#[utoipa::path(
    patch,
    path = "/api/v1/companies/{company_id}/status",
    request_body = SetCompanyStatusRequest,
    params(("company_id" = Uuid, Path, description = "Company ID")),
    responses(
        (status = 200, description = "Status updated", body = Company),
        (status = 404, description = "Company not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Companies"
)]
pub async fn set_company_status(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    Json(body): Json<SetCompanyStatusRequest>,
) -> AppResult<Json<Company>> {
    let company = sqlx::query_as::<_, Company>(
        "UPDATE companies SET status = $1, updated_at = NOW()
         WHERE id = $2 AND owner_user_id = $3 AND deleted_at IS NULL
         RETURNING *",
    )
    .bind(body.status)
    .bind(company_id)
    .bind(auth.id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Company {company_id} not found")))?;

    Ok(Json(company))
}

/// Soft-delete a company. The row is kept; the tenant stops resolving.
#[utoipa::path(
    delete,
    path = "/api/v1/companies/{company_id}",
    params(("company_id" = Uuid, Path, description = "Company ID")),
    responses(
        (status = 200, description = "Company soft-deleted"),
        (status = 404, description = "Company not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Companies"
)]
pub async fn delete_company(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let result = sqlx::query(
        "UPDATE companies SET status = $1, deleted_at = NOW(), updated_at = NOW()
         WHERE id = $2 AND owner_user_id = $3 AND deleted_at IS NULL",
    )
    .bind(CompanyStatus::Inactive)
    .bind(company_id)
    .bind(auth.id)
    .execute(&state.db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Company {company_id} not found")));
    }

    Ok(Json(serde_json::json!({ "message": "Company deleted" })))
}

// src/handlers/employee.rs

use crate::{
    errors::{AppError, AppResult},
    models::{CreateEmployeeRequest, Employee, UpdateEmployeeRequest},
    state::AppState,
    tenant::TenantContext,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

/// Add an employee to the company
#[utoipa::path(
    post,
    path = "/api/v1/employees",
    request_body = CreateEmployeeRequest,
    params(("x-company-id" = String, Header, description = "Tenant company ID")),
    responses(
        (status = 201, description = "Employee created", body = Employee),
        (status = 409, description = "Employee code already exists in company"),
    ),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn create_employee(
    tenant: TenantContext,
    State(state): State<AppState>,
    Json(body): Json<CreateEmployeeRequest>,
) -> AppResult<(StatusCode, Json<Employee>)> {
    if body.employee_code.trim().is_empty() || body.first_name.trim().is_empty() {
        return Err(AppError::Validation(
            "employee_code and first_name are required".to_string(),
        ));
    }

    let existing = sqlx::query_scalar::<_, Uuid>(
        "SELECT id FROM employees WHERE company_id = $1 AND employee_code = $2",
    )
    .bind(tenant.company_id)
    .bind(&body.employee_code)
    .fetch_optional(&state.db)
    .await?;

    if existing.is_some() {
        return Err(AppError::Conflict(format!(
            "Employee code '{}' already exists in this company",
            body.employee_code
        )));
    }

    let employee = sqlx::query_as::<_, Employee>(
        "INSERT INTO employees (
            id, company_id, employee_code, first_name, last_name, email, phone,
            department, designation, date_of_joining, pan_number, uan_number,
            esi_number, bank_account_number, bank_ifsc, basic_salary,
            created_at, updated_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15,$16,NOW(),NOW())
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(tenant.company_id)
    .bind(&body.employee_code)
    .bind(&body.first_name)
    .bind(&body.last_name)
    .bind(&body.email)
    .bind(&body.phone)
    .bind(&body.department)
    .bind(&body.designation)
    .bind(body.date_of_joining)
    .bind(&body.pan_number)
    .bind(&body.uan_number)
    .bind(&body.esi_number)
    .bind(&body.bank_account_number)
    .bind(&body.bank_ifsc)
    .bind(body.basic_salary)
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(employee)))
}

/// List the company's employees (soft-deleted excluded)
#[utoipa::path(
    get,
    path = "/api/v1/employees",
    params(("x-company-id" = String, Header, description = "Tenant company ID")),
    responses((status = 200, description = "List of employees", body = Vec<Employee>)),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn list_employees(
    tenant: TenantContext,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Employee>>> {
    let employees = sqlx::query_as::<_, Employee>(
        "SELECT * FROM employees
         WHERE company_id = $1 AND deleted_at IS NULL
         ORDER BY employee_code",
    )
    .bind(tenant.company_id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(employees))
}

/// Get a single employee
#[utoipa::path(
    get,
    path = "/api/v1/employees/{employee_id}",
    params(
        ("employee_id" = Uuid, Path, description = "Employee ID"),
        ("x-company-id" = String, Header, description = "Tenant company ID"),
    ),
    responses(
        (status = 200, description = "Employee detail", body = Employee),
        (status = 404, description = "Employee not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn get_employee(
    tenant: TenantContext,
    State(state): State<AppState>,
    Path(employee_id): Path<Uuid>,
) -> AppResult<Json<Employee>> {
    let employee = sqlx::query_as::<_, Employee>(
        "SELECT * FROM employees
         WHERE id = $1 AND company_id = $2 AND deleted_at IS NULL",
    )
    .bind(employee_id)
    .bind(tenant.company_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Employee {employee_id} not found")))?;

    Ok(Json(employee))
}

/// Update an employee
#[utoipa::path(
    put,
    path = "/api/v1/employees/{employee_id}",
    request_body = UpdateEmployeeRequest,
    params(
        ("employee_id" = Uuid, Path, description = "Employee ID"),
        ("x-company-id" = String, Header, description = "Tenant company ID"),
    ),
    responses(
        (status = 200, description = "Employee updated", body = Employee),
        (status = 404, description = "Employee not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn update_employee(
    tenant: TenantContext,
    State(state): State<AppState>,
    Path(employee_id): Path<Uuid>,
    Json(body): Json<UpdateEmployeeRequest>,
) -> AppResult<Json<Employee>> {
    let employee = sqlx::query_as::<_, Employee>(
        "UPDATE employees SET
            first_name = COALESCE($1, first_name),
            last_name = COALESCE($2, last_name),
            email = COALESCE($3, email),
            phone = COALESCE($4, phone),
            department = COALESCE($5, department),
            designation = COALESCE($6, designation),
            pan_number = COALESCE($7, pan_number),
            uan_number = COALESCE($8, uan_number),
            esi_number = COALESCE($9, esi_number),
            bank_account_number = COALESCE($10, bank_account_number),
            bank_ifsc = COALESCE($11, bank_ifsc),
            basic_salary = COALESCE($12, basic_salary),
            updated_at = NOW()
         WHERE id = $13 AND company_id = $14 AND deleted_at IS NULL
         RETURNING *",
    )
    .bind(&body.first_name)
    .bind(&body.last_name)
    .bind(&body.email)
    .bind(&body.phone)
    .bind(&body.department)
    .bind(&body.designation)
    .bind(&body.pan_number)
    .bind(&body.uan_number)
    .bind(&body.esi_number)
    .bind(&body.bank_account_number)
    .bind(&body.bank_ifsc)
    .bind(body.basic_salary)
    .bind(employee_id)
    .bind(tenant.company_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Employee {employee_id} not found")))?;

    Ok(Json(employee))
}

/// Soft-delete an employee
#[utoipa::path(
    delete,
    path = "/api/v1/employees/{employee_id}",
    params(
        ("employee_id" = Uuid, Path, description = "Employee ID"),
        ("x-company-id" = String, Header, description = "Tenant company ID"),
    ),
    responses(
        (status = 200, description = "Employee soft-deleted"),
        (status = 404, description = "Employee not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn delete_employee(
    tenant: TenantContext,
    State(state): State<AppState>,
    Path(employee_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let result = sqlx::query(
        "UPDATE employees SET deleted_at = NOW(), updated_at = NOW()
         WHERE id = $1 AND company_id = $2 AND deleted_at IS NULL",
    )
    .bind(employee_id)
    .bind(tenant.company_id)
    .execute(&state.db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Employee {employee_id} not found")));
    }

    Ok(Json(serde_json::json!({ "message": "Employee deleted" })))
}

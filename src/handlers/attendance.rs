// src/handlers/attendance.rs

use crate::{
    errors::{AppError, AppResult},
    models::{AttendanceRecord, MarkAttendanceRequest, PeriodQuery},
    state::AppState,
    tenant::TenantContext,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::NaiveTime;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

/// Hours between check-in and check-out, split into regular and overtime.
/// Anything past eight hours counts as overtime.
fn derive_hours(check_in: Option<NaiveTime>, check_out: Option<NaiveTime>) -> (Decimal, Decimal) {
    let (Some(start), Some(end)) = (check_in, check_out) else {
        return (Decimal::ZERO, Decimal::ZERO);
    };
    if end <= start {
        return (Decimal::ZERO, Decimal::ZERO);
    }
    let minutes = (end - start).num_minutes();
    let worked = (Decimal::from(minutes) / dec!(60)).round_dp(2);
    let regular = worked.min(dec!(8));
    let overtime = (worked - regular).max(Decimal::ZERO);
    (regular, overtime)
}

/// Mark attendance for an employee. Marking the same date twice replaces
/// the earlier record.
#[utoipa::path(
    post,
    path = "/api/v1/attendance",
    request_body = MarkAttendanceRequest,
    params(("x-company-id" = String, Header, description = "Tenant company ID")),
    responses(
        (status = 201, description = "Attendance recorded", body = AttendanceRecord),
        (status = 404, description = "Employee not found in this company"),
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn mark_attendance(
    tenant: TenantContext,
    State(state): State<AppState>,
    Json(body): Json<MarkAttendanceRequest>,
) -> AppResult<(StatusCode, Json<AttendanceRecord>)> {
    let employee = sqlx::query_scalar::<_, Uuid>(
        "SELECT id FROM employees
         WHERE id = $1 AND company_id = $2 AND deleted_at IS NULL",
    )
    .bind(body.employee_id)
    .bind(tenant.company_id)
    .fetch_optional(&state.db)
    .await?;

    if employee.is_none() {
        return Err(AppError::NotFound(format!(
            "Employee {} not found",
            body.employee_id
        )));
    }

    let (working_hours, overtime_hours) = derive_hours(body.check_in, body.check_out);

    let record = sqlx::query_as::<_, AttendanceRecord>(
        "INSERT INTO attendance_records (
            id, company_id, employee_id, date, status, check_in, check_out,
            working_hours, overtime_hours, created_at, updated_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,NOW(),NOW())
         ON CONFLICT (employee_id, date) DO UPDATE SET
            status = EXCLUDED.status,
            check_in = EXCLUDED.check_in,
            check_out = EXCLUDED.check_out,
            working_hours = EXCLUDED.working_hours,
            overtime_hours = EXCLUDED.overtime_hours,
            updated_at = NOW()
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(tenant.company_id)
    .bind(body.employee_id)
    .bind(body.date)
    .bind(body.status)
    .bind(body.check_in)
    .bind(body.check_out)
    .bind(working_hours)
    .bind(overtime_hours)
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(record)))
}

/// List an employee's attendance for a month
#[utoipa::path(
    get,
    path = "/api/v1/attendance/{employee_id}",
    params(
        ("employee_id" = Uuid, Path, description = "Employee ID"),
        PeriodQuery,
        ("x-company-id" = String, Header, description = "Tenant company ID"),
    ),
    responses(
        (status = 200, description = "Attendance records for the period", body = Vec<AttendanceRecord>),
        (status = 404, description = "Employee not found in this company"),
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn list_attendance(
    tenant: TenantContext,
    State(state): State<AppState>,
    Path(employee_id): Path<Uuid>,
    Query(period): Query<PeriodQuery>,
) -> AppResult<Json<Vec<AttendanceRecord>>> {
    if !(1..=12).contains(&period.month) {
        return Err(AppError::Validation(
            "month must be between 1 and 12".to_string(),
        ));
    }

    let employee = sqlx::query_scalar::<_, Uuid>(
        "SELECT id FROM employees
         WHERE id = $1 AND company_id = $2 AND deleted_at IS NULL",
    )
    .bind(employee_id)
    .bind(tenant.company_id)
    .fetch_optional(&state.db)
    .await?;

    if employee.is_none() {
        return Err(AppError::NotFound(format!(
            "Employee {employee_id} not found"
        )));
    }

    let records = sqlx::query_as::<_, AttendanceRecord>(
        "SELECT * FROM attendance_records
         WHERE company_id = $1 AND employee_id = $2
           AND EXTRACT(MONTH FROM date) = $3 AND EXTRACT(YEAR FROM date) = $4
         ORDER BY date",
    )
    .bind(tenant.company_id)
    .bind(employee_id)
    .bind(period.month as i32)
    .bind(period.year)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(records))
}

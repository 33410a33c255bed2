// src/handlers/payroll.rs

use crate::{
    errors::{AppError, AppResult},
    models::{
        AttendanceRecord, CalculatePayrollRequest, Employee, PayrollItem, PayrollStatus,
        PeriodQuery, SetPayrollStatusRequest,
    },
    services::{
        attendance::{adjust, validate_payroll_data, working_days_in_month},
        payroll::CalcRates,
        rates::{RateWindow, overlaps},
        report::{PayrollReport, ReportEntry, aggregate},
    },
    state::AppState,
    tenant::TenantContext,
};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::NaiveDate;
use sqlx::FromRow;
use uuid::Uuid;

fn month_bounds(year: i32, month: u32) -> AppResult<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| AppError::Validation("month must be between 1 and 12".to_string()))?;
    let last = first
        .checked_add_months(chrono::Months::new(1))
        .and_then(|d| d.pred_opt())
        .ok_or_else(|| AppError::Validation("period out of range".to_string()))?;
    Ok((first, last))
}

/// Run payroll for every employee of the company for one month.
///
/// Existing draft items for the period are recomputed; processed or paid
/// items are left untouched.
#[utoipa::path(
    post,
    path = "/api/v1/payroll/calculate",
    request_body = CalculatePayrollRequest,
    params(("x-company-id" = String, Header, description = "Tenant company ID")),
    responses(
        (status = 200, description = "Computed payroll items", body = Vec<PayrollItem>),
        (status = 400, description = "Invalid period"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn calculate_payroll(
    tenant: TenantContext,
    State(state): State<AppState>,
    Json(body): Json<CalculatePayrollRequest>,
) -> AppResult<Json<Vec<PayrollItem>>> {
    let (period_start, period_end) = month_bounds(body.year, body.month)?;
    let period = RateWindow::new(period_start, Some(period_end));
    let working_days = working_days_in_month(body.year, body.month);

    // Rules whose effective window touches the period override the defaults.
    // The store lists newest-first; applying in reverse lets the newest rule
    // of each category win.
    let all_rules = state.rates.list(tenant.company_id, None).await?;
    let mut in_effect: Vec<_> = all_rules
        .into_iter()
        .filter(|rule| {
            overlaps(period, RateWindow::new(rule.effective_from, rule.effective_to))
        })
        .collect();
    in_effect.reverse();
    let rates = CalcRates::from_rules(&in_effect);

    let employees = sqlx::query_as::<_, Employee>(
        "SELECT * FROM employees
         WHERE company_id = $1 AND deleted_at IS NULL
         ORDER BY employee_code",
    )
    .bind(tenant.company_id)
    .fetch_all(&state.db)
    .await?;

    let mut items = Vec::with_capacity(employees.len());

    for employee in &employees {
        let records = sqlx::query_as::<_, AttendanceRecord>(
            "SELECT * FROM attendance_records
             WHERE company_id = $1 AND employee_id = $2 AND date BETWEEN $3 AND $4",
        )
        .bind(tenant.company_id)
        .bind(employee.id)
        .bind(period_start)
        .bind(period_end)
        .fetch_all(&state.db)
        .await?;

        let base = crate::services::payroll::calculate(employee.basic_salary, &rates);
        let adjusted = adjust(&base, &records, working_days);

        let problems = validate_payroll_data(
            employee.basic_salary,
            adjusted.present_days,
            working_days,
            base.gross_salary,
            base.net_salary,
        );
        for problem in &problems {
            tracing::warn!(
                employee = %employee.employee_code,
                month = body.month,
                year = body.year,
                "payroll data check: {problem}"
            );
        }

        let item = sqlx::query_as::<_, PayrollItem>(
            "INSERT INTO payroll_items (
                id, company_id, employee_id, month, year,
                basic_salary, hra, conveyance, medical, special_allowance, gross_salary,
                provident_fund, esi, professional_tax, income_tax, total_deductions, net_salary,
                working_days, present_days, leave_days, overtime_hours, late_count,
                leave_deduction, overtime_payment, late_deduction, adjusted_gross, adjusted_net,
                status, created_at, updated_at
             ) VALUES (
                $1,$2,$3,$4,$5,
                $6,$7,$8,$9,$10,$11,
                $12,$13,$14,$15,$16,$17,
                $18,$19,$20,$21,$22,
                $23,$24,$25,$26,$27,
                'draft',NOW(),NOW()
             )
             ON CONFLICT (company_id, employee_id, month, year) DO UPDATE SET
                basic_salary = EXCLUDED.basic_salary,
                hra = EXCLUDED.hra,
                conveyance = EXCLUDED.conveyance,
                medical = EXCLUDED.medical,
                special_allowance = EXCLUDED.special_allowance,
                gross_salary = EXCLUDED.gross_salary,
                provident_fund = EXCLUDED.provident_fund,
                esi = EXCLUDED.esi,
                professional_tax = EXCLUDED.professional_tax,
                income_tax = EXCLUDED.income_tax,
                total_deductions = EXCLUDED.total_deductions,
                net_salary = EXCLUDED.net_salary,
                working_days = EXCLUDED.working_days,
                present_days = EXCLUDED.present_days,
                leave_days = EXCLUDED.leave_days,
                overtime_hours = EXCLUDED.overtime_hours,
                late_count = EXCLUDED.late_count,
                leave_deduction = EXCLUDED.leave_deduction,
                overtime_payment = EXCLUDED.overtime_payment,
                late_deduction = EXCLUDED.late_deduction,
                adjusted_gross = EXCLUDED.adjusted_gross,
                adjusted_net = EXCLUDED.adjusted_net,
                updated_at = NOW()
             WHERE payroll_items.status = 'draft'
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(tenant.company_id)
        .bind(employee.id)
        .bind(body.month as i32)
        .bind(body.year)
        .bind(base.basic_salary)
        .bind(base.hra)
        .bind(base.conveyance)
        .bind(base.medical)
        .bind(base.special_allowance)
        .bind(base.gross_salary)
        .bind(base.provident_fund)
        .bind(base.esi)
        .bind(base.professional_tax)
        .bind(base.income_tax)
        .bind(base.total_deductions)
        .bind(base.net_salary)
        .bind(adjusted.working_days)
        .bind(adjusted.present_days)
        .bind(adjusted.leave_days)
        .bind(adjusted.overtime_hours)
        .bind(adjusted.late_count)
        .bind(adjusted.leave_deduction)
        .bind(adjusted.overtime_payment)
        .bind(adjusted.late_deduction)
        .bind(adjusted.adjusted_gross)
        .bind(adjusted.adjusted_net)
        .fetch_optional(&state.db)
        .await?;

        match item {
            Some(item) => items.push(item),
            // upsert skipped: the existing item is past draft
            None => {
                let existing = sqlx::query_as::<_, PayrollItem>(
                    "SELECT * FROM payroll_items
                     WHERE company_id = $1 AND employee_id = $2 AND month = $3 AND year = $4",
                )
                .bind(tenant.company_id)
                .bind(employee.id)
                .bind(body.month as i32)
                .bind(body.year)
                .fetch_one(&state.db)
                .await?;
                items.push(existing);
            }
        }
    }

    tracing::info!(
        company = %tenant.company_id,
        month = body.month,
        year = body.year,
        count = items.len(),
        "payroll calculated"
    );

    Ok(Json(items))
}

/// List payroll items for a month
#[utoipa::path(
    get,
    path = "/api/v1/payroll",
    params(
        PeriodQuery,
        ("x-company-id" = String, Header, description = "Tenant company ID"),
    ),
    responses((status = 200, description = "Payroll items for the period", body = Vec<PayrollItem>)),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn list_payroll(
    tenant: TenantContext,
    State(state): State<AppState>,
    Query(period): Query<PeriodQuery>,
) -> AppResult<Json<Vec<PayrollItem>>> {
    month_bounds(period.year, period.month)?;

    let items = sqlx::query_as::<_, PayrollItem>(
        "SELECT p.* FROM payroll_items p
         JOIN employees e ON e.id = p.employee_id
         WHERE p.company_id = $1 AND p.month = $2 AND p.year = $3
         ORDER BY e.employee_code",
    )
    .bind(tenant.company_id)
    .bind(period.month as i32)
    .bind(period.year)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(items))
}

/// Move a payroll item along draft -> processed -> paid
#[utoipa::path(
    patch,
    path = "/api/v1/payroll/{item_id}/status",
    request_body = SetPayrollStatusRequest,
    params(
        ("item_id" = Uuid, Path, description = "Payroll item ID"),
        ("x-company-id" = String, Header, description = "Tenant company ID"),
    ),
    responses(
        (status = 200, description = "Status updated", body = PayrollItem),
        (status = 404, description = "Payroll item not found"),
        (status = 409, description = "Transition not allowed"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn set_payroll_status(
    tenant: TenantContext,
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
    Json(body): Json<SetPayrollStatusRequest>,
) -> AppResult<Json<PayrollItem>> {
    let current = sqlx::query_as::<_, PayrollItem>(
        "SELECT * FROM payroll_items WHERE id = $1 AND company_id = $2",
    )
    .bind(item_id)
    .bind(tenant.company_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Payroll item {item_id} not found")))?;

    let allowed = matches!(
        (current.status, body.status),
        (PayrollStatus::Draft, PayrollStatus::Processed)
            | (PayrollStatus::Processed, PayrollStatus::Paid)
    );
    if !allowed {
        return Err(AppError::Conflict(format!(
            "Cannot move payroll item from {:?} to {:?}",
            current.status, body.status
        )));
    }

    let item = sqlx::query_as::<_, PayrollItem>(
        "UPDATE payroll_items SET status = $1, updated_at = NOW()
         WHERE id = $2 AND company_id = $3
         RETURNING *",
    )
    .bind(body.status)
    .bind(item_id)
    .bind(tenant.company_id)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(item))
}

#[derive(Debug, FromRow)]
struct ReportRow {
    department: String,
    #[sqlx(flatten)]
    item: PayrollItem,
}

/// Aggregate payroll report for a month: company totals, per-department
/// summaries, and the net attendance impact.
#[utoipa::path(
    get,
    path = "/api/v1/payroll/report",
    params(
        PeriodQuery,
        ("x-company-id" = String, Header, description = "Tenant company ID"),
    ),
    responses((status = 200, description = "Aggregated payroll report", body = PayrollReport)),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn payroll_report(
    tenant: TenantContext,
    State(state): State<AppState>,
    Query(period): Query<PeriodQuery>,
) -> AppResult<Json<PayrollReport>> {
    month_bounds(period.year, period.month)?;

    let rows = sqlx::query_as::<_, ReportRow>(
        "SELECT e.department, p.* FROM payroll_items p
         JOIN employees e ON e.id = p.employee_id
         WHERE p.company_id = $1 AND p.month = $2 AND p.year = $3",
    )
    .bind(tenant.company_id)
    .bind(period.month as i32)
    .bind(period.year)
    .fetch_all(&state.db)
    .await?;

    let entries: Vec<ReportEntry> = rows
        .into_iter()
        .map(|row| ReportEntry {
            department: row.department,
            item: row.item,
        })
        .collect();

    Ok(Json(aggregate(&entries)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn month_bounds_cover_the_whole_month() {
        let (start, end) = month_bounds(2024, 2).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());

        let (start, end) = month_bounds(2024, 12).unwrap();
        assert_eq!(start.month(), 12);
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
    }

    #[test]
    fn month_bounds_reject_invalid_months() {
        assert!(month_bounds(2024, 0).is_err());
        assert!(month_bounds(2024, 13).is_err());
    }
}

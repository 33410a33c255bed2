// src/routes/mod.rs

use crate::{
    handlers::{
        attendance::{list_attendance, mark_attendance},
        company::{create_company, delete_company, list_companies, set_company_status},
        employee::{
            create_employee, delete_employee, get_employee, list_employees, update_employee,
        },
        payroll::{calculate_payroll, list_payroll, payroll_report, set_payroll_status},
        rates::{create_rate_rule, delete_rate_rule, list_rate_rules, update_rate_rule},
        salary_head::{
            create_salary_head, delete_salary_head, list_salary_heads, update_salary_head,
        },
        user::{login, me, register},
    },
    state::AppState,
};
use axum::{
    Router,
    routing::{delete, get, patch, post, put},
};

pub fn api_routes() -> Router<AppState> {
    Router::new()
        // ─── Auth ─────────────────────────────────────────────
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        // ─── Companies ────────────────────────────────────────
        .route("/companies", post(create_company).get(list_companies))
        .route("/companies/{company_id}", delete(delete_company))
        .route("/companies/{company_id}/status", patch(set_company_status))
        // ─── Employees ────────────────────────────────────────
        .route("/employees", post(create_employee).get(list_employees))
        .route(
            "/employees/{employee_id}",
            get(get_employee).put(update_employee).delete(delete_employee),
        )
        // ─── Salary Heads ─────────────────────────────────────
        .route("/salary-heads", post(create_salary_head).get(list_salary_heads))
        .route(
            "/salary-heads/{head_id}",
            put(update_salary_head).delete(delete_salary_head),
        )
        // ─── Statutory Rates ──────────────────────────────────
        .route(
            "/statutory-rates",
            post(create_rate_rule).get(list_rate_rules),
        )
        .route(
            "/statutory-rates/{rule_id}",
            put(update_rate_rule).delete(delete_rate_rule),
        )
        // ─── Attendance ───────────────────────────────────────
        .route("/attendance", post(mark_attendance))
        .route("/attendance/{employee_id}", get(list_attendance))
        // ─── Payroll ──────────────────────────────────────────
        .route("/payroll", get(list_payroll))
        .route("/payroll/calculate", post(calculate_payroll))
        .route("/payroll/report", get(payroll_report))
        .route("/payroll/{item_id}/status", patch(set_payroll_status))
}

// src/openapi.rs

use crate::models::{
    AttendanceRecord, AttendanceStatus, AuthResponse, CalculatePayrollRequest, Company,
    CompanyStatus, CreateCompanyRequest, CreateEmployeeRequest, CreateRateRuleRequest,
    CreateSalaryHeadRequest, Employee, HeadType, LoginRequest, MarkAttendanceRequest, PayrollItem,
    PayrollStatus, RateCategory, RegisterRequest, SalaryHead, SetCompanyStatusRequest,
    SetPayrollStatusRequest, StatutoryRateRule, UpdateEmployeeRequest, UpdateRateRuleRequest,
    UpdateSalaryHeadRequest, UserPublic,
};
use crate::services::report::{
    AttendanceImpact, DepartmentSummary, PayrollReport, ReportTotals,
};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HR Payroll API",
        version = "1.0.0",
        description = "Multi-tenant HR payroll administration API built with Rust and Axum. \
            Supports company onboarding, employee and salary head management, statutory \
            rate rules with overlap enforcement, attendance tracking, and attendance-adjusted \
            payroll with aggregate reporting.",
        license(name = "MIT")
    ),
    paths(
        // Auth
        crate::handlers::user::register,
        crate::handlers::user::login,
        crate::handlers::user::me,
        // Companies
        crate::handlers::company::create_company,
        crate::handlers::company::list_companies,
        crate::handlers::company::set_company_status,
        crate::handlers::company::delete_company,
        // Employees
        crate::handlers::employee::create_employee,
        crate::handlers::employee::list_employees,
        crate::handlers::employee::get_employee,
        crate::handlers::employee::update_employee,
        crate::handlers::employee::delete_employee,
        // Salary Heads
        crate::handlers::salary_head::create_salary_head,
        crate::handlers::salary_head::list_salary_heads,
        crate::handlers::salary_head::update_salary_head,
        crate::handlers::salary_head::delete_salary_head,
        // Statutory Rates
        crate::handlers::rates::list_rate_rules,
        crate::handlers::rates::create_rate_rule,
        crate::handlers::rates::update_rate_rule,
        crate::handlers::rates::delete_rate_rule,
        // Attendance
        crate::handlers::attendance::mark_attendance,
        crate::handlers::attendance::list_attendance,
        // Payroll
        crate::handlers::payroll::calculate_payroll,
        crate::handlers::payroll::list_payroll,
        crate::handlers::payroll::set_payroll_status,
        crate::handlers::payroll::payroll_report,
        // General
        crate::handlers::general::health,
    ),
    components(
        schemas(
            RegisterRequest, LoginRequest, AuthResponse, UserPublic,
            Company, CompanyStatus, CreateCompanyRequest, SetCompanyStatusRequest,
            Employee, CreateEmployeeRequest, UpdateEmployeeRequest,
            SalaryHead, HeadType, CreateSalaryHeadRequest, UpdateSalaryHeadRequest,
            StatutoryRateRule, RateCategory, CreateRateRuleRequest, UpdateRateRuleRequest,
            AttendanceRecord, AttendanceStatus, MarkAttendanceRequest,
            PayrollItem, PayrollStatus, CalculatePayrollRequest, SetPayrollStatusRequest,
            PayrollReport, ReportTotals, DepartmentSummary, AttendanceImpact,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Auth", description = "Register, login, and inspect the current user"),
        (name = "Companies", description = "Onboard and manage tenant companies"),
        (name = "Employees", description = "Manage the company's employees"),
        (name = "Salary Heads", description = "Configure earning and deduction heads"),
        (name = "Statutory Rates", description = "Versioned PF, ESI, and gratuity rate rules"),
        (name = "Attendance", description = "Mark and review daily attendance"),
        (name = "Payroll", description = "Calculate, track, and report monthly payroll"),
        (name = "General", description = "Service status"),
    )
)]
pub struct ApiDoc;

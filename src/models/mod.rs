// src/models/mod.rs

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// ─── Users ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub full_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct UserPublic {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserPublic {
    fn from(user: User) -> Self {
        UserPublic {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserPublic,
}

// ─── Companies (tenants) ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "company_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CompanyStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Company {
    pub id: Uuid,
    pub owner_user_id: Uuid,
    pub name: String,
    pub status: CompanyStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCompanyRequest {
    pub name: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetCompanyStatusRequest {
    pub status: CompanyStatus,
}

// ─── Employees ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Employee {
    pub id: Uuid,
    pub company_id: Uuid,
    pub employee_code: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub department: String,
    pub designation: String,
    pub date_of_joining: NaiveDate,
    pub pan_number: Option<String>,
    pub uan_number: Option<String>,
    pub esi_number: Option<String>,
    pub bank_account_number: Option<String>,
    pub bank_ifsc: Option<String>,
    pub basic_salary: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateEmployeeRequest {
    pub employee_code: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub department: String,
    pub designation: String,
    pub date_of_joining: NaiveDate,
    pub pan_number: Option<String>,
    pub uan_number: Option<String>,
    pub esi_number: Option<String>,
    pub bank_account_number: Option<String>,
    pub bank_ifsc: Option<String>,
    pub basic_salary: Decimal,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateEmployeeRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub designation: Option<String>,
    pub pan_number: Option<String>,
    pub uan_number: Option<String>,
    pub esi_number: Option<String>,
    pub bank_account_number: Option<String>,
    pub bank_ifsc: Option<String>,
    pub basic_salary: Option<Decimal>,
}

// ─── Salary heads ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "head_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum HeadType {
    Earning,
    Deduction,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct SalaryHead {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub short_name: String,
    pub head_type: HeadType,
    pub is_percentage: bool,
    pub percentage: Option<Decimal>,
    pub percentage_of: Option<String>,
    pub is_system: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSalaryHeadRequest {
    pub name: String,
    pub short_name: String,
    pub head_type: HeadType,
    #[serde(default)]
    pub is_percentage: bool,
    pub percentage: Option<Decimal>,
    pub percentage_of: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateSalaryHeadRequest {
    pub name: Option<String>,
    pub head_type: Option<HeadType>,
    pub is_percentage: Option<bool>,
    pub percentage: Option<Decimal>,
    pub percentage_of: Option<String>,
}

// ─── Statutory rate rules ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "rate_type", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum RateCategory {
    Pf,
    Esi,
    Gratuity,
}

impl RateCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RateCategory::Pf => "PF",
            RateCategory::Esi => "ESI",
            RateCategory::Gratuity => "GRATUITY",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct StatutoryRateRule {
    pub id: Uuid,
    pub company_id: Uuid,
    pub rate_type: RateCategory,
    pub effective_from: NaiveDate,
    pub effective_to: Option<NaiveDate>,
    pub employee_percent: Decimal,
    pub employer_percent: Decimal,
    pub wage_ceiling: Option<Decimal>,
    pub admin_percent: Option<Decimal>,
    pub is_active: bool,
    pub created_by: Uuid,
    pub updated_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Dates arrive as strings so unparseable input can be rejected with a
/// validation error instead of a deserialization failure.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateRateRuleRequest {
    pub rate_type: RateCategory,
    pub effective_from: String,
    pub effective_to: Option<String>,
    pub employee_percent: Decimal,
    pub employer_percent: Decimal,
    pub wage_ceiling: Option<Decimal>,
    pub admin_percent: Option<Decimal>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateRateRuleRequest {
    pub effective_from: Option<String>,
    pub effective_to: Option<String>,
    pub employee_percent: Option<Decimal>,
    pub employer_percent: Option<Decimal>,
    pub wage_ceiling: Option<Decimal>,
    pub admin_percent: Option<Decimal>,
}

// ─── Attendance ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "attendance_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    HalfDay,
    OnLeave,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AttendanceRecord {
    pub id: Uuid,
    pub company_id: Uuid,
    pub employee_id: Uuid,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub check_in: Option<NaiveTime>,
    pub check_out: Option<NaiveTime>,
    pub working_hours: Decimal,
    pub overtime_hours: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MarkAttendanceRequest {
    pub employee_id: Uuid,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub check_in: Option<NaiveTime>,
    pub check_out: Option<NaiveTime>,
}

// ─── Payroll ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payroll_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PayrollStatus {
    Draft,
    Processed,
    Paid,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PayrollItem {
    pub id: Uuid,
    pub company_id: Uuid,
    pub employee_id: Uuid,
    pub month: i32,
    pub year: i32,
    pub basic_salary: Decimal,
    pub hra: Decimal,
    pub conveyance: Decimal,
    pub medical: Decimal,
    pub special_allowance: Decimal,
    pub gross_salary: Decimal,
    pub provident_fund: Decimal,
    pub esi: Decimal,
    pub professional_tax: Decimal,
    pub income_tax: Decimal,
    pub total_deductions: Decimal,
    pub net_salary: Decimal,
    pub working_days: i32,
    pub present_days: i32,
    pub leave_days: i32,
    pub overtime_hours: Decimal,
    pub late_count: i32,
    pub leave_deduction: Decimal,
    pub overtime_payment: Decimal,
    pub late_deduction: Decimal,
    pub adjusted_gross: Decimal,
    pub adjusted_net: Decimal,
    pub status: PayrollStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CalculatePayrollRequest {
    /// 1-12
    pub month: u32,
    pub year: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetPayrollStatusRequest {
    pub status: PayrollStatus,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct PeriodQuery {
    /// 1-12
    pub month: u32,
    pub year: i32,
}

// ─── JWT Claims ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub exp: usize,
    pub iat: usize,
}

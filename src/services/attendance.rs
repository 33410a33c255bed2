// src/services/attendance.rs

use crate::models::{AttendanceRecord, AttendanceStatus};
use crate::services::payroll::PayrollBreakdown;
use chrono::{Datelike, NaiveDate, Weekday};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const HOURS_PER_DAY: Decimal = dec!(8);
const OVERTIME_MULTIPLIER: Decimal = dec!(1.5);
const LATE_PENALTY_FLAT: Decimal = dec!(100);

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AttendanceSummary {
    pub present_days: i32,
    pub leave_days: i32,
    pub overtime_hours: Decimal,
    pub late_count: i32,
}

pub fn summarize(records: &[AttendanceRecord]) -> AttendanceSummary {
    let mut summary = AttendanceSummary::default();
    for record in records {
        match record.status {
            AttendanceStatus::Present => summary.present_days += 1,
            AttendanceStatus::Late => {
                summary.present_days += 1;
                summary.late_count += 1;
            }
            AttendanceStatus::Absent | AttendanceStatus::OnLeave => summary.leave_days += 1,
            // Half days carry no payroll adjustment.
            AttendanceStatus::HalfDay => {}
        }
        summary.overtime_hours += record.overtime_hours;
    }
    summary
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdjustedPayroll {
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
}

/// Layer attendance adjustments on top of a base payroll breakdown.
///
/// With no leave, no overtime, and no late marks the adjusted figures equal
/// the base gross and net.
pub fn adjust(
    base: &PayrollBreakdown,
    records: &[AttendanceRecord],
    working_days: i32,
) -> AdjustedPayroll {
    let summary = summarize(records);

    let daily_salary = base.basic_salary / Decimal::from(working_days);
    let leave_deduction = (Decimal::from(summary.leave_days) * daily_salary).round_dp(2);
    let overtime_rate = daily_salary / HOURS_PER_DAY;
    let overtime_payment = (summary.overtime_hours * overtime_rate * OVERTIME_MULTIPLIER).round_dp(2);
    let late_deduction = Decimal::from(summary.late_count) * LATE_PENALTY_FLAT;

    let adjusted_gross = base.gross_salary - leave_deduction + overtime_payment - late_deduction;
    let adjusted_net = adjusted_gross - base.total_deductions;

    AdjustedPayroll {
        working_days,
        present_days: summary.present_days,
        leave_days: summary.leave_days,
        overtime_hours: summary.overtime_hours,
        late_count: summary.late_count,
        leave_deduction,
        overtime_payment,
        late_deduction,
        adjusted_gross,
        adjusted_net,
    }
}

/// Days in the month excluding Sundays. No holiday calendar.
pub fn working_days_in_month(year: i32, month: u32) -> i32 {
    let mut days = 0;
    let mut date = match NaiveDate::from_ymd_opt(year, month, 1) {
        Some(d) => d,
        None => return 0,
    };
    while date.month() == month {
        if date.weekday() != Weekday::Sun {
            days += 1;
        }
        date = match date.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }
    days
}

/// Advisory data-quality checks. These never block the computation; callers
/// surface the messages alongside the result.
pub fn validate_payroll_data(
    basic_salary: Decimal,
    present_days: i32,
    working_days: i32,
    gross_salary: Decimal,
    net_salary: Decimal,
) -> Vec<String> {
    let mut problems = Vec::new();
    if basic_salary <= Decimal::ZERO {
        problems.push("basic salary is not positive".to_string());
    }
    if present_days > working_days {
        problems.push(format!(
            "present days ({present_days}) exceed working days ({working_days})"
        ));
    }
    if gross_salary < basic_salary {
        problems.push("gross salary is below basic salary".to_string());
    }
    if net_salary <= Decimal::ZERO {
        problems.push("net salary is not positive".to_string());
    }
    problems
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::payroll::{CalcRates, calculate};
    use chrono::{DateTime, Utc};
    use uuid::Uuid;

    fn record(status: AttendanceStatus, overtime_hours: Decimal) -> AttendanceRecord {
        let now: DateTime<Utc> = Utc::now();
        AttendanceRecord {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
            status,
            check_in: None,
            check_out: None,
            working_hours: dec!(8),
            overtime_hours,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn zero_adjustments_leave_base_untouched() {
        let base = calculate(dec!(50000), &CalcRates::default());
        let records = vec![
            record(AttendanceStatus::Present, Decimal::ZERO),
            record(AttendanceStatus::Present, Decimal::ZERO),
        ];
        let adjusted = adjust(&base, &records, 26);

        assert_eq!(adjusted.adjusted_gross, base.gross_salary);
        assert_eq!(adjusted.adjusted_net, base.net_salary);
    }

    #[test]
    fn leave_overtime_and_late_all_apply() {
        let base = calculate(dec!(26000), &CalcRates::default());
        let records = vec![
            record(AttendanceStatus::Absent, Decimal::ZERO),
            record(AttendanceStatus::OnLeave, Decimal::ZERO),
            record(AttendanceStatus::Late, Decimal::ZERO),
            record(AttendanceStatus::Present, dec!(4)),
        ];
        let adjusted = adjust(&base, &records, 26);

        // daily = 26000 / 26 = 1000
        assert_eq!(adjusted.leave_days, 2);
        assert_eq!(adjusted.leave_deduction, dec!(2000.00));
        // overtime: 4h * (1000 / 8) * 1.5 = 750
        assert_eq!(adjusted.overtime_payment, dec!(750.00));
        assert_eq!(adjusted.late_count, 1);
        assert_eq!(adjusted.late_deduction, dec!(100));
        assert_eq!(
            adjusted.adjusted_gross,
            base.gross_salary - dec!(2000.00) + dec!(750.00) - dec!(100)
        );
        assert_eq!(
            adjusted.adjusted_net,
            adjusted.adjusted_gross - base.total_deductions
        );
    }

    #[test]
    fn late_counts_as_present_and_half_day_as_neither() {
        let records = vec![
            record(AttendanceStatus::Late, Decimal::ZERO),
            record(AttendanceStatus::Present, Decimal::ZERO),
            record(AttendanceStatus::HalfDay, Decimal::ZERO),
        ];
        let summary = summarize(&records);
        assert_eq!(summary.present_days, 2);
        assert_eq!(summary.leave_days, 0);
        assert_eq!(summary.late_count, 1);
    }

    #[test]
    fn working_days_exclude_sundays_only() {
        // July 2024 has 31 days and 4 Sundays (7th, 14th, 21st, 28th).
        assert_eq!(working_days_in_month(2024, 7), 27);
        // February 2024 (leap) has 29 days and 4 Sundays.
        assert_eq!(working_days_in_month(2024, 2), 25);
        assert_eq!(working_days_in_month(2024, 13), 0);
    }

    #[test]
    fn validation_flags_all_advisory_conditions() {
        let problems = validate_payroll_data(dec!(-100), 30, 26, dec!(-140), dec!(-500));
        assert_eq!(problems.len(), 4);

        let clean = validate_payroll_data(dec!(50000), 24, 26, dec!(78500), dec!(63892));
        assert!(clean.is_empty());
    }
}

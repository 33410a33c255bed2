// src/services/report.rs

use crate::models::PayrollItem;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// One computed payroll item plus the employee's department, which payroll
/// items do not carry themselves.
#[derive(Debug, Clone)]
pub struct ReportEntry {
    pub department: String,
    pub item: PayrollItem,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct ReportTotals {
    pub employee_count: i64,
    pub gross_salary: Decimal,
    pub total_deductions: Decimal,
    pub net_salary: Decimal,
    pub overtime_payment: Decimal,
    pub leave_deduction: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DepartmentSummary {
    pub department: String,
    pub employee_count: i64,
    pub gross_salary: Decimal,
    pub net_salary: Decimal,
    pub avg_present_days: Decimal,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct AttendanceImpact {
    /// total overtime payment - total leave deductions - total late deductions
    pub net_impact: Decimal,
    pub employees_with_overtime: i64,
    pub employees_with_leave_deduction: i64,
    pub employees_with_late_deduction: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PayrollReport {
    pub totals: ReportTotals,
    pub departments: Vec<DepartmentSummary>,
    pub attendance_impact: AttendanceImpact,
}

/// Pure roll-up of a batch of computed payroll items. No I/O.
pub fn aggregate(entries: &[ReportEntry]) -> PayrollReport {
    let mut totals = ReportTotals::default();
    let mut impact = AttendanceImpact::default();
    let mut by_department: BTreeMap<&str, (i64, Decimal, Decimal, i64)> = BTreeMap::new();

    for entry in entries {
        let item = &entry.item;

        totals.employee_count += 1;
        totals.gross_salary += item.adjusted_gross;
        totals.total_deductions += item.total_deductions;
        totals.net_salary += item.adjusted_net;
        totals.overtime_payment += item.overtime_payment;
        totals.leave_deduction += item.leave_deduction;

        if item.overtime_payment > Decimal::ZERO {
            impact.employees_with_overtime += 1;
        }
        if item.leave_deduction > Decimal::ZERO {
            impact.employees_with_leave_deduction += 1;
        }
        if item.late_deduction > Decimal::ZERO {
            impact.employees_with_late_deduction += 1;
        }
        impact.net_impact += item.overtime_payment - item.leave_deduction - item.late_deduction;

        let slot = by_department
            .entry(entry.department.as_str())
            .or_insert((0, Decimal::ZERO, Decimal::ZERO, 0));
        slot.0 += 1;
        slot.1 += item.adjusted_gross;
        slot.2 += item.adjusted_net;
        slot.3 += i64::from(item.present_days);
    }

    let departments = by_department
        .into_iter()
        .map(|(name, (count, gross, net, present))| DepartmentSummary {
            department: name.to_string(),
            employee_count: count,
            gross_salary: gross,
            net_salary: net,
            avg_present_days: (Decimal::from(present) / Decimal::from(count)).round_dp(2),
        })
        .collect();

    PayrollReport {
        totals,
        departments,
        attendance_impact: impact,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PayrollItem, PayrollStatus};
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn entry(
        department: &str,
        gross: Decimal,
        net: Decimal,
        overtime: Decimal,
        leave: Decimal,
        late: Decimal,
        present_days: i32,
    ) -> ReportEntry {
        let now = Utc::now();
        ReportEntry {
            department: department.to_string(),
            item: PayrollItem {
                id: Uuid::new_v4(),
                company_id: Uuid::new_v4(),
                employee_id: Uuid::new_v4(),
                month: 7,
                year: 2024,
                basic_salary: dec!(30000),
                hra: dec!(12000),
                conveyance: dec!(2000),
                medical: dec!(1500),
                special_allowance: dec!(3000),
                gross_salary: gross,
                provident_fund: dec!(3600),
                esi: Decimal::ZERO,
                professional_tax: dec!(200),
                income_tax: dec!(1000),
                total_deductions: dec!(4800),
                net_salary: net,
                working_days: 26,
                present_days,
                leave_days: 0,
                overtime_hours: Decimal::ZERO,
                late_count: 0,
                leave_deduction: leave,
                overtime_payment: overtime,
                late_deduction: late,
                adjusted_gross: gross - leave + overtime - late,
                adjusted_net: net - leave + overtime - late,
                status: PayrollStatus::Draft,
                created_at: now,
                updated_at: now,
            },
        }
    }

    #[test]
    fn empty_batch_produces_zero_report() {
        let report = aggregate(&[]);
        assert_eq!(report.totals.employee_count, 0);
        assert!(report.departments.is_empty());
        assert_eq!(report.attendance_impact.net_impact, Decimal::ZERO);
    }

    #[test]
    fn totals_departments_and_impact_roll_up() {
        let entries = vec![
            entry("Engineering", dec!(48500), dec!(43700), dec!(750), Decimal::ZERO, Decimal::ZERO, 26),
            entry("Engineering", dec!(48500), dec!(43700), Decimal::ZERO, dec!(2000), dec!(100), 24),
            entry("Sales", dec!(48500), dec!(43700), Decimal::ZERO, Decimal::ZERO, Decimal::ZERO, 25),
        ];
        let report = aggregate(&entries);

        assert_eq!(report.totals.employee_count, 3);
        assert_eq!(report.totals.overtime_payment, dec!(750));
        assert_eq!(report.totals.leave_deduction, dec!(2000));
        // 750 - 2000 - 100
        assert_eq!(report.attendance_impact.net_impact, dec!(-1350));
        assert_eq!(report.attendance_impact.employees_with_overtime, 1);
        assert_eq!(report.attendance_impact.employees_with_leave_deduction, 1);
        assert_eq!(report.attendance_impact.employees_with_late_deduction, 1);

        assert_eq!(report.departments.len(), 2);
        let eng = &report.departments[0];
        assert_eq!(eng.department, "Engineering");
        assert_eq!(eng.employee_count, 2);
        assert_eq!(eng.avg_present_days, dec!(25.00));
        let sales = &report.departments[1];
        assert_eq!(sales.department, "Sales");
        assert_eq!(sales.employee_count, 1);
    }
}

// src/services/payroll.rs

use crate::models::{RateCategory, StatutoryRateRule};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// Percentage rates fed into the calculation. Defaults match the statutory
/// values baked into the legacy payroll sheets; a tenant's active PF/ESI
/// rules override them per period.
#[derive(Debug, Clone, PartialEq)]
pub struct CalcRates {
    /// Employee PF share, percent of basic.
    pub pf_percent: Decimal,
    /// Employee ESI share, percent of gross.
    pub esi_percent: Decimal,
    /// ESI applies only while gross is at or below this ceiling.
    pub esi_wage_ceiling: Decimal,
}

impl Default for CalcRates {
    fn default() -> Self {
        Self {
            pf_percent: dec!(12),
            esi_percent: dec!(0.75),
            esi_wage_ceiling: dec!(21000),
        }
    }
}

impl CalcRates {
    /// Build rates from whichever statutory rules are in effect, keeping the
    /// defaults for anything not configured.
    pub fn from_rules(rules: &[StatutoryRateRule]) -> Self {
        let mut rates = Self::default();
        for rule in rules {
            match rule.rate_type {
                RateCategory::Pf => rates.pf_percent = rule.employee_percent,
                RateCategory::Esi => {
                    rates.esi_percent = rule.employee_percent;
                    if let Some(ceiling) = rule.wage_ceiling {
                        rates.esi_wage_ceiling = ceiling;
                    }
                }
                RateCategory::Gratuity => {}
            }
        }
        rates
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PayrollBreakdown {
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
}

const HRA_PERCENT: Decimal = dec!(0.40);
const SPECIAL_PERCENT: Decimal = dec!(0.10);
const CONVEYANCE_FLAT: Decimal = dec!(2000);
const MEDICAL_FLAT: Decimal = dec!(1500);
const PROFESSIONAL_TAX_FLAT: Decimal = dec!(200);

/// Round to the nearest whole currency unit, half away from zero. Applied at
/// every component, never on the sums, so per-component rounding error is
/// carried into the totals exactly as the legacy computation did.
fn round(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Deterministic payroll breakdown for one employee-month.
///
/// A non-positive basic salary is not rejected here; the advisory checks in
/// the attendance module flag it.
pub fn calculate(basic_salary: Decimal, rates: &CalcRates) -> PayrollBreakdown {
    let hundred = dec!(100);

    let hra = round(basic_salary * HRA_PERCENT);
    let conveyance = CONVEYANCE_FLAT;
    let medical = MEDICAL_FLAT;
    let special_allowance = round(basic_salary * SPECIAL_PERCENT);
    let gross_salary = basic_salary + hra + conveyance + medical + special_allowance;

    let provident_fund = round(basic_salary * rates.pf_percent / hundred);
    let esi = if gross_salary <= rates.esi_wage_ceiling {
        round(gross_salary * rates.esi_percent / hundred)
    } else {
        Decimal::ZERO
    };
    let professional_tax = PROFESSIONAL_TAX_FLAT;
    let income_tax = monthly_income_tax(gross_salary);

    let total_deductions = provident_fund + esi + professional_tax + income_tax;
    let net_salary = gross_salary - total_deductions;

    PayrollBreakdown {
        basic_salary,
        hra,
        conveyance,
        medical,
        special_allowance,
        gross_salary,
        provident_fund,
        esi,
        professional_tax,
        income_tax,
        total_deductions,
        net_salary,
    }
}

/// Indian income tax slabs applied to the annualized gross, brought back to a
/// rounded monthly figure.
fn monthly_income_tax(gross_salary: Decimal) -> Decimal {
    let annual = gross_salary * dec!(12);

    let annual_tax = if annual <= dec!(250000) {
        Decimal::ZERO
    } else if annual <= dec!(500000) {
        (annual - dec!(250000)) * dec!(0.05)
    } else if annual <= dec!(1000000) {
        dec!(12500) + (annual - dec!(500000)) * dec!(0.20)
    } else {
        dec!(112500) + (annual - dec!(1000000)) * dec!(0.30)
    };

    round(annual_tax / dec!(12))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_scenario_basic_50000() {
        let slip = calculate(dec!(50000), &CalcRates::default());

        assert_eq!(slip.hra, dec!(20000));
        assert_eq!(slip.conveyance, dec!(2000));
        assert_eq!(slip.medical, dec!(1500));
        assert_eq!(slip.special_allowance, dec!(5000));
        assert_eq!(slip.gross_salary, dec!(78500));
        assert_eq!(slip.provident_fund, dec!(6000));
        assert_eq!(slip.esi, Decimal::ZERO);
        assert_eq!(slip.professional_tax, dec!(200));
        // annual 942000 -> (12500 + 442000 * 0.20) / 12 = 8408.33 -> 8408
        assert_eq!(slip.income_tax, dec!(8408));
        assert_eq!(slip.total_deductions, dec!(14608));
        assert_eq!(slip.net_salary, dec!(63892));
    }

    #[test]
    fn net_equals_gross_minus_the_four_deductions() {
        for basic in [dec!(8000), dec!(15000), dec!(42000), dec!(100000)] {
            let slip = calculate(basic, &CalcRates::default());
            let deductions =
                slip.provident_fund + slip.esi + slip.professional_tax + slip.income_tax;
            assert_eq!(slip.total_deductions, deductions);
            assert_eq!(slip.net_salary, slip.gross_salary - deductions);
        }
    }

    #[test]
    fn calculation_is_deterministic() {
        let a = calculate(dec!(33333), &CalcRates::default());
        let b = calculate(dec!(33333), &CalcRates::default());
        assert_eq!(a, b);
    }

    #[test]
    fn esi_applies_only_at_or_below_the_wage_ceiling() {
        // basic 10000 -> gross = 10000 + 4000 + 2000 + 1500 + 1000 = 18500
        let below = calculate(dec!(10000), &CalcRates::default());
        assert_eq!(below.gross_salary, dec!(18500));
        assert_eq!(below.esi, round(dec!(18500) * dec!(0.0075)));

        let above = calculate(dec!(50000), &CalcRates::default());
        assert!(above.gross_salary > dec!(21000));
        assert_eq!(above.esi, Decimal::ZERO);
    }

    #[test]
    fn income_tax_slabs() {
        // gross 20000 -> annual 240000, below the exemption limit
        assert_eq!(monthly_income_tax(dec!(20000)), Decimal::ZERO);
        // gross 30000 -> annual 360000 -> 110000 * 0.05 = 5500 -> 458.33 -> 458
        assert_eq!(monthly_income_tax(dec!(30000)), dec!(458));
        // gross 100000 -> annual 1200000 -> 112500 + 200000 * 0.30 = 172500 -> 14375
        assert_eq!(monthly_income_tax(dec!(100000)), dec!(14375));
    }

    #[test]
    fn non_positive_basic_still_computes() {
        let slip = calculate(dec!(-5000), &CalcRates::default());
        // hra -2000, conveyance 2000, medical 1500, special -500 -> gross -4000
        assert_eq!(slip.gross_salary, dec!(-4000));
        // the permissive behavior: no error, a nonsensical net comes out
        assert!(slip.net_salary < Decimal::ZERO);
    }

    #[test]
    fn tenant_rules_override_defaults() {
        let rates = CalcRates {
            pf_percent: dec!(10),
            ..CalcRates::default()
        };
        let slip = calculate(dec!(50000), &rates);
        assert_eq!(slip.provident_fund, dec!(5000));
    }
}

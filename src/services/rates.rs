// src/services/rates.rs

use crate::errors::{AppError, AppResult};
use crate::models::{RateCategory, StatutoryRateRule};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

/// An effective-date interval. An absent end date means the rule is
/// open-ended and extends to the far future for overlap comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateWindow {
    pub from: NaiveDate,
    pub to: Option<NaiveDate>,
}

impl RateWindow {
    pub fn new(from: NaiveDate, to: Option<NaiveDate>) -> Self {
        Self { from, to }
    }

    fn end(&self) -> NaiveDate {
        self.to.unwrap_or(NaiveDate::MAX)
    }
}

/// Closed-interval overlap: `a.from <= b.to && b.from <= a.to`. Symmetric by
/// construction.
pub fn overlaps(a: RateWindow, b: RateWindow) -> bool {
    a.from <= b.end() && b.from <= a.end()
}

/// Application-side overlap check against the already-loaded active rules of
/// one tenant+category. GRATUITY rules are exempt. `exclude` skips the rule
/// being updated.
pub fn ensure_no_overlap(
    existing: &[StatutoryRateRule],
    category: RateCategory,
    candidate: RateWindow,
    exclude: Option<Uuid>,
) -> AppResult<()> {
    if category == RateCategory::Gratuity {
        return Ok(());
    }
    let conflict = existing.iter().any(|rule| {
        rule.is_active
            && rule.rate_type == category
            && Some(rule.id) != exclude
            && overlaps(candidate, RateWindow::new(rule.effective_from, rule.effective_to))
    });
    if conflict {
        return Err(AppError::Overlap {
            category: category.as_str().to_string(),
        });
    }
    Ok(())
}

pub fn parse_date(field: &str, value: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("{field} must be a date in YYYY-MM-DD format")))
}

/// Parse the effective window of a rule. Ordering of the two dates is only
/// enforced when `strict` is set (STRICT_RATE_DATES); the default preserves
/// the historical permissive behavior.
pub fn parse_window(from: &str, to: Option<&str>, strict: bool) -> AppResult<RateWindow> {
    let from = parse_date("effective_from", from)?;
    let to = to.map(|v| parse_date("effective_to", v)).transpose()?;
    if strict {
        if let Some(to) = to {
            if to < from {
                return Err(AppError::Validation(
                    "effective_to must not be earlier than effective_from".to_string(),
                ));
            }
        }
    }
    Ok(RateWindow::new(from, to))
}

pub fn validate_percent(field: &str, value: Decimal) -> AppResult<()> {
    if value < Decimal::ZERO || value > dec!(100) {
        return Err(AppError::Validation(format!(
            "{field} must be between 0 and 100"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn window(from: &str, to: Option<&str>) -> RateWindow {
        RateWindow::new(date(from), to.map(date))
    }

    #[test]
    fn overlap_is_symmetric() {
        let cases = [
            (window("2024-01-01", Some("2024-12-31")), window("2024-06-01", None)),
            (window("2024-01-01", Some("2024-05-31")), window("2024-06-01", Some("2024-12-31"))),
            (window("2024-01-01", None), window("2023-01-01", None)),
            (window("2024-03-01", Some("2024-03-31")), window("2024-03-31", Some("2024-04-30"))),
        ];
        for (a, b) in cases {
            assert_eq!(overlaps(a, b), overlaps(b, a), "asymmetric for {a:?} / {b:?}");
        }
    }

    #[test]
    fn adjacent_and_disjoint_windows() {
        // shared boundary day counts as overlap (closed intervals)
        assert!(overlaps(
            window("2024-01-01", Some("2024-06-30")),
            window("2024-06-30", None),
        ));
        assert!(!overlaps(
            window("2024-01-01", Some("2024-06-30")),
            window("2024-07-01", None),
        ));
    }

    #[test]
    fn open_ended_windows_extend_forever() {
        assert!(overlaps(
            window("2024-01-01", None),
            window("2030-01-01", Some("2030-12-31")),
        ));
    }

    #[test]
    fn parse_window_rejects_garbage_dates() {
        assert!(parse_window("2024-01-01", Some("2024-12-31"), false).is_ok());
        assert!(parse_window("not-a-date", None, false).is_err());
        assert!(parse_window("2024-01-01", Some("31/12/2024"), false).is_err());
    }

    #[test]
    fn inverted_window_allowed_unless_strict() {
        assert!(parse_window("2024-12-31", Some("2024-01-01"), false).is_ok());
        assert!(parse_window("2024-12-31", Some("2024-01-01"), true).is_err());
    }
}

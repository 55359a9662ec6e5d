//! Insured Declared Value banding.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::catalog::{DepreciationRate, LookupQuery, RateCatalog};
use super::error::EngineError;

/// Mean Gregorian year length used for vehicle age.
pub const DAYS_PER_YEAR: f64 = 365.2425;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdvRange {
    pub mean_idv: i64,
    pub min_idv: i64,
    pub max_idv: i64,
}

impl IdvRange {
    pub fn contains(&self, idv: i64) -> bool {
        self.min_idv <= idv && idv <= self.max_idv
    }
}

/// IDV band with the inputs it was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IdvQuote {
    pub vehicle_age: u32,
    pub depreciation_rate: f64,
    #[serde(flatten)]
    pub range: IdvRange,
}

/// Computes the IDV band. All three values truncate towards zero.
///
/// Callers validate `ex_showroom_price >= 0` and `0 <= depreciation_rate <= 100`.
pub fn calculate_vehicle_idv(depreciation_rate: f64, ex_showroom_price: f64) -> IdvRange {
    let mean_idv = (ex_showroom_price * (100.0 - depreciation_rate) / 100.0).trunc() as i64;
    let mean = mean_idv as f64;
    let min_idv = (mean * (100.0 - depreciation_rate) / 100.0).trunc() as i64;
    let max_idv = (mean * (100.0 + depreciation_rate) / 100.0).trunc() as i64;

    IdvRange {
        mean_idv,
        min_idv,
        max_idv,
    }
}

/// Whole years between the invoice date and `today`.
pub fn vehicle_age(invoice_date: NaiveDate, today: NaiveDate) -> Result<u32, EngineError> {
    let days = (today - invoice_date).num_days();
    if days < 0 {
        return Err(EngineError::InvalidInput(format!(
            "invoice date {invoice_date} is after {today}"
        )));
    }
    Ok((days as f64 / DAYS_PER_YEAR).floor() as u32)
}

/// Resolves the depreciation rate for the vehicle's age and derives its IDV band.
pub fn quote_idv(
    depreciation: &RateCatalog<DepreciationRate>,
    vehicle_type: Option<&str>,
    invoice_date: NaiveDate,
    ex_showroom_price: f64,
    today: NaiveDate,
) -> Result<IdvQuote, EngineError> {
    if !ex_showroom_price.is_finite() || ex_showroom_price < 0.0 {
        return Err(EngineError::InvalidInput(format!(
            "ex-showroom price {ex_showroom_price} must be a non-negative amount"
        )));
    }

    let age = vehicle_age(invoice_date, today)?;
    let query = LookupQuery::new(today)
        .exact_opt("vehicle_type", vehicle_type)
        .number("vehicle_age", f64::from(age));
    let record = depreciation.resolve(&query)?;
    let rate = record.payload.rate;
    if !(0.0..=100.0).contains(&rate) {
        return Err(EngineError::InvalidInput(format!(
            "depreciation record {} carries rate {rate} outside 0..=100",
            record.id
        )));
    }

    Ok(IdvQuote {
        vehicle_age: age,
        depreciation_rate: rate,
        range: calculate_vehicle_idv(rate, ex_showroom_price),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rating::catalog::{CatalogKind, RateRecord, Validity};
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn three_year_old_vehicle_band() {
        let idv = calculate_vehicle_idv(40.0, 500_000.0);
        assert_eq!(
            idv,
            IdvRange {
                mean_idv: 300_000,
                min_idv: 180_000,
                max_idv: 420_000,
            }
        );
    }

    #[test]
    fn fractional_results_truncate() {
        let idv = calculate_vehicle_idv(15.0, 99_999.0);
        assert_eq!(idv.mean_idv, 84_999);
        assert_eq!(idv.min_idv, 72_249);
        assert_eq!(idv.max_idv, 97_748);
    }

    #[test]
    fn age_uses_whole_gregorian_years() {
        let invoice = date(2021, 6, 15);
        assert_eq!(vehicle_age(invoice, date(2024, 6, 14)).expect("age"), 2);
        assert_eq!(vehicle_age(invoice, date(2024, 6, 15)).expect("age"), 3);
        assert_eq!(vehicle_age(invoice, invoice).expect("age"), 0);
        assert!(matches!(
            vehicle_age(invoice, date(2021, 6, 14)),
            Err(EngineError::InvalidInput(_))
        ));
    }

    #[test]
    fn quote_resolves_depreciation_by_age_band() {
        let start = date(2020, 1, 1);
        let catalog = RateCatalog::with_records(
            CatalogKind::Depreciation,
            [
                RateRecord::new("dep-0", Validity::open_from(start), DepreciationRate { rate: 5.0 })
                    .band("vehicle_age", Some(0.0), Some(0.0)),
                RateRecord::new("dep-3", Validity::open_from(start), DepreciationRate { rate: 40.0 })
                    .band("vehicle_age", Some(3.0), Some(3.0)),
            ],
        )
        .expect("catalog builds");

        let quote = quote_idv(&catalog, None, date(2021, 3, 1), 500_000.0, date(2024, 6, 1))
            .expect("quote resolves");
        assert_eq!(quote.vehicle_age, 3);
        assert_eq!(quote.depreciation_rate, 40.0);
        assert_eq!(quote.range.mean_idv, 300_000);

        let err = quote_idv(&catalog, None, date(2022, 3, 1), 500_000.0, date(2024, 6, 1))
            .expect_err("no two year band");
        assert!(err.is_not_found());

        let err = quote_idv(&catalog, None, date(2021, 3, 1), -1.0, date(2024, 6, 1))
            .expect_err("negative price");
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_idv_band_is_ordered_and_truncated(
            depreciation_bp in 0u32..=10_000,
            price in 0u32..50_000_000
        ) {
            let d = f64::from(depreciation_bp) / 100.0;
            let p = f64::from(price);
            let idv = calculate_vehicle_idv(d, p);

            prop_assert_eq!(idv.mean_idv, (p * (100.0 - d) / 100.0).floor() as i64);
            prop_assert_eq!(idv.min_idv, (idv.mean_idv as f64 * (100.0 - d) / 100.0).floor() as i64);
            prop_assert_eq!(idv.max_idv, (idv.mean_idv as f64 * (100.0 + d) / 100.0).floor() as i64);
            prop_assert!(idv.min_idv <= idv.mean_idv);
            prop_assert!(idv.mean_idv <= idv.max_idv);
        }
    }
}

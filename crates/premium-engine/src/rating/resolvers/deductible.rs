use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::rating::catalog::{CatalogError, DeductibleSlab, LookupQuery, RateCatalog};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedDeductible {
    pub record_id: String,
    pub deductible: f64,
    pub discount_percentage: f64,
    pub max_discount: f64,
}

impl ResolvedDeductible {
    /// Discount on `base`, capped at the slab's maximum.
    pub fn discount_on(&self, base: f64) -> f64 {
        (base * self.discount_percentage / 100.0).min(self.max_discount)
    }
}

/// Voluntary deductible slab for the amount the proposer selected.
///
/// No selection, or no matching slab, means no deductible discount.
pub fn resolve_deductible(
    catalog: &RateCatalog<DeductibleSlab>,
    vehicle_type: &str,
    selected_amount: Option<f64>,
    as_of: NaiveDate,
) -> Result<Option<ResolvedDeductible>, CatalogError> {
    let Some(amount) = selected_amount.filter(|amount| *amount > 0.0) else {
        return Ok(None);
    };

    let query = LookupQuery::new(as_of)
        .exact("vehicle_type", vehicle_type)
        .number("deductible_amount", amount);
    Ok(catalog.resolve_optional(&query)?.map(|record| ResolvedDeductible {
        record_id: record.id.clone(),
        deductible: record.payload.deductible,
        discount_percentage: record.payload.discount_percentage,
        max_discount: record.payload.max_discount,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rating::catalog::{CatalogKind, RateRecord, Validity};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn catalog() -> RateCatalog<DeductibleSlab> {
        RateCatalog::with_records(
            CatalogKind::VoluntaryDeductible,
            [RateRecord::new(
                "vd-2500",
                Validity::open_from(date(2024, 1, 1)),
                DeductibleSlab {
                    discount_percentage: 20.0,
                    max_discount: 750.0,
                    deductible: 2500.0,
                },
            )
            .exact("vehicle_type", "4W")
            .band("deductible_amount", Some(2500.0), Some(2500.0))],
        )
        .expect("catalog builds")
    }

    #[test]
    fn discount_is_capped() {
        let slab = resolve_deductible(&catalog(), "4W", Some(2500.0), date(2024, 6, 1))
            .expect("lookup")
            .expect("slab found");
        assert_eq!(slab.deductible, 2500.0);
        assert_eq!(slab.discount_on(2000.0), 400.0);
        assert_eq!(slab.discount_on(10_000.0), 750.0);
    }

    #[test]
    fn no_selection_or_unknown_amount_has_no_effect() {
        let as_of = date(2024, 6, 1);
        assert!(resolve_deductible(&catalog(), "4W", None, as_of).expect("lookup").is_none());
        assert!(resolve_deductible(&catalog(), "4W", Some(0.0), as_of).expect("lookup").is_none());
        assert!(resolve_deductible(&catalog(), "4W", Some(5000.0), as_of).expect("lookup").is_none());
    }
}

use serde::{Deserialize, Serialize};

use super::import::{CatalogImportError, FromRateRow, RateRow};

/// Own-damage rate, expressed as a percentage of total IDV.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OdRate {
    pub rate: f64,
}

/// Third-party tariff premium for the term.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TpRate {
    pub premium: f64,
}

/// Personal-accident cover premium.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaRate {
    pub premium: f64,
}

/// Depreciation percentage applied to the ex-showroom price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepreciationRate {
    pub rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DiscountValue {
    Percentage(f64),
    FixedAmount(f64),
}

impl DiscountValue {
    /// Amount taken off `base`; fixed amounts never exceed it.
    pub fn amount_on(&self, base: f64) -> f64 {
        match *self {
            DiscountValue::Percentage(pct) => base * pct / 100.0,
            DiscountValue::FixedAmount(amount) => amount.min(base),
        }
    }
}

/// No-claim bonus percentages. `new_slab` supersedes the legacy value when the
/// engine is configured for it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NcbSlab {
    pub percentage: f64,
    pub new_slab: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeductibleSlab {
    pub discount_percentage: f64,
    pub max_discount: f64,
    pub deductible: f64,
}

/// Addon premium multiplier applied to total IDV.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AddonRate {
    pub rate: f64,
}

/// Pre-fixed bundle price overriding the member sum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BundlePrice {
    pub fixed_premium: f64,
}

impl FromRateRow for OdRate {
    const COLUMNS: &'static [&'static str] = &["rate"];

    fn from_row(row: &RateRow<'_>) -> Result<Self, CatalogImportError> {
        Ok(Self {
            rate: row.required_number("rate")?,
        })
    }
}

impl FromRateRow for TpRate {
    const COLUMNS: &'static [&'static str] = &["premium"];

    fn from_row(row: &RateRow<'_>) -> Result<Self, CatalogImportError> {
        Ok(Self {
            premium: row.required_number("premium")?,
        })
    }
}

impl FromRateRow for PaRate {
    const COLUMNS: &'static [&'static str] = &["premium"];

    fn from_row(row: &RateRow<'_>) -> Result<Self, CatalogImportError> {
        Ok(Self {
            premium: row.required_number("premium")?,
        })
    }
}

impl FromRateRow for DepreciationRate {
    const COLUMNS: &'static [&'static str] = &["rate"];

    fn from_row(row: &RateRow<'_>) -> Result<Self, CatalogImportError> {
        Ok(Self {
            rate: row.required_number("rate")?,
        })
    }
}

impl FromRateRow for DiscountValue {
    const COLUMNS: &'static [&'static str] = &["percentage", "fixed_amount"];

    fn from_row(row: &RateRow<'_>) -> Result<Self, CatalogImportError> {
        match (row.number("percentage")?, row.number("fixed_amount")?) {
            (Some(pct), None) => Ok(Self::Percentage(pct)),
            (None, Some(amount)) => Ok(Self::FixedAmount(amount)),
            (Some(_), Some(_)) => Err(row.error("set either percentage or fixed_amount, not both")),
            (None, None) => Err(row.error("missing percentage or fixed_amount")),
        }
    }
}

impl FromRateRow for NcbSlab {
    const COLUMNS: &'static [&'static str] = &["percentage", "new_slab"];

    fn from_row(row: &RateRow<'_>) -> Result<Self, CatalogImportError> {
        Ok(Self {
            percentage: row.required_number("percentage")?,
            new_slab: row.number("new_slab")?,
        })
    }
}

impl FromRateRow for DeductibleSlab {
    const COLUMNS: &'static [&'static str] = &["discount_percentage", "max_discount", "deductible"];

    fn from_row(row: &RateRow<'_>) -> Result<Self, CatalogImportError> {
        Ok(Self {
            discount_percentage: row.required_number("discount_percentage")?,
            max_discount: row.required_number("max_discount")?,
            deductible: row.required_number("deductible")?,
        })
    }
}

impl FromRateRow for AddonRate {
    const COLUMNS: &'static [&'static str] = &["rate"];

    fn from_row(row: &RateRow<'_>) -> Result<Self, CatalogImportError> {
        Ok(Self {
            rate: row.required_number("rate")?,
        })
    }
}

impl FromRateRow for BundlePrice {
    const COLUMNS: &'static [&'static str] = &["fixed_premium"];

    fn from_row(row: &RateRow<'_>) -> Result<Self, CatalogImportError> {
        Ok(Self {
            fixed_premium: row.required_number("fixed_premium")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_discount_is_capped_at_base() {
        assert_eq!(DiscountValue::FixedAmount(500.0).amount_on(300.0), 300.0);
        assert_eq!(DiscountValue::Percentage(10.0).amount_on(2500.0), 250.0);
    }
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::rating::catalog::{CatalogError, LookupQuery, NcbSlab, RateCatalog};
use crate::rating::domain::PolicyContext;

/// Which NCB value on a slab record applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NcbModel {
    #[default]
    Legacy,
    NewSlab,
}

impl NcbModel {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "legacy" => Some(Self::Legacy),
            "new_slab" | "new-slab" | "new" => Some(Self::NewSlab),
            _ => None,
        }
    }

    fn select(self, slab: &NcbSlab) -> f64 {
        match self {
            Self::Legacy => slab.percentage,
            Self::NewSlab => slab.new_slab.unwrap_or(slab.percentage),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NcbContext {
    pub business_type: Option<String>,
    pub insurer: Option<String>,
    pub claim_count: Option<u32>,
    pub claimed_last_year: Option<bool>,
    pub previous_ncb: Option<f64>,
    pub previous_policy_type: Option<String>,
}

impl NcbContext {
    pub fn from_policy(policy: &PolicyContext) -> Self {
        Self {
            business_type: Some(policy.business_type.key().to_string()),
            insurer: Some(policy.insurer.clone()),
            claim_count: Some(policy.claims.claim_count),
            claimed_last_year: Some(policy.claims.claimed_last_year),
            previous_ncb: policy.claims.previous_ncb,
            previous_policy_type: policy.previous_policy_type.clone(),
        }
    }

    fn to_query(&self, as_of: NaiveDate) -> LookupQuery {
        let claimed = self.claimed_last_year.map(|claimed| claimed.to_string());
        LookupQuery::new(as_of)
            .exact_opt("business_type", self.business_type.as_deref())
            .exact_opt("insurer", self.insurer.as_deref())
            .number_opt("claim_count", self.claim_count.map(f64::from))
            .exact_opt("claimed_last_year", claimed.as_deref())
            .number_opt("previous_ncb", self.previous_ncb)
            .exact_opt("previous_policy_type", self.previous_policy_type.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedNcb {
    pub record_id: String,
    pub percentage: f64,
}

/// Applicable NCB percentage under the configured model; `None` when no slab matches.
pub fn resolve_ncb(
    catalog: &RateCatalog<NcbSlab>,
    context: &NcbContext,
    as_of: NaiveDate,
    model: NcbModel,
) -> Result<Option<ResolvedNcb>, CatalogError> {
    let record = catalog.resolve_optional(&context.to_query(as_of))?;
    Ok(record.map(|record| ResolvedNcb {
        record_id: record.id.clone(),
        percentage: model.select(&record.payload),
    }))
}

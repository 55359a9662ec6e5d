use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::rating::catalog::{CatalogError, DiscountValue, LookupQuery, RateCatalog, RateRecord};
use crate::rating::domain::{PolicyContext, VehicleContext};

/// Discount dimensions; any subset may be supplied, the rest match anything.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DiscountContext {
    #[serde(default)]
    pub vehicle_type: Option<String>,
    #[serde(default)]
    pub insurer: Option<String>,
    /// Engine size checked against the record's `min_cc`/`max_cc` band.
    #[serde(default)]
    pub cc: Option<f64>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub city_cluster: Option<String>,
    #[serde(default)]
    pub business_type: Option<String>,
    #[serde(default)]
    pub dealer_code: Option<String>,
    #[serde(default)]
    pub fuel_type: Option<String>,
    #[serde(default)]
    pub ncb: Option<f64>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub variant: Option<String>,
    #[serde(default)]
    pub renewal_type: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub rto_code: Option<String>,
    #[serde(default)]
    pub rto_cluster: Option<String>,
    #[serde(default)]
    pub vehicle_age: Option<u32>,
    #[serde(default)]
    pub vin: Option<String>,
}

impl DiscountContext {
    pub fn from_request(vehicle: &VehicleContext, policy: &PolicyContext, vehicle_age: u32) -> Self {
        let area = &vehicle.registration;
        Self {
            vehicle_type: Some(vehicle.vehicle_type.clone()),
            insurer: Some(policy.insurer.clone()),
            cc: vehicle.cubic_capacity,
            city: area.city.clone(),
            city_cluster: area.city_cluster.clone(),
            business_type: Some(policy.business_type.key().to_string()),
            dealer_code: policy.dealer_code.clone(),
            fuel_type: Some(vehicle.fuel_type.clone()),
            ncb: policy.claims.previous_ncb,
            model: vehicle.model.clone(),
            variant: vehicle.variant.clone(),
            renewal_type: policy.renewal_type.clone(),
            state: area.state.clone(),
            rto_code: area.rto_code.clone(),
            rto_cluster: area.rto_cluster.clone(),
            vehicle_age: Some(vehicle_age),
            vin: vehicle.vin.clone(),
        }
    }

    pub fn to_query(&self, as_of: NaiveDate) -> LookupQuery {
        LookupQuery::new(as_of)
            .exact_opt("vehicle_type", self.vehicle_type.as_deref())
            .exact_opt("insurer", self.insurer.as_deref())
            .number_opt("cc", self.cc)
            .exact_opt("city", self.city.as_deref())
            .exact_opt("city_cluster", self.city_cluster.as_deref())
            .exact_opt("business_type", self.business_type.as_deref())
            .exact_opt("dealer_code", self.dealer_code.as_deref())
            .exact_opt("fuel_type", self.fuel_type.as_deref())
            .number_opt("ncb", self.ncb)
            .exact_opt("model", self.model.as_deref())
            .exact_opt("variant", self.variant.as_deref())
            .exact_opt("renewal_type", self.renewal_type.as_deref())
            .exact_opt("state", self.state.as_deref())
            .exact_opt("rto_code", self.rto_code.as_deref())
            .exact_opt("rto_cluster", self.rto_cluster.as_deref())
            .number_opt("vehicle_age", self.vehicle_age.map(f64::from))
            .exact_opt("vin", self.vin.as_deref())
    }
}

/// A discount available for a context, with its validity window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountOffer {
    pub record_id: String,
    pub value: DiscountValue,
    pub valid_from: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_till: Option<NaiveDate>,
}

impl From<&RateRecord<DiscountValue>> for DiscountOffer {
    fn from(record: &RateRecord<DiscountValue>) -> Self {
        Self {
            record_id: record.id.clone(),
            value: record.payload,
            valid_from: record.validity.valid_from,
            valid_till: record.validity.valid_till,
        }
    }
}

/// The single applicable discount, or `None` when nothing matches.
pub fn resolve_discount(
    catalog: &RateCatalog<DiscountValue>,
    context: &DiscountContext,
    as_of: NaiveDate,
) -> Result<Option<DiscountOffer>, CatalogError> {
    let query = context.to_query(as_of);
    let offer = catalog.resolve_optional(&query)?.map(DiscountOffer::from);
    if offer.is_none() {
        debug!(filters = %query.describe(), %as_of, "no discount applies");
    }
    Ok(offer)
}

/// Every discount active for the context, most specific first.
pub fn discount_range(
    catalog: &RateCatalog<DiscountValue>,
    context: &DiscountContext,
    as_of: NaiveDate,
) -> Result<Vec<DiscountOffer>, CatalogError> {
    Ok(catalog
        .matching(&context.to_query(as_of))?
        .into_iter()
        .map(DiscountOffer::from)
        .collect())
}

//! Addon and addon-bundle pricing.
//!
//! Each requested bundle is priced independently. A bundle carrying a fixed
//! price in the bundle price catalog is returned as is; otherwise its members
//! are fetched from reference data and their addon premiums summed. A bundle
//! whose members cannot be fetched becomes a [`BundleOutcome::Failed`] entry
//! and does not affect the other bundles. Ambiguous rate data is never
//! downgraded this way.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::catalog::{AddonRate, BundlePrice, CatalogError, LookupQuery, RateCatalog};
use super::domain::{PolicyContext, VehicleContext};
use super::error::EngineError;
use super::store::ReferenceDataClient;

/// Vehicle attributes addon rates are banded by, plus the requested bundles.
#[derive(Debug, Clone, PartialEq)]
pub struct AddonVehicle {
    pub vehicle_type: String,
    pub insurer: String,
    pub cc: Option<f64>,
    pub kw: Option<f64>,
    pub vehicle_age: u32,
    pub variant: Option<String>,
    pub prior_ncb: bool,
    pub bundle_ids: Vec<String>,
    pub as_of: NaiveDate,
}

impl AddonVehicle {
    pub fn from_request(
        vehicle: &VehicleContext,
        policy: &PolicyContext,
        vehicle_age: u32,
        as_of: NaiveDate,
    ) -> Self {
        Self {
            vehicle_type: vehicle.vehicle_type.clone(),
            insurer: policy.insurer.clone(),
            cc: vehicle.cubic_capacity,
            kw: vehicle.kilowatt,
            vehicle_age,
            variant: vehicle.variant.clone(),
            prior_ncb: policy.has_prior_ncb(),
            bundle_ids: policy.bundles.clone(),
            as_of,
        }
    }

    fn addon_query(&self, addon_id: &str) -> LookupQuery {
        LookupQuery::new(self.as_of)
            .exact("addon_id", addon_id)
            .exact("vehicle_type", &self.vehicle_type)
            .exact_opt("variant", self.variant.as_deref())
            .exact("prior_ncb", self.prior_ncb.to_string())
            .number_opt("cc", self.cc)
            .number_opt("kw", self.kw)
            .number("vehicle_age", f64::from(self.vehicle_age))
    }

    fn bundle_query(&self, addon_bundle_id: &str) -> LookupQuery {
        LookupQuery::new(self.as_of)
            .exact("addon_bundle_id", addon_bundle_id)
            .exact("vehicle_type", &self.vehicle_type)
            .exact("insurer", &self.insurer)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddonPremium {
    pub addon_id: String,
    pub rate: f64,
    pub premium: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BundlePricing {
    Fixed,
    MemberSum,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundlePremium {
    pub addon_bundle_id: String,
    pub premium: f64,
    pub pricing: BundlePricing,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub members: Vec<AddonPremium>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleFailure {
    pub addon_bundle_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BundleOutcome {
    Priced(BundlePremium),
    Failed(BundleFailure),
}

/// Prices addons and bundles against one rate snapshot.
pub struct AddonPremiumAggregator<'a, C: ?Sized> {
    addon_rates: &'a RateCatalog<AddonRate>,
    bundle_prices: &'a RateCatalog<BundlePrice>,
    reference: &'a C,
}

impl<'a, C> AddonPremiumAggregator<'a, C>
where
    C: ReferenceDataClient + ?Sized,
{
    pub fn new(
        addon_rates: &'a RateCatalog<AddonRate>,
        bundle_prices: &'a RateCatalog<BundlePrice>,
        reference: &'a C,
    ) -> Self {
        Self {
            addon_rates,
            bundle_prices,
            reference,
        }
    }

    /// Premium for each addon with an active rate, restricted to `addon_ids`
    /// when given. Addons without a rate are left out.
    pub fn calculate_addon_premium(
        &self,
        vehicle: &AddonVehicle,
        total_idv: f64,
        addon_ids: Option<&[String]>,
    ) -> Result<Vec<AddonPremium>, CatalogError> {
        let ids = match addon_ids {
            Some(ids) => ids.to_vec(),
            None => self.addon_rates.addon_ids(),
        };

        let mut premiums = Vec::with_capacity(ids.len());
        for addon_id in ids {
            match self.addon_rates.resolve_optional(&vehicle.addon_query(&addon_id))? {
                Some(record) => premiums.push(AddonPremium {
                    rate: record.payload.rate,
                    premium: round_currency(record.payload.rate * total_idv),
                    addon_id,
                }),
                None => debug!(%addon_id, vehicle_type = %vehicle.vehicle_type, "addon has no active rate"),
            }
        }

        Ok(premiums)
    }

    /// One outcome per requested bundle, in request order.
    ///
    /// Reference-data failures only fail their own bundle. Ambiguous or
    /// invalid catalog lookups abort the whole call.
    pub fn calculate_addon_bundle_premium(
        &self,
        vehicle: &AddonVehicle,
        total_idv: f64,
    ) -> Result<Vec<BundleOutcome>, CatalogError> {
        let mut outcomes = Vec::with_capacity(vehicle.bundle_ids.len());
        for bundle_id in &vehicle.bundle_ids {
            let outcome = match self.price_bundle(vehicle, bundle_id, total_idv) {
                Ok(premium) => BundleOutcome::Priced(premium),
                Err(EngineError::Catalog(err)) if !matches!(err, CatalogError::NotFound { .. }) => {
                    return Err(err);
                }
                Err(err) => {
                    warn!(addon_bundle_id = %bundle_id, error = %err, "bundle could not be priced");
                    BundleOutcome::Failed(BundleFailure {
                        addon_bundle_id: bundle_id.clone(),
                        reason: err.to_string(),
                    })
                }
            };
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    fn price_bundle(
        &self,
        vehicle: &AddonVehicle,
        bundle_id: &str,
        total_idv: f64,
    ) -> Result<BundlePremium, EngineError> {
        if let Some(fixed) = self
            .bundle_prices
            .resolve_optional(&vehicle.bundle_query(bundle_id))?
        {
            return Ok(BundlePremium {
                addon_bundle_id: bundle_id.to_string(),
                premium: fixed.payload.fixed_premium,
                pricing: BundlePricing::Fixed,
                members: Vec::new(),
            });
        }

        let member_ids = self.reference.bundle_addons(bundle_id)?;
        let members = self.calculate_addon_premium(vehicle, total_idv, Some(member_ids.as_slice()))?;
        let premium = round_currency(members.iter().map(|member| member.premium).sum());

        Ok(BundlePremium {
            addon_bundle_id: bundle_id.to_string(),
            premium,
            pricing: BundlePricing::MemberSum,
            members,
        })
    }
}

/// Rounds to two decimal places, half away from zero.
pub fn round_currency(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

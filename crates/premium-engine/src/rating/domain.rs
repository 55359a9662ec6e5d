use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::addons::{AddonPremium, BundleFailure, BundlePremium};
use super::idv::IdvRange;

/// Vehicle attributes the rate catalogs are keyed on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleContext {
    pub vehicle_type: String,
    pub fuel_type: String,
    #[serde(default)]
    pub cubic_capacity: Option<f64>,
    #[serde(default)]
    pub kilowatt: Option<f64>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub variant: Option<String>,
    #[serde(default)]
    pub vin: Option<String>,
    #[serde(default)]
    pub registration: RegistrationArea,
    pub invoice_date: NaiveDate,
    pub ex_showroom_price: f64,
    #[serde(default)]
    pub electrical_accessories: f64,
    #[serde(default)]
    pub non_electrical_accessories: f64,
}

/// Registration geography used by zone and cluster keyed tables.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RegistrationArea {
    #[serde(default)]
    pub rto_zone: Option<String>,
    #[serde(default)]
    pub rto_code: Option<String>,
    #[serde(default)]
    pub rto_cluster: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub city_cluster: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusinessType {
    New,
    Renewal,
    Rollover,
}

impl BusinessType {
    pub const fn key(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Renewal => "renewal",
            Self::Rollover => "rollover",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ClaimHistory {
    #[serde(default)]
    pub claim_count: u32,
    #[serde(default)]
    pub claimed_last_year: bool,
    /// NCB percentage earned on the expiring policy.
    #[serde(default)]
    pub previous_ncb: Option<f64>,
}

/// Policy attributes supplied by the proposer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyContext {
    pub insurer: String,
    pub business_type: BusinessType,
    #[serde(default)]
    pub previous_policy_type: Option<String>,
    #[serde(default)]
    pub claims: ClaimHistory,
    #[serde(default = "default_term")]
    pub od_term: u8,
    #[serde(default = "default_term")]
    pub tp_tenure: u8,
    /// Personal-accident cover code; `None` means no PA cover requested.
    #[serde(default)]
    pub pa_cover: Option<String>,
    #[serde(default)]
    pub addons: Vec<String>,
    #[serde(default)]
    pub bundles: Vec<String>,
    #[serde(default)]
    pub voluntary_deductible: Option<f64>,
    #[serde(default)]
    pub requested_idv: Option<i64>,
    #[serde(default)]
    pub dealer_code: Option<String>,
    #[serde(default)]
    pub renewal_type: Option<String>,
}

fn default_term() -> u8 {
    1
}

impl PolicyContext {
    /// Whether the expiring policy carried a no-claim bonus.
    pub fn has_prior_ncb(&self) -> bool {
        self.previous_policy_type.is_some() && self.claims.previous_ncb.unwrap_or(0.0) > 0.0
    }
}

/// Everything one premium computation is evaluated against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PremiumContext {
    pub vehicle: VehicleContext,
    pub policy: PolicyContext,
    pub as_of: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountSource {
    Catalog,
    VoluntaryDeductible,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedDiscount {
    pub source: DiscountSource,
    pub record_id: String,
    pub amount: f64,
}

/// Result of one premium computation. Built once and never modified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PremiumBreakdown {
    pub as_of: NaiveDate,
    pub vehicle_age: u32,
    pub depreciation_rate: f64,
    pub idv: IdvRange,
    pub total_idv: f64,
    pub od_rate: f64,
    pub od_premium: f64,
    pub tp_premium: f64,
    pub pa_premium: f64,
    pub addons: Vec<AddonPremium>,
    pub bundles: Vec<BundlePremium>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub failed_bundles: Vec<BundleFailure>,
    pub addon_premium: f64,
    pub discounts: Vec<AppliedDiscount>,
    pub discount_amount: f64,
    pub ncb_percentage: f64,
    pub ncb_amount: f64,
    pub net_od_premium: f64,
    pub net_premium: f64,
    pub tax: f64,
    pub gross_premium: f64,
}

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one of the independently versioned rate tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogKind {
    OdRate,
    TpRate,
    PaRate,
    Depreciation,
    Discount,
    Ncb,
    VoluntaryDeductible,
    AddonRate,
    BundlePrice,
}

impl CatalogKind {
    pub const fn ordered() -> [Self; 9] {
        [
            Self::OdRate,
            Self::TpRate,
            Self::PaRate,
            Self::Depreciation,
            Self::Discount,
            Self::Ncb,
            Self::VoluntaryDeductible,
            Self::AddonRate,
            Self::BundlePrice,
        ]
    }

    /// Catalogs whose misses abort every computation; their rate files must exist.
    pub const fn is_required(self) -> bool {
        matches!(self, Self::OdRate | Self::TpRate | Self::Depreciation)
    }

    /// Stable name, also used as the CSV file stem on import.
    pub const fn key(self) -> &'static str {
        match self {
            Self::OdRate => "od_rate",
            Self::TpRate => "tp_rate",
            Self::PaRate => "pa_rate",
            Self::Depreciation => "depreciation",
            Self::Discount => "discount",
            Self::Ncb => "ncb",
            Self::VoluntaryDeductible => "voluntary_deductible",
            Self::AddonRate => "addon_rate",
            Self::BundlePrice => "bundle_price",
        }
    }

    pub const fn schema(self) -> CatalogSchema {
        use DimensionKind::{Exact, Range};

        let dimensions: &'static [(&'static str, DimensionKind)] = match self {
            Self::OdRate => &[
                ("vehicle_type", Exact),
                ("rto_zone", Exact),
                ("od_term", Exact),
                ("vehicle_age", Range),
                ("cc", Range),
                ("kw", Range),
            ],
            Self::TpRate => &[
                ("vehicle_type", Exact),
                ("fuel_type", Exact),
                ("tp_term", Exact),
                ("cc", Range),
                ("kw", Range),
            ],
            Self::PaRate => &[
                ("vehicle_type", Exact),
                ("insurer", Exact),
                ("tp_tenure", Exact),
                ("cover_code", Exact),
            ],
            Self::Depreciation => &[("vehicle_type", Exact), ("vehicle_age", Range)],
            Self::Discount => &[
                ("vehicle_type", Exact),
                ("insurer", Exact),
                ("city", Exact),
                ("city_cluster", Exact),
                ("business_type", Exact),
                ("dealer_code", Exact),
                ("fuel_type", Exact),
                ("model", Exact),
                ("variant", Exact),
                ("renewal_type", Exact),
                ("state", Exact),
                ("rto_code", Exact),
                ("rto_cluster", Exact),
                ("vin", Exact),
                ("cc", Range),
                ("ncb", Range),
                ("vehicle_age", Range),
            ],
            Self::Ncb => &[
                ("business_type", Exact),
                ("insurer", Exact),
                ("claimed_last_year", Exact),
                ("previous_policy_type", Exact),
                ("claim_count", Range),
                ("previous_ncb", Range),
            ],
            Self::VoluntaryDeductible => &[
                ("vehicle_type", Exact),
                ("deductible_amount", Range),
            ],
            Self::AddonRate => &[
                ("addon_id", Exact),
                ("vehicle_type", Exact),
                ("variant", Exact),
                ("prior_ncb", Exact),
                ("cc", Range),
                ("kw", Range),
                ("vehicle_age", Range),
            ],
            Self::BundlePrice => &[
                ("addon_bundle_id", Exact),
                ("vehicle_type", Exact),
                ("insurer", Exact),
            ],
        };

        CatalogSchema {
            kind: self,
            dimensions,
        }
    }
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// How a dimension is compared against a query value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimensionKind {
    /// Text equality.
    Exact,
    /// Numeric band, inclusive on both ends.
    Range,
}

/// Declared dimension set of a catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogSchema {
    pub kind: CatalogKind,
    pub dimensions: &'static [(&'static str, DimensionKind)],
}

impl CatalogSchema {
    pub fn dimension(&self, name: &str) -> Option<DimensionKind> {
        self.dimensions
            .iter()
            .find(|(dimension, _)| *dimension == name)
            .map(|(_, kind)| *kind)
    }
}

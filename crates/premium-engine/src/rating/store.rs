use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use super::catalog::{
    load_bundle_addons, load_catalog, load_catalog_file, AddonRate, BundlePrice,
    CatalogImportError, CatalogKind, DeductibleSlab, DepreciationRate, DiscountValue, NcbSlab,
    OdRate, PaRate, RateCatalog, TpRate,
};

const BUNDLE_ADDONS_FILE: &str = "bundle_addons.csv";

/// Point-in-time snapshot of every rate table the engine reads.
#[derive(Debug, Clone, PartialEq)]
pub struct RateBook {
    pub od: RateCatalog<OdRate>,
    pub tp: RateCatalog<TpRate>,
    pub pa: RateCatalog<PaRate>,
    pub depreciation: RateCatalog<DepreciationRate>,
    pub discount: RateCatalog<DiscountValue>,
    pub ncb: RateCatalog<NcbSlab>,
    pub deductible: RateCatalog<DeductibleSlab>,
    pub addon: RateCatalog<AddonRate>,
    pub bundle_price: RateCatalog<BundlePrice>,
}

impl Default for RateBook {
    fn default() -> Self {
        Self {
            od: RateCatalog::new(CatalogKind::OdRate),
            tp: RateCatalog::new(CatalogKind::TpRate),
            pa: RateCatalog::new(CatalogKind::PaRate),
            depreciation: RateCatalog::new(CatalogKind::Depreciation),
            discount: RateCatalog::new(CatalogKind::Discount),
            ncb: RateCatalog::new(CatalogKind::Ncb),
            deductible: RateCatalog::new(CatalogKind::VoluntaryDeductible),
            addon: RateCatalog::new(CatalogKind::AddonRate),
            bundle_price: RateCatalog::new(CatalogKind::BundlePrice),
        }
    }
}

impl RateBook {
    /// Loads every `<catalog>.csv` found in `dir`. The directory and the OD, TP
    /// and depreciation files must exist; other catalogs may be left out.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self, CatalogImportError> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(CatalogImportError::MissingFile {
                path: dir.to_path_buf(),
            });
        }
        let book = Self {
            od: load_catalog_file(CatalogKind::OdRate, dir)?,
            tp: load_catalog_file(CatalogKind::TpRate, dir)?,
            pa: load_catalog_file(CatalogKind::PaRate, dir)?,
            depreciation: load_catalog_file(CatalogKind::Depreciation, dir)?,
            discount: load_catalog_file(CatalogKind::Discount, dir)?,
            ncb: load_catalog_file(CatalogKind::Ncb, dir)?,
            deductible: load_catalog_file(CatalogKind::VoluntaryDeductible, dir)?,
            addon: load_catalog_file(CatalogKind::AddonRate, dir)?,
            bundle_price: load_catalog_file(CatalogKind::BundlePrice, dir)?,
        };

        tracing::info!(
            path = %dir.display(),
            records = book.record_count(),
            "rate book loaded"
        );
        Ok(book)
    }

    /// Rate tables shipped with the crate under `rates/`.
    pub fn bundled() -> Result<Self, CatalogImportError> {
        Ok(Self {
            od: load_catalog(CatalogKind::OdRate, bundled_csv::OD_RATE.as_bytes())?,
            tp: load_catalog(CatalogKind::TpRate, bundled_csv::TP_RATE.as_bytes())?,
            pa: load_catalog(CatalogKind::PaRate, bundled_csv::PA_RATE.as_bytes())?,
            depreciation: load_catalog(
                CatalogKind::Depreciation,
                bundled_csv::DEPRECIATION.as_bytes(),
            )?,
            discount: load_catalog(CatalogKind::Discount, bundled_csv::DISCOUNT.as_bytes())?,
            ncb: load_catalog(CatalogKind::Ncb, bundled_csv::NCB.as_bytes())?,
            deductible: load_catalog(
                CatalogKind::VoluntaryDeductible,
                bundled_csv::VOLUNTARY_DEDUCTIBLE.as_bytes(),
            )?,
            addon: load_catalog(CatalogKind::AddonRate, bundled_csv::ADDON_RATE.as_bytes())?,
            bundle_price: load_catalog(
                CatalogKind::BundlePrice,
                bundled_csv::BUNDLE_PRICE.as_bytes(),
            )?,
        })
    }

    pub fn record_count(&self) -> usize {
        self.od.len()
            + self.tp.len()
            + self.pa.len()
            + self.depreciation.len()
            + self.discount.len()
            + self.ncb.len()
            + self.deductible.len()
            + self.addon.len()
            + self.bundle_price.len()
    }
}

/// Read-only access to rate tables so the engine can be exercised in isolation.
pub trait RateRepository: Send + Sync {
    fn snapshot(&self) -> Result<Arc<RateBook>, RateStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RateStoreError {
    #[error("rate store unavailable: {0}")]
    Unavailable(String),
}

/// Repository over an immutable, shared rate book.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRateRepository {
    book: Arc<RateBook>,
}

impl InMemoryRateRepository {
    pub fn new(book: RateBook) -> Self {
        Self {
            book: Arc::new(book),
        }
    }
}

impl RateRepository for InMemoryRateRepository {
    fn snapshot(&self) -> Result<Arc<RateBook>, RateStoreError> {
        Ok(Arc::clone(&self.book))
    }
}

/// Outbound hook to the reference-data service owning addon bundle membership.
///
/// Calls are synchronous. The HTTP compute handler runs the whole premium
/// computation on the blocking pool, so a networked client may block here but
/// must not assume it runs on an async runtime thread.
pub trait ReferenceDataClient: Send + Sync {
    fn bundle_addons(&self, addon_bundle_id: &str) -> Result<Vec<String>, ReferenceDataError>;
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReferenceDataError {
    #[error("reference data service unreachable: {0}")]
    Unreachable(String),
    #[error("malformed reference data response: {0}")]
    Malformed(String),
    #[error("addon bundle {0} is not known to reference data")]
    UnknownBundle(String),
}

/// Bundle membership held in memory, standing in for the reference-data service.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaticReferenceData {
    bundles: BTreeMap<String, Vec<String>>,
}

impl StaticReferenceData {
    pub fn new(bundles: BTreeMap<String, Vec<String>>) -> Self {
        Self { bundles }
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogImportError> {
        Ok(Self::new(load_bundle_addons(reader)?))
    }

    /// Reads `bundle_addons.csv` from `dir`; a missing file means no bundles.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self, CatalogImportError> {
        let path = dir.as_ref().join(BUNDLE_ADDONS_FILE);
        if !path.exists() {
            tracing::warn!(path = %path.display(), "bundle membership file missing");
            return Ok(Self::default());
        }
        Self::from_reader(std::fs::File::open(path)?)
    }

    pub fn bundled() -> Result<Self, CatalogImportError> {
        Self::from_reader(bundled_csv::BUNDLE_ADDONS.as_bytes())
    }

    pub fn bundle_ids(&self) -> impl Iterator<Item = &str> {
        self.bundles.keys().map(String::as_str)
    }
}

impl ReferenceDataClient for StaticReferenceData {
    fn bundle_addons(&self, addon_bundle_id: &str) -> Result<Vec<String>, ReferenceDataError> {
        self.bundles
            .get(addon_bundle_id)
            .cloned()
            .ok_or_else(|| ReferenceDataError::UnknownBundle(addon_bundle_id.to_string()))
    }
}

mod bundled_csv {
    pub(super) const OD_RATE: &str = include_str!("../../rates/od_rate.csv");
    pub(super) const TP_RATE: &str = include_str!("../../rates/tp_rate.csv");
    pub(super) const PA_RATE: &str = include_str!("../../rates/pa_rate.csv");
    pub(super) const DEPRECIATION: &str = include_str!("../../rates/depreciation.csv");
    pub(super) const DISCOUNT: &str = include_str!("../../rates/discount.csv");
    pub(super) const NCB: &str = include_str!("../../rates/ncb.csv");
    pub(super) const VOLUNTARY_DEDUCTIBLE: &str =
        include_str!("../../rates/voluntary_deductible.csv");
    pub(super) const ADDON_RATE: &str = include_str!("../../rates/addon_rate.csv");
    pub(super) const BUNDLE_PRICE: &str = include_str!("../../rates/bundle_price.csv");
    pub(super) const BUNDLE_ADDONS: &str = include_str!("../../rates/bundle_addons.csv");
}

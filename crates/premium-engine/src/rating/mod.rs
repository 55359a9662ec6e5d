//! Motor premium rating: catalog resolution, IDV banding, discount and bonus
//! resolvers, addon aggregation, tax, and the pipeline that composes them.

pub mod addons;
pub mod catalog;
pub mod domain;
pub mod error;
pub mod idv;
pub mod orchestrator;
pub mod resolvers;
pub mod router;
pub mod service;
pub mod store;
pub mod tax;

#[cfg(test)]
mod tests;

pub use addons::{
    round_currency, AddonPremium, AddonPremiumAggregator, AddonVehicle, BundleFailure,
    BundleOutcome, BundlePremium, BundlePricing,
};
pub use catalog::{CatalogError, CatalogKind, LookupQuery, RateCatalog, RateRecord, Validity};
pub use domain::{
    AppliedDiscount, BusinessType, ClaimHistory, DiscountSource, PolicyContext, PremiumBreakdown,
    PremiumContext, RegistrationArea, VehicleContext,
};
pub use error::EngineError;
pub use idv::{calculate_vehicle_idv, quote_idv, vehicle_age, IdvQuote, IdvRange};
pub use orchestrator::PremiumOrchestrator;
pub use resolvers::{DiscountContext, DiscountOffer, NcbModel};
pub use router::{premium_router, DiscountRangeRequest, IdvRangeRequest, PremiumRequest};
pub use service::PremiumService;
pub use store::{
    InMemoryRateRepository, RateBook, RateRepository, RateStoreError, ReferenceDataClient,
    ReferenceDataError, StaticReferenceData,
};
pub use tax::{calculate_tax, calculate_tax_at, STATUTORY_TAX_RATE};

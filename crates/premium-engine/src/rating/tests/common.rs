use std::collections::HashMap;
use std::sync::Arc;

use axum::body::to_bytes;
use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::config::EngineConfig;
use crate::rating::catalog::{
    AddonRate, BundlePrice, CatalogKind, DeductibleSlab, DepreciationRate, DiscountValue, NcbSlab,
    OdRate, PaRate, RateCatalog, RateRecord, TpRate, Validity,
};
use crate::rating::domain::{
    BusinessType, ClaimHistory, PolicyContext, PremiumContext, RegistrationArea, VehicleContext,
};
use crate::rating::store::{
    InMemoryRateRepository, RateBook, RateRepository, RateStoreError, ReferenceDataClient,
    ReferenceDataError,
};
use crate::rating::PremiumService;

pub(super) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub(super) fn as_of() -> NaiveDate {
    date(2024, 6, 1)
}

fn effective() -> Validity {
    Validity::open_from(date(2024, 1, 1))
}

pub(super) fn rate_book() -> RateBook {
    RateBook {
        od: RateCatalog::with_records(
            CatalogKind::OdRate,
            [RateRecord::new("od-4w-a", effective(), OdRate { rate: 3.0 })
                .exact("vehicle_type", "4W")
                .exact("rto_zone", "A")
                .exact("od_term", "1")
                .band("vehicle_age", Some(0.0), Some(5.0))
                .band("cc", Some(1000.0), Some(1500.0))],
        )
        .expect("od catalog"),
        tp: RateCatalog::with_records(
            CatalogKind::TpRate,
            [RateRecord::new("tp-4w-petrol", effective(), TpRate { premium: 3416.0 })
                .exact("vehicle_type", "4W")
                .exact("fuel_type", "petrol")
                .exact("tp_term", "1")
                .band("cc", Some(1000.0), Some(1500.0))],
        )
        .expect("tp catalog"),
        pa: RateCatalog::with_records(
            CatalogKind::PaRate,
            [RateRecord::new("pa-acme", effective(), PaRate { premium: 375.0 })
                .exact("vehicle_type", "4W")
                .exact("insurer", "ACME")
                .exact("tp_tenure", "1")
                .exact("cover_code", "CPA")],
        )
        .expect("pa catalog"),
        depreciation: RateCatalog::with_records(
            CatalogKind::Depreciation,
            [
                RateRecord::new("dep-new", effective(), DepreciationRate { rate: 5.0 })
                    .exact("vehicle_type", "4W")
                    .band("vehicle_age", Some(0.0), Some(0.0)),
                RateRecord::new("dep-1-2", effective(), DepreciationRate { rate: 20.0 })
                    .exact("vehicle_type", "4W")
                    .band("vehicle_age", Some(1.0), Some(2.0)),
                RateRecord::new("dep-3", effective(), DepreciationRate { rate: 40.0 })
                    .exact("vehicle_type", "4W")
                    .band("vehicle_age", Some(3.0), Some(3.0)),
            ],
        )
        .expect("depreciation catalog"),
        discount: RateCatalog::with_records(
            CatalogKind::Discount,
            [RateRecord::new("acme-10", effective(), DiscountValue::Percentage(10.0))
                .exact("insurer", "ACME")],
        )
        .expect("discount catalog"),
        ncb: RateCatalog::with_records(
            CatalogKind::Ncb,
            [
                RateRecord::new(
                    "ncb-from-0",
                    effective(),
                    NcbSlab {
                        percentage: 20.0,
                        new_slab: None,
                    },
                )
                .exact("business_type", "renewal")
                .exact("claimed_last_year", "false")
                .band("previous_ncb", Some(0.0), Some(0.0)),
                RateRecord::new(
                    "ncb-from-20",
                    effective(),
                    NcbSlab {
                        percentage: 25.0,
                        new_slab: Some(30.0),
                    },
                )
                .exact("business_type", "renewal")
                .exact("claimed_last_year", "false")
                .band("previous_ncb", Some(20.0), Some(20.0)),
            ],
        )
        .expect("ncb catalog"),
        deductible: RateCatalog::with_records(
            CatalogKind::VoluntaryDeductible,
            [RateRecord::new(
                "vd-2500",
                effective(),
                DeductibleSlab {
                    discount_percentage: 20.0,
                    max_discount: 750.0,
                    deductible: 2500.0,
                },
            )
            .exact("vehicle_type", "4W")
            .band("deductible_amount", Some(2500.0), Some(2500.0))],
        )
        .expect("deductible catalog"),
        addon: RateCatalog::with_records(
            CatalogKind::AddonRate,
            [
                RateRecord::new("zero-dep", effective(), AddonRate { rate: 0.004 })
                    .exact("addon_id", "zero_dep")
                    .exact("vehicle_type", "4W")
                    .band("vehicle_age", Some(0.0), Some(5.0)),
                RateRecord::new("rsa", effective(), AddonRate { rate: 0.0005 })
                    .exact("addon_id", "rsa")
                    .exact("vehicle_type", "4W"),
            ],
        )
        .expect("addon catalog"),
        bundle_price: RateCatalog::with_records(
            CatalogKind::BundlePrice,
            [RateRecord::new(
                "premium-fixed",
                effective(),
                BundlePrice {
                    fixed_premium: 2499.0,
                },
            )
            .exact("addon_bundle_id", "premium")
            .exact("insurer", "ACME")],
        )
        .expect("bundle price catalog"),
    }
}

pub(super) fn vehicle() -> VehicleContext {
    VehicleContext {
        vehicle_type: "4W".to_string(),
        fuel_type: "petrol".to_string(),
        cubic_capacity: Some(1197.0),
        kilowatt: None,
        model: Some("Hatch".to_string()),
        variant: Some("VX".to_string()),
        vin: None,
        registration: RegistrationArea {
            rto_zone: Some("A".to_string()),
            rto_code: Some("MH01".to_string()),
            city: Some("Mumbai".to_string()),
            state: Some("MH".to_string()),
            ..RegistrationArea::default()
        },
        invoice_date: date(2021, 3, 1),
        ex_showroom_price: 500_000.0,
        electrical_accessories: 10_000.0,
        non_electrical_accessories: 0.0,
    }
}

pub(super) fn policy() -> PolicyContext {
    PolicyContext {
        insurer: "ACME".to_string(),
        business_type: BusinessType::Renewal,
        previous_policy_type: Some("comprehensive".to_string()),
        claims: ClaimHistory {
            claim_count: 0,
            claimed_last_year: false,
            previous_ncb: Some(20.0),
        },
        od_term: 1,
        tp_tenure: 1,
        pa_cover: Some("CPA".to_string()),
        addons: vec!["rsa".to_string()],
        bundles: vec!["protect".to_string()],
        voluntary_deductible: Some(2500.0),
        requested_idv: None,
        dealer_code: None,
        renewal_type: None,
    }
}

pub(super) fn context() -> PremiumContext {
    PremiumContext {
        vehicle: vehicle(),
        policy: policy(),
        as_of: as_of(),
    }
}

#[derive(Default)]
pub(super) struct MemoryReferenceData {
    bundles: HashMap<String, Vec<String>>,
}

impl MemoryReferenceData {
    pub(super) fn standard() -> Self {
        let mut bundles = HashMap::new();
        bundles.insert(
            "protect".to_string(),
            vec!["zero_dep".to_string(), "rsa".to_string()],
        );
        bundles.insert(
            "premium".to_string(),
            vec!["zero_dep".to_string(), "rsa".to_string()],
        );
        Self { bundles }
    }
}

impl ReferenceDataClient for MemoryReferenceData {
    fn bundle_addons(&self, addon_bundle_id: &str) -> Result<Vec<String>, ReferenceDataError> {
        self.bundles
            .get(addon_bundle_id)
            .cloned()
            .ok_or_else(|| ReferenceDataError::UnknownBundle(addon_bundle_id.to_string()))
    }
}

pub(super) struct UnreachableReferenceData;

impl ReferenceDataClient for UnreachableReferenceData {
    fn bundle_addons(&self, _addon_bundle_id: &str) -> Result<Vec<String>, ReferenceDataError> {
        Err(ReferenceDataError::Unreachable("connection refused".to_string()))
    }
}

pub(super) struct UnavailableRates;

impl RateRepository for UnavailableRates {
    fn snapshot(&self) -> Result<Arc<RateBook>, RateStoreError> {
        Err(RateStoreError::Unavailable("replica lagging".to_string()))
    }
}

pub(super) fn build_service(
    config: EngineConfig,
) -> Arc<PremiumService<InMemoryRateRepository, MemoryReferenceData>> {
    Arc::new(PremiumService::new(
        Arc::new(InMemoryRateRepository::new(rate_book())),
        Arc::new(MemoryReferenceData::standard()),
        config,
    ))
}

pub(super) async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    serde_json::from_slice(&bytes).expect("body is json")
}

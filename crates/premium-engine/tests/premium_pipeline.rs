//! End-to-end premium computation over the rate tables shipped in `rates/`.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use premium_engine::config::EngineConfig;
use premium_engine::rating::{
    BundlePricing, BusinessType, CatalogError, ClaimHistory, EngineError, InMemoryRateRepository,
    PolicyContext, PremiumContext, PremiumService, RateBook, RegistrationArea,
    StaticReferenceData, VehicleContext,
};

fn rates_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("rates")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn service() -> PremiumService<InMemoryRateRepository, StaticReferenceData> {
    let book = RateBook::from_dir(rates_dir()).expect("rate files load");
    let reference = StaticReferenceData::from_dir(rates_dir()).expect("bundle file loads");
    PremiumService::new(
        Arc::new(InMemoryRateRepository::new(book)),
        Arc::new(reference),
        EngineConfig::default(),
    )
}

fn hatchback() -> PremiumContext {
    PremiumContext {
        vehicle: VehicleContext {
            vehicle_type: "4W".to_string(),
            fuel_type: "petrol".to_string(),
            cubic_capacity: Some(1197.0),
            kilowatt: None,
            model: Some("Hatch".to_string()),
            variant: Some("VX".to_string()),
            vin: None,
            registration: RegistrationArea {
                rto_zone: Some("A".to_string()),
                ..RegistrationArea::default()
            },
            invoice_date: date(2021, 3, 1),
            ex_showroom_price: 500_000.0,
            electrical_accessories: 10_000.0,
            non_electrical_accessories: 0.0,
        },
        policy: PolicyContext {
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
        },
        as_of: date(2024, 6, 1),
    }
}

#[test]
fn renewal_hatchback_breakdown() {
    let breakdown = service()
        .compute_premium(&hatchback())
        .expect("premium computes");

    assert_eq!(breakdown.idv.mean_idv, 300_000);
    assert_eq!(breakdown.total_idv, 310_000.0);
    assert_eq!(breakdown.od_premium, 9300.0);
    assert_eq!(breakdown.discount_amount, 930.0 + 750.0);
    assert_eq!(breakdown.ncb_amount, 1905.0);
    assert_eq!(breakdown.addon_premium, 155.0 + 1395.0);
    assert_eq!(breakdown.net_premium, 11_056.0);
    assert_eq!(breakdown.gross_premium, 11_056.0 + 11_056.0 * 0.18);
}

#[test]
fn fixed_price_bundle_ignores_member_rates() {
    let mut context = hatchback();
    context.policy.bundles = vec!["premium".to_string(), "unknown".to_string()];

    let breakdown = service()
        .compute_premium(&context)
        .expect("premium computes");

    assert_eq!(breakdown.bundles.len(), 1);
    assert_eq!(breakdown.bundles[0].pricing, BundlePricing::Fixed);
    assert_eq!(breakdown.bundles[0].premium, 2499.0);
    assert_eq!(breakdown.failed_bundles.len(), 1);
    assert_eq!(breakdown.failed_bundles[0].addon_bundle_id, "unknown");
}

#[test]
fn two_wheeler_uses_its_own_tables() {
    let mut context = hatchback();
    context.vehicle.vehicle_type = "2W".to_string();
    context.vehicle.cubic_capacity = Some(125.0);
    context.vehicle.ex_showroom_price = 90_000.0;
    context.vehicle.electrical_accessories = 0.0;
    context.vehicle.invoice_date = date(2023, 5, 1);
    context.policy.voluntary_deductible = None;
    context.policy.addons = vec!["zero_dep".to_string()];
    context.policy.bundles.clear();

    let breakdown = service()
        .compute_premium(&context)
        .expect("premium computes");

    assert_eq!(breakdown.vehicle_age, 1);
    assert_eq!(breakdown.idv.mean_idv, 76_500);
    assert_eq!(breakdown.od_rate, 1.676);
    assert_eq!(breakdown.tp_premium, 714.0);
    assert_eq!(breakdown.pa_premium, 330.0);
    assert_eq!(breakdown.discounts.len(), 1);
    assert_eq!(breakdown.discounts[0].record_id, "disc-acme-2w");
    assert_eq!(breakdown.addons[0].premium, 191.25);
}

#[test]
fn unknown_zone_is_not_found() {
    let mut context = hatchback();
    context.vehicle.registration.rto_zone = Some("Q".to_string());

    match service().compute_premium(&context) {
        Err(EngineError::Catalog(CatalogError::NotFound { filters, as_of, .. })) => {
            assert!(filters.contains("rto_zone=Q"), "{filters}");
            assert_eq!(as_of, date(2024, 6, 1));
        }
        other => panic!("expected od miss, got {other:?}"),
    }
}

#[test]
fn bundled_book_matches_files_on_disk() {
    let from_disk = RateBook::from_dir(rates_dir()).expect("rate files load");
    let bundled = RateBook::bundled().expect("bundled rates load");
    assert_eq!(from_disk, bundled);
}

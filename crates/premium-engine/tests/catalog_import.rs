use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use premium_engine::rating::catalog::{
    load_catalog, CatalogImportError, CatalogKind, DepreciationRate, LookupQuery, NcbSlab,
};
use premium_engine::rating::{RateBook, ReferenceDataClient, StaticReferenceData};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("premium-engine-{name}-{}", std::process::id()));
    fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}

#[test]
fn shipped_rate_directory_loads_every_catalog() {
    let dir = shipped_rates();
    let book = RateBook::from_dir(&dir).expect("rate files load");

    assert_eq!(book.od.len(), 7);
    assert_eq!(book.tp.len(), 6);
    assert_eq!(book.depreciation.len(), 6);
    assert_eq!(book.ncb.len(), 6);
    assert_eq!(book.bundle_price.len(), 1);

    let reference = StaticReferenceData::from_dir(&dir).expect("bundle file loads");
    assert_eq!(
        reference.bundle_addons("premium").expect("known bundle").len(),
        3
    );
}

fn shipped_rates() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("rates")
}

fn copy_required_catalogs(dir: &Path) {
    for file in ["od_rate.csv", "tp_rate.csv", "depreciation.csv"] {
        fs::copy(shipped_rates().join(file), dir.join(file)).expect("copy rate file");
    }
}

#[test]
fn optional_catalogs_may_be_left_out() {
    let dir = scratch_dir("partial");
    copy_required_catalogs(&dir);

    let book = RateBook::from_dir(&dir).expect("required files are enough");
    assert_eq!(book.depreciation.len(), 6);
    assert!(book.discount.is_empty());
    assert!(book.addon.is_empty());

    let reference = StaticReferenceData::from_dir(&dir).expect("missing membership tolerated");
    assert_eq!(reference.bundle_ids().count(), 0);

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn missing_required_catalog_fails_the_load() {
    let dir = scratch_dir("no-tp");
    copy_required_catalogs(&dir);
    fs::remove_file(dir.join("tp_rate.csv")).expect("drop tp file");

    match RateBook::from_dir(&dir) {
        Err(CatalogImportError::MissingFile { path }) => {
            assert_eq!(path, dir.join("tp_rate.csv"));
        }
        other => panic!("expected missing tp rates, got {other:?}"),
    }

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn misspelt_header_fails_the_load() {
    let dir = scratch_dir("typo");
    copy_required_catalogs(&dir);
    fs::write(
        dir.join("discount.csv"),
        "id,valid_from,insurer,min_CC,percentage\ndisc,2024-01-01,ACME,1500,10\n",
    )
    .expect("write discount file");

    match RateBook::from_dir(&dir) {
        Err(CatalogImportError::UnknownColumn { catalog, column }) => {
            assert_eq!(catalog, "discount");
            assert_eq!(column, "min_CC");
        }
        other => panic!("expected unknown column, got {other:?}"),
    }

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn malformed_row_names_catalog_and_line() {
    let dir = scratch_dir("malformed");
    copy_required_catalogs(&dir);
    fs::write(
        dir.join("ncb.csv"),
        "id,valid_from,business_type,min_previous_ncb,max_previous_ncb,percentage\n\
ncb-0,2024-01-01,renewal,0,0,20\n\
ncb-20,2024-13-01,renewal,20,20,25\n",
    )
    .expect("write ncb file");

    match RateBook::from_dir(&dir) {
        Err(CatalogImportError::Row {
            catalog,
            line,
            reason,
        }) => {
            assert_eq!(catalog, "ncb");
            assert_eq!(line, 3);
            assert!(reason.contains("valid_from"), "{reason}");
        }
        other => panic!("expected row error, got {other:?}"),
    }

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn validity_windows_are_half_open() {
    let csv = "id,valid_from,valid_till,min_vehicle_age,max_vehicle_age,rate\n\
dep-old,2024-01-01,2024-01-31,0,0,5\n\
dep-new,2024-01-31,,0,0,7.5\n";
    let catalog = load_catalog::<DepreciationRate, _>(CatalogKind::Depreciation, csv.as_bytes())
        .expect("catalog loads");

    let resolve = |day: u32| {
        let as_of = NaiveDate::from_ymd_opt(2024, 1, day).expect("valid date");
        catalog
            .resolve(&LookupQuery::new(as_of).number("vehicle_age", 0.0))
            .map(|record| record.id.clone())
    };

    assert_eq!(resolve(1).expect("first day"), "dep-old");
    assert_eq!(resolve(30).expect("last day"), "dep-old");
    assert_eq!(resolve(31).expect("handover"), "dep-new");
}

#[test]
fn exact_dimension_rejects_numeric_filter() {
    let csv = "id,valid_from,business_type,percentage\nncb,2024-01-01,renewal,20\n";
    let catalog =
        load_catalog::<NcbSlab, _>(CatalogKind::Ncb, csv.as_bytes()).expect("catalog loads");
    let as_of = NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date");

    let err = catalog
        .resolve(&LookupQuery::new(as_of).number("business_type", 1.0))
        .expect_err("type mismatch");
    assert_eq!(
        err.to_string(),
        "ncb dimension 'business_type' rejected: expects a text value"
    );
}

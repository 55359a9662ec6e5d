use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use premium_engine::config::AppConfig;
use premium_engine::rating::catalog::CatalogImportError;
use premium_engine::rating::{
    BusinessType, InMemoryRateRepository, PremiumService, RateBook, StaticReferenceData,
};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type EngineService = PremiumService<InMemoryRateRepository, StaticReferenceData>;

/// Builds the engine over `PREMIUM_RATE_DIR`, or the bundled tables when unset.
pub(crate) fn build_service(config: &AppConfig) -> Result<EngineService, CatalogImportError> {
    let (book, reference) = match &config.rate_dir {
        Some(dir) => (RateBook::from_dir(dir)?, StaticReferenceData::from_dir(dir)?),
        None => (RateBook::bundled()?, StaticReferenceData::bundled()?),
    };

    let source = config
        .rate_dir
        .as_deref()
        .map(|dir| dir.display().to_string())
        .unwrap_or_else(|| "bundled".to_string());
    info!(
        %source,
        records = book.record_count(),
        bundles = reference.bundle_ids().count(),
        "rate book ready"
    );

    Ok(PremiumService::new(
        Arc::new(InMemoryRateRepository::new(book)),
        Arc::new(reference),
        config.engine,
    ))
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_business_type(raw: &str) -> Result<BusinessType, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "new" => Ok(BusinessType::New),
        "renewal" => Ok(BusinessType::Renewal),
        "rollover" => Ok(BusinessType::Rollover),
        other => Err(format!(
            "unknown business type '{other}' (expected new, renewal or rollover)"
        )),
    }
}

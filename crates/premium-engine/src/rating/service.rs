use std::sync::Arc;

use chrono::NaiveDate;

use super::domain::{PremiumBreakdown, PremiumContext};
use super::error::EngineError;
use super::idv::{quote_idv, IdvQuote};
use super::orchestrator::PremiumOrchestrator;
use super::resolvers::{discount_range, DiscountContext, DiscountOffer};
use super::store::{RateRepository, ReferenceDataClient};
use crate::config::EngineConfig;

/// Entry point used by transports: takes a fresh rate snapshot per call.
pub struct PremiumService<S, C> {
    rates: Arc<S>,
    reference: Arc<C>,
    config: EngineConfig,
}

impl<S, C> PremiumService<S, C>
where
    S: RateRepository + 'static,
    C: ReferenceDataClient + 'static,
{
    pub fn new(rates: Arc<S>, reference: Arc<C>, config: EngineConfig) -> Self {
        Self {
            rates,
            reference,
            config,
        }
    }

    pub fn config(&self) -> EngineConfig {
        self.config
    }

    /// Full pipeline for one vehicle and policy.
    pub fn compute_premium(
        &self,
        context: &PremiumContext,
    ) -> Result<PremiumBreakdown, EngineError> {
        let book = self.rates.snapshot()?;
        PremiumOrchestrator::new(&book, self.reference.as_ref(), self.config).compute(context)
    }

    /// IDV band for a vehicle bought on `invoice_date`.
    pub fn idv_range(
        &self,
        invoice_date: NaiveDate,
        ex_showroom_price: f64,
        vehicle_type: Option<&str>,
        as_of: NaiveDate,
    ) -> Result<IdvQuote, EngineError> {
        let book = self.rates.snapshot()?;
        quote_idv(
            &book.depreciation,
            vehicle_type,
            invoice_date,
            ex_showroom_price,
            as_of,
        )
    }

    /// Every discount active for the context, most specific first.
    pub fn discount_range(
        &self,
        context: &DiscountContext,
        as_of: NaiveDate,
    ) -> Result<Vec<DiscountOffer>, EngineError> {
        let book = self.rates.snapshot()?;
        Ok(discount_range(&book.discount, context, as_of)?)
    }
}

//! Fixed premium pipeline over one rate snapshot.

use tracing::{debug, info};

use super::addons::{round_currency, AddonPremiumAggregator, AddonVehicle, BundleOutcome};
use super::catalog::LookupQuery;
use super::domain::{AppliedDiscount, DiscountSource, PremiumBreakdown, PremiumContext};
use super::error::EngineError;
use super::idv::{quote_idv, IdvQuote};
use super::resolvers::{
    resolve_deductible, resolve_discount, resolve_ncb, DiscountContext, NcbContext,
};
use super::store::{RateBook, ReferenceDataClient};
use super::tax::calculate_tax_at;
use crate::config::EngineConfig;

/// Sequences every resolution step for a single request.
///
/// OD, TP, PA and depreciation misses abort the computation. Discount, NCB and
/// deductible misses contribute nothing. Ambiguous matches are always fatal.
pub struct PremiumOrchestrator<'a, C: ?Sized> {
    book: &'a RateBook,
    reference: &'a C,
    config: EngineConfig,
}

impl<'a, C> PremiumOrchestrator<'a, C>
where
    C: ReferenceDataClient + ?Sized,
{
    pub fn new(book: &'a RateBook, reference: &'a C, config: EngineConfig) -> Self {
        Self {
            book,
            reference,
            config,
        }
    }

    pub fn compute(&self, context: &PremiumContext) -> Result<PremiumBreakdown, EngineError> {
        let vehicle = &context.vehicle;
        let policy = &context.policy;
        let as_of = context.as_of;
        validate_amounts(context)?;

        let quote = quote_idv(
            &self.book.depreciation,
            Some(vehicle.vehicle_type.as_str()),
            vehicle.invoice_date,
            vehicle.ex_showroom_price,
            as_of,
        )?;
        let age = quote.vehicle_age;

        let od_query = LookupQuery::new(as_of)
            .exact("vehicle_type", &vehicle.vehicle_type)
            .exact_opt("rto_zone", vehicle.registration.rto_zone.as_deref())
            .exact("od_term", policy.od_term.to_string())
            .number("vehicle_age", f64::from(age))
            .number_opt("cc", vehicle.cubic_capacity)
            .number_opt("kw", vehicle.kilowatt);
        let od = self.book.od.resolve(&od_query)?;

        let tp_query = LookupQuery::new(as_of)
            .exact("vehicle_type", &vehicle.vehicle_type)
            .exact("fuel_type", &vehicle.fuel_type)
            .exact("tp_term", policy.tp_tenure.to_string())
            .number_opt("cc", vehicle.cubic_capacity)
            .number_opt("kw", vehicle.kilowatt);
        let tp = self.book.tp.resolve(&tp_query)?;

        let pa_premium = match policy.pa_cover.as_deref() {
            Some(cover_code) => {
                let pa_query = LookupQuery::new(as_of)
                    .exact("vehicle_type", &vehicle.vehicle_type)
                    .exact("insurer", &policy.insurer)
                    .exact("tp_tenure", policy.tp_tenure.to_string())
                    .exact("cover_code", cover_code);
                self.book.pa.resolve(&pa_query)?.payload.premium
            }
            None => 0.0,
        };

        let total_idv = select_total_idv(&quote, context)?;
        let od_premium = round_currency(total_idv * od.payload.rate / 100.0);

        let mut discounts = Vec::new();
        let mut remaining = od_premium;

        let discount_context = DiscountContext::from_request(vehicle, policy, age);
        if let Some(offer) = resolve_discount(&self.book.discount, &discount_context, as_of)? {
            let amount = round_currency(offer.value.amount_on(remaining));
            remaining -= amount;
            discounts.push(AppliedDiscount {
                source: DiscountSource::Catalog,
                record_id: offer.record_id,
                amount,
            });
        }

        if let Some(slab) = resolve_deductible(
            &self.book.deductible,
            &vehicle.vehicle_type,
            policy.voluntary_deductible,
            as_of,
        )? {
            let amount = round_currency(slab.discount_on(remaining));
            remaining -= amount;
            discounts.push(AppliedDiscount {
                source: DiscountSource::VoluntaryDeductible,
                record_id: slab.record_id,
                amount,
            });
        }

        let ncb = resolve_ncb(
            &self.book.ncb,
            &NcbContext::from_policy(policy),
            as_of,
            self.config.ncb_slab,
        )?;
        let ncb_percentage = ncb.as_ref().map_or(0.0, |ncb| ncb.percentage);
        let ncb_amount = round_currency(remaining * ncb_percentage / 100.0);
        let net_od_premium = round_currency(remaining - ncb_amount);
        let discount_amount = round_currency(discounts.iter().map(|d| d.amount).sum());

        let aggregator =
            AddonPremiumAggregator::new(&self.book.addon, &self.book.bundle_price, self.reference);
        let addon_vehicle = AddonVehicle::from_request(vehicle, policy, age, as_of);
        let addons = if policy.addons.is_empty() {
            Vec::new()
        } else {
            aggregator.calculate_addon_premium(&addon_vehicle, total_idv, Some(policy.addons.as_slice()))?
        };

        let mut bundles = Vec::new();
        let mut failed_bundles = Vec::new();
        for outcome in aggregator.calculate_addon_bundle_premium(&addon_vehicle, total_idv)? {
            match outcome {
                BundleOutcome::Priced(bundle) => bundles.push(bundle),
                BundleOutcome::Failed(failure) => failed_bundles.push(failure),
            }
        }
        let addon_premium = round_currency(
            addons.iter().map(|addon| addon.premium).sum::<f64>()
                + bundles.iter().map(|bundle| bundle.premium).sum::<f64>(),
        );

        let tp_premium = tp.payload.premium;
        let net_premium = round_currency(net_od_premium + tp_premium + pa_premium + addon_premium);
        let tax = calculate_tax_at(net_premium, self.config.tax_rate);
        let gross_premium = net_premium + tax;

        debug!(
            od_record = %od.id,
            tp_record = %tp.id,
            ncb_record = ncb.as_ref().map(|ncb| ncb.record_id.as_str()).unwrap_or("-"),
            "premium inputs resolved"
        );
        info!(
            vehicle_type = %vehicle.vehicle_type,
            insurer = %policy.insurer,
            %as_of,
            total_idv,
            net_premium,
            gross_premium,
            failed_bundles = failed_bundles.len(),
            "premium computed"
        );

        Ok(PremiumBreakdown {
            as_of,
            vehicle_age: age,
            depreciation_rate: quote.depreciation_rate,
            idv: quote.range,
            total_idv,
            od_rate: od.payload.rate,
            od_premium,
            tp_premium,
            pa_premium,
            addons,
            bundles,
            failed_bundles,
            addon_premium,
            discounts,
            discount_amount,
            ncb_percentage,
            ncb_amount,
            net_od_premium,
            net_premium,
            tax,
            gross_premium,
        })
    }
}

fn validate_amounts(context: &PremiumContext) -> Result<(), EngineError> {
    let vehicle = &context.vehicle;
    let amounts = [
        ("electrical accessories", vehicle.electrical_accessories),
        ("non-electrical accessories", vehicle.non_electrical_accessories),
    ];
    for (label, amount) in amounts {
        if !amount.is_finite() || amount < 0.0 {
            return Err(EngineError::InvalidInput(format!(
                "{label} value {amount} must be a non-negative amount"
            )));
        }
    }
    if let Some(deductible) = context.policy.voluntary_deductible {
        if !deductible.is_finite() || deductible < 0.0 {
            return Err(EngineError::InvalidInput(format!(
                "voluntary deductible {deductible} must be a non-negative amount"
            )));
        }
    }
    Ok(())
}

/// Requested IDV when it lies inside the band, else the mean; plus accessories.
fn select_total_idv(quote: &IdvQuote, context: &PremiumContext) -> Result<f64, EngineError> {
    let selected = match context.policy.requested_idv {
        Some(requested) if quote.range.contains(requested) => requested,
        Some(requested) => {
            return Err(EngineError::InvalidInput(format!(
                "requested IDV {requested} is outside {}..={}",
                quote.range.min_idv, quote.range.max_idv
            )))
        }
        None => quote.range.mean_idv,
    };

    let vehicle = &context.vehicle;
    Ok(selected as f64 + vehicle.electrical_accessories + vehicle.non_electrical_accessories)
}

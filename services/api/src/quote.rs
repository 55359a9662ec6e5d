use crate::infra::{build_service, parse_business_type, parse_date};
use chrono::{Local, NaiveDate};
use clap::Args;
use premium_engine::config::AppConfig;
use premium_engine::error::AppError;
use premium_engine::rating::{
    BusinessType, ClaimHistory, DiscountSource, IdvQuote, PolicyContext, PremiumBreakdown,
    PremiumContext, RegistrationArea, VehicleContext,
};

#[derive(Args, Debug)]
pub(crate) struct QuoteArgs {
    /// Vehicle type code, e.g. 2W or 4W
    #[arg(long)]
    pub(crate) vehicle_type: String,
    /// Fuel type, e.g. petrol or diesel
    #[arg(long)]
    pub(crate) fuel_type: String,
    /// Engine displacement in cc
    #[arg(long)]
    pub(crate) cc: Option<f64>,
    /// Motor power in kW
    #[arg(long)]
    pub(crate) kw: Option<f64>,
    /// Invoice date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub(crate) invoice_date: NaiveDate,
    /// Ex-showroom price of the vehicle
    #[arg(long)]
    pub(crate) ex_showroom_price: f64,
    /// Insurer code
    #[arg(long, default_value = "ACME")]
    pub(crate) insurer: String,
    /// Registration RTO zone
    #[arg(long)]
    pub(crate) rto_zone: Option<String>,
    /// new, renewal or rollover
    #[arg(long, default_value = "new", value_parser = parse_business_type)]
    pub(crate) business_type: BusinessType,
    /// Cover type of the expiring policy, e.g. comprehensive
    #[arg(long)]
    pub(crate) previous_policy_type: Option<String>,
    /// NCB percentage earned on the expiring policy
    #[arg(long)]
    pub(crate) previous_ncb: Option<f64>,
    /// Claims made on the expiring policy
    #[arg(long, default_value_t = 0)]
    pub(crate) claim_count: u32,
    /// The expiring policy carried a claim
    #[arg(long)]
    pub(crate) claimed_last_year: bool,
    /// Personal-accident cover code
    #[arg(long)]
    pub(crate) pa_cover: Option<String>,
    /// Voluntary deductible amount
    #[arg(long)]
    pub(crate) voluntary_deductible: Option<f64>,
    /// Requested IDV inside the computed band
    #[arg(long)]
    pub(crate) requested_idv: Option<i64>,
    /// Addon identifier (repeatable)
    #[arg(long)]
    pub(crate) addon: Vec<String>,
    /// Addon bundle identifier (repeatable)
    #[arg(long)]
    pub(crate) bundle: Vec<String>,
    /// Rate date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
    /// Print the breakdown as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

impl QuoteArgs {
    fn into_context(self, today: NaiveDate) -> (PremiumContext, bool) {
        let context = PremiumContext {
            vehicle: VehicleContext {
                vehicle_type: self.vehicle_type,
                fuel_type: self.fuel_type,
                cubic_capacity: self.cc,
                kilowatt: self.kw,
                model: None,
                variant: None,
                vin: None,
                registration: RegistrationArea {
                    rto_zone: self.rto_zone,
                    ..RegistrationArea::default()
                },
                invoice_date: self.invoice_date,
                ex_showroom_price: self.ex_showroom_price,
                electrical_accessories: 0.0,
                non_electrical_accessories: 0.0,
            },
            policy: PolicyContext {
                insurer: self.insurer,
                business_type: self.business_type,
                previous_policy_type: self.previous_policy_type,
                claims: ClaimHistory {
                    claim_count: self.claim_count,
                    claimed_last_year: self.claimed_last_year,
                    previous_ncb: self.previous_ncb,
                },
                od_term: 1,
                tp_tenure: 1,
                pa_cover: self.pa_cover,
                addons: self.addon,
                bundles: self.bundle,
                voluntary_deductible: self.voluntary_deductible,
                requested_idv: self.requested_idv,
                dealer_code: None,
                renewal_type: None,
            },
            as_of: self.as_of.unwrap_or(today),
        };
        (context, self.json)
    }
}

#[derive(Args, Debug)]
pub(crate) struct IdvArgs {
    /// Invoice date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub(crate) invoice_date: NaiveDate,
    /// Ex-showroom price of the vehicle
    #[arg(long)]
    pub(crate) ex_showroom_price: f64,
    /// Vehicle type code
    #[arg(long)]
    pub(crate) vehicle_type: Option<String>,
    /// Rate date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
}

pub(crate) fn run_quote(args: QuoteArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = build_service(&config)?;
    let (context, as_json) = args.into_context(Local::now().date_naive());

    let breakdown = service.compute_premium(&context)?;
    if as_json {
        println!("{}", to_json(&breakdown)?);
    } else {
        render_breakdown(&context, &breakdown);
    }
    Ok(())
}

pub(crate) fn run_idv(args: IdvArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = build_service(&config)?;
    let as_of = args.as_of.unwrap_or_else(|| Local::now().date_naive());

    let quote = service.idv_range(
        args.invoice_date,
        args.ex_showroom_price,
        args.vehicle_type.as_deref(),
        as_of,
    )?;
    render_idv(&quote, as_of);
    Ok(())
}

fn to_json(breakdown: &PremiumBreakdown) -> Result<String, AppError> {
    serde_json::to_string_pretty(breakdown)
        .map_err(|err| AppError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, err)))
}

fn render_idv(quote: &IdvQuote, as_of: NaiveDate) {
    println!("IDV band as of {}", as_of);
    println!(
        "- Vehicle age {} years | depreciation {:.2}%",
        quote.vehicle_age, quote.depreciation_rate
    );
    println!(
        "- Mean {} | Min {} | Max {}",
        quote.range.mean_idv, quote.range.min_idv, quote.range.max_idv
    );
}

fn render_breakdown(context: &PremiumContext, breakdown: &PremiumBreakdown) {
    println!(
        "Premium quote for {} {} ({}) as of {}",
        context.vehicle.vehicle_type,
        context.vehicle.fuel_type,
        context.policy.insurer,
        breakdown.as_of
    );
    render_idv(
        &IdvQuote {
            vehicle_age: breakdown.vehicle_age,
            depreciation_rate: breakdown.depreciation_rate,
            range: breakdown.idv,
        },
        breakdown.as_of,
    );
    println!("- Total IDV {:.2}", breakdown.total_idv);

    println!("\nOwn damage");
    println!(
        "- OD premium {:.2} at {:.3}% of IDV",
        breakdown.od_premium, breakdown.od_rate
    );
    for discount in &breakdown.discounts {
        let label = match discount.source {
            DiscountSource::Catalog => "Discount",
            DiscountSource::VoluntaryDeductible => "Voluntary deductible",
        };
        println!(
            "  - {} ({}) -{:.2}",
            label, discount.record_id, discount.amount
        );
    }
    if breakdown.ncb_amount > 0.0 {
        println!(
            "  - NCB {:.0}% -{:.2}",
            breakdown.ncb_percentage, breakdown.ncb_amount
        );
    }
    println!("- Net OD premium {:.2}", breakdown.net_od_premium);

    println!("\nLiability and covers");
    println!("- TP premium {:.2}", breakdown.tp_premium);
    if breakdown.pa_premium > 0.0 {
        println!("- PA premium {:.2}", breakdown.pa_premium);
    }
    for addon in &breakdown.addons {
        println!("- Addon {} {:.2}", addon.addon_id, addon.premium);
    }
    for bundle in &breakdown.bundles {
        println!(
            "- Bundle {} {:.2} ({:?})",
            bundle.addon_bundle_id, bundle.premium, bundle.pricing
        );
    }
    for failure in &breakdown.failed_bundles {
        println!(
            "- Bundle {} unavailable: {}",
            failure.addon_bundle_id, failure.reason
        );
    }

    println!("\nTotals");
    println!("- Net premium {:.2}", breakdown.net_premium);
    println!("- Tax {:.2}", breakdown.tax);
    println!("- Gross premium {:.2}", breakdown.gross_premium);
}

use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use super::domain::{PolicyContext, PremiumBreakdown, PremiumContext, VehicleContext};
use super::idv::IdvQuote;
use super::resolvers::{DiscountContext, DiscountOffer};
use super::service::PremiumService;
use super::store::{RateRepository, ReferenceDataClient};
use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PremiumRequest {
    pub vehicle: VehicleContext,
    pub policy: PolicyContext,
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
}

impl PremiumRequest {
    pub fn into_context(self, today: NaiveDate) -> PremiumContext {
        PremiumContext {
            vehicle: self.vehicle,
            policy: self.policy,
            as_of: self.as_of.unwrap_or(today),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdvRangeRequest {
    pub invoice_date: NaiveDate,
    pub ex_showroom_price: f64,
    #[serde(default)]
    pub vehicle_type: Option<String>,
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscountRangeRequest {
    #[serde(flatten)]
    pub context: DiscountContext,
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscountRangeResponse {
    pub as_of: NaiveDate,
    pub discounts: Vec<DiscountOffer>,
}

/// Router exposing premium computation, IDV banding and discount listing.
pub fn premium_router<S, C>(service: Arc<PremiumService<S, C>>) -> Router
where
    S: RateRepository + 'static,
    C: ReferenceDataClient + 'static,
{
    Router::new()
        .route("/api/v1/premium/compute", post(compute_handler::<S, C>))
        .route("/api/v1/idv/range", post(idv_range_handler::<S, C>))
        .route("/api/v1/discounts/range", post(discount_range_handler::<S, C>))
        .with_state(service)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub(crate) async fn compute_handler<S, C>(
    State(service): State<Arc<PremiumService<S, C>>>,
    Json(request): Json<PremiumRequest>,
) -> Result<Json<PremiumBreakdown>, AppError>
where
    S: RateRepository + 'static,
    C: ReferenceDataClient + 'static,
{
    let context = request.into_context(today());
    // Bundle pricing calls the blocking reference-data client.
    let breakdown =
        tokio::task::spawn_blocking(move || service.compute_premium(&context)).await??;
    Ok(Json(breakdown))
}

pub(crate) async fn idv_range_handler<S, C>(
    State(service): State<Arc<PremiumService<S, C>>>,
    Json(request): Json<IdvRangeRequest>,
) -> Result<Json<IdvQuote>, AppError>
where
    S: RateRepository + 'static,
    C: ReferenceDataClient + 'static,
{
    let quote = service.idv_range(
        request.invoice_date,
        request.ex_showroom_price,
        request.vehicle_type.as_deref(),
        request.as_of.unwrap_or_else(today),
    )?;
    Ok(Json(quote))
}

pub(crate) async fn discount_range_handler<S, C>(
    State(service): State<Arc<PremiumService<S, C>>>,
    Json(request): Json<DiscountRangeRequest>,
) -> Result<Json<DiscountRangeResponse>, AppError>
where
    S: RateRepository + 'static,
    C: ReferenceDataClient + 'static,
{
    let as_of = request.as_of.unwrap_or_else(today);
    let discounts = service.discount_range(&request.context, as_of)?;
    Ok(Json(DiscountRangeResponse { as_of, discounts }))
}

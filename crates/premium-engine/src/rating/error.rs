use super::catalog::CatalogError;
use super::store::{RateStoreError, ReferenceDataError};

/// Failure surfaced by a premium computation.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(#[from] ReferenceDataError),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Store(#[from] RateStoreError),
}

impl EngineError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, EngineError::Catalog(CatalogError::NotFound { .. }))
    }
}

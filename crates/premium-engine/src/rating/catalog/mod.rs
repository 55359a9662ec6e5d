//! Generic temporal and dimensional rate lookup shared by every rate table.
//!
//! A catalog is a list of [`RateRecord`]s checked against a declared
//! [`CatalogSchema`]. Resolution keeps the records whose criteria accept the
//! query's filters and whose validity window contains the as-of date, then
//! prefers the most specific one. Equally specific survivors are a data error.

pub mod import;
pub mod payload;
mod query;
mod record;
mod schema;

pub use import::{
    load_bundle_addons, load_catalog, load_catalog_file, CatalogImportError, FromRateRow, RateRow,
};
pub use payload::{
    AddonRate, BundlePrice, DeductibleSlab, DepreciationRate, DiscountValue, NcbSlab, OdRate,
    PaRate, TpRate,
};
pub use query::{FilterValue, LookupQuery};
pub use record::{Criterion, NumericBand, RateRecord, Validity};
pub use schema::{CatalogKind, CatalogSchema, DimensionKind};

use chrono::NaiveDate;
use std::collections::BTreeSet;
use tracing::debug;

/// Lookup failures surfaced by every catalog.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogError {
    #[error("no {catalog} record matches [{filters}] as of {as_of}")]
    NotFound {
        catalog: CatalogKind,
        filters: String,
        as_of: NaiveDate,
    },
    #[error(
        "{catalog} records {} equally match [{filters}] as of {as_of}",
        .record_ids.join(", ")
    )]
    Ambiguous {
        catalog: CatalogKind,
        filters: String,
        as_of: NaiveDate,
        record_ids: Vec<String>,
    },
    #[error("{catalog} dimension '{dimension}' rejected: {reason}")]
    InvalidFilter {
        catalog: CatalogKind,
        dimension: String,
        reason: String,
    },
}

/// Read-only rate table for one catalog kind.
#[derive(Debug, Clone, PartialEq)]
pub struct RateCatalog<P> {
    schema: CatalogSchema,
    records: Vec<RateRecord<P>>,
}

impl<P> RateCatalog<P> {
    pub fn new(kind: CatalogKind) -> Self {
        Self {
            schema: kind.schema(),
            records: Vec::new(),
        }
    }

    pub fn with_records(
        kind: CatalogKind,
        records: impl IntoIterator<Item = RateRecord<P>>,
    ) -> Result<Self, CatalogError> {
        let mut catalog = Self::new(kind);
        for record in records {
            catalog.push(record)?;
        }
        Ok(catalog)
    }

    /// Adds a record after checking its criteria against the schema.
    pub fn push(&mut self, record: RateRecord<P>) -> Result<(), CatalogError> {
        for (dimension, criterion) in &record.criteria {
            let expected = self.schema.dimension(dimension).ok_or_else(|| {
                self.invalid(dimension, format!("record {} uses an undeclared dimension", record.id))
            })?;
            let actual = match criterion {
                Criterion::Exact(_) => DimensionKind::Exact,
                Criterion::Range(_) => DimensionKind::Range,
            };
            if expected != actual {
                return Err(self.invalid(
                    dimension,
                    format!("record {} expects a {expected:?} criterion", record.id),
                ));
            }
        }

        if record.validity.is_empty() {
            return Err(self.invalid(
                "valid_till",
                format!("record {} has an empty validity window", record.id),
            ));
        }

        self.records.push(record);
        Ok(())
    }

    pub fn kind(&self) -> CatalogKind {
        self.schema.kind
    }

    pub fn records(&self) -> &[RateRecord<P>] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the unique most specific active record for the query.
    pub fn resolve(&self, query: &LookupQuery) -> Result<&RateRecord<P>, CatalogError> {
        let candidates = self.matching(query)?;
        let Some(&best) = candidates.first() else {
            return Err(CatalogError::NotFound {
                catalog: self.kind(),
                filters: query.describe(),
                as_of: query.as_of,
            });
        };

        let top = best.specificity();
        let tied: Vec<&RateRecord<P>> = candidates
            .iter()
            .copied()
            .take_while(|record| record.specificity() == top)
            .collect();

        if tied.len() > 1 {
            return Err(CatalogError::Ambiguous {
                catalog: self.kind(),
                filters: query.describe(),
                as_of: query.as_of,
                record_ids: tied.iter().map(|record| record.id.clone()).collect(),
            });
        }

        debug!(
            catalog = %self.kind(),
            record = %best.id,
            filters = %query.describe(),
            as_of = %query.as_of,
            "resolved rate record"
        );
        Ok(best)
    }

    /// Like [`resolve`](Self::resolve) but maps a miss to `None`.
    pub fn resolve_optional(
        &self,
        query: &LookupQuery,
    ) -> Result<Option<&RateRecord<P>>, CatalogError> {
        match self.resolve(query) {
            Ok(record) => Ok(Some(record)),
            Err(CatalogError::NotFound { .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Every active matching record, most specific first.
    pub fn matching(&self, query: &LookupQuery) -> Result<Vec<&RateRecord<P>>, CatalogError> {
        self.validate(query)?;

        let mut matches: Vec<&RateRecord<P>> = self
            .records
            .iter()
            .filter(|record| record.validity.contains(query.as_of))
            .filter(|record| accepts(record, query))
            .collect();
        matches.sort_by(|a, b| b.specificity().cmp(&a.specificity()));
        Ok(matches)
    }

    /// Distinct values a record set holds for an exact dimension.
    pub fn exact_values(&self, dimension: &str) -> BTreeSet<&str> {
        self.records
            .iter()
            .filter_map(|record| match record.criteria.get(dimension) {
                Some(Criterion::Exact(value)) => Some(value.as_str()),
                _ => None,
            })
            .collect()
    }

    fn validate(&self, query: &LookupQuery) -> Result<(), CatalogError> {
        for (dimension, value) in query.filters() {
            let Some(kind) = self.schema.dimension(dimension) else {
                return Err(self.invalid(dimension, "not declared by the catalog".to_string()));
            };
            match (kind, value) {
                (DimensionKind::Exact, FilterValue::Text(_))
                | (DimensionKind::Range, FilterValue::Number(_)) => {}
                (DimensionKind::Exact, FilterValue::Number(_)) => {
                    return Err(self.invalid(dimension, "expects a text value".to_string()));
                }
                (DimensionKind::Range, FilterValue::Text(_)) => {
                    return Err(self.invalid(dimension, "expects a numeric value".to_string()));
                }
            }
        }
        Ok(())
    }

    fn invalid(&self, dimension: &str, reason: String) -> CatalogError {
        CatalogError::InvalidFilter {
            catalog: self.kind(),
            dimension: dimension.to_string(),
            reason,
        }
    }
}

impl RateCatalog<AddonRate> {
    /// Addon identifiers priced anywhere in the catalog.
    pub fn addon_ids(&self) -> Vec<String> {
        self.exact_values("addon_id")
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}

fn accepts<P>(record: &RateRecord<P>, query: &LookupQuery) -> bool {
    query
        .filters()
        .all(|(dimension, value)| match (record.criteria.get(dimension), value) {
            (None, _) => true,
            (Some(Criterion::Exact(expected)), FilterValue::Text(actual)) => expected == actual,
            (Some(Criterion::Range(band)), FilterValue::Number(actual)) => band.contains(*actual),
            _ => false,
        })
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Inclusive numeric band; a missing bound is open on that side.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NumericBand {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl NumericBand {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }

    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

/// Value a record holds for one dimension. Dimensions a record omits are wildcards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    Exact(String),
    Range(NumericBand),
}

impl Criterion {
    fn constrains(&self) -> bool {
        match self {
            Criterion::Exact(_) => true,
            Criterion::Range(band) => !band.is_unbounded(),
        }
    }
}

/// Half-open validity window `[valid_from, valid_till)`; no end date means open ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validity {
    pub valid_from: NaiveDate,
    pub valid_till: Option<NaiveDate>,
}

impl Validity {
    pub fn between(valid_from: NaiveDate, valid_till: NaiveDate) -> Self {
        Self {
            valid_from,
            valid_till: Some(valid_till),
        }
    }

    pub fn open_from(valid_from: NaiveDate) -> Self {
        Self {
            valid_from,
            valid_till: None,
        }
    }

    pub fn contains(&self, as_of: NaiveDate) -> bool {
        self.valid_from <= as_of && self.valid_till.map_or(true, |till| as_of < till)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.valid_till, Some(till) if till <= self.valid_from)
    }
}

/// One row of a rate table: dimension criteria, validity, and the catalog payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateRecord<P> {
    pub id: String,
    pub criteria: BTreeMap<String, Criterion>,
    pub validity: Validity,
    pub payload: P,
}

impl<P> RateRecord<P> {
    pub fn new(id: impl Into<String>, validity: Validity, payload: P) -> Self {
        Self {
            id: id.into(),
            criteria: BTreeMap::new(),
            validity,
            payload,
        }
    }

    pub fn exact(mut self, dimension: &str, value: impl Into<String>) -> Self {
        self.criteria
            .insert(dimension.to_string(), Criterion::Exact(value.into()));
        self
    }

    pub fn band(mut self, dimension: &str, min: Option<f64>, max: Option<f64>) -> Self {
        self.criteria.insert(
            dimension.to_string(),
            Criterion::Range(NumericBand::new(min, max)),
        );
        self
    }

    /// Number of dimensions this record actually constrains.
    pub fn specificity(&self) -> usize {
        self.criteria
            .values()
            .filter(|criterion| criterion.constrains())
            .count()
    }
}

use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt;

/// A value supplied for one dimension of a lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Number(f64),
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Text(value) => f.write_str(value),
            FilterValue::Number(value) => write!(f, "{value}"),
        }
    }
}

/// Dimension filters plus the as-of date a catalog is resolved against.
///
/// Dimensions left out of the query match every record.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupQuery {
    pub as_of: NaiveDate,
    filters: BTreeMap<String, FilterValue>,
}

impl LookupQuery {
    pub fn new(as_of: NaiveDate) -> Self {
        Self {
            as_of,
            filters: BTreeMap::new(),
        }
    }

    pub fn exact(mut self, dimension: &str, value: impl Into<String>) -> Self {
        self.filters
            .insert(dimension.to_string(), FilterValue::Text(value.into()));
        self
    }

    pub fn number(mut self, dimension: &str, value: f64) -> Self {
        self.filters
            .insert(dimension.to_string(), FilterValue::Number(value));
        self
    }

    pub fn exact_opt(self, dimension: &str, value: Option<&str>) -> Self {
        match value {
            Some(value) if !value.trim().is_empty() => self.exact(dimension, value),
            _ => self,
        }
    }

    pub fn number_opt(self, dimension: &str, value: Option<f64>) -> Self {
        match value {
            Some(value) => self.number(dimension, value),
            None => self,
        }
    }

    pub fn filters(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.filters
            .iter()
            .map(|(dimension, value)| (dimension.as_str(), value))
    }

    /// Reproducible `dimension=value` rendering for error reports and logs.
    pub fn describe(&self) -> String {
        if self.filters.is_empty() {
            return "any".to_string();
        }

        self.filters
            .iter()
            .map(|(dimension, value)| format!("{dimension}={value}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_lists_filters_in_stable_order() {
        let as_of = NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date");
        let query = LookupQuery::new(as_of)
            .number("cc", 125.0)
            .exact("vehicle_type", "2W")
            .exact_opt("rto_zone", None)
            .exact_opt("insurer", Some("  "));

        assert_eq!(query.describe(), "cc=125, vehicle_type=2W");
        assert_eq!(LookupQuery::new(as_of).describe(), "any");
    }
}

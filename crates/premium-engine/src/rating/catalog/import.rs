use super::{CatalogError, CatalogKind, DimensionKind, RateCatalog, RateRecord, Validity};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum CatalogImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Row {
        catalog: String,
        line: u64,
        reason: String,
    },
    Catalog(CatalogError),
    MissingFile {
        path: PathBuf,
    },
    UnknownColumn {
        catalog: String,
        column: String,
    },
}

impl std::fmt::Display for CatalogImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogImportError::Io(err) => write!(f, "failed to read rate file: {}", err),
            CatalogImportError::Csv(err) => write!(f, "invalid rate CSV data: {}", err),
            CatalogImportError::Row {
                catalog,
                line,
                reason,
            } => write!(f, "{} line {}: {}", catalog, line, reason),
            CatalogImportError::Catalog(err) => write!(f, "rejected rate record: {}", err),
            CatalogImportError::MissingFile { path } => {
                write!(f, "required rate file {} not found", path.display())
            }
            CatalogImportError::UnknownColumn { catalog, column } => {
                write!(f, "{} has unknown column '{}'", catalog, column)
            }
        }
    }
}

impl std::error::Error for CatalogImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogImportError::Io(err) => Some(err),
            CatalogImportError::Csv(err) => Some(err),
            CatalogImportError::Row { .. }
            | CatalogImportError::MissingFile { .. }
            | CatalogImportError::UnknownColumn { .. } => None,
            CatalogImportError::Catalog(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for CatalogImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for CatalogImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<CatalogError> for CatalogImportError {
    fn from(err: CatalogError) -> Self {
        Self::Catalog(err)
    }
}

/// Header-addressed view over one CSV row.
pub struct RateRow<'a> {
    catalog: &'a str,
    line: u64,
    headers: &'a csv::StringRecord,
    record: &'a csv::StringRecord,
}

impl<'a> RateRow<'a> {
    /// Cell value for a column; blank cells read as absent.
    pub fn get(&self, column: &str) -> Option<&'a str> {
        let index = self.headers.iter().position(|header| header == column)?;
        self.record
            .get(index)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    pub fn number(&self, column: &str) -> Result<Option<f64>, CatalogImportError> {
        self.get(column)
            .map(|raw| {
                raw.parse::<f64>()
                    .map_err(|_| self.error(&format!("{column} '{raw}' is not a number")))
            })
            .transpose()
    }

    pub fn required_number(&self, column: &str) -> Result<f64, CatalogImportError> {
        self.number(column)?
            .ok_or_else(|| self.error(&format!("missing {column}")))
    }

    pub fn date(&self, column: &str) -> Result<Option<NaiveDate>, CatalogImportError> {
        self.get(column)
            .map(|raw| {
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .map_err(|_| self.error(&format!("{column} '{raw}' is not YYYY-MM-DD")))
            })
            .transpose()
    }

    pub fn error(&self, reason: &str) -> CatalogImportError {
        CatalogImportError::Row {
            catalog: self.catalog.to_string(),
            line: self.line,
            reason: reason.to_string(),
        }
    }
}

/// Catalog payloads that can be read from a rate CSV row.
pub trait FromRateRow: Sized {
    /// Payload columns this type reads.
    const COLUMNS: &'static [&'static str];

    fn from_row(row: &RateRow<'_>) -> Result<Self, CatalogImportError>;
}

/// Reads a catalog from CSV. Exact dimensions use a column named after the
/// dimension; range dimensions use `min_<dim>` / `max_<dim>`.
pub fn load_catalog<P, R>(kind: CatalogKind, reader: R) -> Result<RateCatalog<P>, CatalogImportError>
where
    P: FromRateRow,
    R: Read,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let schema = kind.schema();
    check_columns::<P>(kind, &headers)?;
    let mut catalog = RateCatalog::new(kind);

    for result in csv_reader.records() {
        let record = result?;
        let row = RateRow {
            catalog: kind.key(),
            line: record.position().map_or(0, |position| position.line()),
            headers: &headers,
            record: &record,
        };

        let id = row
            .get("id")
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}-{}", kind.key(), row.line));
        let valid_from = row
            .date("valid_from")?
            .ok_or_else(|| row.error("missing valid_from"))?;
        let validity = Validity {
            valid_from,
            valid_till: row.date("valid_till")?,
        };
        if validity.is_empty() {
            return Err(row.error("valid_till must be after valid_from"));
        }

        let mut rate_record = RateRecord::new(id, validity, P::from_row(&row)?);
        for (dimension, dimension_kind) in schema.dimensions {
            match dimension_kind {
                DimensionKind::Exact => {
                    if let Some(value) = row.get(dimension) {
                        rate_record = rate_record.exact(dimension, value);
                    }
                }
                DimensionKind::Range => {
                    let min = row.number(&format!("min_{dimension}"))?;
                    let max = row.number(&format!("max_{dimension}"))?;
                    if min.is_some() || max.is_some() {
                        rate_record = rate_record.band(dimension, min, max);
                    }
                }
            }
        }

        catalog.push(rate_record)?;
    }

    Ok(catalog)
}

/// Every header must be a validity column, a declared dimension column, or a
/// payload column. A misspelt dimension would otherwise read as a wildcard.
fn check_columns<P: FromRateRow>(
    kind: CatalogKind,
    headers: &csv::StringRecord,
) -> Result<(), CatalogImportError> {
    let schema = kind.schema();
    for header in headers.iter() {
        let known = matches!(header, "id" | "valid_from" | "valid_till")
            || P::COLUMNS.contains(&header)
            || schema.dimension(header) == Some(DimensionKind::Exact)
            || header
                .strip_prefix("min_")
                .or_else(|| header.strip_prefix("max_"))
                .is_some_and(|dimension| schema.dimension(dimension) == Some(DimensionKind::Range));
        if !known {
            return Err(CatalogImportError::UnknownColumn {
                catalog: kind.key().to_string(),
                column: header.to_string(),
            });
        }
    }
    Ok(())
}

/// Loads `<dir>/<catalog key>.csv`. A missing file is an error for required
/// catalogs and an empty catalog otherwise.
pub fn load_catalog_file<P: FromRateRow>(
    kind: CatalogKind,
    dir: &Path,
) -> Result<RateCatalog<P>, CatalogImportError> {
    let path = dir.join(format!("{}.csv", kind.key()));
    if !path.exists() {
        if kind.is_required() {
            return Err(CatalogImportError::MissingFile { path });
        }
        tracing::warn!(catalog = %kind, path = %path.display(), "rate file missing; catalog left empty");
        return Ok(RateCatalog::new(kind));
    }
    let file = std::fs::File::open(path)?;
    load_catalog(kind, file)
}

/// Reads `addon_bundle_id,addon_id` membership rows.
pub fn load_bundle_addons<R: Read>(
    reader: R,
) -> Result<BTreeMap<String, Vec<String>>, CatalogImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut bundles: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for row in csv_reader.deserialize::<BundleAddonRow>() {
        let row = row?;
        bundles
            .entry(row.addon_bundle_id)
            .or_default()
            .push(row.addon_id);
    }

    Ok(bundles)
}

#[derive(Debug, serde::Deserialize)]
struct BundleAddonRow {
    addon_bundle_id: String,
    addon_id: String,
}

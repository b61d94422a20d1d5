//! Observation table adapter.
//!
//! Normalizes an exported forecast table (one record per year × admin unit ×
//! issue month) into the canonical observation set the engine works on. Rows
//! are dropped, with per-reason accounting, for missing predictor values,
//! non-allow-listed units, and the not-yet-realized upcoming season.

use crate::config::{DatasetSchema, FilterSettings, PredictandKind};
use aat_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One raw exported record, keyed by the export's own column names.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// One canonical observation: a year × admin-unit forecast sample.
///
/// Immutable once adapted; classification and sweeping never mutate it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub year: i32,
    pub unit_id: String,
    pub unit_name: String,
    pub predictor_value: f64,
    pub is_bad_year: bool,
}

/// Per-reason counts of rows dropped during adaptation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludedCounts {
    pub missing_predictor: usize,
    pub unit_not_allowed: usize,
    pub upcoming_season: usize,
}

impl ExcludedCounts {
    pub fn total(&self) -> usize {
        self.missing_predictor + self.unit_not_allowed + self.upcoming_season
    }
}

/// Adapter output: canonical observations plus exclusion accounting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptedDataset {
    /// Observations sorted by (year, unit_id).
    pub observations: Vec<Observation>,
    pub excluded: ExcludedCounts,
}

/// Adapt raw exported records into the canonical observation set.
///
/// Fails with a schema error when a required column is absent or unreadable,
/// with a duplicate error when a (year, unit) pair repeats, and with an
/// empty-dataset error when filtering leaves nothing to classify.
pub fn adapt(
    records: &[RawRecord],
    schema: &DatasetSchema,
    filters: &FilterSettings,
) -> Result<AdaptedDataset> {
    // First pass: resolve columns for every record so the upcoming-season
    // cutoff sees the full year range.
    let mut parsed = Vec::with_capacity(records.len());
    for record in records {
        parsed.push(ParsedRow::from_record(record, schema)?);
    }

    let upcoming_year = if filters.include_upcoming {
        None
    } else {
        parsed.iter().map(|row| row.year).max()
    };

    let mut excluded = ExcludedCounts::default();
    let mut seen: BTreeSet<(i32, String)> = BTreeSet::new();
    let mut observations = Vec::with_capacity(parsed.len());

    for row in parsed {
        if upcoming_year == Some(row.year) {
            excluded.upcoming_season += 1;
            continue;
        }
        if let Some(allowed) = &filters.admin1_list {
            if !allowed.iter().any(|key| key == &row.unit_id) {
                excluded.unit_not_allowed += 1;
                continue;
            }
        }
        let Some(predictor_value) = row.predictor_value else {
            excluded.missing_predictor += 1;
            continue;
        };
        if !seen.insert((row.year, row.unit_id.clone())) {
            return Err(Error::DuplicateObservation {
                year: row.year,
                unit_id: row.unit_id,
            });
        }
        observations.push(Observation {
            year: row.year,
            unit_id: row.unit_id,
            unit_name: row.unit_name,
            predictor_value,
            is_bad_year: row.is_bad_year,
        });
    }

    if observations.is_empty() {
        return Err(Error::EmptyDataset);
    }

    observations.sort_by(|a, b| (a.year, &a.unit_id).cmp(&(b.year, &b.unit_id)));

    Ok(AdaptedDataset {
        observations,
        excluded,
    })
}

struct ParsedRow {
    year: i32,
    unit_id: String,
    unit_name: String,
    predictor_value: Option<f64>,
    is_bad_year: bool,
}

impl ParsedRow {
    fn from_record(record: &RawRecord, schema: &DatasetSchema) -> Result<Self> {
        let year = parse_year(require(record, &schema.year)?, &schema.year)?;
        let unit_id = parse_key(require(record, &schema.unit_key)?, &schema.unit_key)?;
        let unit_name = parse_key(require(record, &schema.unit_label)?, &schema.unit_label)?;
        let predictor_value = parse_number(require(record, &schema.predictor)?);
        let predictand = require(record, &schema.predictand)?;
        let is_bad_year = match schema.predictand_kind {
            PredictandKind::Indicator => parse_truthy(predictand),
            PredictandKind::Value {
                bad_year_threshold,
                direction,
            } => parse_number(predictand)
                .map(|v| direction.triggers(v, bad_year_threshold))
                .unwrap_or(false),
        };
        Ok(ParsedRow {
            year,
            unit_id,
            unit_name,
            predictor_value,
            is_bad_year,
        })
    }
}

fn require<'a>(record: &'a RawRecord, column: &str) -> Result<&'a serde_json::Value> {
    record.get(column).ok_or_else(|| Error::Schema {
        column: column.to_string(),
    })
}

fn parse_year(value: &serde_json::Value, column: &str) -> Result<i32> {
    let year = match value {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    year.and_then(|y| i32::try_from(y).ok())
        .ok_or_else(|| Error::Schema {
            column: column.to_string(),
        })
}

fn parse_key(value: &serde_json::Value, column: &str) -> Result<String> {
    match value {
        serde_json::Value::String(s) => Ok(s.clone()),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        _ => Err(Error::Schema {
            column: column.to_string(),
        }),
    }
}

fn parse_number(value: &serde_json::Value) -> Option<f64> {
    value.as_f64().filter(|v| v.is_finite())
}

fn parse_truthy(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(n) => n.as_f64().map(|v| v != 0.0).unwrap_or(false),
        serde_json::Value::String(s) => {
            matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes")
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PredictandKind;
    use aat_math::TriggerDirection;

    fn schema() -> DatasetSchema {
        serde_yaml::from_str("predictor: pnep\npredictand: bad_year\nissue_month0: 2\n").unwrap()
    }

    fn record(year: i32, key: &str, pnep: Option<f64>, bad: bool) -> RawRecord {
        let mut map = RawRecord::new();
        map.insert("year".into(), serde_json::json!(year));
        map.insert("key".into(), serde_json::json!(key));
        map.insert("label".into(), serde_json::json!(format!("Unit {key}")));
        match pnep {
            Some(v) => map.insert("pnep".into(), serde_json::json!(v)),
            None => map.insert("pnep".into(), serde_json::Value::Null),
        };
        map.insert("bad_year".into(), serde_json::json!(bad));
        map
    }

    #[test]
    fn test_adapt_basic() {
        let records = vec![
            record(2010, "A", Some(0.3), true),
            record(2011, "A", Some(0.8), false),
            record(2010, "B", Some(0.5), true),
        ];
        let adapted = adapt(&records, &schema(), &FilterSettings::default()).unwrap();
        assert_eq!(adapted.observations.len(), 3);
        assert_eq!(adapted.excluded.total(), 0);
        // Sorted by (year, unit_id)
        assert_eq!(adapted.observations[0].unit_id, "A");
        assert_eq!(adapted.observations[1].unit_id, "B");
        assert_eq!(adapted.observations[2].year, 2011);
        assert!(adapted.observations[0].is_bad_year);
    }

    #[test]
    fn test_adapt_missing_column_is_schema_error() {
        let mut bad = record(2010, "A", Some(0.3), true);
        bad.remove("pnep");
        let err = adapt(&[bad], &schema(), &FilterSettings::default()).unwrap_err();
        match err {
            Error::Schema { column } => assert_eq!(column, "pnep"),
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn test_adapt_null_predictor_is_excluded() {
        let records = vec![
            record(2010, "A", None, true),
            record(2011, "A", Some(0.8), false),
        ];
        let adapted = adapt(&records, &schema(), &FilterSettings::default()).unwrap();
        assert_eq!(adapted.observations.len(), 1);
        assert_eq!(adapted.excluded.missing_predictor, 1);
    }

    #[test]
    fn test_adapt_allow_list() {
        let records = vec![
            record(2010, "A", Some(0.3), true),
            record(2010, "B", Some(0.5), false),
        ];
        let filters = FilterSettings {
            include_upcoming: true,
            admin1_list: Some(vec!["A".into()]),
        };
        let adapted = adapt(&records, &schema(), &filters).unwrap();
        assert_eq!(adapted.observations.len(), 1);
        assert_eq!(adapted.observations[0].unit_id, "A");
        assert_eq!(adapted.excluded.unit_not_allowed, 1);
    }

    #[test]
    fn test_adapt_excludes_upcoming_season() {
        let records = vec![
            record(2010, "A", Some(0.3), true),
            record(2011, "A", Some(0.8), false),
            record(2012, "A", Some(0.2), false),
        ];
        let adapted = adapt(&records, &schema(), &FilterSettings::default()).unwrap();
        assert_eq!(adapted.observations.len(), 2);
        assert_eq!(adapted.excluded.upcoming_season, 1);
        assert!(adapted.observations.iter().all(|o| o.year < 2012));

        let keep_all = FilterSettings {
            include_upcoming: true,
            admin1_list: None,
        };
        let adapted = adapt(&records, &schema(), &keep_all).unwrap();
        assert_eq!(adapted.observations.len(), 3);
    }

    #[test]
    fn test_adapt_duplicate_pair_rejected() {
        let records = vec![
            record(2010, "A", Some(0.3), true),
            record(2010, "A", Some(0.4), true),
            record(2011, "A", Some(0.4), true),
        ];
        let err = adapt(&records, &schema(), &FilterSettings::default()).unwrap_err();
        assert!(matches!(err, Error::DuplicateObservation { year: 2010, .. }));
    }

    #[test]
    fn test_adapt_empty_after_filtering() {
        let records = vec![record(2010, "A", None, true)];
        let filters = FilterSettings {
            include_upcoming: true,
            admin1_list: None,
        };
        let err = adapt(&records, &schema(), &filters).unwrap_err();
        assert!(matches!(err, Error::EmptyDataset));
    }

    #[test]
    fn test_adapt_value_predictand() {
        let mut schema = schema();
        schema.predictand = "rain_obs".into();
        schema.predictand_kind = PredictandKind::Value {
            bad_year_threshold: 100.0,
            direction: TriggerDirection::LowTriggers,
        };
        let mut rec = record(2010, "A", Some(0.3), false);
        rec.insert("rain_obs".into(), serde_json::json!(80.0));
        let mut rec2 = record(2011, "A", Some(0.8), false);
        rec2.insert("rain_obs".into(), serde_json::json!(140.0));

        let filters = FilterSettings {
            include_upcoming: true,
            admin1_list: None,
        };
        let adapted = adapt(&[rec, rec2], &schema, &filters).unwrap();
        assert!(adapted.observations[0].is_bad_year);
        assert!(!adapted.observations[1].is_bad_year);
    }

    #[test]
    fn test_adapt_year_and_key_coercion() {
        let mut map = RawRecord::new();
        map.insert("year".into(), serde_json::json!("2010"));
        map.insert("key".into(), serde_json::json!(42));
        map.insert("label".into(), serde_json::json!("Somewhere"));
        map.insert("pnep".into(), serde_json::json!(0.4));
        map.insert("bad_year".into(), serde_json::json!(1));

        let filters = FilterSettings {
            include_upcoming: true,
            admin1_list: None,
        };
        let adapted = adapt(&[map], &schema(), &filters).unwrap();
        let obs = &adapted.observations[0];
        assert_eq!(obs.year, 2010);
        assert_eq!(obs.unit_id, "42");
        assert!(obs.is_bad_year);
    }
}

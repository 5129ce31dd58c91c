use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;

/// Query result handed to a chart: series of aggregated values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    #[serde(default)]
    pub series: Vec<Series>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub values: Vec<SeriesValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesValue {
    #[serde(rename = "aggConfigResult", default)]
    pub agg_config_result: Option<AggResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggResult {
    /// Non-numeric aggregation results deserialize as `None`.
    #[serde(default, deserialize_with = "lenient_number")]
    pub value: Option<f64>,
}

impl ChartData {
    /// Wraps a single reading in the result shape a gauge expects.
    pub fn single(value: f64) -> Self {
        Self {
            series: vec![Series {
                label: None,
                values: vec![SeriesValue {
                    agg_config_result: Some(AggResult { value: Some(value) }),
                }],
            }],
        }
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        Ok(serde_json::from_str(contents)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }
}

/// The gauge's reading: first value of the first series.
///
/// Returns `None` when any level is missing or the value is not finite.
pub fn extract_scalar(data: &ChartData) -> Option<f64> {
    data.series
        .first()?
        .values
        .first()?
        .agg_config_result
        .as_ref()?
        .value
        .filter(|v| v.is_finite())
}

fn lenient_number<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|v| v.as_f64()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_first_aggregated_value() {
        let data = ChartData::from_json(
            r#"{
                "series": [
                    {"label": "Count", "values": [
                        {"aggConfigResult": {"value": 73.5}},
                        {"aggConfigResult": {"value": 12}}
                    ]},
                    {"values": [{"aggConfigResult": {"value": 1}}]}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(extract_scalar(&data), Some(73.5));
    }

    #[test]
    fn missing_links_yield_no_value() {
        for json in [
            r#"{}"#,
            r#"{"series": []}"#,
            r#"{"series": [{"values": []}]}"#,
            r#"{"series": [{"values": [{}]}]}"#,
            r#"{"series": [{"values": [{"aggConfigResult": {}}]}]}"#,
            r#"{"series": [{"values": [{"aggConfigResult": {"value": null}}]}]}"#,
            r#"{"series": [{"values": [{"aggConfigResult": {"value": "n/a"}}]}]}"#,
        ] {
            let data = ChartData::from_json(json).unwrap();
            assert_eq!(extract_scalar(&data), None, "{json}");
        }
    }

    #[test]
    fn non_finite_values_are_rejected() {
        assert_eq!(extract_scalar(&ChartData::single(f64::NAN)), None);
        assert_eq!(extract_scalar(&ChartData::single(f64::INFINITY)), None);
        assert_eq!(extract_scalar(&ChartData::single(8.0)), Some(8.0));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(ChartData::from_json("{\"series\": 5}").is_err());
    }
}

//! The insight result model — the structured answer to one question.
//!
//! The generation backend is asked for JSON under a fixed contract; this
//! module is the strict decode step between that raw text and a typed
//! [`InsightResult`]. Unknown `chartType` strings degrade to [`ChartType::None`]
//! and unknown `trend` strings to absent, rather than failing the whole reply.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{Error, Result};

// ─── Chart kinds ─────────────────────────────────────────────────────────────

/// The fixed set of chart kinds the contract allows.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum ChartType {
  Bar,
  Line,
  Pie,
  Area,
  Scatter,
  #[default]
  None,
}

impl ChartType {
  /// Map a wire string to a chart kind, degrading unknown values to `None`.
  /// The protocol leaves `chartType` as free text; this is where it is closed.
  pub fn parse_lenient(s: &str) -> Self {
    Self::from_str(s.trim()).unwrap_or(Self::None)
  }
}

/// Direction indicator on the headline KPI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Trend {
  Up,
  Down,
  Neutral,
}

// ─── Data points ─────────────────────────────────────────────────────────────

/// One labeled point in a chart series. Extra fields are carried through
/// untouched so exports can include them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
  pub label: String,
  pub value: f64,
  #[serde(flatten)]
  pub extra: BTreeMap<String, serde_json::Value>,
}

impl DataPoint {
  pub fn new(label: impl Into<String>, value: f64) -> Self {
    Self { label: label.into(), value, extra: BTreeMap::new() }
  }
}

/// A single headline KPI with an optional direction indicator.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InsightMetadata {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub total: Option<f64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub delta: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub trend: Option<Trend>,
}

// ─── InsightResult ───────────────────────────────────────────────────────────

/// The parsed reply for one question. A value object: owned by the history
/// item or current-result slot that holds it, never mutated after
/// construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightResult {
  /// Narrative answer; always present.
  pub answer:      String,
  pub chart_type:  ChartType,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub data:        Option<Vec<DataPoint>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub metadata:    Option<InsightMetadata>,
  /// Table names the answer claims to be grounded in. Not validated against
  /// the registry.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub tables_used: Option<Vec<String>>,
}

impl InsightResult {
  /// A chart is rendered only when the kind is not `None` AND the series is
  /// present and non-empty. A chart kind without data degrades to text-only.
  pub fn has_renderable_chart(&self) -> bool {
    self.chart_type != ChartType::None
      && self.data.as_ref().is_some_and(|d| !d.is_empty())
  }

  /// Strict decode of the raw generation payload.
  ///
  /// An empty payload is treated as `"{}"` first, which then fails the
  /// required-field checks. `answer` and `chartType` are mandatory; `data`
  /// items must carry a string `label` and a numeric `value`.
  pub fn decode(raw: &str) -> Result<Self> {
    let text = if raw.trim().is_empty() { "{}" } else { raw };

    let value: serde_json::Value = serde_json::from_str(text)
      .map_err(|e| Error::MalformedResponse(format!("not valid JSON: {e}")))?;
    let obj = value
      .as_object()
      .ok_or_else(|| Error::MalformedResponse("payload is not an object".into()))?;

    let answer = obj
      .get("answer")
      .and_then(|v| v.as_str())
      .ok_or_else(|| Error::MalformedResponse("missing required field `answer`".into()))?
      .to_string();

    let chart_type = obj
      .get("chartType")
      .and_then(|v| v.as_str())
      .map(ChartType::parse_lenient)
      .ok_or_else(|| {
        Error::MalformedResponse("missing required field `chartType`".into())
      })?;

    let data = match obj.get("data") {
      None | Some(serde_json::Value::Null) => None,
      Some(serde_json::Value::Array(items)) => {
        let points = items
          .iter()
          .map(decode_data_point)
          .collect::<Result<Vec<_>>>()?;
        Some(points)
      }
      Some(_) => {
        return Err(Error::MalformedResponse("`data` is not an array".into()));
      }
    };

    let metadata = match obj.get("metadata") {
      None | Some(serde_json::Value::Null) => None,
      Some(serde_json::Value::Object(m)) => Some(InsightMetadata {
        total: m.get("total").and_then(|v| v.as_f64()),
        delta: m.get("delta").and_then(|v| v.as_str()).map(str::to_owned),
        // Unknown trend strings decode to absent.
        trend: m
          .get("trend")
          .and_then(|v| v.as_str())
          .and_then(|s| Trend::from_str(s.trim()).ok()),
      }),
      Some(_) => {
        return Err(Error::MalformedResponse("`metadata` is not an object".into()));
      }
    };

    let tables_used = obj.get("tablesUsed").and_then(|v| v.as_array()).map(|a| {
      a.iter()
        .filter_map(|v| v.as_str())
        .map(str::to_owned)
        .collect()
    });

    Ok(Self { answer, chart_type, data, metadata, tables_used })
  }
}

fn decode_data_point(value: &serde_json::Value) -> Result<DataPoint> {
  let obj = value
    .as_object()
    .ok_or_else(|| Error::MalformedResponse("data item is not an object".into()))?;

  let label = obj
    .get("label")
    .and_then(|v| v.as_str())
    .ok_or_else(|| Error::MalformedResponse("data item missing `label`".into()))?
    .to_string();
  let num = obj
    .get("value")
    .and_then(|v| v.as_f64())
    .ok_or_else(|| Error::MalformedResponse("data item missing numeric `value`".into()))?;

  let extra = obj
    .iter()
    .filter(|(k, _)| k.as_str() != "label" && k.as_str() != "value")
    .map(|(k, v)| (k.clone(), v.clone()))
    .collect();

  Ok(DataPoint { label, value: num, extra })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn decode_full_sample() {
    let result = InsightResult::decode(
      r#"{"answer":"Sales are up","chartType":"BAR",
          "data":[{"label":"Jan","value":10},{"label":"Feb","value":14}]}"#,
    )
    .unwrap();

    assert_eq!(result.answer, "Sales are up");
    assert_eq!(result.chart_type, ChartType::Bar);
    assert_eq!(result.data.as_ref().unwrap().len(), 2);
    assert!(result.has_renderable_chart());
  }

  #[test]
  fn decode_rejects_non_json() {
    assert!(matches!(
      InsightResult::decode("not json"),
      Err(Error::MalformedResponse(_))
    ));
  }

  #[test]
  fn decode_treats_empty_payload_as_empty_object() {
    // "{}" fails the required-field checks, not the JSON parse.
    let err = InsightResult::decode("   ").unwrap_err();
    assert!(matches!(err, Error::MalformedResponse(ref d) if d.contains("answer")));
  }

  #[test]
  fn decode_requires_chart_type() {
    let err = InsightResult::decode(r#"{"answer":"hi"}"#).unwrap_err();
    assert!(matches!(err, Error::MalformedResponse(ref d) if d.contains("chartType")));
  }

  #[test]
  fn unknown_chart_type_maps_to_none() {
    let result =
      InsightResult::decode(r#"{"answer":"hi","chartType":"HOLOGRAM"}"#).unwrap();
    assert_eq!(result.chart_type, ChartType::None);
  }

  #[test]
  fn decode_rejects_data_item_without_value() {
    let err = InsightResult::decode(
      r#"{"answer":"hi","chartType":"BAR","data":[{"label":"Jan"}]}"#,
    )
    .unwrap_err();
    assert!(matches!(err, Error::MalformedResponse(_)));
  }

  #[test]
  fn extra_data_point_fields_are_preserved() {
    let result = InsightResult::decode(
      r#"{"answer":"hi","chartType":"BAR",
          "data":[{"label":"Jan","value":10,"region":"EU"}]}"#,
    )
    .unwrap();
    let point = &result.data.unwrap()[0];
    assert_eq!(point.extra.get("region").unwrap(), "EU");
  }

  #[test]
  fn metadata_with_unknown_trend_decodes_as_absent() {
    let result = InsightResult::decode(
      r#"{"answer":"hi","chartType":"NONE",
          "metadata":{"total":420.5,"delta":"+12%","trend":"sideways"}}"#,
    )
    .unwrap();
    let meta = result.metadata.unwrap();
    assert_eq!(meta.total, Some(420.5));
    assert_eq!(meta.delta.as_deref(), Some("+12%"));
    assert_eq!(meta.trend, None);
  }

  #[test]
  fn chart_without_data_is_not_renderable() {
    let result =
      InsightResult::decode(r#"{"answer":"hi","chartType":"LINE"}"#).unwrap();
    assert!(!result.has_renderable_chart());

    let empty = InsightResult::decode(
      r#"{"answer":"hi","chartType":"LINE","data":[]}"#,
    )
    .unwrap();
    assert!(!empty.has_renderable_chart());
  }

  #[test]
  fn none_chart_with_data_is_not_renderable() {
    let result = InsightResult::decode(
      r#"{"answer":"hi","chartType":"NONE","data":[{"label":"Jan","value":1}]}"#,
    )
    .unwrap();
    assert!(!result.has_renderable_chart());
  }

  #[test]
  fn wire_form_uses_camel_case() {
    let result =
      InsightResult::decode(r#"{"answer":"hi","chartType":"PIE","tablesUsed":["Sales"]}"#)
        .unwrap();
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["chartType"], "PIE");
    assert_eq!(json["tablesUsed"][0], "Sales");
  }
}

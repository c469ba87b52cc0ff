//! Row-oriented CSV export of a chart series.
//!
//! A pure transformation over already-computed results: `label,value` columns
//! plus the union of any extra data-point fields, in first-seen order.

use crate::insight::DataPoint;

/// Render `points` as CSV text with a header row.
///
/// Extra fields missing from a given point are emitted as empty cells.
/// Non-string extra values are serialized as compact JSON.
pub fn to_csv(points: &[DataPoint]) -> String {
  let mut extra_columns: Vec<&str> = Vec::new();
  for p in points {
    for key in p.extra.keys() {
      if !extra_columns.contains(&key.as_str()) {
        extra_columns.push(key);
      }
    }
  }

  let mut out = String::new();
  out.push_str("label,value");
  for col in &extra_columns {
    out.push(',');
    out.push_str(&escape(col));
  }
  out.push('\n');

  for p in points {
    out.push_str(&escape(&p.label));
    out.push(',');
    out.push_str(&p.value.to_string());
    for col in &extra_columns {
      out.push(',');
      if let Some(v) = p.extra.get(*col) {
        match v {
          serde_json::Value::String(s) => out.push_str(&escape(s)),
          other => out.push_str(&escape(&other.to_string())),
        }
      }
    }
    out.push('\n');
  }

  out
}

/// RFC 4180 quoting: wrap in double quotes when the field contains a comma,
/// quote, or newline; embedded quotes are doubled.
fn escape(field: &str) -> String {
  if field.contains([',', '"', '\n', '\r']) {
    format!("\"{}\"", field.replace('"', "\"\""))
  } else {
    field.to_string()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn plain_points() {
    let points = vec![DataPoint::new("Jan", 10.0), DataPoint::new("Feb", 14.5)];
    assert_eq!(to_csv(&points), "label,value\nJan,10\nFeb,14.5\n");
  }

  #[test]
  fn fields_with_commas_are_quoted() {
    let points = vec![DataPoint::new("Jan, 2024", 1.0)];
    assert_eq!(to_csv(&points), "label,value\n\"Jan, 2024\",1\n");
  }

  #[test]
  fn embedded_quotes_are_doubled() {
    let points = vec![DataPoint::new("the \"big\" one", 2.0)];
    assert_eq!(to_csv(&points), "label,value\n\"the \"\"big\"\" one\",2\n");
  }

  #[test]
  fn extra_columns_form_the_union_in_first_seen_order() {
    let mut a = DataPoint::new("Jan", 1.0);
    a.extra.insert("region".into(), serde_json::json!("EU"));
    let mut b = DataPoint::new("Feb", 2.0);
    b.extra.insert("region".into(), serde_json::json!("US"));
    b.extra.insert("share".into(), serde_json::json!(0.4));

    assert_eq!(
      to_csv(&[a, b]),
      "label,value,region,share\nJan,1,EU,\nFeb,2,US,0.4\n"
    );
  }

  #[test]
  fn empty_series_yields_header_only() {
    assert_eq!(to_csv(&[]), "label,value\n");
  }
}

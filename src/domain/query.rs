//! Server Query Types
//!
//! The structured DataTables-style query sent to the backend, and the
//! response body expected back. A query renders either as a flat query
//! string (GET) or as a JSON body (POST); both shapes agree.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::codec;

/// Sort direction for an order instruction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderDir {
    Asc,
    Desc,
}

impl OrderDir {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderDir::Asc => "asc",
            OrderDir::Desc => "desc",
        }
    }
}

/// Global search clause
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchSpec {
    pub value: String,
    pub regex: bool,
}

/// One sort instruction, referencing a column by its post-exclusion
/// positional index
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSpec {
    pub column: usize,
    pub dir: OrderDir,
}

/// Column metadata entry
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub data: String,
    pub name: String,
    pub searchable: bool,
    pub orderable: bool,
}

/// The full server query
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerQuery {
    pub draw: u32,
    pub start: i64,
    pub length: i64,
    pub search: SearchSpec,
    pub order: Vec<OrderSpec>,
    pub columns: Vec<ColumnSpec>,
    /// Extra keys overlaid from a base query, serialized verbatim after
    /// the structural fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ServerQuery {
    /// Overlay keys parsed from a base query string.
    ///
    /// Applied after the skeleton and before per-field processing, so
    /// base-query values win: scalar structural keys (`draw`, `start`,
    /// `length`) are coerced from their string form and overwrite the
    /// skeleton, a `search` key overwrites `search.value`, and every
    /// other key lands in `extra` and reaches the wire verbatim.
    /// Structural values with no typed representation are dropped.
    pub fn apply_overlay(&mut self, base: Map<String, Value>) {
        for (key, value) in base {
            match key.as_str() {
                "draw" => match scalar_i64(&value).and_then(|n| u32::try_from(n).ok()) {
                    Some(draw) => self.draw = draw,
                    None => tracing::debug!(?value, "dropping unrepresentable draw override"),
                },
                "start" => match scalar_i64(&value) {
                    Some(start) => self.start = start,
                    None => tracing::debug!(?value, "dropping unrepresentable start override"),
                },
                "length" => match scalar_i64(&value) {
                    Some(length) => self.length = length,
                    None => tracing::debug!(?value, "dropping unrepresentable length override"),
                },
                "search" => match value {
                    Value::String(text) => self.search.value = text,
                    other => tracing::debug!(?other, "dropping unrepresentable search override"),
                },
                "order" | "columns" => {
                    tracing::debug!(key = %key, "dropping structured override from base query");
                }
                _ => {
                    self.extra.insert(key, value);
                }
            }
        }
    }

    /// Render as a flat URL query string for GET dispatch
    pub fn to_query_string(&self) -> String {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => codec::stringify(&map),
            _ => String::new(),
        }
    }
}

fn scalar_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Expected response body for a query
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryResponse {
    pub records_total: u64,
    pub records_filtered: Option<u64>,
    pub data: Vec<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;
    use serde_json::json;

    fn sample_query() -> ServerQuery {
        ServerQuery {
            draw: 1,
            start: 10,
            length: 10,
            search: SearchSpec { value: "abc".into(), regex: false },
            order: vec![OrderSpec { column: 2, dir: OrderDir::Desc }],
            columns: vec![ColumnSpec {
                data: "name".into(),
                name: "name".into(),
                searchable: true,
                orderable: true,
            }],
            extra: Map::new(),
        }
    }

    #[test]
    fn query_string_matches_wire_format() {
        let rendered = sample_query().to_query_string();
        assert_eq!(
            rendered,
            "draw=1&start=10&length=10\
             &search%5Bvalue%5D=abc&search%5Bregex%5D=false\
             &order%5B0%5D%5Bcolumn%5D=2&order%5B0%5D%5Bdir%5D=desc\
             &columns%5B0%5D%5Bdata%5D=name&columns%5B0%5D%5Bname%5D=name\
             &columns%5B0%5D%5Bsearchable%5D=true&columns%5B0%5D%5Borderable%5D=true"
        );
    }

    #[test]
    fn overlay_keeps_extra_keys_on_the_wire() {
        let mut query = sample_query();
        query.apply_overlay(codec::parse("team=alpha&region=emea"));

        assert_eq!(query.extra.get("team"), Some(&json!("alpha")));
        let rendered = query.to_query_string();
        assert!(rendered.ends_with("&team=alpha&region=emea"));
    }

    #[test]
    fn overlay_coerces_structural_scalars() {
        let mut query = sample_query();
        query.apply_overlay(codec::parse("draw=7&start=40&length=20&search=override"));

        assert_eq!(query.draw, 7);
        assert_eq!(query.start, 40);
        assert_eq!(query.length, 20);
        assert_eq!(query.search.value, "override");
        assert!(!query.search.regex);
    }

    #[test]
    fn overlay_drops_unrepresentable_structural_values() {
        let mut query = sample_query();
        let mut base = Map::new();
        base.insert("draw".to_string(), json!("not-a-number"));
        base.insert("order".to_string(), json!(["x"]));
        query.apply_overlay(base);

        assert_eq!(query.draw, 1);
        assert_eq!(query.order.len(), 1);
        assert!(!query.extra.contains_key("order"));
    }

    #[test]
    fn response_body_deserializes_with_defaults() {
        let body = json!({ "recordsTotal": 25, "data": [{"id": 1}] });
        let parsed: QueryResponse =
            serde_json::from_value(body).expect("response should deserialize");

        assert_eq!(parsed.records_total, 25);
        assert_eq!(parsed.records_filtered, None);
        assert_eq!(parsed.data.len(), 1);
    }
}

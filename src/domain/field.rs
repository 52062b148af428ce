//! Field Definitions
//!
//! Grid field descriptors and the normalization that turns caller-supplied
//! field configuration into the canonical ordered list driving column
//! translation. Ordering is insertion order and determines the positional
//! column index used in sort instructions.

use hashlink::LinkedHashMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Display attribute names copied through when normalizing mapping input.
/// Everything else is dropped.
const COPYABLE_ATTRS: [&str; 12] = [
    "headerTitle",
    "headerAbbr",
    "class",
    "formatter",
    "tdClass",
    "thClass",
    "thStyle",
    "variant",
    "tdAttr",
    "thAttr",
    "isRowHeader",
    "stickyColumn",
];

/// A single grid field descriptor
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldDef {
    /// Column key; falls back to `name`, `data`, then the mapping key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    /// Header label shown by the grid
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub searchable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sortable: Option<bool>,
    /// Local fields are rendered client-side and carry no server column
    /// when their key is empty
    pub is_local: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_direction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by_formatted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_by_formatted: Option<bool>,
    /// Display-only attributes (header classes, cell styling, ...)
    #[serde(flatten)]
    pub attrs: Map<String, Value>,
}

impl FieldDef {
    /// The computed key, or empty when absent
    pub fn key_str(&self) -> &str {
        self.key.as_deref().unwrap_or("")
    }
}

/// A bare string is a key-only descriptor
impl From<&str> for FieldDef {
    fn from(key: &str) -> Self {
        FieldDef {
            key: Some(key.to_string()),
            ..FieldDef::default()
        }
    }
}

impl From<String> for FieldDef {
    fn from(key: String) -> Self {
        FieldDef {
            key: Some(key),
            ..FieldDef::default()
        }
    }
}

/// Caller-supplied field configuration
#[derive(Clone, Debug)]
pub enum Fields {
    /// Already-ordered descriptor list, passed through verbatim
    List(Vec<FieldDef>),
    /// Name-to-descriptor mapping, normalized with attribute whitelisting
    Mapping(LinkedHashMap<String, FieldDef>),
}

impl Fields {
    /// Produce the canonical ordered field list.
    ///
    /// List input is returned unmodified, including attributes the
    /// mapping path would drop. Mapping input goes through key
    /// derivation, local-field downgrades and the attribute whitelist.
    pub fn normalize(self) -> Vec<FieldDef> {
        match self {
            Fields::List(fields) => fields,
            Fields::Mapping(fields) => fields
                .into_iter()
                .map(|(name, field)| normalize_entry(name, field))
                .collect(),
        }
    }
}

impl From<Vec<FieldDef>> for Fields {
    fn from(fields: Vec<FieldDef>) -> Self {
        Fields::List(fields)
    }
}

impl From<LinkedHashMap<String, FieldDef>> for Fields {
    fn from(fields: LinkedHashMap<String, FieldDef>) -> Self {
        Fields::Mapping(fields)
    }
}

fn normalize_entry(name: String, field: FieldDef) -> FieldDef {
    let key = [field.key.as_deref(), field.name.as_deref(), field.data.as_deref()]
        .into_iter()
        .flatten()
        .find(|candidate| !candidate.is_empty())
        .map(str::to_string)
        .unwrap_or(name);

    let mut out = FieldDef {
        key: Some(key.clone()),
        label: field.label,
        searchable: field.searchable,
        sortable: field.sortable,
        is_local: field.is_local,
        sort_direction: field.sort_direction,
        sort_by_formatted: field.sort_by_formatted,
        filter_by_formatted: field.filter_by_formatted,
        ..FieldDef::default()
    };

    // disable search and sort for local fields and empty keys
    if out.is_local || key.is_empty() {
        out.searchable = Some(false);
        out.sortable = Some(false);
        out.filter_by_formatted = None;
    }

    for attr in COPYABLE_ATTRS {
        if let Some(value) = field.attrs.get(attr) {
            out.attrs.insert(attr.to_string(), value.clone());
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn mapping(entries: Vec<(&str, FieldDef)>) -> Fields {
        Fields::Mapping(
            entries
                .into_iter()
                .map(|(name, field)| (name.to_string(), field))
                .collect(),
        )
    }

    fn attr(name: &str, value: Value) -> Map<String, Value> {
        let mut attrs = Map::new();
        attrs.insert(name.to_string(), value);
        attrs
    }

    #[test]
    fn key_falls_back_through_name_data_then_mapping_key() {
        let fields = mapping(vec![
            ("a", FieldDef { key: Some("k".into()), ..FieldDef::default() }),
            ("b", FieldDef { name: Some("n".into()), ..FieldDef::default() }),
            ("c", FieldDef { data: Some("d".into()), ..FieldDef::default() }),
            ("e", FieldDef::default()),
        ])
        .normalize();

        let keys: Vec<_> = fields.iter().map(FieldDef::key_str).collect();
        assert_eq!(keys, vec!["k", "n", "d", "e"]);
    }

    #[test]
    fn empty_declared_key_falls_through() {
        let fields = mapping(vec![(
            "id",
            FieldDef { key: Some(String::new()), name: Some("ident".into()), ..FieldDef::default() },
        )])
        .normalize();

        assert_eq!(fields[0].key_str(), "ident");
    }

    #[test]
    fn local_field_is_downgraded() {
        let fields = mapping(vec![(
            "actions",
            FieldDef {
                is_local: true,
                searchable: Some(true),
                sortable: Some(true),
                filter_by_formatted: Some(true),
                ..FieldDef::default()
            },
        )])
        .normalize();

        assert_eq!(fields[0].searchable, Some(false));
        assert_eq!(fields[0].sortable, Some(false));
        assert_eq!(fields[0].filter_by_formatted, None);
    }

    #[test]
    fn mapping_drops_non_whitelisted_attrs() {
        let mut attrs = attr("thClass", json!("text-right"));
        attrs.insert("bogus".to_string(), json!("dropped"));
        attrs.insert("name".to_string(), json!("shadow"));

        let fields = mapping(vec![("amount", FieldDef { attrs, ..FieldDef::default() })]).normalize();

        assert_eq!(fields[0].attrs.get("thClass"), Some(&json!("text-right")));
        assert_eq!(fields[0].attrs.get("bogus"), None);
        assert_eq!(fields[0].attrs.get("name"), None);
        // name/data never survive normalization
        assert_eq!(fields[0].name, None);
        assert_eq!(fields[0].data, None);
    }

    // List input bypasses the whitelist entirely. The asymmetry with
    // mapping input is inherited behavior, kept as-is.
    #[test]
    fn list_input_passes_through_verbatim() {
        let field = FieldDef {
            key: Some("raw".into()),
            is_local: true,
            searchable: Some(true),
            attrs: attr("bogus", json!("kept")),
            ..FieldDef::default()
        };

        let fields = Fields::List(vec![field.clone()]).normalize();
        assert_eq!(fields, vec![field]);
    }

    #[test]
    fn str_shorthand_is_key_only() {
        let field = FieldDef::from("age");
        assert_eq!(field.key_str(), "age");
        assert_eq!(field.label, None);
        assert!(!field.is_local);
    }
}

//! Typed view over the style specification reference document.
//!
//! The document is a JSON object whose top-level keys are sections. Most
//! sections are property mappings (`name -> property node`), a few are lists
//! or single nodes. Sections stay raw until something asks for them, so a
//! malformed section that the generator never reads does not fail the run.
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::error::{Result, SchemaError};
use crate::path_de::{from_str_with_path, from_value_with_path};

/// Key of the entry that opens a mapping to arbitrary property names.
pub const WILDCARD: &str = "*";

/// Ordered `name -> node` mapping. Order is the emitted property order.
pub type PropertyMap = IndexMap<String, PropertySpec>;

// ————————————————————————————————————————————————————————————————————————————
// PROPERTY NODES
// ————————————————————————————————————————————————————————————————————————————

/// The `type` of a property node.
///
/// Documents only ever contain tags. `Inline` is produced by variant
/// derivation to splice a per-variant block (a layer's `paint`, a light's
/// `properties`) into the template as an exact object shape.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeRef {
    Tag(String),
    Inline(PropertyMap),
}

impl<'de> Deserialize<'de> for TypeRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        String::deserialize(deserializer).map(TypeRef::Tag)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PropertySpec {
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub values: Option<EnumValues>,
    /// element of an `array` node
    #[serde(default)]
    pub value: Option<ElementSpec>,
    #[serde(default)]
    pub length: Option<usize>,
    #[serde(default)]
    pub expression: Option<ExpressionSpec>,
    #[serde(default, rename = "property-type")]
    pub property_type: Option<String>,
}

/// Legal literals of an `enum` node: either a plain list, or a mapping whose
/// keys are the literals (values carry docs we don't read).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum EnumValues {
    List(Vec<Value>),
    Map(IndexMap<String, Value>),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ElementSpec {
    Tag(String),
    Node(Box<PropertySpec>),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExpressionSpec {
    #[serde(default)]
    pub interpolated: bool,
    #[serde(default)]
    pub parameters: Vec<String>,
}

impl PropertySpec {
    /// A bare node of the given tag; everything else defaulted.
    pub fn tag(tag: impl Into<String>) -> Self {
        Self {
            ty: TypeRef::Tag(tag.into()),
            required: false,
            values: None,
            value: None,
            length: None,
            expression: None,
            property_type: None,
        }
    }

    /// Required single-literal enum, used to stamp a variant's discriminant.
    pub fn literal(tag: &str) -> Self {
        Self {
            required: true,
            values: Some(EnumValues::List(vec![Value::String(tag.to_owned())])),
            ..Self::tag("enum")
        }
    }

    /// Per-feature expressions allowed.
    pub fn supports_data_driven(&self) -> bool {
        matches!(
            self.property_type.as_deref(),
            Some("data-driven" | "cross-faded-data-driven")
        )
    }

    /// Zoom-dependent expressions allowed.
    pub fn supports_zoom(&self) -> bool {
        self.expression
            .as_ref()
            .is_some_and(|e| e.parameters.iter().any(|p| p == "zoom"))
    }

    pub fn is_expression(&self) -> bool {
        self.expression.is_some()
    }
}

impl EnumValues {
    /// Literals as they appear in type syntax: strings quoted, numbers and
    /// booleans bare.
    pub fn literals(&self) -> Vec<String> {
        match self {
            EnumValues::List(xs) => xs.iter().map(literal_text).collect(),
            EnumValues::Map(m) => m.keys().map(|k| Value::String(k.clone()).to_string()).collect(),
        }
    }

    /// Raw literal text, used as variant tags.
    pub fn keys(&self) -> Vec<String> {
        match self {
            EnumValues::List(xs) => xs
                .iter()
                .map(|x| x.as_str().map(str::to_owned).unwrap_or_else(|| x.to_string()))
                .collect(),
            EnumValues::Map(m) => m.keys().cloned().collect(),
        }
    }
}

// Floats print without a redundant fraction: `1.0` is the literal `1`.
fn literal_text(value: &Value) -> String {
    match value {
        Value::Number(n) if n.is_f64() => n.as_f64().map_or_else(|| n.to_string(), |f| f.to_string()),
        other => other.to_string(),
    }
}

// ————————————————————————————————————————————————————————————————————————————
// DOCUMENT
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone)]
pub struct StyleSpec {
    sections: Map<String, Value>,
}

impl StyleSpec {
    pub fn parse(src: &str) -> Result<Self> {
        let value = from_str_with_path::<Value>(src).map_err(|e| SchemaError::MalformedDocument {
            path: e.path,
            message: e.message,
        })?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(sections) => Ok(Self { sections }),
            other => Err(SchemaError::MalformedDocument {
                path: ".".to_owned(),
                message: format!("expected an object of sections, found {}", kind_of(&other)),
            }),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.sections.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    pub fn section(&self, key: &str) -> Result<&Value> {
        self.sections
            .get(key)
            .ok_or_else(|| SchemaError::MissingSection { key: key.to_owned() })
    }

    /// Decode a section as a property mapping.
    pub fn properties(&self, key: &str) -> Result<PropertyMap> {
        decode(key, self.section(key)?)
    }

    /// Like [`StyleSpec::properties`], but absence is not an error.
    pub fn optional_properties(&self, key: &str) -> Result<Option<PropertyMap>> {
        self.sections.get(key).map(|v| decode(key, v)).transpose()
    }

    /// Decode a section that is itself a single property node.
    pub fn property(&self, key: &str) -> Result<PropertySpec> {
        decode(key, self.section(key)?)
    }

    /// Decode a section that is a list of strings (e.g. the source kinds).
    pub fn string_list(&self, key: &str) -> Result<Vec<String>> {
        decode(key, self.section(key)?)
    }
}

fn decode<T: serde::de::DeserializeOwned>(key: &str, value: &Value) -> Result<T> {
    from_value_with_path(value).map_err(|e| SchemaError::MalformedSection {
        key: key.to_owned(),
        path: e.path,
        message: e.message,
    })
}

fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn spec(v: Value) -> StyleSpec {
        StyleSpec::from_value(v).unwrap()
    }

    #[test]
    fn property_mapping_keeps_declared_order() {
        let s = spec(json!({
            "terrain": {
                "source": { "type": "string", "required": true },
                "exaggeration": { "type": "number" },
                "*": { "type": "*" }
            }
        }));
        let props = s.properties("terrain").unwrap();
        let keys: Vec<_> = props.keys().map(String::as_str).collect();
        assert_eq!(keys, ["source", "exaggeration", "*"]);
        assert!(props["source"].required);
        assert!(!props["exaggeration"].required);
        assert_eq!(props["*"].ty, TypeRef::Tag("*".into()));
    }

    #[test]
    fn enum_values_list_and_map_forms() {
        let list: EnumValues = serde_json::from_value(json!([8, "a", true])).unwrap();
        assert_eq!(list.literals(), ["8", "\"a\"", "true"]);
        assert_eq!(list.keys(), ["8", "a", "true"]);

        let map: EnumValues = serde_json::from_value(json!({ "map": {}, "viewport": { "doc": "x" } })).unwrap();
        assert_eq!(map.literals(), ["\"map\"", "\"viewport\""]);
        assert_eq!(map.keys(), ["map", "viewport"]);
    }

    #[test]
    fn element_spec_tag_or_node() {
        let p: PropertySpec = serde_json::from_value(json!({
            "type": "array",
            "length": 4,
            "value": { "type": "array", "value": "number", "length": 2 }
        }))
        .unwrap();
        match p.value {
            Some(ElementSpec::Node(inner)) => {
                assert_eq!(inner.length, Some(2));
                assert_eq!(inner.value, Some(ElementSpec::Tag("number".into())));
            }
            other => panic!("expected nested node, got {other:?}"),
        }
    }

    #[test]
    fn capability_predicates() {
        let dd: PropertySpec = serde_json::from_value(json!({
            "type": "color",
            "property-type": "data-driven",
            "expression": { "interpolated": true, "parameters": ["zoom", "feature"] }
        }))
        .unwrap();
        assert!(dd.supports_data_driven() && dd.supports_zoom() && dd.is_expression());

        let zoom: PropertySpec = serde_json::from_value(json!({
            "type": "number",
            "property-type": "data-constant",
            "expression": { "interpolated": true, "parameters": ["zoom"] }
        }))
        .unwrap();
        assert!(!zoom.supports_data_driven() && zoom.supports_zoom());

        let bare: PropertySpec = serde_json::from_value(json!({ "type": "*", "expression": {} })).unwrap();
        assert!(!bare.supports_zoom() && bare.is_expression());

        let cross: PropertySpec =
            serde_json::from_value(json!({ "type": "resolvedImage", "property-type": "cross-faded-data-driven" })).unwrap();
        assert!(cross.supports_data_driven());
    }

    #[test]
    fn missing_and_malformed_sections() {
        let s = spec(json!({ "fog": { "range": { "type": "array", "length": "two" } } }));
        assert!(matches!(s.properties("light"), Err(SchemaError::MissingSection { key }) if key == "light"));
        match s.properties("fog") {
            Err(SchemaError::MalformedSection { key, path, .. }) => {
                assert_eq!(key, "fog");
                assert_eq!(path, "range.length");
            }
            other => panic!("expected malformed section, got {other:?}"),
        }
        assert!(s.optional_properties("paint_fill").unwrap().is_none());
    }

    #[test]
    fn document_must_be_an_object() {
        assert!(matches!(
            StyleSpec::parse("[1, 2]"),
            Err(SchemaError::MalformedDocument { .. })
        ));
        assert!(matches!(
            StyleSpec::parse("{ \"a\": "),
            Err(SchemaError::MalformedDocument { .. })
        ));
        assert!(matches!(
            StyleSpec::parse("{ \"$version\": 8 } {}"),
            Err(SchemaError::MalformedDocument { ref path, .. }) if path == "."
        ));
    }

    #[test]
    fn numeric_literals_drop_redundant_fractions() {
        let values: EnumValues = serde_json::from_value(json!([1.0, 0.5, 2, true, "a"])).unwrap();
        assert_eq!(values.literals(), ["1", "0.5", "2", "true", "\"a\""]);
    }

    #[test]
    fn literal_stamps_required_single_value_enum() {
        let p = PropertySpec::literal("fill");
        assert!(p.required);
        assert_eq!(p.ty, TypeRef::Tag("enum".into()));
        assert_eq!(p.values.unwrap().literals(), ["\"fill\""]);
    }
}

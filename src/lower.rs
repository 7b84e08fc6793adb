//! Lowering: schema property nodes → typed IR.
//!
//! Two layers live here:
//! - `Lowerer::ty` turns one node into a type, recursing through arrays and
//!   widening the result according to the node's expression capabilities;
//! - `Lowerer::object` / `Lowerer::declaration` turn a whole property mapping
//!   into a record shape, open iff the mapping has a wildcard entry.
use crate::error::{Result, SchemaError};
use crate::ir::{Decl, Field, FieldKey, Object, Ty, Wrapper};
use crate::naming::resolve_type_name;
use crate::schema::{ElementSpec, PropertyMap, PropertySpec, StyleSpec, TypeRef, WILDCARD};

/// Tags backed by a preamble declaration rather than a schema section.
pub const PREAMBLE_TAGS: &[&str] = &[
    "color",
    "formatted",
    "resolvedImage",
    "promoteId",
    "filter",
    "transition",
    "expression",
];

/// Array element marker for the 3D light records; resolves to the light union.
const LIGHT_RECORD_MARKER: &str = "light-3d";
const LIGHTS_UNION: &str = "LightsSpecification";
const ROOT_DECLARATION: &str = "StyleSpecification";

pub struct Lowerer<'a> {
    spec: &'a StyleSpec,
    allow_unknown_types: bool,
}

impl<'a> Lowerer<'a> {
    pub fn new(spec: &'a StyleSpec) -> Self {
        Self { spec, allow_unknown_types: false }
    }

    /// Fall back to capitalize-and-suffix for tags that name nothing we know.
    pub fn allow_unknown_types(mut self, allow: bool) -> Self {
        self.allow_unknown_types = allow;
        self
    }

    pub fn spec(&self) -> &'a StyleSpec {
        self.spec
    }

    // ———————————————————————————————— types ————————————————————————————————

    /// Type of one property node. `key` only labels errors.
    pub fn ty(&self, key: &str, node: &PropertySpec) -> Result<Ty> {
        let tag = match &node.ty {
            // spliced blocks are final: never widened
            TypeRef::Inline(block) => return Ok(Ty::Object(self.exact_object(block)?)),
            TypeRef::Tag(tag) => tag.as_str(),
        };
        let base = self.base_ty(key, tag, node)?;

        // strongest capability wins
        let ty = if node.supports_data_driven() {
            wrap(Wrapper::DataDrivenPropertyValue, base)
        } else if node.supports_zoom() {
            wrap(Wrapper::PropertyValue, base)
        } else if node.is_expression() {
            Ty::Expression
        } else {
            base
        };
        Ok(ty)
    }

    fn base_ty(&self, key: &str, tag: &str, node: &PropertySpec) -> Result<Ty> {
        let ty = match tag {
            "string" => Ty::String,
            "number" => Ty::Number,
            "boolean" => Ty::Boolean,
            "enum" => {
                let values = node.values.as_ref().ok_or_else(|| missing_field(key, "values"))?;
                Ty::Literals(values.literals())
            }
            "array" => self.array_ty(key, node)?,
            "$root" => Ty::Ref(ROOT_DECLARATION.to_owned()),
            WILDCARD => Ty::Mixed,
            named => self.named_ty(named)?,
        };
        Ok(ty)
    }

    fn array_ty(&self, key: &str, node: &PropertySpec) -> Result<Ty> {
        let element_key = format!("{key}[]");
        let element = match node.value.as_ref().ok_or_else(|| missing_field(key, "value"))? {
            ElementSpec::Tag(tag) if tag == LIGHT_RECORD_MARKER => {
                return Ok(Ty::List(Box::new(Ty::Ref(LIGHTS_UNION.to_owned()))));
            }
            // scalar shorthand: the element borrows the array's `values`
            ElementSpec::Tag(tag) => {
                let shorthand = PropertySpec {
                    values: node.values.clone(),
                    ..PropertySpec::tag(tag.as_str())
                };
                self.ty(&element_key, &shorthand)?
            }
            ElementSpec::Node(inner) => self.ty(&element_key, inner)?,
        };
        // a zero length is no length
        Ok(match node.length {
            Some(n) if n > 0 => Ty::Tuple(vec![element; n]),
            _ => Ty::List(Box::new(element)),
        })
    }

    fn named_ty(&self, tag: &str) -> Result<Ty> {
        let known = self.spec.contains(tag) || PREAMBLE_TAGS.contains(&tag);
        if !known {
            if !self.allow_unknown_types {
                return Err(SchemaError::UnknownTypeTag { tag: tag.to_owned() });
            }
            tracing::warn!(tag, "unknown type tag; falling back to its capitalized name");
        }
        resolve_type_name(tag).map(Ty::Ref)
    }

    // ——————————————————————————————— objects ———————————————————————————————

    /// Record shape of a mapping: open iff it has a wildcard entry.
    pub fn object(&self, props: &PropertyMap) -> Result<Object> {
        let fields = self.fields(props)?;
        Ok(Object { fields, exact: !props.contains_key(WILDCARD) })
    }

    /// Record shape that is always exact, whatever the mapping contains.
    pub fn exact_object(&self, props: &PropertyMap) -> Result<Object> {
        let fields = self.fields(props)?;
        Ok(Object { fields, exact: true })
    }

    fn fields(&self, props: &PropertyMap) -> Result<Vec<Field>> {
        props
            .iter()
            .map(|(key, node)| {
                let field_key = if key == WILDCARD {
                    FieldKey::Indexer
                } else {
                    FieldKey::Named(key.clone())
                };
                Ok(Field { key: field_key, ty: self.ty(key, node)?, required: node.required })
            })
            .collect()
    }

    pub fn declaration(&self, name: &str, props: &PropertyMap) -> Result<Decl> {
        Ok(Decl::Object { name: name.to_owned(), object: self.object(props)? })
    }

    /// Declaration for a whole top-level section.
    pub fn section(&self, key: &str, name: &str) -> Result<Decl> {
        self.declaration(name, &self.spec.properties(key)?)
    }
}

fn wrap(wrapper: Wrapper, inner: Ty) -> Ty {
    Ty::Wrapped { wrapper, inner: Box::new(inner) }
}

fn missing_field(key: &str, field: &'static str) -> SchemaError {
    SchemaError::MissingField { key: key.to_owned(), field }
}

//! Polymorphic families: one declaration per variant tag, plus their union.
//!
//! Variants of the light and layer families are derived from a shared
//! template mapping. Derivation clones the template and edits the clone; the
//! template itself is never touched, so variants are independent of each
//! other and of the order they are produced in.
use serde::Serialize;

use crate::error::{Result, SchemaError};
use crate::ir::Decl;
use crate::lower::Lowerer;
use crate::naming;
use crate::schema::{PropertyMap, PropertySpec, StyleSpec, TypeRef};

/// Key of the discriminant property in every template.
pub const DISCRIMINANT: &str = "type";

/// Template keys that never apply to a concrete variant.
const NEVER_APPLICABLE: &[&str] = &["ref", "paint.*"];

const SOURCE_FIELDS: &[&str] = &["source", "source-layer", "filter"];
const ZOOM_FIELDS: &[&str] = &["minzoom", "maxzoom"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    Source,
    Light,
    Layer,
}

/// Per-tag exclusions for the layer family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerRules {
    /// tags without a geometric source
    pub sourceless: Vec<String>,
    /// tags without a zoom range
    pub unzoomable: Vec<String>,
}

impl Default for LayerRules {
    fn default() -> Self {
        Self {
            sourceless: vec!["background".into(), "sky".into(), "slot".into()],
            unzoomable: vec!["slot".into()],
        }
    }
}

/// A family's variant declarations followed by the union over them.
#[derive(Debug, Clone, PartialEq)]
pub struct FamilyDecls {
    pub family: Family,
    pub variants: Vec<Decl>,
    pub union: Decl,
}

impl Family {
    pub const ALL: [Family; 3] = [Family::Source, Family::Light, Family::Layer];

    pub fn label(self) -> &'static str {
        match self {
            Family::Source => "source",
            Family::Light => "light",
            Family::Layer => "layer",
        }
    }

    pub fn union_name(self) -> &'static str {
        match self {
            Family::Source => "SourceSpecification",
            Family::Light => "LightsSpecification",
            Family::Layer => "LayerSpecification",
        }
    }

    /// Section holding the shared template; sources have none.
    pub fn template_key(self) -> Option<&'static str> {
        match self {
            Family::Source => None,
            Family::Light => Some("light-3d"),
            Family::Layer => Some("layer"),
        }
    }

    pub fn resolve_name(self, tag: &str) -> Result<String> {
        match self {
            Family::Source => naming::resolve_source_name(tag),
            Family::Light => naming::resolve_light_name(tag),
            Family::Layer => naming::resolve_layer_name(tag),
        }
    }

    /// Variant tags in schema order.
    pub fn tags(self, spec: &StyleSpec) -> Result<Vec<String>> {
        let tags = match self.template_key() {
            None => spec.string_list("source")?,
            Some(template) => {
                let props = spec.properties(template)?;
                let discriminant = props.get(DISCRIMINANT).ok_or_else(|| SchemaError::MissingProperty {
                    section: template.to_owned(),
                    key: DISCRIMINANT.to_owned(),
                })?;
                discriminant.values.as_ref().map(|v| v.keys()).unwrap_or_default()
            }
        };
        if tags.is_empty() {
            return Err(SchemaError::MissingVariantTags { family: self.label() });
        }
        Ok(tags)
    }
}

/// The template specialized for one tag. `base` is left as it was.
/// Sources have no template: their variant is their own section.
pub fn derive_variant(
    spec: &StyleSpec,
    family: Family,
    base: &PropertyMap,
    tag: &str,
    rules: &LayerRules,
) -> Result<PropertyMap> {
    match family {
        Family::Source => spec.properties(tag),
        Family::Light => derive_light(spec, base, tag),
        Family::Layer => derive_layer(spec, base, tag, rules),
    }
}

fn stamped(base: &PropertyMap, tag: &str) -> PropertyMap {
    let mut props = base.clone();
    // replaces in place, keeping the discriminant's position
    props.insert(DISCRIMINANT.to_owned(), PropertySpec::literal(tag));
    props
}

fn derive_light(spec: &StyleSpec, base: &PropertyMap, tag: &str) -> Result<PropertyMap> {
    let mut props = stamped(base, tag);
    splice_block(spec, "light-3d", &mut props, "properties", &format!("properties_light_{tag}"))?;
    Ok(props)
}

fn derive_layer(spec: &StyleSpec, base: &PropertyMap, tag: &str, rules: &LayerRules) -> Result<PropertyMap> {
    let mut props = stamped(base, tag);
    for key in NEVER_APPLICABLE {
        props.shift_remove(*key);
    }
    splice_block(spec, "layer", &mut props, "paint", &format!("paint_{tag}"))?;
    splice_block(spec, "layer", &mut props, "layout", &format!("layout_{tag}"))?;

    if rules.sourceless.iter().any(|t| t == tag) {
        for key in SOURCE_FIELDS {
            props.shift_remove(*key);
        }
    } else {
        props.get_mut("source").ok_or_else(|| missing("layer", "source"))?.required = true;
    }
    if rules.unzoomable.iter().any(|t| t == tag) {
        for key in ZOOM_FIELDS {
            props.shift_remove(*key);
        }
    }
    Ok(props)
}

// Swap `field` for the inline `block` section, or drop it when there is none.
fn splice_block(
    spec: &StyleSpec,
    template: &str,
    props: &mut PropertyMap,
    field: &str,
    block: &str,
) -> Result<()> {
    match spec.optional_properties(block)? {
        Some(block) => {
            props.get_mut(field).ok_or_else(|| missing(template, field))?.ty = TypeRef::Inline(block);
        }
        None => {
            props.shift_remove(field);
        }
    }
    Ok(())
}

fn missing(section: &str, key: &str) -> SchemaError {
    SchemaError::MissingProperty { section: section.to_owned(), key: key.to_owned() }
}

/// Every variant declaration of `family`, then the union over them.
pub fn expand_family(lowerer: &Lowerer<'_>, family: Family, rules: &LayerRules) -> Result<FamilyDecls> {
    let spec = lowerer.spec();
    let tags = family.tags(spec)?;
    let base = match family.template_key() {
        Some(template) => spec.properties(template)?,
        None => PropertyMap::new(),
    };

    let mut variants = Vec::with_capacity(tags.len());
    for tag in &tags {
        let name = family.resolve_name(tag)?;
        let props = derive_variant(spec, family, &base, tag, rules)?;
        tracing::debug!(family = family.label(), tag = tag.as_str(), name = name.as_str(), "derived variant");
        variants.push(lowerer.declaration(&name, &props)?);
    }

    let union = Decl::Union {
        name: family.union_name().to_owned(),
        members: variants.iter().map(|d| d.name().to_owned()).collect(),
    };
    Ok(FamilyDecls { family, variants, union })
}

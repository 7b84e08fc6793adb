//! Schema keys → declaration names.
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::error::{Result, SchemaError};

static SOURCE_KEY: Lazy<Regex> = Lazy::new(|| Regex::new(r"source_(.)(.*)").expect("static regex"));

/// Upper-case the first character, leave the rest alone.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `resolvedImage` → `ResolvedImageSpecification`.
pub fn specification_name(tag: &str) -> String {
    format!("{}Specification", capitalize(tag))
}

/// [`specification_name`] for a type tag, rejecting tags that do not yield an
/// identifier (`light-3d` would give `Light-3dSpecification`).
pub fn resolve_type_name(tag: &str) -> Result<String> {
    checked("type", tag, specification_name(tag))
}

/// `source_raster_dem` → `RasterDEMSourceSpecification`,
/// `source_geojson` → `GeoJSONSourceSpecification`.
pub fn resolve_source_name(key: &str) -> Result<String> {
    if !SOURCE_KEY.is_match(key) {
        return Err(unresolvable("source", key));
    }
    let name = SOURCE_KEY.replace(key, |caps: &Captures| {
        format!("{}{}SourceSpecification", capitalize(&caps[1]), &caps[2])
    });
    let name = name.replacen("_dem", "DEM", 1).replacen("Geojson", "GeoJSON", 1);
    checked("source", key, name)
}

/// `directional` → `DirectionalLightSpecification`.
pub fn resolve_light_name(key: &str) -> Result<String> {
    checked("light", key, format!("{}LightSpecification", pascal_segments(key)))
}

/// `fill-extrusion` → `FillExtrusionLayerSpecification`.
pub fn resolve_layer_name(key: &str) -> Result<String> {
    checked("layer", key, format!("{}LayerSpecification", pascal_segments(key)))
}

fn pascal_segments(key: &str) -> String {
    key.split('-').map(capitalize).collect()
}

// The key must contribute something, and the result must be usable as an identifier.
fn checked(family: &'static str, key: &str, name: String) -> Result<String> {
    let valid = !key.is_empty()
        && name.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid { Ok(name) } else { Err(unresolvable(family, key)) }
}

fn unresolvable(family: &'static str, key: &str) -> SchemaError {
    SchemaError::UnresolvableName { family, key: key.to_owned() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_names() {
        assert_eq!(resolve_source_name("source_vector").unwrap(), "VectorSourceSpecification");
        assert_eq!(resolve_source_name("source_raster").unwrap(), "RasterSourceSpecification");
        assert_eq!(resolve_source_name("source_raster_dem").unwrap(), "RasterDEMSourceSpecification");
        assert_eq!(resolve_source_name("source_geojson").unwrap(), "GeoJSONSourceSpecification");
        assert_eq!(resolve_source_name("source_image").unwrap(), "ImageSourceSpecification");
        // only `_dem` is treated as an acronym
        assert_eq!(resolve_source_name("source_raster_array").unwrap(), "Raster_arraySourceSpecification");
    }

    #[test]
    fn light_and_layer_names() {
        assert_eq!(resolve_light_name("ambient").unwrap(), "AmbientLightSpecification");
        assert_eq!(resolve_light_name("directional").unwrap(), "DirectionalLightSpecification");
        assert_eq!(resolve_layer_name("fill").unwrap(), "FillLayerSpecification");
        assert_eq!(resolve_layer_name("fill-extrusion").unwrap(), "FillExtrusionLayerSpecification");
        assert_eq!(resolve_layer_name("raster-particle").unwrap(), "RasterParticleLayerSpecification");
    }

    #[test]
    fn unresolvable_keys_fail() {
        for key in ["vector", "source_", ""] {
            assert!(
                matches!(resolve_source_name(key), Err(SchemaError::UnresolvableName { family: "source", .. })),
                "{key:?} should not resolve"
            );
        }
        assert!(resolve_layer_name("").is_err());
        assert!(resolve_layer_name("3d").is_err());
        assert!(resolve_light_name("has space").is_err());
    }

    #[test]
    fn specification_names() {
        assert_eq!(specification_name("color"), "ColorSpecification");
        assert_eq!(specification_name("resolvedImage"), "ResolvedImageSpecification");
        assert_eq!(specification_name("promoteId"), "PromoteIdSpecification");
        assert_eq!(resolve_type_name("resolvedImage").unwrap(), "ResolvedImageSpecification");
        assert!(matches!(
            resolve_type_name("light-3d"),
            Err(SchemaError::UnresolvableName { family: "type", key }) if key == "light-3d"
        ));
    }
}

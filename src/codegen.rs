//! Document assembly and Flow printing.
//!
//! `assemble` drives lowering over the whole reference document and returns
//! the declarations in output order; `Codegen` prints them. The textual order
//! is fixed: preamble, top-level sections, sources, the model alias, 3D
//! lights, layers.
pub mod preamble;

use serde::Serialize;

use crate::error::Result;
use crate::ir::{Decl, Field, FieldKey, Object, Ty};
use crate::lower::Lowerer;
use crate::schema::StyleSpec;
use crate::variant::{expand_family, Family, FamilyDecls, LayerRules};

/// Top-level sections, in output order, with their declaration names.
pub const SECTIONS: &[(&str, &str)] = &[
    ("$root", "StyleSpecification"),
    ("sources", "SourcesSpecification"),
    ("models", "ModelsSpecification"),
    ("light", "LightSpecification"),
    ("terrain", "TerrainSpecification"),
    ("fog", "FogSpecification"),
    ("camera", "CameraSpecification"),
    ("projection", "ProjectionSpecification"),
    ("import", "ImportSpecification"),
    ("config", "ConfigSpecification"),
    ("schema", "SchemaSpecification"),
    ("option", "OptionSpecification"),
];

const MODEL_SECTION: &str = "model";
const MODEL_DECLARATION: &str = "ModelSpecification";

/// Sections the families and the model alias are built from.
const FAMILY_SECTIONS: &[&str] = &["source", MODEL_SECTION, "light-3d", "layer"];

const INDENT: &str = "    ";

// ————————————————————————————————————————————————————————————————————————————
// CONFIG
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Treat unknown type tags as references to `<Tag>Specification`
    /// instead of failing.
    pub allow_unknown_types: bool,
    pub layer_rules: LayerRules,
}

// ————————————————————————————————————————————————————————————————————————————
// ASSEMBLY
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub sections: Vec<Decl>,
    pub sources: FamilyDecls,
    pub model: Decl,
    pub lights: FamilyDecls,
    pub layers: FamilyDecls,
}

pub fn assemble(spec: &StyleSpec, config: &Config) -> Result<Document> {
    // an absent section is reported as such, not as a dangling reference to it
    require_sections(spec)?;
    let lowerer = Lowerer::new(spec).allow_unknown_types(config.allow_unknown_types);

    let sections = SECTIONS
        .iter()
        .map(|(key, name)| lowerer.section(key, name))
        .collect::<Result<Vec<_>>>()?;

    let sources = expand_family(&lowerer, Family::Source, &config.layer_rules)?;
    let model = Decl::Alias {
        name: MODEL_DECLARATION.to_owned(),
        ty: lowerer.ty(MODEL_SECTION, &spec.property(MODEL_SECTION)?)?,
    };
    let lights = expand_family(&lowerer, Family::Light, &config.layer_rules)?;
    let layers = expand_family(&lowerer, Family::Layer, &config.layer_rules)?;

    Ok(Document { sections, sources, model, lights, layers })
}

fn require_sections(spec: &StyleSpec) -> Result<()> {
    SECTIONS
        .iter()
        .map(|(key, _)| *key)
        .chain(FAMILY_SECTIONS.iter().copied())
        .try_for_each(|key| spec.section(key).map(drop))
}

impl Document {
    /// All declarations, in output order.
    pub fn declarations(&self) -> impl Iterator<Item = &Decl> {
        self.sections
            .iter()
            .chain(family_decls(&self.sources))
            .chain(std::iter::once(&self.model))
            .chain(family_decls(&self.lights))
            .chain(family_decls(&self.layers))
    }

    pub fn get(&self, name: &str) -> Option<&Decl> {
        self.declarations().find(|d| d.name() == name)
    }

    pub fn manifest(&self) -> Manifest {
        let family = |f: &FamilyDecls| FamilyManifest {
            family: f.family,
            union: f.union.name().to_owned(),
            variants: f.variants.iter().map(|d| d.name().to_owned()).collect(),
        };
        Manifest {
            sections: self.sections.iter().map(|d| d.name().to_owned()).collect(),
            model: self.model.name().to_owned(),
            sources: family(&self.sources),
            lights: family(&self.lights),
            layers: family(&self.layers),
        }
    }
}

fn family_decls(f: &FamilyDecls) -> impl Iterator<Item = &Decl> {
    f.variants.iter().chain(std::iter::once(&f.union))
}

/// Names of everything a document declares, grouped the way it is emitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Manifest {
    pub sections: Vec<String>,
    pub model: String,
    pub sources: FamilyManifest,
    pub lights: FamilyManifest,
    pub layers: FamilyManifest,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FamilyManifest {
    pub family: Family,
    pub union: String,
    pub variants: Vec<String>,
}

/// Assemble and print in one go.
pub fn generate(spec: &StyleSpec, config: &Config) -> Result<String> {
    let document = assemble(spec, config)?;
    let mut cg = Codegen::new();
    cg.emit(&document);
    let out = cg.into_string();
    tracing::info!(
        declarations = document.declarations().count(),
        bytes = out.len(),
        "generated flow declarations"
    );
    Ok(out)
}

// ————————————————————————————————————————————————————————————————————————————
// PRINTING
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Default)]
pub struct Codegen {
    out: String,
}

impl Codegen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, document: &Document) {
        self.out.push_str(preamble::HEADER);
        self.out.push('\n');
        self.out.push_str(preamble::PREAMBLE);
        for decl in document.declarations() {
            self.out.push_str("\n\n");
            self.emit_decl(decl);
        }
        self.out.push('\n');
    }

    pub fn emit_decl(&mut self, decl: &Decl) {
        match decl {
            Decl::Object { name, object } => {
                self.out.push_str(&format!("export type {name} = "));
                self.write_object(object, 0);
            }
            Decl::Alias { name, ty } => {
                self.out.push_str(&format!("export type {name} = "));
                self.write_ty(ty, 0);
                self.out.push(';');
            }
            Decl::Union { name, members } => {
                self.out.push_str(&format!("export type {name} ="));
                for member in members {
                    self.out.push_str(&format!("\n{INDENT}| {member}"));
                }
                self.out.push(';');
            }
        }
    }

    pub fn into_string(self) -> String {
        self.out
    }

    /// `depth` is the nesting level of the enclosing object.
    fn write_ty(&mut self, ty: &Ty, depth: usize) {
        match ty {
            Ty::String => self.out.push_str("string"),
            Ty::Number => self.out.push_str("number"),
            Ty::Boolean => self.out.push_str("boolean"),
            Ty::Mixed => self.out.push_str("mixed"),
            Ty::Expression => self.out.push_str("ExpressionSpecification"),
            Ty::Ref(name) => self.out.push_str(name),
            Ty::Literals(lits) => self.out.push_str(&lits.join(" | ")),
            Ty::List(item) => {
                self.out.push_str("Array<");
                self.write_ty(item, depth);
                self.out.push('>');
            }
            Ty::Tuple(elems) => {
                self.out.push('[');
                for (i, elem) in elems.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.write_ty(elem, depth);
                }
                self.out.push(']');
            }
            Ty::Wrapped { wrapper, inner } => {
                self.out.push_str(wrapper.name());
                self.out.push('<');
                self.write_ty(inner, depth);
                self.out.push('>');
            }
            Ty::Object(object) => self.write_object(object, depth + 1),
        }
    }

    fn write_object(&mut self, object: &Object, depth: usize) {
        let seal = if object.exact { "|" } else { "" };
        self.out.push('{');
        self.out.push_str(seal);
        self.out.push('\n');
        for (i, field) in object.fields.iter().enumerate() {
            if i > 0 {
                self.out.push_str(",\n");
            }
            self.out.push_str(&INDENT.repeat(depth + 1));
            self.write_field(field, depth);
        }
        self.out.push('\n');
        self.out.push_str(&INDENT.repeat(depth));
        self.out.push_str(seal);
        self.out.push('}');
    }

    fn write_field(&mut self, field: &Field, depth: usize) {
        match &field.key {
            FieldKey::Indexer => self.out.push_str("[_: string]: "),
            FieldKey::Named(key) => {
                self.out.push_str(&serde_json::Value::String(key.clone()).to_string());
                if !field.required {
                    self.out.push('?');
                }
                self.out.push_str(": ");
            }
        }
        self.write_ty(&field.ty, depth);
    }
}

/// A single type expression as text, at top level.
pub fn render_ty(ty: &Ty) -> String {
    let mut cg = Codegen::new();
    cg.write_ty(ty, 0);
    cg.into_string()
}

pub fn render_decl(decl: &Decl) -> String {
    let mut cg = Codegen::new();
    cg.emit_decl(decl);
    cg.into_string()
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Wrapper;

    fn field(key: &str, ty: Ty, required: bool) -> Field {
        Field { key: FieldKey::Named(key.into()), ty, required }
    }

    #[test]
    fn scalar_and_composite_types() {
        assert_eq!(render_ty(&Ty::Literals(vec!["\"map\"".into(), "\"viewport\"".into()])), "\"map\" | \"viewport\"");
        assert_eq!(render_ty(&Ty::List(Box::new(Ty::String))), "Array<string>");
        assert_eq!(render_ty(&Ty::Tuple(vec![Ty::Number; 3])), "[number, number, number]");
        assert_eq!(
            render_ty(&Ty::Wrapped {
                wrapper: Wrapper::DataDrivenPropertyValue,
                inner: Box::new(Ty::Ref("ColorSpecification".into()))
            }),
            "DataDrivenPropertyValueSpecification<ColorSpecification>"
        );
        assert_eq!(render_ty(&Ty::Expression), "ExpressionSpecification");
        assert_eq!(render_ty(&Ty::Mixed), "mixed");
    }

    #[test]
    fn exact_object_declaration() {
        let decl = Decl::Object {
            name: "TerrainSpecification".into(),
            object: Object {
                fields: vec![
                    field("source", Ty::String, true),
                    field("exaggeration", Ty::Number, false),
                ],
                exact: true,
            },
        };
        assert_eq!(
            render_decl(&decl),
            "export type TerrainSpecification = {|\n    \"source\": string,\n    \"exaggeration\"?: number\n|}"
        );
    }

    #[test]
    fn open_object_declaration() {
        let decl = Decl::Object {
            name: "SourcesSpecification".into(),
            object: Object {
                fields: vec![Field { key: FieldKey::Indexer, ty: Ty::Ref("SourceSpecification".into()), required: false }],
                exact: false,
            },
        };
        assert_eq!(
            render_decl(&decl),
            "export type SourcesSpecification = {\n    [_: string]: SourceSpecification\n}"
        );
    }

    #[test]
    fn nested_object_is_indented_one_level() {
        let paint = Object { fields: vec![field("fill-opacity", Ty::Number, false)], exact: true };
        let decl = Decl::Object {
            name: "FillLayerSpecification".into(),
            object: Object {
                fields: vec![
                    field("type", Ty::Literals(vec!["\"fill\"".into()]), true),
                    field("paint", Ty::Object(paint), false),
                ],
                exact: true,
            },
        };
        assert_eq!(
            render_decl(&decl),
            "export type FillLayerSpecification = {|\n    \"type\": \"fill\",\n    \"paint\"?: {|\n        \"fill-opacity\"?: number\n    |}\n|}"
        );
    }

    #[test]
    fn union_and_alias_declarations() {
        let union = Decl::Union {
            name: "LightsSpecification".into(),
            members: vec!["AmbientLightSpecification".into(), "FlatLightSpecification".into()],
        };
        assert_eq!(
            render_decl(&union),
            "export type LightsSpecification =\n    | AmbientLightSpecification\n    | FlatLightSpecification;"
        );
        let alias = Decl::Alias { name: "ModelSpecification".into(), ty: Ty::String };
        assert_eq!(render_decl(&alias), "export type ModelSpecification = string;");
    }

    #[test]
    fn keys_are_json_quoted() {
        let obj = Object { fields: vec![field("a\"b", Ty::Boolean, true)], exact: true };
        assert_eq!(render_ty(&Ty::Object(obj)), "{|\n        \"a\\\"b\": boolean\n    |}");
    }
}

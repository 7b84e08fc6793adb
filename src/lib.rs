//! Flow type declarations for the map style specification.
//!
//! Pipeline: [`schema`] (typed view of the reference JSON) → [`lower`] and
//! [`variant`] (property nodes and polymorphic families to [`ir`]) →
//! [`codegen`] (document order and Flow text).
//!
//! ```no_run
//! use stylespec_typegen::{codegen, schema::StyleSpec};
//!
//! let src = std::fs::read_to_string("v8.json")?;
//! let spec = StyleSpec::parse(&src)?;
//! let flow = codegen::generate(&spec, &codegen::Config::default())?;
//! std::fs::write("types.js", flow)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
pub mod codegen;
pub mod error;
pub mod ir;
pub mod lower;
pub mod naming;
pub mod path_de;
pub mod schema;
pub mod variant;

pub use codegen::{assemble, generate, Config};
pub use error::SchemaError;
pub use schema::StyleSpec;

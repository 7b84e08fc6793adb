//! Failure modes of the generator.
//!
//! Every variant is a schema-integrity failure: something the generator
//! assumes about the reference document does not hold. None of them are
//! recoverable; the run aborts and no output is written.

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("style specification is not valid JSON (at {path}): {message}")]
    MalformedDocument { path: String, message: String },

    #[error("section `{key}` not found in the style specification")]
    MissingSection { key: String },

    #[error("property `{key}` not found in section `{section}`")]
    MissingProperty { section: String, key: String },

    #[error("section `{key}` is malformed at {path}: {message}")]
    MalformedSection {
        key: String,
        path: String,
        message: String,
    },

    #[error("property `{key}` has no `{field}` field")]
    MissingField { key: String, field: &'static str },

    #[error("unknown type tag `{tag}`")]
    UnknownTypeTag { tag: String },

    #[error("cannot derive a {family} declaration name from `{key}`")]
    UnresolvableName { family: &'static str, key: String },

    #[error("no variant tags declared for the {family} family")]
    MissingVariantTags { family: &'static str },
}

pub type Result<T, E = SchemaError> = std::result::Result<T, E>;

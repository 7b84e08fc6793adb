use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;

/// A deserialization failure together with the JSON path it happened at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathError {
    pub path: String,
    pub message: String,
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "at JSON path {} → {}", self.path, self.message)
    }
}

/// Deserialize with JSON-path context in error messages. Anything but
/// whitespace after the top-level value is an error.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, PathError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    let value = serde_path_to_error::deserialize::<_, T>(&mut *de).map_err(|err| PathError {
        path: err.path().to_string(),
        message: err.into_inner().to_string(),
    })?;
    de.end().map_err(|err| PathError {
        path: ".".to_owned(),
        message: err.to_string(),
    })?;
    Ok(value)
}

/// Same as [`from_str_with_path`], for an already parsed subtree.
pub fn from_value_with_path<T: DeserializeOwned>(value: &Value) -> Result<T, PathError> {
    serde_path_to_error::deserialize::<_, T>(value).map_err(|err| PathError {
        path: err.path().to_string(),
        message: err.into_inner().to_string(),
    })
}

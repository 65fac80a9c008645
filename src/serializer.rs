//! Encoding of the whole database file. Defaults to JSON via serde_json.
//!
//! The file is a single JSON object; each collection lives under its own key
//! as an array of documents. Implement [`Serializer`] to change how that
//! object turns into bytes (indentation, a different text format, ...).

use crate::error::{Error, Result};
use serde_json::{Map, Value};

/// Top-level object of the database file: collection name to contents.
pub type FileImage = Map<String, Value>;

/// Converts a [`FileImage`] to and from bytes for persistence.
pub trait Serializer: Send + Sync {
    /// Encode the image to bytes.
    fn serialize(&self, image: &FileImage) -> Result<Vec<u8>>;

    /// Decode bytes back into an image. Anything but a JSON object at the top
    /// level is a [`Error::Deserialize`].
    fn deserialize(&self, bytes: &[u8]) -> Result<FileImage>;
}

/// JSON serializer with optional pretty-printing.
#[derive(Debug, Clone, Default)]
pub struct JsonSerializer {
    pretty: bool,
}

impl JsonSerializer {
    /// Compact JSON (single line, no extra whitespace).
    pub fn new() -> Self {
        Self::default()
    }

    /// Indented JSON, easier to read and diff by hand.
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl Serializer for JsonSerializer {
    fn serialize(&self, image: &FileImage) -> Result<Vec<u8>> {
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(image)
        } else {
            serde_json::to_vec(image)
        };
        bytes.map_err(Error::from)
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<FileImage> {
        match serde_json::from_slice::<Value>(bytes)? {
            Value::Object(image) => Ok(image),
            other => Err(Error::Deserialize(format!(
                "expected a JSON object at the top level, found {}",
                kind(&other)
            ))),
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

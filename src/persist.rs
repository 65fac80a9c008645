//! Disk I/O helpers: load a collection out of the database file and write the
//! file back atomically.
//!
//! The rename-over approach is close to atomic on most platforms. On FAT32 or
//! network shares there are no hard guarantees.

use crate::document::{document_id, Document};
use crate::error::{Error, Result};
use crate::serializer::{FileImage, Serializer};
use serde_json::Value;
use std::path::Path;

/// What [`load`] found in the file.
#[derive(Debug, Default)]
pub struct Loaded {
    /// Documents of the requested collection, in file order.
    pub docs: Vec<Document>,
    /// Every other top-level key, carried along so saves don't drop it.
    pub rest: FileImage,
}

/// Read the file at `path` and pull out collection `name`. A missing or empty
/// file, or a file without that key, yields an empty collection.
pub fn load<S: Serializer>(path: &Path, name: &str, serializer: &S) -> Result<Loaded> {
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Loaded::default()),
        Err(e) => return Err(Error::Io(e.to_string())),
    };
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Loaded::default());
    }

    let mut rest = serializer.deserialize(&bytes)?;
    let docs = match rest.remove(name) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .into_iter()
            .map(|item| into_document(item, name))
            .collect::<Result<_>>()?,
        Some(_) => {
            return Err(Error::Deserialize(format!(
                "collection `{name}` is not an array"
            )))
        }
    };
    Ok(Loaded { docs, rest })
}

fn into_document(item: Value, name: &str) -> Result<Document> {
    match item {
        Value::Object(doc) if document_id(&doc).is_some() => Ok(doc),
        Value::Object(_) => Err(Error::Deserialize(format!(
            "document in `{name}` has no string `id`"
        ))),
        _ => Err(Error::Deserialize(format!(
            "collection `{name}` holds a non-object entry"
        ))),
    }
}

/// Build the full file image: `rest` plus `name` mapped to `docs`.
pub fn image(rest: &FileImage, name: &str, docs: Vec<Document>) -> FileImage {
    let mut image = rest.clone();
    image.insert(
        name.to_owned(),
        Value::Array(docs.into_iter().map(Value::Object).collect()),
    );
    image
}

/// Write `bytes` to `<path>.tmp` and then rename over `path`. This avoids
/// leaving a half-written file if the process crashes mid-write.
pub fn atomic_write(path: &Path, bytes: &[u8]) -> Result<()> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
    let tmp = path.with_extension(format!("{ext}.tmp"));
    std::fs::write(&tmp, bytes).map_err(|e| Error::Io(e.to_string()))?;
    std::fs::rename(&tmp, path).map_err(|e| Error::Io(e.to_string()))?;
    Ok(())
}

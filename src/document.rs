//! Documents are open JSON objects; the only field the store cares about is `id`.

use serde_json::{Map, Value};

/// A stored record. Any JSON object with a string `id` qualifies.
pub type Document = Map<String, Value>;

/// Name of the key field every stored document carries.
pub const ID_FIELD: &str = "id";

/// Length of generated ids.
pub const ID_LEN: usize = 8;

const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

/// The document's `id`, if it has a string one.
#[must_use]
pub fn document_id(doc: &Document) -> Option<&str> {
    doc.get(ID_FIELD).and_then(Value::as_str)
}

/// Fresh opaque id: [`ID_LEN`] URL-safe characters drawn from a v4 UUID.
///
/// Not sortable and not sequential. Uniqueness within a collection is the
/// collection's job (it retries on collision), see
/// [`Collection::create`](crate::Collection::create).
#[must_use]
pub fn new_id() -> String {
    let bytes = uuid::Uuid::new_v4().into_bytes();
    // 6 random bits per symbol; byte 6 and 8 carry version/variant bits so
    // read from the tail of the buffer.
    let mut bits = u64::from_be_bytes([
        bytes[9], bytes[10], bytes[11], bytes[12], bytes[13], bytes[14], bytes[15], bytes[0],
    ]);
    let mut id = String::with_capacity(ID_LEN);
    for _ in 0..ID_LEN {
        id.push(char::from(ALPHABET[(bits & 0x3f) as usize]));
        bits >>= 6;
    }
    id
}

/// Copy every field of `patch` onto `target`. Same-name fields are overwritten,
/// the rest of `target` is left alone. `id` in the patch is skipped so a
/// stored record never changes identity.
pub fn shallow_merge(target: &mut Document, patch: Document) {
    for (key, value) in patch {
        if key == ID_FIELD {
            continue;
        }
        target.insert(key, value);
    }
}

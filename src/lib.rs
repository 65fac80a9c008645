//! A small REST API for books over a persistent, flat-file JSON collection.
//!
//! The store half is a named collection of JSON documents keyed by `id`, held
//! in a pluggable concurrent map (ShardMap, `RwLock<HashMap>`, DashMap) and
//! written to disk according to a flush policy (immediate / async / manual).
//! The HTTP half maps `GET/POST/PUT/DELETE /books` onto it with axum.
//!
//! ```rust,no_run
//! use bookshelf::{Collection, DefaultBackend};
//! use serde_json::json;
//!
//! let books = Collection::<DefaultBackend>::open("db.json", "books").unwrap();
//! let fields = json!({"title": "Dune", "author": "Herbert"});
//! let dune = books.create(fields.as_object().cloned().unwrap()).unwrap();
//! assert_eq!(dune["title"], "Dune");
//! ```
//!
//! **Single-process only.** Two processes opening the same file will clobber
//! each other.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod collection;
pub mod config;
pub mod document;
pub mod error;
pub mod flush;
pub mod http;
pub mod logging;
pub mod persist;
pub mod serializer;

pub use backend::{DocumentBackend, Entry};
pub use collection::{Collection, CollectionBuilder, CollectionHandle};
pub use config::Config;
pub use document::Document;
pub use error::{Error, Result};
pub use flush::FlushPolicy;
pub use http::{router, AppState, MissingIdPolicy};

/// Default backend: ShardMap keyed by document id.
pub type DefaultBackend = shardmap::ShardMap<String, Entry>;

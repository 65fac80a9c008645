//! Shared request state.

use crate::collection::CollectionHandle;
use std::sync::Arc;

/// What update and delete do when the id is unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingIdPolicy {
    /// Answer 404, like get.
    #[default]
    Strict,
    /// Answer 200 and change nothing: `null` for update, empty for delete.
    Lenient,
}

/// State handed to every handler. The collection is opened once by the
/// caller and shared by reference.
pub struct AppState<M> {
    books: Arc<CollectionHandle<M>>,
    missing_ids: MissingIdPolicy,
}

impl<M> AppState<M> {
    /// Wrap an opened collection.
    pub fn new(books: Arc<CollectionHandle<M>>, missing_ids: MissingIdPolicy) -> Self {
        Self { books, missing_ids }
    }

    /// The book collection.
    pub fn books(&self) -> &CollectionHandle<M> {
        &self.books
    }

    /// Unknown-id behavior for update and delete.
    pub fn missing_ids(&self) -> MissingIdPolicy {
        self.missing_ids
    }
}

impl<M> Clone for AppState<M> {
    fn clone(&self) -> Self {
        Self {
            books: Arc::clone(&self.books),
            missing_ids: self.missing_ids,
        }
    }
}

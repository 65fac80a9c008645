//! The document collection, its handle, and builder.

use crate::backend::{DocumentBackend, Entry};
use crate::document::{document_id, new_id, shallow_merge, Document, ID_FIELD};
use crate::error::{Error, Result};
use crate::flush::{FlushPolicy, FlushWorker};
use crate::persist::{atomic_write, image, load};
use crate::serializer::{FileImage, JsonSerializer, Serializer};
use parking_lot::Mutex;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc;
use std::sync::Arc;

/// Named, persistent collection of JSON documents keyed by `id`.
///
/// Generic over the map backend `M`. Use [`open`](Self::open) for a quick
/// start or [`builder`](Self::builder) for control over flush policy and
/// pretty-printing.
///
/// Each single operation is as atomic as the backend makes it. Nothing spans
/// operations: [`assign`](Self::assign) is get-merge-put, so two writers on
/// the same id can interleave.
pub struct Collection<M> {
    pub(crate) map: Arc<M>,
    pub(crate) sink: Sink,
    pub(crate) policy: FlushPolicy,
    pub(crate) trigger: Option<mpsc::SyncSender<()>>,
    pub(crate) next_seq: AtomicU64,
}

impl<M> Collection<M>
where
    M: DocumentBackend + 'static,
{
    /// Open (or create) collection `name` in the file at `path`, flushing after
    /// every write, compact JSON.
    pub fn open(path: impl AsRef<Path>, name: impl Into<String>) -> Result<CollectionHandle<M>>
    where
        M: Default,
    {
        Self::builder(path, name).build()
    }

    /// Open with a specific flush policy. Shorthand for
    /// `builder(path, name).policy(p).build()`.
    pub fn open_with_policy(
        path: impl AsRef<Path>,
        name: impl Into<String>,
        policy: FlushPolicy,
    ) -> Result<CollectionHandle<M>>
    where
        M: Default,
    {
        Self::builder(path, name).policy(policy).build()
    }

    /// Start configuring a collection. Call
    /// [`.build()`](CollectionBuilder::build) when ready.
    pub fn builder(path: impl AsRef<Path>, name: impl Into<String>) -> CollectionBuilder<M>
    where
        M: Default,
    {
        CollectionBuilder::new(path, name.into())
    }

    // ---- reads ----

    /// Every document, in storage order.
    #[must_use]
    pub fn all(&self) -> Vec<Document> {
        ordered(self.map.as_ref())
    }

    /// The document with this id, or `None`.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<Document> {
        self.map.get(id).map(|entry| entry.doc)
    }

    /// `true` if a document with this id exists.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.map.contains(id)
    }

    /// Number of documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.count()
    }

    /// `true` when the collection has no documents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Collection name, i.e. its key in the database file.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.sink.name
    }

    /// Path to the backing JSON file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.sink.path
    }

    // ---- writes ----

    /// Store `fields` as a new document under a freshly generated id. An `id`
    /// in `fields` is ignored. Returns the stored document.
    pub fn create(&self, fields: Document) -> Result<Document> {
        let id = loop {
            let candidate = new_id();
            if !self.map.contains(&candidate) {
                break candidate;
            }
        };

        let mut doc = Document::with_capacity(fields.len() + 1);
        doc.insert(ID_FIELD.to_owned(), Value::String(id.clone()));
        for (key, value) in fields {
            if key != ID_FIELD {
                doc.insert(key, value);
            }
        }

        self.map.put(id, self.entry(doc.clone()));
        self.notify_mutation()?;
        Ok(doc)
    }

    /// Store a document that already carries a string `id`, replacing any
    /// previous one with that id (which keeps its place in storage order).
    /// Returns the replaced document.
    pub fn insert(&self, doc: Document) -> Result<Option<Document>> {
        let id = document_id(&doc).ok_or(Error::MissingId)?.to_owned();
        let entry = match self.map.get(&id) {
            Some(prev) => Entry { seq: prev.seq, doc },
            None => self.entry(doc),
        };
        let prev = self.map.put(id, entry);
        self.notify_mutation()?;
        Ok(prev.map(|entry| entry.doc))
    }

    /// Shallow-merge `patch` onto the document with this id and return the
    /// merged result. `None` (and no write) when the id is absent.
    pub fn assign(&self, id: &str, patch: Document) -> Result<Option<Document>> {
        let Some(mut entry) = self.map.get(id) else {
            return Ok(None);
        };
        shallow_merge(&mut entry.doc, patch);
        let updated = entry.doc.clone();
        self.map.put(id.to_owned(), entry);
        self.notify_mutation()?;
        Ok(Some(updated))
    }

    /// Remove the document with this id, returning it if it was present.
    pub fn remove(&self, id: &str) -> Result<Option<Document>> {
        let Some(prev) = self.map.remove(id) else {
            return Ok(None);
        };
        self.notify_mutation()?;
        Ok(Some(prev.doc))
    }

    /// Drop every document.
    pub fn clear(&self) -> Result<()> {
        self.map.clear();
        self.notify_mutation()
    }

    // ---- persistence ----

    /// Write the collection to disk (atomic temp-file + rename).
    pub fn flush(&self) -> Result<()> {
        self.sink.write(self.map.as_ref())
    }

    // ---- internal ----

    fn entry(&self, doc: Document) -> Entry {
        Entry {
            seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
            doc,
        }
    }

    fn notify_mutation(&self) -> Result<()> {
        match &self.policy {
            FlushPolicy::Immediate => self.flush()?,
            FlushPolicy::Async(_) => {
                if let Some(t) = &self.trigger {
                    let _ = t.try_send(());
                }
            }
            FlushPolicy::Manual => {}
        }
        Ok(())
    }
}

impl<M> std::fmt::Debug for Collection<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection")
            .field("name", &self.sink.name)
            .field("path", &self.sink.path)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

fn ordered<M: DocumentBackend>(map: &M) -> Vec<Document> {
    let mut entries: Vec<Entry> = map.snapshot().into_iter().map(|(_, e)| e).collect();
    entries.sort_by_key(|e| e.seq);
    entries.into_iter().map(|e| e.doc).collect()
}

/// Everything needed to write the file, shareable with the flush thread.
#[derive(Clone)]
pub(crate) struct Sink {
    path: PathBuf,
    name: String,
    serializer: JsonSerializer,
    rest: Arc<FileImage>,
    // Serializes writers so two flushes never race on the temp file.
    lock: Arc<Mutex<()>>,
}

impl Sink {
    fn write<M: DocumentBackend>(&self, map: &M) -> Result<()> {
        let _guard = self.lock.lock();
        let docs = ordered(map);
        let count = docs.len();
        let bytes = self
            .serializer
            .serialize(&image(&self.rest, &self.name, docs))?;
        atomic_write(&self.path, &bytes)?;
        tracing::trace!(collection = %self.name, documents = count, "flushed");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Configures and opens a [`Collection`].
///
/// ```rust,no_run
/// use bookshelf::{Collection, DefaultBackend, FlushPolicy};
///
/// let books = Collection::<DefaultBackend>::builder("db.json", "books")
///     .policy(FlushPolicy::Manual)
///     .pretty(true)
///     .build()
///     .unwrap();
/// ```
pub struct CollectionBuilder<M> {
    path: PathBuf,
    name: String,
    policy: FlushPolicy,
    pretty: bool,
    _marker: std::marker::PhantomData<M>,
}

impl<M> CollectionBuilder<M>
where
    M: DocumentBackend + Default + 'static,
{
    fn new(path: impl AsRef<Path>, name: String) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            name,
            policy: FlushPolicy::Immediate,
            pretty: false,
            _marker: std::marker::PhantomData,
        }
    }

    /// Set the flush policy (default: [`FlushPolicy::Immediate`]).
    pub fn policy(mut self, policy: FlushPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Write human-readable JSON with indentation (default: compact).
    pub fn pretty(mut self, yes: bool) -> Self {
        self.pretty = yes;
        self
    }

    /// Load (or create) the collection and return a handle.
    pub fn build(self) -> Result<CollectionHandle<M>> {
        if self.name.is_empty() {
            return Err(Error::Config("collection name must not be empty".into()));
        }

        let serializer = if self.pretty {
            JsonSerializer::pretty()
        } else {
            JsonSerializer::new()
        };

        let loaded = load(&self.path, &self.name, &serializer)?;
        let map = Arc::new(M::default());
        let mut seq = 0;
        for doc in loaded.docs {
            // load() only hands back documents with a string id
            let Some(id) = document_id(&doc).map(str::to_owned) else {
                continue;
            };
            map.put(id, Entry { seq, doc });
            seq += 1;
        }
        tracing::debug!(
            collection = %self.name,
            path = %self.path.display(),
            documents = map.count(),
            "collection opened"
        );

        let sink = Sink {
            path: self.path,
            name: self.name,
            serializer,
            rest: Arc::new(loaded.rest),
            lock: Arc::new(Mutex::new(())),
        };

        let (worker, trigger) = match &self.policy {
            FlushPolicy::Async(interval) => {
                let (tx, rx) = mpsc::sync_channel(0);
                let map_ref = Arc::clone(&map);
                let sink_ref = sink.clone();
                let w = FlushWorker::spawn(*interval, rx, move || {
                    if let Err(err) = sink_ref.write(map_ref.as_ref()) {
                        tracing::warn!(collection = %sink_ref.name, error = %err, "background flush failed");
                    }
                });
                (Some(w), Some(tx))
            }
            _ => (None, None),
        };

        let collection = Collection {
            map,
            sink,
            policy: self.policy,
            trigger,
            next_seq: AtomicU64::new(seq),
        };

        Ok(CollectionHandle {
            inner: Arc::new(collection),
            worker,
        })
    }
}

impl<M> std::fmt::Debug for CollectionBuilder<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionBuilder")
            .field("path", &self.path)
            .field("name", &self.name)
            .field("policy", &self.policy)
            .field("pretty", &self.pretty)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

/// Owns the collection and (for async policy) the background flush thread.
///
/// Derefs to [`Collection`]. Dropping it joins the background thread if one
/// is running, which may block for up to one flush interval.
pub struct CollectionHandle<M> {
    pub(crate) inner: Arc<Collection<M>>,
    pub(crate) worker: Option<FlushWorker>,
}

impl<M> std::ops::Deref for CollectionHandle<M> {
    type Target = Collection<M>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<M> Drop for CollectionHandle<M> {
    fn drop(&mut self) {
        // Only the sender keeps the worker loop alive; hang up before joining.
        if let Some(inner) = Arc::get_mut(&mut self.inner) {
            inner.trigger = None;
        }
        self.worker.take();
    }
}

impl<M> std::fmt::Debug for CollectionHandle<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(&*self.inner, f)
    }
}

use bookshelf::{Collection, DefaultBackend, Document, FlushPolicy};
use serde_json::{json, Value};
use std::time::{Duration, Instant};

fn temp_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("bookshelf_test_{}.json", name))
}

fn doc(value: Value) -> Document {
    value.as_object().cloned().unwrap()
}

#[test]
fn manual_flush_only_on_call() {
    let path = temp_path("manual");
    let _ = std::fs::remove_file(&path);
    let books =
        Collection::<DefaultBackend>::open_with_policy(&path, "books", FlushPolicy::Manual)
            .unwrap();
    books.insert(doc(json!({"id": "a"}))).unwrap();
    assert!(!path.exists());
    books.flush().unwrap();
    drop(books);

    let books = Collection::<DefaultBackend>::open(&path, "books").unwrap();
    assert!(books.contains("a"));
    let _ = std::fs::remove_file(&path);
}

#[test]
fn immediate_flush_after_every_write() {
    let path = temp_path("immediate");
    let _ = std::fs::remove_file(&path);
    let books = Collection::<DefaultBackend>::open(&path, "books").unwrap();

    let book = books.create(doc(json!({"title": "Dune"}))).unwrap();
    let id = book["id"].as_str().unwrap();
    let reopened = Collection::<DefaultBackend>::open(&path, "books").unwrap();
    assert!(reopened.contains(id));
    drop(reopened);

    books.assign(id, doc(json!({"title": "Dune Messiah"}))).unwrap();
    let reopened = Collection::<DefaultBackend>::open(&path, "books").unwrap();
    assert_eq!(reopened.find(id).unwrap()["title"], "Dune Messiah");
    drop(reopened);

    books.remove(id).unwrap();
    let reopened = Collection::<DefaultBackend>::open(&path, "books").unwrap();
    assert!(reopened.is_empty());
    let _ = std::fs::remove_file(&path);
}

#[test]
fn async_flush_reaches_disk_on_its_own() {
    let path = temp_path("async_timer");
    let _ = std::fs::remove_file(&path);
    let books = Collection::<DefaultBackend>::open_with_policy(
        &path,
        "books",
        FlushPolicy::Async(Duration::from_millis(20)),
    )
    .unwrap();
    books.insert(doc(json!({"id": "q"}))).unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    let mut persisted = false;
    while Instant::now() < deadline {
        if let Ok(raw) = std::fs::read_to_string(&path) {
            if raw.contains("\"q\"") {
                persisted = true;
                break;
            }
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    assert!(persisted);
    drop(books);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn async_flush_worker_graceful_drop() {
    let path = temp_path("async_drop");
    let _ = std::fs::remove_file(&path);
    let books = Collection::<DefaultBackend>::open_with_policy(
        &path,
        "books",
        FlushPolicy::Async(Duration::from_secs(60)),
    )
    .unwrap();
    books.insert(doc(json!({"id": "q"}))).unwrap();
    books.flush().unwrap();

    let started = Instant::now();
    drop(books);
    assert!(started.elapsed() < Duration::from_secs(30));
    let _ = std::fs::remove_file(&path);
}

use chrono::NaiveDate;
use idiom_core::model::{CardId, ProgressMap};
use storage::PROGRESS_KEY;
use storage::json_file::JsonFileProgressStore;
use storage::repository::{ProgressStore, Storage};
use storage::sqlite::SqliteRepository;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn sample_progress() -> ProgressMap {
    let mut progress = ProgressMap::new();
    progress.set_due_date(&CardId::from(2), day(2024, 1, 1));
    progress.set_due_date(&CardId::new("idiom-x"), day(2024, 1, 9));
    progress
}

#[tokio::test]
async fn sqlite_roundtrips_progress_document() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_progress?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    assert!(repo.load().await.unwrap().is_empty());

    let progress = sample_progress();
    repo.save(&progress).await.unwrap();

    let loaded = repo.load().await.unwrap();
    assert_eq!(loaded, progress);

    let raw = repo.get_value(PROGRESS_KEY).await.unwrap().unwrap();
    assert_eq!(
        raw,
        r#"{"2":{"dueDate":"2024-01-01"},"idiom-x":{"dueDate":"2024-01-09"}}"#
    );
}

#[tokio::test]
async fn sqlite_migrations_are_idempotent() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_migrate?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("first migrate");
    repo.migrate().await.expect("second migrate");

    repo.put_value("other", "x").await.unwrap();
    assert_eq!(repo.get_value("other").await.unwrap().as_deref(), Some("x"));
}

#[tokio::test]
async fn sqlite_unparsable_document_loads_empty() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_garbage?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    repo.put_value(PROGRESS_KEY, "{not json").await.unwrap();
    assert!(repo.load().await.unwrap().is_empty());
}

#[tokio::test]
async fn sqlite_file_persists_across_connections() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("progress.sqlite3").display());

    let storage = Storage::open(&url).await.expect("open");
    storage.progress.save(&sample_progress()).await.unwrap();
    drop(storage);

    let reopened = Storage::open(&url).await.expect("reopen");
    assert_eq!(reopened.progress.load().await.unwrap(), sample_progress());
}

#[tokio::test]
async fn json_file_roundtrips_and_creates_parent_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("progress.json");
    let store = JsonFileProgressStore::new(&path);

    assert!(store.load().await.unwrap().is_empty());

    store.save(&sample_progress()).await.unwrap();
    assert_eq!(store.load().await.unwrap(), sample_progress());
    assert!(!path.with_file_name("progress.json.tmp").exists());
}

#[tokio::test]
async fn json_file_with_garbage_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("progress.json");
    std::fs::write(&path, "]]").unwrap();

    let store = JsonFileProgressStore::new(&path);
    assert!(store.load().await.unwrap().is_empty());
}

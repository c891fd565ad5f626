use crate::catalog::CatalogService;
use crate::config::CatalogConfig;
use crate::db::properties::save_properties;
use crate::db::store::{PropertyStore, QueryResult, StoreQuery};
use crate::db::{init_db, Database};
use crate::domain::RawRecord;
use crate::errors::StoreError;
use astra::Response;
use std::io::Read;
use std::ops::Deref;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static NEXT_DB: AtomicUsize = AtomicUsize::new(0);

/// A temp-dir database that deletes its file when dropped.
pub struct TestDb {
    db: Database,
    path: PathBuf,
}

impl Deref for TestDb {
    type Target = Database;

    fn deref(&self) -> &Database {
        &self.db
    }
}

impl PropertyStore for TestDb {
    fn execute(&self, query: &StoreQuery) -> Result<QueryResult, StoreError> {
        self.db.execute(query)
    }
}

impl Drop for TestDb {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
        let _ = std::fs::remove_file(self.path.with_extension("sqlite3-journal"));
    }
}

/// Fresh SQLite file in the temp dir with the production schema applied.
pub fn make_db(name: &str) -> TestDb {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let seq = NEXT_DB.fetch_add(1, Ordering::Relaxed);
    let path = std::env::temp_dir().join(format!("catalog_{name}_{nanos}_{seq}.sqlite3"));

    let db = Database::new(path.to_string_lossy().into_owned());
    init_db(&db).unwrap_or_else(|e| panic!("Database initialization failed: {e}"));
    TestDb { db, path }
}

/// A database seeded with `records` behind a catalog service.
pub fn seeded_catalog(name: &str, records: &[RawRecord]) -> CatalogService<TestDb> {
    seeded_catalog_with(name, records, CatalogConfig::default())
}

pub fn seeded_catalog_with(
    name: &str,
    records: &[RawRecord],
    config: CatalogConfig,
) -> CatalogService<TestDb> {
    let db = make_db(name);
    save_properties(&db, records).expect("seeding failed");
    CatalogService::new(db, config)
}

pub fn raw(v: serde_json::Value) -> RawRecord {
    serde_json::from_value(v).expect("invalid raw record fixture")
}

pub fn body_json(resp: Response) -> serde_json::Value {
    let mut body = String::new();
    resp.into_body()
        .reader()
        .read_to_string(&mut body)
        .expect("unreadable body");
    serde_json::from_str(&body).unwrap_or_else(|e| panic!("not JSON ({e}): {body}"))
}


#![cfg(not(feature = "pg"))]
use book_domain::{BookRecord, BookState};
use book_persistence::DieselBookRepository;
use catalog::{BookRepository, CatalogEngine, CatalogError, CatalogService};
use diesel::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

// Base de datos SQLite temporal en fichero; se borra al salir del test.
struct TempDb {
  path: PathBuf,
}
impl TempDb {
  fn new() -> Self {
    let path = std::env::temp_dir().join(format!("books_test_{}.db", Uuid::new_v4()));
    Self { path }
  }
  fn url(&self) -> String {
    self.path.to_str().unwrap().to_string()
  }
}
impl Drop for TempDb {
  fn drop(&mut self) {
    let _ = std::fs::remove_file(&self.path);
    let _ = std::fs::remove_file(self.path.with_extension("db-wal"));
    let _ = std::fs::remove_file(self.path.with_extension("db-shm"));
  }
}

#[test]
fn diesel_repository_crud_contract() {
  let db = TempDb::new();
  let repo = DieselBookRepository::new(&db.url()).expect("repo");
  let engine = CatalogEngine::new(Arc::new(repo));

  let created = engine.create(&BookRecord::new("0002").with_state("on-hold").with_on_hold("C1")).expect("create");
  engine.create(&BookRecord::new("0001").with_state("available")).expect("create");
  assert!(matches!(engine.create(&BookRecord::new("0001").with_state("available")),
                   Err(CatalogError::Conflict(_))));

  // la marca de tiempo vuelve con la misma precisión con la que se creó
  let loaded = engine.get("0002").expect("read");
  assert_eq!(loaded, created);

  let all = engine.list().expect("list");
  let isbns: Vec<&str> = all.iter().map(|b| b.isbn()).collect();
  assert_eq!(isbns, vec!["0001", "0002"]);

  let out = engine.update(&BookRecord::new("0002").with_state("checked-out")
                                                   .with_checked_out("C1")
                                                   .with_time_created(created.created_at()))
                  .expect("checkout");
  let reloaded = engine.get("0002").expect("reload");
  assert_eq!(reloaded.state(), BookState::CheckedOut);
  assert!(reloaded.on_hold_customer_id().is_none());
  assert_eq!(reloaded.checked_out_customer_id(), Some("C1"));
  assert_eq!(reloaded.updated_at(), out.updated_at());

  engine.delete("0002").expect("delete");
  engine.delete("0002").expect("delete twice");
  assert!(matches!(engine.get("0002"), Err(CatalogError::NotFound(_))));
}

#[test]
fn update_of_missing_row_is_not_found() {
  let db = TempDb::new();
  let repo = DieselBookRepository::new(&db.url()).expect("repo");
  let other = DieselBookRepository::new(&db.url()).expect("second handle");
  let engine = CatalogEngine::new(Arc::new(repo));
  let book = engine.create(&BookRecord::new("0003").with_state("available")).expect("create");
  other.delete("0003").expect("delete through other handle");
  assert!(matches!(other.update(&book), Err(CatalogError::NotFound(_))));
}

#[test]
fn service_over_sql_backend() {
  let db = TempDb::new();
  let service = CatalogService::new(Arc::new(DieselBookRepository::new(&db.url()).expect("repo")));
  assert_eq!(service.create_json(r#"{"isbn":"0010","state":"available"}"#).status, 201);
  let resp = service.update_json(r#"{"isbn":"0010","state":"on-hold","onholdcustomerid":"C2"}"#);
  assert_eq!(resp.status, 200);
  let body = resp.body.unwrap();
  assert_eq!(body["onholdcustomerid"], "C2");
  assert!(body["timeupdated"].is_string());
  assert_eq!(service.delete("0010").status, 204);
  assert_eq!(service.get("0010").status, 404);
}

#[test]
fn corrupt_rows_surface_as_storage_errors() {
  let db = TempDb::new();
  let repo = DieselBookRepository::new(&db.url()).expect("repo");
  let mut conn = SqliteConnection::establish(&db.url()).expect("raw connection");
  diesel::sql_query("INSERT INTO books (isbn, state, created_at) VALUES ('0098', 'lost', '2025-01-01T00:00:00Z')")
    .execute(&mut conn)
    .expect("insert bad state");
  diesel::sql_query("INSERT INTO books (isbn, state, created_at) VALUES ('0099', 'available', 'yesterday')")
    .execute(&mut conn)
    .expect("insert bad timestamp");

  assert!(matches!(repo.read("0098"), Err(CatalogError::Storage(_))));
  assert!(matches!(repo.read("0099"), Err(CatalogError::Storage(_))));
  assert!(matches!(repo.read_all(), Err(CatalogError::Storage(_))));
}

use crate::schema;
use crate::schema::books::dsl as books_dsl;
use book_domain::{Book, BookState, Holding};
use catalog::{BookRepository, CatalogError, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use log::{debug, error};
use std::sync::Arc;
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("./migrations");
#[cfg(feature = "pg")]
type DbConn = PgConnection;
#[cfg(not(feature = "pg"))]
type DbConn = SqliteConnection;
type DbPool = Pool<ConnectionManager<DbConn>>;
/// Repo Diesel que implementa `BookRepository`.
pub struct DieselBookRepository {
  pool: Arc<DbPool>,
}
impl DieselBookRepository {
  /// Crea el pool y aplica las migraciones embebidas.
  pub fn new(database_url: &str) -> Result<Self> {
    let manager = ConnectionManager::<DbConn>::new(database_url);
    let pool = Pool::builder().max_size(4)
                              .build(manager)
                              .map_err(|e| CatalogError::Storage(format!("no se pudo crear el pool de conexiones: {}", e)))?;
    let repo = DieselBookRepository { pool: Arc::new(pool) };
    let mut c = repo.conn()?;
    #[cfg(not(feature = "pg"))]
    {
      let _ = diesel::sql_query("PRAGMA journal_mode = WAL;").execute(&mut c);
      let _ = diesel::sql_query("PRAGMA busy_timeout = 5000;").execute(&mut c);
    }
    c.run_pending_migrations(MIGRATIONS)
     .map_err(|e| CatalogError::Storage(format!("migraciones: {}", e)))?;
    debug!("book-persistence: migraciones aplicadas");
    Ok(repo)
  }
  fn conn(&self) -> Result<PooledConnection<ConnectionManager<DbConn>>> {
    self.pool.get().map_err(|e: r2d2::Error| {
                     error!("pool: {}", e);
                     CatalogError::Storage(format!("pool: {}", e))
                   })
  }
}
// Fila Diesel de la tabla books
#[derive(Debug, Queryable, Insertable, AsChangeset)]
#[diesel(table_name = schema::books)]
#[diesel(primary_key(isbn))]
#[diesel(treat_none_as_null = true)]
struct BookRow {
  pub isbn: String,
  pub state: String,
  pub on_hold_customer_id: Option<String>,
  pub checked_out_customer_id: Option<String>,
  pub created_at: String,
  pub updated_at: Option<String>,
}
impl From<&Book> for BookRow {
  fn from(book: &Book) -> Self {
    BookRow { isbn: book.isbn().to_string(),
              state: book.state().as_str().to_string(),
              on_hold_customer_id: book.on_hold_customer_id().map(str::to_string),
              checked_out_customer_id: book.checked_out_customer_id().map(str::to_string),
              created_at: format_ts(book.created_at()),
              updated_at: book.updated_at().map(format_ts) }
  }
}
impl BookRow {
  /// Reconstruye el libro; una fila incoherente es un fallo de almacenamiento.
  fn into_book(self) -> Result<Book> {
    let corrupt = |what: String| CatalogError::Storage(format!("fila corrupta {}: {}", self.isbn, what));
    let state: BookState = self.state.parse().map_err(|e| corrupt(format!("{}", e)))?;
    let holding = Holding::from_columns(state,
                                        self.on_hold_customer_id.as_deref(),
                                        self.checked_out_customer_id.as_deref()).map_err(|e| corrupt(e.to_string()))?;
    let created_at = parse_ts(&self.created_at).map_err(&corrupt)?;
    let updated_at = match self.updated_at.as_deref() {
      Some(s) => Some(parse_ts(s).map_err(&corrupt)?),
      None => None,
    };
    Book::from_parts(&self.isbn, holding, created_at, updated_at).map_err(|e| corrupt(e.to_string()))
  }
}
fn format_ts(ts: DateTime<Utc>) -> String {
  ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}
fn parse_ts(s: &str) -> std::result::Result<DateTime<Utc>, String> {
  DateTime::parse_from_rfc3339(s).map(|d| d.with_timezone(&Utc)).map_err(|e| format!("timestamp `{}`: {}", s, e))
}
fn map_db_err<T>(res: std::result::Result<T, DieselError>) -> Result<T> {
  res.map_err(|e| CatalogError::Storage(format!("db: {}", e)))
}
impl BookRepository for DieselBookRepository {
  fn create(&self, book: &Book) -> Result<()> {
    let mut conn = self.conn()?;
    let row = BookRow::from(book);
    match diesel::insert_into(schema::books::table).values(&row).execute(&mut conn) {
      Ok(_) => Ok(()),
      Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
        Err(CatalogError::Conflict(format!("book {}", book.isbn())))
      }
      Err(e) => map_db_err(Err(e)),
    }
  }
  fn read(&self, isbn: &str) -> Result<Book> {
    let mut conn = self.conn()?;
    let opt = map_db_err(books_dsl::books.filter(books_dsl::isbn.eq(isbn)).first::<BookRow>(&mut conn).optional())?;
    match opt {
      Some(r) => r.into_book(),
      None => Err(CatalogError::NotFound(format!("book {}", isbn))),
    }
  }
  fn read_all(&self) -> Result<Vec<Book>> {
    let mut conn = self.conn()?;
    let rows = map_db_err(books_dsl::books.order(books_dsl::isbn.asc()).load::<BookRow>(&mut conn))?;
    rows.into_iter().map(BookRow::into_book).collect()
  }
  fn update(&self, book: &Book) -> Result<()> {
    let mut conn = self.conn()?;
    let row = BookRow::from(book);
    let n = map_db_err(diesel::update(books_dsl::books.filter(books_dsl::isbn.eq(book.isbn()))).set(&row)
                                                                                              .execute(&mut conn))?;
    if n == 0 {
      return Err(CatalogError::NotFound(format!("book {}", book.isbn())));
    }
    Ok(())
  }
  fn delete(&self, isbn: &str) -> Result<()> {
    let mut conn = self.conn()?;
    // cero filas afectadas también es éxito: la baja es idempotente
    map_db_err(diesel::delete(books_dsl::books.filter(books_dsl::isbn.eq(isbn))).execute(&mut conn))?;
    Ok(())
  }
}
/// Crea el repo a partir de `BOOKS_DB_URL` (o `DATABASE_URL`). Carga `.env`
/// si existe.
#[cfg(feature = "pg")]
pub fn new_from_env() -> Result<DieselBookRepository> {
  dotenvy::dotenv().ok();
  let url = std::env::var("BOOKS_DB_URL").or_else(|_| std::env::var("DATABASE_URL"))
                                         .map_err(|_| CatalogError::Storage("BOOKS_DB_URL / DATABASE_URL not set".into()))?;
  let l = url.to_lowercase();
  if !(l.starts_with("postgres") || url.contains('@')) {
    return Err(CatalogError::Storage("BOOKS_DB_URL / DATABASE_URL does not look like Postgres URL".into()));
  }
  DieselBookRepository::new(&url)
}
/// Crea el repo a partir de `BOOKS_DB_URL` (o `DATABASE_URL`). Sin ninguna de
/// las dos usa el fichero SQLite `books.db` del directorio actual.
#[cfg(not(feature = "pg"))]
pub fn new_from_env() -> Result<DieselBookRepository> {
  dotenvy::dotenv().ok();
  let url = std::env::var("BOOKS_DB_URL").or_else(|_| std::env::var("DATABASE_URL"))
                                         .unwrap_or_else(|_| "books.db".into());
  let l = url.to_lowercase();
  if l.starts_with("postgres") {
    return Err(CatalogError::Storage("book-persistence was compiled without 'pg' feature; enable the 'pg' feature to \
                                      use Postgres"
                                                   .into()));
  }
  DieselBookRepository::new(&url)
}

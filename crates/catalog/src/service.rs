// Archivo: service.rs
// Propósito: implementar `CatalogService`, el borde de la petición. Recibe
// payloads del cliente, invoca al `CatalogEngine` y traduce cada resultado a
// un código de estado HTTP y un cuerpo JSON. El enrutado HTTP en sí queda
// fuera de este crate.
use crate::engine::CatalogEngine;
use crate::errors::CatalogError;
use crate::repository::BookRepository;
use book_domain::{BookRecord, DomainError, ExactIdentity, IdentityComparator};
use log::error;
use serde::Serialize;
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;

pub const OK: u16 = 200;
pub const CREATED: u16 = 201;
pub const NO_CONTENT: u16 = 204;
pub const INTERNAL_ERROR: u16 = 500;

/// Respuesta lista para escribir en el cable.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub body: Option<JsonValue>,
}

impl Response {
    fn with_body<T: Serialize>(status: u16, body: &T) -> Self {
        match serde_json::to_value(body) {
            Ok(v) => Self { status, body: Some(v) },
            Err(e) => Self::from_error(&CatalogError::Storage(format!("serialización: {}", e))),
        }
    }

    fn empty(status: u16) -> Self {
        Self { status, body: None }
    }

    /// Cuerpo de error: `{"error": <tipo>, "message": <texto>}`.
    pub fn from_error(e: &CatalogError) -> Self {
        if e.status_code() >= INTERNAL_ERROR {
            error!("{}", e);
        }
        Self { status: e.status_code(), body: Some(json!({ "error": e.kind(), "message": e.to_string() })) }
    }
}

/// Servicio de alta nivel que expone las operaciones del catálogo con la
/// semántica de códigos de estado del API:
/// - alta: 201, 400 o 409
/// - lectura: 200 o 404; listado: 200
/// - actualización: 200, 404 o 400
/// - baja: 204 siempre (idempotente)
/// - fallos del almacenamiento: 500
pub struct CatalogService<R, C = ExactIdentity>
    where R: BookRepository
{
    engine: Arc<CatalogEngine<R, C>>,
}

impl<R> CatalogService<R, ExactIdentity> where R: BookRepository
{
    /// Crea el servicio; el `CatalogEngine` se construye internamente.
    pub fn new(repo: Arc<R>) -> Self {
        Self { engine: Arc::new(CatalogEngine::new(repo)) }
    }
}

impl<R, C> CatalogService<R, C>
    where R: BookRepository,
          C: IdentityComparator
{
    pub fn create(&self, record: &BookRecord) -> Response {
        match self.engine.create(record) {
            Ok(book) => Response::with_body(CREATED, &book),
            Err(e) => Response::from_error(&e),
        }
    }

    /// Igual que `create` pero a partir del cuerpo JSON sin interpretar.
    pub fn create_json(&self, body: &str) -> Response {
        match parse_record(body) {
            Ok(record) => self.create(&record),
            Err(e) => Response::from_error(&e),
        }
    }

    pub fn get(&self, isbn: &str) -> Response {
        match self.engine.get(isbn) {
            Ok(book) => Response::with_body(OK, &book),
            Err(e) => Response::from_error(&e),
        }
    }

    pub fn list(&self) -> Response {
        match self.engine.list() {
            Ok(books) => Response::with_body(OK, &books),
            Err(e) => Response::from_error(&e),
        }
    }

    pub fn update(&self, record: &BookRecord) -> Response {
        match self.engine.update(record) {
            Ok(book) => Response::with_body(OK, &book),
            Err(e) => Response::from_error(&e),
        }
    }

    pub fn update_json(&self, body: &str) -> Response {
        match parse_record(body) {
            Ok(record) => self.update(&record),
            Err(e) => Response::from_error(&e),
        }
    }

    /// Baja idempotente: 204 exista o no el isbn. Sólo un fallo del
    /// almacenamiento cambia la respuesta.
    pub fn delete(&self, isbn: &str) -> Response {
        match self.engine.delete(isbn) {
            Ok(()) => Response::empty(NO_CONTENT),
            Err(e) => Response::from_error(&e),
        }
    }
}

fn parse_record(body: &str) -> Result<BookRecord, CatalogError> {
    serde_json::from_str(body).map_err(|e| CatalogError::Domain(DomainError::invalid_field("body", e.to_string())))
}

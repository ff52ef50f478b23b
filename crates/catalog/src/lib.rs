//! Crate `catalog` — contrato de almacenamiento y orquestación del catálogo
//! de libros.
//!
//! Este crate define el contrato de persistencia `BookRepository`, una
//! implementación en memoria (`InMemoryBookRepository`), el motor
//! `CatalogEngine` que aplica las reglas de `book-domain` de forma atómica
//! por isbn, y `CatalogService`, que traduce resultados a códigos de estado.
//!
//! Ejemplo rápido:
//! ```rust
//! use catalog::{CatalogService, InMemoryBookRepository};
//! use std::sync::Arc;
//! let service = CatalogService::new(Arc::new(InMemoryBookRepository::new()));
//! let resp = service.create_json(r#"{"isbn":"0001","state":"available"}"#);
//! assert_eq!(resp.status, 201);
//! ```
pub mod engine;
pub mod errors;
pub mod repository;
pub mod service;
pub mod stubs;

pub use engine::*;
pub use errors::*;
pub use repository::*;
pub use service::{CatalogService, Response};
pub use stubs::*;

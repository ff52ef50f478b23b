//! Persistencia SQL para el trait `BookRepository`.
//! Este archivo expone el módulo `schema` y reexporta el repositorio Diesel;
//! la implementación detallada está en `book_persistence.rs`.

mod book_persistence;
pub mod schema;

pub use book_persistence::{new_from_env, DieselBookRepository, MIGRATIONS};

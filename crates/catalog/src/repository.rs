// Archivo: repository.rs
// Propósito: definir el trait `BookRepository`, el contrato que deben
// implementar las persistencias de libros (SQL, in-memory, etc.).
use crate::errors::Result;
use book_domain::Book;

/// Contrato mínimo del almacén de libros, indexado por isbn.
///
/// El repositorio no valida reglas de negocio: sólo guarda lo que el motor
/// del catálogo ya aceptó.
pub trait BookRepository: Send + Sync {
    /// Inserta un libro nuevo. Retorna `Conflict` si el isbn ya existe.
    fn create(&self, book: &Book) -> Result<()>;

    /// Lee un libro por isbn. Retorna `NotFound` si no existe.
    fn read(&self, isbn: &str) -> Result<Book>;

    /// Lista todos los libros.
    fn read_all(&self) -> Result<Vec<Book>>;

    /// Reemplaza un libro existente. Retorna `NotFound` si el isbn no existe.
    fn update(&self, book: &Book) -> Result<()>;

    /// Elimina por isbn. Idempotente: no falla si el isbn no existe.
    fn delete(&self, isbn: &str) -> Result<()>;
}

// Archivo: engine.rs
// Propósito: implementar `CatalogEngine`, que encadena validadores, motor de
// transiciones y repositorio, y serializa por isbn las secuencias
// leer-validar-escribir.
use crate::errors::{CatalogError, Result};
use crate::repository::BookRepository;
use book_domain::{check_consistency, new_book, require_update_fields, validate_fields, Book, BookRecord, ExactIdentity,
                  IdentityComparator, TransitionEngine, TransitionRequest};
use chrono::Utc;
use dashmap::DashMap;
use log::{info, warn};
use std::sync::{Arc, Mutex};

/// Motor del catálogo.
///
/// Responsabilidades:
/// - Alta: validación de campos + validación semántica, luego `create`.
/// - Actualización: presencia, campos, control optimista y transición.
/// - Exclusión mutua por isbn: dos peticiones sobre el mismo libro nunca
///   intercalan su validación y su escritura. Peticiones sobre libros
///   distintos no se bloquean entre sí.
pub struct CatalogEngine<R, C = ExactIdentity>
    where R: BookRepository
{
    repo: Arc<R>,
    transitions: TransitionEngine<C>,
    /// Un mutex por isbn. La entrada se retira cuando nadie más la usa, así
    /// que la tabla sólo guarda los isbn con peticiones en curso.
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl<R> CatalogEngine<R, ExactIdentity> where R: BookRepository
{
    /// Crea el motor con comparación de identidad exacta.
    pub fn new(repo: Arc<R>) -> Self {
        Self::with_identity(repo, ExactIdentity)
    }
}

impl<R, C> CatalogEngine<R, C>
    where R: BookRepository,
          C: IdentityComparator
{
    /// Crea el motor con un comparador de identidad propio.
    pub fn with_identity(repo: Arc<R>, identity: C) -> Self {
        Self { repo, transitions: TransitionEngine::with_identity(identity), locks: DashMap::new() }
    }

    /// Ejecuta `f` con el mutex del isbn tomado.
    fn with_isbn_lock<T>(&self, isbn: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let slot = self.locks.entry(isbn.to_string()).or_default().clone();
        let result = match slot.lock() {
            Ok(_guard) => f(),
            Err(e) => Err(CatalogError::Storage(format!("mutex poisoned: {:?}", e))),
        };
        drop(slot);
        // Sólo la tabla retiene el mutex: nadie espera por este isbn.
        self.locks.remove_if(isbn, |_, m| Arc::strong_count(m) == 1);
        result
    }

    /// Da de alta un libro. El isbn duplicado lo detecta el repositorio.
    pub fn create(&self, record: &BookRecord) -> Result<Book> {
        let book = new_book(record, Utc::now()).inspect_err(|e| warn!("alta rechazada: {}", e))?;
        self.with_isbn_lock(book.isbn(), || self.repo.create(&book))?;
        info!("alta de {}", book);
        Ok(book)
    }

    pub fn get(&self, isbn: &str) -> Result<Book> {
        self.repo.read(isbn)
    }

    pub fn list(&self) -> Result<Vec<Book>> {
        self.repo.read_all()
    }

    /// Aplica una petición de cambio de estado y devuelve el libro
    /// resultante. Sólo escribe en el repositorio si hubo mutación.
    pub fn update(&self, record: &BookRecord) -> Result<Book> {
        let (isbn, _) = require_update_fields(record)?;
        validate_fields(record)?;
        let request = TransitionRequest::from_record(record)?;
        self.with_isbn_lock(isbn, || {
                let stored = self.repo.read(isbn)?;
                check_consistency(record, &stored)?;
                let transition = self.transitions.apply(&stored, &request, Utc::now())?;
                if transition.changed {
                    self.repo.update(&transition.book)?;
                }
                Ok(transition.book)
            })
            .inspect_err(|e| warn!("actualización de {} rechazada: {}", isbn, e))
    }

    /// Elimina un libro. No falla si el isbn no existe.
    pub fn delete(&self, isbn: &str) -> Result<()> {
        self.with_isbn_lock(isbn, || self.repo.delete(isbn))?;
        info!("baja de {}", isbn);
        Ok(())
    }
}

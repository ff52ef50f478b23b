// Archivo: stubs.rs
// Propósito: repositorio en memoria para pruebas, demos y el backend por
// defecto del binario. No es durable.
use crate::errors::{CatalogError, Result};
use crate::repository::BookRepository;
use book_domain::Book;
use indexmap::IndexMap;
use std::sync::{Mutex, MutexGuard};

/// Repositorio en memoria. Conserva el orden de inserción en `read_all`.
#[derive(Debug, Default)]
pub struct InMemoryBookRepository {
    books: Mutex<IndexMap<String, Book>>,
}

impl InMemoryBookRepository {
    /// Crea una nueva instancia vacía.
    pub fn new() -> Self {
        Self::default()
    }

    /// Helper para mapear `Mutex::lock()` en un `Result` con
    /// `CatalogError::Storage`.
    fn lock(&self) -> Result<MutexGuard<'_, IndexMap<String, Book>>> {
        self.books.lock().map_err(|e| CatalogError::Storage(format!("mutex poisoned: {:?}", e)))
    }
}

impl BookRepository for InMemoryBookRepository {
    fn create(&self, book: &Book) -> Result<()> {
        let mut books = self.lock()?;
        if books.contains_key(book.isbn()) {
            return Err(CatalogError::Conflict(format!("book {}", book.isbn())));
        }
        books.insert(book.isbn().to_string(), book.clone());
        Ok(())
    }

    fn read(&self, isbn: &str) -> Result<Book> {
        self.lock()?
            .get(isbn)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(format!("book {}", isbn)))
    }

    fn read_all(&self) -> Result<Vec<Book>> {
        Ok(self.lock()?.values().cloned().collect())
    }

    fn update(&self, book: &Book) -> Result<()> {
        let mut books = self.lock()?;
        match books.get_mut(book.isbn()) {
            Some(slot) => {
                *slot = book.clone();
                Ok(())
            }
            None => Err(CatalogError::NotFound(format!("book {}", book.isbn()))),
        }
    }

    fn delete(&self, isbn: &str) -> Result<()> {
        // shift_remove mantiene el orden del resto de entradas
        self.lock()?.shift_remove(isbn);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use book_domain::{new_book, BookRecord};
    use chrono::Utc;
    use std::sync::Arc;

    fn book(isbn: &str) -> Book {
        new_book(&BookRecord::new(isbn).with_state("available"), Utc::now()).unwrap()
    }

    #[test]
    fn create_rejects_duplicates() {
        let repo = InMemoryBookRepository::new();
        repo.create(&book("0001")).unwrap();
        assert!(matches!(repo.create(&book("0001")), Err(CatalogError::Conflict(_))));
    }

    #[test]
    fn read_all_keeps_insertion_order_after_delete() {
        let repo = InMemoryBookRepository::new();
        for isbn in ["0003", "0001", "0002"] {
            repo.create(&book(isbn)).unwrap();
        }
        repo.delete("0001").unwrap();
        let isbns: Vec<String> = repo.read_all().unwrap().iter().map(|b| b.isbn().to_string()).collect();
        assert_eq!(isbns, vec!["0003", "0002"]);
    }

    #[test]
    fn update_and_read_missing_are_not_found() {
        let repo = InMemoryBookRepository::new();
        assert!(matches!(repo.read("nope"), Err(CatalogError::NotFound(_))));
        assert!(matches!(repo.update(&book("nope")), Err(CatalogError::NotFound(_))));
        // delete es idempotente
        assert!(repo.delete("nope").is_ok());
    }

    #[test]
    fn mutex_poisoning_returns_storage_error() {
        use std::thread;

        let repo = Arc::new(InMemoryBookRepository::new());
        let r2 = repo.clone();
        let handle = thread::spawn(move || {
            let _g = r2.books.lock().unwrap();
            panic!("force poison");
        });
        let _ = handle.join();

        match repo.read_all() {
            Err(CatalogError::Storage(_)) => (),
            other => panic!("expected Storage, got {:?}", other),
        }
    }
}

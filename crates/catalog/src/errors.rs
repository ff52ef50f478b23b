// Archivo: errors.rs
// Propósito: errores del catálogo y el alias Result<T> usado por las APIs
// del crate. Los errores de dominio se envuelven sin perder su tipo.
use book_domain::DomainError;
use thiserror::Error;

/// Errores de las operaciones del catálogo.
///
/// - `Domain`: validación o transición rechazada (4xx).
/// - `NotFound`: no existe un libro con ese isbn.
/// - `Conflict`: ya existe un libro con ese isbn.
/// - `Storage`: fallo del almacenamiento (5xx).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    /// Entidad no encontrada.
    #[error("No encontrado: {0}")]
    NotFound(String),
    /// Identificador duplicado en el alta.
    #[error("Conflicto: {0}")]
    Conflict(String),
    /// Error genérico de almacenamiento (BD, mutex envenenado, etc.).
    #[error("Error de almacenamiento: {0}")]
    Storage(String),
}

impl CatalogError {
    /// Código HTTP con el que el borde de la petición informa este error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Domain(_) => 400,
            Self::NotFound(_) => 404,
            Self::Conflict(_) => 409,
            Self::Storage(_) => 500,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Domain(e) => e.kind(),
            Self::NotFound(_) => "NotFound",
            Self::Conflict(_) => "Conflict",
            Self::Storage(_) => "Storage",
        }
    }
}

/// Alias de resultado usado por las APIs del crate.
pub type Result<T> = std::result::Result<T, CatalogError>;

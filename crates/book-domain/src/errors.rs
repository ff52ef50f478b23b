// errors.rs
use crate::BookState;
use thiserror::Error;

/// Errores de validación y de transición del ciclo de vida de un libro.
///
/// Ninguno es fatal: todos se recuperan en el borde de la petición y se
/// traducen a una respuesta 4xx con mensaje.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
  /// Valor primitivo fuera de rango (cadena vacía, estado desconocido...).
  #[error("Campo inválido `{field}`: {reason}")]
  InvalidField { field: String, reason: String },
  /// Campo requerido ausente.
  #[error("Campo requerido ausente: `{0}`")]
  MissingField(&'static str),
  /// El estado pedido exige un titular que no viene en la petición.
  #[error("Identidad requerida ausente: `{0}`")]
  MissingIdentity(&'static str),
  /// Un campo de identidad presente/ausente no es coherente con el estado.
  #[error("Conflicto semántico: {0}")]
  SemanticConflict(String),
  /// El cliente intentó fijar un campo que sólo escribe el servidor.
  #[error("El cliente no puede fijar `{0}`")]
  ClientSuppliedTimestamp(&'static str),
  /// Control optimista: la marca de tiempo enviada no coincide con la guardada.
  #[error("Escritura obsoleta: `{0}` no coincide con el registro almacenado")]
  StaleWrite(&'static str),
  /// Combinación incorrecta de campos de identidad para la transición.
  #[error("Forma de identidad inválida: {0}")]
  IdentityShape(String),
  /// La identidad declarada no es la del titular actual.
  #[error("La identidad `{claimed}` no coincide con el titular actual")]
  IdentityMismatch { claimed: String },
  /// No existe camino legal entre el estado actual y el pedido.
  #[error("Transición inválida de {from} a {to}")]
  InvalidTransition { from: BookState, to: BookState },
}

impl DomainError {
  pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
    Self::InvalidField { field: field.into(), reason: reason.into() }
  }

  /// Nombre estable de la variante, usado en los cuerpos de error.
  pub fn kind(&self) -> &'static str {
    match self {
      Self::InvalidField { .. } => "InvalidField",
      Self::MissingField(_) => "MissingField",
      Self::MissingIdentity(_) => "MissingIdentity",
      Self::SemanticConflict(_) => "SemanticConflict",
      Self::ClientSuppliedTimestamp(_) => "ClientSuppliedTimestamp",
      Self::StaleWrite(_) => "StaleWrite",
      Self::IdentityShape(_) => "IdentityShapeError",
      Self::IdentityMismatch { .. } => "IdentityMismatch",
      Self::InvalidTransition { .. } => "InvalidTransition",
    }
  }
}

pub type Result<T> = std::result::Result<T, DomainError>;

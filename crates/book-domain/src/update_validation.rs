// update_validation.rs
use crate::book::fields;
use crate::{Book, BookRecord, BookState, DomainError};

/// Toda petición de actualización debe traer `isbn` y el estado pedido.
/// Devuelve ambos ya interpretados.
pub fn require_update_fields(record: &BookRecord) -> Result<(&str, BookState), DomainError> {
  let isbn = record.isbn.as_deref().ok_or(DomainError::MissingField(fields::ISBN))?;
  let state = record.state.as_deref().ok_or(DomainError::MissingField(fields::STATE))?;
  Ok((isbn, state.parse()?))
}

/// Control optimista: las marcas de tiempo que envíe el cliente deben
/// coincidir exactamente con las almacenadas. No enviar ninguna desactiva
/// la comprobación.
pub fn check_consistency(record: &BookRecord, stored: &Book) -> Result<(), DomainError> {
  if let Some(created) = record.time_created {
    if created != stored.created_at() {
      return Err(DomainError::StaleWrite(fields::TIME_CREATED));
    }
  }
  if let Some(updated) = record.time_updated {
    // Sin `updated_at` guardado el cliente cree en una actualización que
    // nunca ocurrió.
    match stored.updated_at() {
      Some(current) if current == updated => {}
      _ => return Err(DomainError::StaleWrite(fields::TIME_UPDATED)),
    }
  }
  Ok(())
}

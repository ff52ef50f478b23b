// create_validation.rs
use crate::book::fields;
use crate::field_validation::validate_fields;
use crate::{Book, BookRecord, BookState, DomainError, Holding};
use chrono::{DateTime, Utc};

/// Valida una petición de alta y devuelve el libro resultante con
/// `created_at = now` y sin `updated_at`.
///
/// Orden de comprobación (gana el primer fallo): `isbn` presente, `state`
/// presente, validación de campos, reglas por estado y por último la regla
/// de marcas de tiempo. La unicidad del `isbn` la comprueba el repositorio.
pub fn new_book(record: &BookRecord, now: DateTime<Utc>) -> Result<Book, DomainError> {
  let isbn = record.isbn.as_deref().ok_or(DomainError::MissingField(fields::ISBN))?;
  let state = record.state.as_deref().ok_or(DomainError::MissingField(fields::STATE))?;
  validate_fields(record)?;
  let state: BookState = state.parse()?;
  let holding = creation_holding(state, record)?;
  reject_client_timestamps(record)?;
  Ok(Book::new(isbn, holding, now))
}

fn creation_holding(state: BookState, record: &BookRecord) -> Result<Holding, DomainError> {
  let on_hold = record.on_hold_customer_id.as_deref();
  let checked_out = record.checked_out_customer_id.as_deref();
  match state {
    BookState::Available => {
      if on_hold.is_some() {
        return Err(conflict(fields::ON_HOLD_CUSTOMER_ID, state));
      }
      if checked_out.is_some() {
        return Err(conflict(fields::CHECKED_OUT_CUSTOMER_ID, state));
      }
      Ok(Holding::Available)
    }
    BookState::OnHold => {
      if checked_out.is_some() {
        return Err(conflict(fields::CHECKED_OUT_CUSTOMER_ID, state));
      }
      Ok(Holding::OnHold(required_holder(fields::ON_HOLD_CUSTOMER_ID, on_hold)?))
    }
    BookState::CheckedOut => {
      if on_hold.is_some() {
        return Err(conflict(fields::ON_HOLD_CUSTOMER_ID, state));
      }
      Ok(Holding::CheckedOut(required_holder(fields::CHECKED_OUT_CUSTOMER_ID, checked_out)?))
    }
  }
}

fn required_holder(field: &'static str, value: Option<&str>) -> Result<String, DomainError> {
  match value {
    None => Err(DomainError::MissingIdentity(field)),
    Some("") => Err(DomainError::invalid_field(field, "no puede estar vacío")),
    Some(c) => Ok(c.to_string()),
  }
}

fn conflict(field: &str, state: BookState) -> DomainError {
  DomainError::SemanticConflict(format!("`{}` no está permitido en estado {}", field, state))
}

fn reject_client_timestamps(record: &BookRecord) -> Result<(), DomainError> {
  if record.time_created.is_some() {
    return Err(DomainError::ClientSuppliedTimestamp(fields::TIME_CREATED));
  }
  if record.time_updated.is_some() {
    return Err(DomainError::ClientSuppliedTimestamp(fields::TIME_UPDATED));
  }
  Ok(())
}

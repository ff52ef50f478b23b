// field_validation.rs
use crate::book::fields;
use crate::{BookRecord, BookState, DomainError};

/// Valida cada campo presente de forma aislada. Los campos ausentes siempre
/// se aceptan en esta etapa.
pub fn validate_fields(record: &BookRecord) -> Result<(), DomainError> {
  non_empty(fields::ISBN, record.isbn.as_deref())?;
  if let Some(state) = record.state.as_deref() {
    state.parse::<BookState>()?;
  }
  non_empty(fields::ON_HOLD_CUSTOMER_ID, record.on_hold_customer_id.as_deref())?;
  non_empty(fields::CHECKED_OUT_CUSTOMER_ID, record.checked_out_customer_id.as_deref())?;
  Ok(())
}

fn non_empty(field: &str, value: Option<&str>) -> Result<(), DomainError> {
  match value {
    Some("") => Err(DomainError::invalid_field(field, "no puede estar vacío")),
    _ => Ok(()),
  }
}

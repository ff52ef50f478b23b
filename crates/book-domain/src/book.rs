// book.rs
use crate::DomainError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Nombres de los campos tal como viajan en el cable.
pub mod fields {
  pub const ISBN: &str = "isbn";
  pub const STATE: &str = "state";
  pub const ON_HOLD_CUSTOMER_ID: &str = "onholdcustomerid";
  pub const CHECKED_OUT_CUSTOMER_ID: &str = "checkedoutcustomerid";
  pub const TIME_CREATED: &str = "timecreated";
  pub const TIME_UPDATED: &str = "timeupdated";
}

/// Estados posibles de un libro del catálogo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BookState {
  Available,
  OnHold,
  CheckedOut,
}

impl BookState {
  pub const ALL: [BookState; 3] = [BookState::Available, BookState::OnHold, BookState::CheckedOut];

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Available => "available",
      Self::OnHold => "on-hold",
      Self::CheckedOut => "checked-out",
    }
  }
}

impl FromStr for BookState {
  type Err = DomainError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "available" => Ok(Self::Available),
      "on-hold" => Ok(Self::OnHold),
      "checked-out" => Ok(Self::CheckedOut),
      other => Err(DomainError::invalid_field(fields::STATE,
                                              format!("`{}` no es uno de available | on-hold | checked-out", other))),
    }
  }
}

impl fmt::Display for BookState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Estado con su titular. Un libro apartado o prestado siempre tiene
/// exactamente un cliente asociado; uno disponible no tiene ninguno.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Holding {
  Available,
  OnHold(String),
  CheckedOut(String),
}

impl Holding {
  pub fn state(&self) -> BookState {
    match self {
      Self::Available => BookState::Available,
      Self::OnHold(_) => BookState::OnHold,
      Self::CheckedOut(_) => BookState::CheckedOut,
    }
  }

  pub fn on_hold_customer_id(&self) -> Option<&str> {
    match self {
      Self::OnHold(c) => Some(c),
      _ => None,
    }
  }

  pub fn checked_out_customer_id(&self) -> Option<&str> {
    match self {
      Self::CheckedOut(c) => Some(c),
      _ => None,
    }
  }

  /// Reconstruye el estado a partir de sus columnas sueltas, exigiendo que
  /// los campos de identidad sean coherentes con el estado.
  pub fn from_columns(state: BookState, on_hold: Option<&str>, checked_out: Option<&str>) -> Result<Self, DomainError> {
    match (state, on_hold, checked_out) {
      (BookState::Available, None, None) => Ok(Self::Available),
      (BookState::OnHold, Some(c), None) if !c.is_empty() => Ok(Self::OnHold(c.to_string())),
      (BookState::CheckedOut, None, Some(c)) if !c.is_empty() => Ok(Self::CheckedOut(c.to_string())),
      (state, on_hold, checked_out) => {
        Err(DomainError::SemanticConflict(format!("estado {} incompatible con onholdcustomerid={:?} \
                                                   checkedoutcustomerid={:?}",
                                                  state, on_hold, checked_out)))
      }
    }
  }
}

/// Libro almacenado. Sólo se construye a través de la validación de alta o
/// del motor de transiciones, por lo que sus invariantes se cumplen siempre.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "BookRecord")]
pub struct Book {
  isbn: String,
  holding: Holding,
  created_at: DateTime<Utc>,
  updated_at: Option<DateTime<Utc>>,
}

impl Book {
  pub(crate) fn new(isbn: &str, holding: Holding, created_at: DateTime<Utc>) -> Self {
    Self { isbn: isbn.to_string(), holding, created_at, updated_at: None }
  }

  /// Rehidrata un libro desde almacenamiento.
  pub fn from_parts(isbn: &str,
                    holding: Holding,
                    created_at: DateTime<Utc>,
                    updated_at: Option<DateTime<Utc>>)
                    -> Result<Self, DomainError> {
    if isbn.is_empty() {
      return Err(DomainError::invalid_field(fields::ISBN, "no puede estar vacío"));
    }
    // Reutiliza las mismas reglas que las columnas sueltas.
    let holding = Holding::from_columns(holding.state(),
                                        holding.on_hold_customer_id(),
                                        holding.checked_out_customer_id())?;
    if let Some(u) = updated_at {
      if u < created_at {
        return Err(DomainError::invalid_field(fields::TIME_UPDATED, "anterior a timecreated"));
      }
    }
    Ok(Self { isbn: isbn.to_string(), holding, created_at, updated_at })
  }

  /// Copia con un nuevo estado y `updated_at` fijado a `stamp`.
  pub(crate) fn transitioned(&self, holding: Holding, stamp: DateTime<Utc>) -> Self {
    Self { isbn: self.isbn.clone(), holding, created_at: self.created_at, updated_at: Some(stamp) }
  }

  pub fn isbn(&self) -> &str {
    &self.isbn
  }

  pub fn state(&self) -> BookState {
    self.holding.state()
  }

  pub fn holding(&self) -> &Holding {
    &self.holding
  }

  pub fn on_hold_customer_id(&self) -> Option<&str> {
    self.holding.on_hold_customer_id()
  }

  pub fn checked_out_customer_id(&self) -> Option<&str> {
    self.holding.checked_out_customer_id()
  }

  pub fn created_at(&self) -> DateTime<Utc> {
    self.created_at
  }

  pub fn updated_at(&self) -> Option<DateTime<Utc>> {
    self.updated_at
  }

  pub fn to_record(&self) -> BookRecord {
    BookRecord { isbn: Some(self.isbn.clone()),
                 state: Some(self.state().as_str().to_string()),
                 on_hold_customer_id: self.on_hold_customer_id().map(str::to_string),
                 checked_out_customer_id: self.checked_out_customer_id().map(str::to_string),
                 time_created: Some(self.created_at),
                 time_updated: self.updated_at }
  }
}

impl From<Book> for BookRecord {
  fn from(book: Book) -> Self {
    book.to_record()
  }
}

impl fmt::Display for Book {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.holding {
      Holding::Available => write!(f, "Book({}, available)", self.isbn),
      Holding::OnHold(c) => write!(f, "Book({}, on-hold por {})", self.isbn, c),
      Holding::CheckedOut(c) => write!(f, "Book({}, checked-out por {})", self.isbn, c),
    }
  }
}

/// Registro tal como llega o sale por el cable. Todos los campos son
/// opcionales: `None` significa omitido o `null`, `Some("")` significa
/// explícitamente vacío. El estado viaja como texto para que un valor
/// desconocido lo rechace el validador de campos y no el deserializador.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
  pub isbn: Option<String>,
  pub state: Option<String>,
  #[serde(rename = "onholdcustomerid")]
  pub on_hold_customer_id: Option<String>,
  #[serde(rename = "checkedoutcustomerid")]
  pub checked_out_customer_id: Option<String>,
  #[serde(rename = "timecreated")]
  pub time_created: Option<DateTime<Utc>>,
  #[serde(rename = "timeupdated")]
  pub time_updated: Option<DateTime<Utc>>,
}

impl BookRecord {
  pub fn new(isbn: impl Into<String>) -> Self {
    Self { isbn: Some(isbn.into()), ..Self::default() }
  }

  pub fn with_state(mut self, state: impl Into<String>) -> Self {
    self.state = Some(state.into());
    self
  }

  pub fn with_on_hold(mut self, customer: impl Into<String>) -> Self {
    self.on_hold_customer_id = Some(customer.into());
    self
  }

  pub fn with_checked_out(mut self, customer: impl Into<String>) -> Self {
    self.checked_out_customer_id = Some(customer.into());
    self
  }

  pub fn with_time_created(mut self, t: DateTime<Utc>) -> Self {
    self.time_created = Some(t);
    self
  }

  pub fn with_time_updated(mut self, t: DateTime<Utc>) -> Self {
    self.time_updated = Some(t);
    self
  }
}

// transition.rs
use crate::book::fields;
use crate::identity::{ExactIdentity, IdentityComparator};
use crate::update_validation::require_update_fields;
use crate::{Book, BookRecord, BookState, DomainError, Holding};
use chrono::{DateTime, Utc};
use log::debug;

/// Manejador asociado a cada par (estado actual, estado pedido).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionKind {
  NoOp,
  PlaceHold,
  CheckOut,
  ReleaseHold,
  Return,
  /// checked-out -> on-hold: siempre rechazada.
  Reject,
}

impl TransitionKind {
  /// Tabla de despacho. El `match` cubre los nueve pares de forma exhaustiva.
  pub const fn between(from: BookState, to: BookState) -> Self {
    use BookState::*;
    match (from, to) {
      (Available, Available) => Self::NoOp,
      (Available, OnHold) => Self::PlaceHold,
      (Available, CheckedOut) => Self::CheckOut,
      (OnHold, Available) => Self::ReleaseHold,
      (OnHold, OnHold) => Self::PlaceHold,
      (OnHold, CheckedOut) => Self::CheckOut,
      (CheckedOut, Available) => Self::Return,
      (CheckedOut, OnHold) => Self::Reject,
      (CheckedOut, CheckedOut) => Self::CheckOut,
    }
  }
}

/// Fragmento de petición que consume el motor: estado pedido más los
/// campos de identidad tal como llegaron.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionRequest<'a> {
  pub target: BookState,
  pub on_hold_customer_id: Option<&'a str>,
  pub checked_out_customer_id: Option<&'a str>,
}

impl<'a> TransitionRequest<'a> {
  pub fn new(target: BookState) -> Self {
    Self { target, on_hold_customer_id: None, checked_out_customer_id: None }
  }

  pub fn on_hold(mut self, customer: &'a str) -> Self {
    self.on_hold_customer_id = Some(customer);
    self
  }

  pub fn checked_out(mut self, customer: &'a str) -> Self {
    self.checked_out_customer_id = Some(customer);
    self
  }

  pub fn from_record(record: &'a BookRecord) -> Result<Self, DomainError> {
    let (_, target) = require_update_fields(record)?;
    Ok(Self { target,
              on_hold_customer_id: record.on_hold_customer_id.as_deref(),
              checked_out_customer_id: record.checked_out_customer_id.as_deref() })
  }
}

/// Resultado de aplicar una transición legal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
  pub kind: TransitionKind,
  pub book: Book,
  /// `false` en no-ops y en re-peticiones del mismo titular.
  pub changed: bool,
}

/// Motor de transiciones del ciclo de vida.
///
/// Cada manejador valida forma e identidad antes de construir el registro
/// nuevo, así que un error nunca deja cambios parciales: el libro actual se
/// recibe por referencia y sólo se devuelve una copia en caso de éxito.
#[derive(Debug, Clone, Default)]
pub struct TransitionEngine<C = ExactIdentity> {
  identity: C,
}

impl TransitionEngine<ExactIdentity> {
  pub fn new() -> Self {
    Self { identity: ExactIdentity }
  }
}

impl<C> TransitionEngine<C> where C: IdentityComparator
{
  pub fn with_identity(identity: C) -> Self {
    Self { identity }
  }

  /// Aplica la petición sobre `current`. `now` es la hora candidata para
  /// `updated_at` si hay mutación.
  pub fn apply(&self,
               current: &Book,
               request: &TransitionRequest<'_>,
               now: DateTime<Utc>)
               -> Result<Transition, DomainError> {
    let kind = TransitionKind::between(current.state(), request.target);
    let next = match kind {
      TransitionKind::NoOp => None,
      TransitionKind::PlaceHold => self.place_hold(current, request)?,
      TransitionKind::CheckOut => self.check_out(current, request)?,
      TransitionKind::ReleaseHold => Some(self.release_hold(current, request)?),
      TransitionKind::Return => Some(self.return_book(current, request)?),
      TransitionKind::Reject => {
        return Err(DomainError::InvalidTransition { from: current.state(), to: request.target });
      }
    };
    let transition = match next {
      Some(holding) => Transition { kind, book: current.transitioned(holding, next_stamp(current, now)), changed: true },
      None => Transition { kind, book: current.clone(), changed: false },
    };
    debug!("{} {:?} -> {} (changed={})", current.isbn(), kind, transition.book.state(), transition.changed);
    Ok(transition)
  }

  fn check_out(&self, current: &Book, request: &TransitionRequest<'_>) -> Result<Option<Holding>, DomainError> {
    let claimed = checked_out_claim(request)?;
    match current.holding() {
      Holding::Available => Ok(Some(Holding::CheckedOut(claimed.to_string()))),
      Holding::OnHold(holder) => {
        self.ensure_holder(claimed, holder)?;
        Ok(Some(Holding::CheckedOut(claimed.to_string())))
      }
      Holding::CheckedOut(holder) => {
        self.ensure_holder(claimed, holder)?;
        Ok(None)
      }
    }
  }

  fn place_hold(&self, current: &Book, request: &TransitionRequest<'_>) -> Result<Option<Holding>, DomainError> {
    let claimed = on_hold_claim(request)?;
    match current.holding() {
      Holding::Available => Ok(Some(Holding::OnHold(claimed.to_string()))),
      Holding::OnHold(holder) => {
        self.ensure_holder(claimed, holder)?;
        Ok(None)
      }
      // `between` ya despacha checked-out -> on-hold a `Reject`.
      Holding::CheckedOut(_) => Err(DomainError::InvalidTransition { from: current.state(), to: BookState::OnHold }),
    }
  }

  fn release_hold(&self, current: &Book, request: &TransitionRequest<'_>) -> Result<Holding, DomainError> {
    let claimed = on_hold_claim(request)?;
    match current.holding() {
      Holding::OnHold(holder) => {
        self.ensure_holder(claimed, holder)?;
        Ok(Holding::Available)
      }
      other => Err(DomainError::InvalidTransition { from: other.state(), to: BookState::Available }),
    }
  }

  fn return_book(&self, current: &Book, request: &TransitionRequest<'_>) -> Result<Holding, DomainError> {
    let claimed = checked_out_claim(request)?;
    match current.holding() {
      Holding::CheckedOut(holder) => {
        self.ensure_holder(claimed, holder)?;
        Ok(Holding::Available)
      }
      other => Err(DomainError::InvalidTransition { from: other.state(), to: BookState::Available }),
    }
  }

  fn ensure_holder(&self, claimed: &str, holder: &str) -> Result<(), DomainError> {
    if self.identity.same_holder(claimed, holder) {
      Ok(())
    } else {
      Err(DomainError::IdentityMismatch { claimed: claimed.to_string() })
    }
  }
}

fn on_hold_claim<'a>(request: &TransitionRequest<'a>) -> Result<&'a str, DomainError> {
  match (request.on_hold_customer_id, request.checked_out_customer_id) {
    (Some(c), None) if !c.is_empty() => Ok(c),
    _ => Err(DomainError::IdentityShape(format!("se requiere sólo `{}`", fields::ON_HOLD_CUSTOMER_ID))),
  }
}

fn checked_out_claim<'a>(request: &TransitionRequest<'a>) -> Result<&'a str, DomainError> {
  match (request.on_hold_customer_id, request.checked_out_customer_id) {
    (None, Some(c)) if !c.is_empty() => Ok(c),
    _ => Err(DomainError::IdentityShape(format!("se requiere sólo `{}`", fields::CHECKED_OUT_CUSTOMER_ID))),
  }
}

// updated_at nunca retrocede, aunque el reloj lo haga.
fn next_stamp(current: &Book, now: DateTime<Utc>) -> DateTime<Utc> {
  let floor = current.updated_at().unwrap_or(current.created_at());
  now.max(floor)
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Duration;

  fn book(holding: Holding) -> Book {
    Book::new("0001", holding, Utc::now() - Duration::minutes(1))
  }

  fn engine() -> TransitionEngine {
    TransitionEngine::new()
  }

  #[test]
  fn dispatch_table_matches_every_cell() {
    use BookState::*;
    use TransitionKind::*;
    let expected = [[NoOp, PlaceHold, CheckOut], [ReleaseHold, PlaceHold, CheckOut], [Return, Reject, CheckOut]];
    for (i, from) in BookState::ALL.iter().enumerate() {
      for (j, to) in BookState::ALL.iter().enumerate() {
        assert_eq!(TransitionKind::between(*from, *to), expected[i][j], "{} -> {}", from, to);
      }
    }
    assert_eq!(TransitionKind::between(CheckedOut, OnHold), Reject);
  }

  #[test]
  fn no_op_keeps_book_untouched() {
    let current = book(Holding::Available);
    let t = engine().apply(&current, &TransitionRequest::new(BookState::Available), Utc::now()).unwrap();
    assert!(!t.changed);
    assert_eq!(t.book, current);
    assert!(t.book.updated_at().is_none());
  }

  #[test]
  fn place_hold_from_available() {
    let current = book(Holding::Available);
    let now = Utc::now();
    let t = engine().apply(&current, &TransitionRequest::new(BookState::OnHold).on_hold("C2"), now).unwrap();
    assert!(t.changed);
    assert_eq!(t.book.state(), BookState::OnHold);
    assert_eq!(t.book.on_hold_customer_id(), Some("C2"));
    assert_eq!(t.book.updated_at(), Some(now));
    assert_eq!(t.book.created_at(), current.created_at());
  }

  #[test]
  fn place_hold_by_same_holder_is_idempotent() {
    let current = book(Holding::OnHold("C1".into()));
    let t = engine().apply(&current, &TransitionRequest::new(BookState::OnHold).on_hold("C1"), Utc::now()).unwrap();
    assert!(!t.changed);
    assert_eq!(t.book, current);
    let err = engine().apply(&current, &TransitionRequest::new(BookState::OnHold).on_hold("C2"), Utc::now());
    assert_eq!(err.unwrap_err(), DomainError::IdentityMismatch { claimed: "C2".into() });
  }

  #[test]
  fn check_out_from_available() {
    let current = book(Holding::Available);
    let now = Utc::now();
    let t = engine().apply(&current, &TransitionRequest::new(BookState::CheckedOut).checked_out("C5"), now).unwrap();
    assert_eq!(t.kind, TransitionKind::CheckOut);
    assert!(t.changed);
    assert_eq!(t.book.holding(), &Holding::CheckedOut("C5".into()));
    assert!(t.book.on_hold_customer_id().is_none());
    assert_eq!(t.book.updated_at(), Some(now));
    assert_eq!(t.book.created_at(), current.created_at());
  }

  #[test]
  fn release_by_other_customer_is_a_mismatch() {
    let current = book(Holding::OnHold("C1".into()));
    let req = TransitionRequest::new(BookState::Available).on_hold("C2");
    assert_eq!(engine().apply(&current, &req, Utc::now()).unwrap_err(),
               DomainError::IdentityMismatch { claimed: "C2".into() });
    assert_eq!(current.holding(), &Holding::OnHold("C1".into()));
    assert!(current.updated_at().is_none());
  }

  #[test]
  fn check_out_from_hold_requires_holder() {
    let current = book(Holding::OnHold("C1".into()));
    let req = TransitionRequest::new(BookState::CheckedOut).checked_out("C1");
    let t = engine().apply(&current, &req, Utc::now()).unwrap();
    assert!(t.changed);
    assert_eq!(t.book.state(), BookState::CheckedOut);
    assert!(t.book.on_hold_customer_id().is_none());
    assert_eq!(t.book.checked_out_customer_id(), Some("C1"));

    let req = TransitionRequest::new(BookState::CheckedOut).checked_out("C7");
    assert!(matches!(engine().apply(&current, &req, Utc::now()), Err(DomainError::IdentityMismatch { .. })));
  }

  #[test]
  fn re_checkout_by_other_customer_is_a_mismatch() {
    let current = book(Holding::CheckedOut("C9".into()));
    let req = TransitionRequest::new(BookState::CheckedOut).checked_out("C1");
    assert_eq!(engine().apply(&current, &req, Utc::now()).unwrap_err(),
               DomainError::IdentityMismatch { claimed: "C1".into() });
    let req = TransitionRequest::new(BookState::CheckedOut).checked_out("C9");
    let t = engine().apply(&current, &req, Utc::now()).unwrap();
    assert!(!t.changed);
    assert_eq!(t.book.updated_at(), current.updated_at());
  }

  #[test]
  fn checked_out_to_on_hold_is_rejected() {
    let current = book(Holding::CheckedOut("C9".into()));
    let req = TransitionRequest::new(BookState::OnHold).on_hold("C1");
    assert_eq!(engine().apply(&current, &req, Utc::now()).unwrap_err(),
               DomainError::InvalidTransition { from: BookState::CheckedOut, to: BookState::OnHold });
  }

  #[test]
  fn release_and_return_clear_the_holder() {
    let held = book(Holding::OnHold("C1".into()));
    let t = engine().apply(&held, &TransitionRequest::new(BookState::Available).on_hold("C1"), Utc::now()).unwrap();
    assert_eq!(t.kind, TransitionKind::ReleaseHold);
    assert_eq!(t.book.holding(), &Holding::Available);
    assert!(t.book.updated_at().is_some());

    let out = book(Holding::CheckedOut("C3".into()));
    let t = engine().apply(&out, &TransitionRequest::new(BookState::Available).checked_out("C3"), Utc::now()).unwrap();
    assert_eq!(t.kind, TransitionKind::Return);
    assert_eq!(t.book.holding(), &Holding::Available);

    let req = TransitionRequest::new(BookState::Available).checked_out("C4");
    assert!(matches!(engine().apply(&out, &req, Utc::now()), Err(DomainError::IdentityMismatch { .. })));
  }

  #[test]
  fn wrong_identity_shape_is_rejected_before_anything_else() {
    let current = book(Holding::Available);
    let both = TransitionRequest::new(BookState::CheckedOut).checked_out("C1").on_hold("C1");
    assert!(matches!(engine().apply(&current, &both, Utc::now()), Err(DomainError::IdentityShape(_))));
    let wrong = TransitionRequest::new(BookState::OnHold).checked_out("C1");
    assert!(matches!(engine().apply(&current, &wrong, Utc::now()), Err(DomainError::IdentityShape(_))));
    let none = TransitionRequest::new(BookState::CheckedOut);
    assert!(matches!(engine().apply(&current, &none, Utc::now()), Err(DomainError::IdentityShape(_))));
    // Return exige la identidad de préstamo aunque el titular coincida.
    let out = book(Holding::CheckedOut("C1".into()));
    let req = TransitionRequest::new(BookState::Available).on_hold("C1");
    assert!(matches!(engine().apply(&out, &req, Utc::now()), Err(DomainError::IdentityShape(_))));
  }

  #[test]
  fn updated_at_never_goes_backwards() {
    let current = book(Holding::Available);
    let first = engine().apply(&current, &TransitionRequest::new(BookState::OnHold).on_hold("C1"), Utc::now())
                        .unwrap()
                        .book;
    let stamp = first.updated_at().unwrap();
    let earlier = stamp - Duration::hours(1);
    let second = engine().apply(&first, &TransitionRequest::new(BookState::Available).on_hold("C1"), earlier)
                         .unwrap()
                         .book;
    assert_eq!(second.updated_at(), Some(stamp));
  }

  #[test]
  fn pluggable_identity_comparator() {
    let case_insensitive = TransitionEngine::with_identity(|a: &str, b: &str| a.eq_ignore_ascii_case(b));
    let current = book(Holding::OnHold("c1".into()));
    let req = TransitionRequest::new(BookState::CheckedOut).checked_out("C1");
    let t = case_insensitive.apply(&current, &req, Utc::now()).unwrap();
    assert_eq!(t.book.checked_out_customer_id(), Some("C1"));
  }

  #[test]
  fn request_fragment_from_record() {
    let r = BookRecord::new("0001").with_state("checked-out").with_checked_out("C1");
    let req = TransitionRequest::from_record(&r).unwrap();
    assert_eq!(req, TransitionRequest::new(BookState::CheckedOut).checked_out("C1"));
    assert_eq!(TransitionRequest::from_record(&BookRecord::new("0001")).unwrap_err(),
               DomainError::MissingField("state"));
  }
}

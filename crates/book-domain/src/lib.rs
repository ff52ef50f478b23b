//! Reglas del ciclo de vida de un libro del catálogo: validación de campos,
//! validación semántica del alta, control optimista en actualizaciones y el
//! motor de transiciones entre `available`, `on-hold` y `checked-out`.
//!
//! Este crate no hace I/O; el almacenamiento vive detrás del contrato
//! `BookRepository` del crate `catalog`.
mod book;
mod create_validation;
mod errors;
mod field_validation;
mod identity;
mod transition;
mod update_validation;

pub use book::{fields, Book, BookRecord, BookState, Holding};
pub use create_validation::new_book;
pub use errors::{DomainError, Result};
pub use field_validation::validate_fields;
pub use identity::{ExactIdentity, IdentityComparator};
pub use transition::{Transition, TransitionEngine, TransitionKind, TransitionRequest};
pub use update_validation::{check_consistency, require_update_fields};

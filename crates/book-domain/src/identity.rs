// identity.rs

/// Decide si la identidad que declara quien hace la petición corresponde al
/// titular actual de un libro. Es el punto donde se enchufa una capa real de
/// autenticación sin tocar el motor de transiciones.
pub trait IdentityComparator: Send + Sync {
  fn same_holder(&self, claimed: &str, holder: &str) -> bool;
}

/// Comparación exacta, byte a byte.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactIdentity;

impl IdentityComparator for ExactIdentity {
  fn same_holder(&self, claimed: &str, holder: &str) -> bool {
    claimed == holder
  }
}

impl<F> IdentityComparator for F where F: Fn(&str, &str) -> bool + Send + Sync
{
  fn same_holder(&self, claimed: &str, holder: &str) -> bool {
    self(claimed, holder)
  }
}

// Archivo: config.rs
// Propósito: leer la configuración del binario desde el entorno (y `.env`).
use thiserror::Error;

/// Backend de almacenamiento elegido para el catálogo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Memory,
    Sql,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("BOOKS_BACKEND desconocido: {0} (valores: memory | sqlite | sql)")]
    UnknownBackend(String),
}

/// Configuración del binario `main-core`.
///
/// Variables:
/// - `BOOKS_BACKEND`: `memory` | `sqlite` | `sql`. Si no se define se usa SQL
///   cuando hay URL de base de datos y `memory` en otro caso.
/// - `BOOKS_DB_URL` (o `DATABASE_URL`): destino del backend SQL.
/// - `RUST_LOG`: filtro de logs, `info` por defecto.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend: Backend,
    pub database_url: Option<String>,
    pub log_filter: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Igual que `from_env` pero con una fuente de variables inyectable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
        where F: Fn(&str) -> Option<String>
    {
        let database_url = lookup("BOOKS_DB_URL").or_else(|| lookup("DATABASE_URL"));
        let backend = match lookup("BOOKS_BACKEND").as_deref().map(str::trim) {
            None | Some("") => {
                if database_url.is_some() {
                    Backend::Sql
                } else {
                    Backend::Memory
                }
            }
            Some(b) if b.eq_ignore_ascii_case("memory") => Backend::Memory,
            Some(b) if b.eq_ignore_ascii_case("sqlite") || b.eq_ignore_ascii_case("sql") => Backend::Sql,
            Some(other) => return Err(ConfigError::UnknownBackend(other.to_string())),
        };
        let log_filter = lookup("RUST_LOG").unwrap_or_else(|| "info".into());
        Ok(Self { backend, database_url, log_filter })
    }
}

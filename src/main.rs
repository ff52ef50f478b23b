mod config;

use book_domain::BookRecord;
use book_persistence::DieselBookRepository;
use catalog::{BookRepository, CatalogService, InMemoryBookRepository, Response};
use config::{AppConfig, Backend};
use log::info;
use std::error::Error;
use std::io::{self, Write};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Pequeño menú interactivo para administrar el catálogo de libros usando el
/// backend elegido en la configuración.
///
/// Opciones soportadas:
/// 1) Listar libros
/// 2) Crear libro
/// 3) Ver libro por ISBN
/// 4) Cambiar estado (apartar, prestar, liberar, devolver)
/// 5) Eliminar libro
/// 6) Salir
fn main() -> Result<(), Box<dyn Error>> {
    let cfg = AppConfig::from_env()?;
    // Instala el subscriber; también recoge los registros de `log`.
    tracing_subscriber::fmt().with_env_filter(EnvFilter::new(&cfg.log_filter)).init();

    match cfg.backend {
        Backend::Memory => {
            info!("backend en memoria (no durable)");
            run(CatalogService::new(Arc::new(InMemoryBookRepository::new())))
        }
        Backend::Sql => {
            let repo = match cfg.database_url.as_deref() {
                Some(url) => DieselBookRepository::new(url)?,
                None => book_persistence::new_from_env()?,
            };
            info!("backend SQL");
            run(CatalogService::new(Arc::new(repo)))
        }
    }
}

fn run<R>(service: CatalogService<R>) -> Result<(), Box<dyn Error>>
    where R: BookRepository
{
    loop {
        println!("\n== Catálogo de libros ==");
        println!("1) Listar libros");
        println!("2) Crear libro");
        println!("3) Ver libro por ISBN");
        println!("4) Cambiar estado");
        println!("5) Eliminar libro");
        println!("6) Salir");
        print!("Elige una opción: ");
        io::stdout().flush().ok();

        let mut choice = String::new();
        if io::stdin().read_line(&mut choice)? == 0 {
            break;
        }
        match choice.trim() {
            "1" => print_response(&service.list()),
            "2" => {
                let isbn = prompt("ISBN: ")?;
                let state = prompt("Estado (available | on-hold | checked-out): ")?;
                let mut record = BookRecord::new(isbn.trim()).with_state(state.trim());
                read_identity(&mut record)?;
                print_response(&service.create(&record));
            }
            "3" => {
                let isbn = prompt("ISBN: ")?;
                print_response(&service.get(isbn.trim()));
            }
            "4" => {
                let body = prompt("Petición JSON (ej: {\"isbn\":\"0001\",\"state\":\"on-hold\",\"onholdcustomerid\":\"C1\"}): ")?;
                print_response(&service.update_json(body.trim()));
            }
            "5" => {
                let isbn = prompt("ISBN a eliminar: ")?;
                let confirm = prompt(&format!("Confirma borrado de {}? escribir 'yes' para confirmar: ", isbn.trim()))?;
                if confirm.trim().to_lowercase() == "yes" {
                    print_response(&service.delete(isbn.trim()));
                } else {
                    println!("Borrado cancelado");
                }
            }
            "6" => {
                println!("Saliendo...");
                break;
            }
            other => {
                println!("Opción inválida: {}", other);
            }
        }
    }

    Ok(())
}

// Pide los identificadores de cliente; enter deja el campo ausente.
fn read_identity(record: &mut BookRecord) -> io::Result<()> {
    let on_hold = prompt("Cliente que aparta (enter para ninguno): ")?;
    let checked_out = prompt("Cliente que lleva prestado (enter para ninguno): ")?;
    if !on_hold.trim().is_empty() {
        record.on_hold_customer_id = Some(on_hold.trim().to_string());
    }
    if !checked_out.trim().is_empty() {
        record.checked_out_customer_id = Some(checked_out.trim().to_string());
    }
    Ok(())
}

fn print_response(resp: &Response) {
    match &resp.body {
        Some(body) => {
            let pretty = serde_json::to_string_pretty(body).unwrap_or_else(|_| body.to_string());
            println!("[{}]\n{}", resp.status, pretty);
        }
        None => println!("[{}]", resp.status),
    }
}

fn prompt(msg: &str) -> io::Result<String> {
    print!("{}", msg);
    io::stdout().flush()?;
    let mut s = String::new();
    io::stdin().read_line(&mut s)?;
    Ok(s)
}

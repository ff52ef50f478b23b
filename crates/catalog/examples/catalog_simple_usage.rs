// Ejemplo mínimo: recorre el ciclo de vida completo de un libro contra el
// repositorio en memoria e imprime cada respuesta.
use catalog::{CatalogService, InMemoryBookRepository, Response};
use std::sync::Arc;

fn show(label: &str, resp: &Response) {
    let body = resp.body.as_ref().map(|b| b.to_string()).unwrap_or_else(|| "-".into());
    println!("{:<28} [{}] {}", label, resp.status, body);
}

fn main() {
    let service = CatalogService::new(Arc::new(InMemoryBookRepository::new()));

    show("alta", &service.create_json(r#"{"isbn":"0001","state":"available"}"#));
    show("apartar (C2)", &service.update_json(r#"{"isbn":"0001","state":"on-hold","onholdcustomerid":"C2"}"#));
    show("prestar a otro (C3)",
         &service.update_json(r#"{"isbn":"0001","state":"checked-out","checkedoutcustomerid":"C3"}"#));
    show("prestar (C2)",
         &service.update_json(r#"{"isbn":"0001","state":"checked-out","checkedoutcustomerid":"C2"}"#));
    show("apartar desde prestado", &service.update_json(r#"{"isbn":"0001","state":"on-hold","onholdcustomerid":"C2"}"#));
    show("devolver (C2)", &service.update_json(r#"{"isbn":"0001","state":"available","checkedoutcustomerid":"C2"}"#));
    show("listar", &service.list());
    show("baja", &service.delete("0001"));
    show("baja repetida", &service.delete("0001"));
}

// Diesel schema del catálogo. Las marcas de tiempo se guardan como texto
// RFC3339 para conservar la precisión exacta que ve el cliente.
diesel::table! {
    books (isbn) {
        isbn -> Text,
        state -> Text,
        on_hold_customer_id -> Nullable<Text>,
        checked_out_customer_id -> Nullable<Text>,
        created_at -> Text,
        updated_at -> Nullable<Text>,
    }
}

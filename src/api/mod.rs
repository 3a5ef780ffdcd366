pub mod docs;
pub mod models;
pub mod routes;

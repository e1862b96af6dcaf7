pub mod error;
pub mod payloads;
pub mod routes;
pub mod schemas;
pub mod settings;
pub mod store;

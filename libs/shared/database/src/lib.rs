pub mod rest;

pub use rest::DatabaseClient;

pub mod config;
pub mod error;
pub mod inference;
pub mod response;
pub mod routes;
pub mod validation;

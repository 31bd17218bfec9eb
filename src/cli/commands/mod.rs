pub mod routes;
pub mod token;

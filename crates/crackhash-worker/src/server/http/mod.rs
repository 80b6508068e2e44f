pub mod request;
pub mod routes;

pub mod form;
pub mod handlers;
pub mod response;
pub mod routes;

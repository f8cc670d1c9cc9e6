pub mod cors;
pub mod listener;
pub mod pipeline;
pub mod response;
pub mod routes;
pub mod static_files;

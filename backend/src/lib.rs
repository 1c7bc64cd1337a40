pub mod config;
pub mod pipeline;
pub mod render;
pub mod routes;
pub mod upload;

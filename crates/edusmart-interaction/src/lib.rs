//! Remote interaction layer: the REST adapter for the EduSmart backend.

pub mod endpoints;
pub mod rest_client;

pub use rest_client::RestClient;

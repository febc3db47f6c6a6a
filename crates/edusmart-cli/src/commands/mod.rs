pub mod auth;
pub mod context;
pub mod fetch;
pub mod output;
pub mod route;
pub mod years;

mod http_handler;
mod relay_error;
mod relay_service;

pub use http_handler::*;
pub use relay_error::*;
pub use relay_service::*;

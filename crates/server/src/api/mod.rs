pub mod error;
pub mod handlers;
pub mod routes;
pub mod sessions;
mod upload;

pub use error::{ApiError, ErrorResponse};
pub use routes::create_router;

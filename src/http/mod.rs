//! HTTP surface: the admission service and the embeddable middleware.

mod middleware;
mod response;
mod server;
mod service;

pub use middleware::{rate_limit, RateLimitLayer};
pub use response::rejection_response;
pub use server::HttpServer;
pub use service::router;

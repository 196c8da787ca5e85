// HTTP module: server and the controller/middleware interfaces it composes.

pub mod server;

pub use crate::middleware::middleware::Middleware;
pub use crate::middleware::recover_middleware::panics_counter;

// Re-export server types
pub use server::{HttpServer, Server};

// Common controller interface
pub use crate::controller::controller::Controller;

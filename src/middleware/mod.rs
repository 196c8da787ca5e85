// HTTP middlewares.

pub mod middleware;
pub mod recover_middleware;
pub mod trace_middleware;

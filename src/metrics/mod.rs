//! Prometheus metrics functionality.
//
//! Counters are recorded by the HTTP layer; the storage core records nothing.
//! Without an installed recorder every call is a no-op.

pub mod meter;

// Re-export commonly used items
pub use meter::*;

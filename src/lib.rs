#[path = "k8s/probe/liveness/mod.rs"]
pub mod liveness;
#[cfg(test)]
mod tests;

#[cfg(test)]
pub use tests::support;

pub mod app;
pub mod config;
pub mod controller;
pub mod db;
pub mod http;
pub mod metrics;
pub mod middleware;
pub mod shutdown;

// Application wiring: storage, HTTP server and lifecycle.

pub mod app;
pub mod server;

pub use app::App;

//! Key-value storage: sharded map core and the driver-facing `Storage` trait.

pub mod db;
pub mod storage;

pub use db::{Payload, Storage, DB};
pub use storage::{ErrorKind, StoreError};

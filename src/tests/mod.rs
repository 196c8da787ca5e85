//! End-to-end tests for the HTTP front end.
//!
//! Every test starts its own server on an ephemeral port and drives it with
//! `reqwest`, so tests never share storage state.

mod cases_error_handling_test;

pub mod support;

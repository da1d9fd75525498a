//! FibMemo library: application logic behind the `fibmemo` binary.

pub mod app;
pub mod config;
pub mod errors;

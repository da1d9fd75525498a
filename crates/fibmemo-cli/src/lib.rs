//! # fibmemo-cli
//!
//! Console output for FibMemo: result formatting, the CLI result sink,
//! spinners and shell completion.

pub mod completion;
pub mod output;
pub mod presenter;
pub mod ui;

pub use presenter::CLIResultSink;

//! Command implementations for the CLI.
//!
//! Each submodule contains the implementation of a specific command.

/// Module containing the implementation of the `select` command.
/// This command picks comparison frames and reports them on stdout.
pub mod select;

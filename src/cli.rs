//! Command line interface for the `mapm` inspection binary.
//!
//! The definitions here are shared with `build.rs`, which renders the man
//! page, so this file must not depend on the library.

use clap::{Parser, Subcommand};

/// Command line arguments for the `mapm` binary.
#[derive(Debug, Parser)]
#[command(name = "mapm", version, about = "Inspect MAP manager bus messages")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Decode a hex-encoded bus frame and print its header and body.
    Decode {
        /// Frame bytes as hex; whitespace and `:` separators are ignored.
        frame: String,
    },
    /// List the known message function codes.
    Functions,
}

/*
[INPUT]:  Command-line arguments and option sources
[OUTPUT]: Parsed CLI definition and resolved client options
[POS]:    Crate root - library entry point for the fugle-stream binary
[UPDATE]: When adding new sub-commands or option sources
*/

pub mod args;

pub use args::{Cli, Command, load_options, parse_param};

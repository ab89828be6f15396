pub mod args;
pub mod commands;
pub mod parser;
pub mod passthrough;

pub use args::*;
pub use commands::*;
pub use parser::{CommandLine, FlagSyntax, ParseOutcome, SubcommandSpec};
pub use passthrough::ShellScriptHandler;

use clap::Subcommand;

/// Built-in subcommands, always registered before any discovered command
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum BuiltinCommand {
    /// Scaffold a .wardrobe folder if it does not exist
    Init,

    /// Print out which wardrobe command folder we're currently targeting
    Which,
}

mod commands;

pub use commands::{AuthCommands, Cli, Commands, OutfitCommands, WardrobeCommands};

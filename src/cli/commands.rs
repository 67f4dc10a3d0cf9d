use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Garderobe - AI-assisted wardrobe manager and outfit studio.
#[derive(Parser, Debug)]
#[command(name = "garderobe")]
#[command(version = "0.1.0")]
#[command(about = "Manage a photo wardrobe and generate outfit images.", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Set up your data directory and API credential
    Onboard {
        /// API key (prompted interactively when omitted)
        #[arg(long)]
        api_key: Option<String>,
    },

    /// Manage the clothing collection
    Wardrobe {
        #[command(subcommand)]
        wardrobe_command: WardrobeCommands,
    },

    /// Generate outfit images and browse past results
    Outfit {
        #[command(subcommand)]
        outfit_command: OutfitCommands,
    },

    /// Manage the stored API credential
    Auth {
        #[command(subcommand)]
        auth_command: AuthCommands,
    },

    /// Show wardrobe and credential status
    Status,
}

#[derive(Subcommand, Debug)]
pub enum WardrobeCommands {
    /// Upload clothing photos (files or directories; non-images are skipped)
    Add {
        /// Image files or directories to upload
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// List all items
    List,

    /// Remove an item by id
    Remove {
        id: String,
    },

    /// Assign a category by hand (confirms the item)
    Categorize {
        id: String,
        /// Category name (e.g. Top, Bottom, Shoes)
        category: String,
        /// Subcategory within the category (e.g. Hoodie)
        #[arg(long)]
        subcategory: Option<String>,
    },

    /// Ask the AI to suggest a category (needs confirmation afterwards)
    AutoCategorize {
        id: String,
    },

    /// Confirm an AI-suggested category
    Confirm {
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum OutfitCommands {
    /// Generate one outfit image
    Generate {
        /// Occasion to dress for (e.g. Casual, Work, Formal)
        #[arg(long)]
        event: String,

        /// Background/avatar theme (african, asian, european)
        #[arg(long)]
        theme: Option<String>,

        /// Avatar image file (defaults to the theme's avatar in the data dir)
        #[arg(long)]
        avatar: Option<PathBuf>,

        /// Hand-picked item ids (manual mode, up to 8); omit for AI mode
        #[arg(long = "item")]
        items: Vec<String>,

        /// Where to write the generated image
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// List previously generated outfits
    History,
}

#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Store the API credential
    Set {
        /// The key (prompted interactively when omitted)
        key: Option<String>,
    },

    /// Remove the stored credential
    Clear,

    /// Report whether a credential is stored
    Status,
}

//! CLI argument definitions.

use clap::{Args, Parser, Subcommand};

/// Terminal admin client for the catalog API.
#[derive(Parser, Debug)]
#[command(name = "shopadmin")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and start a 5 minute session
    Login(LoginArgs),

    /// End the session (local only, no API call)
    Logout,

    /// Show whether a session is active and how long it has left
    Status,

    /// Manage catalog products
    #[command(subcommand)]
    Products(ProductsCommand),

    /// View or change business branding
    #[command(subcommand)]
    Settings(SettingsCommand),
}

#[derive(Args, Debug, Default)]
pub struct LoginArgs {
    /// Username; prompted for when omitted
    #[arg(long, short)]
    pub username: Option<String>,

    /// Password; prompted for without echo when omitted
    #[arg(long)]
    pub password: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum ProductsCommand {
    /// List all products
    List,

    /// Add a new product
    Add(ProductFields),

    /// Edit an existing product; omitted fields keep their current value
    Edit {
        id: String,
        #[command(flatten)]
        fields: ProductFields,
    },

    /// Delete a product
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
}

#[derive(Args, Debug, Default, Clone)]
pub struct ProductFields {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub price: Option<String>,
    #[arg(long)]
    pub categories: Option<String>,
    #[arg(long)]
    pub stock: Option<String>,
    /// Image URL; repeat for several images
    #[arg(long = "image")]
    pub images: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    /// Show title, logo and banner
    Show,

    /// Change one or more settings
    Set {
        /// Business name
        #[arg(long)]
        title: Option<String>,
        /// Logo image URL
        #[arg(long)]
        logo: Option<String>,
        /// Promotional banner (HTML)
        #[arg(long)]
        banner: Option<String>,
    },
}

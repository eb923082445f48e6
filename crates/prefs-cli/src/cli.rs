use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "prefs",
    about = "Inspect and edit keyed JSON preference documents",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Store configuration file (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Store root directory; overrides the configuration file
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the value at a path
    Get(GetArgs),
    /// Set the value at a path and save
    Set(SetArgs),
    /// Remove a path, or every field, and save
    Clear(ClearArgs),
    /// Print a whole document
    Show(ShowArgs),
    /// Delete a stored document
    Delete(DeleteArgs),
    /// List stored keys
    Keys,
}

#[derive(Args, Debug)]
pub struct GetArgs {
    pub key: String,
    /// Colon-delimited path, e.g. `window:size:width`
    pub path: String,
    /// JSON value printed when the path is missing
    #[arg(long)]
    pub default: Option<String>,
}

#[derive(Args, Debug)]
pub struct SetArgs {
    pub key: String,
    pub path: String,
    /// JSON value; anything that is not valid JSON is stored as a string
    pub value: String,
    /// Store the value as a string even if it parses as JSON
    #[arg(long)]
    pub string: bool,
}

#[derive(Args, Debug)]
pub struct ClearArgs {
    pub key: String,
    /// Path to remove; omit to clear the whole document
    pub path: Option<String>,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    pub key: String,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    pub key: String,
}

//! Command-line interface definition using clap.
//!
//! Three subcommands cover the workflow's three scripts:
//! - `clean` - strip Matrix server suffixes from exported dumps
//! - `convo` - build pairwise conversation annotation pages
//! - `group` - build a group-chat annotation page

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Prepare exported chat logs for qualitative coding: identifier cleanup,
/// turn segmentation, annotation HTML.
#[derive(Parser, Debug)]
#[command(name = "chatcode")]
#[command(version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    chatcode clean export.json -o cleaned.json -s
    chatcode clean dumps/ -b -p '*.json' -o cleaned/
    chatcode convo --files day1.json day2.json --aliases aliases.json --users alice,bob
    chatcode group chat.json --chat-id '!abc123' --main-user alice")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Strip server suffixes from chat and user identifiers
    Clean(CleanArgs),
    /// Build pairwise conversation annotation pages
    Convo(ConvoArgs),
    /// Build a group-chat annotation page
    Group(GroupArgs),
}

#[derive(Args, Debug)]
pub struct CleanArgs {
    /// Input JSON file, or a directory in batch mode
    pub input: PathBuf,

    /// Output file or directory (default: cleaned_<input>)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Process every matching file in the input directory
    #[arg(short, long)]
    pub batch: bool,

    /// File pattern for batch mode
    #[arg(short, long, default_value = "*.json")]
    pub pattern: String,

    /// Print a summary of the cleaned messages
    #[arg(short, long)]
    pub summary: bool,
}

#[derive(Args, Debug)]
pub struct ConvoArgs {
    /// Chat log JSON files
    #[arg(long, num_args = 1.., required = true)]
    pub files: Vec<PathBuf>,

    /// User alias mapping JSON file
    #[arg(long)]
    pub aliases: PathBuf,

    /// User pairs to render (format: user1,user2)
    #[arg(long, num_args = 1.., value_name = "USER1,USER2")]
    pub users: Vec<String>,

    /// Directory for generated HTML files
    #[arg(long, default_value = "./output_html")]
    pub output: PathBuf,

    /// Dropdown configuration JSON, or "sample" for the built-in set
    #[arg(long, default_value = "sample")]
    pub config: String,
}

#[derive(Args, Debug)]
pub struct GroupArgs {
    /// Group chat log JSON file
    pub input: PathBuf,

    /// Chat room to render
    #[arg(long)]
    pub chat_id: String,

    /// User whose turns align right (default: most active sender)
    #[arg(long)]
    pub main_user: Option<String>,

    /// Directory for the generated HTML file
    #[arg(long, default_value = "./output_html")]
    pub output: PathBuf,

    /// Dropdown configuration JSON, or "sample" for the built-in set
    #[arg(long, default_value = "sample")]
    pub config: String,
}

/// Splits a `user1,user2` argument into a trimmed pair.
pub fn parse_user_pair(raw: &str) -> Result<(String, String), String> {
    match raw.split_once(',') {
        Some((a, b)) if !a.trim().is_empty() && !b.trim().is_empty() => {
            Ok((a.trim().to_string(), b.trim().to_string()))
        }
        _ => Err(format!("Invalid user pair '{raw}', expected user1,user2")),
    }
}

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

#[derive(Debug, Parser)]
#[command(
    name = "dashp",
    about = "Merge offline Dash docsets and fuzzy-search them from the terminal"
)]
pub struct Cli {
    /// Directory holding *.docset bundles
    #[arg(long, global = true)]
    pub docset_dir: Option<PathBuf>,

    /// Increase log verbosity (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only report errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(flatten)]
    pub open: OpenArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the docsets in the docset directory
    Docsets(DocsetsArgs),
    /// Print the merged entry list without prompting
    Entries(EntriesArgs),
    /// Generate shell completions
    #[command(hide = true)]
    Completions(CompletionsArgs),
}

// -- Default action: pick an entry and open it --

#[derive(Debug, Args)]
pub struct OpenArgs {
    /// Docset names or paths (default: every docset in the docset directory)
    pub docsets: Vec<String>,

    /// Only offer entries whose line contains this text
    #[arg(short = 'f', long)]
    pub filter: Option<String>,

    /// Initial query typed into the finder
    #[arg(long)]
    pub query: Option<String>,

    /// Print the chosen document's path instead of opening it
    #[arg(short = 'p', long)]
    pub print: bool,

    /// Fuzzy finder command (default: fzf)
    #[arg(long)]
    pub finder: Option<String>,

    /// Viewer command, given the document URL as last argument
    #[arg(long)]
    pub viewer: Option<String>,
}

// -- Docsets --

#[derive(Debug, Args)]
pub struct DocsetsArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Entries --

#[derive(Debug, Args)]
pub struct EntriesArgs {
    /// Docset names or paths (default: every docset in the docset directory)
    pub docsets: Vec<String>,

    /// Only print entries whose line contains this text
    #[arg(short = 'f', long)]
    pub filter: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Completions --

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

impl CompletionsArgs {
    /// Generate shell completions and print to stdout.
    pub fn generate(&self) {
        let mut cmd = Cli::command();
        clap_complete::generate(
            self.shell,
            &mut cmd,
            "dashp",
            &mut std::io::stdout(),
        );
    }
}

//! CLI argument structs for all subcommands.

use std::path::PathBuf;

use clap::Parser;

use mockchain::approach::TypeConversion;
use mockchain::convention::Convention;
use mockchain::rewrite::Target;

/// Where in which file to look, and how to configure the run.
#[derive(Parser, Debug, Clone)]
pub struct SelectionArgs {
    /// Java source file
    pub file: PathBuf,

    /// 1-based line of the chain, or the first line of a bulk selection
    #[arg(short, long)]
    pub line: usize,

    /// Last line of a bulk selection (every statement in between is converted)
    #[arg(long)]
    pub end_line: Option<usize>,

    /// 1-based column on --line (default: first non-blank character)
    #[arg(long)]
    pub column: Option<usize>,

    /// Enforced convention: mockito or bddMockito (overrides the config file)
    #[arg(long)]
    pub convention: Option<Convention>,

    /// Config file to use instead of discovering .mockchain.json
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct ConvertArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Target dialect, e.g. mockito-do-x, bddmockito-given, inorder-verify
    #[arg(long)]
    pub to: Target,

    /// Base name for an introduced InOrder variable (overrides the config file)
    #[arg(long)]
    pub in_order_name: Option<String>,

    /// Rewrite the file in place instead of printing the result
    #[arg(short, long)]
    pub write: bool,
}

#[derive(Parser, Debug)]
pub struct TargetsArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Base name for an introduced InOrder variable (overrides the config file)
    #[arg(long)]
    pub in_order_name: Option<String>,
}

#[derive(Parser, Debug)]
pub struct MergeArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Argument conversion for mixed throw runs: none, classes, throwables
    #[arg(long)]
    pub conversion: Option<TypeConversion>,

    /// Rewrite the file in place instead of printing the result
    #[arg(short, long)]
    pub write: bool,
}

#[derive(Parser, Debug)]
pub struct ThrowArgsArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Rewrite the file in place instead of printing the result
    #[arg(short, long)]
    pub write: bool,
}

#[derive(Parser, Debug)]
pub struct CreationArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Rewrite the file in place instead of printing the result
    #[arg(short, long)]
    pub write: bool,
}

#[derive(Parser, Debug)]
pub struct ToCallArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Method that receives the mock as a local variable
    #[arg(long)]
    pub method: String,

    /// Rewrite the file in place instead of printing the result
    #[arg(short, long)]
    pub write: bool,
}

#[derive(Parser, Debug)]
pub struct SettingsArgs {
    /// `@Mock(...)` annotation to translate into a withSettings() chain
    #[arg(long, conflicts_with = "call")]
    pub annotation: Option<String>,

    /// `Mockito.mock(...)` call to translate into a @Mock annotation
    #[arg(long)]
    pub call: Option<String>,

    /// Mocked type; with --annotation, print the whole Mockito.mock(...) call
    #[arg(long = "type")]
    pub type_name: Option<String>,

    /// Output JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Root directory to check
    #[arg(short, long, default_value = ".")]
    pub dir: String,

    /// File extension filter
    #[arg(short, long, default_value = "java")]
    pub ext: String,

    /// Only check files whose path matches this regex
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Enforced convention (default: from the config file in --dir)
    #[arg(long)]
    pub convention: Option<Convention>,

    /// Config file to use instead of discovering .mockchain.json
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of parallel threads (0 = auto)
    #[arg(short, long, default_value = "0")]
    pub threads: usize,

    /// Also check .gitignore'd files
    #[arg(long)]
    pub no_ignore: bool,

    /// Output JSON instead of text
    #[arg(long)]
    pub json: bool,
}

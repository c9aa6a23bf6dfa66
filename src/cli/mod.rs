//! CLI layer: argument parsing, command dispatch, and subcommand implementations.

pub mod args;
mod check;
mod settings;

pub use args::*;

use std::fs;
use std::path::Path;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use mockchain::approach::{Classification, mergeable_calls};
use mockchain::config::{Config, validate_identifier};
use mockchain::convention::{Convention, chain_violates};
use mockchain::java::JavaFile;
use mockchain::rewrite::{self, ChainRewriter, ConversionReport, Document, RewritePlan, SelectedChains, Selection};
use mockchain::{ChainError, read_file_lossy};

// ─── CLI ─────────────────────────────────────────────────────────────

/// Classifies and rewrites Mockito stubbing and verification call chains in Java sources
#[derive(Parser, Debug)]
#[command(
    name = "mockchain",
    version = concat!(env!("CARGO_PKG_VERSION"), " (built ", env!("BUILD_DATETIME"), ")"),
    about,
    after_help = "\
Run 'mockchain <COMMAND> --help' for detailed options and examples.\n\
Lines are 1-based; --line L --end-line E selects every statement in between."
)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log level: error, warn, info, debug, trace (RUST_LOG overrides)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Log output format on stderr
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Show which stubbing or verification dialect the selected chain uses
    Classify(SelectionArgs),

    /// List the dialects the selected chain can be converted to
    Targets(TargetsArgs),

    /// Convert the selected chain(s) to another dialect
    Convert(ConvertArgs),

    /// Merge consecutive thenThrow/doThrow/willThrow and *Return calls
    MergeThrows(MergeArgs),

    /// Toggle throw arguments between class literals and instances
    ThrowArgs(ThrowArgsArgs),

    /// Translate between @Mock attributes and Mockito.withSettings() chains
    Settings(SettingsArgs),

    /// Turn a Mockito.mock()/spy() call into a @Mock/@Spy field
    ToField(CreationArgs),

    /// Turn a @Mock/@Spy field into a Mockito.mock()/spy() call inside one method
    ToCall(ToCallArgs),

    /// Spell out a Mockito.mock()/spy() shorthand through Mockito.withSettings()
    ExpandMock(CreationArgs),

    /// Report calls that break the enforced convention in a directory tree
    Check(CheckArgs),
}

// ─── Main entry point ───────────────────────────────────────────────

pub fn run() {
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.log_format);

    let result = match cli.command {
        Commands::Classify(args) => cmd_classify(args),
        Commands::Targets(args) => cmd_targets(args),
        Commands::Convert(args) => cmd_convert(args),
        Commands::MergeThrows(args) => cmd_merge(args),
        Commands::ThrowArgs(args) => cmd_throw_args(args),
        Commands::Settings(args) => settings::cmd_settings(args),
        Commands::ToField(args) => cmd_to_field(args),
        Commands::ToCall(args) => cmd_to_call(args),
        Commands::ExpandMock(args) => cmd_expand_mock(args),
        Commands::Check(args) => check::cmd_check(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(log_level: &str, format: LogFormat) {
    let level = match log_level {
        "error" => LevelFilter::ERROR,
        "info" => LevelFilter::INFO,
        "debug" => LevelFilter::DEBUG,
        "trace" => LevelFilter::TRACE,
        _ => LevelFilter::WARN,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

// ─── Shared helpers ─────────────────────────────────────────────────

/// Explicit config file, else discovery from `start`; `--convention` wins over both.
pub(crate) fn resolve_config(
    start: &Path,
    explicit: Option<&Path>,
    convention: Option<Convention>,
) -> Result<Config, ChainError> {
    let mut config = match explicit {
        Some(path) => Config::load(path)?,
        None => Config::discover(start)?.0,
    };
    if convention.is_some() {
        config.convention = convention;
    }
    Ok(config)
}

struct Loaded {
    document: Document,
    file: JavaFile,
    config: Config,
}

fn load(args: &SelectionArgs) -> Result<Loaded, ChainError> {
    let (text, lossy) = read_file_lossy(&args.file)?;
    if lossy {
        warn!(file = %args.file.display(), "File is not valid UTF-8, replacement characters inserted");
    }
    let file = JavaFile::parse(text.clone())?;
    if file.has_errors() {
        warn!(file = %args.file.display(), "Java source has syntax errors, results may be incomplete");
    }
    let config = resolve_config(&args.file, args.config.as_deref(), args.convention)?;
    Ok(Loaded { document: Document::new(text), file, config })
}

/// `--line` alone is a caret, `--line`/`--end-line` a bulk range.
fn selection(file: &JavaFile, args: &SelectionArgs) -> Result<Selection, ChainError> {
    let last = args.end_line.unwrap_or(args.line);
    let span = file.line_span(args.line, last).ok_or_else(|| {
        ChainError::InvalidArgs(format!("Lines {}..={} are outside {}", args.line, last, args.file.display()))
    })?;
    if args.end_line.is_some() {
        return Ok(Selection::Range(span));
    }
    let text = file.span_text(span);
    let offset = match args.column {
        Some(column) if column > 0 => span.start + (column - 1).min(text.len()),
        _ => span.start + (text.len() - text.trim_start().len()),
    };
    Ok(Selection::Caret(offset))
}

fn in_order_base(cli_value: Option<&str>, config: &Config) -> Result<String, ChainError> {
    let base = cli_value.unwrap_or(&config.in_order_variable).to_string();
    validate_identifier(&base).map_err(ChainError::InvalidArgs)?;
    Ok(base)
}

/// Print the rewritten text, or write it back over `path`.
fn emit(text: &str, path: &Path, write: bool) -> Result<(), ChainError> {
    if write {
        fs::write(path, text)?;
        info!(file = %path.display(), "Rewrote file");
        eprintln!("Rewrote {}", path.display());
    } else {
        print!("{}", text);
    }
    Ok(())
}

fn print_json(value: &impl Serialize) -> Result<(), ChainError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ─── classify / targets ─────────────────────────────────────────────

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ChainInfo {
    line_start: usize,
    line_end: usize,
    text: String,
    calls: Vec<String>,
    /// Indices of calls that fold into the previous call of their run
    mergeable: Vec<usize>,
    /// Only with a convention configured
    #[serde(skip_serializing_if = "Option::is_none")]
    violates_convention: Option<bool>,
}

fn chain_infos(file: &JavaFile, selected: &SelectedChains, convention: Option<Convention>) -> Vec<ChainInfo> {
    selected
        .sites
        .iter()
        .map(|site| {
            let span = site.chain.span();
            let mergeable = match selected.classification {
                Classification::Stubbing(approach) => mergeable_calls(&site.chain, approach),
                Classification::Verification(_) => Vec::new(),
            };
            ChainInfo {
                line_start: file.line_of(span.start),
                line_end: file.line_of(span.end),
                text: file.span_text(span).to_string(),
                calls: site.chain.names().into_iter().map(str::to_string).collect(),
                mergeable,
                violates_convention: convention.map(|c| chain_violates(&site.chain, c)),
            }
        })
        .collect()
}

fn cmd_classify(args: SelectionArgs) -> Result<(), ChainError> {
    let loaded = load(&args)?;
    let rewriter = ChainRewriter::new(&loaded.file, loaded.config.policy());
    let selected = rewriter.select(selection(&loaded.file, &args)?)?;
    let invalid = rewriter.validate(&selected).err();
    let chains = chain_infos(&loaded.file, &selected, loaded.config.convention);

    if args.json {
        return print_json(&serde_json::json!({
            "approach": selected.classification.kind_str(),
            "presentable": selected.classification.presentable(),
            "family": selected.classification.family(),
            "bulk": selected.bulk,
            "valid": invalid.is_none(),
            "reason": invalid.as_ref().map(|r| r.to_string()),
            "chains": chains,
        }));
    }
    println!("{} ({})", selected.classification.presentable(), selected.classification.kind_str());
    for chain in &chains {
        println!("  {}:{}: {}", args.file.display(), chain.line_start, chain.calls.join(" → "));
        if !chain.mergeable.is_empty() {
            let names: Vec<&str> = chain.mergeable.iter().map(|&i| chain.calls[i].as_str()).collect();
            println!("    mergeable: {}", names.join(", "));
        }
        if let (Some(true), Some(convention)) = (chain.violates_convention, loaded.config.convention) {
            println!("    breaks the {} convention", convention);
        }
    }
    if let Some(reason) = invalid {
        println!("  not well-formed: {}", reason);
    }
    Ok(())
}

fn cmd_targets(args: TargetsArgs) -> Result<(), ChainError> {
    let loaded = load(&args.selection)?;
    let base = in_order_base(args.in_order_name.as_deref(), &loaded.config)?;
    let rewriter = ChainRewriter::new(&loaded.file, loaded.config.policy()).with_in_order_base(base);
    let selection = selection(&loaded.file, &args.selection)?;
    // Surface the reason when nothing is selectable at all.
    let selected = rewriter.select(selection)?;
    rewriter.validate(&selected)?;
    let targets = rewriter.available_targets(selection);

    if args.selection.json {
        let items: Vec<serde_json::Value> = targets
            .iter()
            .map(|t| serde_json::json!({ "target": t.as_str(), "presentable": t.presentable(), "family": t.family() }))
            .collect();
        return print_json(&items);
    }
    if targets.is_empty() {
        eprintln!("No conversion available for {}", selected.classification.presentable());
    }
    for target in targets {
        println!("{:<32} {}", target.as_str(), target.presentable());
    }
    Ok(())
}

// ─── convert ────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ConvertOutput<'a> {
    #[serde(flatten)]
    report: &'a ConversionReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
}

fn cmd_convert(args: ConvertArgs) -> Result<(), ChainError> {
    let Loaded { mut document, file, config } = load(&args.selection)?;
    let base = in_order_base(args.in_order_name.as_deref(), &config)?;
    let selection = selection(&file, &args.selection)?;
    let report = rewrite::convert(&mut document, selection, args.to, config.policy(), &base)?;

    if args.selection.json {
        let text = (!args.write && report.is_rewritten()).then(|| document.text());
        print_json(&ConvertOutput { report: &report, text })?;
    }
    if !report.is_rewritten() {
        return Err(ChainError::ConversionStopped {
            state: report.state.to_string().to_lowercase(),
            reason: report.reason.clone().unwrap_or_default(),
        });
    }
    eprintln!("{}", report.summary);
    if args.selection.json && !args.write {
        return Ok(());
    }
    emit(document.text(), &args.selection.file, args.write)
}

// ─── merge-throws / throw-args ──────────────────────────────────────

fn apply_plan(mut document: Document, plan: &RewritePlan, args: &SelectionArgs, write: bool) -> Result<(), ChainError> {
    document.apply(plan)?;
    if args.json {
        print_json(plan)?;
        if !write {
            return Ok(());
        }
    } else {
        eprintln!("{}", plan.summary);
    }
    emit(document.text(), &args.file, write)
}

fn cmd_merge(args: MergeArgs) -> Result<(), ChainError> {
    let loaded = load(&args.selection)?;
    let selection = selection(&loaded.file, &args.selection)?;
    let plan = ChainRewriter::new(&loaded.file, loaded.config.policy()).plan_merge(selection, args.conversion)?;
    apply_plan(loaded.document, &plan, &args.selection, args.write)
}

fn cmd_throw_args(args: ThrowArgsArgs) -> Result<(), ChainError> {
    let loaded = load(&args.selection)?;
    let selection = selection(&loaded.file, &args.selection)?;
    let plan = ChainRewriter::new(&loaded.file, loaded.config.policy()).plan_throw_arguments(selection)?;
    apply_plan(loaded.document, &plan, &args.selection, args.write)
}

// ─── Mock creation ───────────────────────────────────────────────────

/// Like [`selection`], but a bare `--line` covers the whole line so the
/// creation call need not start at its first non-blank character.
fn creation_selection(file: &JavaFile, args: &SelectionArgs) -> Result<Selection, ChainError> {
    match selection(file, args)? {
        Selection::Caret(_) if args.column.is_none() => {
            let span = file.line_span(args.line, args.line).ok_or_else(|| {
                ChainError::InvalidArgs(format!("Line {} is outside {}", args.line, args.file.display()))
            })?;
            Ok(Selection::Range(span))
        }
        other => Ok(other),
    }
}

fn cmd_to_field(args: CreationArgs) -> Result<(), ChainError> {
    let loaded = load(&args.selection)?;
    let selection = creation_selection(&loaded.file, &args.selection)?;
    let plan = rewrite::plan_creation_to_field(&loaded.file, selection)?;
    apply_plan(loaded.document, &plan, &args.selection, args.write)
}

fn cmd_to_call(args: ToCallArgs) -> Result<(), ChainError> {
    validate_identifier(&args.method).map_err(ChainError::InvalidArgs)?;
    let loaded = load(&args.selection)?;
    let selection = selection(&loaded.file, &args.selection)?;
    let plan = rewrite::plan_field_to_creation(&loaded.file, selection, &args.method)?;
    apply_plan(loaded.document, &plan, &args.selection, args.write)
}

fn cmd_expand_mock(args: CreationArgs) -> Result<(), ChainError> {
    let loaded = load(&args.selection)?;
    let selection = creation_selection(&loaded.file, &args.selection)?;
    let plan = rewrite::plan_expand_creation(&loaded.file, selection)?;
    apply_plan(loaded.document, &plan, &args.selection, args.write)
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;

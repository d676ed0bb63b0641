use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use issue_patcher::config::{self, FixerConfig};
use issue_patcher::issue::{load_issues, one_per_file, Issue};
use issue_patcher::{
    expander_for, extract_span, resolve, validate_patch, ContextExpander, ErrorContext,
    FilePatch, HeuristicExpander, LineSequence, PatchOutcome, SourceLanguage, SourceRoot,
    Strategy, TextRange,
};
use serde::Serialize;
use similar::{ChangeTag, TextDiff};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "issue-patcher")]
#[command(about = "Resolve analysis issues to source context and patch it", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (falls back to $ISSUE_PATCHER_CONFIG, then defaults)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the exact text an issue range covers
    Extract {
        file: PathBuf,

        /// Issue span as LINE:COL-LINE:COL (1-based lines, 0-based columns)
        #[arg(short, long)]
        range: TextRange,
    },

    /// Print the enclosing declaration of an issue range
    Context {
        file: PathBuf,

        #[arg(short, long)]
        range: TextRange,

        /// Override the configured expansion strategy
        #[arg(short, long)]
        strategy: Option<Strategy>,

        /// Emit the resolution as JSON
        #[arg(long)]
        json: bool,
    },

    /// Replace the enclosing declaration of an issue range
    Patch(PatchArgs),

    /// Resolve every issue of an analysis report to JSON lines
    Issues {
        /// Issue search response (or a bare JSON array of issues)
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        strategy: Option<Strategy>,
    },
}

#[derive(Args)]
struct PatchArgs {
    file: PathBuf,

    #[arg(short, long)]
    range: TextRange,

    /// File holding the replacement context, or `-` for stdin
    #[arg(long)]
    replacement: PathBuf,

    /// Treat the replacement as a raw generator reply (marker + code)
    #[arg(long)]
    reply: bool,

    #[arg(short, long)]
    strategy: Option<Strategy>,

    /// Dry run - show what would be changed without modifying files
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Show unified diff of changes
    #[arg(short, long)]
    diff: bool,

    /// Run the configured formatter on the patched file
    #[arg(long)]
    format: bool,

    /// Write even if the replacement introduces syntax errors
    #[arg(long)]
    force: bool,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Extract { file, range } => cmd_extract(&file, &range),

        Commands::Context {
            file,
            range,
            strategy,
            json,
        } => cmd_context(&config, &file, &range, strategy, json),

        Commands::Patch(args) => cmd_patch(&config, &args),

        Commands::Issues { input, strategy } => cmd_issues(&config, &input, strategy),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Expander for `file`, with a CLI override taking precedence over config.
fn pick_expander(
    strategy: Strategy,
    file: &Path,
    heuristic: HeuristicExpander,
) -> Result<Box<dyn ContextExpander>> {
    Ok(expander_for(strategy, file, heuristic)?)
}

/// Helper: Show unified diff between original and modified content
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (patched)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for change in diff.iter_all_changes() {
        let line = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => format!(" {}", change).normal(),
        };
        print!("{}", line);
        if change.missing_newline() {
            println!();
        }
    }
}

fn cmd_extract(file: &Path, range: &TextRange) -> Result<()> {
    let source = read_source(file)?;
    let lines = LineSequence::split(&source);
    let span = extract_span(&lines, range)?;
    println!("{span}");
    Ok(())
}

fn cmd_context(
    config: &FixerConfig,
    file: &Path,
    range: &TextRange,
    strategy: Option<Strategy>,
    json: bool,
) -> Result<()> {
    let source = read_source(file)?;
    let lines = LineSequence::split(&source);
    let expander = pick_expander(
        strategy.unwrap_or(config.context.strategy),
        file,
        config.heuristic_expander()?,
    )?;
    let resolution = resolve(&lines, range, expander.as_ref())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&resolution)?);
        return Ok(());
    }

    let ctx = &resolution.context;
    eprintln!(
        "{}",
        format!(
            "{}: lines {}-{} ({})",
            file.display(),
            ctx.start_line + 1,
            ctx.end_line,
            expander.name()
        )
        .dimmed()
    );
    println!("{}", ctx.context);
    Ok(())
}

fn read_replacement(source: &Path) -> Result<String> {
    if source == Path::new("-") {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("failed to read replacement from stdin")?;
        return Ok(text);
    }
    read_source(source)
}

fn cmd_patch(config: &FixerConfig, args: &PatchArgs) -> Result<()> {
    let root = SourceRoot::new(&config.source_root)?;
    let file = root.resolve(&args.file)?;

    let original = read_source(&file)?;
    let lines = LineSequence::split(&original);
    let expander = pick_expander(
        args.strategy.unwrap_or(config.context.strategy),
        &file,
        config.heuristic_expander()?,
    )?;
    let resolution = resolve(&lines, &args.range, expander.as_ref())?;

    let raw = read_replacement(&args.replacement)?;
    let replacement = if args.reply {
        config
            .reply_check()
            .accept(&raw, resolution.context.line_count())?
    } else {
        // Context text never carries its final terminator.
        raw.trim_end_matches(['\r', '\n']).to_string()
    };
    let replacement = lines.ending().normalize(&replacement);

    let patch = FilePatch::new(&file, &resolution.context, replacement);
    let Some(patched) = patch.preview(&original)? else {
        println!("{} Already applied to {}", "⊙".yellow(), file.display());
        return Ok(());
    };

    if !args.force {
        if let Some(language) = SourceLanguage::from_path(&file) {
            validate_patch(language, &original, &patched).with_context(|| {
                format!(
                    "replacement introduces syntax errors in {} (use --force to write anyway)",
                    file.display()
                )
            })?;
        }
    }

    if args.dry_run {
        println!("{}", "[DRY RUN - showing what would be applied]".cyan());
        println!(
            "{} Would replace lines {}-{} of {}",
            "✓".green(),
            patch.start_line + 1,
            patch.end_line,
            file.display()
        );
        if args.diff {
            display_diff(&file, &original, &patched);
        }
        return Ok(());
    }

    match patch.apply()? {
        PatchOutcome::Applied {
            file,
            lines_removed,
            lines_inserted,
        } => {
            println!(
                "{} Applied to {} (-{} +{} lines)",
                "✓".green(),
                file.display(),
                lines_removed,
                lines_inserted
            );
        }
        PatchOutcome::AlreadyApplied { file } => {
            println!("{} Already applied to {}", "⊙".yellow(), file.display());
            return Ok(());
        }
    }

    if args.diff {
        display_diff(&file, &original, &patched);
    }

    if args.format {
        match &config.formatter {
            Some(formatter) => {
                if let Err(e) = formatter.run(&file) {
                    warn!(file = %file.display(), error = %e, "formatter failed, keeping unformatted patch");
                    eprintln!("{} Formatter failed: {}", "⚠".yellow(), e);
                }
            }
            None => eprintln!("{}", "No [formatter] configured, skipping --format".yellow()),
        }
    }

    Ok(())
}

/// One line of `issues` output.
#[derive(Serialize)]
struct IssueRecord<'a> {
    key: &'a str,
    rule: &'a str,
    message: &'a str,
    file: String,
    error_spot: String,
    context: ErrorContext,
}

fn resolve_issue<'a>(
    root: &SourceRoot,
    issue: &'a Issue,
    range: &TextRange,
    strategy: Strategy,
    heuristic: &HeuristicExpander,
) -> Result<IssueRecord<'a>> {
    let file = root.resolve(issue.relative_path())?;
    let source = read_source(&file)?;
    let lines = LineSequence::split(&source);
    let expander = pick_expander(strategy, &file, heuristic.clone())?;
    let resolution = resolve(&lines, range, expander.as_ref())?;

    Ok(IssueRecord {
        key: &issue.key,
        rule: &issue.rule,
        message: &issue.message,
        file: file.display().to_string(),
        error_spot: resolution.error_spot,
        context: resolution.context,
    })
}

fn cmd_issues(config: &FixerConfig, input: &Path, strategy: Option<Strategy>) -> Result<()> {
    let issues = load_issues(input)?;
    let root = SourceRoot::new(&config.source_root)?;
    let heuristic = config.heuristic_expander()?;
    let strategy = strategy.unwrap_or(config.context.strategy);

    let allowed: Vec<&Issue> = config.filter.apply(&issues).collect();
    let filtered_out = issues.len() - allowed.len();
    let allowed_count = allowed.len();
    // A patch shifts later spans in its file, so only the first issue per file runs.
    let selected = one_per_file(allowed);
    let deferred = allowed_count - selected.len();

    let mut resolved = 0;
    let mut skipped = 0;
    let mut failed = 0;

    for issue in selected {
        let Some(range) = issue.text_range else {
            eprintln!("{} {}: Skipped (file-level issue, no text range)", "⊘".cyan(), issue.key);
            skipped += 1;
            continue;
        };

        match resolve_issue(&root, issue, &range, strategy, &heuristic) {
            Ok(record) => {
                println!("{}", serde_json::to_string(&record)?);
                resolved += 1;
            }
            Err(e) => {
                eprintln!("{} {}: Failed - {:#}", "✗".red(), issue.key, e);
                eprintln!("  Component: {}", issue.component);
                failed += 1;
            }
        }
    }

    // stdout carries JSON lines only
    eprintln!();
    eprintln!("{}", "Summary:".bold());
    eprintln!("  {} resolved", format!("{}", resolved).green());
    eprintln!("  {} filtered", format!("{}", filtered_out).dimmed());
    eprintln!("  {} deferred (same file)", format!("{}", deferred).dimmed());
    eprintln!("  {} skipped", format!("{}", skipped).cyan());
    eprintln!("  {} failed", format!("{}", failed).red());

    if failed > 0 {
        std::process::exit(1);
    }

    Ok(())
}

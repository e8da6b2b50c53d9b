use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use ipts_core::{FilterParams, ProfileLoader, RulesetSummary};
use ipts_save::{RulesetDiff, parse_with_diagnostics, scrub};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "iptscrub")]
#[command(version, about = "Clean iptables-save dumps for iptables-restore", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Filter a dump and write it in restore format
    Clean(CleanArgs),
    /// Show tables with their chain and rule counts
    Inspect {
        /// iptables-save file to read ("-" for stdin)
        #[arg(short, long)]
        input: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Filter profile management
    Profiles {
        #[command(subcommand)]
        action: ProfilesAction,
    },
}

#[derive(Args)]
struct CleanArgs {
    /// iptables-save file to read ("-" for stdin)
    #[arg(short, long)]
    input: PathBuf,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Comma-separated chains to keep (e.g. INPUT,OUTPUT). Defaults to all chains.
    #[arg(long, value_delimiter = ',')]
    chains: Vec<String>,

    /// Comma-separated tables to keep (e.g. filter,nat). Defaults to all tables.
    #[arg(long, value_delimiter = ',')]
    tables: Vec<String>,

    /// Comma-separated chain prefixes / rule substrings to drop (e.g. DOCKER,KUBE)
    #[arg(long, value_delimiter = ',')]
    exclude: Vec<String>,

    /// Named profile merged with the flags above
    #[arg(long, conflicts_with = "profile_file")]
    profile: Option<String>,

    /// Profile YAML file merged with the flags above
    #[arg(long)]
    profile_file: Option<PathBuf>,

    /// Print a diff of the parsed and cleaned rulesets to stderr
    #[arg(long)]
    diff: bool,
}

#[derive(Subcommand)]
enum ProfilesAction {
    /// List built-in and on-disk profiles
    List,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Clean(args) => handle_clean(&args, &ProfileLoader::new())?,
        Commands::Inspect { input, json } => handle_inspect(&input, json)?,
        Commands::Profiles { action } => handle_profiles_action(action)?,
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn open_input(path: &Path) -> Result<Box<dyn BufRead>> {
    if path == Path::new("-") {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }

    let file = File::open(path)
        .with_context(|| format!("failed to open input file '{}'", path.display()))?;
    Ok(Box::new(BufReader::new(file)))
}

/// Flags, unioned with the selected profile if any
fn resolve_params(args: &CleanArgs, loader: &ProfileLoader) -> Result<FilterParams> {
    let mut params = FilterParams::new()
        .with_tables(&args.tables)
        .with_chains(&args.chains)
        .with_exclude(&args.exclude);

    if let Some(name) = &args.profile {
        let profile = loader
            .find(name)
            .with_context(|| format!("cannot use profile '{}'", name))?;
        tracing::debug!(profile = %profile.name, "using profile");
        params = params.merge(&profile.params);
    }

    if let Some(path) = &args.profile_file {
        let profile = loader.load_profile(path)?;
        tracing::debug!(profile = %profile.name, path = %path.display(), "using profile file");
        params = params.merge(&profile.params);
    }

    Ok(params)
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create output file '{}'", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
    }
}

fn handle_clean(args: &CleanArgs, loader: &ProfileLoader) -> Result<()> {
    let params = resolve_params(args, loader)?;
    let reader = open_input(&args.input)?;
    let scrubbed = scrub(reader, &params)
        .with_context(|| format!("failed to parse iptables data from '{}'", args.input.display()))?;

    scrubbed.report.log();

    if args.diff {
        eprint!("{}", render_diff_summary(&scrubbed.diff()));
    }

    // output is only touched once the input has parsed
    let mut writer = open_output(args.output.as_deref())?;
    scrubbed
        .write_to(&mut *writer)
        .context("failed to write rules")?;
    writer.flush().context("failed to flush output")?;

    Ok(())
}

fn render_diff_summary(diff: &RulesetDiff) -> String {
    match &diff.diff {
        None => "✅ Nothing removed\n".to_string(),
        Some(text) => format!(
            "{}\n📋 {} line(s) removed, {} added\n",
            text, diff.removed, diff.added
        ),
    }
}

fn handle_inspect(input: &Path, json: bool) -> Result<()> {
    let reader = open_input(input)?;
    let outcome = parse_with_diagnostics(reader)
        .with_context(|| format!("failed to parse iptables data from '{}'", input.display()))?;

    let summary = RulesetSummary::from_ruleset(&outcome.ruleset);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    summary.display();

    if !outcome.warnings.is_empty() {
        println!("\n⚠️  Skipped lines ({}):", outcome.warnings.len());
        for warning in &outcome.warnings {
            println!("  • {}", warning);
        }
    }

    Ok(())
}

fn handle_profiles_action(action: ProfilesAction) -> Result<()> {
    match action {
        ProfilesAction::List => list_profiles(&ProfileLoader::new()),
    }
}

fn list_profiles(loader: &ProfileLoader) -> Result<()> {
    let profiles = loader.load_default_profiles();

    println!("Available filter profiles ({}):\n", profiles.len());
    for (name, profile) in &profiles {
        println!("  • {} - {}", name, profile.description);
        if !profile.params.tables.is_empty() {
            println!("    Tables: {}", join(&profile.params.tables));
        }
        if !profile.params.chains.is_empty() {
            println!("    Chains: {}", join(&profile.params.chains));
        }
        if !profile.params.exclude.is_empty() {
            println!("    Exclude: {}", join(&profile.params.exclude));
        }
    }

    let dirs: Vec<String> = loader
        .search_dirs()
        .iter()
        .map(|d| d.display().to_string())
        .collect();
    println!("\nAdd profiles to {}", dirs.join(" or "));

    Ok(())
}

fn join<'a>(items: impl IntoIterator<Item = &'a String>) -> String {
    items
        .into_iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

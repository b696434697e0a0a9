use clap::Parser;
use site_scaffold::config::{self, ScaffoldConfig};
use site_scaffold::exclusion::ExclusionSet;
use site_scaffold::output;
use site_scaffold::pipeline::{self, SiteError, Stages};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "site-scaffold")]
#[command(version)]
#[command(about = "Directory listings and a _headers file for static file trees")]
#[command(long_about = "\
Directory listings and a _headers file for static file trees

Writes an index.html listing into every directory under ROOT and a single
_headers file at ROOT that serves HTML documents as text/html and every
other file as text/plain.

  site/
  ├── _headers          # /a/b/c.txt → text/plain, /d.html → text/html, ...
  ├── index.html        # lists a/ and d.html
  ├── d.html
  └── a/
      ├── index.html    # lists b/
      └── b/
          ├── index.html
          └── c.txt

.git directories are skipped everywhere. Existing listings and the
_headers file are overwritten on every run.

Run 'site-scaffold --gen-config' to print a documented config file.")]
struct Cli {
    /// Root directory to process
    #[arg(default_value = ".")]
    root: PathBuf,

    /// TOML file overriding the default names and exclusions
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Only write listing documents
    #[arg(long, conflicts_with = "headers_only")]
    listings_only: bool,

    /// Only write the header-rule file
    #[arg(long)]
    headers_only: bool,

    /// Show what would be written without writing anything
    #[arg(long, conflicts_with_all = ["listings_only", "headers_only"])]
    check: bool,

    /// With --check, print the plan as JSON
    #[arg(long, requires = "check")]
    json: bool,

    /// Print a documented config file with all defaults and exit
    #[arg(long)]
    gen_config: bool,

    /// Log every file written
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors and skip the summary
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if cli.gen_config {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let config = match &cli.config {
        Some(path) => config::load_config(path).map_err(SiteError::from)?,
        None => ScaffoldConfig::default(),
    };
    let root = pipeline::validate_root(&cli.root)?;
    let exclusions = ExclusionSet::resolve(&config, tool_paths(cli));

    if cli.check {
        let plan = pipeline::plan(&root, &config, &exclusions)?;
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&plan)?);
        } else {
            output::print_plan(&plan);
        }
        return Ok(());
    }

    let stages = if cli.listings_only {
        Stages::LISTINGS
    } else if cli.headers_only {
        Stages::HEADERS
    } else {
        Stages::ALL
    };

    let summary = pipeline::run(&root, &config, &exclusions, stages)?;
    if !cli.quiet {
        output::print_run_summary(&summary, &root, stages.listings);
    }
    Ok(())
}

/// Files owned by the tool itself, kept out of listings and header rules.
fn tool_paths(cli: &Cli) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Ok(exe) = std::env::current_exe() {
        paths.push(exe);
    }
    if let Some(config) = &cli.config {
        paths.push(config.clone());
    }
    paths
}

/// Install the stderr log subscriber. `RUST_LOG` wins over the flags.
fn init_logging(verbose: bool, quiet: bool) {
    let default_level = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .init();
}

//! CLI entry point for the semantic path tool.
//!
//! Parses arguments, layers configuration, loads the Go program once and
//! dispatches to the command implementations in `spath::commands`.

use anyhow::Context;
use clap::{
    Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use spath::commands::{self, Workspace};
use spath::display::THEME;
use spath::io::{ExitCode, OutputFormat, OutputManager};
use spath::{Kind, Settings, SpathError};
use std::path::PathBuf;
use std::time::Instant;
use tracing::level_filters::LevelFilter;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// Semantic addresses for Go declarations
#[derive(Parser)]
#[command(
    name = "spath",
    version = env!("CARGO_PKG_VERSION"),
    about = "Resolve, enumerate and glob semantic addresses in Go code",
    long_about = "Every Go declaration and its parts have an address: pkg.Symbol, pkg.Type.Method, pkg.Symbol/category[selector].",
    next_line_help = true,
    styles = clap_cargo_style(),
    after_help = "Examples:\n  spath resolve example.com/app/store.Store/fields[Name]/tag[json]\n  spath list 'store.**' --limit 20\n  spath list '**/internal/**.New' --scope project\n  spath lookup Config\n  spath scope 'internal/...,-internal/testdata/...'\n  spath dead --scope project"
)]
struct Cli {
    /// Root of the Go module to load
    #[arg(short, long, global = true, default_value = ".", env = "SPATH_ROOT")]
    root: PathBuf,

    /// Path to custom settings.toml file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output JSON envelopes instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Log debug information to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
enum Commands {
    /// Resolve one address, or a bare symbol name
    Resolve {
        address: String,

        /// Print the source text of the resolved node
        #[arg(short, long)]
        source: bool,
    },

    /// List addresses matching a wildcard pattern
    #[command(
        after_help = "Wildcards:\n  *     anything within one segment (never crosses . / [ ])\n  **    anything, across segments\n  **/   optional leading path\n  /**   optional trailing subpath"
    )]
    List {
        pattern: String,

        /// Maximum number of matches to print (0 for no limit)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Restrict to packages selected by a scope expression
        #[arg(short, long)]
        scope: Option<String>,

        /// Package the `package` keyword refers to
        #[arg(short, long)]
        target: Option<String>,
    },

    /// Summarize indexed symbols per package
    Symbols {
        #[arg(short, long)]
        scope: Option<String>,

        #[arg(short, long)]
        target: Option<String>,

        /// Only this kind: func, method, type, interface, const, var
        #[arg(short, long)]
        kind: Option<Kind>,
    },

    /// Find every qualified declaration with a bare name
    Lookup { name: String },

    /// Show the packages a scope expression selects
    Scope {
        expression: String,

        /// Package the `package` keyword refers to
        #[arg(short, long)]
        target: Option<String>,
    },

    /// Report declarations unreachable from entry points
    Dead {
        #[arg(short, long)]
        scope: Option<String>,

        #[arg(short, long)]
        target: Option<String>,
    },

    /// Set up .spath directory with default configuration
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Display active settings
    Config,
}

fn main() {
    let cli = Cli::parse();
    let code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}", THEME.error_with_icon(&format!("{e:#}")));
            ExitCode::GeneralError
        }
    };
    std::process::exit(code.into());
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let settings = match &cli.config {
        Some(path) => Settings::load_from(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => Settings::load().unwrap_or_else(|e| {
            eprintln!("Configuration error: {e}");
            eprintln!("Using default configuration.");
            Settings::default()
        }),
    };

    init_logging(cli.verbose || settings.debug);
    let format = OutputFormat::from_json_flag(cli.json);
    let mut out = OutputManager::new(format);

    match &cli.command {
        Commands::Init { force } => {
            let root = Settings::workspace_root().unwrap_or_else(|| cli.root.clone());
            return match Settings::init_config_file(&root, *force) {
                Ok(path) => {
                    println!("Created configuration file at: {}", path.display());
                    println!("Edit this file to customize your settings.");
                    Ok(ExitCode::Success)
                }
                Err(e) => {
                    eprintln!("{}", THEME.error_with_icon(&e.to_string()));
                    Ok(ExitCode::ConfigError)
                }
            };
        }
        Commands::Config => {
            println!("Current Configuration:");
            println!("{}", "=".repeat(50));
            println!("{}", settings.to_toml().context("rendering settings")?);
            return Ok(ExitCode::Success);
        }
        _ => {}
    }

    let started = Instant::now();
    let ws = match Workspace::load(&cli.root, settings) {
        Ok(ws) => ws,
        Err(e) => {
            let error = SpathError::from(e);
            return Ok(out.error(&error, Vec::new(), &Default::default())?);
        }
    };
    tracing::info!(
        "loaded {} packages, {} symbols in {:?}",
        ws.program.packages().len(),
        ws.index.len(),
        started.elapsed()
    );

    let code = match &cli.command {
        Commands::Resolve { address, source } => commands::resolve(&ws, &mut out, address, *source),
        Commands::List {
            pattern,
            limit,
            scope,
            target,
        } => commands::list(
            &ws,
            &mut out,
            pattern,
            *limit,
            scope.as_deref(),
            target.as_deref(),
        ),
        Commands::Symbols {
            scope,
            target,
            kind,
        } => commands::symbols(&ws, &mut out, scope.as_deref(), target.as_deref(), *kind),
        Commands::Lookup { name } => commands::lookup(&ws, &mut out, name),
        Commands::Scope { expression, target } => {
            commands::scope(&ws, &mut out, expression, target.as_deref())
        }
        Commands::Dead { scope, target } => {
            commands::dead(&ws, &mut out, scope.as_deref(), target.as_deref())
        }
        Commands::Init { .. } | Commands::Config => Ok(ExitCode::Success),
    }
    .context("writing output")?;

    Ok(code)
}

/// Logs go to stderr so JSON on stdout stays parseable.
fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

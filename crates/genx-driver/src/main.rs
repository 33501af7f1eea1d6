use ariadne::{Color, Label, Report, ReportKind, Source};
use clap::{Parser, Subcommand};
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;

use genx_driver::{GenOptions, Generator, ResolutionContext};
use genx_parser::{parse_import, ParseError};

#[derive(Parser)]
#[command(
    name = "genx",
    version = "0.1.0",
    about = "Inline imported TypeScript types into self-contained schema sources",
    long_about = "Resolves imports of local files, installed packages and workspace\npackages, pulls in every referenced type declaration and emits one\nself-contained source per input."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Project root holding package.json and node_modules
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Root used for dependencies referenced as `workspace:`
    #[arg(long, global = true)]
    workspace_root: Option<PathBuf>,

    /// Resolve relative imports next to the importing file
    #[arg(long, global = true)]
    nearby: bool,

    /// JSON options file (genx.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one file and print the result
    File {
        /// Input TypeScript file
        input: PathBuf,
    },

    /// Generate every .ts file of a directory into another directory
    Dir {
        /// Input directory, relative to the root
        input: PathBuf,

        /// Output directory, relative to the root
        output: PathBuf,
    },

    /// Generate source read from stdin
    Code {
        /// File the source is treated as coming from
        #[arg(long)]
        path: Option<PathBuf>,
    },

    /// Parse one import statement and print it as JSON (debug)
    ParseImport {
        /// Import statement text
        statement: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    if let Commands::ParseImport { statement } = &cli.command {
        return parse_import_command(statement);
    }

    let options = match load_options(&cli) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let generator = Generator::new(options);
    let mut ctx = ResolutionContext::new();

    match cli.command {
        Commands::File { input } => file_command(&generator, &mut ctx, input),
        Commands::Dir { input, output } => dir_command(&generator, &mut ctx, input, output),
        Commands::Code { path } => code_command(&generator, &mut ctx, path),
        Commands::ParseImport { .. } => ExitCode::SUCCESS,
    }
}

/// Options file first, then command-line overrides
fn load_options(cli: &Cli) -> genx_driver::GenResult<GenOptions> {
    let mut options = match &cli.config {
        Some(path) => GenOptions::from_file(path)?,
        None => GenOptions::default(),
    };
    if let Some(root) = &cli.root {
        options.root = root.clone();
    }
    if let Some(workspace_root) = &cli.workspace_root {
        options.workspace_root = Some(workspace_root.clone());
    }
    if cli.nearby {
        options.include_nearby_files = true;
    }
    Ok(options)
}

fn file_command(generator: &Generator, ctx: &mut ResolutionContext, input: PathBuf) -> ExitCode {
    match generator.generate_by_file(ctx, &input) {
        Ok(code) => {
            println!("{}", code);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn dir_command(generator: &Generator, ctx: &mut ResolutionContext, input: PathBuf, output: PathBuf) -> ExitCode {
    match generator.generate_by_dir(ctx, &input, &output) {
        Ok(report) => {
            eprintln!(
                "Generated {} file(s), {} failed",
                report.written.len(),
                report.failed.len()
            );
            for (path, err) in &report.failed {
                eprintln!("  {}: {}", path.display(), err);
            }
            if report.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn code_command(generator: &Generator, ctx: &mut ResolutionContext, path: Option<PathBuf>) -> ExitCode {
    let mut source = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut source) {
        eprintln!("Error reading stdin: {}", e);
        return ExitCode::FAILURE;
    }

    match generator.generate_by_code(ctx, &source, path.as_deref()) {
        Ok(code) => {
            println!("{}", code);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn parse_import_command(statement: &str) -> ExitCode {
    match parse_import(statement) {
        Ok(spec) => match serde_json::to_string_pretty(&spec) {
            Ok(json) => {
                println!("{}", json);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::FAILURE
            }
        },
        Err(err) => {
            report_parse_error(&err, "<import>", statement);
            ExitCode::FAILURE
        }
    }
}

fn report_parse_error(err: &ParseError, filename: &str, source: &str) {
    let end = err.span.end.min(source.len());
    let start = err.span.start.min(end);
    let span = (filename, start..end);
    let printed = Report::build(ReportKind::Error, span.clone())
        .with_code("E0100")
        .with_message("Invalid import statement")
        .with_label(
            Label::new(span)
                .with_message(&err.message)
                .with_color(Color::Red),
        )
        .finish()
        .eprint((filename, Source::from(source)));
    if let Err(e) = printed {
        eprintln!("Error: {}", err);
        eprintln!("(diagnostic could not be rendered: {})", e);
    }
}

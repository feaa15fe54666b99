// Command-line entry point for calltrace.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use calltrace::application::{self, RunOptions};

/// Trace what a TypeScript function or class method calls and print a D2 diagram.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Source file containing the entry point
    source_file: PathBuf,

    /// Entry point: `functionName` or `ClassName.methodName`
    call_target: String,

    /// Project configuration file
    #[arg(short, long, default_value = "tsconfig.json")]
    tsconfig: PathBuf,

    /// Dependency package to leave out of the diagram (repeatable)
    #[arg(short, long = "ignore-package", visible_alias = "ignorePackage")]
    ignore_package: Vec<String>,

    /// Print debug logs and error details to stderr
    #[arg(long)]
    debug: bool,

    /// Do not group nodes by file path
    #[arg(long, visible_alias = "omitFileNames")]
    omit_file_names: bool,

    /// Do not group methods by class (accepted, currently no effect)
    #[arg(long, visible_alias = "dontGroupClasses")]
    dont_group_classes: bool,
}

fn init_tracing(debug: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if debug { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let options = RunOptions {
        source_file: cli.source_file,
        call_target: cli.call_target,
        tsconfig: cli.tsconfig,
        ignored_packages: cli.ignore_package,
        omit_file_names: cli.omit_file_names,
        dont_group_classes: cli.dont_group_classes,
    };

    // The diagram is buffered so a failed run prints nothing to stdout.
    let mut diagram = Vec::new();
    match application::run(&options, &mut diagram) {
        Ok(()) => {
            let mut stdout = io::stdout().lock();
            if let Err(err) = stdout.write_all(&diagram).and_then(|_| stdout.flush()) {
                eprintln!("Error: failed to write diagram: {}", err);
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error: {:#}", err);
            if cli.debug {
                eprintln!("{:?}", err);
            }
            ExitCode::FAILURE
        }
    }
}

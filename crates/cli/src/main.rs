use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use scptool_core::{FileSystemProvider, Registry, ScpError, SkipList, VariableStore};

/// Output format for CLI error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Installer-script (scp) entity inspection toolchain.
#[derive(Parser)]
#[command(name = "scptool", version, about = "scp entity parser and linker")]
struct Cli {
    /// Output format for errors and diagnostics (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dump all parsed entities as flat attribute blocks
    Dump {
        /// Directories to scan for .scp files, or individual .scp files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Source file names to ignore (comma separated)
        #[arg(long, value_delimiter = ',')]
        skip: Vec<String>,
    },

    /// Render the linked module tree rooted at the given module ids
    Tree {
        /// Directories to scan for .scp files, or individual .scp files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Root module ids, one tree per root
        #[arg(long, required = true)]
        root: Vec<String>,
        /// Locale for Name/Value fallback lookups
        #[arg(long, default_value = "en-US")]
        locale: String,
        /// Settings file providing ${VAR} substitution values
        #[arg(long)]
        settings: Option<PathBuf>,
        /// Source file names to ignore (comma separated)
        #[arg(long, value_delimiter = ',')]
        skip: Vec<String>,
    },

    /// Export the parsed entity registry as canonical JSON
    Export {
        /// Directories to scan for .scp files, or individual .scp files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Source file names to ignore (comma separated)
        #[arg(long, value_delimiter = ',')]
        skip: Vec<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Dump { inputs, skip } => {
            cmd_dump(&inputs, skip, cli.output, cli.quiet);
        }
        Commands::Tree {
            inputs,
            root,
            locale,
            settings,
            skip,
        } => {
            cmd_tree(
                &inputs,
                &root,
                &locale,
                settings.as_deref(),
                skip,
                cli.output,
                cli.quiet,
            );
        }
        Commands::Export { inputs, skip } => {
            cmd_export(&inputs, skip, cli.output, cli.quiet);
        }
    }
}

/// Expand directory arguments into their sorted .scp contents; bare file
/// arguments pass through as-is.
fn collect_inputs(inputs: &[PathBuf], output: OutputFormat, quiet: bool) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            match scptool_core::collect_scp_files(input) {
                Ok(found) => files.extend(found),
                Err(e) => {
                    report_error(
                        &format!("cannot scan directory '{}': {}", input.display(), e),
                        output,
                        quiet,
                    );
                    process::exit(1);
                }
            }
        } else {
            files.push(input.clone());
        }
    }
    files
}

fn load(
    inputs: &[PathBuf],
    skip: Vec<String>,
    output: OutputFormat,
    quiet: bool,
) -> (Registry, Vec<ScpError>) {
    let files = collect_inputs(inputs, output, quiet);
    let skip = SkipList::new(skip);
    match scptool_core::load_registry(&files, &skip, &FileSystemProvider) {
        Ok(loaded) => loaded,
        Err(e) => {
            report_scp_error(&e, output, quiet);
            process::exit(1);
        }
    }
}

fn cmd_dump(inputs: &[PathBuf], skip: Vec<String>, output: OutputFormat, quiet: bool) {
    let (registry, diags) = load(inputs, skip, output, quiet);
    report_diags(&diags, output, quiet);
    print!("{}", scptool_core::render_flat(&registry));
}

fn cmd_tree(
    inputs: &[PathBuf],
    roots: &[String],
    locale: &str,
    settings: Option<&Path>,
    skip: Vec<String>,
    output: OutputFormat,
    quiet: bool,
) {
    let (registry, mut diags) = load(inputs, skip, output, quiet);

    let flat_vars: BTreeMap<String, String> = match settings {
        Some(path) => {
            let text = match std::fs::read_to_string(path) {
                Ok(t) => t,
                Err(e) => {
                    report_error(
                        &format!("cannot read settings file '{}': {}", path.display(), e),
                        output,
                        quiet,
                    );
                    process::exit(1);
                }
            };
            // Settings parse errors are recoverable: report them and
            // render with an empty variable map, like any other skipped
            // unit.
            match VariableStore::load(&text, &path.to_string_lossy()) {
                Ok(store) => store.flatten(),
                Err(e) => {
                    report_scp_error(&e, output, quiet);
                    BTreeMap::new()
                }
            }
        }
        None => BTreeMap::new(),
    };

    let forest = match scptool_core::link(&registry) {
        Ok(f) => f,
        Err(e) => {
            report_scp_error(&e, output, quiet);
            process::exit(1);
        }
    };

    let out = scptool_core::render_tree(&registry, &forest, &flat_vars, roots, locale, &mut diags);
    report_diags(&diags, output, quiet);
    print!("{}", out);
}

fn cmd_export(inputs: &[PathBuf], skip: Vec<String>, output: OutputFormat, quiet: bool) {
    let (registry, diags) = load(inputs, skip, output, quiet);
    report_diags(&diags, output, quiet);
    let value = scptool_core::to_json(&registry);
    match serde_json::to_string_pretty(&value) {
        Ok(pretty) => println!("{}", pretty),
        Err(e) => {
            report_error(&format!("serialization error: {}", e), output, quiet);
            process::exit(1);
        }
    }
}

/// Recoverable diagnostics go to stderr and do not change the exit code.
fn report_diags(diags: &[ScpError], output: OutputFormat, quiet: bool) {
    for diag in diags {
        report_scp_error(diag, output, quiet);
    }
}

fn report_scp_error(e: &ScpError, output: OutputFormat, quiet: bool) {
    match output {
        OutputFormat::Json => {
            let err_json = serde_json::to_string_pretty(&e.to_json_value())
                .unwrap_or_else(|_| format!("{:?}", e));
            eprintln!("{}", err_json);
        }
        OutputFormat::Text => {
            if !quiet {
                eprintln!("{}", e);
            }
        }
    }
}

fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    match output {
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "message": msg }));
        }
        OutputFormat::Text => {
            if !quiet {
                eprintln!("error: {}", msg);
            }
        }
    }
}

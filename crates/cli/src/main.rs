mod layout;

use std::path::{Path, PathBuf};
use std::process;

use autolay_core::{
    add_subview, lexer, parser, ConstraintDescriptor, EdgeInsets, Equation, EquationError,
    RecordingInstaller,
};
use clap::{Parser, Subcommand, ValueEnum};

use crate::layout::Layout;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Layout constraint equation compiler.
#[derive(Parser)]
#[command(name = "autolay", version, about = "Layout constraint equation compiler")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Log compiler progress to stderr (RUST_LOG takes precedence)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile equations into constraint descriptors
    Compile {
        /// Equations to compile
        equations: Vec<String>,
        /// Read additional equations from a file, one per line
        #[arg(long)]
        file: Option<PathBuf>,
        /// Layout file (TOML, or JSON with a .json extension) with the
        /// receiver, substitution views and key paths
        #[arg(long)]
        layout: Option<PathBuf>,
    },

    /// Parse equations and print their syntax tree
    Check {
        /// Equations to check
        #[arg(required = true)]
        equations: Vec<String>,
    },

    /// Print the token stream of an equation
    Tokens {
        /// Equation to tokenize
        equation: String,
    },

    /// Pin a subview inside its superview with edge insets
    Margins {
        /// Name of the subview
        subview: String,
        /// Name of the superview
        #[arg(long, default_value = "self")]
        superview: String,
        /// Inset from the superview's top edge
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        top: f64,
        /// Inset from the superview's leading edge
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        leading: f64,
        /// Inset from the superview's bottom edge
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        bottom: f64,
        /// Inset from the superview's trailing edge
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        trailing: f64,
    },
}

fn init_tracing(verbose: bool, quiet: bool) {
    let default_level = if quiet {
        "off"
    } else if verbose {
        "debug"
    } else {
        "error"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Compile {
            equations,
            file,
            layout,
        } => {
            cmd_compile(equations, file.as_deref(), layout.as_deref(), cli.output, cli.quiet);
        }
        Commands::Check { equations } => {
            cmd_check(&equations, cli.output, cli.quiet);
        }
        Commands::Tokens { equation } => {
            cmd_tokens(&equation, cli.output, cli.quiet);
        }
        Commands::Margins {
            subview,
            superview,
            top,
            leading,
            bottom,
            trailing,
        } => {
            let insets = EdgeInsets::new(top, leading, bottom, trailing);
            cmd_margins(subview, superview, insets, cli.output);
        }
    }
}

/// Read equations from a file: one per line, blank lines and `#` comments
/// skipped.
fn read_equation_file(path: &Path) -> Result<Vec<String>, String> {
    let src = std::fs::read_to_string(path)
        .map_err(|e| format!("error reading file '{}': {}", path.display(), e))?;
    Ok(src
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect())
}

fn cmd_compile(
    mut equations: Vec<String>,
    file: Option<&Path>,
    layout_path: Option<&Path>,
    output: OutputFormat,
    quiet: bool,
) {
    if let Some(path) = file {
        match read_equation_file(path) {
            Ok(mut from_file) => equations.append(&mut from_file),
            Err(msg) => {
                report_error(&msg, output, quiet);
                process::exit(1);
            }
        }
    }
    if equations.is_empty() {
        report_error("no equations given", output, quiet);
        process::exit(1);
    }

    let layout = match layout_path.map(Layout::load).transpose() {
        Ok(layout) => layout.unwrap_or_default(),
        Err(msg) => {
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };
    let key_paths = match layout.key_path_table() {
        Ok(table) => table,
        Err(msg) => {
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };
    let substitutions = layout.substitutions();

    #[cfg(feature = "parallel")]
    let result =
        autolay_core::compile_parallel(&equations, &layout.receiver, &substitutions, &key_paths);
    #[cfg(not(feature = "parallel"))]
    let result = autolay_core::compile(&equations, &layout.receiver, &substitutions, &key_paths);

    let failed = !result.is_ok();
    let (descriptors, errors) = result.into_parts();
    match output {
        OutputFormat::Text => {
            print_descriptors(&descriptors);
            if !quiet {
                for e in &errors {
                    eprintln!("{}", e);
                }
            }
        }
        OutputFormat::Json => {
            let json = serde_json::json!({
                "descriptors": descriptors,
                "errors": errors.iter().map(EquationError::to_json_value).collect::<Vec<_>>(),
            });
            print_json(&json);
        }
    }
    if failed {
        process::exit(1);
    }
}

fn cmd_check(equations: &[String], output: OutputFormat, quiet: bool) {
    let mut parsed: Vec<serde_json::Value> = Vec::new();
    let mut errors: Vec<EquationError> = Vec::new();
    for (index, src) in equations.iter().enumerate() {
        match parser::parse_str(src) {
            Ok(equation) => {
                if output == OutputFormat::Text && !quiet {
                    println!("{}", equation);
                }
                parsed.push(check_json(index, &equation));
            }
            Err(e) => errors.push(EquationError::new(index, src.as_str(), e)),
        }
    }

    match output {
        OutputFormat::Text => {
            if !quiet {
                for e in &errors {
                    eprintln!("{}", e);
                }
            }
        }
        OutputFormat::Json => {
            let json = serde_json::json!({
                "equations": parsed,
                "errors": errors.iter().map(EquationError::to_json_value).collect::<Vec<_>>(),
            });
            print_json(&json);
        }
    }
    if !errors.is_empty() {
        process::exit(1);
    }
}

fn check_json(index: usize, equation: &Equation) -> serde_json::Value {
    serde_json::json!({
        "index": index,
        "canonical": equation.to_string(),
        "ast": equation,
    })
}

fn cmd_tokens(equation: &str, output: OutputFormat, quiet: bool) {
    let tokens = match lexer::lex(equation) {
        Ok(tokens) => tokens,
        Err(e) => {
            let err = EquationError::new(0, equation, e.into());
            match output {
                OutputFormat::Json => print_json(&err.to_json_value()),
                OutputFormat::Text => {
                    if !quiet {
                        eprintln!("{}", err);
                    }
                }
            }
            process::exit(1);
        }
    };

    match output {
        OutputFormat::Text => {
            for spanned in &tokens {
                println!("{:>4}  {}", spanned.pos, spanned.token);
            }
        }
        OutputFormat::Json => {
            let json: Vec<serde_json::Value> = tokens
                .iter()
                .map(|s| serde_json::json!({ "pos": s.pos, "token": s.token.to_string() }))
                .collect();
            print_json(&serde_json::Value::Array(json));
        }
    }
}

fn cmd_margins(subview: String, superview: String, insets: EdgeInsets, output: OutputFormat) {
    let mut installer = RecordingInstaller::new();
    let report = match add_subview(&mut installer, &superview, subview, insets) {
        Ok(report) => report,
        Err(never) => match never {},
    };

    match output {
        OutputFormat::Text => {
            println!("equation: {}", insets.margin_equation());
            print_descriptors(&installer.constraints);
            for e in &report.compile_errors {
                eprintln!("{}", e);
            }
        }
        OutputFormat::Json => {
            let errors: Vec<serde_json::Value> = report
                .compile_errors
                .iter()
                .map(EquationError::to_json_value)
                .collect();
            let json = serde_json::json!({
                "equation": insets.margin_equation(),
                "insets": insets,
                "descriptors": installer.constraints,
                "errors": errors,
            });
            print_json(&json);
        }
    }
    if !report.is_ok() {
        process::exit(1);
    }
}

fn print_descriptors(descriptors: &[ConstraintDescriptor<String>]) {
    for d in descriptors {
        println!("{}", d);
    }
}

fn print_json(value: &serde_json::Value) {
    let pretty = serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!("serialization error: {}", e));
    println!("{}", pretty);
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}

//! Hyper-schema docs CLI
//!
//! Command-line interface for resolving and linting hyper-schema documents.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use hyperschema_docs::{
    lint_source, load_document_auto, resolve, FormatOptions, ResolveOptions, Severity,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hyperschema-docs")]
#[command(about = "Resolve JSON Hyper-Schema documents into documentation models")]
#[command(version)]
struct Cli {
    /// Log resolution progress to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve every resource of a schema into a documentation model
    Resolve {
        /// Schema source: file path or URL (http:// or https://)
        schema: String,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,

        /// Content-Type of example request bodies
        #[arg(long, default_value = hyperschema_docs::DEFAULT_CONTENT_TYPE)]
        content_type: String,

        /// Extra header for example requests, as NAME:VALUE (repeatable)
        #[arg(long = "header", value_parser = parse_header)]
        headers: Vec<(String, String)>,

        /// Indentation of rendered examples
        #[arg(long, default_value_t = 2)]
        indent: usize,

        /// Keep object keys of rendered examples in declaration order
        #[arg(long)]
        unsorted: bool,
    },

    /// Lint a schema for broken references and malformed links
    Lint {
        /// Schema source: file path or URL (http:// or https://)
        schema: String,

        /// Output format: text (default) or json
        #[arg(long, default_value = "text")]
        format: String,

        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,

        /// Suppress progress output, only show errors
        #[arg(long, short)]
        quiet: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Resolve {
            schema,
            output,
            pretty,
            content_type,
            headers,
            indent,
            unsorted,
        } => {
            let mut options = ResolveOptions::new()
                .content_type(content_type)
                .format(FormatOptions {
                    indent,
                    sort_keys: !unsorted,
                });
            for (name, value) in headers {
                options = options.header(name, value);
            }
            run_resolve(&schema, &options, output, pretty)
        }

        Commands::Lint {
            schema,
            format,
            strict,
            quiet,
        } => run_lint(&schema, &format, strict, quiet),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = if verbose {
        EnvFilter::new(default_level)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected NAME:VALUE, got \"{}\"", raw))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("empty header name in \"{}\"", raw));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

fn run_resolve(
    schema_source: &str,
    options: &ResolveOptions,
    output: Option<PathBuf>,
    pretty: bool,
) -> Result<(), u8> {
    let doc = load_document_auto(schema_source).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let resolved = resolve(&doc, options).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let json_output = if pretty {
        serde_json::to_string_pretty(&resolved)
    } else {
        serde_json::to_string(&resolved)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;

    match output {
        Some(path) => {
            std::fs::write(&path, &json_output).map_err(|e| {
                eprintln!("Error writing to {}: {}", path.display(), e);
                3u8
            })?;
        }
        None => {
            println!("{}", json_output);
        }
    }

    Ok(())
}

fn run_lint(schema_source: &str, format: &str, strict: bool, quiet: bool) -> Result<(), u8> {
    let report = lint_source(schema_source);
    let passed = report.passes(strict);

    if format == "json" {
        let json = serde_json::to_string_pretty(&report).map_err(|e| {
            eprintln!("Error serializing output: {}", e);
            2u8
        })?;
        println!("{}", json);
    } else {
        if !quiet {
            println!("Linting {} ...\n", schema_source);
        }

        for diag in &report.diagnostics {
            let (color, label) = match diag.severity {
                Severity::Error => ("\x1b[31m", "error"),
                Severity::Warning => ("\x1b[33m", "warning"),
            };
            if !quiet || diag.severity == Severity::Error {
                println!(
                    "  {}{}[{}]\x1b[0m: {} - {}",
                    color, label, diag.code, diag.path, diag.message
                );
            }
        }

        if !quiet {
            println!();
            if passed {
                println!(
                    "\x1b[32m✓ passed ({} warnings)\x1b[0m",
                    report.warnings
                );
            } else {
                println!(
                    "\x1b[31m✗ failed ({} errors, {} warnings)\x1b[0m",
                    report.errors, report.warnings
                );
            }
        }
    }

    if passed {
        Ok(())
    } else {
        Err(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_parsing() {
        assert_eq!(
            parse_header("Authorization: Bearer x").unwrap(),
            ("Authorization".to_string(), "Bearer x".to_string())
        );
        assert_eq!(
            parse_header("X-Trace:a:b").unwrap(),
            ("X-Trace".to_string(), "a:b".to_string())
        );
        assert!(parse_header("no-colon").is_err());
        assert!(parse_header(":value").is_err());
    }

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}

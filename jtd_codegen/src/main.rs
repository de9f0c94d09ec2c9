//! Binary to generate Java, Rust, Go and TypeScript types from a JTD schema.
//!
//! Usage: `jtd-codegen schema.jtd.json --rust-out src/gen --go-out gen --go-package gen`
//!
//! Each `--*-out` flag enables one target. Logs go to stderr; a summary of
//! the generated type names goes to stdout in the chosen `--log-format`.

use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use jtd_codegen::{GenerateSettings, TargetConfig, TargetReport, generate_from_file};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

#[derive(Parser, Debug)]
#[command(name = "jtd-codegen", version, about = "Generate code from JSON Type Definition schemas")]
struct Cli {
    /// Path to the JTD schema file.
    input: PathBuf,

    /// Name of the root type. Defaults to the file name without `.jtd.json`.
    #[arg(long)]
    root_name: Option<String>,

    /// Output directory for Java + Jackson code.
    #[arg(long, value_name = "DIR")]
    java_jackson_out: Option<PathBuf>,

    /// Java package for generated classes.
    #[arg(long, value_name = "PACKAGE")]
    java_jackson_package: Option<String>,

    /// Output directory for Rust + serde code.
    #[arg(long, value_name = "DIR")]
    rust_out: Option<PathBuf>,

    /// Output directory for Go code.
    #[arg(long, value_name = "DIR")]
    go_out: Option<PathBuf>,

    /// Go package name for generated code.
    #[arg(long, value_name = "PACKAGE")]
    go_package: Option<String>,

    /// Output directory for TypeScript code.
    #[arg(long, value_name = "DIR")]
    typescript_out: Option<PathBuf>,

    /// Format of the summary printed after generation.
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Pretty,
    Minimal,
    Json,
}

#[derive(Serialize)]
struct TargetEntry<'a> {
    out_dir: String,
    root_name: &'a str,
    definition_names: &'a BTreeMap<String, String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_format);

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            eprintln!("Error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool, log_format: LogFormat) {
    let default_level: LevelFilter = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    let filter: EnvFilter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if log_format == LogFormat::Json {
        builder.json().init();
    } else {
        builder.with_target(false).init();
    }
}

/// Generates every requested target. Returns whether all of them succeeded.
fn run(cli: &Cli) -> anyhow::Result<bool> {
    let settings: GenerateSettings = settings_from_cli(cli)?;
    if settings.targets.is_empty() {
        bail!(
            "no targets requested; pass at least one of \
             --java-jackson-out, --rust-out, --go-out, --typescript-out"
        );
    }

    let reports: Vec<TargetReport> = generate_from_file(&cli.input, &settings)
        .with_context(|| format!("failed to generate code from {}", cli.input.display()))?;

    print_summary(cli.log_format, &reports)?;
    Ok(reports.iter().all(|report| report.outcome.is_ok()))
}

fn settings_from_cli(cli: &Cli) -> anyhow::Result<GenerateSettings> {
    let root_name: String = cli
        .root_name
        .clone()
        .unwrap_or_else(|| root_name_from_input_name(&cli.input).to_string());
    let mut settings = GenerateSettings::new(root_name);

    if let Some(out_dir) = &cli.java_jackson_out {
        let Some(package) = &cli.java_jackson_package else {
            bail!("--java-jackson-out requires --java-jackson-package");
        };
        settings = settings.with_target(TargetConfig::JavaJackson {
            out_dir: out_dir.clone(),
            package: package.clone(),
        });
    }
    if let Some(out_dir) = &cli.rust_out {
        settings = settings.with_target(TargetConfig::Rust {
            out_dir: out_dir.clone(),
        });
    }
    if let Some(out_dir) = &cli.go_out {
        let Some(package) = &cli.go_package else {
            bail!("--go-out requires --go-package");
        };
        settings = settings.with_target(TargetConfig::Go {
            out_dir: out_dir.clone(),
            package: package.clone(),
        });
    }
    if let Some(out_dir) = &cli.typescript_out {
        settings = settings.with_target(TargetConfig::TypeScript {
            out_dir: out_dir.clone(),
        });
    }
    Ok(settings)
}

/// `user.jtd.json` becomes `user`.
fn root_name_from_input_name(input: &Path) -> &str {
    input
        .file_stem()
        .and_then(|stem| stem.to_str())
        .map_or("", |stem| stem.trim_end_matches(".jtd"))
}

fn print_summary(log_format: LogFormat, reports: &[TargetReport]) -> anyhow::Result<()> {
    match log_format {
        LogFormat::Pretty => {
            for report in reports {
                print_pretty(report);
            }
        }
        LogFormat::Minimal => {
            for report in reports {
                print_minimal(report);
            }
        }
        LogFormat::Json => {
            let mut entries: BTreeMap<&str, TargetEntry<'_>> = BTreeMap::new();
            for report in reports {
                if let Ok(written) = &report.outcome {
                    entries.insert(
                        report.target,
                        TargetEntry {
                            out_dir: report.out_dir.display().to_string(),
                            root_name: &written.info.root_name,
                            definition_names: &written.info.definition_names,
                        },
                    );
                }
            }
            println!("{}", serde_json::to_string(&entries)?);
        }
    }
    Ok(())
}

fn print_pretty(report: &TargetReport) {
    match &report.outcome {
        Ok(written) => {
            println!(
                "Generated {} code in: {}",
                report.target.green().bold(),
                report.out_dir.display().to_string().bold()
            );
            println!(
                "\tRoot schema converted into type: {}",
                written.info.root_name.bold()
            );
            for (definition_name, type_name) in &written.info.definition_names {
                println!(
                    "\tDefinition {} converted into type: {}",
                    format!("{definition_name:?}").bold(),
                    type_name.bold()
                );
            }
        }
        Err(error) => {
            eprintln!("{} {}: {error}", "Failed".red().bold(), report.target.bold());
        }
    }
}

fn print_minimal(report: &TargetReport) {
    match &report.outcome {
        Ok(written) => {
            println!("{}: root: {}", report.target, written.info.root_name);
            for (definition_name, type_name) in &written.info.definition_names {
                println!("{}: definition: {definition_name}: {type_name}", report.target);
            }
        }
        Err(error) => eprintln!("{}: error: {error}", report.target),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_name_strips_jtd_extension() {
        assert_eq!(root_name_from_input_name(Path::new("user.jtd.json")), "user");
        assert_eq!(root_name_from_input_name(Path::new("schemas/user.json")), "user");
        assert_eq!(root_name_from_input_name(Path::new("user")), "user");
        assert_eq!(root_name_from_input_name(Path::new("")), "");
    }

    #[test]
    fn package_is_required_for_java_and_go() {
        let cli = Cli::parse_from(["jtd-codegen", "user.jtd.json", "--go-out", "gen"]);
        let error = settings_from_cli(&cli).expect_err("missing package");
        assert_eq!(error.to_string(), "--go-out requires --go-package");
    }

    #[test]
    fn flags_build_targets_in_fixed_order() {
        let cli = Cli::parse_from([
            "jtd-codegen",
            "user.jtd.json",
            "--typescript-out",
            "ts",
            "--go-out",
            "go",
            "--go-package",
            "gen",
            "--rust-out",
            "rust",
            "--java-jackson-out",
            "java",
            "--java-jackson-package",
            "com.example",
        ]);
        let settings = settings_from_cli(&cli).expect("valid flags");
        assert_eq!(settings.root_name, "user");
        let ids: Vec<&str> = settings.targets.iter().map(TargetConfig::id).collect();
        assert_eq!(ids, vec!["java-jackson", "rust", "go", "typescript"]);
    }

    #[test]
    fn explicit_root_name_wins() {
        let cli = Cli::parse_from(["jtd-codegen", "a.jtd.json", "--root-name", "event"]);
        let settings = settings_from_cli(&cli).expect("valid flags");
        assert_eq!(settings.root_name, "event");
        assert!(settings.targets.is_empty());
    }
}
